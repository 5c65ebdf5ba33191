use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("module resolution failed: {0}")]
    ModuleResolution(String),

    /// First diagnostic of an invalid source file; the run never continues
    /// with a partial scan.
    #[error("{}:{line}:{col}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        col: usize,
        message: String,
    },

    #[error("import name `{alias}` is needed for both {first:?} and {second:?}")]
    ImportAmbiguity {
        alias: String,
        first: String,
        second: String,
    },

    #[error("interface `{name}` would be generated from both {first:?} and {second:?}")]
    DuplicateInterface {
        name: String,
        first: String,
        second: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn module(message: impl Into<String>) -> Self {
        Error::ModuleResolution(message.into())
    }
}

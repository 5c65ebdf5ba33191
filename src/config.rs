use crate::error::{Error, Result};
use interfacegen_parser::ast::is_identifier;
use std::path::PathBuf;

pub const DEFAULT_SRC_PACKAGE: &str = "./";
pub const DEFAULT_DST_PACKAGE: &str = "interfaces";

/// Inputs of one generator run. Passed explicitly to every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Source directory, or an import path inside the current module.
    pub src_package: String,
    /// Package clause of the generated file.
    pub dst_package: String,
    /// Destination file.
    pub output: PathBuf,
    pub include_docs: bool,
    /// Also scan nested package directories.
    pub include_all_packages: bool,
    /// Drop unexported types and unexported methods.
    pub exported_only: bool,
}

impl Config {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            src_package: DEFAULT_SRC_PACKAGE.to_string(),
            dst_package: DEFAULT_DST_PACKAGE.to_string(),
            output: output.into(),
            include_docs: true,
            include_all_packages: false,
            exported_only: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.src_package.trim().is_empty() {
            return Err(Error::Config("source package must not be empty".into()));
        }
        if self.dst_package == "_" || !is_identifier(&self.dst_package) {
            return Err(Error::Config(format!(
                "destination package `{}` is not a valid Go identifier",
                self.dst_package
            )));
        }
        if self.output.as_os_str().is_empty() || self.output.file_name().is_none() {
            return Err(Error::Config(format!(
                "output `{}` must name a file",
                self.output.display()
            )));
        }
        if self.output.is_dir() {
            return Err(Error::Config(format!(
                "output `{}` is a directory",
                self.output.display()
            )));
        }
        Ok(())
    }
}

//! Emitter: renders the generated file and replaces the destination
//! atomically.

use crate::error::{Error, Result};
use crate::model::{InterfaceSpec, OutputFile, ResolvedImport};
use crate::ports::SourcePrinter;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Written,
    /// Destination already held exactly this content.
    Unchanged,
}

pub fn render(
    package: &str,
    imports: Vec<ResolvedImport>,
    interfaces: Vec<InterfaceSpec>,
    printer: &dyn SourcePrinter,
) -> String {
    printer.render(&OutputFile {
        package: package.to_string(),
        imports,
        interfaces,
    })
}

/// Current content of `path`, `None` when it does not exist.
fn current(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Whether `path` already holds `contents`.
pub fn is_up_to_date(path: &Path, contents: &str) -> Result<bool> {
    Ok(current(path)?.as_deref() == Some(contents))
}

/// Replaces `path` with `contents`; readers see the old file or the new one,
/// never a partial write.
pub fn write(path: &Path, contents: &str) -> Result<Outcome> {
    if is_up_to_date(path, contents)? {
        debug!(path = %path.display(), "output unchanged");
        return Ok(Outcome::Unchanged);
    }

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| Error::io(tmp.path(), e))?;

    let permissions = match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => default_permissions(),
    };
    if let Some(permissions) = permissions {
        fs::set_permissions(tmp.path(), permissions).map_err(|e| Error::io(tmp.path(), e))?;
    }

    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
    debug!(path = %path.display(), bytes = contents.len(), "output written");
    Ok(Outcome::Written)
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

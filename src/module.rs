//! Module Resolver: maps directories to import paths through `go.mod`.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

pub const DESCRIPTOR: &str = "go.mod";
pub const LOCK_FILE: &str = "go.sum";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Module path declared by the descriptor.
    pub path: String,
    /// Canonical directory holding the descriptor.
    pub root: PathBuf,
}

impl ModuleInfo {
    /// Finds the nearest enclosing module of `start`.
    pub fn discover(start: &Path) -> Result<Self> {
        let start = canonical(start)?;
        let root = start
            .ancestors()
            .find(|dir| dir.join(DESCRIPTOR).is_file())
            .ok_or_else(|| {
                Error::module(format!("no {DESCRIPTOR} found in {} or above", start.display()))
            })?;
        Self::resolve(root)
    }

    /// Reads the descriptor in `root`.
    pub fn resolve(root: &Path) -> Result<Self> {
        let root = canonical(root)?;
        let descriptor = root.join(DESCRIPTOR);
        let text = fs::read_to_string(&descriptor)
            .map_err(|e| Error::module(format!("cannot read {}: {e}", descriptor.display())))?;
        let path = parse_module_path(&text).ok_or_else(|| {
            Error::module(format!("{} has no module declaration", descriptor.display()))
        })?;

        if !root.join(LOCK_FILE).is_file() {
            debug!(root = %root.display(), "module has no {LOCK_FILE}");
        }
        debug!(module = %path, root = %root.display(), "resolved module");

        Ok(Self { path, root })
    }

    /// Import path of a directory inside the module.
    pub fn import_path_of(&self, dir: &Path) -> Result<String> {
        let dir = canonical(dir)?;
        let rel = dir.strip_prefix(&self.root).map_err(|_| {
            Error::module(format!(
                "{} is outside module {} ({})",
                dir.display(),
                self.path,
                self.root.display()
            ))
        })?;

        let mut path = self.path.clone();
        for comp in rel.components() {
            if let Component::Normal(elem) = comp {
                path.push('/');
                path.push_str(&elem.to_string_lossy());
            }
        }
        Ok(path)
    }

    /// Directory of an import path inside the module, if it names one.
    pub fn dir_of(&self, import_path: &str) -> Option<PathBuf> {
        let import_path = import_path.trim_end_matches('/');
        if import_path == self.path {
            return Some(self.root.clone());
        }
        let rel = import_path.strip_prefix(&self.path)?.strip_prefix('/')?;
        if rel.split('/').any(|elem| elem.is_empty() || elem == "." || elem == "..") {
            return None;
        }
        Some(rel.split('/').fold(self.root.clone(), |dir, elem| dir.join(elem)))
    }
}

/// Module path from the first meaningful line of a descriptor.
///
/// Accepts `module foo`, `module "foo"` and a trailing `// comment`; blank
/// and comment-only lines before it are skipped.
pub fn parse_module_path(text: &str) -> Option<String> {
    let line = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("//"))?;

    let rest = line.strip_prefix("module")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = match rest.find("//") {
        Some(idx) => &rest[..idx],
        None => rest,
    };
    let value = rest.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('`').and_then(|v| v.strip_suffix('`')))
        .unwrap_or(value);

    if value.is_empty() || value.contains(char::is_whitespace) {
        return None;
    }
    Some(value.to_string())
}

fn canonical(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path)
        .map_err(|e| Error::module(format!("cannot resolve {}: {e}", path.display())))
}

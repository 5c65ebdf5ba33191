//! Declaration Scanner.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::*;
use crate::module::{ModuleInfo, DESCRIPTOR};
use crate::ports::SourceParser;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Parses every candidate file of `src_dir` (and nested packages when
/// enabled) into one [`ScanResult`].
pub fn scan(
    config: &Config,
    module: &ModuleInfo,
    src_dir: &Path,
    parser: &dyn SourceParser,
) -> Result<ScanResult> {
    let exclude = fs::canonicalize(&config.output).ok();
    let mut result = ScanResult::default();
    let mut order = 0usize;

    for dir in package_dirs(src_dir, config.include_all_packages)? {
        let files = candidate_files(&dir, exclude.as_deref())?;
        if files.is_empty() {
            debug!(dir = %dir.display(), "no source files");
            continue;
        }

        let import_path = module.import_path_of(&dir)?;
        let Some(package) = scan_package(dir, import_path, &files, parser, &mut order)? else {
            continue;
        };
        debug!(
            package = %package.import_path,
            files = package.files.len(),
            types = package.types.len(),
            methods = package.methods.len(),
            "scanned package"
        );
        result.packages.push(package);
    }

    Ok(result)
}

fn scan_package(
    dir: PathBuf,
    import_path: String,
    files: &[PathBuf],
    parser: &dyn SourceParser,
    order: &mut usize,
) -> Result<Option<PackageScan>> {
    let mut parsed_files = Vec::with_capacity(files.len());
    for path in files {
        let src = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let constraint = build_constraint(&src);
        if constraint == Some("ignore") {
            debug!(file = %path.display(), "excluded by build constraint");
            continue;
        }
        let parsed = parser.parse_file(path, &src)?;
        debug!(file = %path.display(), package = %parsed.package, "parsed");
        parsed_files.push((path.as_path(), parsed, constraint.is_some()));
    }

    // Files without a build constraint name the package.
    let Some((first, name)) = parsed_files
        .iter()
        .find(|(_, _, constrained)| !constrained)
        .or_else(|| parsed_files.first())
        .map(|(path, parsed, _)| (*path, parsed.package.clone()))
    else {
        debug!(dir = %dir.display(), "every file excluded");
        return Ok(None);
    };

    let mut package = PackageScan {
        dir,
        import_path,
        name,
        files: Vec::with_capacity(parsed_files.len()),
        types: Vec::new(),
        methods: Vec::new(),
    };

    for (path, parsed, constrained) in parsed_files {
        if parsed.package != package.name {
            if constrained {
                debug!(
                    file = %path.display(),
                    package = %parsed.package,
                    "constrained file of another package"
                );
                continue;
            }
            return Err(Error::Parse {
                path: path.to_path_buf(),
                line: parsed.package_pos.line,
                col: parsed.package_pos.col,
                message: format!(
                    "found packages {} ({}) and {} ({}) in {}",
                    package.name,
                    file_name(first),
                    parsed.package,
                    file_name(path),
                    package.dir.display()
                ),
            });
        }
        add_file(&mut package, path, parsed, order)?;
    }

    resolve_receivers(&mut package);
    Ok(Some(package))
}

/// Expression of the `//go:build` (or legacy `// +build`) line in the file
/// header, if any.
fn build_constraint(src: &str) -> Option<&str> {
    for line in src.lines() {
        let line = line.trim();
        if let Some(expr) = line
            .strip_prefix("//go:build")
            .or_else(|| line.strip_prefix("// +build"))
        {
            return Some(expr.trim());
        }
        if !line.is_empty() && !line.starts_with("//") {
            return None;
        }
    }
    None
}

/// Appends one file's declarations, renumbering `order` across the scan.
fn add_file(
    package: &mut PackageScan,
    path: &Path,
    parsed: ParsedFile,
    order: &mut usize,
) -> Result<()> {
    let file = package.files.len();
    let base = *order;
    let mut next = base;

    for mut decl in parsed.types {
        if decl.name != "_" && package.type_named(&decl.name).is_some() {
            return Err(Error::Parse {
                path: path.to_path_buf(),
                line: decl.pos.line,
                col: decl.pos.col,
                message: format!("type {} redeclared in package {}", decl.name, package.name),
            });
        }
        if decl.skip {
            debug!(type_name = %decl.name, "skip directive on type");
        }
        decl.order += base;
        next = next.max(decl.order + 1);
        package.types.push(decl);
    }

    for mut method in parsed.methods {
        if method.skip {
            debug!(receiver = %method.receiver, method = %method.name, "skip directive on method");
        }
        method.order += base;
        method.file = file;
        next = next.max(method.order + 1);
        package.methods.push(method);
    }

    package.files.push(FileScan {
        path: path.to_path_buf(),
        imports: parsed.imports,
    });
    *order = next;
    Ok(())
}

fn resolve_receivers(package: &mut PackageScan) {
    let index: HashMap<&str, usize> = package
        .types
        .iter()
        .enumerate()
        .map(|(i, t)| (t.name.as_str(), i))
        .collect();

    for method in &mut package.methods {
        method.owner = index.get(method.receiver.as_str()).copied();
        if method.owner.is_none() {
            debug!(
                receiver = %method.receiver,
                method = %method.name,
                "receiver type not declared in package"
            );
        }
    }
}

/// Package directories to scan, target first, nested ones in file-name order.
fn package_dirs(src_dir: &Path, include_all: bool) -> Result<Vec<PathBuf>> {
    if !include_all {
        return Ok(vec![src_dir.to_path_buf()]);
    }

    let walker = WalkDir::new(src_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            if !entry.file_type().is_dir() {
                return false;
            }
            let name = entry.file_name().to_string_lossy();
            let pruned = name.starts_with('.')
                || name.starts_with('_')
                || name == "testdata"
                || name == "vendor"
                || entry.path().join(DESCRIPTOR).is_file();
            if pruned {
                debug!(dir = %entry.path().display(), "not descending");
            }
            !pruned
        });

    let mut dirs = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src_dir).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
            Error::io(path, source)
        })?;
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }
    Ok(dirs)
}

/// `*.go` files of `dir` that belong to the package build, sorted by name.
fn candidate_files(dir: &Path, exclude: Option<&Path>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if !name.ends_with(".go")
            || name.ends_with("_test.go")
            || name.starts_with('.')
            || name.starts_with('_')
            || !path.is_file()
        {
            continue;
        }
        if exclude.is_some_and(|out| fs::canonicalize(&path).is_ok_and(|p| p == out)) {
            debug!(file = %path.display(), "excluding output file");
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

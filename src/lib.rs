//! Go interface generator.
//!
//! Scans a package's declarations and emits one interface per type that has
//! methods:
//!
//! - `module` maps directories to import paths through `go.mod`.
//! - `scan` parses the package (and nested ones) into the declaration model.
//! - `synth` groups and filters methods into interface specs.
//! - `imports` classifies referenced identifiers and builds the import list.
//! - `emit` renders the file and replaces the destination atomically.

pub mod config;
pub mod emit;
pub mod error;
pub mod imports;
pub mod model;
pub mod module;
pub mod ports;
pub mod scan;
pub mod synth;

// Re-exports for convenience
pub use config::Config;
pub use emit::Outcome;
pub use error::{Error, Result};
pub use module::ModuleInfo;
pub use ports::{GoParser, GoPrinter, SourceParser, SourcePrinter};

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Rendered output of one run, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub output: PathBuf,
    pub text: String,
    pub interfaces: usize,
    pub imports: usize,
}

/// Runs the pipeline with the Go ports and writes the result.
pub fn run(config: &Config) -> Result<Outcome> {
    let generated = generate(config)?;
    let outcome = emit::write(&generated.output, &generated.text)?;
    info!(
        output = %generated.output.display(),
        interfaces = generated.interfaces,
        imports = generated.imports,
        ?outcome,
        "generated interfaces"
    );
    Ok(outcome)
}

/// Whether the destination already matches what a run would write.
pub fn check(config: &Config) -> Result<bool> {
    let generated = generate(config)?;
    let fresh = emit::is_up_to_date(&generated.output, &generated.text)?;
    info!(output = %generated.output.display(), up_to_date = fresh, "checked interfaces");
    Ok(fresh)
}

pub fn generate(config: &Config) -> Result<Generated> {
    generate_with(config, &GoParser, &GoPrinter)
}

/// Module Resolver → Scanner → Synthesizer → Import Resolver → Emitter.
pub fn generate_with(
    config: &Config,
    parser: &dyn SourceParser,
    printer: &dyn SourcePrinter,
) -> Result<Generated> {
    config.validate()?;

    let (module, src_dir) = locate_source(&config.src_package)?;
    let scan = scan::scan(config, &module, &src_dir, parser)?;
    let mut specs = synth::synthesize(&scan, config)?;

    let dst_identity = destination_identity(&module, &config.output);
    let imports = imports::resolve(&mut specs, &scan, dst_identity.as_deref())?;

    info!(
        module = %module.path,
        packages = scan.packages.len(),
        interfaces = specs.len(),
        "synthesized"
    );

    let interfaces = specs.len();
    let import_count = imports.len();
    let text = emit::render(&config.dst_package, imports, specs, printer);

    Ok(Generated {
        output: config.output.clone(),
        text,
        interfaces,
        imports: import_count,
    })
}

/// `src` names a directory, or failing that an import path in the module
/// enclosing the working directory.
fn locate_source(src: &str) -> Result<(ModuleInfo, PathBuf)> {
    let as_dir = Path::new(src);
    if as_dir.is_dir() {
        let module = ModuleInfo::discover(as_dir)?;
        let dir = fs::canonicalize(as_dir).map_err(|e| Error::io(as_dir, e))?;
        return Ok((module, dir));
    }

    let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
    let module = ModuleInfo::discover(&cwd)?;
    let dir = module
        .dir_of(src)
        .filter(|dir| dir.is_dir())
        .ok_or_else(|| {
            Error::module(format!(
                "{src} is neither a directory nor a package of module {}",
                module.path
            ))
        })?;
    Ok((module, dir))
}

/// Import path of the output file's package, when it lives in the module.
fn destination_identity(module: &ModuleInfo, output: &Path) -> Option<String> {
    let dir = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    module.import_path_of(dir).ok()
}

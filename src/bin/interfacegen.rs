//! interfacegen: generate Go interfaces from a package's method sets.

use anyhow::{bail, Context};
use clap::Parser;
use interfacegen::config::{DEFAULT_DST_PACKAGE, DEFAULT_SRC_PACKAGE};
use interfacegen::{Config, Outcome};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "interfacegen", version, about)]
struct Args {
    /// Source package: a directory or an import path inside the current module
    #[arg(long, env = "INTERFACEGEN_SRC", default_value = DEFAULT_SRC_PACKAGE)]
    src: String,

    /// Package name of the generated file
    #[arg(long, env = "INTERFACEGEN_DST", default_value = DEFAULT_DST_PACKAGE)]
    dst: String,

    /// Destination file
    #[arg(short, long, env = "INTERFACEGEN_OUTPUT")]
    output: PathBuf,

    /// Do not copy doc comments into the generated file
    #[arg(long, env = "INTERFACEGEN_NO_DOCS")]
    no_docs: bool,

    /// Also scan nested package directories
    #[arg(long, env = "INTERFACEGEN_ALL")]
    all: bool,

    /// Only generate interfaces for exported types and methods
    #[arg(long, env = "INTERFACEGEN_EXPORTED_ONLY")]
    exported_only: bool,

    /// Fail if the destination is not up to date instead of writing it
    #[arg(long)]
    check: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            src_package: self.src.clone(),
            dst_package: self.dst.clone(),
            output: self.output.clone(),
            include_docs: !self.no_docs,
            include_all_packages: self.all,
            exported_only: self.exported_only,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("interfacegen=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("interfacegen=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = args.config();

    if args.check {
        let fresh = interfacegen::check(&config)
            .with_context(|| format!("checking {}", config.output.display()))?;
        if !fresh {
            bail!("{} is out of date", config.output.display());
        }
        return Ok(());
    }

    match interfacegen::run(&config)
        .with_context(|| format!("generating {}", config.output.display()))?
    {
        Outcome::Written => {}
        Outcome::Unchanged => tracing::debug!("nothing to do"),
    }
    Ok(())
}

use crate::bundle::Bundle;
use crate::config::types::ProbeSettings;
use crate::oracle::RuntimeOracle;
use crate::search;
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// Default worker count when neither --sequential nor --parallelism is given.
const DEFAULT_PARALLELISM: usize = 4;

#[derive(Parser)]
#[command(author, version, about = "Find the minimum needed capabilities", long_about = None)]
struct Cli {
    /// Path to the OCI bundle
    #[arg(value_name = "PATH")]
    bundle: PathBuf,

    /// Test to run inside the container to validate the configuration
    #[arg(long, value_name = "PATH")]
    test: PathBuf,

    /// Run only one instance of the container at a time
    #[arg(long, conflicts_with = "parallelism")]
    sequential: bool,

    /// Maximum number of containers to run at the same time
    #[arg(long, value_name = "N", default_value_t = DEFAULT_PARALLELISM)]
    parallelism: usize,

    /// OCI runtime binary used to run the trials
    #[arg(long, value_name = "PATH", default_value = "crun")]
    runtime: PathBuf,

    /// Overwrite the destination file
    #[arg(long)]
    force: bool,
}

pub fn run() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let settings = ProbeSettings {
        runtime: cli.runtime,
        parallelism: if cli.sequential { 1 } else { cli.parallelism },
        test_executable: cli.test,
    };
    settings.validate()?;

    let bundle = Bundle::load(&cli.bundle)
        .with_context(|| format!("failed to load bundle {}", cli.bundle.display()))?;

    // Refuse up front rather than after a full probing run.
    let dest = bundle.reduced_config_path();
    if !cli.force && dest.exists() {
        bail!("the file {} already exists", dest.display());
    }

    let probe_spec = bundle.probe_spec(&settings.test_executable)?;
    let oracle = RuntimeOracle::new(settings.runtime.clone());
    let minimal = search::minimize(&probe_spec, &oracle, settings.parallelism)?;

    println!("{}", serde_json::to_string_pretty(&minimal)?);

    let written = bundle.write_reduced(&minimal, cli.force)?;
    println!("Written {}", written.display());
    Ok(())
}

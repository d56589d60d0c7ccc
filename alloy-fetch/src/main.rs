mod artifact;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{crate_description, crate_name, crate_version, Arg, Command};
use tracing::{info, subscriber, Level};
use tracing_subscriber::fmt::Subscriber;

use artifact::Artifact;

fn main() -> Result<()> {
    init_logging();

    let matches = Command::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .arg(
            Arg::new("release")
                .help("Alloy release to install")
                .short('r')
                .long("release")
                .num_args(1)
                .value_name("RELEASE")
                .env("ALLOY_RELEASE")
                .default_value("1.10.1"),
        )
        .arg(
            Arg::new("patch")
                .help("Package patch level of the release")
                .short('p')
                .long("patch")
                .num_args(1)
                .value_name("PATCH")
                .env("ALLOY_RELEASE_PATCH")
                .default_value("1"),
        )
        .arg(
            Arg::new("arch")
                .help("Debian architecture of the package")
                .short('a')
                .long("arch")
                .num_args(1)
                .value_name("ARCH")
                .env("ALLOY_ARCH")
                .default_value("amd64"),
        )
        .arg(
            Arg::new("workspace")
                .help("Directory the agent binary is installed into")
                .short('w')
                .long("workspace")
                .num_args(1)
                .value_name("WORKSPACE")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value("/workspace"),
        )
        .arg(
            Arg::new("scratch")
                .help("Directory for the download and extraction tree")
                .short('s')
                .long("scratch")
                .num_args(1)
                .value_name("SCRATCH")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value("/tmp"),
        )
        .get_matches();

    let artifact = Artifact::new(
        matches
            .get_one::<String>("release")
            .context("Missing release")?,
        matches.get_one::<String>("patch").context("Missing patch")?,
        matches.get_one::<String>("arch").context("Missing arch")?,
    );
    let workspace = matches
        .get_one::<PathBuf>("workspace")
        .context("Missing workspace")?;
    let scratch = matches
        .get_one::<PathBuf>("scratch")
        .context("Missing scratch")?;

    let deb = scratch.join(artifact.deb_name());
    let extract_dir = scratch.join("apt");

    artifact::download(&artifact.url(), &deb)?;
    let binary = artifact::extract(&deb, &extract_dir)?;
    let installed = artifact::install(&binary, workspace)?;
    artifact::cleanup(&deb, &extract_dir)?;

    info!("Installed {} at {}", artifact, installed.display());
    Ok(())
}

fn init_logging() {
    let subscriber = Subscriber::builder().with_max_level(Level::INFO).finish();
    let _ = subscriber::set_global_default(subscriber);
}

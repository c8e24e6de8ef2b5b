/// Command-line front end for rotating, translating and scaling BDF grids
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bdfutil_core::{BdfModel, ReadOptions, Transform};
use clap::{ArgAction, Parser, Subcommand};
use log::debug;

/// Rotate, translate or scale the GRID points of a Nastran bulk data file.
///
/// Without OUT_FILE the input file is overwritten.
#[derive(Parser, Debug)]
#[command(name = "bdf_utils", author, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Reject duplicate GRID ids while reading
    #[arg(long, global = true)]
    pub validate: bool,

    /// Check that every CP/CD coordinate system is defined in the file
    #[arg(long, global = true)]
    pub xref: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Choose one of the listed operations to perform
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rotate a grid around a given direction
    #[command(allow_negative_numbers = true)]
    Rotate {
        /// Name of input BDF file
        bdf_file: PathBuf,
        /// x-component of the rotation axis
        vx: f64,
        /// y-component of the rotation axis
        vy: f64,
        /// z-component of the rotation axis
        vz: f64,
        /// Rotation angle [deg]
        theta: f64,
        /// Optional output file
        out_file: Option<PathBuf>,
    },

    /// Translate a grid
    #[command(allow_negative_numbers = true)]
    Translate {
        /// Name of input BDF file
        bdf_file: PathBuf,
        /// x-displacement
        dx: f64,
        /// y-displacement
        dy: f64,
        /// z-displacement
        dz: f64,
        /// Optional output file
        out_file: Option<PathBuf>,
    },

    /// Scale a grid uniformly about the origin
    #[command(allow_negative_numbers = true)]
    Scale {
        /// Name of input BDF file
        bdf_file: PathBuf,
        /// Scale factor
        factor: f64,
        /// Optional output file
        out_file: Option<PathBuf>,
    },
}

impl Command {
    pub fn input(&self) -> &Path {
        match self {
            Self::Rotate { bdf_file, .. }
            | Self::Translate { bdf_file, .. }
            | Self::Scale { bdf_file, .. } => bdf_file.as_path(),
        }
    }

    pub fn output(&self) -> Option<&Path> {
        match self {
            Self::Rotate { out_file, .. }
            | Self::Translate { out_file, .. }
            | Self::Scale { out_file, .. } => out_file.as_deref(),
        }
    }

    pub fn transform(&self) -> Transform {
        match *self {
            Self::Rotate {
                vx, vy, vz, theta, ..
            } => Transform::rotate(vx, vy, vz, theta),
            Self::Translate { dx, dy, dz, .. } => Transform::translate(dx, dy, dz),
            Self::Scale { factor, .. } => Transform::scale(factor),
        }
    }
}

impl Cli {
    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            validate: self.validate,
            xref: self.xref,
        }
    }

    /// Default log filter for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Install the global logger. `RUST_LOG` takes precedence over the flags.
pub fn init_logging(cli: &Cli) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .format_timestamp(None)
        .init();
}

/// Read the input deck, apply the requested transform and write the result.
pub fn run(cli: &Cli) -> Result<()> {
    let input = cli.command.input();
    let transform = cli.command.transform();

    let mut model = BdfModel::read(input, &cli.read_options())
        .with_context(|| format!("failed to read {}", input.display()))?;

    model
        .transform(&transform)
        .with_context(|| format!("failed to {} {}", transform.name(), input.display()))?;

    match cli.command.output() {
        Some(output) => model
            .write(output)
            .with_context(|| format!("failed to write {}", output.display()))?,
        None => write_in_place(&model, input)?,
    }
    Ok(())
}

/// Write `model` to a scratch file, then copy it over `target`.
///
/// The target is only touched once the whole deck has been written.
fn write_in_place(model: &BdfModel, target: &Path) -> Result<()> {
    let scratch_dir = tempfile::tempdir().context("failed to create a temporary directory")?;
    let scratch = scratch_dir.path().join("tmp.bdf");

    model
        .write(&scratch)
        .with_context(|| format!("failed to write {}", scratch.display()))?;
    fs::copy(&scratch, target)
        .with_context(|| format!("failed to copy result back to {}", target.display()))?;
    debug!("Copied {} back to {}", scratch.display(), target.display());

    scratch_dir
        .close()
        .context("failed to remove the temporary directory")?;
    Ok(())
}

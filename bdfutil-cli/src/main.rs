/// bdf_utils - transform the GRID points of a BDF file
///
/// Usage:
///   bdf_utils rotate    <BDF_FILE> <VX> <VY> <VZ> <THETA> [OUT_FILE]
///   bdf_utils translate <BDF_FILE> <DX> <DY> <DZ> [OUT_FILE]
///   bdf_utils scale     <BDF_FILE> <FACTOR> [OUT_FILE]

use std::process::ExitCode;

use bdfutil_cli::Cli;
use clap::Parser;

fn main() -> ExitCode {
    let cli = Cli::parse();
    bdfutil_cli::init_logging(&cli);

    match bdfutil_cli::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

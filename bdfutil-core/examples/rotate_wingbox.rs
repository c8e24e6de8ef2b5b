/// Example: rotate a wingbox about the z-axis, scale it, and write it out
///
/// Usage: cargo run -p bdfutil-core --example rotate_wingbox -- [in.bdf] [out.bdf]

use std::env;

use bdfutil_core::{BdfModel, ReadOptions};

const DEMO_DECK: &str = "\
BEGIN BULK
GRID           1              0.      0.      0.
GRID           2             10.      0.      0.
GRID           3             10.      2.      0.
GRID           4              0.      2.      0.
CQUAD4         1       1       1       2       3       4
ENDDATA
";

fn main() -> bdfutil_core::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut model = match args.get(1) {
        Some(path) => BdfModel::read(path, &ReadOptions::default())?,
        None => {
            eprintln!("No BDF file provided, using a built-in four-grid panel...");
            BdfModel::parse(DEMO_DECK, &ReadOptions::default())?
        }
    };

    model.rotate(0.0, 0.0, 1.0, 45.0)?;
    model.scale(1.1)?;

    match args.get(2) {
        Some(out) => model.write(out)?,
        None => print!("{}", model.to_bdf_string()?),
    }
    Ok(())
}

/// Example: read GRID coordinates, modify them externally, and set them back
///
/// Usage: cargo run -p bdfutil-core --example offset_grids -- [in.bdf]

use std::env;

use bdfutil_core::{BdfModel, ReadOptions};

fn main() -> bdfutil_core::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut model = match args.get(1) {
        Some(path) => BdfModel::read(path, &ReadOptions::default())?,
        None => BdfModel::parse(
            "GRID,1,,0.,0.,0.\nGRID,2,,1.,0.,0.\nGRID,3,,1.,1.,0.\n",
            &ReadOptions::default(),
        )?,
    };

    let mut points = model.node_coordinates();
    let mut coords = points.coordinates();
    for point in &mut coords {
        point.z += 1.0;
    }
    points.set_coordinates(&coords)?;
    model.set_node_coordinates(&points)?;

    for grid in model.grids() {
        println!("GRID {:>8}: {:>10.4} {:>10.4} {:>10.4}", grid.id, grid.xyz.x, grid.xyz.y, grid.xyz.z);
    }
    Ok(())
}

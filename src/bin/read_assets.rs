use mconvshell::{AssetPaths, ExampleField, GridAsset, RadiusSequence};
use std::env;

fn range(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

fn main() -> anyhow::Result<()> {
    let assets = env::args()
        .nth(1)
        .map(AssetPaths::in_dir)
        .unwrap_or_default();

    let grid = GridAsset::from_pickle(&assets.xygrid)?;
    println!("{:?}: {} points", assets.xygrid, grid.len());
    println!(" x: {:?}", range(grid.x()));
    println!(" y: {:?}", range(grid.y()));

    let radius = RadiusSequence::from_pickle(&assets.radius)?;
    println!(
        "{:?}: {} layers in {:?}",
        assets.radius,
        radius.len(),
        range(radius.as_slice())
    );

    let example = ExampleField::from_pickle(&assets.example)?;
    println!(
        "{:?}: {} values in {:?}",
        assets.example,
        example.values().len(),
        range(example.values())
    );
    if example.values().len() != grid.len() {
        println!(" ! example field and grid sizes differ");
    }

    Ok(())
}

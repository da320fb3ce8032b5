//! Debug tool for inspecting tile shapes visually
//! Renders every drivable exit combination into one contact sheet

use image::{GenericImage, ImageBuffer, Rgb, RgbImage};
use tilerace::direction::Direction;
use tilerace::export::render_tile_shape;
use tilerace::shape::synthesize_tile;
use tilerace::track::{Tile, TilePos};
use tilerace::TrackParams;

const CELL: u32 = 160;
const COLUMNS: u32 = 8;
const STANDARD: &[f32] = &[0.35];
const WIDE: &[f32] = &[0.8];
const MIXED: &[f32] = &[0.2, 0.5];

fn main() {
    env_logger::init();
    let params = TrackParams::default();

    // Exit subsets with no two exits 45 degrees apart
    let subsets: Vec<Vec<Direction>> = (1u16..256)
        .filter(|bits| {
            let b = *bits as u8;
            b & b.rotate_left(1) == 0
        })
        .map(|bits| {
            Direction::ALL
                .into_iter()
                .filter(|d| bits & (1 << d.index()) != 0)
                .collect()
        })
        .collect();

    println!("Rendering {} exit combinations...", subsets.len());

    for (label, widths) in [("standard", STANDARD), ("wide", WIDE), ("mixed", MIXED)] {
        let mut images: Vec<RgbImage> = Vec::new();
        for dirs in &subsets {
            let exits: Vec<(Direction, f32)> = dirs
                .iter()
                .enumerate()
                .map(|(i, &d)| (d, widths[i % widths.len()]))
                .collect();
            let tile = Tile::with_exits(&exits);
            let names: Vec<&str> = dirs.iter().map(|d| d.short_name()).collect();

            match synthesize_tile(TilePos::default(), &tile, &params) {
                Ok(Some(shape)) => {
                    println!(
                        "  {:<16} {:>2} segments {:>2} barriers",
                        names.join(","),
                        shape.boundary.segments.len(),
                        shape.barriers.len()
                    );
                    images.push(render_tile_shape(&shape, &params, CELL));
                }
                Ok(None) => images.push(blank(Rgb([0, 0, 0]))),
                Err(e) => {
                    println!("  {:<16} FAILED: {}", names.join(","), e);
                    images.push(blank(Rgb([255, 0, 255])));
                }
            }
        }

        let sheet = create_grid(&images, COLUMNS);
        let filename = format!("shapes_{}.png", label);
        match sheet.save(&filename) {
            Ok(()) => println!("Saved {} ({} x {})", filename, sheet.width(), sheet.height()),
            Err(e) => eprintln!("Failed to save {}: {}", filename, e),
        }
    }
}

fn blank(color: Rgb<u8>) -> RgbImage {
    ImageBuffer::from_pixel(CELL, CELL, color)
}

fn create_grid(images: &[RgbImage], columns: u32) -> RgbImage {
    let rows = (images.len() as u32 + columns - 1) / columns;
    let gap = 2;
    let width = columns * (CELL + gap) + gap;
    let height = rows * (CELL + gap) + gap;
    let mut grid: RgbImage = ImageBuffer::from_pixel(width, height, Rgb([20, 20, 20]));

    for (i, img) in images.iter().enumerate() {
        let col = i as u32 % columns;
        let row = i as u32 / columns;
        let x = gap + col * (CELL + gap);
        let y = gap + row * (CELL + gap);
        if let Err(e) = grid.copy_from(img, x, y) {
            eprintln!("Failed to place cell {}: {}", i, e);
        }
    }
    grid
}

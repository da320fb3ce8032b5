//! PNG preview export of synthesized track geometry
//!
//! Road surfaces, barriers and sensors are rasterised with an even-odd
//! scanline fill. Full-detail and minimap output use the same positional
//! math at different scales.

use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};

use crate::error::Result;
use crate::geometry::Point;
use crate::params::TrackParams;
use crate::sensor::Sensor;
use crate::shape::{TileShape, TrackGeometry};
use crate::track::CheckpointKind;

const BACKGROUND: Rgb<u8> = Rgb([46, 94, 52]);
const ROAD: Rgb<u8> = Rgb([88, 88, 92]);
const BARRIER: Rgb<u8> = Rgb([200, 40, 40]);
const START: Rgb<u8> = Rgb([245, 245, 245]);
const CHECKPOINT: Rgb<u8> = Rgb([240, 200, 40]);
const GRID: Rgb<u8> = Rgb([60, 110, 66]);

/// Output scale and layers
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderOptions {
    pub pixels_per_unit: f32,
    /// Border around the track bounds, in pixels
    pub margin: u32,
    pub barriers: bool,
    pub sensors: bool,
    pub grid: bool,
}

impl RenderOptions {
    /// Full-detail preview
    pub fn full() -> Self {
        Self {
            pixels_per_unit: 2.0,
            margin: 16,
            barriers: true,
            sensors: true,
            grid: true,
        }
    }

    /// Small overview: road and sensors only
    pub fn minimap() -> Self {
        Self {
            pixels_per_unit: 0.25,
            margin: 2,
            barriers: false,
            sensors: true,
            grid: false,
        }
    }

    pub fn with_scale(mut self, pixels_per_unit: f32) -> Self {
        self.pixels_per_unit = pixels_per_unit;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::full()
    }
}

/// World-to-pixel mapping
#[derive(Clone, Copy, Debug)]
struct Viewport {
    min: Point,
    scale: f32,
    margin: f32,
}

impl Viewport {
    fn to_pixel(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.min.x) * self.scale + self.margin,
            (p.y - self.min.y) * self.scale + self.margin,
        )
    }
}

/// Rasterise a whole track.
pub fn render_track(geometry: &TrackGeometry, params: &TrackParams, options: &RenderOptions) -> RgbImage {
    let (min, max) = geometry.bounds();
    let view = Viewport {
        min,
        scale: options.pixels_per_unit,
        margin: options.margin as f32,
    };
    let width = ((max.x - min.x) * view.scale).ceil() as u32 + 2 * options.margin;
    let height = ((max.y - min.y) * view.scale).ceil() as u32 + 2 * options.margin;
    let mut img: RgbImage = ImageBuffer::from_pixel(width.max(1), height.max(1), BACKGROUND);

    if options.grid {
        draw_grid(&mut img, &view, params.tile_size, min, max);
    }
    for shape in &geometry.shapes {
        draw_shape(&mut img, &view, shape, params, options.barriers);
    }
    if options.sensors {
        draw_sensor(&mut img, &view, &geometry.start);
        for sensor in &geometry.checkpoints {
            draw_sensor(&mut img, &view, sensor);
        }
    }
    img
}

/// Rasterise one tile-local shape into a square image `size` pixels wide.
pub fn render_tile_shape(shape: &TileShape, params: &TrackParams, size: u32) -> RgbImage {
    let margin = (size / 8) as f32;
    let scale = (size as f32 - 2.0 * margin) / params.tile_size;
    let half = params.half_tile();
    let view = Viewport {
        min: Point::new(-half, -half),
        scale,
        margin,
    };
    let mut img: RgbImage = ImageBuffer::from_pixel(size, size, BACKGROUND);
    draw_grid(&mut img, &view, params.tile_size, view.min, Point::new(half, half));
    draw_shape(&mut img, &view, shape, params, true);
    img
}

pub fn export_png(
    geometry: &TrackGeometry,
    params: &TrackParams,
    options: &RenderOptions,
    path: &Path,
) -> Result<()> {
    let img = render_track(geometry, params, options);
    img.save(path)?;
    log::info!("wrote {}x{} preview to {}", img.width(), img.height(), path.display());
    Ok(())
}

fn draw_shape(img: &mut RgbImage, view: &Viewport, shape: &TileShape, params: &TrackParams, barriers: bool) {
    let outline: Vec<Point> = shape
        .outline(params)
        .into_iter()
        .map(|p| view.to_pixel(p))
        .collect();
    fill_polygon(img, &outline, ROAD);

    if barriers {
        for barrier in &shape.barriers {
            let points: Vec<Point> = barrier.points.iter().map(|&p| view.to_pixel(p)).collect();
            fill_polygon(img, &points, BARRIER);
        }
    }
}

fn draw_sensor(img: &mut RgbImage, view: &Viewport, sensor: &Sensor) {
    let color = match sensor.kind {
        CheckpointKind::Start => START,
        CheckpointKind::Numbered(_) => CHECKPOINT,
    };
    let points: Vec<Point> = sensor.corners().iter().map(|&p| view.to_pixel(p)).collect();
    fill_polygon(img, &points, color);
}

/// Tile boundary lines covering the world rectangle `min..max`.
fn draw_grid(img: &mut RgbImage, view: &Viewport, tile_size: f32, min: Point, max: Point) {
    let half = tile_size / 2.0;
    let first_x = ((min.x - half) / tile_size).floor() as i32;
    let last_x = ((max.x - half) / tile_size).ceil() as i32;
    let first_y = ((min.y - half) / tile_size).floor() as i32;
    let last_y = ((max.y - half) / tile_size).ceil() as i32;

    for i in first_x..=last_x {
        let x = view.to_pixel(Point::new(i as f32 * tile_size + half, 0.0)).x.round();
        if x >= 0.0 && (x as u32) < img.width() {
            for y in 0..img.height() {
                img.put_pixel(x as u32, y, GRID);
            }
        }
    }
    for j in first_y..=last_y {
        let y = view.to_pixel(Point::new(0.0, j as f32 * tile_size + half)).y.round();
        if y >= 0.0 && (y as u32) < img.height() {
            for x in 0..img.width() {
                img.put_pixel(x, y as u32, GRID);
            }
        }
    }
}

/// Even-odd scanline fill, sampling pixel centres.
pub fn fill_polygon(img: &mut RgbImage, points: &[Point], color: Rgb<u8>) {
    if points.len() < 3 {
        return;
    }
    let min_y = points.iter().map(|p| p.y).fold(f32::MAX, f32::min).floor().max(0.0) as u32;
    let max_y = points
        .iter()
        .map(|p| p.y)
        .fold(f32::MIN, f32::max)
        .ceil()
        .min(img.height() as f32) as u32;

    let mut crossings: Vec<f32> = Vec::new();
    for row in min_y..max_y {
        let y = row as f32 + 0.5;
        crossings.clear();
        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            if (a.y <= y) != (b.y <= y) {
                crossings.push(a.x + (y - a.y) / (b.y - a.y) * (b.x - a.x));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));
        for span in crossings.chunks_exact(2) {
            let start = (span[0] - 0.5).ceil().max(0.0) as u32;
            let end = (span[1] - 0.5).floor().min(img.width() as f32 - 1.0);
            if end < 0.0 {
                continue;
            }
            for x in start..=end as u32 {
                img.put_pixel(x, row, color);
            }
        }
    }
}

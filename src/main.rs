use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tilerace::ascii;
use tilerace::export::{self, RenderOptions};
use tilerace::persistence;
use tilerace::sensor::StartGrid;
use tilerace::track::{samples, CheckpointKind, TilePos};
use tilerace::{RaceRoutes, Result, Track, TrackGeometry, TrackParams};

#[derive(Parser, Debug)]
#[command(name = "tilerace")]
#[command(about = "Synthesize racetrack geometry and routes from a tile exit graph")]
struct Args {
    /// Track file to load (JSON). Uses a built-in sample if not given
    #[arg(short, long)]
    track: Option<PathBuf>,

    /// Built-in sample track: "oval" or "square"
    #[arg(long, default_value = "oval")]
    sample: String,

    /// Geometry parameters file (JSON); missing fields use defaults
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Print the exit graph as ASCII
    #[arg(long)]
    ascii: bool,

    /// Write the ASCII view to a text file
    #[arg(long)]
    export_ascii: Option<PathBuf>,

    /// Export a PNG preview (specify output path)
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Render the PNG as a minimap instead of full detail
    #[arg(long)]
    minimap: bool,

    /// Override pixels per world unit for the PNG
    #[arg(long)]
    scale: Option<f32>,

    /// Save the track as JSON (specify output path)
    #[arg(long)]
    save: Option<PathBuf>,

    /// Drive from this tile ("x,y") to the start line, breaking ties at random
    #[arg(long)]
    route_from: Option<String>,

    /// Random seed for tie breaking (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of cars to lay out on the start grid
    #[arg(long, default_value = "8")]
    cars: usize,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let params = match &args.params {
        Some(path) => TrackParams::from_json_file(path)?,
        None => TrackParams::default(),
    };
    params.validate()?;

    let track = load(args)?;
    println!("Track: {} ({})", track.name(), track.material());
    println!(
        "Grid: {}x{} from {}, {} tiles, {} checkpoints",
        track.width(),
        track.height(),
        track.origin(),
        track.tile_count(),
        track.checkpoints().len()
    );

    if args.ascii {
        println!();
        print!("{}", ascii::render_track(&track));
        println!();
    }
    if let Some(path) = &args.export_ascii {
        ascii::export_ascii(&track, path)?;
        println!("Wrote ASCII view to {}", path.display());
    }

    println!("Synthesizing geometry...");
    let geometry = TrackGeometry::synthesize(&track, &params)?;
    let segments: usize = geometry.shapes.iter().map(|s| s.boundary.segments.len()).sum();
    println!(
        "  {} tile shapes, {} boundary segments, {} barrier pieces",
        geometry.shapes.len(),
        segments,
        geometry.barrier_count()
    );
    let (min, max) = geometry.bounds();
    println!(
        "  World bounds: ({:.1}, {:.1}) to ({:.1}, {:.1})",
        min.x, min.y, max.x, max.y
    );

    let start_tile = track
        .tile(track.start().tile)
        .ok_or(tilerace::TrackError::MissingStartTile(track.start().tile))?;
    let grid = StartGrid::layout(start_tile, track.start(), &params, args.cars)?
        .translated(track.start().tile.center(params.tile_size));
    println!(
        "  Start grid: {} rows of {} cells behind {} facing {}",
        grid.rows,
        grid.per_row,
        track.start().tile,
        track.start().direction
    );

    println!("Building route tables...");
    let routes = RaceRoutes::build(&track);
    for checkpoint in track.all_checkpoints() {
        let Some(finder) = routes.for_target(checkpoint.kind) else {
            continue;
        };
        let reachable = track.tiles().filter(|(pos, _)| finder.cost(*pos).is_some()).count();
        println!(
            "  {} at {} facing {}: {}/{} tiles reachable",
            checkpoint.kind,
            checkpoint.tile,
            checkpoint.direction,
            reachable,
            track.tile_count()
        );
    }

    if let Some(from) = &args.route_from {
        let seed = args.seed.unwrap_or_else(rand::random);
        drive(&track, &routes, TilePos::from_key(from)?, seed);
    }

    if let Some(path) = &args.export {
        let mut options = if args.minimap {
            RenderOptions::minimap()
        } else {
            RenderOptions::full()
        };
        if let Some(scale) = args.scale {
            options = options.with_scale(scale);
        }
        export::export_png(&geometry, &params, &options, path)?;
        println!("Exported preview to {}", path.display());
    }

    if let Some(path) = &args.save {
        persistence::save_track(&track, path)?;
        println!("Saved track to {}", path.display());
    }

    Ok(())
}

fn load(args: &Args) -> Result<Track> {
    if let Some(path) = &args.track {
        return persistence::load_track(path);
    }
    match args.sample.as_str() {
        "square" => samples::square_loop(),
        _ => samples::oval(),
    }
}

/// Follow the start-line route from `from`, printing each tile.
fn drive(track: &Track, routes: &RaceRoutes, from: TilePos, seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    println!("Driving from {} to the start line (seed {}):", from, seed);

    let Some(finder) = routes.for_target(CheckpointKind::Start) else {
        return;
    };
    let Some(cost) = finder.cost(from) else {
        println!("  no route");
        return;
    };

    let mut current = from;
    let mut steps = 0;
    while current != finder.target() && steps <= track.tile_count() {
        let Some(direction) = finder.choose_step(current, &mut rng) else {
            break;
        };
        let next = current.step(direction);
        println!("  {} -> {} via {}", current, next, direction);
        current = next;
        steps += 1;
    }
    println!("  {} steps, cost {:.3}", steps, cost);
}

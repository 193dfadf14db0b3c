//! Headless skirmish over generated isometric terrain
//!
//! Usage: cargo run --release -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>    JSON battlefield config (default: built-in defaults)
//!   --seed <SEED>      Override the terrain and physics seeds
//!   --shots <N>        Shells in the volley (default: 8)
//!   --speed <U/S>      Muzzle speed in world units per second (default: 300)
//!   --seconds <S>      Simulated time (default: 20)
//!   --tileset <PATH>   Validate a tileset metadata file before starting
//!   --pack <DIR>       Write terrain.png / terrain.json into DIR

use std::path::PathBuf;
use std::time::Instant;

use glam::{Vec2, Vec3};

use isobattle::config::BattlefieldConfig;
use isobattle::core::{Result, logging};
use isobattle::math::projection::Perspective;
use isobattle::physics::{Battlefield, ShellSpec, SimEvent};
use isobattle::terrain::{Terrain, TilesetMeta};

const FRAME_DT: f32 = 1.0 / 60.0;
/// Half the viewport, in screen units, around the map centre
const VIEW_HALF_EXTENT: Vec2 = Vec2::new(640.0, 360.0);
const LAUNCH_ELEVATION_DEG: f32 = 35.0;

fn main() {
    logging::init();
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let shots = parse_usize_arg(&args, "--shots").unwrap_or(8);
    let speed = parse_f32_arg(&args, "--speed").unwrap_or(300.0);
    let seconds = parse_f32_arg(&args, "--seconds").unwrap_or(20.0);

    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => BattlefieldConfig::load(&PathBuf::from(path))?,
        None => BattlefieldConfig::default(),
    };
    if let Some(seed) = parse_u32_arg(&args, "--seed") {
        config.terrain.heightmap.seed = seed;
        config.physics.seed = seed as u64;
    }
    config.validate()?;

    if let Some(path) = parse_str_arg(&args, "--tileset") {
        let tileset = TilesetMeta::load(&PathBuf::from(path))?;
        log::info!("Tileset OK ({} slope tiles)", tileset.tiles.len());
    }

    let terrain = Terrain::generate(&config.terrain)?;
    if let Some(dir) = parse_str_arg(&args, "--pack") {
        let detail = terrain.detail_raster(config.terrain.detail_blur_radius, config.terrain.detail_blur_passes)?;
        detail.pack().save(&PathBuf::from(dir))?;
    }

    let perspective = config.projection.perspective();
    let center = terrain.center();
    let focus = perspective.world_to_screen(center);
    let is_visible = |world: Vec3| {
        let offset = (perspective.world_to_screen(world) - focus).abs();
        offset.x <= VIEW_HALF_EXTENT.x && offset.y <= VIEW_HALF_EXTENT.y
    };

    let mut field = Battlefield::new(config.physics.clone());
    let muzzle = center + Vec3::Z * 2.0;
    let elevation = LAUNCH_ELEVATION_DEG.to_radians();
    let spec = ShellSpec::default();
    for i in 0..shots {
        let heading = i as f32 / shots.max(1) as f32 * std::f32::consts::TAU;
        let direction = Vec3::new(
            heading.cos() * elevation.cos(),
            heading.sin() * elevation.cos(),
            elevation.sin(),
        );
        field.fire(muzzle, direction, speed, &spec);
    }
    log::info!("Fired {} shells at {:.0} u/s from {}", shots, speed, muzzle);

    let start = Instant::now();
    let ground = terrain.query();
    let mut summary = Summary::default();
    let frames = (seconds / FRAME_DT).ceil() as usize;
    for _ in 0..frames {
        for event in field.tick(FRAME_DT, &ground, &is_visible) {
            summary.record(&event, &perspective);
        }
        if field.projectile_count() == 0 {
            break;
        }
    }

    log::info!(
        "Simulated {:.1}s in {:.1}ms: {} impacts ({:.4} kg TNT), {} bounces, {} at rest, {} lost, {} despawned",
        seconds,
        start.elapsed().as_secs_f64() * 1000.0,
        summary.impacts,
        summary.energy,
        summary.bounces,
        summary.rests,
        summary.lost,
        summary.despawned
    );
    Ok(())
}

#[derive(Default)]
struct Summary {
    impacts: usize,
    energy: f32,
    bounces: usize,
    rests: usize,
    lost: usize,
    despawned: usize,
}

impl Summary {
    fn record(&mut self, event: &SimEvent, perspective: &Perspective) {
        match event {
            SimEvent::Impact { id, position, energy } => {
                let screen = perspective.world_to_screen(*position);
                log::info!("{:?} hit at {} (screen {}) with {:.5} kg TNT", id, position, screen, energy);
                self.impacts += 1;
                self.energy += energy;
            }
            SimEvent::Bounce { .. } => self.bounces += 1,
            SimEvent::Rest { id, position } => {
                log::debug!("{:?} came to rest at {}", id, position);
                self.rests += 1;
            }
            SimEvent::OutOfBounds { .. } => self.lost += 1,
            SimEvent::Despawned { .. } => self.despawned += 1,
            SimEvent::TargetHit { .. } => {}
        }
    }
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

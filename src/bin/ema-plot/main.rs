//! # EMA Plot
//!
//! Quick visual check of a recording before it goes anywhere near the rig:
//! each part's trajectory in three 2D projections, plus the selected part's
//! axes over time.
use anyhow::{anyhow, Result};
use clap::Parser;
use env_logger::Env;
use indexmap::IndexMap;
use log::debug;

use ema_mouth_rig::{
    ingestion::{load_raw_frames, split_channels},
    parts::{PartLabel, SensorLayout},
    rig_config::load_config_from_file,
    systems::normalization::{NormalizeSettings, Normalizer},
    Point3D,
};
use model::{Model, SCENE_AXES, SENSOR_AXES};

mod cli;
mod model;

use crate::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger from the environment

    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level))
        .filter_module("winit", log::LevelFilter::Warn)
        .filter_module("eframe", log::LevelFilter::Warn)
        .init();

    debug!("Started; args: {:?}", cli);

    let config = load_config_from_file(&cli.config_path)?;
    let selected: PartLabel = cli.part.parse()?;

    let raw = load_raw_frames(&cli.ema_data)?;
    let mut channels = split_channels(&raw, &SensorLayout::default())?;

    let (tracks, axis_names) = if cli.raw {
        let tracks: IndexMap<PartLabel, Vec<Point3D>> = channels
            .into_iter()
            .map(|c| (c.label, c.positions))
            .collect();
        (tracks, SENSOR_AXES)
    } else {
        let reprojection = Normalizer::new(NormalizeSettings::default()).run(&mut channels)?;
        let tracks: IndexMap<PartLabel, Vec<Point3D>> = reprojection
            .keyframes
            .iter()
            .map(|(label, keys)| (*label, keys.iter().map(|k| k.position()).collect()))
            .collect();
        (tracks, SCENE_AXES)
    };

    if let Some(track) = tracks.get(&selected) {
        debug!("{} frame 1: {:?}", selected, track.get(1).map(|p| p.as_slice()));
    }

    let model = Model::new(tracks, &config, selected, axis_names);

    let options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(1280.0, 960.0)),
        ..Default::default()
    };
    eframe::run_native(
        "EMA Plot",
        options,
        Box::new(move |_cc| Box::new(model)),
    )
    .map_err(|e| anyhow!("Viewer failed: {}", e))
}

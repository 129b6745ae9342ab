use std::path::{self, Path};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{debug, info};

use ema_mouth_rig::{
    export::export_keyframes,
    ingestion::load_raw_frames,
    mel_script::run_host_batch,
    rig_config::load_config_from_file,
    systems::{
        encode::encode_rendered,
        normalization::{DemeanMode, NormalizeSettings},
        Systems,
    },
};

mod cli;

use crate::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger from the environment

    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level)).init();

    debug!("Started; args: {:?}", cli);

    let config = load_config_from_file(&cli.config_path)?;
    if cli.write_config {
        config.write_config_to_file(&cli.config_path)?;
    }

    let settings = NormalizeSettings {
        demean_mode: if cli.per_part_demean {
            DemeanMode::PerPart
        } else {
            DemeanMode::Pooled
        },
        strict_finite: cli.strict,
    };
    let systems = Systems::new(&config, settings);

    // Everything that can reject the input happens before the host is involved
    let raw = load_raw_frames(&cli.ema_data)?;
    let reprojection = systems
        .prepare(&raw)
        .with_context(|| format!("Rejected EMA data from {}", cli.ema_data))?;

    if let Some(keyframes_path) = &cli.keyframes_out {
        export_keyframes(keyframes_path, &reprojection.keyframes)?;
    }

    let scene_path = path::absolute(&cli.output_mb)
        .with_context(|| format!("Bad output scene path {}", cli.output_mb))?;
    let script_path = match &cli.script_out {
        Some(p) => Path::new(p).to_path_buf(),
        None => scene_path.with_extension("mel"),
    };

    let script = systems.build_script(&reprojection, &config, &scene_path.to_string_lossy())?;
    script.write_to(&script_path)?;

    let rendered = match &cli.maya_bin {
        Some(maya_bin) => {
            run_host_batch(maya_bin, &script_path)?;
            true
        }
        None => {
            info!(
                "No host given; run the script with `maya -batch -script {}`",
                script_path.display()
            );
            false
        }
    };

    if cli.skip_encode {
        info!("Skipping encode");
    } else if let Some(output) = encode_rendered(
        &systems.encoder,
        &config,
        &cli.ema_data,
        &cli.input_wav,
        rendered,
    )? {
        info!("Done; video written to {}", output);
    }

    Ok(())
}

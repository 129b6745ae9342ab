use std::{path::Path, process::Command};

use anyhow::{anyhow, Context, Result};
use log::{debug, info};

use crate::rig_config::RigConfig;

pub trait VideoEncoder {
    /// Turn a numbered image sequence into a video
    fn encode_sequence(&self, pattern: &str, fps: u32, output: &str) -> Result<()>;
    /// Combine a video with an audio track into a new file
    fn mux_audio(&self, video: &str, audio: &str, output: &str) -> Result<()>;
}

pub struct FfmpegEncoder {
    binary: String,
    codec: String,
    bitrate: String,
}

impl FfmpegEncoder {
    pub fn new(binary: &str, codec: &str, bitrate: &str) -> Self {
        FfmpegEncoder {
            binary: String::from(binary),
            codec: String::from(codec),
            bitrate: String::from(bitrate),
        }
    }

    pub fn from_config(config: &RigConfig) -> Self {
        FfmpegEncoder::new(
            &config.ffmpeg_path,
            &config.video_codec,
            &config.video_bitrate,
        )
    }

    pub fn sequence_args(&self, pattern: &str, fps: u32, output: &str) -> Vec<String> {
        let fps = fps.to_string();
        [
            "-f",
            "image2",
            "-r",
            fps.as_str(),
            "-i",
            pattern,
            "-vcodec",
            self.codec.as_str(),
            "-y",
            "-vb",
            self.bitrate.as_str(),
            output,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    pub fn mux_args(&self, video: &str, audio: &str, output: &str) -> Vec<String> {
        [
            "-i", video, "-i", audio, "-c", "copy", "-c:a", "aac", "-y", output,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn run(&self, args: &[String]) -> Result<()> {
        debug!("Running {} {}", self.binary, args.join(" "));
        let status = Command::new(&self.binary)
            .args(args)
            .status()
            .with_context(|| format!("Failed to execute {}", self.binary))?;
        if status.success() {
            Ok(())
        } else {
            Err(anyhow!(
                "{} returned non-zero exit code: {:?}",
                self.binary,
                status.code()
            ))
        }
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn encode_sequence(&self, pattern: &str, fps: u32, output: &str) -> Result<()> {
        self.run(&self.sequence_args(pattern, fps, output))?;
        info!("Encoded {} at {} fps into {}", pattern, fps, output);
        Ok(())
    }

    fn mux_audio(&self, video: &str, audio: &str, output: &str) -> Result<()> {
        self.run(&self.mux_args(video, audio, output))?;
        info!("Muxed {} + {} into {}", video, audio, output);
        Ok(())
    }
}

/// Where the silent video goes: configured, or next to the EMA data.
pub fn silent_video_path(config: &RigConfig, ema_data: &str) -> String {
    if !config.silent_video_path.is_empty() {
        return config.silent_video_path.clone();
    }
    Path::new(ema_data)
        .with_extension("mp4")
        .to_string_lossy()
        .into_owned()
}

/// Image sequence to video, then video + audio to the final output.
pub fn encode_and_mux(
    encoder: &dyn VideoEncoder,
    config: &RigConfig,
    ema_data: &str,
    audio: &str,
) -> Result<String> {
    let pattern = Path::new(&config.image_dir)
        .join(&config.image_pattern)
        .to_string_lossy()
        .into_owned();
    let silent = silent_video_path(config, ema_data);

    encoder.encode_sequence(&pattern, config.frame_rate, &silent)?;
    encoder.mux_audio(&silent, audio, &config.output_video_path)?;
    Ok(config.output_video_path.clone())
}

/// Encode only frames rendered by this run. Without a render, whatever sits
/// in the image directory belongs to an earlier recording.
pub fn encode_rendered(
    encoder: &dyn VideoEncoder,
    config: &RigConfig,
    ema_data: &str,
    audio: &str,
    rendered: bool,
) -> Result<Option<String>> {
    if !rendered {
        info!("Nothing rendered in this run; skipping encode");
        return Ok(None);
    }
    if !Path::new(&config.image_dir).exists() {
        return Err(anyhow!(
            "Render finished but no frames were written to {}",
            config.image_dir
        ));
    }
    encode_and_mux(encoder, config, ema_data, audio).map(Some)
}

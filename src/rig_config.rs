use std::fs;

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RigConfig {
    // -------- SCENE SETTINGS
    /// Rig scene imported after the tongue plane and clusters are built
    pub rig_scene_path: String,

    /// Host time unit; "palf" is 50 fps
    pub time_unit: String,

    // -------- RENDER SETTINGS
    pub camera: String,
    pub camera_shape: String,
    pub renderer: String,
    pub width: u32,
    pub height: u32,

    /// First frame rendered (inclusive)
    pub render_start: u32,
    /// Last frame rendered (exclusive)
    pub render_end: u32,

    /// Where the host writes rendered frames
    pub image_dir: String,

    /// printf-style name of each frame, relative to image_dir
    pub image_pattern: String,

    // -------- ENCODE SETTINGS
    pub frame_rate: u32,
    pub ffmpeg_path: String,
    pub video_codec: String,
    pub video_bitrate: String,

    /// Video without audio; if empty, the EMA data path with an .mp4 extension
    pub silent_video_path: String,
    pub output_video_path: String,

    // -------- VIEWER SETTINGS
    /// Hex colour per part label, for plots
    pub part_colours: IndexMap<String, String>,
}

impl Default for RigConfig {
    fn default() -> Self {
        let part_colours = [
            ("td", "#e6194b"),
            ("tb", "#3cb44b"),
            ("br", "#ffe119"),
            ("bl", "#4363d8"),
            ("tt", "#f58231"),
            ("ul", "#911eb4"),
            ("lc", "#42d4f4"),
            ("ll", "#f032e6"),
            ("li", "#bfef45"),
            ("lj", "#fabed4"),
        ]
        .into_iter()
        .map(|(k, v)| (String::from(k), String::from(v)))
        .collect();

        RigConfig {
            rig_scene_path: String::from("../tongue.mb"),
            time_unit: String::from("palf"),
            camera: String::from("camera2"),
            camera_shape: String::from("cameraShape2"),
            renderer: String::from("mayaHardware2"),
            width: 1920,
            height: 1080,
            render_start: 0,
            render_end: 250,
            image_dir: String::from("./images/camera2"),
            image_pattern: String::from("%01d.png"),
            frame_rate: 50,
            ffmpeg_path: String::from("ffmpeg"),
            video_codec: String::from("mpeg4"),
            video_bitrate: String::from("40M"),
            silent_video_path: String::new(),
            output_video_path: String::from("output.mp4"),
            part_colours,
        }
    }
}

impl RigConfig {
    pub fn validate(&self) -> Result<()> {
        if self.render_end <= self.render_start {
            return Err(anyhow!(
                "Render range is empty: {}..{}",
                self.render_start,
                self.render_end
            ));
        }
        if self.frame_rate == 0 {
            return Err(anyhow!("Frame rate must be above 0"));
        }
        Ok(())
    }

    pub fn part_colour(&self, label: &str) -> Option<&str> {
        self.part_colours.get(label).map(String::as_str)
    }

    pub fn write_config_to_file(&self, config_file_path: &str) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(config_file_path, text)
            .with_context(|| format!("Error writing config to file {}", config_file_path))?;
        info!("Wrote config to file: {:?}", config_file_path);
        Ok(())
    }
}

/// Load the config, falling back to defaults when the file does not exist.
pub fn load_config_from_file(config_file_path: &str) -> Result<RigConfig> {
    match fs::read_to_string(config_file_path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(
                "Rig Config file not found at {}, using defaults",
                config_file_path
            );
            Ok(RigConfig::default())
        }
        Err(e) => Err(anyhow!(
            "Failed to load Rig Config from {}: {}",
            config_file_path,
            e
        )),
        Ok(s) => {
            info!("Loaded Rig Config OK from \"{}\"", config_file_path);
            let config = serde_json::from_str::<RigConfig>(&s)
                .map_err(|e| anyhow!("Failed to parse config data: {}", e))?;
            debug!("Config parsed data from file: {:?}", &config);
            config.validate()?;
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nothing-here.json");
        let config = load_config_from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config, RigConfig::default());
        assert_eq!(config.render_end - config.render_start, 250);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rig.json");
        fs::write(&path, r#"{ "frameRate": 25, "camera": "front" }"#).unwrap();

        let config = load_config_from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.frame_rate, 25);
        assert_eq!(config.camera, "front");
        assert_eq!(config.renderer, "mayaHardware2");
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rig.json");
        let path = path.to_str().unwrap();

        let mut config = RigConfig::default();
        config.render_end = 10;
        config.part_colours.insert("td".into(), "#000000".into());
        config.write_config_to_file(path).unwrap();

        let loaded = load_config_from_file(path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.part_colour("td"), Some("#000000"));
    }

    #[test]
    fn test_bad_range_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rig.json");
        fs::write(&path, r#"{ "renderStart": 10, "renderEnd": 10 }"#).unwrap();
        assert!(load_config_from_file(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_unparseable_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rig.json");
        fs::write(&path, "not json").unwrap();
        assert!(load_config_from_file(path.to_str().unwrap()).is_err());
    }
}

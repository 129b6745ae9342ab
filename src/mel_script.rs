//! Host adapter: records rig and render commands as a MEL script that Maya
//! runs in batch mode (`maya -batch -script <file>`).

use std::{fmt::Display, fs, path::Path, process::Command};

use anyhow::{anyhow, Context, Result};
use log::{debug, info};

use crate::{
    parts::SensorLayout,
    rig_config::RigConfig,
    systems::{
        render::{RenderPlan, RenderSink},
        rig_drive::{Channel, RigSink},
    },
};

/// Name of the helper plane the tongue clusters are built on
pub const TONGUE_PLANE: &str = "tonguePlane";

#[derive(Debug, Default)]
pub struct MelScript {
    lines: Vec<String>,
}

/// MEL string literal, with quotes and backslashes escaped
pub fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

impl MelScript {
    pub fn new() -> Self {
        MelScript::default()
    }

    fn push<S: Display>(&mut self, line: S) {
        self.lines.push(line.to_string());
    }

    pub fn comment(&mut self, text: &str) {
        self.push(format!("// {}", text));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Fresh scene, the tongue plane with one cluster per tongue vertex,
    /// then the rig itself.
    pub fn scene_preamble(&mut self, config: &RigConfig, layout: &SensorLayout) {
        self.comment("scene setup");
        self.push("file -force -newFile;");
        self.push(format!("currentUnit -time {};", quote(&config.time_unit)));
        self.push(format!(
            "polyPlane -sx 1 -sy 1 -n {};",
            quote(TONGUE_PLANE)
        ));
        self.push(format!("polySplit -ip 1 0 -ip 3 1 {};", quote(TONGUE_PLANE)));
        self.push(format!("polySplit -ip 2 0 -ip 3 0 {};", quote(TONGUE_PLANE)));
        self.push(format!("rotate 0 45 0 {};", quote(TONGUE_PLANE)));

        for (vertex, part) in layout.tongue_parts().iter().enumerate() {
            self.push(format!("select -r {}.vtx[{}];", TONGUE_PLANE, vertex));
            self.push(format!("cluster -name {};", quote(part.label.as_str())));
        }

        self.push(format!("file -import {};", quote(&config.rig_scene_path)));
    }

    pub fn render_globals(&mut self, plan: &RenderPlan) {
        self.comment("render settings");
        self.push(format!(
            "setAttr {} true;",
            quote(&format!("{}.renderable", plan.camera_shape))
        ));
        self.push(format!(
            "setAttr -type \"string\" defaultRenderGlobals.currentRenderer {};",
            quote(&plan.renderer)
        ));
        self.push(format!("setAttr defaultResolution.width {};", plan.width));
        self.push(format!("setAttr defaultResolution.height {};", plan.height));
        self.push(format!("hide {};", quote(TONGUE_PLANE)));
    }

    pub fn save_scene(&mut self, scene_path: &str) {
        self.comment("save");
        self.push(format!("file -rename {};", quote(scene_path)));
        self.push("file -save -type \"mayaBinary\" -force;");
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut text = self.lines.join("\n");
        text.push('\n');
        fs::write(path, text).with_context(|| format!("Failed to write script to {:?}", path))?;
        info!("Wrote {} MEL commands to {:?}", self.lines.len(), path);
        Ok(())
    }
}

impl RigSink for MelScript {
    fn clear_animation(&mut self, control: &str, channel: Channel) {
        self.push(format!(
            "cutKey -time \":\" -attribute {} {};",
            quote(channel.attribute()),
            quote(control)
        ));
    }

    fn set_keyframe(&mut self, control: &str, channel: Channel, frame: u32, value: f64) {
        self.push(format!(
            "setKeyframe -time {} -attribute {} -value {} {};",
            frame,
            quote(channel.attribute()),
            value,
            quote(control)
        ));
    }

    fn constrain_control(&mut self, control: &str, target: &str, maintain_offset: bool) {
        let flag = if maintain_offset { "-mo " } else { "" };
        self.push(format!(
            "parentConstraint {}{} {};",
            flag,
            quote(control),
            quote(target)
        ));
    }
}

impl RenderSink for MelScript {
    fn render_frame(&mut self, camera: &str, frame: u32) {
        self.push(format!("currentTime {};", frame));
        self.push(format!(
            "setAttr -type \"string\" defaultRenderGlobals.imageFilePrefix {};",
            quote(&frame.to_string())
        ));
        self.push(format!("ogsRender -cam {};", quote(camera)));
    }
}

/// Run the host application in batch mode on a script.
pub fn run_host_batch(binary: &str, script: &Path) -> Result<()> {
    debug!("Running {} -batch -script {:?}", binary, script);
    let status = Command::new(binary)
        .arg("-batch")
        .arg("-script")
        .arg(script)
        .status()
        .with_context(|| format!("Failed to execute {}", binary))?;

    if status.success() {
        info!("Host batch run finished OK");
        Ok(())
    } else {
        Err(anyhow!(
            "{} returned non-zero exit code: {:?}",
            binary,
            status.code()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::render::render_frames;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
        assert_eq!(quote("C:\\maya\\x.mb"), "\"C:\\\\maya\\\\x.mb\"");
    }

    #[test]
    fn test_rig_commands() {
        let mut script = MelScript::new();
        script.clear_animation("tdHandle", Channel::Z);
        script.set_keyframe("tdHandle", Channel::Y, 3, 2.85);
        script.constrain_control("tdHandle", "tongue_td", true);
        script.constrain_control("a", "b", false);
        assert_eq!(
            script.lines(),
            &[
                "cutKey -time \":\" -attribute \"translateZ\" \"tdHandle\";",
                "setKeyframe -time 3 -attribute \"translateY\" -value 2.85 \"tdHandle\";",
                "parentConstraint -mo \"tdHandle\" \"tongue_td\";",
                "parentConstraint \"a\" \"b\";",
            ]
        );
    }

    #[test]
    fn test_preamble_builds_one_cluster_per_tongue_part() {
        let mut script = MelScript::new();
        script.scene_preamble(&RigConfig::default(), &SensorLayout::default());
        let clusters: Vec<&String> = script
            .lines()
            .iter()
            .filter(|l| l.starts_with("cluster"))
            .collect();
        assert_eq!(clusters.len(), 5);
        assert_eq!(clusters[0], "cluster -name \"tt\";");
        assert!(script
            .lines()
            .iter()
            .any(|l| l == "currentUnit -time \"palf\";"));
        assert_eq!(
            script.lines().last().unwrap(),
            "file -import \"../tongue.mb\";"
        );
    }

    #[test]
    fn test_render_loop_commands() {
        let mut script = MelScript::new();
        let config = RigConfig {
            render_end: 2,
            ..Default::default()
        };
        render_frames(&mut script, &RenderPlan::from_config(&config));
        assert_eq!(
            script.lines(),
            &[
                "currentTime 0;",
                "setAttr -type \"string\" defaultRenderGlobals.imageFilePrefix \"0\";",
                "ogsRender -cam \"camera2\";",
                "currentTime 1;",
                "setAttr -type \"string\" defaultRenderGlobals.imageFilePrefix \"1\";",
                "ogsRender -cam \"camera2\";",
            ]
        );
    }

    #[test]
    fn test_write_script() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rig.mel");
        let mut script = MelScript::new();
        script.save_scene("/tmp/0899.mb");
        script.write_to(&path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("file -rename \"/tmp/0899.mb\";"));
        assert!(text.ends_with("-force;\n"));
    }
}

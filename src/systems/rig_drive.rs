use anyhow::{anyhow, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::parts::SensorLayout;

use super::{
    jaw::relative_to_first,
    normalization::{Keyframe, KeyframeSet},
};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    X,
    Y,
    Z,
}

pub const TRANSLATE_CHANNELS: [Channel; 3] = [Channel::X, Channel::Y, Channel::Z];

impl Channel {
    /// Name of the translation attribute on the host side
    pub fn attribute(&self) -> &'static str {
        match self {
            Channel::X => "translateX",
            Channel::Y => "translateY",
            Channel::Z => "translateZ",
        }
    }

    pub fn value_of(&self, k: &Keyframe) -> f64 {
        match self {
            Channel::X => k.x,
            Channel::Y => k.y,
            Channel::Z => k.z,
        }
    }
}

/// Whatever holds the rig. Calls are fire-and-forget.
pub trait RigSink {
    fn clear_animation(&mut self, control: &str, channel: Channel);
    fn set_keyframe(&mut self, control: &str, channel: Channel, frame: u32, value: f64);
    fn constrain_control(&mut self, control: &str, target: &str, maintain_offset: bool);
}

/// Remove old keys from every listed channel, then key each channel in turn.
pub fn animate_control(
    sink: &mut dyn RigSink,
    control: &str,
    channels: &[Channel],
    keyframes: &[Keyframe],
) {
    for channel in TRANSLATE_CHANNELS.iter() {
        sink.clear_animation(control, *channel);
    }
    for channel in channels {
        for k in keyframes {
            sink.set_keyframe(control, *channel, k.frame, channel.value_of(k));
        }
    }
}

fn check_increasing(keyframes: &[Keyframe]) -> Result<()> {
    match keyframes.windows(2).find(|w| w[1].frame <= w[0].frame) {
        Some(w) => Err(anyhow!(
            "keyframes out of order: frame {} follows frame {}",
            w[1].frame,
            w[0].frame
        )),
        None => Ok(()),
    }
}

/// Push the tongue trajectories onto their controls and the jaw
/// displacement onto the lower jaw control.
pub fn drive_rig(
    sink: &mut dyn RigSink,
    keyframes: &KeyframeSet,
    layout: &SensorLayout,
) -> Result<()> {
    // Validate everything before the first call reaches the sink
    let mut plan = Vec::new();
    for part in layout.tongue_parts() {
        let Some(binding) = part.rig else { continue };
        let keys = keyframes
            .get(&part.label)
            .ok_or_else(|| anyhow!("no keyframes for part {}", part.label))?;
        check_increasing(keys)?;
        plan.push((binding, keys));
    }
    let jaw_keys = keyframes
        .get(&layout.jaw)
        .ok_or_else(|| anyhow!("no keyframes for jaw part {}", layout.jaw))?;
    check_increasing(jaw_keys)?;

    for (binding, keys) in plan {
        animate_control(sink, binding.control, &TRANSLATE_CHANNELS, keys);
        sink.constrain_control(binding.control, binding.target, true);
        debug!(
            "Keyed {} frames on {} -> {}",
            keys.len(),
            binding.control,
            binding.target
        );
    }

    let lower = relative_to_first(jaw_keys);
    // The lower jaw control only hinges vertically
    animate_control(sink, layout.jaw_control, &[Channel::Y], &lower);

    info!(
        "Rig driven: {} tongue controls + {}",
        layout.tongue_parts().len(),
        layout.jaw_control
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ingestion::split_channels,
        parts::PartLabel,
        systems::normalization::{NormalizeSettings, Normalizer},
    };
    use ndarray::{Array, Array2};

    #[derive(Debug, Clone, PartialEq)]
    pub enum RigCall {
        Clear(String, Channel),
        Key(String, Channel, u32, f64),
        Constrain(String, String, bool),
    }

    #[derive(Default)]
    pub struct RecordingSink {
        pub calls: Vec<RigCall>,
    }

    impl RigSink for RecordingSink {
        fn clear_animation(&mut self, control: &str, channel: Channel) {
            self.calls.push(RigCall::Clear(control.into(), channel));
        }
        fn set_keyframe(&mut self, control: &str, channel: Channel, frame: u32, value: f64) {
            self.calls
                .push(RigCall::Key(control.into(), channel, frame, value));
        }
        fn constrain_control(&mut self, control: &str, target: &str, maintain_offset: bool) {
            self.calls
                .push(RigCall::Constrain(control.into(), target.into(), maintain_offset));
        }
    }

    fn keyframe_set(frames: usize) -> KeyframeSet {
        let raw: Array2<f64> =
            Array::from_shape_fn((frames, 30), |(r, c)| (r as f64 * 0.5) - c as f64);
        let mut channels = split_channels(&raw, &SensorLayout::default()).unwrap();
        Normalizer::new(NormalizeSettings::default())
            .run(&mut channels)
            .unwrap()
            .keyframes
    }

    fn driven(frames: usize) -> Vec<RigCall> {
        let mut sink = RecordingSink::default();
        drive_rig(&mut sink, &keyframe_set(frames), &SensorLayout::default()).unwrap();
        sink.calls
    }

    fn calls_for<'a>(calls: &'a [RigCall], control: &str) -> Vec<&'a RigCall> {
        calls
            .iter()
            .filter(|c| match c {
                RigCall::Clear(name, _) | RigCall::Key(name, ..) | RigCall::Constrain(name, ..) => {
                    name == control
                }
            })
            .collect()
    }

    #[test]
    fn test_clear_before_any_key() {
        let calls = driven(4);
        for control in ["ttHandle", "blHandle", "brHandle", "tdHandle", "tbHandle", "lowerHandle"] {
            let mine = calls_for(&calls, control);
            let first_key = mine
                .iter()
                .position(|c| matches!(c, RigCall::Key(..)))
                .unwrap();
            let clears: Vec<Channel> = mine[..first_key]
                .iter()
                .filter_map(|c| match c {
                    RigCall::Clear(_, ch) => Some(*ch),
                    _ => None,
                })
                .collect();
            assert_eq!(clears, TRANSLATE_CHANNELS.to_vec(), "{}", control);
            assert!(
                !mine[first_key..]
                    .iter()
                    .any(|c| matches!(c, RigCall::Clear(..))),
                "{}",
                control
            );
        }
    }

    #[test]
    fn test_frames_strictly_increase_per_channel() {
        let calls = driven(6);
        for control in ["ttHandle", "tdHandle"] {
            for channel in TRANSLATE_CHANNELS {
                let frames: Vec<u32> = calls_for(&calls, control)
                    .iter()
                    .filter_map(|c| match c {
                        RigCall::Key(_, ch, f, _) if *ch == channel => Some(*f),
                        _ => None,
                    })
                    .collect();
                assert_eq!(frames, (0..6).collect::<Vec<u32>>());
            }
        }
    }

    #[test]
    fn test_tongue_parts_driven_in_cluster_order() {
        let calls = driven(2);
        let constrained: Vec<(String, String, bool)> = calls
            .iter()
            .filter_map(|c| match c {
                RigCall::Constrain(a, b, mo) => Some((a.clone(), b.clone(), *mo)),
                _ => None,
            })
            .collect();
        assert_eq!(
            constrained,
            vec![
                ("ttHandle".into(), "tongue_tt".into(), true),
                ("blHandle".into(), "tongue_bl".into(), true),
                ("brHandle".into(), "tongue_br".into(), true),
                ("tdHandle".into(), "tongue_td".into(), true),
                ("tbHandle".into(), "tongue_tb".into(), true),
            ]
        );
    }

    #[test]
    fn test_lower_jaw_keys_vertical_displacement() {
        let set = keyframe_set(3);
        let mut sink = RecordingSink::default();
        drive_rig(&mut sink, &set, &SensorLayout::default()).unwrap();

        let lj = &set[&PartLabel::Lj];
        let lower: Vec<(Channel, u32, f64)> = calls_for(&sink.calls, "lowerHandle")
            .iter()
            .filter_map(|c| match c {
                RigCall::Key(_, ch, f, v) => Some((*ch, *f, *v)),
                _ => None,
            })
            .collect();
        assert_eq!(lower.len(), 3);
        assert_eq!(lower[0], (Channel::Y, 0, 0.));
        assert_eq!(lower[2], (Channel::Y, 2, lj[2].y - lj[0].y));
    }

    #[test]
    fn test_out_of_order_keyframes_rejected() {
        let mut set = keyframe_set(3);
        set.get_mut(&PartLabel::Td).unwrap().swap(0, 1);
        let mut sink = RecordingSink::default();
        assert!(drive_rig(&mut sink, &set, &SensorLayout::default()).is_err());
        assert!(sink.calls.is_empty());
    }
}

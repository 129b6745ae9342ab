use indexmap::IndexMap;
use log::{debug, info};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    errors::PipelineError,
    ingestion::PartChannel,
    parts::{PartLabel, AXES},
    Point3D,
};

/// Uniform scale from sensor units to scene units.
pub const TARGET_SCALE_DIVISOR: f64 = 2.0;

/// One animation control point, already in target (scene) space.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub frame: u32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Keyframe {
    pub fn position(&self) -> Point3D {
        Vector3::new(self.x, self.y, self.z)
    }
}

pub type KeyframeSet = IndexMap<PartLabel, Vec<Keyframe>>;

/// How the sensor offset is removed before reprojection.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DemeanMode {
    /// One mean over every sample of every part; keeps parts in their
    /// relative positions.
    #[default]
    Pooled,
    /// Each part centred on its own mean
    PerPart,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeSettings {
    pub demean_mode: DemeanMode,
    /// Fail on NaN/inf samples instead of passing them through
    pub strict_finite: bool,
}

#[derive(Debug)]
pub struct Reprojection {
    /// Offset that was subtracted (the pooled mean, or zero in per-part mode)
    pub mean: Point3D,
    pub keyframes: KeyframeSet,
}

pub struct Normalizer {
    settings: NormalizeSettings,
}

impl Normalizer {
    pub fn new(settings: NormalizeSettings) -> Self {
        Normalizer { settings }
    }

    /// Demean then reproject. The channels are centred in place.
    pub fn run(&self, channels: &mut [PartChannel]) -> Result<Reprojection, PipelineError> {
        if self.settings.strict_finite {
            check_finite(channels)?;
        }

        let mean = match self.settings.demean_mode {
            DemeanMode::Pooled => demean_pooled(channels)?,
            DemeanMode::PerPart => {
                demean_per_part(channels)?;
                Vector3::zeros()
            }
        };

        let keyframes: KeyframeSet = channels
            .iter()
            .map(|c| Ok((c.label, to_keyframes(c)?)))
            .collect::<Result<_, PipelineError>>()?;

        info!(
            "Reprojected {} parts x {} frames",
            keyframes.len(),
            channels.first().map(|c| c.len()).unwrap_or(0)
        );
        Ok(Reprojection { mean, keyframes })
    }
}

/// Per-axis mean of every sample of every channel, pooled.
pub fn global_mean(channels: &[PartChannel]) -> Result<Point3D, PipelineError> {
    let mut sum = [0.0_f64; AXES];
    let mut count = [0_usize; AXES];

    for channel in channels {
        for p in channel.positions.iter() {
            for axis in 0..AXES {
                sum[axis] += p[axis];
                count[axis] += 1;
            }
        }
    }

    if count.contains(&0) {
        return Err(PipelineError::EmptyInput);
    }

    Ok(Vector3::new(
        sum[0] / count[0] as f64,
        sum[1] / count[1] as f64,
        sum[2] / count[2] as f64,
    ))
}

/// Subtract the pooled mean from every sample; returns the mean used.
pub fn demean_pooled(channels: &mut [PartChannel]) -> Result<Point3D, PipelineError> {
    let mean = global_mean(channels)?;
    debug!("Global mean (sensor space): {:?}", mean.as_slice());

    for channel in channels.iter_mut() {
        for p in channel.positions.iter_mut() {
            *p -= mean;
        }
    }
    Ok(mean)
}

pub fn demean_per_part(channels: &mut [PartChannel]) -> Result<(), PipelineError> {
    if channels.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    for channel in channels.iter_mut() {
        let mean = global_mean(std::slice::from_ref(channel))?;
        debug!("Mean for {}: {:?}", channel.label, mean.as_slice());
        for p in channel.positions.iter_mut() {
            *p -= mean;
        }
    }
    Ok(())
}

/// Sensor axes are x back-to-front, y right-to-left, z bottom-to-top; the
/// scene has x right-to-left, y bottom-to-top, z back-to-front.
pub fn reproject(p: &Point3D) -> Point3D {
    Vector3::new(
        p.y / TARGET_SCALE_DIVISOR,
        p.z / TARGET_SCALE_DIVISOR,
        p.x / TARGET_SCALE_DIVISOR,
    )
}

/// Keyframe times are u32 on the host side
pub fn frame_index(i: usize) -> Result<u32, PipelineError> {
    u32::try_from(i).map_err(|_| PipelineError::TooManyFrames { frames: i })
}

pub fn to_keyframes(channel: &PartChannel) -> Result<Vec<Keyframe>, PipelineError> {
    channel
        .positions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let t = reproject(p);
            Ok(Keyframe {
                frame: frame_index(i)?,
                x: t.x,
                y: t.y,
                z: t.z,
            })
        })
        .collect()
}

fn check_finite(channels: &[PartChannel]) -> Result<(), PipelineError> {
    for channel in channels {
        for (frame, p) in channel.positions.iter().enumerate() {
            if let Some(axis) = (0..AXES).find(|a| !p[*a].is_finite()) {
                return Err(PipelineError::NonFiniteValue {
                    part: channel.label,
                    frame,
                    axis,
                });
            }
        }
    }
    Ok(())
}

use std::{fmt, str::FromStr};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// Values per sample: every sensor reports x, y and z.
pub const AXES: usize = 3;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PartLabel {
    Td,
    Tb,
    Br,
    Bl,
    Tt,
    Ul,
    Lc,
    Ll,
    Li,
    Lj,
}

impl PartLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartLabel::Td => "td",
            PartLabel::Tb => "tb",
            PartLabel::Br => "br",
            PartLabel::Bl => "bl",
            PartLabel::Tt => "tt",
            PartLabel::Ul => "ul",
            PartLabel::Lc => "lc",
            PartLabel::Ll => "ll",
            PartLabel::Li => "li",
            PartLabel::Lj => "lj",
        }
    }

    /// Anatomical name of the sensor site, e.g. "tongue tip"
    pub fn description(&self) -> &'static str {
        EMA_PARTS
            .iter()
            .find(|p| p.label == *self)
            .map(|p| p.description)
            .unwrap_or_default()
    }
}

impl fmt::Display for PartLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartLabel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EMA_PARTS
            .iter()
            .map(|p| p.label)
            .find(|label| label.as_str() == s)
            .ok_or_else(|| anyhow!("unknown part label \"{}\"", s))
    }
}

/// Rig objects driven by one tongue sensor.
#[derive(Debug, Clone, Copy)]
pub struct RigBinding {
    /// Animated locator (cluster handle) that receives the keyframes
    pub control: &'static str,
    /// Joint constrained to follow the control
    pub target: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct PartSpec {
    pub label: PartLabel,
    pub description: &'static str,
    /// First of the three columns this part occupies in the raw array
    pub column_offset: usize,
    pub rig: Option<RigBinding>,
}

const fn tongue(control: &'static str, target: &'static str) -> Option<RigBinding> {
    Some(RigBinding { control, target })
}

/// Column layout of the EMA recordings, in file order.
pub static EMA_PARTS: [PartSpec; 10] = [
    PartSpec {
        label: PartLabel::Td,
        description: "tongue dorsum",
        column_offset: 0,
        rig: tongue("tdHandle", "tongue_td"),
    },
    PartSpec {
        label: PartLabel::Tb,
        description: "tongue blade",
        column_offset: 3,
        rig: tongue("tbHandle", "tongue_tb"),
    },
    PartSpec {
        label: PartLabel::Br,
        description: "tongue blade - right",
        column_offset: 6,
        rig: tongue("brHandle", "tongue_br"),
    },
    PartSpec {
        label: PartLabel::Bl,
        description: "tongue blade - left",
        column_offset: 9,
        rig: tongue("blHandle", "tongue_bl"),
    },
    PartSpec {
        label: PartLabel::Tt,
        description: "tongue tip",
        column_offset: 12,
        rig: tongue("ttHandle", "tongue_tt"),
    },
    PartSpec {
        label: PartLabel::Ul,
        description: "upper lip",
        column_offset: 15,
        rig: None,
    },
    PartSpec {
        label: PartLabel::Lc,
        description: "lip corner - right",
        column_offset: 18,
        rig: None,
    },
    PartSpec {
        label: PartLabel::Ll,
        description: "lower lip",
        column_offset: 21,
        rig: None,
    },
    PartSpec {
        label: PartLabel::Li,
        description: "jaw incisor",
        column_offset: 24,
        rig: None,
    },
    PartSpec {
        label: PartLabel::Lj,
        description: "jaw parasagittal",
        column_offset: 27,
        rig: None,
    },
];

/// Order in which the tongue clusters are created on the plane's vertices,
/// and therefore the order they are driven in.
pub const TONGUE_DRIVE_ORDER: [PartLabel; 5] = [
    PartLabel::Tt,
    PartLabel::Bl,
    PartLabel::Br,
    PartLabel::Td,
    PartLabel::Tb,
];

#[derive(Debug, Clone, Copy)]
pub struct SensorLayout {
    parts: &'static [PartSpec],
    /// The one channel whose trajectory is re-anchored to its first frame
    pub jaw: PartLabel,
    /// Control driven by the jaw-relative trajectory
    pub jaw_control: &'static str,
}

impl Default for SensorLayout {
    fn default() -> Self {
        SensorLayout {
            parts: &EMA_PARTS,
            jaw: PartLabel::Lj,
            jaw_control: "lowerHandle",
        }
    }
}

impl SensorLayout {
    pub fn parts(&self) -> &'static [PartSpec] {
        self.parts
    }

    pub fn column_count(&self) -> usize {
        self.parts.len() * AXES
    }

    pub fn get(&self, label: PartLabel) -> Option<&'static PartSpec> {
        self.parts.iter().find(|p| p.label == label)
    }

    /// Tongue parts with a rig binding, in drive order
    pub fn tongue_parts(&self) -> Vec<&'static PartSpec> {
        TONGUE_DRIVE_ORDER
            .iter()
            .filter_map(|label| self.get(*label))
            .filter(|p| p.rig.is_some())
            .collect()
    }
}

use thiserror::Error;

use crate::parts::PartLabel;

/// Failures of ingestion and normalization. Any of these aborts a run
/// before the rig or the renderer is touched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Malformed input: expected {expected} columns, found {found}")]
    MalformedInput { expected: usize, found: usize },

    #[error("Empty input: at least one frame is required")]
    EmptyInput,

    #[error("Non-finite value in part {part} at frame {frame}, axis {axis}")]
    NonFiniteValue {
        part: PartLabel,
        frame: usize,
        axis: usize,
    },

    #[error("Too many frames: frame {frames} does not fit a keyframe time")]
    TooManyFrames { frames: usize },
}

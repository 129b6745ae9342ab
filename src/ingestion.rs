use std::{fs, path::Path};

use anyhow::{Context, Result};
use log::{debug, info};
use nalgebra::Vector3;
use ndarray::{s, Array2};
use ndarray_npy::read_npy;

use crate::{
    errors::PipelineError,
    parts::{PartLabel, SensorLayout, AXES},
    Point3D,
};

/// One tracked landmark's position over time, in sensor space.
#[derive(Debug, Clone, PartialEq)]
pub struct PartChannel {
    pub label: PartLabel,
    pub positions: Vec<Point3D>,
}

impl PartChannel {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Slice the raw array into one channel per part, following the layout's
/// column offsets.
pub fn split_channels(
    raw: &Array2<f64>,
    layout: &SensorLayout,
) -> Result<Vec<PartChannel>, PipelineError> {
    let (rows, columns) = raw.dim();
    if rows == 0 {
        return Err(PipelineError::EmptyInput);
    }
    if columns != layout.column_count() {
        return Err(PipelineError::MalformedInput {
            expected: layout.column_count(),
            found: columns,
        });
    }

    let channels: Vec<PartChannel> = layout
        .parts()
        .iter()
        .map(|part| {
            let start = part.column_offset;
            let block = raw.slice(s![.., start..start + AXES]);
            PartChannel {
                label: part.label,
                positions: block
                    .rows()
                    .into_iter()
                    .map(|r| Vector3::new(r[0], r[1], r[2]))
                    .collect(),
            }
        })
        .collect();

    debug!("Split {} frames into {} part channels", rows, channels.len());
    Ok(channels)
}

/// Load an EMA recording: `.npy` arrays (f64 or f32), or delimited text
/// with one frame per line.
pub fn load_raw_frames<P: AsRef<Path>>(path: P) -> Result<Array2<f64>> {
    let path = path.as_ref();
    let is_npy = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("npy"))
        .unwrap_or(false);

    let raw = if is_npy {
        match read_npy::<_, Array2<f64>>(path) {
            Ok(array) => array,
            Err(e) => {
                debug!("Not an f64 array ({}); trying f32", e);
                read_npy::<_, Array2<f32>>(path)
                    .with_context(|| format!("Failed to read npy array from {:?}", path))?
                    .mapv(f64::from)
            }
        }
    } else {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read EMA data from {:?}", path))?;
        parse_text_frames(&text)?
    };

    info!(
        "Loaded EMA data from {:?}: {} frames x {} columns",
        path,
        raw.nrows(),
        raw.ncols()
    );
    Ok(raw)
}

/// Parse whitespace- or comma-separated rows; blank lines and `#` comments
/// are skipped. All rows must have the same width.
pub fn parse_text_frames(text: &str) -> Result<Array2<f64>> {
    let mut values: Vec<f64> = Vec::new();
    let mut width: Option<usize> = None;
    let mut rows = 0;

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|field| !field.is_empty())
            .map(|field| {
                field
                    .parse::<f64>()
                    .with_context(|| format!("Bad number \"{}\" on line {}", field, line_no + 1))
            })
            .collect::<Result<Vec<f64>>>()?;

        match width {
            None => width = Some(row.len()),
            Some(w) if w != row.len() => {
                return Err(PipelineError::MalformedInput {
                    expected: w,
                    found: row.len(),
                })
                .with_context(|| format!("Ragged row on line {}", line_no + 1));
            }
            Some(_) => {}
        }
        values.extend(row);
        rows += 1;
    }

    let array = Array2::from_shape_vec((rows, width.unwrap_or(0)), values)
        .context("Failed to shape parsed frames")?;
    Ok(array)
}

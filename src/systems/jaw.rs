use super::normalization::Keyframe;

/// Displacement of each keyframe from the first one. Frame indices are kept;
/// the first entry becomes exactly (0,0,0).
pub fn relative_to_first(keyframes: &[Keyframe]) -> Vec<Keyframe> {
    let Some(first) = keyframes.first().copied() else {
        return Vec::new();
    };
    keyframes
        .iter()
        .map(|k| Keyframe {
            frame: k.frame,
            x: k.x - first.x,
            y: k.y - first.y,
            z: k.z - first.z,
        })
        .collect()
}

use std::{fs, path::Path};

use anyhow::{Context, Result};
use log::info;

use crate::systems::normalization::KeyframeSet;

/// Write computed keyframes: MessagePack for `.msgpack`/`.mp`, JSON otherwise.
pub fn export_keyframes<P: AsRef<Path>>(path: P, keyframes: &KeyframeSet) -> Result<()> {
    let path = path.as_ref();
    let is_msgpack = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "msgpack" | "mp"))
        .unwrap_or(false);

    let payload = if is_msgpack {
        rmp_serde::to_vec_named(keyframes).context("failed to serialize keyframes")?
    } else {
        serde_json::to_vec_pretty(keyframes).context("failed to serialize keyframes")?
    };
    fs::write(path, payload).with_context(|| format!("Failed to write keyframes to {:?}", path))?;

    info!("Exported keyframes for {} parts to {:?}", keyframes.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parts::PartLabel, systems::normalization::Keyframe};

    fn import_keyframes(path: &Path) -> KeyframeSet {
        let bytes = fs::read(path).unwrap();
        match rmp_serde::from_slice::<KeyframeSet>(&bytes) {
            Ok(set) => set,
            Err(_) => serde_json::from_slice(&bytes).unwrap(),
        }
    }

    fn sample() -> KeyframeSet {
        let mut set = KeyframeSet::new();
        set.insert(
            PartLabel::Lj,
            vec![Keyframe {
                frame: 0,
                x: 0.5,
                y: -1.25,
                z: 3.0,
            }],
        );
        set.insert(PartLabel::Td, Vec::new());
        set
    }

    #[test]
    fn test_json_uses_part_labels_and_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.json");
        export_keyframes(&path, &sample()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lj = text.find("\"lj\"").unwrap();
        let td = text.find("\"td\"").unwrap();
        assert!(lj < td);
        assert!(text.contains("\"frame\": 0"));
        assert_eq!(import_keyframes(&path), sample());
    }

    #[test]
    fn test_msgpack_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.msgpack");
        export_keyframes(&path, &sample()).unwrap();
        assert_eq!(import_keyframes(&path), sample());
    }
}

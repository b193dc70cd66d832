//! Precomputed ("sidecar") embeddings.
//!
//! Embedding models run outside this tool. For every image `photo.jpg` the
//! producer writes `photo.jpg.json` next to it, holding the L2-normalized
//! vector as a JSON array of floats. [`SidecarEmbedder`] reads those files.

use ragindex_core::builder::Embedder;
use ragindex_core::CollaboratorError;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads embeddings from `<image>.json` sidecar files.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarEmbedder;

impl SidecarEmbedder {
    /// Location of the sidecar for `image`.
    pub fn sidecar_path(image: &Path) -> PathBuf {
        let mut name = image
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(OsString::new);
        name.push(".json");
        image.with_file_name(name)
    }
}

impl Embedder for SidecarEmbedder {
    fn embed(&self, image: &Path) -> Result<Vec<f32>, CollaboratorError> {
        let sidecar = Self::sidecar_path(image);
        read_vector_file(&sidecar).map_err(|e| format!("{}: {}", sidecar.display(), e).into())
    }
}

/// Reads a JSON array of floats from `path`.
pub fn read_vector_file(path: &Path) -> Result<Vec<f32>, CollaboratorError> {
    let raw = fs::read(path)?;
    let vector: Vec<f32> = serde_json::from_slice(&raw)?;
    Ok(vector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sidecar_path() {
        let p = SidecarEmbedder::sidecar_path(Path::new("data/samples/cat.JPG"));
        assert_eq!(p, PathBuf::from("data/samples/cat.JPG.json"));
    }

    #[test]
    fn test_embed_reads_sidecar() {
        let tmp = TempDir::new().unwrap();
        let image = tmp.path().join("a.png");
        fs::write(&image, b"img").unwrap();
        fs::write(tmp.path().join("a.png.json"), b"[0.6, 0.8]").unwrap();
        assert_eq!(SidecarEmbedder.embed(&image).unwrap(), vec![0.6, 0.8]);
    }

    #[test]
    fn test_missing_or_invalid_sidecar_fails() {
        let tmp = TempDir::new().unwrap();
        let image = tmp.path().join("b.png");
        assert!(SidecarEmbedder.embed(&image).is_err());
        fs::write(tmp.path().join("b.png.json"), b"{\"not\": \"a vector\"}").unwrap();
        assert!(SidecarEmbedder.embed(&image).is_err());
    }
}

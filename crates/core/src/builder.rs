//! Full index rebuild from a directory of images.
//!
//! The builder lists image files (jpg, jpeg, png, webp, case-insensitive) in
//! file-name order, asks an [`Embedder`] for each one's vector, and inserts
//! `(vector, record)` pairs into a fresh [`RagIndex`]. A file that cannot be
//! embedded, or whose vector the index rejects, is skipped and reported; only an
//! unusable source directory aborts the build.

use crate::config;
use crate::error::{CollaboratorError, IndexError, Result};
use crate::record::Record;
use crate::storage::RagIndex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// External producer of L2-normalized, fixed-length image embeddings.
pub trait Embedder {
    /// Embeds the image stored at `image`.
    fn embed(&self, image: &Path) -> std::result::Result<Vec<f32>, CollaboratorError>;
}

impl<F, E> Embedder for F
where
    F: Fn(&Path) -> std::result::Result<Vec<f32>, E>,
    E: Into<CollaboratorError>,
{
    fn embed(&self, image: &Path) -> std::result::Result<Vec<f32>, CollaboratorError> {
        self(image).map_err(Into::into)
    }
}

/// A source file left out of the build.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a rebuild.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    /// Number of rows in the new index.
    pub indexed: usize,
    /// Files that were found but not indexed.
    pub skipped: Vec<SkippedFile>,
    /// Wall-clock build time.
    pub elapsed: Duration,
}

/// Returns true if `path` has one of [`config::IMAGE_EXTENSIONS`] (case-insensitive).
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            config::IMAGE_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// Lists image files directly inside `source_dir`, sorted by file name.
///
/// Creates the directory if it does not exist.
pub fn list_images(source_dir: &Path) -> Result<Vec<PathBuf>> {
    let unavailable = |source| IndexError::SourceUnavailable {
        path: source_dir.to_path_buf(),
        source,
    };
    fs::create_dir_all(source_dir).map_err(unavailable)?;

    let mut images = Vec::new();
    for entry in fs::read_dir(source_dir).map_err(unavailable)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {:?}: {}", source_dir, e);
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && is_image_file(&path) {
            images.push(path);
        }
    }
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

/// Builds a new index from every image in `source_dir`.
///
/// Never merges with an existing index. With zero indexed images the returned
/// index is empty (no dimension).
pub fn rebuild<E>(source_dir: &Path, embedder: &E) -> Result<(RagIndex, BuildReport)>
where
    E: Embedder + ?Sized,
{
    let start = Instant::now();
    let images = list_images(source_dir)?;
    let mut index = RagIndex::new();
    let mut report = BuildReport::default();

    for path in images {
        let vector = match embedder.embed(&path) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Skipping {:?}: embedding failed: {}", path, e);
                report.skipped.push(SkippedFile {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let record = Record::for_image(&path);
        match index.insert(&vector, record) {
            Ok(_) => tracing::debug!("Indexed {:?}", path),
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                report.skipped.push(SkippedFile {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    report.indexed = index.len();
    report.elapsed = start.elapsed();
    if index.is_empty() {
        tracing::info!("No images indexed from {:?}", source_dir);
    } else {
        tracing::info!(
            "Rebuilt index from {:?}: {} indexed, {} skipped, dim {:?} ({:?})",
            source_dir,
            report.indexed,
            report.skipped.len(),
            index.dimension(),
            report.elapsed
        );
    }
    Ok((index, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{load, save};
    use tempfile::TempDir;

    /// Embeds by file name: "<x>_<y>.ext" -> [x, y]; anything else fails.
    fn name_embedder(path: &Path) -> std::result::Result<Vec<f32>, String> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or("no stem")?;
        stem.split('_')
            .map(|p| p.parse::<f32>().map_err(|e| e.to_string()))
            .collect()
    }

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"img").unwrap();
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("a.jpg")));
        assert!(is_image_file(Path::new("a.JPEG")));
        assert!(is_image_file(Path::new("a.Png")));
        assert!(is_image_file(Path::new("a.webp")));
        assert!(!is_image_file(Path::new("a.gif")));
        assert!(!is_image_file(Path::new("jpg")));
        assert!(!is_image_file(Path::new("a.jpg.json")));
    }

    #[test]
    fn test_missing_dir_is_created_and_empty() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("samples");
        let (index, report) = rebuild(&dir, &name_embedder).unwrap();
        assert!(dir.is_dir());
        assert!(index.is_empty());
        assert_eq!(index.dimension(), None);
        assert_eq!(report.indexed, 0);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_rebuild_sorted_and_aligned() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "0_1.png");
        touch(tmp.path(), "1_0.JPG");
        touch(tmp.path(), "notes.txt");
        fs::create_dir(tmp.path().join("nested.jpg")).unwrap();

        let (index, report) = rebuild(tmp.path(), &name_embedder).unwrap();
        assert_eq!(report.indexed, 2);
        assert_eq!(index.record(0).unwrap().caption, "Sample image 0_1.png");
        assert_eq!(index.vector(0).unwrap(), &[0.0, 1.0]);
        assert_eq!(index.record(1).unwrap().caption, "Sample image 1_0.JPG");
        assert_eq!(index.vector(1).unwrap(), &[1.0, 0.0]);
        assert!(index.record(1).unwrap().path.ends_with("1_0.JPG"));
    }

    #[test]
    fn test_failed_files_are_skipped() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a_1.jpg"); // embed error
        touch(tmp.path(), "1_0.jpg");
        touch(tmp.path(), "1_0_0.jpg"); // wrong dimension
        touch(tmp.path(), "0_1.webp");

        let (index, report) = rebuild(tmp.path(), &name_embedder).unwrap();
        assert_eq!(report.indexed, 2);
        assert_eq!(index.len(), 2);
        let skipped: Vec<String> = report
            .skipped
            .iter()
            .map(|s| s.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(skipped, vec!["1_0_0.jpg", "a_1.jpg"]);
        assert!(index.validate().is_ok());
    }

    #[test]
    fn test_closure_embedder() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "x.jpg");
        let embed = |_: &Path| -> std::result::Result<Vec<f32>, std::io::Error> {
            Ok(vec![0.6, 0.8])
        };
        let (index, _) = rebuild(tmp.path(), &embed).unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_source_unavailable() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("plain");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            rebuild(&file, &name_embedder),
            Err(IndexError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_empty_rebuild_save_load_search() {
        let tmp = TempDir::new().unwrap();
        let (index, _) = rebuild(&tmp.path().join("samples"), &name_embedder).unwrap();
        let vp = tmp.path().join("index.vec");
        let mp = tmp.path().join("meta.json");
        save(&index, &vp, &mp).unwrap();
        let loaded = load(&vp, &mp).unwrap();
        assert!(loaded.is_empty());
        for k in [0, 1, 5, 100] {
            assert!(loaded.search(&[1.0, 0.0], k).unwrap().is_empty());
        }
    }
}

//! Retrieval-augmented captioning request flow.
//!
//! The host constructs the index handle, embedder, and captioner once and hands
//! references to a [`CaptionPipeline`]. Retrieval is an enhancement: if
//! embedding or search fails the caption is still produced, just without
//! neighbor context.

use crate::builder::Embedder;
use crate::error::CollaboratorError;
use crate::config;
use crate::record::Record;
use crate::search::build_context;
use crate::storage::IndexHandle;
use std::path::Path;

/// External caption generator.
pub trait Captioner {
    /// Captions `image`, optionally conditioned on a retrieval `context` (may be empty).
    fn generate(
        &self,
        image: &Path,
        context: &str,
        max_length: usize,
    ) -> std::result::Result<String, CollaboratorError>;
}

impl<F, E> Captioner for F
where
    F: Fn(&Path, &str, usize) -> std::result::Result<String, E>,
    E: Into<CollaboratorError>,
{
    fn generate(
        &self,
        image: &Path,
        context: &str,
        max_length: usize,
    ) -> std::result::Result<String, CollaboratorError> {
        self(image, context, max_length).map_err(Into::into)
    }
}

/// Per-request knobs.
#[derive(Debug, Clone, Copy)]
pub struct CaptionOptions {
    pub use_retrieval: bool,
    pub k: usize,
    pub max_length: usize,
}

impl Default for CaptionOptions {
    fn default() -> Self {
        Self {
            use_retrieval: true,
            k: config::DEFAULT_K,
            max_length: config::DEFAULT_MAX_CAPTION_LEN,
        }
    }
}

/// Result of one captioning request.
#[derive(Debug, Clone)]
pub struct CaptionOutcome {
    /// Generated caption, or the captioner's error message.
    pub caption: std::result::Result<String, String>,
    /// Context string fed to the captioner (empty when no neighbors were used).
    pub context: String,
    /// Ranked neighbor records.
    pub neighbors: Vec<Record>,
    /// Why retrieval was abandoned, if it was.
    pub retrieval_warning: Option<String>,
}

/// Borrowing request handler over injected collaborators.
pub struct CaptionPipeline<'a, E: ?Sized, C: ?Sized> {
    index: &'a IndexHandle,
    embedder: &'a E,
    captioner: &'a C,
}

impl<'a, E, C> CaptionPipeline<'a, E, C>
where
    E: Embedder + ?Sized,
    C: Captioner + ?Sized,
{
    pub fn new(index: &'a IndexHandle, embedder: &'a E, captioner: &'a C) -> Self {
        Self {
            index,
            embedder,
            captioner,
        }
    }

    /// Ranked neighbor records for `image`.
    pub fn retrieve(&self, image: &Path, k: usize) -> std::result::Result<Vec<Record>, String> {
        let query = self
            .embedder
            .embed(image)
            .map_err(|e| format!("embedding failed: {e}"))?;
        let snapshot = self.index.snapshot();
        let hits = snapshot
            .search(&query, k)
            .map_err(|e| format!("search failed: {e}"))?;
        Ok(hits.into_iter().cloned().collect())
    }

    /// Captions `image`, using retrieved neighbors as context when enabled.
    pub fn caption(&self, image: &Path, options: CaptionOptions) -> CaptionOutcome {
        let mut neighbors = Vec::new();
        let mut retrieval_warning = None;
        if options.use_retrieval && options.k > 0 {
            match self.retrieve(image, options.k) {
                Ok(found) => neighbors = found,
                Err(e) => {
                    tracing::warn!("Retrieval skipped for {:?}: {}", image, e);
                    retrieval_warning = Some(e);
                }
            }
        }
        let context = build_context(&neighbors);

        let caption = self
            .captioner
            .generate(image, &context, options.max_length)
            .map_err(|e| {
                tracing::warn!("Captioner failed for {:?}: {}", image, e);
                e.to_string()
            });

        CaptionOutcome {
            caption,
            context,
            neighbors,
            retrieval_warning,
        }
    }
}

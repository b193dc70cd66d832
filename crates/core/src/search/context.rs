//! Neighbor-to-text formatting for the caption-augmentation step.
//!
//! Each ranked neighbor contributes up to two lines:
//! `[NN caption] <caption>` when its trimmed caption is non-empty, and
//! `[NN labels] <a, b, ...>` when it carries labels. Lines keep ranked order
//! and are joined with `\n`.

use crate::record::Record;

/// Builds the retrieval context string from ranked neighbor records.
pub fn build_context<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut lines = Vec::new();
    for record in records {
        let caption = record.caption.trim();
        if !caption.is_empty() {
            lines.push(format!("[NN caption] {caption}"));
        }
        let labels = record.labels.join(", ");
        if !labels.is_empty() {
            lines.push(format!("[NN labels] {labels}"));
        }
    }
    lines.join("\n")
}

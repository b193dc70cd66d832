//! Disk persistence for a [`RagIndex`] as two companion files.
//!
//! The vector file is binary, little-endian:
//!
//! ```text
//! [magic "RIV1"][u32 dim][u64 row_count][row_count * dim f32][magic "VCR1"][u32 CRC32 BE]
//! ```
//!
//! The CRC32 covers everything before the footer. The metadata file is a
//! pretty-printed JSON document `{version, dimension, count, vector_crc, records}`
//! where `vector_crc` repeats the footer CRC of the vector file it was saved
//! with; a bare JSON array of records is also accepted on load. Each file is
//! written with an atomic temp-file + rename. On load, the CRC, row counts and
//! dimensions of the two files are cross-checked so a torn save is reported
//! instead of silently pairing the wrong records.

use crate::config;
use crate::error::{IndexError, Result};
use crate::record::Record;
use crate::storage::index::RagIndex;
use crate::storage::metadata::MetadataStore;
use crate::storage::vectors::VectorStore;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

const HEADER_LEN: usize = 16;
const FOOTER_LEN: usize = 8;

#[derive(Serialize)]
struct MetadataFileRef<'a> {
    version: u32,
    dimension: usize,
    count: usize,
    vector_crc: u32,
    records: &'a [Record],
}

#[derive(Deserialize)]
struct MetadataFile {
    version: u32,
    dimension: usize,
    count: usize,
    /// Absent in documents written before the field existed.
    #[serde(default)]
    vector_crc: Option<u32>,
    records: Vec<Record>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MetadataDocument {
    Versioned(MetadataFile),
    Legacy(Vec<Record>),
}

/// Save an index to `vector_path` + `metadata_path`, creating parent directories.
///
/// The vector file is written first; a crash before the metadata rename leaves a
/// pair that [`load`] rejects on the `vector_crc` cross-check.
pub fn save(index: &RagIndex, vector_path: &Path, metadata_path: &Path) -> Result<()> {
    let vectors = encode_vectors(index.vectors());
    let metadata = serde_json::to_vec_pretty(&MetadataFileRef {
        version: config::METADATA_VERSION,
        dimension: index.dimension().unwrap_or(0),
        count: index.len(),
        vector_crc: footer_crc(&vectors),
        records: index.metadata().as_slice(),
    })
    .map_err(|e| IndexError::Io(std::io::Error::other(e.to_string())))?;

    write_atomic(vector_path, &vectors)?;
    write_atomic(metadata_path, &metadata)?;

    tracing::info!(
        "Saved index to {:?} + {:?} ({} rows, dim {:?}, {} vector bytes)",
        vector_path,
        metadata_path,
        index.len(),
        index.dimension(),
        vectors.len()
    );
    Ok(())
}

/// Load an index from its companion files.
///
/// Returns an empty index when either file is absent. Fails with
/// `CorruptIndex` when either file is malformed or the two disagree.
pub fn load(vector_path: &Path, metadata_path: &Path) -> Result<RagIndex> {
    let has_vectors = vector_path.exists();
    let has_metadata = metadata_path.exists();
    if !has_vectors || !has_metadata {
        if has_vectors || has_metadata {
            tracing::warn!(
                "Only one index file present (vectors: {}, metadata: {}); starting empty",
                has_vectors,
                has_metadata
            );
        } else {
            tracing::info!("No index found at {:?}; starting empty", vector_path);
        }
        return Ok(RagIndex::new());
    }

    let (vectors, vector_crc) = decode_vectors(&fs::read(vector_path)?)?;
    let records = decode_metadata(&fs::read(metadata_path)?, vectors.dimension(), vector_crc)?;

    let index = RagIndex::from_parts(vectors, MetadataStore::from_records(records))?;
    tracing::info!(
        "Loaded index from {:?} ({} rows, dim {:?})",
        vector_path,
        index.len(),
        index.dimension()
    );
    Ok(index)
}

fn encode_vectors(store: &VectorStore) -> Vec<u8> {
    let data = store.as_slice();
    let mut payload = Vec::with_capacity(data.len() * 4);
    for v in data {
        payload.extend_from_slice(&v.to_le_bytes());
    }
    frame_vector_file(
        store.dimension().unwrap_or(0) as u32,
        store.row_count() as u64,
        &payload,
    )
}

/// Assemble header, payload, and CRC footer.
fn frame_vector_file(dim: u32, rows: u64, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len() + FOOTER_LEN);
    out.extend_from_slice(config::VECTOR_FILE_MAGIC);
    out.extend_from_slice(&dim.to_le_bytes());
    out.extend_from_slice(&rows.to_le_bytes());
    out.extend_from_slice(payload);
    let crc = crc32fast::hash(&out);
    out.extend_from_slice(config::VECTOR_CRC_MAGIC);
    out.extend_from_slice(&crc.to_be_bytes());
    out
}

/// CRC32 stored in the last four bytes of a framed vector file.
fn footer_crc(framed: &[u8]) -> u32 {
    let n = framed.len();
    u32::from_be_bytes([framed[n - 4], framed[n - 3], framed[n - 2], framed[n - 1]])
}

/// Decodes a vector file, returning the store and its verified CRC32.
fn decode_vectors(raw: &[u8]) -> Result<(VectorStore, u32)> {
    if raw.len() < HEADER_LEN + FOOTER_LEN {
        return Err(IndexError::corrupt(format!(
            "vector file too short ({} bytes)",
            raw.len()
        )));
    }
    if &raw[..4] != config::VECTOR_FILE_MAGIC {
        return Err(IndexError::corrupt("vector file has bad magic"));
    }
    let body_end = raw.len() - FOOTER_LEN;
    if &raw[body_end..body_end + 4] != config::VECTOR_CRC_MAGIC {
        return Err(IndexError::corrupt(
            "vector file has no checksum footer (truncated?)",
        ));
    }

    let dim = u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]) as usize;
    let mut rows_bytes = [0u8; 8];
    rows_bytes.copy_from_slice(&raw[8..16]);
    let rows = u64::from_le_bytes(rows_bytes) as usize;
    let payload = &raw[HEADER_LEN..body_end];

    if dim > config::MAX_DIMENSION {
        return Err(IndexError::corrupt(format!(
            "dimension {dim} exceeds maximum {}",
            config::MAX_DIMENSION
        )));
    }
    if dim == 0 {
        if rows != 0 || !payload.is_empty() {
            return Err(IndexError::corrupt(format!(
                "dimension 0 with {rows} rows and {} payload bytes",
                payload.len()
            )));
        }
    } else {
        let row_bytes = dim * 4;
        if payload.len() % row_bytes != 0 {
            return Err(IndexError::corrupt(format!(
                "payload of {} bytes is not a multiple of dim * 4 = {}",
                payload.len(),
                row_bytes
            )));
        }
        if payload.len() / row_bytes != rows {
            return Err(IndexError::corrupt(format!(
                "header declares {rows} rows, payload holds {}",
                payload.len() / row_bytes
            )));
        }
    }

    let stored_crc = footer_crc(raw);
    let computed_crc = crc32fast::hash(&raw[..body_end]);
    if stored_crc != computed_crc {
        return Err(IndexError::corrupt(format!(
            "vector file CRC32 mismatch: expected {:#010x}, got {:#010x}",
            stored_crc, computed_crc
        )));
    }
    tracing::debug!("Vector file CRC32 verified: {:#010x}", stored_crc);

    let data: Vec<f32> = payload
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    Ok((VectorStore::from_raw(dim, data)?, stored_crc))
}

fn decode_metadata(raw: &[u8], dimension: Option<usize>, vector_crc: u32) -> Result<Vec<Record>> {
    let doc: MetadataDocument = serde_json::from_slice(raw)
        .map_err(|e| IndexError::corrupt(format!("metadata file unreadable: {e}")))?;
    match doc {
        MetadataDocument::Legacy(records) => {
            tracing::warn!("Metadata file uses the legacy bare-array layout");
            Ok(records)
        }
        MetadataDocument::Versioned(file) => {
            if file.version != config::METADATA_VERSION {
                return Err(IndexError::corrupt(format!(
                    "unsupported metadata version {}",
                    file.version
                )));
            }
            if file.count != file.records.len() {
                return Err(IndexError::corrupt(format!(
                    "metadata declares {} records, holds {}",
                    file.count,
                    file.records.len()
                )));
            }
            let dim = dimension.unwrap_or(0);
            if file.dimension != dim {
                return Err(IndexError::corrupt(format!(
                    "metadata dimension {} != vector dimension {}",
                    file.dimension, dim
                )));
            }
            match file.vector_crc {
                Some(crc) if crc != vector_crc => {
                    return Err(IndexError::corrupt(format!(
                        "metadata belongs to vector file CRC32 {:#010x}, found {:#010x}",
                        crc, vector_crc
                    )));
                }
                Some(_) => {}
                None => tracing::warn!("Metadata file has no vector_crc; pairing not verified"),
            }
            Ok(file.records)
        }
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp_path = tmp_path_for(path);
    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("index"));
    name.push(".tmp");
    path.with_file_name(name)
}

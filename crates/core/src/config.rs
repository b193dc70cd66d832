//! Global configuration constants for ragindex.
//!
//! Input validation limits, file-format constants, and tool defaults are defined here.
//! These are compile-time constants; runtime configuration is handled via CLI arguments
//! and environment variables in the server binary.

/// Maximum allowed embedding dimension.
pub const MAX_DIMENSION: usize = 4096;

/// Maximum number of results (`k`) per search request.
pub const MAX_K: usize = 10_000;

/// Default number of neighbors retrieved for caption context.
pub const DEFAULT_K: usize = 3;

/// Default maximum caption length handed to the captioner.
pub const DEFAULT_MAX_CAPTION_LEN: usize = 30;

/// File extensions (lowercase) picked up by the index builder.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Default path of the binary vector file.
pub const DEFAULT_INDEX_PATH: &str = "data/index.vec";

/// Default path of the JSON metadata file.
pub const DEFAULT_META_PATH: &str = "data/meta.json";

/// Default directory scanned by a rebuild.
pub const DEFAULT_SAMPLE_DIR: &str = "data/samples";

/// Magic bytes at the start of a vector file.
pub const VECTOR_FILE_MAGIC: &[u8; 4] = b"RIV1";

/// Magic bytes preceding the CRC32 footer of a vector file.
pub const VECTOR_CRC_MAGIC: &[u8; 4] = b"VCR1";

/// Version written into the metadata document.
pub const METADATA_VERSION: u32 = 1;

/// Default HTTP server port.
pub const DEFAULT_PORT: u16 = 3030;

/// Per-request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum HTTP request body size in bytes (1 MB).
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

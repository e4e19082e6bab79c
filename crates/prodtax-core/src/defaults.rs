//! Centralized default constants for prodtax.
//!
//! Domain vocabulary (patterns, series, keywords) lives in
//! [`crate::taxonomy::builtin`]; this module holds the remaining shared
//! values so the library and the binary agree on them.

// =============================================================================
// DOCUMENT TAGS
// =============================================================================

/// Free-text tag used when no product category was detected.
pub const UNCATEGORIZED_TAG: &str = "uncategorized";

/// Separator used when list-valued tags are flattened into scalar metadata.
pub const LIST_SEPARATOR: &str = ",";

// =============================================================================
// CLI
// =============================================================================

/// Collection name used when none is given and none can be derived from the path.
pub const DEFAULT_COLLECTION: &str = "default";

/// Environment variable overriding the default collection name.
pub const COLLECTION_ENV: &str = "PRODTAX_DEFAULT_COLLECTION";

/// Default tracing filter when `RUST_LOG` is unset.
pub const LOG_FILTER: &str = "prodtax=info,prodtax_classify=info,prodtax_core=info";

/// Default log file name when `LOG_FILE` points at a directory.
pub const LOG_FILE_NAME: &str = "prodtax.log";

//! Structured logging schema and field name constants for prodtax.
//!
//! All crates use these constants for consistent structured logging fields,
//! so ingestion and query-time logs can be correlated by the same names.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Unreadable input in the binary, operation aborted |
//! | WARN  | Recoverable issue, input skipped or degraded |
//! | INFO  | Lifecycle events, batch completions |
//! | DEBUG | Decision points (category, power type, specificity, filter tier) |
//! | TRACE | Per-match data (individual model tokens, keyword hits) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "classify", "query", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "document_classifier", "query_classifier", "taxonomy"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "classify_document", "build_search_filter"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Document filename being classified.
pub const FILENAME: &str = "filename";

/// Collection the document is ingested into.
pub const COLLECTION: &str = "collection";

/// Search query text.
pub const QUERY: &str = "query";

// ─── Classification fields ─────────────────────────────────────────────────

/// Detected product category (or "none").
pub const CATEGORY: &str = "category";

/// First detected model number.
pub const MODEL_NUMBER: &str = "model_number";

/// Number of distinct model numbers found.
pub const MODEL_COUNT: &str = "model_count";

/// Detected power type.
pub const POWER_TYPE: &str = "power_type";

/// Detected specificity.
pub const SPECIFICITY: &str = "specificity";

/// Rule that decided a classification (e.g. "path_marker", "battery_override").
pub const RULE: &str = "rule";

/// Retrieval tier chosen for a query ("model", "category", "broad").
pub const TIER: &str = "tier";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Byte length of classified content.
pub const CONTENT_LEN: &str = "content_len";

/// Number of documents processed in a batch.
pub const DOCUMENT_COUNT: &str = "document_count";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Every field name above, for log pipelines that index a fixed schema.
pub const ALL_FIELDS: &[&str] = &[
    SUBSYSTEM,
    COMPONENT,
    OPERATION,
    FILENAME,
    COLLECTION,
    QUERY,
    CATEGORY,
    MODEL_NUMBER,
    MODEL_COUNT,
    POWER_TYPE,
    SPECIFICITY,
    RULE,
    TIER,
    DURATION_MS,
    CONTENT_LEN,
    DOCUMENT_COUNT,
    ERROR_MSG,
];

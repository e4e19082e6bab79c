//! Command implementations behind the `prodtax` binary.
//!
//! Every command returns the JSON (or text) it would print, so the binary
//! stays a thin argument-parsing shell and the commands can be tested
//! without spawning a process.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use prodtax_classify::defaults::{COLLECTION_ENV, DEFAULT_COLLECTION};
use prodtax_classify::{DocumentClassifier, DocumentTags, QueryClassifier, Taxonomy};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Output form of the `filter` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FilterFormat {
    /// Human-readable boolean expression
    Expr,
    /// Full query analysis (model, category, tier, filter)
    Json,
    /// Vector-store `where` clause
    Store,
}

/// One classified file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedFile {
    pub path: String,
    pub collection: String,
    pub tags: DocumentTags,
}

impl ClassifiedFile {
    /// The `--metadata` form: path, every covered model, and the flattened
    /// chunk metadata.
    pub fn to_metadata_json(&self) -> JsonValue {
        let metadata = self
            .tags
            .to_metadata()
            .with_collection(self.collection.as_str());
        serde_json::json!({
            "path": self.path,
            "models": self.tags.models(),
            "metadata": metadata,
        })
    }
}

/// Collection used when neither `--collection` nor a parent directory name
/// is available: `PRODTAX_DEFAULT_COLLECTION`, else the built-in default.
pub fn fallback_collection() -> String {
    std::env::var(COLLECTION_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_COLLECTION.to_string())
}

/// Explicit collection, else the file's parent directory name, else `fallback`.
pub fn resolve_collection(explicit: Option<&str>, path: &Path, fallback: &str) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| {
            path.parent()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| fallback.to_string())
}

/// Expand arguments into the list of files to classify.
///
/// Files are taken as given. Directories contribute their regular files,
/// descending into subdirectories only when `recursive` is set. Hidden
/// entries inside directories are skipped. Output is sorted per directory.
pub fn collect_paths(inputs: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let meta = std::fs::metadata(input)
            .with_context(|| format!("Cannot access {}", input.display()))?;

        if meta.is_file() {
            files.push(input.clone());
            continue;
        }

        let max_depth = if recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(input)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

        for entry in walker {
            let entry = entry.with_context(|| format!("Failed to walk {}", input.display()))?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
    }

    debug!(document_count = files.len(), "Collected input files");
    Ok(files)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|n| n.starts_with('.')).unwrap_or(false)
}

/// File content decoded as lossy UTF-8.
pub fn read_document(path: &Path) -> prodtax_classify::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read and classify one file.
pub fn classify_file(
    classifier: &DocumentClassifier<'_>,
    path: &Path,
    collection: &str,
) -> Result<ClassifiedFile> {
    let content =
        read_document(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_path = path.to_string_lossy();

    let tags = classifier.classify(&filename, &file_path, &content, collection);
    Ok(ClassifiedFile {
        path: file_path.into_owned(),
        collection: collection.to_string(),
        tags,
    })
}

/// Classify files in parallel. Results keep the input order.
///
/// Unreadable files are logged and skipped; the batch fails only if every
/// file failed.
pub fn classify_paths(
    taxonomy: &Taxonomy,
    paths: &[PathBuf],
    collection: Option<&str>,
    fallback: &str,
) -> Result<Vec<ClassifiedFile>> {
    let start = Instant::now();
    let classifier = DocumentClassifier::new(taxonomy);

    let results: Vec<Result<ClassifiedFile>> = paths
        .par_iter()
        .map(|path| {
            let collection = resolve_collection(collection, path, fallback);
            classify_file(&classifier, path, &collection)
        })
        .collect();

    let mut classified = Vec::with_capacity(results.len());
    let mut last_error = None;
    for result in results {
        match result {
            Ok(file) => classified.push(file),
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Skipping unreadable file");
                last_error = Some(e);
            }
        }
    }

    if classified.is_empty() {
        if let Some(e) = last_error {
            return Err(e.context("No input file could be classified"));
        }
    }

    info!(
        subsystem = "cli",
        op = "classify",
        document_count = classified.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Classification batch complete"
    );
    Ok(classified)
}

/// Render classified files as pretty JSON.
pub fn render_classified(
    files: &[ClassifiedFile],
    metadata: bool,
) -> prodtax_classify::Result<String> {
    let output = if metadata {
        JsonValue::Array(files.iter().map(ClassifiedFile::to_metadata_json).collect())
    } else {
        serde_json::to_value(files)?
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Render the retrieval filter for `query` in the requested format.
///
/// An empty query has no filter: `expr` prints `TRUE`, `store` prints `{}`.
pub fn render_filter(
    taxonomy: &Taxonomy,
    query: &str,
    format: FilterFormat,
) -> prodtax_classify::Result<String> {
    let analysis = QueryClassifier::new(taxonomy).analyze(query);

    let rendered = match format {
        FilterFormat::Expr => analysis
            .filter
            .map(|f| f.to_string())
            .unwrap_or_else(|| "TRUE".to_string()),
        FilterFormat::Json => serde_json::to_string_pretty(&analysis)?,
        FilterFormat::Store => {
            let clause = analysis
                .filter
                .map(|f| f.to_vector_store_json())
                .unwrap_or_else(|| serde_json::json!({}));
            serde_json::to_string_pretty(&clause)?
        }
    };
    Ok(rendered)
}

/// Render the taxonomy vocabulary as pretty JSON.
pub fn render_taxonomy(taxonomy: &Taxonomy) -> prodtax_classify::Result<String> {
    Ok(serde_json::to_string_pretty(taxonomy)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_collection_precedence() {
        let path = Path::new("/srv/docs/robot-collection/TM-850.pdf");
        assert_eq!(resolve_collection(Some("manuals"), path, "x"), "manuals");
        assert_eq!(resolve_collection(None, path, "x"), "robot-collection");
        assert_eq!(resolve_collection(None, Path::new("TM-850.pdf"), "x"), "x");
    }

    #[test]
    fn test_render_filter_empty_query() {
        let taxonomy = Taxonomy::shared();
        assert_eq!(
            render_filter(taxonomy, "", FilterFormat::Expr).unwrap(),
            "TRUE"
        );
        assert_eq!(
            render_filter(taxonomy, "  ", FilterFormat::Store).unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_render_filter_expr() {
        let rendered =
            render_filter(Taxonomy::shared(), "robot blades", FilterFormat::Expr).unwrap();
        assert_eq!(
            rendered,
            r#"product_category = "robot" OR specificity = "general""#
        );
    }

    #[test]
    fn test_read_document_missing_file_is_io_error() {
        let err = read_document(Path::new("/nonexistent/prodtax/TM-850.pdf")).unwrap_err();
        assert!(matches!(err, prodtax_classify::Error::Io(_)));
    }

    #[test]
    fn test_classify_file_adds_path_context() {
        let classifier = DocumentClassifier::default();
        let err = classify_file(&classifier, Path::new("/nonexistent/x.txt"), "c").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/x.txt"));
        assert!(err.downcast_ref::<prodtax_classify::Error>().is_some());
    }

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(std::ffi::OsStr::new(".git")));
        assert!(!is_hidden(std::ffi::OsStr::new("TM-850.pdf")));
    }
}

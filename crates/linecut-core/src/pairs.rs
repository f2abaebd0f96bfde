//! Pairing ALTO documents with their page images.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::LinecutConfig;
use crate::error::Result;

/// Candidate image extensions, in match priority order.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["tif", "jpeg", "jpg", "png"];

/// One ALTO document matched to its page image.
#[derive(Debug, Clone)]
pub struct DocumentPair {
    /// Path to the ALTO-XML layout file.
    pub xml_path: PathBuf,
    /// Path to the matched page image.
    pub image_path: PathBuf,
}

impl DocumentPair {
    /// Name of the per-document output subdirectory: the image filename up
    /// to the first `.`, so `page1.alto.tif` maps to `page1`.
    pub fn output_name(&self) -> &str {
        let name = self
            .image_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("page");
        name.split('.').next().unwrap_or(name)
    }
}

/// Result of scanning an input directory.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Matched document pairs, in processing order.
    pub pairs: Vec<DocumentPair>,
    /// ALTO files with no matching image under any candidate extension.
    pub unmatched: Vec<PathBuf>,
}

/// Scan `input_dir` (non-recursively) for `<base>.xml` documents and match
/// each to the first `<base>.<ext>` image that exists on disk, trying the
/// configured extensions in priority order.
pub fn scan_directory(input_dir: &Path, config: &LinecutConfig) -> Result<ScanReport> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(input_dir)? {
        entries.push(entry?.path());
    }
    if config.sort_entries {
        entries.sort();
    }

    let mut report = ScanReport::default();

    for path in entries {
        if path.extension().and_then(|e| e.to_str()) != Some("xml") {
            continue;
        }
        let base = match path.file_stem().and_then(|s| s.to_str()) {
            Some(base) => base,
            None => continue,
        };

        let image_path = config
            .image_extensions
            .iter()
            .map(|ext| input_dir.join(format!("{}.{}", base, ext)))
            .find(|candidate| candidate.exists());

        match image_path {
            Some(image_path) => {
                debug!(
                    "Matched {} to {}",
                    path.display(),
                    image_path.display()
                );
                report.pairs.push(DocumentPair {
                    xml_path: path,
                    image_path,
                });
            }
            None => report.unmatched.push(path),
        }
    }

    Ok(report)
}

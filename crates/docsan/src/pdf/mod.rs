//! PDF introspection and sanitization over the indirect-object graph.
//!
//! `lopdf` is the object arena: indirect references are `(id, generation)`
//! pairs resolved through `Document::objects`, never owning pointers, so
//! removing a catalog entry can orphan a subtree without creating cycles.

mod state;
mod strip;

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use lopdf::Document;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SanitizeError};
use crate::fsutil;
use crate::report::Sanitized;

pub use state::read_state;

/// Number of strip-and-serialize rounds per sanitize.
///
/// Serialization can resurrect constructs the first round removed (a writer
/// postprocessing step regenerating metadata, for instance), so the output
/// of each round is reopened and stripped again.
const STRIP_PASSES: usize = 2;

/// Metadata fingerprint of a PDF file.
///
/// `sha256` and `size_bytes` describe the file at read time and are never
/// compared by the diff engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfMetadataState {
    pub sha256: String,
    pub size_bytes: u64,
    pub docinfo: BTreeMap<String, String>,
    pub xmp_present: bool,
    #[serde(default)]
    pub trailer_id: Option<(String, Option<String>)>,
    pub has_outlines: bool,
    pub has_openaction: bool,
    pub has_viewer_prefs: bool,
    #[serde(default)]
    pub lang: Option<String>,
    pub attachments: Vec<String>,
    pub javascript_names: usize,
    pub acroform_present: bool,
    pub page_metadata_count: usize,
}

fn strip_and_save(src: &Path, dst: &Path) -> Result<()> {
    let mut doc = Document::load(src).map_err(|e| SanitizeError::DocumentOpen {
        path: src.to_path_buf(),
        source: e,
    })?;

    strip::strip(&mut doc);

    let mut file = File::create(dst).map_err(|e| SanitizeError::WriteFile {
        path: dst.to_path_buf(),
        source: e,
    })?;
    doc.save_to(&mut file).map_err(|e| SanitizeError::WritePdf {
        path: dst.to_path_buf(),
        source: lopdf::Error::IO(e),
    })
}

/// Strips `path` in place and reports the before/after fingerprints.
///
/// The original file is untouched until the final rename; on any failure the
/// staged temporaries are removed and the error propagates.
pub fn sanitize_inplace(path: &Path) -> Result<Sanitized<PdfMetadataState>> {
    let _span = tracing::info_span!("sanitize.pdf", file = %fsutil::redact_path(path)).entered();

    let old = read_state(path)?;

    let mut temps: Vec<PathBuf> = Vec::with_capacity(STRIP_PASSES);
    let staged = (|| {
        let mut src = path.to_path_buf();
        for _ in 0..STRIP_PASSES {
            let tmp = fsutil::sibling_temp_path(path);
            strip_and_save(&src, &tmp)?;
            temps.push(tmp.clone());
            src = tmp;
        }
        Ok(src)
    })();

    let result = staged.and_then(|final_tmp| fsutil::atomic_replace(&final_tmp, path));
    for tmp in &temps {
        fsutil::remove_quietly(tmp);
    }
    result?;

    // Report what was actually persisted, not the in-memory graph.
    let new = read_state(path)?;
    tracing::info!(
        file = %fsutil::redact_path(path),
        docinfo_removed = old.docinfo.len().saturating_sub(new.docinfo.len()),
        "sanitized PDF"
    );

    Ok(Sanitized {
        old,
        new,
        path: path.to_path_buf(),
    })
}

/// Copies `path` to `dest` and sanitizes the copy; the source is unmodified.
pub fn sanitize_to(path: &Path, dest: &Path) -> Result<Sanitized<PdfMetadataState>> {
    fsutil::copy_file(path, dest)?;
    sanitize_inplace(dest)
}

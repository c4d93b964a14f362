//! Per-file processing: the entry point driven by CLI/GUI collaborators.
//!
//! Everything here works on already-resolved parameters. Path discovery,
//! batch iteration, progress reporting, and logging setup belong to the
//! caller; a batch runner is expected to catch a per-file error, record it,
//! and continue with the remaining files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::diff::{diff_docx, diff_pdf};
use crate::error::{Result, SanitizeError};
use crate::fsutil;
use crate::report::{now_iso, DocumentKind, FileReport, MetadataState, OutputMode, Preset};
use crate::{docx, pdf};

/// Caller-resolved parameters for one processing run.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub preset: Preset,
    pub mode: OutputMode,
    /// Destination directory, required for [`OutputMode::Export`].
    pub out_dir: Option<PathBuf>,
    /// Persist a JSON sidecar next to the output file.
    pub sidecar: bool,
    /// Report only; no file is written or replaced.
    pub dry_run: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            preset: Preset::default(),
            mode: OutputMode::default(),
            out_dir: None,
            sidecar: true,
            dry_run: false,
        }
    }
}

/// Detects the format of `path`, sanitizes it according to `options`, and
/// returns the assembled report.
pub fn process_file(path: &Path, options: &ProcessOptions) -> Result<FileReport> {
    let kind = DocumentKind::from_path(path)?;
    let started = Instant::now();
    let _span = tracing::info_span!(
        "process",
        file = %fsutil::redact_path(path),
        kind = kind.as_str(),
        mode = options.mode.as_str(),
        preset = options.preset.as_str(),
    )
    .entered();

    let dest = match options.mode {
        OutputMode::Export => Some(export_destination(path, options)?),
        OutputMode::Backup => {
            if !options.dry_run {
                let backup = backup_path(path);
                if !backup.exists() {
                    fsutil::copy_file(path, &backup)?;
                }
            }
            None
        }
        OutputMode::Replace => None,
    };
    let output_path = dest.clone().unwrap_or_else(|| path.to_path_buf());

    let (old, new, actions) = if options.dry_run {
        dry_run_snapshot(kind)
    } else {
        match kind {
            DocumentKind::Pdf => {
                let outcome = match &dest {
                    Some(dest) => pdf::sanitize_to(path, dest)?,
                    None => pdf::sanitize_inplace(path)?,
                };
                let (actions, _removed) = diff_pdf(&outcome.old, &outcome.new);
                (outcome.old.into(), outcome.new.into(), actions)
            }
            DocumentKind::Docx => {
                let outcome = match &dest {
                    Some(dest) => docx::sanitize_to(path, dest)?,
                    None => docx::sanitize_inplace(path)?,
                };
                let (actions, _removed) = diff_docx(&outcome.old, &outcome.new);
                (outcome.old.into(), outcome.new.into(), actions)
            }
        }
    };

    let report = FileReport {
        sanitized_at_utc: now_iso(),
        document: path.display().to_string(),
        kind,
        old,
        new,
        actions,
        errors: None,
        duration_ms: started.elapsed().as_millis() as u64,
        preset: options.preset,
        output_mode: options.mode,
    };

    if options.sidecar && !options.dry_run {
        report.write_sidecar(&output_path)?;
    }

    Ok(report)
}

fn export_destination(path: &Path, options: &ProcessOptions) -> Result<PathBuf> {
    let out_dir = options
        .out_dir
        .as_deref()
        .ok_or(SanitizeError::ExportDestinationMissing)?;
    let Some(name) = path.file_name() else {
        return Err(SanitizeError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    };
    if !options.dry_run {
        fs::create_dir_all(out_dir).map_err(|e| SanitizeError::WriteFile {
            path: out_dir.to_path_buf(),
            source: e,
        })?;
    }
    Ok(out_dir.join(name))
}

fn backup_path(path: &Path) -> PathBuf {
    match path.file_name() {
        Some(name) => path.with_file_name(format!("{}.bak", name.to_string_lossy())),
        None => path.with_extension("bak"),
    }
}

fn dry_run_snapshot(kind: DocumentKind) -> (MetadataState, MetadataState, Vec<String>) {
    match kind {
        DocumentKind::Pdf => (
            MetadataState::Pdf(Default::default()),
            MetadataState::Pdf(Default::default()),
            Vec::new(),
        ),
        DocumentKind::Docx => (
            MetadataState::Docx(Default::default()),
            MetadataState::Docx(Default::default()),
            Vec::new(),
        ),
    }
}

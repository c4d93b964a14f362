//! Run reports and the JSON sidecar persisted next to sanitized output.

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::docx::DocxMetadataState;
use crate::error::{Result, SanitizeError};
use crate::pdf::PdfMetadataState;

/// Document kind, detected from the file extension by the caller-facing
/// entry point. The single origin of the unsupported-format error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("pdf") => Ok(Self::Pdf),
            Some("docx") => Ok(Self::Docx),
            _ => Err(SanitizeError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }
}

/// Aggressiveness preset resolved by the caller. Recorded in the report
/// verbatim; the sanitizers currently behave identically under all three.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Safe,
    #[default]
    Balanced,
    Aggressive,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Balanced => "balanced",
            Self::Aggressive => "aggressive",
        }
    }
}

/// Where sanitized output lands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Overwrite the source atomically.
    #[default]
    Replace,
    /// Keep a `.bak` copy next to the source, then overwrite.
    Backup,
    /// Copy into a destination directory and sanitize the copy.
    Export,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Backup => "backup",
            Self::Export => "export",
        }
    }
}

/// Format-specific fingerprint snapshot carried by a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataState {
    Pdf(PdfMetadataState),
    Docx(DocxMetadataState),
}

impl From<PdfMetadataState> for MetadataState {
    fn from(state: PdfMetadataState) -> Self {
        Self::Pdf(state)
    }
}

impl From<DocxMetadataState> for MetadataState {
    fn from(state: DocxMetadataState) -> Self {
        Self::Docx(state)
    }
}

/// Result of one sanitize operation: the before/after fingerprints and the
/// path that now holds the sanitized bytes.
#[derive(Debug, Clone)]
pub struct Sanitized<S> {
    pub old: S,
    pub new: S,
    pub path: PathBuf,
}

/// The unit of output: one report per processed file, immutable after
/// construction, optionally persisted as a JSON sidecar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub sanitized_at_utc: String,
    pub document: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub old: MetadataState,
    pub new: MetadataState,
    pub actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<String>,
    pub duration_ms: u64,
    pub preset: Preset,
    pub output_mode: OutputMode,
}

impl FileReport {
    /// Sidecar location for a given output file: `<filename>.sanitize.json`
    /// in the same directory.
    pub fn sidecar_path(output: &Path) -> PathBuf {
        match output.file_name() {
            Some(name) => {
                output.with_file_name(format!("{}.sanitize.json", name.to_string_lossy()))
            }
            None => output.with_extension("sanitize.json"),
        }
    }

    /// Persists the report as pretty-printed JSON next to `output`.
    pub fn write_sidecar(&self, output: &Path) -> Result<PathBuf> {
        let sidecar = Self::sidecar_path(output);
        let payload = serde_json::to_string_pretty(self)?;
        std::fs::write(&sidecar, payload).map_err(|e| SanitizeError::WriteFile {
            path: sidecar.clone(),
            source: e,
        })?;
        Ok(sidecar)
    }
}

/// Current UTC time as ISO-8601 with seconds precision.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SanitizeError {
    #[error("Unsupported document format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to open PDF '{path}': {source}")]
    DocumentOpen {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    #[error("Failed to open package '{path}': {source}")]
    PackageOpen {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to read '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize PDF to '{path}': {source}")]
    WritePdf {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    #[error("Failed to write archive '{path}': {source}")]
    WritePackage {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to rewrite part '{name}': {source}")]
    RewritePart {
        name: String,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to replace '{to}' with '{from}': {source}")]
    AtomicReplace {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Export mode requires a destination directory")]
    ExportDestinationMissing,

    #[error("Failed to encode report: {0}")]
    EncodeReport(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SanitizeError>;

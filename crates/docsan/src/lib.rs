//! Core engine for stripping privacy- and provenance-leaking metadata from
//! PDF and OOXML (DOCX) documents.
//!
//! The crate exposes two format engines and the shared plumbing around them:
//!
//! - [`pdf`]: fingerprints and strips the PDF indirect-object graph
//!   (document info, XMP, outlines, open actions, JavaScript and embedded
//!   file name trees, form artifacts, page-level metadata, file identity).
//! - [`docx`]: fingerprints and rewrites an OOXML package (core/extended
//!   properties blanked, custom properties and thumbnails dropped along with
//!   their content-type overrides).
//! - [`diff`]: turns a before/after fingerprint pair into an ordered action
//!   list and a removed-item count.
//! - [`report`]: the per-file report and its JSON sidecar.
//! - [`ops`]: the per-file entry point combining the above.
//!
//! Each sanitize operation is synchronous and self-contained: read, mutate
//! into a staged temporary, atomically replace, re-read. Independent files
//! may be processed on parallel worker threads; the same path must not be
//! handed to two concurrent operations, which callers enforce by serializing
//! per path. The crate never installs a tracing subscriber and never
//! discovers paths on its own; both belong to the embedding application.

pub mod diff;
pub mod docx;
pub mod error;
mod fsutil;
pub mod ops;
pub mod pdf;
pub mod report;

pub use diff::{diff_docx, diff_pdf};
pub use docx::DocxMetadataState;
pub use error::{Result, SanitizeError};
pub use ops::{process_file, ProcessOptions};
pub use pdf::PdfMetadataState;
pub use report::{DocumentKind, FileReport, MetadataState, OutputMode, Preset, Sanitized};

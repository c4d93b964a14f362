//! OOXML package introspection and sanitization.
//!
//! A package is a zip archive of named parts plus the `[Content_Types].xml`
//! manifest. Sanitization rewrites the archive part-by-part: property parts
//! are blanked, the custom-properties and thumbnail parts are dropped along
//! with their manifest overrides, everything else is copied byte-for-byte.

mod props;

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::{Result, SanitizeError};
use crate::fsutil;
use crate::report::Sanitized;

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const CORE_PART: &str = "docProps/core.xml";
const APP_PART: &str = "docProps/app.xml";
const CUSTOM_PART: &str = "docProps/custom.xml";
/// Compared against lower-cased part names; thumbnails vary in extension.
const THUMBNAIL_PREFIX: &str = "docprops/thumbnail";

/// Metadata fingerprint of an OOXML package.
///
/// The maps hold only recognized properties that are present with non-empty
/// text, keyed by their canonical prefixed name (`dc:title`, `ep:Company`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocxMetadataState {
    pub core: BTreeMap<String, String>,
    pub dcterms: BTreeMap<String, String>,
    pub app: BTreeMap<String, String>,
    pub custom_props_present: bool,
    pub thumbnail_present: bool,
}

/// Reads the metadata fingerprint of the package at `path` without modifying
/// it.
pub fn read_state(path: &Path) -> Result<DocxMetadataState> {
    let mut archive = open_package(path)?;
    Ok(read_props(&mut archive))
}

fn open_package(path: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(path).map_err(|e| SanitizeError::PackageOpen {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    ZipArchive::new(file).map_err(|e| SanitizeError::PackageOpen {
        path: path.to_path_buf(),
        source: e,
    })
}

fn read_props<R: Read + Seek>(archive: &mut ZipArchive<R>) -> DocxMetadataState {
    let mut state = DocxMetadataState::default();

    if let Some(xml) = read_part(archive, CORE_PART) {
        match props::parse_core(&String::from_utf8_lossy(&xml)) {
            Ok((core, dcterms)) => {
                state.core = core;
                state.dcterms = dcterms;
            }
            Err(e) => {
                tracing::debug!(part = CORE_PART, error = %e, "ignoring unparseable property part")
            }
        }
    }

    if let Some(xml) = read_part(archive, APP_PART) {
        match props::parse_app(&String::from_utf8_lossy(&xml)) {
            Ok(app) => state.app = app,
            Err(e) => {
                tracing::debug!(part = APP_PART, error = %e, "ignoring unparseable property part")
            }
        }
    }

    state.custom_props_present = archive.file_names().any(|name| name == CUSTOM_PART);
    state.thumbnail_present = archive
        .file_names()
        .any(|name| name.to_ascii_lowercase().starts_with(THUMBNAIL_PREFIX));

    state
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Option<Vec<u8>> {
    match archive.by_name(name) {
        Ok(mut part) => {
            let mut contents = Vec::new();
            match part.read_to_end(&mut contents) {
                Ok(_) => Some(contents),
                Err(e) => {
                    tracing::debug!(part = name, error = %e, "failed to read package part");
                    None
                }
            }
        }
        Err(ZipError::FileNotFound) => None,
        Err(e) => {
            tracing::debug!(part = name, error = %e, "failed to open package part");
            None
        }
    }
}

/// Sanitizes the package at `path` in place and reports the before/after
/// fingerprints. The original archive is untouched until the staged rewrite
/// is atomically renamed over it.
pub fn sanitize_inplace(path: &Path) -> Result<Sanitized<DocxMetadataState>> {
    let _span = tracing::info_span!("sanitize.docx", file = %fsutil::redact_path(path)).entered();

    let mut archive = open_package(path)?;
    let old = read_props(&mut archive);

    let staged = fsutil::sibling_temp_path(path);
    let rewritten = rewrite_package(&mut archive, path, &staged)
        .and_then(|_| fsutil::atomic_replace(&staged, path));
    if let Err(e) = rewritten {
        fsutil::remove_quietly(&staged);
        return Err(e);
    }

    let mut archive = open_package(path)?;
    let new = read_props(&mut archive);
    tracing::info!(
        file = %fsutil::redact_path(path),
        properties_before = old.core.len() + old.dcterms.len() + old.app.len(),
        "sanitized package"
    );

    Ok(Sanitized {
        old,
        new,
        path: path.to_path_buf(),
    })
}

/// Copies `path` to `dest` and sanitizes the copy; the source is unmodified.
pub fn sanitize_to(path: &Path, dest: &Path) -> Result<Sanitized<DocxMetadataState>> {
    fsutil::copy_file(path, dest)?;
    sanitize_inplace(dest)
}

fn rewrite_package(archive: &mut ZipArchive<File>, source: &Path, dest: &Path) -> Result<()> {
    // Parts dropped wholesale; their manifest overrides go with them.
    let mut dropped: BTreeSet<String> = BTreeSet::new();
    for name in archive.file_names() {
        let lowered = name.to_ascii_lowercase();
        if name == CUSTOM_PART || lowered.starts_with(THUMBNAIL_PREFIX) {
            dropped.insert(lowered);
        }
    }

    let target = File::create(dest).map_err(|e| SanitizeError::WriteFile {
        path: dest.to_path_buf(),
        source: e,
    })?;
    let mut writer = ZipWriter::new(target);

    for index in 0..archive.len() {
        let mut part = archive
            .by_index(index)
            .map_err(|e| SanitizeError::PackageOpen {
                path: source.to_path_buf(),
                source: e,
            })?;
        let name = part.name().to_string();
        if dropped.contains(&name.to_ascii_lowercase()) {
            continue;
        }

        let mut options = FileOptions::<'_, ()>::default().compression_method(part.compression());
        if let Some(mode) = part.unix_mode() {
            options = options.unix_permissions(mode);
        }
        if let Some(time) = part.last_modified() {
            options = options.last_modified_time(time);
        }

        if part.is_dir() {
            writer
                .add_directory(name, options)
                .map_err(|e| SanitizeError::WritePackage {
                    path: dest.to_path_buf(),
                    source: e,
                })?;
            continue;
        }

        let mut contents = Vec::new();
        part.read_to_end(&mut contents)
            .map_err(|e| SanitizeError::ReadFile {
                path: source.to_path_buf(),
                source: e,
            })?;

        let contents = transform_part(&name, contents, &dropped)?;

        writer
            .start_file(name, options)
            .map_err(|e| SanitizeError::WritePackage {
                path: dest.to_path_buf(),
                source: e,
            })?;
        writer
            .write_all(&contents)
            .map_err(|e| SanitizeError::WriteFile {
                path: dest.to_path_buf(),
                source: e,
            })?;
    }

    writer.finish().map_err(|e| SanitizeError::WritePackage {
        path: dest.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

fn transform_part(name: &str, contents: Vec<u8>, dropped: &BTreeSet<String>) -> Result<Vec<u8>> {
    let rewritten = match name {
        // An untouched removal set means an untouched manifest.
        CONTENT_TYPES_PART if !dropped.is_empty() => {
            props::strip_content_type_overrides(&String::from_utf8_lossy(&contents), dropped)
        }
        CORE_PART => props::blank_core(&String::from_utf8_lossy(&contents)),
        APP_PART => props::blank_app(&String::from_utf8_lossy(&contents)),
        _ => return Ok(contents),
    };

    rewritten.map_err(|e| SanitizeError::RewritePart {
        name: name.to_string(),
        source: e,
    })
}

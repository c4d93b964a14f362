//! Read-only fingerprint extraction from a parsed PDF.
//!
//! Every probe is best-effort: a field that cannot be resolved or decoded is
//! reported at its default (empty/false/absent) and never aborts the read.
//! Only a document that fails to parse at all is a hard error.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use lopdf::{Dictionary, Document, Object};

use crate::error::{Result, SanitizeError};
use crate::fsutil;

use super::PdfMetadataState;

/// Name trees nest via /Kids; malformed files can nest them into a loop.
const NAME_TREE_MAX_DEPTH: usize = 16;

/// Reads the metadata fingerprint of the PDF at `path` without modifying it.
pub fn read_state(path: &Path) -> Result<PdfMetadataState> {
    let size_bytes = fs::metadata(path)
        .map_err(|e| SanitizeError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?
        .len();
    let sha256 = fsutil::sha256_file(path)?;

    let doc = Document::load(path).map_err(|e| SanitizeError::DocumentOpen {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut state = PdfMetadataState {
        sha256,
        size_bytes,
        ..PdfMetadataState::default()
    };

    state.docinfo = docinfo(&doc);
    state.trailer_id = trailer_id(&doc);

    if let Some(catalog) = catalog(&doc) {
        state.xmp_present = catalog.has(b"Metadata");
        state.has_outlines = catalog.has(b"Outlines");
        state.has_openaction = catalog.has(b"OpenAction") || catalog.has(b"AA");
        state.has_viewer_prefs = catalog.has(b"ViewerPreferences");
        state.lang = catalog.get(b"Lang").ok().and_then(|obj| decode_text(&doc, obj));
        state.javascript_names = javascript_names(&doc, catalog);
        state.attachments = attachments(&doc, catalog);
        state.acroform_present = acroform_present(&doc, catalog);
    }

    state.page_metadata_count = page_metadata_count(&doc);

    Ok(state)
}

fn catalog(doc: &Document) -> Option<&Dictionary> {
    doc.trailer
        .get(b"Root")
        .ok()
        .and_then(|obj| deref_dictionary(doc, obj))
}

fn deref_dictionary<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Reference(reference) => doc.get_dictionary(*reference).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(reference) => doc.get_object(*reference).unwrap_or(obj),
        _ => obj,
    }
}

fn docinfo(doc: &Document) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    let Some(info) = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|obj| deref_dictionary(doc, obj))
    else {
        return out;
    };

    for (key, value) in info.iter() {
        let Ok(key) = std::str::from_utf8(key) else {
            tracing::debug!("skipping document-info entry with non-UTF-8 key");
            continue;
        };
        match decode_text(doc, value) {
            Some(text) => {
                out.insert(format!("/{key}"), text);
            }
            None => tracing::debug!(key, "skipping undecodable document-info entry"),
        }
    }
    out
}

/// Text-string decoding: UTF-16BE when BOM-prefixed, lossy UTF-8 otherwise.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        String::from_utf8_lossy(bytes).to_string()
    }
}

fn decode_text(doc: &Document, obj: &Object) -> Option<String> {
    match resolve(doc, obj) {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).to_string()),
        _ => None,
    }
}

fn trailer_id(doc: &Document) -> Option<(String, Option<String>)> {
    let halves = match doc.trailer.get(b"ID").ok()? {
        Object::Array(halves) => halves,
        _ => return None,
    };
    let first = hex_half(halves.first()?)?;
    let second = halves.get(1).and_then(hex_half);
    Some((first, second))
}

fn hex_half(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(bytes.iter().map(|b| format!("{b:02x}")).collect()),
        _ => None,
    }
}

fn javascript_names(doc: &Document, catalog: &Dictionary) -> usize {
    let Some(names) = catalog
        .get(b"Names")
        .ok()
        .and_then(|obj| deref_dictionary(doc, obj))
    else {
        return 0;
    };
    let Some(javascript) = names
        .get(b"JavaScript")
        .ok()
        .and_then(|obj| deref_dictionary(doc, obj))
    else {
        return 0;
    };

    match javascript.get(b"Names").ok().map(|obj| resolve(doc, obj)) {
        Some(Object::Array(entries)) => entries.len() / 2,
        // A tree we cannot interpret still signals embedded JavaScript.
        Some(_) => 1,
        None => 0,
    }
}

fn attachments(doc: &Document, catalog: &Dictionary) -> Vec<String> {
    let mut out = Vec::new();
    let embedded = catalog
        .get(b"Names")
        .ok()
        .and_then(|obj| deref_dictionary(doc, obj))
        .and_then(|names| names.get(b"EmbeddedFiles").ok())
        .and_then(|obj| deref_dictionary(doc, obj));
    if let Some(node) = embedded {
        collect_name_tree_keys(doc, node, &mut out, 0);
    }
    out
}

fn collect_name_tree_keys(doc: &Document, node: &Dictionary, out: &mut Vec<String>, depth: usize) {
    if depth > NAME_TREE_MAX_DEPTH {
        return;
    }

    if let Some(Object::Array(pairs)) = node.get(b"Names").ok().map(|obj| resolve(doc, obj)) {
        for pair in pairs.chunks(2) {
            if let Some(Object::String(bytes, _)) = pair.first().map(|obj| resolve(doc, obj)) {
                out.push(decode_pdf_string(bytes));
            }
        }
    }

    if let Some(Object::Array(kids)) = node.get(b"Kids").ok().map(|obj| resolve(doc, obj)) {
        for kid in kids {
            if let Some(child) = deref_dictionary(doc, kid) {
                collect_name_tree_keys(doc, child, out, depth + 1);
            }
        }
    }
}

fn acroform_present(doc: &Document, catalog: &Dictionary) -> bool {
    match catalog.get(b"AcroForm").ok().map(|obj| resolve(doc, obj)) {
        Some(Object::Dictionary(form)) => !form.is_empty(),
        Some(Object::Null) | None => false,
        Some(_) => true,
    }
}

fn page_metadata_count(doc: &Document) -> usize {
    const PAGE_KEYS: [&[u8]; 3] = [b"Metadata", b"LastModified", b"PieceInfo"];

    doc.get_pages()
        .values()
        .filter(|page_id| {
            doc.get_dictionary(**page_id)
                .map(|page| PAGE_KEYS.iter().any(|key| page.has(key)))
                .unwrap_or(false)
        })
        .count()
}

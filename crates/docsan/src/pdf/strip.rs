//! In-memory removal of the metadata fingerprint from a PDF object graph.
//!
//! Each step is best-effort and independent: a key that cannot be removed
//! (unresolvable reference, unexpected object shape) is skipped without
//! stopping the remaining removals.

use std::collections::HashSet;

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use uuid::Uuid;

/// Catalog entries dropped outright.
const CATALOG_STRIP_KEYS: [&[u8]; 8] = [
    b"Metadata",
    b"PieceInfo",
    b"AF",
    b"OpenAction",
    b"AA",
    b"Outlines",
    b"ViewerPreferences",
    b"Lang",
];

/// Page-level entries dropped from every page object.
const PAGE_STRIP_KEYS: [&[u8]; 4] = [b"Metadata", b"LastModified", b"PieceInfo", b"AA"];

pub(crate) fn strip(doc: &mut Document) {
    strip_document_info(doc);

    if let Some(catalog_id) = catalog_id(doc) {
        strip_catalog_keys(doc, catalog_id);
        strip_name_trees(doc, catalog_id);
        strip_acroform(doc, catalog_id);
    }

    strip_pages(doc);
    regenerate_file_id(doc);

    // Subtrees cut loose above (outline nodes, XMP streams, embedded file
    // payloads) must not survive serialization as unreferenced objects.
    prune_orphans(doc);
}

fn catalog_id(doc: &Document) -> Option<ObjectId> {
    doc.trailer
        .get(b"Root")
        .ok()
        .and_then(|obj| obj.as_reference().ok())
}

fn dict_mut(doc: &mut Document, id: ObjectId) -> Option<&mut Dictionary> {
    doc.objects.get_mut(&id).and_then(|obj| obj.as_dict_mut().ok())
}

fn strip_document_info(doc: &mut Document) {
    if let Some(Object::Reference(info_id)) = doc.trailer.remove(b"Info") {
        doc.objects.remove(&info_id);
    }
}

fn strip_catalog_keys(doc: &mut Document, catalog_id: ObjectId) {
    let mut orphaned = Vec::new();
    if let Some(catalog) = dict_mut(doc, catalog_id) {
        for key in CATALOG_STRIP_KEYS {
            if let Some(Object::Reference(id)) = catalog.remove(key) {
                orphaned.push(id);
            }
        }
    }
    for id in orphaned {
        doc.objects.remove(&id);
    }
}

/// Applies `f` to the dictionary stored under `key` in the catalog, following
/// at most one indirect reference. Returns the entry's object id (when
/// indirect) and `f`'s result, or `None` when no such dictionary exists.
fn with_catalog_entry<F>(
    doc: &mut Document,
    catalog_id: ObjectId,
    key: &[u8],
    f: F,
) -> Option<(Option<ObjectId>, bool)>
where
    F: Fn(&mut Dictionary) -> bool,
{
    let target = match doc
        .get_dictionary(catalog_id)
        .ok()
        .and_then(|catalog| catalog.get(key).ok())
    {
        Some(Object::Reference(id)) => Some(*id),
        Some(Object::Dictionary(_)) => None,
        _ => return None,
    };

    let result = match target {
        Some(id) => dict_mut(doc, id).map(&f),
        None => dict_mut(doc, catalog_id)
            .and_then(|catalog| catalog.get_mut(key).ok())
            .and_then(|obj| obj.as_dict_mut().ok())
            .map(&f),
    }?;

    Some((target, result))
}

fn remove_catalog_entry(doc: &mut Document, catalog_id: ObjectId, key: &[u8], target: Option<ObjectId>) {
    if let Some(catalog) = dict_mut(doc, catalog_id) {
        catalog.remove(key);
    }
    if let Some(id) = target {
        doc.objects.remove(&id);
    }
}

fn strip_name_trees(doc: &mut Document, catalog_id: ObjectId) {
    let Some((target, emptied)) = with_catalog_entry(doc, catalog_id, b"Names", |names| {
        names.remove(b"EmbeddedFiles");
        names.remove(b"JavaScript");
        names.is_empty()
    }) else {
        return;
    };

    if emptied {
        remove_catalog_entry(doc, catalog_id, b"Names", target);
    }
}

fn strip_acroform(doc: &mut Document, catalog_id: ObjectId) {
    let Some((target, has_fields)) = with_catalog_entry(doc, catalog_id, b"AcroForm", |form| {
        form.remove(b"XFA");
        form.remove(b"NeedAppearances");
        match form.get(b"Fields") {
            Ok(Object::Array(fields)) => !fields.is_empty(),
            // Indirect or malformed field list: keep the form.
            Ok(_) => true,
            Err(_) => false,
        }
    }) else {
        return;
    };

    if !has_fields {
        remove_catalog_entry(doc, catalog_id, b"AcroForm", target);
    }
}

fn strip_pages(doc: &mut Document) {
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    for page_id in page_ids {
        if let Some(page) = dict_mut(doc, page_id) {
            for key in PAGE_STRIP_KEYS {
                page.remove(key);
            }
        }
    }
}

/// Replaces the trailer identifier with two fresh 16-byte random values,
/// changing the file identity while leaving content otherwise equivalent.
fn regenerate_file_id(doc: &mut Document) {
    let half = || Object::String(Uuid::new_v4().into_bytes().to_vec(), StringFormat::Hexadecimal);
    doc.trailer.set("ID", Object::Array(vec![half(), half()]));
}

/// Mark-and-sweep over the object arena: everything unreachable from the
/// trailer is dropped before serialization.
fn prune_orphans(doc: &mut Document) {
    let mut reachable: HashSet<ObjectId> = HashSet::new();
    let mut stack: Vec<ObjectId> = Vec::new();

    for (_, value) in doc.trailer.iter() {
        collect_references(value, &mut stack);
    }
    while let Some(id) = stack.pop() {
        if !reachable.insert(id) {
            continue;
        }
        if let Ok(obj) = doc.get_object(id) {
            collect_references(obj, &mut stack);
        }
    }

    doc.objects.retain(|id, _| reachable.contains(id));
}

fn collect_references(obj: &Object, out: &mut Vec<ObjectId>) {
    match obj {
        Object::Reference(id) => out.push(*id),
        Object::Array(items) => {
            for item in items {
                collect_references(item, out);
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter() {
                collect_references(value, out);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter() {
                collect_references(value, out);
            }
        }
        _ => {}
    }
}

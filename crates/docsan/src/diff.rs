//! Before/after fingerprint diffing.
//!
//! Pure functions over two same-format states. The removed count is a coarse
//! severity signal: keyed properties and presence flags count one each, while
//! the counted categories (JavaScript entries, attachments, page metadata)
//! contribute their full numeric decrease behind a single action line.

use crate::docx::DocxMetadataState;
use crate::pdf::PdfMetadataState;

/// Compares two PDF fingerprints into `(actions, removed_count)`.
pub fn diff_pdf(old: &PdfMetadataState, new: &PdfMetadataState) -> (Vec<String>, usize) {
    let mut actions = Vec::new();
    let mut removed = 0usize;

    for key in old.docinfo.keys() {
        if !new.docinfo.contains_key(key) {
            actions.push(format!("docinfo:{key} removed"));
            removed += 1;
        }
    }

    let flags = [
        (old.xmp_present, new.xmp_present, "xmp_present"),
        (old.has_outlines, new.has_outlines, "has_outlines"),
        (old.has_openaction, new.has_openaction, "has_openaction"),
        (old.has_viewer_prefs, new.has_viewer_prefs, "has_viewer_prefs"),
        (old.acroform_present, new.acroform_present, "acroform_present"),
    ];
    for (before, after, name) in flags {
        if before && !after {
            actions.push(format!("{name} cleared"));
            removed += 1;
        }
    }

    if old.javascript_names > new.javascript_names {
        actions.push("javascript names removed".to_string());
        removed += old.javascript_names - new.javascript_names;
    }
    if old.attachments.len() > new.attachments.len() {
        actions.push("attachments removed".to_string());
        removed += old.attachments.len() - new.attachments.len();
    }
    if old.page_metadata_count > new.page_metadata_count {
        actions.push("page metadata removed".to_string());
        removed += old.page_metadata_count - new.page_metadata_count;
    }

    (actions, removed)
}

/// Compares two OOXML fingerprints into `(actions, removed_count)`.
pub fn diff_docx(old: &DocxMetadataState, new: &DocxMetadataState) -> (Vec<String>, usize) {
    let mut actions = Vec::new();
    let mut removed = 0usize;

    let sections = [
        ("core", &old.core, &new.core),
        ("dcterms", &old.dcterms, &new.dcterms),
        ("app", &old.app, &new.app),
    ];
    for (section, before, after) in sections {
        for key in before.keys() {
            let gone = after.get(key).map_or(true, String::is_empty);
            if gone {
                actions.push(format!("{section}:{key} cleared"));
                removed += 1;
            }
        }
    }

    if old.custom_props_present && !new.custom_props_present {
        actions.push("custom properties removed".to_string());
        removed += 1;
    }
    if old.thumbnail_present && !new.thumbnail_present {
        actions.push("thumbnail removed".to_string());
        removed += 1;
    }

    (actions, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_pdf_docinfo_action_naming() {
        let mut old = PdfMetadataState::default();
        old.docinfo
            .insert("/Author".to_string(), "Jane".to_string());
        old.docinfo
            .insert("/Title".to_string(), "Report".to_string());
        let new = PdfMetadataState::default();

        let (actions, removed) = diff_pdf(&old, &new);

        assert_eq!(
            actions,
            vec![
                "docinfo:/Author removed".to_string(),
                "docinfo:/Title removed".to_string(),
            ]
        );
        assert_eq!(removed, 2);
    }

    #[test]
    fn test_diff_pdf_flag_actions() {
        let old = PdfMetadataState {
            xmp_present: true,
            has_outlines: true,
            acroform_present: true,
            ..PdfMetadataState::default()
        };
        let new = PdfMetadataState::default();

        let (actions, removed) = diff_pdf(&old, &new);

        assert_eq!(
            actions,
            vec![
                "xmp_present cleared".to_string(),
                "has_outlines cleared".to_string(),
                "acroform_present cleared".to_string(),
            ]
        );
        assert_eq!(removed, 3);
    }

    #[test]
    fn test_diff_pdf_counted_categories_weight_by_delta() {
        let old = PdfMetadataState {
            javascript_names: 4,
            attachments: vec!["a".into(), "b".into(), "c".into()],
            page_metadata_count: 2,
            ..PdfMetadataState::default()
        };
        let new = PdfMetadataState::default();

        let (actions, removed) = diff_pdf(&old, &new);

        // One line per category, full delta in the count.
        assert_eq!(actions.len(), 3);
        assert_eq!(removed, 9);
    }

    #[test]
    fn test_diff_pdf_ignores_descriptive_fields() {
        let old = PdfMetadataState {
            sha256: "aaaa".into(),
            size_bytes: 10,
            trailer_id: Some(("11".into(), None)),
            ..PdfMetadataState::default()
        };
        let new = PdfMetadataState {
            sha256: "bbbb".into(),
            size_bytes: 7,
            trailer_id: Some(("22".into(), None)),
            ..PdfMetadataState::default()
        };

        let (actions, removed) = diff_pdf(&old, &new);

        assert!(actions.is_empty());
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_diff_docx_action_naming() {
        let mut old = DocxMetadataState::default();
        old.app.insert("ep:Company".to_string(), "ACME".to_string());
        old.core
            .insert("dc:creator".to_string(), "Alice".to_string());
        old.dcterms
            .insert("dcterms:created".to_string(), "2024".to_string());
        let new = DocxMetadataState::default();

        let (actions, removed) = diff_docx(&old, &new);

        assert_eq!(
            actions,
            vec![
                "core:dc:creator cleared".to_string(),
                "dcterms:dcterms:created cleared".to_string(),
                "app:ep:Company cleared".to_string(),
            ]
        );
        assert_eq!(removed, 3);
    }

    #[test]
    fn test_diff_docx_treats_emptied_value_as_cleared() {
        let mut old = DocxMetadataState::default();
        old.core.insert("dc:title".to_string(), "Plan".to_string());
        let mut new = DocxMetadataState::default();
        new.core.insert("dc:title".to_string(), String::new());

        let (actions, _) = diff_docx(&old, &new);
        assert_eq!(actions, vec!["core:dc:title cleared".to_string()]);
    }

    #[test]
    fn test_diff_docx_presence_flags() {
        let old = DocxMetadataState {
            custom_props_present: true,
            thumbnail_present: true,
            ..DocxMetadataState::default()
        };
        let new = DocxMetadataState::default();

        let (actions, removed) = diff_docx(&old, &new);

        assert_eq!(
            actions,
            vec![
                "custom properties removed".to_string(),
                "thumbnail removed".to_string(),
            ]
        );
        assert_eq!(removed, 2);
    }

    #[test]
    fn test_diff_is_empty_for_identical_states() {
        let state = DocxMetadataState {
            custom_props_present: true,
            ..DocxMetadataState::default()
        };
        let (actions, removed) = diff_docx(&state, &state.clone());
        assert!(actions.is_empty());
        assert_eq!(removed, 0);
    }
}

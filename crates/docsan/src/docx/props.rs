//! Recognized OOXML property vocabulary and the XML-level rewrites.
//!
//! Properties are matched by local element name; the canonical prefixed key
//! (`dc:title`, `dcterms:created`, `ep:Company`) is what state maps and diff
//! actions carry.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Cursor;

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

pub(crate) const CORE_PROPERTIES: [(&str, &str); 8] = [
    ("creator", "dc:creator"),
    ("lastModifiedBy", "cp:lastModifiedBy"),
    ("title", "dc:title"),
    ("subject", "dc:subject"),
    ("description", "dc:description"),
    ("keywords", "cp:keywords"),
    ("category", "cp:category"),
    ("contentStatus", "cp:contentStatus"),
];

pub(crate) const DCTERMS_PROPERTIES: [(&str, &str); 2] =
    [("created", "dcterms:created"), ("modified", "dcterms:modified")];

pub(crate) const APP_PROPERTIES: [(&str, &str); 9] = [
    ("Application", "ep:Application"),
    ("AppVersion", "ep:AppVersion"),
    ("Company", "ep:Company"),
    ("Manager", "ep:Manager"),
    ("HyperlinkBase", "ep:HyperlinkBase"),
    ("DocSecurity", "ep:DocSecurity"),
    ("Template", "ep:Template"),
    ("TotalTime", "ep:TotalTime"),
    ("LastPrinted", "ep:LastPrinted"),
];

fn lookup(table: &[(&str, &'static str)], local: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(name, _)| *name == local)
        .map(|(_, key)| *key)
}

/// Collects recognized core/dcterms properties with non-empty text.
pub(crate) fn parse_core(
    xml: &str,
) -> Result<(BTreeMap<String, String>, BTreeMap<String, String>), quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut core = BTreeMap::new();
    let mut dcterms = BTreeMap::new();
    // (belongs to dcterms, canonical key, accumulated text)
    let mut current: Option<(bool, &'static str, String)> = None;

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) => {
                let local = e.local_name();
                let local = std::str::from_utf8(local.as_ref()).unwrap_or_default();
                if let Some(key) = lookup(&CORE_PROPERTIES, local) {
                    current = Some((false, key, String::new()));
                } else if let Some(key) = lookup(&DCTERMS_PROPERTIES, local) {
                    current = Some((true, key, String::new()));
                }
            }
            Event::Text(t) => {
                if let Some((_, _, text)) = &mut current {
                    text.push_str(&t.decode().unwrap_or_default());
                }
            }
            Event::End(_) => {
                if let Some((is_dcterms, key, text)) = current.take() {
                    if !text.trim().is_empty() {
                        let map = if is_dcterms { &mut dcterms } else { &mut core };
                        map.insert(key.to_string(), text);
                    }
                }
            }
            _ => {}
        }
    }

    Ok((core, dcterms))
}

/// Collects recognized extended properties with non-empty text.
pub(crate) fn parse_app(xml: &str) -> Result<BTreeMap<String, String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut app = BTreeMap::new();
    let mut current: Option<(&'static str, String)> = None;

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) => {
                let local = e.local_name();
                let local = std::str::from_utf8(local.as_ref()).unwrap_or_default();
                if let Some(key) = lookup(&APP_PROPERTIES, local) {
                    current = Some((key, String::new()));
                }
            }
            Event::Text(t) => {
                if let Some((_, text)) = &mut current {
                    text.push_str(&t.decode().unwrap_or_default());
                }
            }
            Event::End(_) => {
                if let Some((key, text)) = current.take() {
                    if !text.trim().is_empty() {
                        app.insert(key.to_string(), text);
                    }
                }
            }
            _ => {}
        }
    }

    Ok(app)
}

/// Blanks every recognized core/dcterms element (element kept, text cleared).
pub(crate) fn blank_core(xml: &str) -> Result<Vec<u8>, quick_xml::Error> {
    blank_recognized(
        xml,
        |local| {
            lookup(&CORE_PROPERTIES, local).is_some() || lookup(&DCTERMS_PROPERTIES, local).is_some()
        },
        false,
    )
}

/// Blanks every recognized extended-property element. Values consisting
/// solely of digits become the literal `"0"` so consumers that parse them as
/// integers keep working.
pub(crate) fn blank_app(xml: &str) -> Result<Vec<u8>, quick_xml::Error> {
    blank_recognized(xml, |local| lookup(&APP_PROPERTIES, local).is_some(), true)
}

fn blank_recognized(
    xml: &str,
    recognized: impl Fn(&str) -> bool,
    zero_numeric: bool,
) -> Result<Vec<u8>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    // (end-tag name, accumulated text, child depth) while inside a
    // recognized element
    let mut blanking: Option<(Vec<u8>, String, usize)> = None;

    loop {
        let event = reader.read_event()?;
        match event {
            Event::Eof => break,
            Event::Start(e) => {
                if let Some((_, _, depth)) = &mut blanking {
                    *depth += 1;
                } else {
                    let local = e.local_name();
                    let is_recognized = std::str::from_utf8(local.as_ref())
                        .map(&recognized)
                        .unwrap_or(false);
                    if is_recognized {
                        blanking = Some((e.name().as_ref().to_vec(), String::new(), 0));
                    }
                }
                writer
                    .write_event(Event::Start(e))
                    .map_err(quick_xml::Error::from)?;
            }
            Event::End(e) => {
                let mut finished: Option<String> = None;
                if let Some((name, text, depth)) = &mut blanking {
                    if *depth > 0 {
                        *depth -= 1;
                    } else if e.name().as_ref() == name.as_slice() {
                        finished = Some(std::mem::take(text));
                    }
                }
                if let Some(text) = finished {
                    blanking = None;
                    let trimmed = text.trim();
                    if zero_numeric
                        && !trimmed.is_empty()
                        && trimmed.chars().all(|c| c.is_ascii_digit())
                    {
                        writer
                            .write_event(Event::Text(BytesText::new("0")))
                            .map_err(quick_xml::Error::from)?;
                    }
                }
                writer
                    .write_event(Event::End(e))
                    .map_err(quick_xml::Error::from)?;
            }
            Event::Text(t) => match &mut blanking {
                Some((_, text, _)) => text.push_str(&t.decode().unwrap_or_default()),
                None => writer
                    .write_event(Event::Text(t))
                    .map_err(quick_xml::Error::from)?,
            },
            Event::CData(t) => {
                if blanking.is_none() {
                    writer
                        .write_event(Event::CData(t))
                        .map_err(quick_xml::Error::from)?;
                }
            }
            other => writer
                .write_event(other)
                .map_err(quick_xml::Error::from)?,
        }
    }

    Ok(writer.into_inner().into_inner())
}

/// Drops `<Override>` entries whose part name is in the removal set; every
/// other node passes through unchanged.
pub(crate) fn strip_content_type_overrides(
    xml: &str,
    removed: &BTreeSet<String>,
) -> Result<Vec<u8>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    // end-tag of a non-empty Override element being dropped
    let mut dropping: Option<Vec<u8>> = None;

    loop {
        let event = reader.read_event()?;
        match event {
            Event::Eof => break,
            Event::Empty(e) => {
                if dropping.is_none() && !is_removed_override(&e, removed)? {
                    writer
                        .write_event(Event::Empty(e))
                        .map_err(quick_xml::Error::from)?;
                }
            }
            Event::Start(e) => {
                if dropping.is_some() {
                    continue;
                }
                if is_removed_override(&e, removed)? {
                    dropping = Some(e.name().as_ref().to_vec());
                } else {
                    writer
                        .write_event(Event::Start(e))
                        .map_err(quick_xml::Error::from)?;
                }
            }
            Event::End(e) => match &dropping {
                Some(name) if e.name().as_ref() == name.as_slice() => dropping = None,
                Some(_) => {}
                None => writer
                    .write_event(Event::End(e))
                    .map_err(quick_xml::Error::from)?,
            },
            other => {
                if dropping.is_none() {
                    writer
                        .write_event(other)
                        .map_err(quick_xml::Error::from)?;
                }
            }
        }
    }

    Ok(writer.into_inner().into_inner())
}

fn is_removed_override(
    element: &BytesStart,
    removed: &BTreeSet<String>,
) -> Result<bool, quick_xml::Error> {
    if element.local_name().as_ref() != b"Override" {
        return Ok(false);
    }
    for attribute in element.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        if attribute.key.as_ref() == b"PartName" {
            // PartName carries a leading solidus; zip entry names do not.
            let value = String::from_utf8_lossy(&attribute.value);
            let part = value.trim_start_matches('/').to_ascii_lowercase();
            return Ok(removed.contains(&part));
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>Budget</dc:title><dc:creator>Alice</dc:creator><cp:lastModifiedBy>Bob</cp:lastModifiedBy><dcterms:created xsi:type="dcterms:W3CDTF">2024-01-01T00:00:00Z</dcterms:created></cp:coreProperties>"#;

    #[test]
    fn test_parse_core_collects_recognized_keys() {
        let (core, dcterms) = parse_core(CORE_XML).unwrap();

        assert_eq!(core.get("dc:title").map(String::as_str), Some("Budget"));
        assert_eq!(core.get("dc:creator").map(String::as_str), Some("Alice"));
        assert_eq!(
            core.get("cp:lastModifiedBy").map(String::as_str),
            Some("Bob")
        );
        assert_eq!(
            dcterms.get("dcterms:created").map(String::as_str),
            Some("2024-01-01T00:00:00Z")
        );
    }

    #[test]
    fn test_blank_core_clears_values_but_keeps_elements() {
        let blanked = blank_core(CORE_XML).unwrap();
        let blanked = String::from_utf8(blanked).unwrap();

        assert!(blanked.contains("<dc:title></dc:title>"));
        assert!(!blanked.contains("Budget"));
        assert!(!blanked.contains("Alice"));
        assert!(!blanked.contains("2024-01-01"));

        let (core, dcterms) = parse_core(&blanked).unwrap();
        assert!(core.is_empty());
        assert!(dcterms.is_empty());
    }

    #[test]
    fn test_blank_app_keeps_numeric_shape() {
        let xml = r#"<?xml version="1.0"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>Word</Application><AppVersion>16.0</AppVersion><TotalTime>95</TotalTime><DocSecurity>0</DocSecurity></Properties>"#;

        let blanked = blank_app(xml).unwrap();
        let blanked = String::from_utf8(blanked).unwrap();

        assert!(blanked.contains("<Application></Application>"));
        assert!(blanked.contains("<AppVersion></AppVersion>"));
        assert!(blanked.contains("<TotalTime>0</TotalTime>"));
        assert!(blanked.contains("<DocSecurity>0</DocSecurity>"));
        assert!(!blanked.contains("Word"));
        assert!(!blanked.contains("95"));
    }

    #[test]
    fn test_unrecognized_elements_pass_through() {
        let xml = r#"<?xml version="1.0"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Pages>4</Pages><Company>ACME</Company></Properties>"#;

        let blanked = blank_app(xml).unwrap();
        let blanked = String::from_utf8(blanked).unwrap();

        assert!(blanked.contains("<Pages>4</Pages>"));
        assert!(blanked.contains("<Company></Company>"));
    }

    #[test]
    fn test_strip_content_type_overrides_drops_flagged_parts() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/custom.xml" ContentType="application/vnd.openxmlformats-officedocument.custom-properties+xml"/><Override PartName="/docProps/thumbnail.jpeg" ContentType="image/jpeg"/></Types>"#;

        let mut removed = BTreeSet::new();
        removed.insert("docprops/custom.xml".to_string());
        removed.insert("docprops/thumbnail.jpeg".to_string());

        let rewritten = strip_content_type_overrides(xml, &removed).unwrap();
        let rewritten = String::from_utf8(rewritten).unwrap();

        assert!(rewritten.contains("/docProps/core.xml"));
        assert!(!rewritten.contains("custom.xml"));
        assert!(!rewritten.contains("thumbnail.jpeg"));
        assert!(rewritten.contains("Default Extension=\"xml\""));
    }
}

//! Shared fixtures: minimal documents carrying a full metadata fingerprint.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub fn write_sample_pdf(path: &Path) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.new_object_id();

    let page_xmp_id = doc.add_object(Object::Stream(Stream::new(
        dictionary! { "Type" => "Metadata", "Subtype" => "XML" },
        b"<x:xmpmeta/>".to_vec(),
    )));
    doc.objects.insert(
        page_id,
        Object::Dictionary(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Metadata" => page_xmp_id,
        }),
    );
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let xmp_id = doc.add_object(Object::Stream(Stream::new(
        dictionary! { "Type" => "Metadata", "Subtype" => "XML" },
        b"<x:xmpmeta><rdf:RDF/></x:xmpmeta>".to_vec(),
    )));
    let outlines_id = doc.add_object(dictionary! {
        "Type" => "Outlines",
        "Count" => 0,
    });
    let js_id = doc.add_object(Object::Stream(Stream::new(
        dictionary! {},
        b"app.alert('hi')".to_vec(),
    )));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "Metadata" => xmp_id,
        "Outlines" => outlines_id,
        "ViewerPreferences" => dictionary! { "HideToolbar" => true },
        "OpenAction" => vec![page_id.into(), "Fit".into()],
        "Names" => dictionary! {
            "JavaScript" => dictionary! {
                "Names" => vec![Object::string_literal("init"), js_id.into()],
            },
        },
    });

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Quarterly Report"),
        "Author" => Object::string_literal("Jane Doe"),
    });

    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(vec![0x11; 16], StringFormat::Hexadecimal),
            Object::String(vec![0x22; 16], StringFormat::Hexadecimal),
        ]),
    );

    let mut file = File::create(path).unwrap();
    doc.save_to(&mut file).unwrap();
}

pub fn write_sample_docx(path: &Path) {
    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/><Override PartName="/docProps/custom.xml" ContentType="application/vnd.openxmlformats-officedocument.custom-properties+xml"/></Types>"#;

    const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Hello</w:t></w:r></w:p></w:body></w:document>"#;

    const CORE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>Launch Plan</dc:title><dc:creator>Alice Example</dc:creator><cp:lastModifiedBy>Bob Editor</cp:lastModifiedBy><dcterms:created xsi:type="dcterms:W3CDTF">2024-01-01T00:00:00Z</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">2024-02-01T00:00:00Z</dcterms:modified></cp:coreProperties>"#;

    const APP: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes"><Application>WordProcessor</Application><AppVersion>16.0</AppVersion><Company>ACME Corp</Company><Manager>Big Boss</Manager></Properties>"#;

    const CUSTOM: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/custom-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes"><property fmtid="{D5CDD505-2E9C-101B-9397-08002B2CF9AE}" pid="2" name="Confidential"><vt:lpwstr>yes</vt:lpwstr></property></Properties>"#;

    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::<'_, ()>::default().compression_method(CompressionMethod::Stored);

    writer.start_file("[Content_Types].xml", options).unwrap();
    writer.write_all(CONTENT_TYPES.as_bytes()).unwrap();

    writer.start_file("_rels/.rels", options).unwrap();
    writer.write_all(RELS.as_bytes()).unwrap();

    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(DOCUMENT.as_bytes()).unwrap();

    writer.start_file("docProps/core.xml", options).unwrap();
    writer.write_all(CORE.as_bytes()).unwrap();

    writer.start_file("docProps/app.xml", options).unwrap();
    writer.write_all(APP.as_bytes()).unwrap();

    writer.start_file("docProps/custom.xml", options).unwrap();
    writer.write_all(CUSTOM.as_bytes()).unwrap();

    writer.start_file("docProps/thumbnail.jpeg", options).unwrap();
    writer.write_all(&[0xFF, 0xD8, 0xFF, 0xD9]).unwrap();

    writer.finish().unwrap();
}

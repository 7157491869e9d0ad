//! DOCX writer: a minimal WordprocessingML package built directly with `zip`.
//!
//! Styling follows the Open-Resume look: Calibri, 20pt bold centered name,
//! 10pt gray centered contact lines, 11pt bold dark-blue section headings with a
//! bottom border, 0.25in bullet indent, 0.5in / 0.6in page margins.

use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::rendering::lines::DocLine;
use crate::rendering::RenderError;

const FONT: &str = "Calibri";
const COLOR_SECONDARY: &str = "646464";
const COLOR_ACCENT: &str = "2C3E50";

// Half-points.
const NAME_SIZE: u32 = 40;
const HEADING_SIZE: u32 = 22;
const CONTENT_SIZE: u32 = 20;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn styles_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="{W_NS}"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="{FONT}" w:hAnsi="{FONT}" w:eastAsia="{FONT}" w:cs="{FONT}"/><w:sz w:val="{CONTENT_SIZE}"/><w:szCs w:val="{CONTENT_SIZE}"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="0" w:line="276" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style></w:styles>"#
    )
}

fn core_xml(title: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>{}</dc:title><dc:creator>{}</dc:creator></cp:coreProperties>"#,
        xml_text(title),
        env!("CARGO_PKG_NAME"),
    )
}

/// Escaped text with characters that are illegal in XML 1.0 removed.
fn xml_text(text: &str) -> String {
    let legal: String = text
        .chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}'))
        .collect();
    escape(legal.as_str()).into_owned()
}

#[derive(Default)]
struct RunStyle<'a> {
    bold: bool,
    size: Option<u32>,
    color: Option<&'a str>,
}

fn run(text: &str, style: &RunStyle<'_>) -> String {
    let mut props = String::new();
    if style.bold {
        props.push_str("<w:b/><w:bCs/>");
    }
    if let Some(color) = style.color {
        props.push_str(&format!(r#"<w:color w:val="{color}"/>"#));
    }
    if let Some(size) = style.size {
        props.push_str(&format!(r#"<w:sz w:val="{size}"/><w:szCs w:val="{size}"/>"#));
    }
    let rpr = if props.is_empty() {
        String::new()
    } else {
        format!("<w:rPr>{props}</w:rPr>")
    };
    format!(
        r#"<w:r>{rpr}<w:t xml:space="preserve">{}</w:t></w:r>"#,
        xml_text(text)
    )
}

fn paragraph(ppr: &str, runs: &str) -> String {
    if ppr.is_empty() {
        format!("<w:p>{runs}</w:p>")
    } else {
        format!("<w:p><w:pPr>{ppr}</w:pPr>{runs}</w:p>")
    }
}

fn bottom_border(color: &str) -> String {
    format!(
        r#"<w:pBdr><w:bottom w:val="single" w:sz="6" w:space="1" w:color="{color}"/></w:pBdr>"#
    )
}

fn render_line(line: &DocLine) -> String {
    match line {
        DocLine::Spacer => paragraph(r#"<w:spacing w:after="0"/>"#, ""),
        DocLine::Rule => paragraph(
            &format!(r#"{}<w:spacing w:after="60"/>"#, bottom_border(COLOR_SECONDARY)),
            "",
        ),
        DocLine::Name(text) => paragraph(
            r#"<w:spacing w:after="80"/><w:jc w:val="center"/>"#,
            &run(
                text,
                &RunStyle {
                    bold: true,
                    size: Some(NAME_SIZE),
                    ..RunStyle::default()
                },
            ),
        ),
        DocLine::Meta(text) => paragraph(
            r#"<w:spacing w:after="40"/><w:jc w:val="center"/>"#,
            &run(
                text,
                &RunStyle {
                    color: Some(COLOR_SECONDARY),
                    ..RunStyle::default()
                },
            ),
        ),
        DocLine::Heading(text) => paragraph(
            &format!(
                r#"{}<w:spacing w:before="280" w:after="120"/>"#,
                bottom_border(COLOR_ACCENT)
            ),
            &run(
                &text.to_uppercase(),
                &RunStyle {
                    bold: true,
                    size: Some(HEADING_SIZE),
                    color: Some(COLOR_ACCENT),
                },
            ),
        ),
        DocLine::Bullet(text) => paragraph(
            r#"<w:spacing w:after="20"/><w:ind w:left="360"/>"#,
            &format!(
                "{}{}",
                run("\u{2022} ", &RunStyle::default()),
                run(text, &RunStyle::default())
            ),
        ),
        DocLine::Body(text) => paragraph(
            r#"<w:spacing w:after="40"/>"#,
            &run(text, &RunStyle::default()),
        ),
    }
}

fn document_xml(lines: &[DocLine]) -> String {
    let body: String = lines.iter().map(render_line).collect();
    // Letter page, 0.5in top/bottom and 0.6in side margins (twips).
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}"><w:body>{body}<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="720" w:right="864" w:bottom="720" w:left="864" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr></w:body></w:document>"#
    )
}

/// Renders classified lines into a complete `.docx` package.
pub fn render_docx(lines: &[DocLine], title: &str) -> Result<Vec<u8>, RenderError> {
    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
        ("_rels/.rels", PACKAGE_RELS_XML.to_string()),
        ("docProps/core.xml", core_xml(title)),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.to_string()),
        ("word/styles.xml", styles_xml()),
        ("word/document.xml", document_xml(lines)),
    ];

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        writer
            .start_file(name, SimpleFileOptions::default())
            .map_err(|e| RenderError::Docx(format!("failed to add {name}: {e}")))?;
        writer
            .write_all(content.as_bytes())
            .map_err(|e| RenderError::Docx(format!("failed to write {name}: {e}")))?;
    }
    let cursor = writer
        .finish()
        .map_err(|e| RenderError::Docx(format!("failed to finish package: {e}")))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{extract_text, DocumentFormat};
    use crate::rendering::lines::classify_lines;

    #[test]
    fn test_document_xml_styles_each_line_kind_in_order() {
        let lines = classify_lines("Jane Doe\nEXPERIENCE\n• Built systems\njane@x.com | 555-1234");
        let xml = document_xml(&lines);

        let name = xml.find(r#"<w:sz w:val="40"/>"#).unwrap();
        let heading = xml.find(r#"<w:bottom w:val="single" w:sz="6" w:space="1" w:color="2C3E50"/>"#).unwrap();
        let bullet = xml.find(r#"<w:ind w:left="360"/>"#).unwrap();
        let meta = xml.find(r#"<w:color w:val="646464"/>"#).unwrap();
        assert!(name < heading && heading < bullet && bullet < meta);
        assert!(xml.contains(">jane@x.com | 555-1234<"));
    }

    #[test]
    fn test_text_is_escaped_and_unicode_preserved() {
        let xml = document_xml(&classify_lines("R&D <lead> \u{201C}café\u{201D}\u{1}"));
        assert!(xml.contains("R&amp;D &lt;lead&gt; \u{201C}café\u{201D}<"));
    }

    #[test]
    fn test_package_reads_back_through_extractor() {
        let lines = classify_lines("Jane Doe\nEXPERIENCE\n• Built systems\njane@x.com | 555-1234");
        let bytes = render_docx(&lines, "Jane Doe").unwrap();
        assert!(bytes.starts_with(b"PK"));

        let text = extract_text(&bytes, DocumentFormat::Docx).unwrap();
        assert_eq!(
            text,
            "Jane Doe\nEXPERIENCE\n\u{2022} Built systems\njane@x.com | 555-1234"
        );
    }

    #[test]
    fn test_package_contains_required_parts() {
        let bytes = render_docx(&[], "t").unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/styles.xml",
            "word/_rels/document.xml.rels",
        ] {
            assert!(archive.by_name(part).is_ok(), "missing {part}");
        }
    }
}

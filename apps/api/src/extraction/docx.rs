//! DOCX text extraction: reads `word/document.xml` out of the OOXML package and
//! walks the body in document order.
//!
//! Paragraphs become one line each (empty ones are skipped). Table rows become one
//! line each with non-empty cells joined by `" | "`; paragraphs inside a cell are
//! joined by a space. `mc:Fallback` content is skipped because it duplicates the
//! `mc:Choice` branch (text boxes would otherwise appear twice).

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::{DocumentFormat, ExtractError};

const DOCUMENT_PART: &str = "word/document.xml";

pub fn extract_docx_text(bytes: &[u8], format: DocumentFormat) -> Result<String, ExtractError> {
    let xml = read_document_part(bytes, format)?;
    let lines = collect_lines(&xml)
        .map_err(|e| ExtractError::extraction(format, format!("malformed document XML: {e}")))?;
    Ok(lines.join("\n"))
}

fn read_document_part(bytes: &[u8], format: DocumentFormat) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
        let reason = match format {
            DocumentFormat::Doc => {
                format!("legacy binary .doc files are not readable, convert to .docx ({e})")
            }
            _ => format!("not an Office Open XML package, file may be corrupt or encrypted ({e})"),
        };
        ExtractError::extraction(format, reason)
    })?;

    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractError::extraction(format, format!("missing {DOCUMENT_PART} ({e})")))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| ExtractError::extraction(format, format!("unreadable {DOCUMENT_PART} ({e})")))?;
    Ok(xml)
}

#[derive(Default)]
struct TableFrame {
    row: Vec<String>,
    cell: String,
}

fn push_cell_text(cell: &mut String, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if !cell.is_empty() {
        cell.push(' ');
    }
    cell.push_str(text);
}

fn collect_lines(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut lines: Vec<String> = Vec::new();
    let mut tables: Vec<TableFrame> = Vec::new();
    // Paragraphs nest when a text box sits inside a run.
    let mut paragraphs: Vec<String> = Vec::new();
    let mut in_text = false;
    let mut fallback_depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name();
                if name.as_ref() == b"Fallback" {
                    fallback_depth += 1;
                    continue;
                }
                if fallback_depth > 0 {
                    continue;
                }
                match name.as_ref() {
                    b"p" => paragraphs.push(String::new()),
                    b"t" => in_text = true,
                    b"tbl" => tables.push(TableFrame::default()),
                    b"tr" => {
                        if let Some(table) = tables.last_mut() {
                            table.row.clear();
                        }
                    }
                    b"tc" => {
                        if let Some(table) = tables.last_mut() {
                            table.cell.clear();
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if fallback_depth > 0 {
                    continue;
                }
                if let Some(paragraph) = paragraphs.last_mut() {
                    match e.local_name().as_ref() {
                        b"tab" => paragraph.push('\t'),
                        b"br" | b"cr" => paragraph.push('\n'),
                        _ => {}
                    }
                }
            }
            Event::Text(t) => {
                if in_text && fallback_depth == 0 {
                    if let Some(paragraph) = paragraphs.last_mut() {
                        paragraph.push_str(&t.unescape()?);
                    }
                }
            }
            Event::End(e) => {
                let name = e.local_name();
                if fallback_depth > 0 {
                    if name.as_ref() == b"Fallback" {
                        fallback_depth -= 1;
                    }
                    continue;
                }
                match name.as_ref() {
                    b"t" => in_text = false,
                    b"p" => {
                        let text = paragraphs.pop().unwrap_or_default();
                        match tables.last_mut() {
                            Some(table) => push_cell_text(&mut table.cell, &text),
                            None if !text.trim().is_empty() => lines.push(text),
                            None => {}
                        }
                    }
                    b"tc" => {
                        if let Some(table) = tables.last_mut() {
                            let cell = std::mem::take(&mut table.cell);
                            if !cell.trim().is_empty() {
                                table.row.push(cell.trim().to_string());
                            }
                        }
                    }
                    b"tr" => {
                        let depth = tables.len();
                        let row = match tables.last_mut() {
                            Some(table) if !table.row.is_empty() => {
                                std::mem::take(&mut table.row).join(" | ")
                            }
                            _ => continue,
                        };
                        // A nested table's rows belong to the enclosing cell.
                        if depth >= 2 {
                            push_cell_text(&mut tables[depth - 2].cell, &row);
                        } else {
                            lines.push(row);
                        }
                    }
                    b"tbl" => {
                        tables.pop();
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(lines)
}

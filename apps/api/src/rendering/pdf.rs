//! PDF writer over the base-14 Helvetica fonts.
//!
//! The base fonts only cover WinAnsi, so all text goes through [`latin1_safe`]
//! first: typographic quotes, dashes, ellipsis and bullets are mapped to ASCII
//! and anything else outside Latin-1 becomes `?`. This output is lossy by
//! intent; DOCX output keeps the full text.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::rendering::lines::DocLine;
use crate::rendering::metrics::{FontMetricTable, PdfFont};
use crate::rendering::RenderError;

// US letter, in points.
const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN_X: f32 = 43.2; // 0.6in
const MARGIN_Y: f32 = 36.0; // 0.5in
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN_X;

const NAME_SIZE: f32 = 20.0;
const HEADING_SIZE: f32 = 11.0;
const BODY_SIZE: f32 = 10.0;
const LINE_SPACING: f32 = 1.25;
const BULLET_INDENT: f32 = 18.0; // 0.25in
const BULLET_MARKER_OFFSET: f32 = 6.0;
const SPACER_HEIGHT: f32 = 5.0;

type Rgb = (f32, f32, f32);
const BLACK: Rgb = (0.0, 0.0, 0.0);
const MUTED: Rgb = (100.0 / 255.0, 100.0 / 255.0, 100.0 / 255.0);
const HEADING_COLOR: Rgb = (44.0 / 255.0, 62.0 / 255.0, 80.0 / 255.0);

/// Maps text onto characters the WinAnsi base fonts can show.
pub fn latin1_safe(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2010}'..='\u{2015}' | '\u{2212}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{2022}' | '\u{2023}' | '\u{25AA}' | '\u{25CF}' | '\u{25E6}' => out.push('-'),
            '\u{00A0}' | '\u{2002}'..='\u{200A}' => out.push(' '),
            '\t' => out.push(' '),
            c if (' '..='~').contains(&c) || ('\u{00A1}'..='\u{00FF}').contains(&c) => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Single-byte encoding of text already passed through [`latin1_safe`].
fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn font_resource(font: PdfFont) -> &'static str {
    match font {
        PdfFont::Regular => "F1",
        PdfFont::Bold => "F2",
    }
}

#[derive(Clone, Copy)]
enum Align {
    Left(f32),
    Center,
}

/// Accumulates content-stream operations page by page with a top-down cursor.
struct PageWriter {
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: f32,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            ops: Vec::new(),
            y: PAGE_HEIGHT - MARGIN_Y,
        }
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y - height < MARGIN_Y && !self.ops.is_empty() {
            self.pages.push(std::mem::take(&mut self.ops));
            self.y = PAGE_HEIGHT - MARGIN_Y;
        }
    }

    fn skip(&mut self, height: f32) {
        self.y = (self.y - height).max(MARGIN_Y);
    }

    fn draw_text(&mut self, text: &str, font: PdfFont, size: f32, x: f32, baseline: f32, color: Rgb) {
        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "rg",
                vec![Object::Real(color.0), Object::Real(color.1), Object::Real(color.2)],
            ),
            Operation::new("Tf", vec![font_resource(font).into(), Object::Real(size)]),
            Operation::new("Td", vec![Object::Real(x), Object::Real(baseline)]),
            Operation::new("Tj", vec![Object::string_literal(encode(text))]),
            Operation::new("ET", vec![]),
        ]);
    }

    /// Wraps `text` to the available width and writes each visual line.
    fn paragraph(&mut self, text: &str, font: PdfFont, size: f32, align: Align, color: Rgb) {
        let table = FontMetricTable::for_font(font);
        let (x0, width) = match align {
            Align::Left(indent) => (MARGIN_X + indent, CONTENT_WIDTH - indent),
            Align::Center => (MARGIN_X, CONTENT_WIDTH),
        };
        let line_height = size * LINE_SPACING;

        for line in table.wrap(text, size, width) {
            self.ensure_space(line_height);
            self.y -= line_height;
            let x = match align {
                Align::Left(_) => x0,
                Align::Center => x0 + (width - table.measure(&line, size)).max(0.0) / 2.0,
            };
            let baseline = self.y + (line_height - size) / 2.0 + size * 0.2;
            self.draw_text(&line, font, size, x, baseline, color);
        }
    }

    fn rule(&mut self, color: Rgb, thickness: f32, gap: f32) {
        self.ensure_space(2.0 * gap);
        self.y -= gap;
        self.ops.extend([
            Operation::new(
                "RG",
                vec![Object::Real(color.0), Object::Real(color.1), Object::Real(color.2)],
            ),
            Operation::new("w", vec![Object::Real(thickness)]),
            Operation::new("m", vec![Object::Real(MARGIN_X), Object::Real(self.y)]),
            Operation::new(
                "l",
                vec![Object::Real(PAGE_WIDTH - MARGIN_X), Object::Real(self.y)],
            ),
            Operation::new("S", vec![]),
        ]);
        self.y -= gap;
    }

    fn bullet(&mut self, text: &str) {
        let line_height = BODY_SIZE * LINE_SPACING;
        self.ensure_space(line_height);
        let marker_baseline = self.y - line_height + (line_height - BODY_SIZE) / 2.0 + BODY_SIZE * 0.2;
        self.draw_text(
            "-",
            PdfFont::Regular,
            BODY_SIZE,
            MARGIN_X + BULLET_MARKER_OFFSET,
            marker_baseline,
            BLACK,
        );
        self.paragraph(text, PdfFont::Regular, BODY_SIZE, Align::Left(BULLET_INDENT), BLACK);
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.ops.is_empty() || self.pages.is_empty() {
            self.pages.push(self.ops);
        }
        self.pages
    }
}

fn lay_out(lines: &[DocLine]) -> Vec<Vec<Operation>> {
    let mut writer = PageWriter::new();

    for line in lines {
        match line {
            DocLine::Spacer => writer.skip(SPACER_HEIGHT),
            DocLine::Rule => writer.rule(MUTED, 0.5, 3.0),
            DocLine::Name(text) => {
                writer.paragraph(&latin1_safe(text), PdfFont::Bold, NAME_SIZE, Align::Center, BLACK);
                writer.skip(2.0);
            }
            DocLine::Meta(text) => {
                writer.paragraph(&latin1_safe(text), PdfFont::Regular, BODY_SIZE, Align::Center, MUTED);
            }
            DocLine::Heading(text) => {
                writer.skip(6.0);
                writer.paragraph(
                    &latin1_safe(text),
                    PdfFont::Bold,
                    HEADING_SIZE,
                    Align::Left(0.0),
                    HEADING_COLOR,
                );
                writer.rule(HEADING_COLOR, 0.75, 1.5);
            }
            DocLine::Bullet(text) => writer.bullet(&latin1_safe(text)),
            DocLine::Body(text) => {
                writer.paragraph(&latin1_safe(text), PdfFont::Regular, BODY_SIZE, Align::Left(0.0), BLACK);
            }
        }
    }

    writer.finish()
}

fn base_font(name: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => name,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Renders classified lines into a complete PDF file.
pub fn render_pdf(lines: &[DocLine], title: &str) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(base_font("Helvetica"));
    let bold_id = doc.add_object(base_font("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for operations in lay_out(lines) {
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| RenderError::Pdf(format!("failed to encode page content: {e}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(PAGE_WIDTH),
                Object::Real(PAGE_HEIGHT),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode(&latin1_safe(title))),
        "Producer" => Object::string_literal(env!("CARGO_PKG_NAME")),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| RenderError::Pdf(format!("failed to serialize document: {e}")))?;
    Ok(bytes)
}

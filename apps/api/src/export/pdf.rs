use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

use super::{layout, Block, DocumentBuilder, ExportError};
use crate::models::ResumeRecord;

// US Letter, in millimetres.
const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN_X: f32 = 19.05;
const MARGIN_Y: f32 = 12.7;
const BULLET_INDENT: f32 = 4.0;

const PT_TO_MM: f32 = 0.352_778;
const LINE_SPACING: f32 = 1.35;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_CHAR_EM: f32 = 0.5;

pub struct PdfBuilder;

impl DocumentBuilder for PdfBuilder {
    fn build(&self, record: &ResumeRecord) -> Result<Vec<u8>, ExportError> {
        render(record)
    }
}

#[derive(Clone, Copy)]
enum Face {
    Regular,
    Bold,
    Italic,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self, ExportError> {
        let font = |builtin: BuiltinFont| {
            doc.add_builtin_font(builtin)
                .map_err(|e| ExportError::Render(e.to_string()))
        };
        Ok(Self {
            regular: font(BuiltinFont::Helvetica)?,
            bold: font(BuiltinFont::HelveticaBold)?,
            italic: font(BuiltinFont::HelveticaOblique)?,
        })
    }

    fn get(&self, face: Face) -> &IndirectFontRef {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
            Face::Italic => &self.italic,
        }
    }
}

struct Style {
    face: Face,
    size: f32,
    space_before: f32,
    centered: bool,
    indent: f32,
}

impl Style {
    const fn new(face: Face, size: f32, space_before: f32) -> Self {
        Self {
            face,
            size,
            space_before,
            centered: false,
            indent: 0.0,
        }
    }
}

fn style(block: &Block) -> Style {
    match block {
        Block::Title(_) => Style {
            centered: true,
            ..Style::new(Face::Bold, 20.0, 0.0)
        },
        Block::Contact(_) => Style {
            centered: true,
            ..Style::new(Face::Regular, 10.0, 0.5)
        },
        Block::Heading(_) => Style::new(Face::Bold, 13.0, 5.0),
        Block::Entry(_) => Style::new(Face::Bold, 11.0, 2.5),
        Block::Meta(_) => Style::new(Face::Italic, 9.0, 0.0),
        Block::Paragraph(_) => Style::new(Face::Regular, 10.0, 1.0),
        Block::Bullet(_) => Style {
            indent: BULLET_INDENT,
            ..Style::new(Face::Regular, 10.0, 0.5)
        },
    }
}

/// Tracks the writing position and starts a new page when the current one is full.
struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl PageCursor<'_> {
    fn write_line(&mut self, text: &str, font: &IndirectFontRef, style: &Style) {
        let height = style.size * LINE_SPACING * PT_TO_MM;
        if self.y - height < MARGIN_Y {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN_Y;
        }
        self.y -= height;

        let x = if style.centered {
            let width = text.chars().count() as f32 * style.size * AVG_CHAR_EM * PT_TO_MM;
            ((PAGE_WIDTH - width) / 2.0).max(MARGIN_X)
        } else {
            MARGIN_X + style.indent
        };
        self.layer.use_text(text, style.size, Mm(x), Mm(self.y), font);
    }

    fn write_block(&mut self, fonts: &Fonts, block: &Block) {
        let style = style(block);
        let text = match block {
            Block::Heading(text) => (*text).to_string(),
            Block::Bullet(text) => format!("- {text}"),
            Block::Title(text)
            | Block::Contact(text)
            | Block::Entry(text)
            | Block::Meta(text)
            | Block::Paragraph(text) => text.clone(),
        };

        self.y -= style.space_before;
        let usable = PAGE_WIDTH - 2.0 * MARGIN_X - style.indent;
        let max_chars = (usable / (style.size * AVG_CHAR_EM * PT_TO_MM)).floor() as usize;
        for line in wrap(&pdf_safe(&text), max_chars.max(1)) {
            self.write_line(&line, fonts.get(style.face), &style);
        }
    }
}

/// Renders a record to PDF bytes.
pub fn render(record: &ResumeRecord) -> Result<Vec<u8>, ExportError> {
    let title = match record.name.trim() {
        "" => "Resume".to_string(),
        name => format!("{name} - Resume"),
    };
    let (doc, page, layer) = PdfDocument::new(
        pdf_safe(&title),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let fonts = Fonts::load(&doc)?;

    let mut cursor = PageCursor {
        doc: &doc,
        layer: doc.get_page(page).get_layer(layer),
        y: PAGE_HEIGHT - MARGIN_Y,
    };
    for block in layout(record) {
        cursor.write_block(&fonts, &block);
    }

    doc.save_to_bytes()
        .map_err(|e| ExportError::Render(e.to_string()))
}

/// Greedy word wrap. Words longer than a line are kept whole.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if line_len > 0 && line_len + 1 + word_len > max_chars {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line.push_str(word);
        line_len += word_len;
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// The built-in fonts only cover ASCII reliably.
fn pdf_safe(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\u{2018}' | '\u{2019}' => Some('\''),
            '\u{201C}' | '\u{201D}' => Some('"'),
            '\u{2013}' | '\u{2014}' => Some('-'),
            '\u{2022}' => Some('-'),
            '\t' | '\n' | '\r' => Some(' '),
            c if c.is_ascii() && !c.is_ascii_control() => Some(c),
            c => deunicode_latin(c),
        })
        .collect()
}

fn deunicode_latin(c: char) -> Option<char> {
    let base = match c {
        'à'..='å' => 'a',
        'À'..='Å' => 'A',
        'è'..='ë' => 'e',
        'È'..='Ë' => 'E',
        'ì'..='ï' => 'i',
        'Ì'..='Ï' => 'I',
        'ò'..='ö' => 'o',
        'Ò'..='Ö' => 'O',
        'ù'..='ü' => 'u',
        'Ù'..='Ü' => 'U',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ç' => 'c',
        'Ç' => 'C',
        _ => return None,
    };
    Some(base)
}

use anyhow::{anyhow, Result};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};
use std::io::Cursor;
use std::path::Path;

use super::{Download, PDF_FILE_NAME};
use crate::utils::to_latin1_lossy;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const LEFT_MARGIN_MM: f32 = 10.0;
const TOP_MARGIN_MM: f32 = 17.0;
const BOTTOM_MARGIN_MM: f32 = 20.0;
const LINE_HEIGHT_MM: f32 = 10.0;
const FONT_SIZE_PT: f32 = 12.0;

/// Characters per line at 12pt across a 190mm text column
const MAX_LINE_CHARS: usize = 85;

/// sfnt version tags of TrueType and OpenType files
const FONT_MAGIC: [&[u8; 4]; 3] = [b"\x00\x01\x00\x00", b"OTTO", b"true"];

/// Font used to render a PDF export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontChoice {
    /// Embedded TrueType font able to render any text it has glyphs for
    Unicode(Vec<u8>),
    /// Built-in Helvetica, Latin-1 only
    Builtin,
}

impl FontChoice {
    /// Use the font at `path` if it loads cleanly, the built-in font otherwise
    pub fn probe(path: &Path) -> Self {
        match load_unicode_font(path) {
            Ok(bytes) => {
                tracing::debug!("Embedding PDF font {}", path.display());
                FontChoice::Unicode(bytes)
            }
            Err(err) => {
                tracing::warn!(
                    "Unicode font unavailable, PDF export limited to Latin-1: {:#}",
                    err
                );
                FontChoice::Builtin
            }
        }
    }
}

/// Read a font file and check that it is a TrueType/OpenType font
pub fn load_unicode_font(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs_err::read(path)?;

    if bytes.len() < 12 || !FONT_MAGIC.iter().any(|magic| bytes.starts_with(*magic)) {
        anyhow::bail!("{} is not a TrueType or OpenType font", path.display());
    }

    Ok(bytes)
}

/// Render `summary` as a PDF download.
///
/// Falls back to the built-in font (dropping non-Latin-1 text) when the
/// embedded font is missing or rejected, so any input produces a document.
pub fn export_pdf(summary: &str, font: &FontChoice) -> Result<Download> {
    Ok(Download {
        file_name: PDF_FILE_NAME,
        mime_type: "application/pdf",
        data: render(summary, font)?,
    })
}

fn render(summary: &str, font: &FontChoice) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        "Video Summary",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Summary",
    );

    let (font_ref, text) = match font {
        FontChoice::Unicode(bytes) => match doc.add_external_font(Cursor::new(bytes.as_slice())) {
            Ok(font_ref) => (font_ref, summary.to_string()),
            Err(err) => {
                tracing::warn!("Embedded font rejected, using built-in font: {}", err);
                (builtin_font(&doc)?, to_latin1_lossy(summary))
            }
        },
        FontChoice::Builtin => (builtin_font(&doc)?, to_latin1_lossy(summary)),
    };

    let mut current = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT_MM - TOP_MARGIN_MM;

    for line in wrap_lines(&text, MAX_LINE_CHARS) {
        if y < BOTTOM_MARGIN_MM {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Summary");
            current = doc.get_page(page).get_layer(layer);
            y = PAGE_HEIGHT_MM - TOP_MARGIN_MM;
        }

        if !line.is_empty() {
            current.use_text(line, FONT_SIZE_PT, Mm(LEFT_MARGIN_MM), Mm(y), &font_ref);
        }
        y -= LINE_HEIGHT_MM;
    }

    doc.save_to_bytes()
        .map_err(|err| anyhow!("Failed to serialize PDF: {}", err))
}

fn builtin_font(doc: &PdfDocumentReference) -> Result<IndirectFontRef> {
    doc.add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|err| anyhow!("Failed to load built-in font: {}", err))
}

/// Word-wrap text into lines of at most `width` characters.
///
/// Source line breaks are kept; words longer than `width` are split.
fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    for paragraph in text.lines() {
        let cleaned: String = paragraph
            .chars()
            .map(|c| if c == '\t' { ' ' } else { c })
            .filter(|c| !c.is_control())
            .collect();

        let mut line = String::new();
        let mut line_len = 0;

        for word in cleaned.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > width {
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                lines.push(word.drain(..width).collect());
            }

            let needed = if line_len == 0 { word.len() } else { line_len + 1 + word.len() };
            if needed > width {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }

            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line_len += word.len();
            line.extend(word);
        }

        lines.push(line);
    }

    lines
}

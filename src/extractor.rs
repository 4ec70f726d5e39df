//! Positioned text extraction from PDF using lopdf
//!
//! This module walks each page's content stream and produces one
//! [`TextFragment`] per shown string, in a top-left page coordinate space
//! (y increases downward).

use crate::document::PageSource;
use crate::geometry::Rectangle;
use crate::ExtractError;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Glyph advance used when a font carries no usable width table (1/1000 em)
const DEFAULT_GLYPH_WIDTH: f32 = 500.0;

/// A positioned run of text on a page
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    /// The text content, as decoded from the content stream
    pub text: String,
    /// X position of the left edge
    pub x: f32,
    /// Y position (top-left origin, increasing downward)
    pub y: f32,
    /// Advance width of the text
    pub width: f32,
    /// Height, from the magnitude of the glyph transform
    pub height: f32,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            height,
        }
    }

    /// Bounding box of the fragment
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(self.x, self.y, self.width, self.height)
    }

    /// Right edge (x + width)
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// A loaded PDF that yields fragments one page at a time
pub struct PdfDocument {
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
}

impl PdfDocument {
    /// Load a PDF from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let doc = Document::load(path)?;
        Ok(Self::from_document(doc))
    }

    /// Load a PDF from a memory buffer
    pub fn load_mem(buffer: &[u8]) -> Result<Self, ExtractError> {
        let doc = Document::load_mem(buffer)?;
        Ok(Self::from_document(doc))
    }

    fn from_document(doc: Document) -> Self {
        let pages = doc.get_pages();
        Self { doc, pages }
    }
}

impl PageSource for PdfDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_fragments(&self, page: u32) -> Result<Vec<TextFragment>, ExtractError> {
        let page_id = *self
            .pages
            .get(&page)
            .ok_or(ExtractError::PageOutOfRange {
                page,
                page_count: self.page_count(),
            })?;
        extract_page_fragments(&self.doc, page_id)
    }
}

/// Multiply two 2D transformation matrices
/// Matrix format: [a, b, c, d, e, f] representing:
/// | a  b  0 |
/// | c  d  0 |
/// | e  f  1 |
fn multiply_matrices(m1: &[f32; 6], m2: &[f32; 6]) -> [f32; 6] {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

/// Glyph widths for one font, in 1/1000 em
struct FontMetrics {
    first_char: i64,
    widths: Vec<f32>,
    missing_width: f32,
}

impl FontMetrics {
    fn from_dict(doc: &Document, font: &Dictionary) -> Self {
        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(|o| resolve(doc, o).as_i64().ok())
            .unwrap_or(0);
        let widths = font
            .get(b"Widths")
            .ok()
            .and_then(|o| resolve(doc, o).as_array().ok())
            .map(|array| {
                array
                    .iter()
                    .map(|w| get_number(resolve(doc, w)).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();
        let missing_width = font
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| resolve(doc, o).as_dict().ok())
            .and_then(|descriptor| descriptor.get(b"MissingWidth").ok())
            .and_then(get_number)
            .filter(|w| *w > 0.0)
            .unwrap_or(DEFAULT_GLYPH_WIDTH);

        Self {
            first_char,
            widths,
            missing_width,
        }
    }

    fn glyph_width(&self, code: u8) -> f32 {
        let index = code as i64 - self.first_char;
        if index >= 0 {
            if let Some(&w) = self.widths.get(index as usize) {
                if w > 0.0 {
                    return w;
                }
            }
        }
        self.missing_width
    }
}

/// Text state operands that affect glyph advance
struct TextState {
    font: String,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: String::new(),
            font_size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    /// Advance in unscaled text space for one string, per the PDF glyph
    /// displacement rule
    fn advance(&self, bytes: &[u8], metrics: Option<&FontMetrics>) -> f32 {
        bytes
            .iter()
            .map(|&code| {
                let w = metrics.map_or(DEFAULT_GLYPH_WIDTH, |m| m.glyph_width(code));
                let word = if code == b' ' { self.word_spacing } else { 0.0 };
                (w / 1000.0 * self.font_size + self.char_spacing + word) * self.horizontal_scale
            })
            .sum()
    }
}

/// Extract fragments from a single page
fn extract_page_fragments(doc: &Document, page_id: ObjectId) -> Result<Vec<TextFragment>, ExtractError> {
    use lopdf::content::Content;

    let mut fragments = Vec::new();

    let fonts = doc.get_page_fonts(page_id).unwrap_or_default();
    let metrics: HashMap<Vec<u8>, FontMetrics> = fonts
        .iter()
        .map(|(name, dict)| (name.clone(), FontMetrics::from_dict(doc, dict)))
        .collect();

    let page_top = page_top(doc, page_id);

    let content_data = doc
        .get_page_content(page_id)
        .map_err(|e| ExtractError::Parse(e.to_string()))?;
    let content = Content::decode(&content_data).map_err(|e| ExtractError::Parse(e.to_string()))?;

    // Graphics state tracking
    let mut ctm = [1.0f32, 0.0, 0.0, 1.0, 0.0, 0.0];
    let mut ctm_stack: Vec<[f32; 6]> = Vec::new();

    let mut state = TextState::default();
    let mut text_matrix = [1.0f32, 0.0, 0.0, 1.0, 0.0, 0.0];
    let mut line_matrix = [1.0f32, 0.0, 0.0, 1.0, 0.0, 0.0];
    let mut in_text_block = false;

    for op in &content.operations {
        match op.operator.as_str() {
            "q" => ctm_stack.push(ctm),
            "Q" => {
                if let Some(saved) = ctm_stack.pop() {
                    ctm = saved;
                }
            }
            "cm" => {
                if let Some(m) = matrix_operand(&op.operands) {
                    ctm = multiply_matrices(&m, &ctm);
                }
            }
            "BT" => {
                in_text_block = true;
                text_matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
                line_matrix = text_matrix;
            }
            "ET" => in_text_block = false,
            "Tf" => {
                if op.operands.len() >= 2 {
                    if let Ok(name) = op.operands[0].as_name() {
                        state.font = String::from_utf8_lossy(name).to_string();
                    }
                    if let Some(size) = get_number(&op.operands[1]) {
                        state.font_size = size;
                    }
                }
            }
            "Tc" => set_number(&op.operands, &mut state.char_spacing),
            "Tw" => set_number(&op.operands, &mut state.word_spacing),
            "TL" => set_number(&op.operands, &mut state.leading),
            "Tz" => {
                if let Some(scale) = op.operands.first().and_then(get_number) {
                    state.horizontal_scale = scale / 100.0;
                }
            }
            "Td" | "TD" => {
                if op.operands.len() >= 2 {
                    let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    line_matrix = multiply_matrices(&[1.0, 0.0, 0.0, 1.0, tx, ty], &line_matrix);
                    text_matrix = line_matrix;
                }
            }
            "Tm" => {
                if let Some(m) = matrix_operand(&op.operands) {
                    text_matrix = m;
                    line_matrix = m;
                }
            }
            "T*" => {
                next_line(&mut line_matrix, &state);
                text_matrix = line_matrix;
            }
            "Tj" | "'" | "\"" | "TJ" => {
                if !in_text_block || op.operands.is_empty() {
                    continue;
                }
                let mut operands = op.operands.as_slice();
                if op.operator == "\"" && operands.len() >= 3 {
                    set_number(&operands[0..1], &mut state.word_spacing);
                    set_number(&operands[1..2], &mut state.char_spacing);
                    operands = &operands[2..];
                }
                if op.operator == "'" || op.operator == "\"" {
                    next_line(&mut line_matrix, &state);
                    text_matrix = line_matrix;
                }

                let font_metrics = metrics.get(state.font.as_bytes());
                let mut text = String::new();
                let mut advance = 0.0f32;
                let parts: &[Object] = match &operands[0] {
                    Object::Array(array) => array,
                    other => std::slice::from_ref(other),
                };
                for part in parts {
                    match part {
                        Object::String(bytes, _) => {
                            if let Some(decoded) = decode_string(bytes, doc, &fonts, &state.font) {
                                text.push_str(&decoded);
                            }
                            advance += state.advance(bytes, font_metrics);
                        }
                        other => {
                            // TJ kerning adjustment, in thousandths of an em
                            if let Some(adjust) = get_number(other) {
                                advance -= adjust / 1000.0 * state.font_size * state.horizontal_scale;
                            }
                        }
                    }
                }

                if !text.trim().is_empty() {
                    let combined = multiply_matrices(&text_matrix, &ctm);
                    let glyph = multiply_matrices(
                        &[state.font_size * state.horizontal_scale, 0.0, 0.0, state.font_size, 0.0, 0.0],
                        &combined,
                    );
                    let scale_x = (combined[0].powi(2) + combined[1].powi(2)).sqrt();
                    fragments.push(TextFragment {
                        text,
                        x: combined[4],
                        y: page_top - combined[5],
                        width: advance * scale_x,
                        height: (glyph[2].powi(2) + glyph[3].powi(2)).sqrt(),
                    });
                }

                text_matrix = multiply_matrices(&[1.0, 0.0, 0.0, 1.0, advance, 0.0], &text_matrix);
            }
            _ => {}
        }
    }

    Ok(fragments)
}

fn next_line(line_matrix: &mut [f32; 6], state: &TextState) {
    let leading = if state.leading != 0.0 {
        state.leading
    } else {
        state.font_size * 1.2
    };
    *line_matrix = multiply_matrices(&[1.0, 0.0, 0.0, 1.0, 0.0, -leading], line_matrix);
}

/// Top edge of the page's MediaBox in PDF space, following `/Parent`
/// inheritance
fn page_top(doc: &Document, page_id: ObjectId) -> f32 {
    let mut current = doc.get_dictionary(page_id).ok();
    while let Some(dict) = current {
        if let Ok(media_box) = dict.get(b"MediaBox").map(|o| resolve(doc, o)) {
            if let Ok(values) = media_box.as_array() {
                let numbers: Vec<f32> = values.iter().filter_map(get_number).collect();
                if numbers.len() == 4 {
                    return numbers[1].max(numbers[3]);
                }
            }
        }
        current = dict
            .get(b"Parent")
            .and_then(Object::as_reference)
            .and_then(|id| doc.get_dictionary(id))
            .ok();
    }
    // US Letter
    792.0
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

fn matrix_operand(operands: &[Object]) -> Option<[f32; 6]> {
    if operands.len() < 6 {
        return None;
    }
    let mut m = [1.0f32, 0.0, 0.0, 1.0, 0.0, 0.0];
    for (i, operand) in operands.iter().take(6).enumerate() {
        m[i] = get_number(operand).unwrap_or(if i == 0 || i == 3 { 1.0 } else { 0.0 });
    }
    Some(m)
}

fn set_number(operands: &[Object], target: &mut f32) {
    if let Some(value) = operands.first().and_then(get_number) {
        *target = value;
    }
}

/// Helper to get f32 from Object
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Decode a string operand, handling encoding
fn decode_string(
    bytes: &[u8],
    doc: &Document,
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
    current_font: &str,
) -> Option<String> {
    if let Some(font_dict) = fonts.get(current_font.as_bytes()) {
        if let Ok(encoding) = font_dict.get_font_encoding(doc) {
            if let Ok(text) = Document::decode_text(&encoding, bytes) {
                return Some(text);
            }
        }
    }

    // Fallback: try UTF-16BE then Latin-1
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        return Some(String::from_utf16_lossy(&utf16));
    }

    Some(bytes.iter().map(|&b| b as char).collect())
}

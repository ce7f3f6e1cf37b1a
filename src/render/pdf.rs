use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Point, Pt, Rect,
    Rgb,
};

use crate::render::layout::{Document, Element, FontStyle, PAGE_HEIGHT, PAGE_WIDTH};
use crate::render::RenderError;

/// Distance from the top of a text line to its baseline, as a share of the font size.
const ASCENT: f32 = 0.8;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self, RenderError> {
        let load = |font| doc.add_builtin_font(font).map_err(|e| RenderError::Font(e.to_string()));
        Ok(Fonts {
            regular: load(BuiltinFont::Helvetica)?,
            bold: load(BuiltinFont::HelveticaBold)?,
            oblique: load(BuiltinFont::HelveticaOblique)?,
        })
    }

    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Oblique => &self.oblique,
        }
    }
}

/// "#333", "#4e54c8" or "4e54c8"; anything else falls back to dark grey.
pub fn parse_color(hex: &str) -> Color {
    let digits = hex.trim().trim_start_matches('#');
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => "333333".to_string(),
    };
    let channel = |i: usize| {
        expanded
            .get(i..i + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .map(|v| v as f32 / 255.0)
            .unwrap_or(0.2)
    };
    Color::Rgb(Rgb::new(channel(0), channel(2), channel(4), None))
}

/// The built-in fonts only cover Latin-1; map common typography and drop the rest.
fn latin1(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2022}' | '\u{2013}' | '\u{2014}' => '-',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201c}' | '\u{201d}' => '"',
            c if (c as u32) < 0x100 => c,
            _ => '?',
        })
        .collect()
}

fn mm(points: f32) -> Mm {
    Mm::from(Pt(points))
}

fn point(x: f32, y: f32) -> Point {
    Point::new(mm(x), mm(PAGE_HEIGHT - y))
}

fn draw(layer: &PdfLayerReference, fonts: &Fonts, element: &Element) {
    match element {
        Element::Text { x, y, size, style, color, text } => {
            layer.set_fill_color(parse_color(color));
            let baseline = PAGE_HEIGHT - (y + size * ASCENT);
            layer.use_text(latin1(text), *size, mm(*x), mm(baseline), fonts.get(*style));
        }
        Element::Rule { x1, x2, y, thickness, color } => {
            layer.set_outline_color(parse_color(color));
            layer.set_outline_thickness(*thickness);
            layer.add_line(Line { points: vec![(point(*x1, *y), false), (point(*x2, *y), false)], is_closed: false });
        }
        Element::Bar { x, y, width, height, color } => {
            layer.set_fill_color(parse_color(color));
            let rect = Rect::new(mm(*x), mm(PAGE_HEIGHT - (y + height)), mm(x + width), mm(PAGE_HEIGHT - y))
                .with_mode(PaintMode::Fill)
                .with_winding(WindingOrder::NonZero);
            layer.add_rect(rect);
        }
    }
}

/// Encodes a laid out document as PDF bytes.
pub fn write_pdf(document: &Document) -> Result<Vec<u8>, RenderError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(latin1(&document.title), mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "content");
    let doc = doc.with_author(latin1(&document.author)).with_creator("Dev Network CV Builder");
    let fonts = Fonts::load(&doc)?;

    for (i, page) in document.pages.iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) = doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "content");
            doc.get_page(page_index).get_layer(layer_index)
        };
        for element in &page.elements {
            draw(&layer, &fonts, element);
        }
    }

    doc.save_to_bytes().map_err(|e| RenderError::Write(e.to_string()))
}

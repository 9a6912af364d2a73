//! Stamp a text watermark onto every page of a PDF.

use std::ops::RangeInclusive;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, StringFormat};
use tracing::{info, warn};

use super::{add_resource, append_page_content, load_document, media_box};
use crate::error::{Result, ToolError};
use crate::report::Report;

const FONT_RESOURCE: &str = "SyWmF";
const STATE_RESOURCE: &str = "SyWmGS";
/// Distance from the page edge for corner positions, in points.
const MARGIN: f32 = 50.0;
const GRAY: f32 = 0.5;

/// Accepted font sizes, in points.
pub const FONT_SIZE_RANGE: RangeInclusive<u16> = 10..=72;
/// Accepted fill opacities.
pub const OPACITY_RANGE: RangeInclusive<f32> = 0.1..=1.0;

/// Helvetica advance widths (1/1000 em) for the printable ASCII range.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 222, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 222, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];
const DEFAULT_WIDTH: u16 = 556;

/// Where the watermark is anchored on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, serde::Serialize)]
pub enum Position {
    #[default]
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Watermark appearance.
#[derive(Debug, Clone)]
pub struct WatermarkStyle {
    pub text: String,
    pub font_size: f32,
    /// Fill opacity, 0.1 (faint) to 1 (opaque)
    pub opacity: f32,
    pub position: Position,
}

/// Parse an opacity argument, rejecting values outside [`OPACITY_RANGE`].
pub fn parse_opacity(value: &str) -> std::result::Result<f32, String> {
    let opacity: f32 = value.trim().parse().map_err(|_| format!("`{value}` is not a number"))?;
    if OPACITY_RANGE.contains(&opacity) {
        Ok(opacity)
    } else {
        Err(format!(
            "opacity must be between {} and {}",
            OPACITY_RANGE.start(),
            OPACITY_RANGE.end()
        ))
    }
}

/// Width of `text` set in Helvetica at `font_size`, in points.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| {
            let code = c as u32;
            if (32..=126).contains(&code) {
                HELVETICA_WIDTHS[(code - 32) as usize] as u32
            } else {
                DEFAULT_WIDTH as u32
            }
        })
        .sum();
    units as f32 * font_size / 1000.0
}

/// Text origin for the watermark on a page with the given MediaBox.
pub fn anchor(rect: [f32; 4], text_width: f32, position: Position) -> (f32, f32) {
    let [llx, lly, urx, ury] = rect;
    match position {
        Position::Center => ((llx + urx) / 2.0 - text_width / 2.0, (lly + ury) / 2.0),
        Position::TopLeft => (llx + MARGIN, ury - MARGIN),
        Position::TopRight => (urx - MARGIN - text_width, ury - MARGIN),
        Position::BottomLeft => (llx + MARGIN, lly + MARGIN),
        Position::BottomRight => (urx - MARGIN - text_width, lly + MARGIN),
    }
}

/// Encode the text for a WinAnsi simple font. Characters outside Latin-1
/// cannot be shown by the standard fonts and become `?`.
fn encode_text(text: &str) -> (Vec<u8>, bool) {
    let mut lossy = false;
    let bytes = text
        .chars()
        .map(|c| match u8::try_from(c as u32) {
            Ok(b) if b >= 0x20 => b,
            _ => {
                lossy = true;
                b'?'
            }
        })
        .collect();
    (bytes, lossy)
}

/// Add the watermark to every page of `input` and save to `output`.
pub fn watermark_pdf(input: &Path, output: &Path, style: &WatermarkStyle) -> Result<Report> {
    if style.text.trim().is_empty() {
        return Err(ToolError::InvalidInput("watermark text is empty".to_string()));
    }
    if !OPACITY_RANGE.contains(&style.opacity) {
        return Err(ToolError::InvalidInput(format!(
            "opacity must be between {} and {}, got {}",
            OPACITY_RANGE.start(),
            OPACITY_RANGE.end(),
            style.opacity
        )));
    }
    let (min_size, max_size) = (f32::from(*FONT_SIZE_RANGE.start()), f32::from(*FONT_SIZE_RANGE.end()));
    if !(min_size..=max_size).contains(&style.font_size) {
        return Err(ToolError::InvalidInput(format!(
            "font size must be between {min_size} and {max_size}, got {}",
            style.font_size
        )));
    }

    let mut doc = load_document(input)?;
    let (encoded, lossy) = encode_text(&style.text);
    if lossy {
        warn!("Watermark text contains characters Helvetica cannot show; they are replaced by '?'");
    }
    let width = text_width(&style.text, style.font_size);

    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    let font_id = doc.add_object(font);

    let mut state = Dictionary::new();
    state.set("Type", Object::Name(b"ExtGState".to_vec()));
    state.set("ca", Object::Real(style.opacity));
    state.set("CA", Object::Real(style.opacity));
    let state_id = doc.add_object(state);

    let pages: Vec<_> = doc.get_pages().into_values().collect();
    for page_id in &pages {
        let (x, y) = anchor(media_box(&doc, *page_id)?, width, style.position);

        add_resource(&mut doc, *page_id, b"Font", FONT_RESOURCE, Object::Reference(font_id))?;
        add_resource(&mut doc, *page_id, b"ExtGState", STATE_RESOURCE, Object::Reference(state_id))?;

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new("gs", vec![Object::Name(STATE_RESOURCE.as_bytes().to_vec())]),
                Operation::new("rg", vec![GRAY.into(), GRAY.into(), GRAY.into()]),
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![Object::Name(FONT_RESOURCE.as_bytes().to_vec()), style.font_size.into()],
                ),
                Operation::new("Td", vec![x.into(), y.into()]),
                Operation::new("Tj", vec![Object::String(encoded.clone(), StringFormat::Literal)]),
                Operation::new("ET", vec![]),
                Operation::new("Q", vec![]),
            ],
        };
        append_page_content(&mut doc, *page_id, content.encode()?)?;
    }

    info!("Watermarked {} pages of {}", pages.len(), input.display());
    doc.compress();
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    doc.save(output)?;

    let mut report = Report::new("pdf-watermark");
    report.push_output(output);
    Ok(report.with_summary(format!("watermarked {} pages", pages.len())))
}

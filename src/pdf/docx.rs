//! Convert the text layer of a PDF into a Word document.
//!
//! Only text survives the conversion: each extracted line becomes a
//! paragraph and PDF pages are separated by hard page breaks.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::{info, warn};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use super::load_document;
use crate::error::Result;
use crate::report::Report;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Default output path: the input with a `.docx` extension.
pub fn default_output(input: &Path) -> PathBuf {
    input.with_extension("docx")
}

/// Drop characters that XML 1.0 does not allow.
fn xml_safe(line: &str) -> String {
    line.chars()
        .filter(|&c| c == '\t' || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}'))
        .collect()
}

fn write_paragraph<W: Write>(writer: &mut Writer<W>, text: &str) -> Result<()> {
    if text.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new("w:p")))?;
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new("w:p")))?;
    writer.write_event(Event::Start(BytesStart::new("w:r")))?;
    writer.write_event(Event::Start(
        BytesStart::new("w:t").with_attributes([("xml:space", "preserve")]),
    ))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new("w:t")))?;
    writer.write_event(Event::End(BytesEnd::new("w:r")))?;
    writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

fn write_page_break<W: Write>(writer: &mut Writer<W>) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("w:p")))?;
    writer.write_event(Event::Start(BytesStart::new("w:r")))?;
    writer.write_event(Event::Empty(
        BytesStart::new("w:br").with_attributes([("w:type", "page")]),
    ))?;
    writer.write_event(Event::End(BytesEnd::new("w:r")))?;
    writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

/// Build `word/document.xml` from per-page text.
pub fn document_xml(pages: &[String]) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    writer.write_event(Event::Start(
        BytesStart::new("w:document").with_attributes([("xmlns:w", WORDML_NS)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("w:body")))?;

    for (index, page) in pages.iter().enumerate() {
        if index > 0 {
            write_page_break(&mut writer)?;
        }
        for line in page.lines() {
            write_paragraph(&mut writer, &xml_safe(line.trim_end()))?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new("w:body")))?;
    writer.write_event(Event::End(BytesEnd::new("w:document")))?;
    Ok(writer.into_inner())
}

/// Convert `input` to a `.docx` at `output` (or next to the input).
pub fn pdf_to_docx(input: &Path, output: Option<&Path>) -> Result<Report> {
    let doc = load_document(input)?;
    let output = output.map(Path::to_path_buf).unwrap_or_else(|| default_output(input));

    let numbers: Vec<u32> = doc.get_pages().into_keys().collect();
    let mut pages = Vec::with_capacity(numbers.len());
    let mut without_text = 0usize;
    for number in &numbers {
        let text = doc.extract_text(&[*number]).unwrap_or_else(|e| {
            warn!("Could not extract text from page {}: {}", number, e);
            String::new()
        });
        if text.trim().is_empty() {
            without_text += 1;
        }
        pages.push(text);
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut zip = ZipWriter::new(BufWriter::new(File::create(&output)?));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES.as_bytes())?;
    zip.start_file("_rels/.rels", options)?;
    zip.write_all(ROOT_RELS.as_bytes())?;
    zip.start_file("word/document.xml", options)?;
    zip.write_all(&document_xml(&pages)?)?;
    zip.finish()?.flush()?;

    if without_text > 0 {
        warn!("{} of {} pages have no extractable text (scanned pages are not recognised)", without_text, numbers.len());
    }
    info!("Wrote {}", output.display());

    let mut report = Report::new("pdf-to-word");
    report.push_output(&output);
    Ok(report.with_summary(format!("converted {} pages", numbers.len())))
}

//! Text extraction from knowledge files
//!
//! Plain text and Markdown are read as-is, with form feeds as page breaks.
//! PDF pages come from `lopdf`; DOCX text is the `w:t` runs of
//! `word/document.xml`, one line per paragraph.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;
use std::path::Path;

use crate::context::pages_from_text;
use crate::errors::{AtendenteError, Result};

/// Extensions the extractor understands
pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "pdf", "docx"];

/// Lowercased extension of `path`, empty when missing
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

pub fn is_supported(path: &Path) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension_of(path).as_str())
}

/// Text of each page of `path`.
///
/// DOCX has no stored pagination and comes back as a single page.
pub fn extract_pages(path: &Path) -> Result<Vec<String>> {
    match extension_of(path).as_str() {
        "pdf" => pdf_pages(path),
        "docx" => Ok(vec![docx_text(path)?]),
        "txt" | "md" => {
            let text = std::fs::read_to_string(path)?;
            Ok(pages_from_text(&text))
        }
        other => Err(failure(path, format!("unsupported file type '{}'", other))),
    }
}

/// Whole text of `path`, pages joined by newlines
pub fn extract_text(path: &Path) -> Result<String> {
    Ok(extract_pages(path)?.join("\n"))
}

fn failure(path: &Path, reason: impl ToString) -> AtendenteError {
    AtendenteError::ExtractionError {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn pdf_pages(path: &Path) -> Result<Vec<String>> {
    let document = lopdf::Document::load(path).map_err(|e| failure(path, e))?;
    let mut pages = Vec::new();
    for page_number in document.get_pages().into_keys() {
        match document.extract_text(&[page_number]) {
            Ok(text) => pages.push(text),
            Err(e) => {
                tracing::warn!("page {} of {}: {}", page_number, path.display(), e);
                pages.push(String::new());
            }
        }
    }
    tracing::debug!("extracted {} pages from {}", pages.len(), path.display());
    Ok(pages)
}

fn docx_text(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| failure(path, e))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| failure(path, e))?
        .read_to_string(&mut xml)?;

    document_xml_text(&xml).map_err(|e| failure(path, e))
}

/// Paragraph text of a WordprocessingML body
fn document_xml_text(xml: &str) -> std::result::Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_run_text => text.push_str(&e.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

use std::io::{Cursor, Read};
use std::panic::{catch_unwind, AssertUnwindSafe};

use quick_xml::{events::Event, Reader as XmlReader};
use zip::ZipArchive;

use super::{CapabilityError, CapabilityKind, TextExtractor};
use crate::grading::domain::{Document, DocumentFormat};

const DOCX_BODY: &str = "word/document.xml";

/// Pulls text out of TXT, PDF and DOCX uploads.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentExtractor;

impl TextExtractor for DocumentExtractor {
    fn extract(&self, document: &Document) -> Result<String, CapabilityError> {
        match document.format {
            DocumentFormat::Txt => Ok(String::from_utf8_lossy(&document.bytes).into_owned()),
            DocumentFormat::Pdf => pdf_text(&document.bytes),
            DocumentFormat::Docx => docx_text(&document.bytes),
        }
    }
}

fn failed(message: impl std::fmt::Display) -> CapabilityError {
    CapabilityError::failed(CapabilityKind::Extractor, message)
}

fn pdf_text(bytes: &[u8]) -> Result<String, CapabilityError> {
    // pdf-extract panics on some malformed content streams.
    match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(err)) => Err(failed(format!("failed to extract PDF text: {err}"))),
        Err(_) => Err(failed("PDF parser aborted on malformed content")),
    }
}

fn docx_text(bytes: &[u8]) -> Result<String, CapabilityError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|err| failed(format!("failed to open DOCX archive: {err}")))?;
    let mut body = archive
        .by_name(DOCX_BODY)
        .map_err(|err| failed(format!("missing {DOCX_BODY}: {err}")))?;
    let mut xml = String::new();
    body.read_to_string(&mut xml)
        .map_err(|err| failed(format!("failed to read DOCX XML: {err}")))?;
    paragraphs_from_xml(&xml)
}

/// Concatenates `w:t` runs, one line per `w:p` paragraph.
fn paragraphs_from_xml(xml: &str) -> Result<String, CapabilityError> {
    let mut reader = XmlReader::from_str(xml);
    let mut buf = Vec::new();
    let mut output = String::new();
    let mut in_text_node = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text_node = true,
                b"w:tab" => output.push('\t'),
                b"w:br" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"w:tab" => output.push('\t'),
                b"w:br" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text_node => {
                let value = e
                    .unescape()
                    .map_err(|err| failed(format!("failed to decode DOCX text: {err}")))?;
                output.push_str(&value);
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text_node = false,
                b"w:p" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(err) => return Err(failed(format!("failed to parse DOCX XML: {err}"))),
            _ => {}
        }
        buf.clear();
    }

    Ok(output.trim().to_string())
}

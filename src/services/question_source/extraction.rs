use std::io::{Cursor, Read};
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::services::datalab_ocr::DatalabOcrService;

/// Largest XML part read out of an uploaded Office package.
const MAX_PART_BYTES: u64 = 32 * 1024 * 1024;

/// How the text of an uploaded source is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SourceFormat {
    Text,
    Pdf,
    Document(OfficeKind),
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OfficeKind {
    Word,
    PowerPoint,
}

impl SourceFormat {
    pub(crate) fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "txt" => Some(Self::Text),
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Document(OfficeKind::Word)),
            "pptx" => Some(Self::Document(OfficeKind::PowerPoint)),
            "png" | "jpg" | "jpeg" => Some(Self::Image),
            _ => None,
        }
    }

    pub(crate) fn needs_ocr(self) -> bool {
        matches!(self, Self::Pdf | Self::Image)
    }
}

pub(crate) fn file_extension(filename: &str) -> Option<String> {
    let (_, extension) = filename.rsplit_once('.')?;
    if extension.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

#[derive(Debug, Error)]
pub(crate) enum ExtractionError {
    #[error("unsupported file type: {0}")]
    Unsupported(String),
    #[error("document package is unreadable: {0}")]
    Package(#[from] zip::result::ZipError),
    #[error("document part could not be read: {0}")]
    Io(#[from] std::io::Error),
    #[error("OCR service is not configured")]
    OcrUnavailable,
    #[error("OCR failed: {0}")]
    Ocr(anyhow::Error),
}

/// Turns uploaded bytes into plain text according to the file extension.
pub(crate) async fn extract_text(
    filename: &str,
    bytes: &[u8],
    ocr: Option<&DatalabOcrService>,
) -> Result<String, ExtractionError> {
    let format = file_extension(filename)
        .as_deref()
        .and_then(SourceFormat::from_extension)
        .ok_or_else(|| ExtractionError::Unsupported(filename.to_string()))?;

    match format {
        SourceFormat::Text => Ok(String::from_utf8_lossy(bytes).into_owned()),
        SourceFormat::Document(kind) => office_text(kind, bytes),
        SourceFormat::Pdf | SourceFormat::Image => {
            let ocr = ocr.ok_or(ExtractionError::OcrUnavailable)?;
            ocr.markdown_for_bytes(filename, bytes.to_vec()).await.map_err(ExtractionError::Ocr)
        }
    }
}

fn office_text(kind: OfficeKind, bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    match kind {
        OfficeKind::Word => {
            let xml = read_part(&mut archive, "word/document.xml")?;
            Ok(collect_runs(&xml, "w"))
        }
        OfficeKind::PowerPoint => {
            let mut slides: Vec<(u32, String)> = archive
                .file_names()
                .filter_map(|name| slide_number(name).map(|number| (number, name.to_string())))
                .collect();
            slides.sort_by_key(|(number, _)| *number);

            let mut parts = Vec::with_capacity(slides.len());
            for (_, name) in slides {
                let xml = read_part(&mut archive, &name)?;
                let text = collect_runs(&xml, "a");
                if !text.is_empty() {
                    parts.push(text);
                }
            }
            Ok(parts.join("\n\n"))
        }
    }
}

fn read_part(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<String, ExtractionError> {
    let file = archive.by_name(name)?;
    let mut xml = String::new();
    file.take(MAX_PART_BYTES).read_to_string(&mut xml)?;
    Ok(xml)
}

fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix("ppt/slides/slide")?.strip_suffix(".xml")?.parse().ok()
}

fn paragraph_end(prefix: &str) -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    static DRAWING: OnceLock<Regex> = OnceLock::new();
    let (cell, pattern) = match prefix {
        "w" => (&WORD, r"</w:p>"),
        _ => (&DRAWING, r"</a:p>"),
    };
    cell.get_or_init(|| Regex::new(pattern).expect("Invalid paragraph regex"))
}

fn text_run(prefix: &str) -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    static DRAWING: OnceLock<Regex> = OnceLock::new();
    let (cell, pattern) = match prefix {
        "w" => (&WORD, r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>"),
        _ => (&DRAWING, r"<a:t(?:\s[^>]*)?>([^<]*)</a:t>"),
    };
    cell.get_or_init(|| Regex::new(pattern).expect("Invalid text run regex"))
}

/// Joins the `<{prefix}:t>` runs of each paragraph, one paragraph per line.
fn collect_runs(xml: &str, prefix: &str) -> String {
    let runs = text_run(prefix);
    paragraph_end(prefix)
        .split(xml)
        .map(|paragraph| {
            runs.captures_iter(paragraph)
                .filter_map(|caps| caps.get(1))
                .map(|text| unescape_xml(text.as_str()))
                .collect::<String>()
        })
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn xml_reference() -> &'static Regex {
    static REFERENCE: OnceLock<Regex> = OnceLock::new();
    REFERENCE.get_or_init(|| {
        Regex::new(r"&(?:#x([0-9A-Fa-f]+)|#([0-9]+)|(lt|gt|quot|apos|amp));")
            .expect("Invalid XML reference regex")
    })
}

/// Decodes the predefined entities and numeric character references in one
/// pass. References to invalid code points are kept as written.
fn unescape_xml(value: &str) -> String {
    xml_reference()
        .replace_all(value, |caps: &regex::Captures<'_>| {
            let code_point = if let Some(hex) = caps.get(1) {
                u32::from_str_radix(hex.as_str(), 16).ok()
            } else if let Some(decimal) = caps.get(2) {
                decimal.as_str().parse::<u32>().ok()
            } else {
                let named = match caps.get(3).map(|name| name.as_str()) {
                    Some("lt") => "<",
                    Some("gt") => ">",
                    Some("quot") => "\"",
                    Some("apos") => "'",
                    _ => "&",
                };
                return named.to_string();
            };
            match code_point.and_then(char::from_u32) {
                Some(ch) => ch.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Cuts `text` to at most `max_chars` characters without splitting one.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

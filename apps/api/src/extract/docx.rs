use std::io::{Cursor, Read};
use std::sync::LazyLock;

use regex::Regex;
use zip::ZipArchive;

use super::ExtractError;

const DOCUMENT_PART: &str = "word/document.xml";

/// A text run, a tab, or a line break inside a paragraph.
static RUN_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>|<w:tab\s*/>|<w:br(?:\s[^>]*)?/>")
        .expect("valid regex")
});

/// Extracts paragraph text from the main document part, one line per paragraph.
pub fn extract(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::CorruptOrEncrypted(format!("not a valid DOCX archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractError::CorruptOrEncrypted(format!("missing {DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::CorruptOrEncrypted(format!("unreadable {DOCUMENT_PART}: {e}")))?;

    Ok(document_text(&xml))
}

fn document_text(xml: &str) -> String {
    xml.split("</w:p>")
        .map(paragraph_text)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn paragraph_text(fragment: &str) -> String {
    let mut line = String::new();
    for token in RUN_TOKEN.captures_iter(fragment) {
        match token.get(1) {
            Some(run) => line.push_str(&unescape_xml(run.as_str())),
            None if token[0].starts_with("<w:tab") => line.push('\t'),
            None => line.push('\n'),
        }
    }
    line
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

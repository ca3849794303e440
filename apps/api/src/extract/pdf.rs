use lopdf::Document;
use tracing::{debug, warn};

use super::ExtractError;

/// Extracts text page by page. Encrypted files get one attempt with the empty
/// password; pages that fail to decode are skipped instead of aborting.
pub fn extract(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut doc = Document::load_mem(bytes)
        .map_err(|e| ExtractError::CorruptOrEncrypted(format!("unreadable PDF: {e}")))?;

    let encrypted = doc.is_encrypted();
    if encrypted {
        warn!("PDF is encrypted, attempting empty-password decryption");
        if let Err(e) = doc.decrypt("") {
            warn!("Empty-password decryption failed: {e}");
        }
    }

    let pages = doc.get_pages();
    if pages.is_empty() {
        warn!("PDF has no pages");
        return Err(ExtractError::NoTextExtracted);
    }

    let mut text = String::new();
    let mut skipped = 0usize;
    for page_number in pages.keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(page_text) => {
                let page_text = page_text.trim_end();
                if !page_text.is_empty() {
                    text.push_str(page_text);
                    text.push('\n');
                }
            }
            Err(e) => {
                skipped += 1;
                warn!("Skipping unreadable PDF page {page_number}: {e}");
            }
        }
    }
    debug!(
        "PDF text pass: {} pages, {} skipped, {} chars",
        pages.len(),
        skipped,
        text.len()
    );

    if text.trim().is_empty() {
        // lopdf misses some font encodings that pdf-extract can decode.
        // pdf-extract panics on some malformed inputs.
        match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
            Ok(Ok(fallback)) => text = fallback,
            Ok(Err(e)) => warn!("pdf-extract fallback failed: {e}"),
            Err(_) => warn!("pdf-extract fallback panicked; treating document as textless"),
        }
    }

    if text.trim().is_empty() && encrypted {
        return Err(ExtractError::CorruptOrEncrypted(
            "the PDF is encrypted and could not be opened without a password".to_string(),
        ));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_a_pdf() {
        let err = extract(b"%PDF-garbage").unwrap_err();
        assert!(matches!(err, ExtractError::CorruptOrEncrypted(_)));
    }

    #[test]
    fn test_generated_pdf_loads() {
        let record = crate::models::ResumeRecord {
            name: "Ada Lovelace".into(),
            ..Default::default()
        };
        let bytes = crate::export::pdf::render(&record).unwrap();
        assert!(extract(&bytes).is_ok());
    }
}

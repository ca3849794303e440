use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::ZipWriter;

use super::{layout, Block, DocumentBuilder, ExportError};
use crate::models::ResumeRecord;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

pub struct DocxBuilder;

impl DocumentBuilder for DocxBuilder {
    fn build(&self, record: &ResumeRecord) -> Result<Vec<u8>, ExportError> {
        let body: String = layout(record).iter().map(paragraph).collect();
        let document = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{body}<w:sectPr><w:pgSz w:w=\"12240\" w:h=\"15840\"/>\
             <w:pgMar w:top=\"720\" w:right=\"1080\" w:bottom=\"720\" w:left=\"1080\"/></w:sectPr>\
             </w:body></w:document>"
        );

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", PACKAGE_RELS),
            ("word/document.xml", document.as_str()),
        ] {
            writer.start_file(name, FileOptions::default())?;
            writer.write_all(contents.as_bytes())?;
        }
        Ok(writer.finish()?.into_inner())
    }
}

/// One WordprocessingML paragraph. Sizes are in half-points, spacing in twips.
fn paragraph(block: &Block) -> String {
    let (text, centered, run_props, spacing_before) = match block {
        Block::Title(t) => (t.as_str(), true, "<w:b/><w:sz w:val=\"40\"/>", 0),
        Block::Contact(t) => (t.as_str(), true, "<w:sz w:val=\"20\"/>", 0),
        Block::Heading(t) => (*t, false, "<w:b/><w:color w:val=\"2C3E50\"/><w:sz w:val=\"26\"/>", 240),
        Block::Entry(t) => (t.as_str(), false, "<w:b/><w:sz w:val=\"22\"/>", 120),
        Block::Meta(t) => (t.as_str(), false, "<w:i/><w:color w:val=\"666666\"/><w:sz w:val=\"18\"/>", 0),
        Block::Paragraph(t) => (t.as_str(), false, "<w:sz w:val=\"20\"/>", 60),
        Block::Bullet(t) => (t.as_str(), false, "<w:sz w:val=\"20\"/>", 0),
    };

    let mut props = format!("<w:spacing w:before=\"{spacing_before}\" w:after=\"40\"/>");
    if centered {
        props.push_str("<w:jc w:val=\"center\"/>");
    }
    if matches!(block, Block::Bullet(_)) {
        props.push_str("<w:ind w:left=\"360\" w:hanging=\"360\"/>");
    }
    let text = match block {
        Block::Bullet(_) => format!("\u{2022} {text}"),
        _ => text.to_string(),
    };

    format!(
        "<w:p><w:pPr>{props}</w:pPr><w:r><w:rPr>{run_props}</w:rPr><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
        escape_xml(&text)
    )
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c if c.is_control() => escaped.push(' '),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract;
    use crate::models::{ExperienceEntry, Skills};

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("R&D <lead> \"x\""), "R&amp;D &lt;lead&gt; &quot;x&quot;");
    }

    #[test]
    fn test_docx_text_survives_extraction() {
        let record = ResumeRecord {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            skills: Skills::List(vec!["SQL".into(), "R&D".into()]),
            experience: vec![ExperienceEntry {
                title: "Analyst".into(),
                company: "Initech".into(),
                achievements: vec!["Cut report time by 40%".into()],
                ..Default::default()
            }],
            ..Default::default()
        };
        let bytes = DocxBuilder.build(&record).unwrap();
        let text = extract::docx::extract(&bytes).unwrap();

        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec![
                "Jane Doe",
                "jane@example.com",
                "SKILLS",
                "SQL, R&D",
                "PROFESSIONAL EXPERIENCE",
                "Analyst | Initech",
                "\u{2022} Cut report time by 40%",
            ]
        );
    }
}

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::ExtractError;

fn decode_error(message: impl Into<String>) -> ExtractError {
    ExtractError::Decode {
        kind: "docx",
        message: message.into(),
    }
}

/// Paragraph text of `word/document.xml`, one paragraph per line.
pub fn document_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| decode_error(format!("failed to open archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| decode_error(format!("missing word/document.xml: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| decode_error(format!("failed to read document.xml: {e}")))?;

    let mut reader = Reader::from_str(&xml);
    let mut buf = Vec::new();
    let mut lines = Vec::new();
    let mut paragraph = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => lines.push(std::mem::take(&mut paragraph)),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"br" => paragraph.push('\n'),
                b"tab" => paragraph.push('\t'),
                b"p" => lines.push(String::new()),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                paragraph.push_str(&e.unescape().unwrap_or_default());
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(decode_error(format!("XML parse error: {e}"))),
            _ => {}
        }
        buf.clear();
    }
    if !paragraph.is_empty() {
        lines.push(paragraph);
    }

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn docx(document_xml: &str) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_paragraphs_become_lines() {
        let xml = r#"<w:document xmlns:w="w"><w:body>
            <w:p><w:r><w:t>张三</w:t></w:r></w:p>
            <w:p/>
            <w:p><w:r><w:t xml:space="preserve">教育 </w:t></w:r><w:r><w:t>背景</w:t></w:r></w:p>
            <w:p><w:r><w:t>A&amp;B 公司</w:t><w:br/><w:t>工程师</w:t></w:r></w:p>
        </w:body></w:document>"#;
        let text = document_text(&docx(xml)).unwrap();
        assert_eq!(text, "张三\n\n教育 背景\nA&B 公司\n工程师");
    }

    #[test]
    fn test_not_a_zip_is_a_decode_error() {
        assert!(matches!(
            document_text(b"plain bytes"),
            Err(ExtractError::Decode { kind: "docx", .. })
        ));
    }

    #[test]
    fn test_zip_without_document_is_a_decode_error() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("other.xml", SimpleFileOptions::default())
            .unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        assert!(document_text(&bytes).is_err());
    }
}

//! Minimal WordprocessingML package writer.
//!
//! # Responsibility
//! - Serialize proposal blocks into `word/document.xml`.
//! - Package the document with a text letterhead header and footer.
//!
//! # Invariants
//! - Body text is Arial 11pt with 1.2 line spacing; each block keeps its alignment.
//! - Parts are stored uncompressed; every part name is fixed.

use crate::config::FirmConfig;
use crate::proposal::{Align, Block, ProposalResult, Run};
use std::io::{Cursor, Seek, Write};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const FONT: &str = "Arial";
/// Half-points.
const FONT_SIZE: u32 = 22;
/// 240ths of a line; 288 is 1.2 lines.
const LINE_SPACING: u32 = 288;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/header1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"/><Override PartName="/word/footer1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/></Relationships>"#;

/// A4 with the letterhead margins, in twentieths of a point.
const SECTION_PROPERTIES: &str = r#"<w:sectPr><w:headerReference w:type="default" r:id="rId1"/><w:footerReference w:type="default" r:id="rId2"/><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1000" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr>"#;

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // XML 1.0 forbids these; Word refuses the file.
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {}
            _ => out.push(ch),
        }
    }
    out
}

fn justification(align: Align) -> &'static str {
    match align {
        Align::Left => "left",
        Align::Center => "center",
        Align::Right => "right",
        Align::Justify => "both",
    }
}

fn run_xml(run: &Run, size: u32) -> String {
    let bold = if run.bold { "<w:b/><w:bCs/>" } else { "" };
    let mut xml = format!(
        "<w:r><w:rPr><w:rFonts w:ascii=\"{FONT}\" w:hAnsi=\"{FONT}\" w:cs=\"{FONT}\"/>{bold}<w:sz w:val=\"{size}\"/><w:szCs w:val=\"{size}\"/></w:rPr>"
    );
    for (index, piece) in run.text.split('\t').enumerate() {
        if index > 0 {
            xml.push_str("<w:tab/>");
        }
        if !piece.is_empty() {
            xml.push_str("<w:t xml:space=\"preserve\">");
            xml.push_str(&escape_xml(piece));
            xml.push_str("</w:t>");
        }
    }
    xml.push_str("</w:r>");
    xml
}

fn paragraph_xml(block: &Block, size: u32) -> String {
    let mut xml = format!(
        "<w:p><w:pPr><w:spacing w:before=\"{}\" w:after=\"{}\" w:line=\"{LINE_SPACING}\" w:lineRule=\"auto\"/><w:jc w:val=\"{}\"/></w:pPr>",
        block.spacing_before,
        block.spacing_after,
        justification(block.align),
    );
    for run in block.runs.iter().filter(|run| !run.text.is_empty()) {
        xml.push_str(&run_xml(run, size));
    }
    xml.push_str("</w:p>");
    xml
}

/// `word/document.xml` for `blocks`.
pub fn document_xml(blocks: &[Block]) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:document xmlns:w=\"{W_NS}\" xmlns:r=\"{R_NS}\"><w:body>"
    );
    for block in blocks {
        xml.push_str(&paragraph_xml(block, FONT_SIZE));
    }
    xml.push_str(SECTION_PROPERTIES);
    xml.push_str("</w:body></w:document>");
    xml
}

fn header_xml(firm: &FirmConfig) -> String {
    let block = Block::bold_text(&firm.name).align(Align::Center).after(200);
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:hdr xmlns:w=\"{W_NS}\" xmlns:r=\"{R_NS}\">{}</w:hdr>",
        paragraph_xml(&block, 24)
    )
}

fn footer_xml(firm: &FirmConfig) -> String {
    let block = Block::text(&firm.address).align(Align::Center).after(0);
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:ftr xmlns:w=\"{W_NS}\" xmlns:r=\"{R_NS}\">{}</w:ftr>",
        paragraph_xml(&block, 18)
    )
}

/// Writes the package into `writer` and hands it back.
pub fn write_docx<W: Write + Seek>(
    writer: W,
    blocks: &[Block],
    firm: &FirmConfig,
) -> ProposalResult<W> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", PACKAGE_RELS.to_string()),
        ("word/document.xml", document_xml(blocks)),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.to_string()),
        ("word/header1.xml", header_xml(firm)),
        ("word/footer1.xml", footer_xml(firm)),
    ];

    let mut zip = ZipWriter::new(writer);
    for (name, content) in parts {
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes()).map_err(ZipError::from)?;
    }
    Ok(zip.finish()?)
}

/// The package as bytes.
pub fn docx_bytes(blocks: &[Block], firm: &FirmConfig) -> ProposalResult<Vec<u8>> {
    let cursor = write_docx(Cursor::new(Vec::new()), blocks, firm)?;
    Ok(cursor.into_inner())
}

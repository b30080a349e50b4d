//! WordprocessingML (`.docx`) rendering: a single bordered table.

use super::{escape, header_spans, write_package};
use crate::model::SubmodelTable;
use anyhow::Result;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const TABLE_PROPERTIES: &str = concat!(
    "<w:tblPr><w:tblW w:w=\"0\" w:type=\"auto\"/><w:tblBorders>",
    "<w:top w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>",
    "<w:left w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>",
    "<w:bottom w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>",
    "<w:right w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>",
    "<w:insideH w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>",
    "<w:insideV w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>",
    "</w:tblBorders><w:tblLayout w:type=\"autofit\"/></w:tblPr>"
);

/// Paragraph holding `text`; line breaks become `<w:br/>`.
fn paragraph(out: &mut String, text: &str, bold: bool) {
    if text.is_empty() {
        out.push_str("<w:p/>");
        return;
    }
    out.push_str("<w:p><w:r>");
    if bold {
        out.push_str("<w:rPr><w:b/></w:rPr>");
    }
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<w:br/>");
        }
        out.push_str(&format!("<w:t xml:space=\"preserve\">{}</w:t>", escape(line)));
    }
    out.push_str("</w:r></w:p>");
}

fn cell(out: &mut String, text: &str, span: usize, bold: bool) {
    out.push_str("<w:tc>");
    if span > 1 {
        out.push_str(&format!("<w:tcPr><w:gridSpan w:val=\"{}\"/></w:tcPr>", span));
    }
    paragraph(out, text, bold);
    out.push_str("</w:tc>");
}

fn document_xml(table: &SubmodelTable) -> String {
    let columns = &table.table.columns;
    let mut out = String::with_capacity(8192);
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
    out.push_str(
        "<w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>",
    );
    out.push_str("<w:tbl>");
    out.push_str(TABLE_PROPERTIES);
    out.push_str("<w:tblGrid>");
    for _ in columns {
        out.push_str("<w:gridCol/>");
    }
    out.push_str("</w:tblGrid>");

    out.push_str("<w:tr>");
    for span in header_spans(columns) {
        cell(&mut out, &span.text, span.span, true);
    }
    out.push_str("</w:tr>");

    for row in &table.table.rows {
        out.push_str("<w:tr>");
        for column in columns {
            let text = row.get(&column.key).and_then(|v| v.as_deref()).unwrap_or("");
            cell(&mut out, text, 1, false);
        }
        out.push_str("</w:tr>");
    }
    out.push_str("</w:tbl>");
    // A document must not end with a table.
    out.push_str("<w:p/>");
    out.push_str("</w:body></w:document>");
    out
}

/// Render a table as a `.docx` document.
pub fn render_docx(table: &SubmodelTable) -> Result<Vec<u8>> {
    write_package(&[
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", ROOT_RELS.to_string()),
        ("word/document.xml", document_xml(table)),
    ])
}

//! SpreadsheetML (`.xlsx`) rendering.
//!
//! One worksheet named after the submodel. Row 1 holds the headers (bold,
//! blank headers merged into their right neighbour), the table rows follow.
//! Cells use inline strings, so no shared string table is written.

use super::{escape, header_spans, write_package};
use crate::model::SubmodelTable;
use anyhow::Result;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

/// Style 0 default, 1 wrapped text, 2 bold centered header.
const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts>
<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="3">
<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0" applyAlignment="1"><alignment wrapText="1" vertical="top"/></xf>
<xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1" applyAlignment="1"><alignment horizontal="center"/></xf>
</cellXfs>
</styleSheet>"#;

const STYLE_WRAP: u8 = 1;
const STYLE_HEADER: u8 = 2;

/// Spreadsheet column name for a 0-based index: `A`, ..., `Z`, `AA`, ...
pub fn column_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// Worksheet names are limited to 31 characters and may not contain
/// `[]:*?/\`.
pub fn sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(31)
        .collect();
    if cleaned.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

fn push_cell(out: &mut String, reference: &str, text: &str, style: u8) {
    let space = if text.contains('\n') || text.starts_with(' ') || text.ends_with(' ') {
        " xml:space=\"preserve\""
    } else {
        ""
    };
    out.push_str(&format!(
        "<c r=\"{}\" t=\"inlineStr\" s=\"{}\"><is><t{}>{}</t></is></c>",
        reference,
        style,
        space,
        escape(text)
    ));
}

fn worksheet_xml(table: &SubmodelTable) -> String {
    let columns = &table.table.columns;
    let mut out = String::with_capacity(4096);
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
    out.push_str("<worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">");
    out.push_str("<sheetData>");

    let spans = header_spans(columns);
    out.push_str("<row r=\"1\">");
    for span in &spans {
        let reference = format!("{}1", column_name(span.first));
        push_cell(&mut out, &reference, &span.text, STYLE_HEADER);
    }
    out.push_str("</row>");

    for (r, row) in table.table.rows.iter().enumerate() {
        let row_number = r + 2;
        out.push_str(&format!("<row r=\"{}\">", row_number));
        for (c, column) in columns.iter().enumerate() {
            if let Some(Some(text)) = row.get(&column.key) {
                let reference = format!("{}{}", column_name(c), row_number);
                push_cell(&mut out, &reference, text, STYLE_WRAP);
            }
        }
        out.push_str("</row>");
    }
    out.push_str("</sheetData>");

    let merges: Vec<String> = spans
        .iter()
        .filter(|s| s.span > 1)
        .map(|s| {
            format!(
                "<mergeCell ref=\"{}1:{}1\"/>",
                column_name(s.first),
                column_name(s.first + s.span - 1)
            )
        })
        .collect();
    if !merges.is_empty() {
        out.push_str(&format!("<mergeCells count=\"{}\">", merges.len()));
        for m in &merges {
            out.push_str(m);
        }
        out.push_str("</mergeCells>");
    }
    out.push_str("</worksheet>");
    out
}

fn workbook_xml(table: &SubmodelTable) -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n",
            "<workbook xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" ",
            "xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">",
            "<sheets><sheet name=\"{}\" sheetId=\"1\" r:id=\"rId1\"/></sheets></workbook>"
        ),
        escape(&sheet_name(&table.submodel_short_name))
    )
}

/// Render a table as an `.xlsx` workbook.
pub fn render_xlsx(table: &SubmodelTable) -> Result<Vec<u8>> {
    write_package(&[
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", ROOT_RELS.to_string()),
        ("xl/workbook.xml", workbook_xml(table)),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
        ("xl/styles.xml", STYLES.to_string()),
        ("xl/worksheets/sheet1.xml", worksheet_xml(table)),
    ])
}

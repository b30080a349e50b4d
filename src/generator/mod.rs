//! Table renderers – write a [`SubmodelTable`] as an office document.
//!
//! This module provides:
//! - [`xlsx`] – Minimal SpreadsheetML workbook.
//! - [`docx`] – Minimal WordprocessingML document holding one table.
//!
//! JSON output is the serde rendering of [`SubmodelTable`].

pub mod docx;
pub mod xlsx;

use crate::model::{Column, SubmodelTable};
use anyhow::{Context, Result, anyhow};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Cursor, Write};
use std::str::FromStr;

/// Output document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TableFormat {
    #[default]
    Docx,
    Xlsx,
    Json,
}

impl TableFormat {
    pub const ALL: [TableFormat; 3] = [TableFormat::Docx, TableFormat::Xlsx, TableFormat::Json];

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            TableFormat::Docx => "docx",
            TableFormat::Xlsx => "xlsx",
            TableFormat::Json => "json",
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TableFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('.');
        TableFormat::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown table format '{}' (expected docx, xlsx or json)", s))
    }
}

impl<'de> Deserialize<'de> for TableFormat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for TableFormat {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.extension())
    }
}

/// A run of header cells shown as one merged cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSpan {
    /// Index of the first column of the run.
    pub first: usize,
    /// Number of columns covered.
    pub span: usize,
    pub text: String,
}

/// Group header cells: a blank header merges with the next non-blank one,
/// so the model type column shares the `idShort` header. Blank headers with
/// nothing after them stay single.
pub fn header_spans(columns: &[Column]) -> Vec<HeaderSpan> {
    let mut spans = Vec::new();
    let mut i = 0;
    while i < columns.len() {
        let first = i;
        while i < columns.len() && columns[i].header.is_empty() {
            i += 1;
        }
        if i == columns.len() {
            spans.extend((first..i).map(|c| HeaderSpan {
                first: c,
                span: 1,
                text: String::new(),
            }));
            break;
        }
        spans.push(HeaderSpan {
            first,
            span: i - first + 1,
            text: columns[i].header.clone(),
        });
        i += 1;
    }
    spans
}

/// Characters XML 1.0 does not allow anywhere in a document.
fn is_xml_forbidden(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}')
}

/// Escape text for XML element content. Characters XML cannot carry are
/// dropped.
pub(crate) fn escape(s: &str) -> std::borrow::Cow<'_, str> {
    if !s.chars().any(is_xml_forbidden) {
        return quick_xml::escape::escape(s);
    }
    let cleaned: String = s.chars().filter(|c| !is_xml_forbidden(*c)).collect();
    std::borrow::Cow::Owned(quick_xml::escape::escape(&cleaned).into_owned())
}

/// Zip the given `(path, content)` parts into an OOXML package.
pub(crate) fn write_package(parts: &[(&str, String)]) -> Result<Vec<u8>> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (path, content) in parts {
        zip.start_file(*path, options)
            .with_context(|| format!("Failed to add {} to package", path))?;
        zip.write_all(content.as_bytes())?;
    }
    let cursor = zip.finish().context("Failed to finish package")?;
    Ok(cursor.into_inner())
}

/// Render a table into the bytes of a document of the given format.
pub fn render(table: &SubmodelTable, format: TableFormat) -> Result<Vec<u8>> {
    match format {
        TableFormat::Docx => docx::render_docx(table),
        TableFormat::Xlsx => xlsx::render_xlsx(table),
        TableFormat::Json => serde_json::to_vec_pretty(table)
            .map_err(|e| anyhow!("Failed to serialize {}: {}", table.key, e)),
    }
}

/// Render a table and write it to `path`.
pub fn write_to_file(table: &SubmodelTable, format: TableFormat, path: impl AsRef<Utf8Path>) -> Result<()> {
    let path = path.as_ref();
    let bytes = render(table, format)?;
    std::fs::write(path.as_std_path(), bytes).with_context(|| format!("Failed to write {}", path))
}

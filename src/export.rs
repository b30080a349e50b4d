//! Batch export: input discovery, per-file extraction and table rendering.

use crate::config::ExportConfig;
use crate::extract::{Extraction, TableExtractor};
use crate::generator;
use crate::parser::{AasDocument, AasParser, DocumentFormat, FsSource};
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Input file extensions picked up when walking directories.
pub const INPUT_EXTENSIONS: &[&str] = &["aasx", "xml", "json"];

/// Outcome of [`Exporter::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Files with at least one loaded document.
    pub succeeded: usize,
    pub failed: usize,
    /// Files not started because the export was cancelled.
    pub skipped: usize,
    pub tables_written: usize,
    pub tables_failed: usize,
}

impl ExportSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }
}

/// Tables written for one input file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReport {
    pub written: Vec<Utf8PathBuf>,
    pub failed: usize,
}

/// Expand files and directories into the list of input files. Directories
/// are walked recursively for `.aasx`, `.xml` and `.json` files.
pub fn collect_inputs(inputs: &[Utf8PathBuf]) -> Vec<Utf8PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        let mut found: Vec<Utf8PathBuf> = WalkDir::new(input.as_std_path())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| Utf8PathBuf::from_path_buf(e.into_path()).ok())
            .filter(|p| {
                p.extension()
                    .is_some_and(|ext| INPUT_EXTENSIONS.iter().any(|x| ext.eq_ignore_ascii_case(x)))
            })
            .collect();
        found.sort();
        files.extend(found);
    }
    files
}

/// Make an id-short safe for use in a file name.
fn file_safe(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

fn input_stem(input: &Utf8Path) -> &str {
    input.file_stem().unwrap_or("output")
}

/// Runs extraction and rendering over many files.
pub struct Exporter {
    config: ExportConfig,
    cancel: Arc<AtomicBool>,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Setting the flag stops the export before the next file or table.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn output_dir(&self, input: &Utf8Path) -> Utf8PathBuf {
        self.config
            .output_dir
            .clone()
            .or_else(|| input.parent().map(|p| p.to_path_buf()))
            .unwrap_or_default()
    }

    /// Output path of one table: `{dir}/{file_stem}_{key}.{ext}`.
    pub fn output_path(&self, input: &Utf8Path, key: &str) -> Utf8PathBuf {
        self.table_path(&self.output_dir(input), input_stem(input), key)
    }

    fn table_path(&self, dir: &Utf8Path, stem: &str, key: &str) -> Utf8PathBuf {
        dir.join(format!(
            "{}_{}.{}",
            stem,
            file_safe(key),
            self.config.format.extension()
        ))
    }

    /// File stems used for the outputs of `files`, one per input. When two
    /// inputs would write into the same directory under the same stem, the
    /// later one gets a numbered stem (`pump_2`, `pump_3`, ...).
    pub fn output_stems(&self, files: &[Utf8PathBuf]) -> Vec<String> {
        let mut taken: HashSet<(Utf8PathBuf, String)> = HashSet::new();
        files
            .iter()
            .map(|input| {
                let dir = self.output_dir(input);
                let stem = input_stem(input);
                let mut candidate = stem.to_string();
                let mut n = 2;
                while !taken.insert((dir.clone(), candidate.clone())) {
                    candidate = format!("{}_{}", stem, n);
                    n += 1;
                }
                if candidate != stem {
                    warn!(file = %input, stem = %candidate, "output name already used by another input");
                }
                candidate
            })
            .collect()
    }

    /// Load the documents of one input file. Package parts that fail are
    /// logged and skipped.
    pub fn load_documents(&self, path: &Utf8Path) -> Result<Vec<AasDocument>> {
        let ext = path.extension().map(|e| e.to_ascii_lowercase());
        if ext.as_deref() == Some("aasx") {
            let mut parser = AasParser::open_package(path)?;
            let contents = parser
                .parse_package()
                .with_context(|| format!("Failed to read package {}", path))?;
            for part in &contents.unsupported {
                warn!(file = %path, part = %part, "unsupported package part");
            }
            for (part, err) in &contents.failed {
                error!(file = %path, part = %part, "failed to load part: {:#}", err);
            }
            if contents.documents.is_empty() {
                bail!("No loadable AAS environment in {}", path);
            }
            return Ok(contents.documents.into_iter().map(|(_, doc)| doc).collect());
        }
        if DocumentFormat::from_path(path).is_none() {
            bail!("Unsupported input file: {}", path);
        }
        let mut parser = AasParser::new(FsSource);
        let doc = parser
            .parse_document(path)
            .with_context(|| format!("Failed to parse {}", path))?;
        Ok(vec![doc])
    }

    fn report_skips(&self, path: &Utf8Path, extraction: &Extraction) {
        for id in &extraction.unresolved {
            warn!(file = %path, submodel = %id, "submodel is not referenced by any shell, skipped");
        }
        for key in &extraction.filtered {
            debug!(file = %path, submodel = %key, "submodel not selected");
        }
    }

    /// Extract and render every selected submodel of one input file.
    pub fn export_file(&self, path: &Utf8Path) -> Result<FileReport> {
        self.export_file_as(path, input_stem(path))
    }

    fn export_file_as(&self, path: &Utf8Path, stem: &str) -> Result<FileReport> {
        debug!(file = %path, "loading");
        let documents = self.load_documents(path)?;
        let extractor = TableExtractor::new(self.config.extract.clone());
        let format = self.config.format;

        let mut report = FileReport::default();
        let mut total = 0;
        for doc in &documents {
            let extraction = extractor.extract(doc);
            for shell in &extraction.shells {
                info!(file = %path, shell = %shell, "Assembling shell");
            }
            self.report_skips(path, &extraction);
            for table in &extraction.tables {
                if self.is_cancelled() {
                    info!(file = %path, "export cancelled");
                    return Ok(report);
                }
                total += 1;
                info!(file = %path, submodel = %table.key, "Start extracting submodel");
                let out = self.table_path(&self.output_dir(path), stem, &table.key);
                let written = out
                    .parent()
                    .filter(|p| !p.as_str().is_empty())
                    .map_or(Ok(()), |dir| {
                        std::fs::create_dir_all(dir.as_std_path())
                            .with_context(|| format!("Failed to create {}", dir))
                    })
                    .and_then(|_| generator::write_to_file(table, format, &out));
                match written {
                    Ok(()) => {
                        debug!(output = %out, "table written");
                        report.written.push(out);
                    }
                    Err(e) => {
                        error!(file = %path, submodel = %table.key, "failed to export: {:#}", e);
                        report.failed += 1;
                    }
                }
            }
        }
        info!(
            file = %path,
            "{} of {} submodels exported as {}",
            report.written.len(),
            total,
            format
        );
        if report.failed > 0 {
            warn!(file = %path, "{} of {} failed", report.failed, total);
        }
        Ok(report)
    }

    /// Export all files in parallel. One failing file does not stop the others.
    pub fn run(&self, files: &[Utf8PathBuf]) -> ExportSummary {
        let config = &self.config;
        let unknown = config.extract.unknown_columns();
        if !unknown.is_empty() {
            warn!("ignoring unknown columns: {}", unknown.join(", "));
        }

        let stems = self.output_stems(files);
        let outcomes: Vec<Option<Result<FileReport>>> = files
            .par_iter()
            .zip(&stems)
            .map(|(f, stem)| {
                if self.is_cancelled() {
                    return None;
                }
                Some(self.export_file_as(f, stem).inspect_err(|e| {
                    error!(file = %f, "{:#}", e);
                }))
            })
            .collect();

        let mut summary = ExportSummary::default();
        for outcome in outcomes {
            match outcome {
                None => summary.skipped += 1,
                Some(Ok(report)) => {
                    summary.succeeded += 1;
                    summary.tables_written += report.written.len();
                    summary.tables_failed += report.failed;
                }
                Some(Err(_)) => summary.failed += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::TableFormat;

    #[test]
    fn test_output_path() {
        let config = ExportConfig {
            format: TableFormat::Xlsx,
            output_dir: Some(Utf8PathBuf::from("out")),
            ..ExportConfig::default()
        };
        let exporter = Exporter::new(config);
        assert_eq!(
            exporter.output_path(Utf8Path::new("data/pump.aasx"), "Pump_TechnicalData"),
            Utf8PathBuf::from("out/pump_Pump_TechnicalData.xlsx")
        );

        let exporter = Exporter::new(ExportConfig::default());
        assert_eq!(
            exporter.output_path(Utf8Path::new("data/pump.xml"), "A/B"),
            Utf8PathBuf::from("data/pump_A_B.docx")
        );
    }

    #[test]
    fn test_output_stems_number_repeated_names() {
        let config = ExportConfig {
            output_dir: Some(Utf8PathBuf::from("out")),
            ..ExportConfig::default()
        };
        let exporter = Exporter::new(config);
        let files = vec![
            Utf8PathBuf::from("a/pump.xml"),
            Utf8PathBuf::from("b/pump.xml"),
            Utf8PathBuf::from("a/pump.json"),
            Utf8PathBuf::from("a/motor.xml"),
        ];
        assert_eq!(
            exporter.output_stems(&files),
            vec!["pump", "pump_2", "pump_3", "motor"]
        );

        // Without an output directory each input writes next to itself.
        let exporter = Exporter::new(ExportConfig::default());
        assert_eq!(
            exporter.output_stems(&files),
            vec!["pump", "pump", "pump_2", "motor"]
        );
    }

    #[test]
    fn test_cancel_flag_is_shared() {
        let exporter = Exporter::new(ExportConfig::default());
        let flag = exporter.cancel_flag();
        assert!(!exporter.is_cancelled());
        flag.store(true, Ordering::Relaxed);
        assert!(exporter.is_cancelled());
    }
}

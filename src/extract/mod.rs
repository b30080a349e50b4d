//! Submodel flattening pipeline.
//!
//! [`TableExtractor`] runs the stages for one [`AasDocument`]:
//!
//! - [`definitions`] – concept descriptions → definition entries
//! - [`partition`] – `submodels` walk → per-submodel buckets
//! - [`rows`] – bucket → rows
//! - [`xref`] – rows ↔ definition entries
//! - [`hierarchy`] – rows → table with `SMC` ancestor columns
//!
//! Nothing here logs or fails. Skipped submodels are reported in the
//! returned [`Extraction`].

pub mod definitions;
pub mod hierarchy;
pub mod partition;
pub mod rows;
pub mod xref;

pub use definitions::{DefinitionAssembler, DefinitionStage, assemble_definitions};
pub use hierarchy::{NO_PARENT, ProjectionOptions, project, smc_key};
pub use partition::{Partition, SubmodelBucket, partition};
pub use rows::{RowAssembler, RowStage, assemble_rows};
pub use xref::{DefinitionPolicy, DefinitionPool};

use crate::config::ExtractOptions;
use crate::model::{Row, SubmodelTable};
use crate::parser::{AasDocument, IdentifierMap, shell_names};
use crate::schema::{DefaultSubmodel, SUBMODEL_KIND, name_matches_selector};
use crate::tree::walk;
use indexmap::IndexMap;

/// Tables of one document plus what was skipped on the way.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Shell id-shorts in document order.
    pub shells: Vec<String>,
    pub tables: Vec<SubmodelTable>,
    /// Submodel ids that no shell references.
    pub unresolved: Vec<String>,
    /// `{shell}_{submodel}` keys left out by the submodel selection.
    pub filtered: Vec<String>,
    /// Column names that matched no attribute.
    pub unknown_columns: Vec<String>,
}

/// Whether a submodel id-short passes the selection. Besides well-known
/// submodel names a selector may be `all` (everything) or `etc` (every
/// submodel that is not a well-known one). An empty selection passes all.
pub fn submodel_selected<S: AsRef<str>>(selectors: &[S], id_short: &str) -> bool {
    if selectors.is_empty() {
        return true;
    }
    let is = |word: &str| {
        selectors
            .iter()
            .any(|s| s.as_ref().trim().eq_ignore_ascii_case(word))
    };
    if is("all") || is("all_submodels") {
        return true;
    }
    if selectors
        .iter()
        .any(|s| name_matches_selector(id_short, s.as_ref()))
    {
        return true;
    }
    is("etc") && !DefaultSubmodel::is_default(id_short)
}

/// Runs the flattening pipeline with a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct TableExtractor {
    options: ExtractOptions,
}

impl TableExtractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Rows of every selected submodel with definitions attached. A later
    /// submodel with the same key replaces the earlier one in place, and only
    /// the surviving submodel takes entries from the definition pool.
    pub fn extract_rows(&self, doc: &AasDocument) -> (Vec<SubmodelRows>, Extraction) {
        let mut report = Extraction {
            shells: doc.shells().map(shell_names).unwrap_or_default(),
            ..Extraction::default()
        };

        let definitions = doc
            .concept_descriptions()
            .map(|cds| assemble_definitions(walk(cds)))
            .unwrap_or_default();
        let mut pool = DefinitionPool::new(definitions, self.options.definitions);

        let identifiers = IdentifierMap::build(doc.shells(), doc.submodels());
        let parts = doc
            .submodels()
            .map(|sms| partition(walk(sms), &identifiers))
            .unwrap_or_default();
        report.unresolved = parts.unresolved;

        let mut by_key: IndexMap<String, SubmodelBucket<'_>> = IndexMap::new();
        for bucket in parts.buckets {
            let key = format!("{}_{}", bucket.shell_name, bucket.submodel_short_name);
            if !submodel_selected(&self.options.submodels, &bucket.submodel_short_name) {
                report.filtered.push(key);
                continue;
            }
            by_key.insert(key, bucket);
        }

        let submodels = by_key
            .into_iter()
            .map(|(key, bucket)| {
                let mut rows = assemble_rows(bucket.nodes);
                for row in &mut rows {
                    pool.attach(row);
                }
                SubmodelRows {
                    key,
                    shell_name: bucket.shell_name,
                    submodel_short_name: bucket.submodel_short_name,
                    rows,
                }
            })
            .collect();
        (submodels, report)
    }

    /// Project every selected submodel of `doc` into a table.
    pub fn extract(&self, doc: &AasDocument) -> Extraction {
        let projection = self.options.projection();
        let (submodels, mut report) = self.extract_rows(doc);
        report.unknown_columns = self.options.unknown_columns();

        for sm in submodels {
            let (header, elements) = split_header(sm.rows);
            let table = project(&elements, &projection);
            report.tables.push(SubmodelTable {
                key: sm.key,
                shell_name: sm.shell_name,
                submodel_short_name: sm.submodel_short_name,
                semantic_id: header
                    .as_ref()
                    .and_then(|h| h.semantic_id().map(|s| s.to_string())),
                description: header.map(|h| h.description).unwrap_or_default(),
                table,
            });
        }
        report
    }
}

/// Assembled rows of one selected submodel, before projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmodelRows {
    /// `{shell}_{submodel}`
    pub key: String,
    pub shell_name: String,
    pub submodel_short_name: String,
    /// The submodel's own row first, then its elements in document order.
    pub rows: Vec<Row>,
}

/// Separate the submodel's own row from its element rows.
fn split_header(rows: Vec<Row>) -> (Option<Row>, Vec<Row>) {
    let mut header = None;
    let mut elements = Vec::with_capacity(rows.len());
    for row in rows {
        let is_header = row
            .model_type
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case(SUBMODEL_KIND));
        if is_header {
            header.get_or_insert(row);
        } else {
            elements.push(row);
        }
    }
    (header, elements)
}

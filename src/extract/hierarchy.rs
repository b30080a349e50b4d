//! Ancestor path reconstruction: turns the ordered rows of one submodel into
//! a [`Table`] whose `SMC` columns carry the id-shorts of enclosing groups.

use crate::model::{Attribute, Column, HierarchyMode, Row, Table, TableRow};
use crate::schema::{is_grouping_kind, simple_model_type};
use std::collections::{BTreeMap, BTreeSet};

/// Placeholder written for top-level leaves that have no enclosing group.
pub const NO_PARENT: &str = "-";

/// Options for [`project`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionOptions {
    pub mode: HierarchyMode,
    /// Attribute columns after the `SMC` columns, in this order.
    pub attributes: Vec<Attribute>,
    /// Render model types by their abbreviated names.
    pub simple_model_type: bool,
    /// Emit the `SMC` columns at all.
    pub hierarchy: bool,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            mode: HierarchyMode::Full,
            attributes: Attribute::ALL.to_vec(),
            simple_model_type: false,
            hierarchy: true,
        }
    }
}

/// Column key of the `n`-th ancestor column, 1-based: `SMC01`, `SMC02`, ...
pub fn smc_key(n: usize) -> String {
    format!("SMC{:02}", n)
}

/// Compact 0-based rank of each row's depth. Gaps in the depth numbering do
/// not produce empty ranks.
pub fn depth_ranks(rows: &[Row]) -> Vec<usize> {
    let distinct: BTreeSet<usize> = rows.iter().map(|r| r.depth.unwrap_or(0)).collect();
    let order: Vec<usize> = distinct.into_iter().collect();
    rows.iter()
        .map(|r| {
            let d = r.depth.unwrap_or(0);
            order.iter().position(|x| *x == d).unwrap_or(0)
        })
        .collect()
}

fn is_group(row: &Row) -> bool {
    row.model_type.as_deref().is_some_and(is_grouping_kind)
}

/// Working state of one projection.
struct Projector<'r> {
    rows: &'r [Row],
    ranks: Vec<usize>,
    min_rank: usize,
    /// Ancestor labels per row, keyed by 1-based SMC index.
    labels: Vec<BTreeMap<usize, String>>,
    keep: Vec<bool>,
}

impl<'r> Projector<'r> {
    fn new(rows: &'r [Row]) -> Self {
        let ranks = depth_ranks(rows);
        let min_rank = ranks.iter().copied().min().unwrap_or(0);
        Self {
            rows,
            ranks,
            min_rank,
            labels: vec![BTreeMap::new(); rows.len()],
            keep: vec![true; rows.len()],
        }
    }

    fn id_short(&self, i: usize) -> String {
        self.rows[i].id_short.clone().unwrap_or_default()
    }

    /// Nearest preceding group row with a smaller rank.
    fn parent(&self, i: usize) -> Option<usize> {
        let d = self.ranks[i];
        (0..i)
            .rev()
            .find(|&j| self.ranks[j] < d && is_group(&self.rows[j]))
    }

    /// Whether the row right after `i` is deeper.
    fn has_children(&self, i: usize) -> bool {
        self.ranks
            .get(i + 1)
            .is_some_and(|next| *next > self.ranks[i])
    }

    /// Nearest preceding group row per smaller rank, scanning back until a
    /// row at the minimal rank is reached.
    fn ancestors(&self, i: usize) -> BTreeMap<usize, String> {
        let d = self.ranks[i];
        let mut chain = BTreeMap::new();
        for j in (0..i).rev() {
            if self.ranks[j] < d && is_group(&self.rows[j]) {
                chain.entry(self.ranks[j]).or_insert_with(|| self.id_short(j));
            }
            if self.ranks[j] == self.min_rank {
                break;
            }
        }
        chain
    }

    fn full(&mut self) {
        for i in 0..self.rows.len() {
            let d = self.ranks[i];
            if is_group(&self.rows[i]) {
                if let Some(id) = self.rows[i].id_short.clone() {
                    self.labels[i].insert(d + 1, id);
                }
            } else if d == self.min_rank {
                self.labels[i].insert(d + 1, NO_PARENT.to_string());
            } else if let Some(p) = self.parent(i) {
                let label = self.id_short(p);
                self.labels[i].insert(d, label);
            }
        }
    }

    fn collapsed(&mut self) {
        let mut prev_chain: Option<BTreeMap<usize, String>> = None;
        for i in 0..self.rows.len() {
            let d = self.ranks[i];
            if self.has_children(i) {
                // Group headers become labels on their leaves.
                if is_group(&self.rows[i]) {
                    self.keep[i] = false;
                }
                continue;
            }

            let chain = self.ancestors(i);
            if chain.is_empty() {
                self.labels[i].insert(d + 1, NO_PARENT.to_string());
                continue;
            }

            let prev = prev_chain.get_or_insert_with(|| chain.clone());
            let after_group = i > 0 && is_group(&self.rows[i - 1]);
            if i == 0 || after_group || *prev != chain {
                for (rank, label) in &chain {
                    self.labels[i].insert(rank + 1, label.clone());
                }
            }
            prev_chain = Some(chain);
        }
        for (i, row) in self.rows.iter().enumerate() {
            if row.id_short.is_none() {
                self.keep[i] = false;
            }
        }
    }

    /// Number of `SMC` columns: at least the deepest rank, more if a label
    /// was written further right.
    fn smc_count(&self) -> usize {
        let max_rank = self.ranks.iter().copied().max().unwrap_or(0);
        let max_written = self
            .labels
            .iter()
            .filter_map(|l| l.keys().next_back().copied())
            .max()
            .unwrap_or(0);
        max_rank.max(max_written)
    }
}

/// Cell text of one attribute.
pub fn attribute_value(row: &Row, attribute: Attribute, simple: bool) -> Option<String> {
    let joined = |lines: &[String]| (!lines.is_empty()).then(|| lines.join("\n"));
    let value = match attribute {
        Attribute::ModelType => row.model_type.as_deref().map(|m| {
            if simple {
                simple_model_type(m).to_string()
            } else {
                m.to_string()
            }
        }),
        Attribute::IdShort => row.id_short.clone(),
        Attribute::SemanticId => row.semantic_id().map(|s| s.to_string()),
        Attribute::Description => joined(&row.description),
        Attribute::Value => row.value.clone(),
        Attribute::ValueType => row.value_type.clone(),
        Attribute::ReferenceType => row.reference_type().map(|s| s.to_string()),
        Attribute::Definition => joined(&row.definition),
    };
    value.filter(|s| !s.is_empty())
}

/// Project the rows of one submodel into a table.
pub fn project(rows: &[Row], options: &ProjectionOptions) -> Table {
    let mut projector = Projector::new(rows);
    match options.mode {
        HierarchyMode::Full => projector.full(),
        HierarchyMode::Collapsed => projector.collapsed(),
    }

    let smc_count = if options.hierarchy && !rows.is_empty() {
        projector.smc_count()
    } else {
        0
    };
    let attributes = if options.attributes.is_empty() {
        Attribute::ALL.to_vec()
    } else {
        options.attributes.clone()
    };

    let mut columns: Vec<Column> = (1..=smc_count)
        .map(|n| {
            let key = smc_key(n);
            Column::new(key.clone(), key)
        })
        .collect();
    columns.extend(attributes.iter().map(|a| Column::new(a.key(), a.header())));

    let table_rows = rows
        .iter()
        .enumerate()
        .filter(|(i, _)| projector.keep[*i])
        .map(|(i, row)| {
            let mut cells = TableRow::new();
            for n in 1..=smc_count {
                cells.insert(smc_key(n), projector.labels[i].get(&n).cloned());
            }
            for a in &attributes {
                cells.insert(
                    a.key().to_string(),
                    attribute_value(row, *a, options.simple_model_type),
                );
            }
            cells
        })
        .collect();

    Table {
        columns,
        rows: table_rows,
    }
}

//! Row assembly state machine over one submodel bucket.
//!
//! ```text
//! idle --idShort--> [flush] --> set_id_short --> idle
//! idle --semanticId--> set_semantic_id --value--> idle
//! idle --attribute--> set_model_value --> idle
//! idle --langStringTextType--> set_description | set_multilang_value --text--> idle
//! ```

use crate::model::Row;
use crate::schema::{Tag, kind_name};
use crate::tree::{Node, Visit};
use std::mem;

/// Current state of a [`RowAssembler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowStage {
    #[default]
    Idle,
    SetIdShort,
    SetSemanticId,
    SetModelValue,
    SetDescription,
    SetMultilangValue,
    Flush,
}

/// Turns the nodes of one submodel into [`Row`]s. Feed every node in walk
/// order, then call [`RowAssembler::finish`] for the last row.
#[derive(Debug, Default)]
pub struct RowAssembler {
    stage: RowStage,
    current: Row,
    committed: Option<Row>,
}

/// How a stage handled a node.
enum Step {
    /// Run the next stage on the same node.
    Continue,
    /// The node is consumed.
    Done,
}

impl RowAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> RowStage {
        self.stage
    }

    /// The row being accumulated.
    pub fn current(&self) -> &Row {
        &self.current
    }

    /// Process one node. Returns the previous row when this node started a
    /// new one.
    pub fn feed(&mut self, visit: Visit<'_>, index: usize) -> Option<Row> {
        let node = visit.node;
        if Tag::IdShort.matches(node) && self.stage != RowStage::Idle {
            self.stage = RowStage::Idle;
        }
        loop {
            let step = match self.stage {
                RowStage::Idle => self.on_idle(node),
                RowStage::SetIdShort => {
                    self.set_id_short(visit, index);
                    Step::Done
                }
                RowStage::SetSemanticId => {
                    self.set_semantic_id(node);
                    Step::Done
                }
                RowStage::SetModelValue => {
                    self.set_model_value(node);
                    Step::Done
                }
                RowStage::SetDescription => {
                    if Tag::Text.matches(node) {
                        if let Some(t) = node.text() {
                            self.current.description.push(t.to_string());
                        }
                        self.stage = RowStage::Idle;
                    }
                    Step::Done
                }
                RowStage::SetMultilangValue => {
                    if Tag::Text.matches(node) {
                        if let Some(t) = node.text() {
                            self.current.value = Some(t.to_string());
                        }
                        self.stage = RowStage::Idle;
                    }
                    Step::Done
                }
                RowStage::Flush => {
                    self.committed = Some(mem::take(&mut self.current));
                    self.stage = RowStage::Idle;
                    Step::Continue
                }
            };
            if let Step::Done = step {
                return self.committed.take();
            }
        }
    }

    /// The final row of the bucket, if one is in progress.
    pub fn finish(&mut self) -> Option<Row> {
        self.stage = RowStage::Idle;
        let row = mem::take(&mut self.current);
        (!row.is_empty()).then_some(row)
    }

    fn on_idle(&mut self, node: Node<'_>) -> Step {
        if Tag::IdShort.matches(node) {
            self.stage = if self.current.is_empty() {
                RowStage::SetIdShort
            } else {
                RowStage::Flush
            };
            return Step::Continue;
        }
        if self.current.is_empty() {
            return Step::Done;
        }

        if Tag::LangStringTextType.matches(node) {
            if is_multilang_value(node) {
                self.stage = RowStage::SetMultilangValue;
            } else if node.has_children() {
                self.stage = RowStage::SetDescription;
            }
            return Step::Done;
        }

        let own_attribute = match (node.parent(), self.current.model_type.as_deref()) {
            (Some(parent), Some(kind)) => parent.name().eq_ignore_ascii_case(kind),
            _ => false,
        };
        if own_attribute {
            if Tag::SemanticId.matches(node) {
                self.stage = RowStage::SetSemanticId;
                return Step::Done;
            }
            self.stage = RowStage::SetModelValue;
            return Step::Continue;
        }
        Step::Done
    }

    fn set_id_short(&mut self, visit: Visit<'_>, index: usize) {
        self.current.index = Some(index);
        self.current.depth = Some(visit.depth);
        self.current.id_short = visit.node.text().map(|t| t.to_string());
        self.current.model_type = visit.node.parent().map(|p| kind_name(p.name()));
        self.stage = RowStage::Idle;
    }

    fn set_semantic_id(&mut self, node: Node<'_>) {
        if Tag::Type.matches(node) && Tag::Key.is_parent_of(node) {
            if let Some(t) = node.text() {
                self.current.set_reference_type(t);
            }
        }
        if Tag::Value.matches(node) {
            if let Some(t) = node.text() {
                self.current.set_semantic_id(t);
            }
            self.stage = RowStage::Idle;
        }
    }

    fn set_model_value(&mut self, node: Node<'_>) {
        if Tag::ValueType.matches(node) {
            if let Some(t) = node.text() {
                self.current.value_type = Some(t.to_string());
            }
        }
        if Tag::Value.matches(node) {
            if let Some(t) = node.text() {
                self.current.value = Some(t.to_string());
            }
        }
        self.stage = RowStage::Idle;
    }
}

/// A localized text entry of a multi-language property's own value.
fn is_multilang_value(node: Node<'_>) -> bool {
    node.parent().is_some_and(|p| {
        Tag::Value.matches(p) && Tag::MultiLanguageProperty.is_parent_of(p)
    })
}

/// Assemble every row of one bucket.
pub fn assemble_rows<'t, I>(visits: I) -> Vec<Row>
where
    I: IntoIterator<Item = Visit<'t>>,
{
    let mut assembler = RowAssembler::new();
    let mut rows: Vec<Row> = visits
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| assembler.feed(v, i))
        .collect();
    rows.extend(assembler.finish());
    rows
}

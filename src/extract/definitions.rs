//! Definition assembly state machine over the `conceptDescriptions` section.

use crate::model::DefinitionEntry;
use crate::schema::Tag;
use crate::tree::{Node, Visit};
use std::mem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefinitionStage {
    #[default]
    Idle,
    SetDefinition,
    Flush,
}

/// Turns concept description nodes into [`DefinitionEntry`]s.
///
/// Once an entry has an id-short or id, every node that is not one of the
/// recognised tags is offered to the definition capture. That is where the
/// definition text is actually picked up: an explicit `definition` tag only
/// arms the capture for the node right after it, which is the
/// `langStringDefinitionTypeIec61360` wrapper rather than its `text`.
#[derive(Debug, Default)]
pub struct DefinitionAssembler {
    stage: DefinitionStage,
    current: DefinitionEntry,
    committed: Option<DefinitionEntry>,
}

impl DefinitionAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> DefinitionStage {
        self.stage
    }

    pub fn current(&self) -> &DefinitionEntry {
        &self.current
    }

    /// Process one node. Returns the previous entry when this node starts a
    /// new concept description.
    pub fn feed(&mut self, node: Node<'_>) -> Option<DefinitionEntry> {
        loop {
            let consumed = match self.stage {
                DefinitionStage::Idle => self.on_idle(node),
                DefinitionStage::SetDefinition => {
                    if Tag::Text.matches(node) && Tag::LangStringDefinitionTypeIec61360.is_parent_of(node) {
                        if let Some(t) = node.text() {
                            self.current.definition.push(t.to_string());
                        }
                    }
                    self.stage = DefinitionStage::Idle;
                    true
                }
                DefinitionStage::Flush => {
                    self.committed = Some(mem::take(&mut self.current));
                    self.stage = DefinitionStage::Idle;
                    false
                }
            };
            if consumed {
                return self.committed.take();
            }
        }
    }

    /// The final entry, if one is in progress.
    pub fn finish(&mut self) -> Option<DefinitionEntry> {
        self.stage = DefinitionStage::Idle;
        let entry = mem::take(&mut self.current);
        (!entry.is_empty()).then_some(entry)
    }

    /// Returns `true` when the node is consumed.
    fn on_idle(&mut self, node: Node<'_>) -> bool {
        if Tag::ConceptDescription.matches(node) {
            if !self.current.is_empty() {
                self.stage = DefinitionStage::Flush;
                return false;
            }
            return true;
        }
        if Tag::IdShort.matches(node) {
            self.current.id_short = node.text().map(|t| t.to_string());
            return true;
        }
        if Tag::Id.matches(node) {
            self.current.id = node.text().map(|t| t.to_string());
            return true;
        }
        if Tag::Definition.matches(node) {
            self.stage = DefinitionStage::SetDefinition;
            return true;
        }
        if !self.current.is_empty() {
            self.stage = DefinitionStage::SetDefinition;
            return false;
        }
        true
    }
}

/// Assemble every definition entry of a `conceptDescriptions` walk.
pub fn assemble_definitions<'t, I>(visits: I) -> Vec<DefinitionEntry>
where
    I: IntoIterator<Item = Visit<'t>>,
{
    let mut assembler = DefinitionAssembler::new();
    let mut entries: Vec<DefinitionEntry> = visits
        .into_iter()
        .filter_map(|v| assembler.feed(v.node))
        .collect();
    entries.extend(assembler.finish());
    entries
}

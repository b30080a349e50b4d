//! Submodel ownership – which shell references which submodel.
//!
//! Shells point at their submodels through model references
//! (`<reference><type>ModelReference</type><keys><key><type>Submodel</type>
//! <value>ID</value></key></keys></reference>`). Walking the shell section
//! once yields `reference value → shell id-short`; the submodel section then
//! supplies each submodel's id-short and global id.

use crate::model::SubmodelIdentifier;
use crate::schema::Tag;
use crate::tree::{Node, Visit, walk};
use indexmap::IndexMap;

/// Map from reference value (usually a submodel global id) to the id-short
/// of the first shell that references it.
pub fn shell_references(shells: Node<'_>) -> IndexMap<String, String> {
    let mut refs = IndexMap::new();
    let mut current: Option<&str> = None;
    for Visit { node, .. } in walk(shells) {
        if Tag::AssetAdministrationShell.matches(node) {
            current = None;
            continue;
        }
        if Tag::IdShort.matches(node) && Tag::AssetAdministrationShell.is_parent_of(node) {
            current = node.text();
            continue;
        }
        let after_type = node.prev_sibling().is_some_and(|p| Tag::Type.matches(p));
        if Tag::Value.matches(node) && after_type {
            if let (Some(shell), Some(value)) = (current, node.text()) {
                refs.entry(value.to_string())
                    .or_insert_with(|| shell.to_string());
            }
        }
    }
    refs
}

/// Id-shorts of all shells, in document order.
pub fn shell_names(shells: Node<'_>) -> Vec<String> {
    walk(shells)
        .filter(|v| {
            Tag::IdShort.matches(v.node) && Tag::AssetAdministrationShell.is_parent_of(v.node)
        })
        .filter_map(|v| v.node.text().map(|t| t.to_string()))
        .collect()
}

/// Submodel identifiers keyed by global id. Built once per document.
#[derive(Debug, Clone, Default)]
pub struct IdentifierMap {
    by_id: IndexMap<String, SubmodelIdentifier>,
}

impl IdentifierMap {
    /// Resolve every submodel below `submodels` to its owning shell using
    /// the references found below `shells`.
    pub fn build(shells: Option<Node<'_>>, submodels: Option<Node<'_>>) -> Self {
        let refs = shells.map(shell_references).unwrap_or_default();
        let mut by_id = IndexMap::new();
        let Some(submodels) = submodels else {
            return Self { by_id };
        };
        for Visit { node, .. } in walk(submodels) {
            if !Tag::Submodel.matches(node) || !Tag::Submodels.is_parent_of(node) {
                continue;
            }
            let Some(id) = node.child(Tag::Id.as_str()).and_then(|n| n.text()) else {
                continue;
            };
            let short = node
                .child(Tag::IdShort.as_str())
                .and_then(|n| n.text())
                .unwrap_or_default();
            by_id.insert(
                id.to_string(),
                SubmodelIdentifier {
                    id: id.to_string(),
                    shell_name: refs.get(id).cloned(),
                    submodel_short_name: short.to_string(),
                },
            );
        }
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&SubmodelIdentifier> {
        self.by_id.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubmodelIdentifier> {
        self.by_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

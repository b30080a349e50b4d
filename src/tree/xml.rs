//! Build a [`NodeTree`] from XML text.

use super::{NodeId, NodeTree};
use anyhow::{Context, Result};
use roxmltree::{Document, Node as XmlNode};

/// Parse XML text into a [`NodeTree`]. Only element nodes are kept; comments
/// and processing instructions are dropped.
pub fn parse_tree(text: &str, path_hint: Option<&str>) -> Result<NodeTree> {
    let text = text.trim_start_matches('\u{feff}');
    let doc = Document::parse(text)
        .with_context(|| format!("Failed to parse XML {}", path_hint.unwrap_or("<xml>")))?;
    let mut tree = NodeTree::new();
    append_element(&mut tree, None, doc.root_element());
    Ok(tree)
}

fn append_element(tree: &mut NodeTree, parent: Option<NodeId>, el: XmlNode) {
    let tag = el.tag_name();
    let id = tree.push(
        parent,
        tag.name(),
        tag.namespace().map(|ns| ns.to_string()),
        el.text().map(|t| t.to_string()),
    );
    for child in el.children().filter(|c| c.is_element()) {
        append_element(tree, Some(id), child);
    }
}

//! Build a [`NodeTree`] from an AAS JSON environment.
//!
//! The JSON serialization of an AAS environment carries the same information
//! as the XML one but shapes it differently: element kinds live in a
//! `modelType` field instead of the element tag, and lists are bare arrays.
//! This module rebuilds the XML shape so the extraction pipeline sees one
//! kind of tree regardless of the input format.

use super::{NodeId, NodeTree};
use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

/// Fields the assemblers depend on, in AAS XML schema order. Fields not
/// listed keep their document order after these.
const FIELD_ORDER: &[&str] = &[
    "extensions",
    "category",
    "idShort",
    "displayName",
    "description",
    "administration",
    "id",
    "kind",
    "semanticId",
    "supplementalSemanticIds",
    "qualifiers",
    "embeddedDataSpecifications",
    "derivedFrom",
    "assetInformation",
    "submodels",
    "isCaseOf",
    "dataSpecification",
    "dataSpecificationContent",
    "type",
    "referredSemanticId",
    "keys",
    "language",
    "text",
];

/// Parse AAS JSON text into a [`NodeTree`] rooted at an `environment` node.
pub fn parse_tree(text: &str, path_hint: Option<&str>) -> Result<NodeTree> {
    let text = text.trim_start_matches('\u{feff}');
    let value: Value = serde_json::from_str(text)
        .with_context(|| format!("Failed to parse JSON {}", path_hint.unwrap_or("<json>")))?;
    let Value::Object(fields) = &value else {
        bail!(
            "Expected a JSON object at the top of {}",
            path_hint.unwrap_or("<json>")
        );
    };
    let mut tree = NodeTree::new();
    let root = tree.push(None, "environment", None, None);
    append_fields(&mut tree, root, fields);
    Ok(tree)
}

fn field_rank(name: &str) -> usize {
    FIELD_ORDER
        .iter()
        .position(|f| *f == name)
        .unwrap_or(FIELD_ORDER.len())
}

fn append_fields(tree: &mut NodeTree, parent: NodeId, fields: &Map<String, Value>) {
    let mut ordered: Vec<(&String, &Value)> = fields
        .iter()
        .filter(|(k, _)| k.as_str() != "modelType")
        .collect();
    ordered.sort_by_key(|(k, _)| field_rank(k));
    for (name, value) in ordered {
        append_value(tree, parent, name, value);
    }
}

fn append_value(tree: &mut NodeTree, parent: NodeId, name: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => {
            tree.push(Some(parent), name, None, Some(s.clone()));
        }
        Value::Bool(_) | Value::Number(_) => {
            tree.push(Some(parent), name, None, Some(value.to_string()));
        }
        Value::Object(fields) => {
            let mut id = tree.push(Some(parent), name, None, None);
            // A typed object under a plain field is wrapped in an element
            // named after its type, e.g. `value` > `property`.
            if let Some(model_type) = fields.get("modelType").and_then(Value::as_str) {
                id = tree.push(Some(id), &lower_camel(model_type), None, None);
            }
            append_fields(tree, id, fields);
        }
        Value::Array(items) => {
            let id = tree.push(Some(parent), name, None, None);
            for item in items {
                append_item(tree, id, &item_tag(name, item), item);
            }
        }
    }
}

/// Array items already carry their type in `tag`.
fn append_item(tree: &mut NodeTree, parent: NodeId, tag: &str, item: &Value) {
    match item {
        Value::Object(fields) => {
            let id = tree.push(Some(parent), tag, None, None);
            append_fields(tree, id, fields);
        }
        other => append_value(tree, parent, tag, other),
    }
}

/// Tag of an array item: its `modelType` when present, otherwise the XML
/// element name used for items of that list.
fn item_tag(container: &str, item: &Value) -> String {
    if let Some(model_type) = item.get("modelType").and_then(Value::as_str) {
        return lower_camel(model_type);
    }
    let tag = match container {
        "keys" => "key",
        "displayName" => "langStringNameType",
        "description" | "value" => "langStringTextType",
        "definition" => "langStringDefinitionTypeIec61360",
        "preferredName" => "langStringPreferredNameTypeIec61360",
        "shortName" => "langStringShortNameTypeIec61360",
        "qualifiers" => "qualifier",
        "extensions" => "extension",
        "embeddedDataSpecifications" => "embeddedDataSpecification",
        "specificAssetIds" => "specificAssetId",
        "valueReferencePairs" => "valueReferencePair",
        "inputVariables" | "outputVariables" | "inoutputVariables" => "operationVariable",
        "submodels" | "supplementalSemanticIds" | "isCaseOf" | "refersTo" => "reference",
        other => other,
    };
    tag.to_string()
}

fn lower_camel(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

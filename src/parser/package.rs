//! AASX package structure (Open Packaging Conventions relationships).
//!
//! An AASX file is a ZIP archive whose environment parts are found by
//! following relationship files:
//!
//! ```text
//! _rels/.rels                 --aasx-origin-->    /aasx/aasx-origin
//! aasx/_rels/aasx-origin.rels --aas-spec-->       /aasx/.../env.xml
//! aasx/.../_rels/env.xml.rels --aas-spec-split--> further environment parts
//! ```

use super::source::ContentSource;
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;

pub const AASX_ORIGIN: &str = "http://admin-shell.io/aasx/relationships/aasx-origin";
pub const AAS_SPEC: &str = "http://admin-shell.io/aasx/relationships/aas-spec";
pub const AAS_SPEC_SPLIT: &str = "http://admin-shell.io/aasx/relationships/aas-spec-split";

/// One `<Relationship>` entry of a `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: Option<String>,
    pub rel_type: String,
    pub target: String,
}

/// Environment parts of a package, split by whether they can be loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecParts {
    /// `.xml` and `.json` parts, in relationship order without duplicates.
    pub supported: Vec<Utf8PathBuf>,
    /// Parts with any other extension.
    pub unsupported: Vec<Utf8PathBuf>,
}

/// Location of the relationship part for `part` (`None` = the package itself).
pub fn rels_path(part: Option<&Utf8Path>) -> Utf8PathBuf {
    match part {
        None => Utf8PathBuf::from("_rels/.rels"),
        Some(p) => {
            let p = strip_root(p);
            let dir = p.parent().unwrap_or(Utf8Path::new(""));
            let name = p.file_name().unwrap_or_default();
            dir.join("_rels").join(format!("{}.rels", name))
        }
    }
}

/// Resolve a relationship target against the part that owns the relationship.
/// Absolute targets are package-rooted, relative ones are taken from the
/// owning part's directory.
pub fn resolve_target(source_part: Option<&Utf8Path>, target: &str) -> Utf8PathBuf {
    let joined = if let Some(abs) = target.strip_prefix('/') {
        Utf8PathBuf::from(abs)
    } else {
        let base = source_part
            .map(strip_root)
            .and_then(|p| p.parent())
            .unwrap_or(Utf8Path::new(""));
        base.join(target)
    };
    normalize(&joined)
}

fn strip_root(p: &Utf8Path) -> &Utf8Path {
    Utf8Path::new(p.as_str().trim_start_matches('/'))
}

fn normalize(p: &Utf8Path) -> Utf8PathBuf {
    let mut parts: Vec<&str> = Vec::new();
    for comp in p.as_str().split('/') {
        match comp {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    Utf8PathBuf::from(parts.join("/"))
}

/// Parse the text of a `.rels` part.
pub fn parse_relationships(text: &str, path_hint: Option<&str>) -> Result<Vec<Relationship>> {
    let text = text.trim_start_matches('\u{feff}');
    let doc = roxmltree::Document::parse(text)
        .with_context(|| format!("Failed to parse XML {}", path_hint.unwrap_or("<rels>")))?;
    let rels = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "Relationship")
        .filter_map(|n| {
            Some(Relationship {
                id: n.attribute("Id").map(|s| s.to_string()),
                rel_type: n.attribute("Type")?.trim().to_string(),
                target: n.attribute("Target")?.trim().to_string(),
            })
        })
        .collect();
    Ok(rels)
}

/// Parts related to `part` (or to the package) by `rel_type`. A part without
/// a relationship file has no related parts.
pub fn related_parts<S: ContentSource>(
    source: &mut S,
    part: Option<&Utf8Path>,
    rel_type: &str,
) -> Result<Vec<Utf8PathBuf>> {
    let rels = rels_path(part);
    if !source.contains(&rels) {
        return Ok(Vec::new());
    }
    let text = source.read_to_string(&rels)?;
    let related = parse_relationships(&text, Some(rels.as_str()))?
        .into_iter()
        .filter(|r| r.rel_type == rel_type)
        .map(|r| resolve_target(part, &r.target))
        .collect();
    Ok(related)
}

/// Collect every environment part of the package: the `aas-spec` parts of
/// the first origin part plus their `aas-spec-split` parts.
pub fn spec_parts<S: ContentSource>(source: &mut S) -> Result<SpecParts> {
    let origins = related_parts(source, None, AASX_ORIGIN)?;
    let Some(origin) = origins.first() else {
        bail!("No aasx origin found in package");
    };
    let specs = related_parts(source, Some(origin), AAS_SPEC)?;
    if specs.is_empty() {
        bail!("No aas spec found in {}", origin);
    }

    let mut seen: IndexSet<Utf8PathBuf> = IndexSet::new();
    for spec in specs {
        let splits = related_parts(source, Some(&spec), AAS_SPEC_SPLIT)?;
        seen.insert(spec);
        seen.extend(splits);
    }

    let mut parts = SpecParts::default();
    for part in seen {
        match part.extension().map(|e| e.to_ascii_lowercase()).as_deref() {
            Some("xml") | Some("json") => parts.supported.push(part),
            _ => parts.unsupported.push(part),
        }
    }
    Ok(parts)
}

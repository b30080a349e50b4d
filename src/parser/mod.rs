//! AAS document loading.
//!
//! Provides [`AasParser`] to load AAS environments (XML or JSON, standalone
//! or inside an `.aasx` package) into [`AasDocument`]s. Sub-modules:
//!
//! - [`source`] – File I/O abstraction (filesystem vs. ZIP)
//! - [`package`] – AASX relationship traversal
//! - [`identifiers`] – Submodel → owning shell resolution

pub mod identifiers;
pub mod package;
pub mod source;

pub use identifiers::{IdentifierMap, shell_names};
pub use package::SpecParts;
pub use source::*;

use crate::schema::Tag;
use crate::tree::{self, Node, NodeTree};
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::File;
use std::io::BufReader;

/// Serialization of an environment part, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Xml,
    Json,
}

impl DocumentFormat {
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        match path.extension()?.to_ascii_lowercase().as_str() {
            "xml" => Some(DocumentFormat::Xml),
            "json" => Some(DocumentFormat::Json),
            _ => None,
        }
    }
}

/// A parsed AAS environment.
#[derive(Debug, Clone)]
pub struct AasDocument {
    tree: NodeTree,
}

impl AasDocument {
    pub fn from_xml(text: &str, path_hint: Option<&str>) -> Result<Self> {
        Ok(Self {
            tree: tree::xml::parse_tree(text, path_hint)?,
        })
    }

    pub fn from_json(text: &str, path_hint: Option<&str>) -> Result<Self> {
        Ok(Self {
            tree: tree::json::parse_tree(text, path_hint)?,
        })
    }

    pub fn from_text(text: &str, format: DocumentFormat, path_hint: Option<&str>) -> Result<Self> {
        match format {
            DocumentFormat::Xml => Self::from_xml(text, path_hint),
            DocumentFormat::Json => Self::from_json(text, path_hint),
        }
    }

    /// The `assetAdministrationShells` section.
    pub fn shells(&self) -> Option<Node<'_>> {
        self.section(Tag::AssetAdministrationShells)
    }

    /// The `submodels` section.
    pub fn submodels(&self) -> Option<Node<'_>> {
        self.section(Tag::Submodels)
    }

    /// The `conceptDescriptions` section.
    pub fn concept_descriptions(&self) -> Option<Node<'_>> {
        self.section(Tag::ConceptDescriptions)
    }

    /// Sections are direct children of the environment root; documents that
    /// wrap the environment in another element are searched depth-first.
    fn section(&self, tag: Tag) -> Option<Node<'_>> {
        let root = self.tree.root()?;
        if tag.matches(root) {
            return Some(root);
        }
        root.children()
            .find(|n| tag.matches(*n))
            .or_else(|| tree::walk(root).map(|v| v.node).find(|n| tag.matches(*n)))
    }
}

/// Environment parts loaded from one package.
#[derive(Debug, Default)]
pub struct PackageContents {
    pub documents: Vec<(Utf8PathBuf, AasDocument)>,
    /// Parts that could not be read or parsed.
    pub failed: Vec<(Utf8PathBuf, anyhow::Error)>,
    /// Parts with an extension other than `xml`/`json`.
    pub unsupported: Vec<Utf8PathBuf>,
}

/// AAS document loader. Generic over [`ContentSource`] so it can read from
/// the filesystem ([`FsSource`]) or from an AASX archive ([`ZipSource`]).
pub struct AasParser<S: ContentSource> {
    source: S,
}

impl AasParser<ZipSource<BufReader<File>>> {
    /// Open an `.aasx` package from disk.
    pub fn open_package(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path.as_std_path()).with_context(|| format!("Open {}", path))?;
        Ok(Self::new(ZipSource::new(BufReader::new(file))?))
    }
}

impl<S: ContentSource> AasParser<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Parse a single environment part, choosing the builder by extension.
    pub fn parse_document(&mut self, path: impl AsRef<Utf8Path>) -> Result<AasDocument> {
        let path = path.as_ref();
        let Some(format) = DocumentFormat::from_path(path) else {
            bail!("Unsupported document type: {}", path);
        };
        let text = self.source.read_to_string(path)?;
        AasDocument::from_text(&text, format, Some(path.as_str()))
    }

    /// Locate the package's environment parts.
    pub fn spec_parts(&mut self) -> Result<SpecParts> {
        package::spec_parts(&mut self.source)
    }

    /// Load every environment part of the package. Only a missing package
    /// structure is an error; individual parts that fail are collected.
    pub fn parse_package(&mut self) -> Result<PackageContents> {
        let parts = self.spec_parts()?;
        let mut contents = PackageContents {
            unsupported: parts.unsupported,
            ..PackageContents::default()
        };
        for part in parts.supported {
            match self.parse_document(&part) {
                Ok(doc) => contents.documents.push((part, doc)),
                Err(e) => contents.failed.push((part, e)),
            }
        }
        Ok(contents)
    }
}

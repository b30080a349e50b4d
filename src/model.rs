use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Row
// ────────────────────────────────────────────────────────────────────────────

/// One exported table record, assembled from the nodes of a single
/// submodel element.
///
/// A row is *empty* until its id-short is recorded; `semantic_id` and
/// `reference_type` keep the first value written, `value` and `value_type`
/// the last one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Position of the element's id-short node within its submodel bucket.
    pub index: Option<usize>,
    /// Depth of the element's id-short node.
    pub depth: Option<usize>,
    /// Element kind, e.g. `Property` or `SubmodelElementCollection`.
    pub model_type: Option<String>,
    pub id_short: Option<String>,
    semantic_id: Option<String>,
    reference_type: Option<String>,
    #[serde(default)]
    pub description: Vec<String>,
    pub value: Option<String>,
    pub value_type: Option<String>,
    /// Filled from a matching concept description after assembly.
    #[serde(default)]
    pub definition: Vec<String>,
}

impl Row {
    /// A non-empty row; used by callers that build rows without a tree.
    pub fn new(
        index: usize,
        depth: usize,
        model_type: impl Into<String>,
        id_short: impl Into<String>,
    ) -> Self {
        Self {
            index: Some(index),
            depth: Some(depth),
            model_type: Some(model_type.into()),
            id_short: Some(id_short.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id_short.is_none() && self.model_type.is_none() && self.depth.is_none()
    }

    pub fn semantic_id(&self) -> Option<&str> {
        self.semantic_id.as_deref()
    }

    /// Record the semantic id unless one is already set.
    pub fn set_semantic_id(&mut self, value: impl Into<String>) {
        if self.semantic_id.is_none() {
            self.semantic_id = Some(value.into());
        }
    }

    pub fn reference_type(&self) -> Option<&str> {
        self.reference_type.as_deref()
    }

    /// Record the reference type unless one is already set.
    pub fn set_reference_type(&mut self, value: impl Into<String>) {
        if self.reference_type.is_none() {
            self.reference_type = Some(value.into());
        }
    }

    pub fn with_semantic_id(mut self, value: impl Into<String>) -> Self {
        self.set_semantic_id(value);
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Concept descriptions & identifiers
// ────────────────────────────────────────────────────────────────────────────

/// Definition text of one concept description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionEntry {
    pub id_short: Option<String>,
    /// Global identifier of the concept description.
    pub id: Option<String>,
    #[serde(default)]
    pub definition: Vec<String>,
}

impl DefinitionEntry {
    pub fn is_empty(&self) -> bool {
        self.id_short.is_none() && self.id.is_none()
    }
}

/// Owner of a submodel, keyed by the submodel's global id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmodelIdentifier {
    pub id: String,
    /// Id-short of the shell referencing the submodel, `None` when no shell does.
    pub shell_name: Option<String>,
    pub submodel_short_name: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Table output
// ────────────────────────────────────────────────────────────────────────────

/// Row attributes that can be selected as table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    ModelType,
    IdShort,
    SemanticId,
    Description,
    Value,
    ValueType,
    ReferenceType,
    Definition,
}

impl Attribute {
    /// Every attribute, in default column order.
    pub const ALL: [Attribute; 8] = [
        Attribute::ModelType,
        Attribute::IdShort,
        Attribute::SemanticId,
        Attribute::Description,
        Attribute::Value,
        Attribute::ValueType,
        Attribute::ReferenceType,
        Attribute::Definition,
    ];

    /// Column key used in [`TableRow`] maps.
    pub fn key(self) -> &'static str {
        match self {
            Attribute::ModelType => "model_type",
            Attribute::IdShort => "id_short",
            Attribute::SemanticId => "semantic_id",
            Attribute::Description => "description",
            Attribute::Value => "value",
            Attribute::ValueType => "value_type",
            Attribute::ReferenceType => "reference_type",
            Attribute::Definition => "definition",
        }
    }

    /// Header text shown by renderers. The model type header is blank so
    /// that it spans together with the id-short header.
    pub fn header(self) -> &'static str {
        match self {
            Attribute::ModelType => "",
            Attribute::IdShort => "idShort",
            Attribute::SemanticId => "SemanticID",
            Attribute::Description => "Description",
            Attribute::Value => "Value",
            Attribute::ValueType => "ValueType",
            Attribute::ReferenceType => "ReferenceType",
            Attribute::Definition => "Definition",
        }
    }

    /// Accepts the column key (`semantic_id`), its camel-case form
    /// (`semanticId`) or the dashed form (`semantic-id`).
    pub fn parse(name: &str) -> Option<Attribute> {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        Attribute::ALL
            .into_iter()
            .find(|a| a.key().replace('_', "") == normalized)
    }

    /// Parse a caller column selection. Returns the recognised attributes in
    /// the given order (duplicates removed) and the names that were not
    /// recognised. An empty result selects [`Attribute::ALL`].
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> (Vec<Attribute>, Vec<String>) {
        let mut selected = Vec::new();
        let mut unknown = Vec::new();
        for name in names {
            match Attribute::parse(name.as_ref()) {
                Some(a) if !selected.contains(&a) => selected.push(a),
                Some(_) => {}
                None => unknown.push(name.as_ref().to_string()),
            }
        }
        if selected.is_empty() {
            selected = Attribute::ALL.to_vec();
        }
        (selected, unknown)
    }
}

/// How ancestor groups are rendered into `SMC` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HierarchyMode {
    /// Every row carries its parent group label.
    #[default]
    Full,
    /// Group rows are folded into header labels and repeated labels are
    /// suppressed on consecutive leaves.
    Collapsed,
}

impl HierarchyMode {
    /// Lenient conversion: anything other than `collapsed` means [`HierarchyMode::Full`].
    pub fn from_flag(flag: &str) -> Self {
        if flag.trim().eq_ignore_ascii_case("collapsed") {
            HierarchyMode::Collapsed
        } else {
            HierarchyMode::Full
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HierarchyMode::Full => "full",
            HierarchyMode::Collapsed => "collapsed",
        }
    }
}

impl<'de> Deserialize<'de> for HierarchyMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(HierarchyMode::from_flag(&s))
    }
}

impl Serialize for HierarchyMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// A named output column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Key into each [`TableRow`].
    pub key: String,
    /// Display text for renderers.
    pub header: String,
}

impl Column {
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
        }
    }
}

/// Cell values of one output row keyed by [`Column::key`], in column order.
pub type TableRow = IndexMap<String, Option<String>>;

/// Column definitions plus row values, ready for a renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn column_keys(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.key.as_str()).collect()
    }

    /// Cell text, `None` for null cells and unknown columns.
    pub fn cell(&self, row: usize, key: &str) -> Option<&str> {
        self.rows.get(row)?.get(key)?.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The projected table of one submodel plus the submodel's own metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmodelTable {
    /// `{shell}_{submodel}`, used for output file names.
    pub key: String,
    pub shell_name: String,
    pub submodel_short_name: String,
    pub semantic_id: Option<String>,
    #[serde(default)]
    pub description: Vec<String>,
    pub table: Table,
}

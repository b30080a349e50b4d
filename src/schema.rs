//! AAS metamodel vocabulary used by the extraction pipeline.

use crate::tree::Node;

/// XML element names (AAS v3 serialization) the pipeline reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    IdShort,
    Id,
    Type,
    Key,
    Value,
    ValueType,
    SemanticId,
    Text,
    LangStringTextType,
    LangStringDefinitionTypeIec61360,
    Definition,
    MultiLanguageProperty,
    AssetAdministrationShell,
    AssetAdministrationShells,
    Submodel,
    Submodels,
    ConceptDescription,
    ConceptDescriptions,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::IdShort => "idShort",
            Tag::Id => "id",
            Tag::Type => "type",
            Tag::Key => "key",
            Tag::Value => "value",
            Tag::ValueType => "valueType",
            Tag::SemanticId => "semanticId",
            Tag::Text => "text",
            Tag::LangStringTextType => "langStringTextType",
            Tag::LangStringDefinitionTypeIec61360 => "langStringDefinitionTypeIec61360",
            Tag::Definition => "definition",
            Tag::MultiLanguageProperty => "multiLanguageProperty",
            Tag::AssetAdministrationShell => "assetAdministrationShell",
            Tag::AssetAdministrationShells => "assetAdministrationShells",
            Tag::Submodel => "submodel",
            Tag::Submodels => "submodels",
            Tag::ConceptDescription => "conceptDescription",
            Tag::ConceptDescriptions => "conceptDescriptions",
        }
    }

    /// True when `node`'s local name is this tag.
    pub fn matches(self, node: Node<'_>) -> bool {
        node.name() == self.as_str()
    }

    /// True when `node` has a parent whose local name is this tag.
    pub fn is_parent_of(self, node: Node<'_>) -> bool {
        node.parent().is_some_and(|p| self.matches(p))
    }
}

/// Element kinds that nest further submodel elements. Each entry is the
/// kind name and its abbreviation.
const GROUPING_KINDS: &[(&str, &str)] = &[
    ("SubmodelElementCollection", "SMC"),
    ("Entity", "Ent"),
    ("SubmodelElementList", "ElementList"),
    ("Operation", "Opr"),
    ("RelationshipElement", "Rel"),
    ("BasicEventElement", "Evt"),
    ("AnnotatedRelationshipElement", "RelA"),
];

/// Abbreviated metamodel names as shown in AAS guidance documents.
const SIMPLE_MODEL_TYPES: &[(&str, &str)] = &[
    ("Referable", "Ref"),
    ("Reference", "Rfc"),
    ("AssetAdministrationShellRef", "AasRef"),
    ("AssetRef", "AssetRef"),
    ("SubmodelRef", "SMRef"),
    ("ConceptDescriptionRef", "CDRef"),
    ("DataSpecificationRef", "DSRef"),
    ("ContainedElementRef", "CERef"),
    ("AssetAdministrationShells", "AASs"),
    ("Assets", "Assets"),
    ("Submodels", "SMS"),
    ("ConceptDescriptions", "CDS"),
    ("AdministrationShellEnv", "Env"),
    ("AssetAdministrationShell", "AAS"),
    ("Asset", "Asset"),
    ("View", "View"),
    ("ConceptDescription", "CD"),
    ("ConceptDictionary", "CDic"),
    ("Submodel", "SM"),
    ("Qualifier", "Qfr"),
    ("OperationVariable", "OprVar"),
    ("SubmodelElement", "SME"),
    ("DataElement", "DE"),
    ("Property", "Prop"),
    ("MultiLanguageProperty", "MLP"),
    ("Range", "Range"),
    ("Blob", "Blob"),
    ("File", "File"),
    ("ReferenceElement", "Ref"),
    ("RelationshipElement", "Rel"),
    ("AnnotatedRelationshipElement", "RelA"),
    ("Capability", "Cap"),
    ("SubmodelElementCollection", "SMC"),
    ("Operation", "Opr"),
    ("Entity", "Ent"),
    ("BasicEvent", "Evt"),
    ("BasicEventElement", "Evt"),
    ("SubmodelElementList", "ElementList"),
];

/// Kind name of the submodel itself, as derived from the `<submodel>` tag.
pub const SUBMODEL_KIND: &str = "Submodel";

/// True when `model_type` (full or abbreviated, any case) nests further elements.
pub fn is_grouping_kind(model_type: &str) -> bool {
    GROUPING_KINDS.iter().any(|(full, short)| {
        model_type.eq_ignore_ascii_case(full) || model_type.eq_ignore_ascii_case(short)
    })
}

/// Abbreviated name of a model type, or the name itself when none is known.
pub fn simple_model_type(model_type: &str) -> &str {
    SIMPLE_MODEL_TYPES
        .iter()
        .find(|(full, _)| model_type.eq_ignore_ascii_case(full))
        .map(|(_, short)| *short)
        .unwrap_or(model_type)
}

/// Kind name for an element tag: `submodelElementCollection` → `SubmodelElementCollection`.
pub fn kind_name(tag: &str) -> String {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Submodels defined by the common IDTA templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultSubmodel {
    Identification,
    Documentation,
    HandoverDocumentation,
    Cad,
    CarbonFootprint,
    HierarchicalStructures,
    DigitalNameplate,
    Nameplate,
    TechnicalData,
    OperationalData,
}

impl DefaultSubmodel {
    pub const ALL: [DefaultSubmodel; 10] = [
        DefaultSubmodel::Identification,
        DefaultSubmodel::Documentation,
        DefaultSubmodel::HandoverDocumentation,
        DefaultSubmodel::Cad,
        DefaultSubmodel::CarbonFootprint,
        DefaultSubmodel::HierarchicalStructures,
        DefaultSubmodel::DigitalNameplate,
        DefaultSubmodel::Nameplate,
        DefaultSubmodel::TechnicalData,
        DefaultSubmodel::OperationalData,
    ];

    /// Selector key, e.g. `technical_data`.
    pub fn key(self) -> &'static str {
        match self {
            DefaultSubmodel::Identification => "identification",
            DefaultSubmodel::Documentation => "documentation",
            DefaultSubmodel::HandoverDocumentation => "handover_documentation",
            DefaultSubmodel::Cad => "cad",
            DefaultSubmodel::CarbonFootprint => "carbon_footprint",
            DefaultSubmodel::HierarchicalStructures => "hierarchical_structures",
            DefaultSubmodel::DigitalNameplate => "digital_nameplate",
            DefaultSubmodel::Nameplate => "nameplate",
            DefaultSubmodel::TechnicalData => "technical_data",
            DefaultSubmodel::OperationalData => "operational_data",
        }
    }

    /// True when a submodel id-short belongs to one of the template submodels.
    pub fn is_default(id_short: &str) -> bool {
        DefaultSubmodel::ALL
            .iter()
            .any(|d| name_matches_selector(id_short, d.key()))
    }
}

/// Normalized containment test between a submodel id-short and a selector
/// key: `TechnicalData` matches `technical_data`, `Nameplate` matches
/// `digital_nameplate`.
pub fn name_matches_selector(id_short: &str, selector: &str) -> bool {
    let name: String = id_short
        .chars()
        .filter(|c| *c != '_' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    let key: String = selector
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect();
    !name.is_empty() && key.contains(&name)
}

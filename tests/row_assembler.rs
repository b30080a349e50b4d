use aastable::extract::{RowAssembler, RowStage, assemble_rows};
use aastable::model::Row;
use aastable::tree::{self, NodeTree, walk};

fn rows_of(xml: &str) -> Vec<Row> {
    let tree: NodeTree = tree::xml::parse_tree(xml, None).expect("parse");
    let root = tree.root().expect("root");
    assemble_rows(walk(root))
}

const SUBMODEL: &str = r#"<submodel xmlns="https://admin-shell.io/aas/3/0">
  <idShort>TechnicalData</idShort>
  <description>
    <langStringTextType><language>en</language><text>Technical data</text></langStringTextType>
  </description>
  <semanticId>
    <type>ExternalReference</type>
    <keys>
      <key><type>GlobalReference</type><value>urn:sm:technical-data</value></key>
    </keys>
  </semanticId>
  <submodelElements>
    <property>
      <idShort>MaxTemperature</idShort>
      <description>
        <langStringTextType><language>en</language><text>Highest rated temperature</text></langStringTextType>
        <langStringTextType><language>de</language><text>Maximale Temperatur</text></langStringTextType>
      </description>
      <semanticId>
        <type>ExternalReference</type>
        <keys>
          <key><type>GlobalReference</type><value>0173-1#02-AAB381#003</value></key>
          <key><type>FragmentReference</type><value>ignored</value></key>
        </keys>
      </semanticId>
      <qualifiers>
        <qualifier>
          <semanticId>
            <type>ExternalReference</type>
            <keys><key><type>GlobalReference</type><value>urn:qualifier</value></key></keys>
          </semanticId>
          <type>Unit</type>
          <valueType>xs:string</valueType>
          <value>degC</value>
        </qualifier>
      </qualifiers>
      <valueType>xs:double</valueType>
      <value>85.5</value>
    </property>
    <multiLanguageProperty>
      <idShort>ManufacturerName</idShort>
      <description>
        <langStringTextType><language>en</language><text>Legal name</text></langStringTextType>
      </description>
      <value>
        <langStringTextType><language>en</language><text>ACME Pumps</text></langStringTextType>
      </value>
    </multiLanguageProperty>
    <submodelElementCollection>
      <idShort>Dimensions</idShort>
      <value>
        <property>
          <idShort>Width</idShort>
          <valueType>xs:int</valueType>
          <value>120</value>
        </property>
      </value>
    </submodelElementCollection>
  </submodelElements>
</submodel>"#;

#[test]
fn one_row_per_id_short_in_document_order() {
    let rows = rows_of(SUBMODEL);
    let names: Vec<(&str, &str)> = rows
        .iter()
        .map(|r| {
            (
                r.model_type.as_deref().unwrap_or(""),
                r.id_short.as_deref().unwrap_or(""),
            )
        })
        .collect();
    assert_eq!(
        names,
        vec![
            ("Submodel", "TechnicalData"),
            ("Property", "MaxTemperature"),
            ("MultiLanguageProperty", "ManufacturerName"),
            ("SubmodelElementCollection", "Dimensions"),
            ("Property", "Width"),
        ]
    );
    let depths: Vec<Option<usize>> = rows.iter().map(|r| r.depth).collect();
    assert_eq!(depths, vec![Some(1), Some(3), Some(3), Some(3), Some(5)]);
}

#[test]
fn submodel_row_carries_its_metadata() {
    let rows = rows_of(SUBMODEL);
    let header = &rows[0];
    assert_eq!(header.semantic_id(), Some("urn:sm:technical-data"));
    assert_eq!(header.reference_type(), Some("GlobalReference"));
    assert_eq!(header.description, vec!["Technical data".to_string()]);
    assert_eq!(header.value, None);
}

#[test]
fn property_attributes() {
    let rows = rows_of(SUBMODEL);
    let prop = &rows[1];
    // Descriptions accumulate across languages.
    assert_eq!(
        prop.description,
        vec![
            "Highest rated temperature".to_string(),
            "Maximale Temperatur".to_string()
        ]
    );
    // The first key wins; qualifier attributes do not leak into the row.
    assert_eq!(prop.semantic_id(), Some("0173-1#02-AAB381#003"));
    assert_eq!(prop.reference_type(), Some("GlobalReference"));
    assert_eq!(prop.value_type.as_deref(), Some("xs:double"));
    assert_eq!(prop.value.as_deref(), Some("85.5"));
    assert!(prop.definition.is_empty());
}

#[test]
fn multi_language_value_and_description_are_kept_apart() {
    let rows = rows_of(SUBMODEL);
    let mlp = &rows[2];
    assert_eq!(mlp.value.as_deref(), Some("ACME Pumps"));
    assert_eq!(mlp.description, vec!["Legal name".to_string()]);
}

#[test]
fn collection_value_container_does_not_set_a_value() {
    let rows = rows_of(SUBMODEL);
    let smc = &rows[3];
    assert_eq!(smc.value, None);
    assert_eq!(rows[4].value.as_deref(), Some("120"));
    assert_eq!(rows[4].value_type.as_deref(), Some("xs:int"));
}

#[test]
fn committed_rows_are_independent_copies() {
    let tree = tree::xml::parse_tree(SUBMODEL, None).expect("parse");
    let root = tree.root().expect("root");
    let mut assembler = RowAssembler::new();
    let mut committed = Vec::new();
    for (i, visit) in walk(root).enumerate() {
        if let Some(row) = assembler.feed(visit, i) {
            committed.push(row);
        }
    }
    assert_eq!(committed.len(), 4);
    let before = committed[3].clone();
    // The row still being accumulated is a different value.
    assert_eq!(assembler.current().id_short.as_deref(), Some("Width"));
    assert_ne!(assembler.current(), &before);
    let last = assembler.finish().expect("final row");
    assert_eq!(last.id_short.as_deref(), Some("Width"));
    assert_eq!(committed[3], before);
    assert!(assembler.current().is_empty());
    assert_eq!(assembler.finish(), None);
}

#[test]
fn nodes_before_the_first_id_short_are_ignored() {
    let xml = r#"<submodel>
  <category>PARAMETER</category>
  <semanticId><keys><key><type>GlobalReference</type><value>urn:x</value></key></keys></semanticId>
  <idShort>Late</idShort>
</submodel>"#;
    let rows = rows_of(xml);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id_short.as_deref(), Some("Late"));
    assert_eq!(rows[0].semantic_id(), None);
}

#[test]
fn id_short_ends_an_unfinished_semantic_id_capture() {
    // The semantic id has no value; the next element must still become a row.
    let xml = r#"<submodel>
  <idShort>S</idShort>
  <submodelElements>
    <property>
      <idShort>Broken</idShort>
      <semanticId><type>ExternalReference</type></semanticId>
    </property>
    <property>
      <idShort>Next</idShort>
      <value>1</value>
    </property>
  </submodelElements>
</submodel>"#;
    let tree = tree::xml::parse_tree(xml, None).expect("parse");
    let root = tree.root().expect("root");
    let mut assembler = RowAssembler::new();
    let mut rows = Vec::new();
    for (i, visit) in walk(root).enumerate() {
        rows.extend(assembler.feed(visit, i));
        if visit.node.name() == "type" {
            assert_eq!(assembler.stage(), RowStage::SetSemanticId);
        }
    }
    rows.extend(assembler.finish());
    let names: Vec<&str> = rows.iter().filter_map(|r| r.id_short.as_deref()).collect();
    assert_eq!(names, vec!["S", "Broken", "Next"]);
    assert_eq!(rows[1].semantic_id(), None);
    assert_eq!(rows[2].value.as_deref(), Some("1"));
}

#[test]
fn consecutive_rows_never_repeat_without_a_boundary() {
    let rows = rows_of(SUBMODEL);
    for pair in rows.windows(2) {
        assert!(pair[0].index < pair[1].index);
    }
}

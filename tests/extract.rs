use aastable::config::ExtractOptions;
use aastable::extract::{DefinitionPolicy, Extraction, NO_PARENT, TableExtractor};
use aastable::model::{HierarchyMode, SubmodelTable};
use aastable::parser::AasDocument;

const PUMP_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<environment xmlns="https://admin-shell.io/aas/3/0">
  <assetAdministrationShells>
    <assetAdministrationShell>
      <idShort>Pump</idShort>
      <id>urn:aas:pump</id>
      <submodels>
        <reference>
          <type>ModelReference</type>
          <keys><key><type>Submodel</type><value>urn:sm:ident</value></key></keys>
        </reference>
        <reference>
          <type>ModelReference</type>
          <keys><key><type>Submodel</type><value>urn:sm:tech</value></key></keys>
        </reference>
      </submodels>
    </assetAdministrationShell>
  </assetAdministrationShells>
  <submodels>
    <submodel>
      <idShort>Identification</idShort>
      <description>
        <langStringTextType><language>en</language><text>Identification data</text></langStringTextType>
      </description>
      <id>urn:sm:ident</id>
      <semanticId>
        <type>ExternalReference</type>
        <keys><key><type>GlobalReference</type><value>urn:sem:identification</value></key></keys>
      </semanticId>
      <submodelElements>
        <property>
          <idShort>Owner</idShort>
          <valueType>xs:string</valueType>
          <value>ACME</value>
        </property>
        <submodelElementCollection>
          <idShort>Details</idShort>
          <value>
            <property>
              <idShort>SerialNumber</idShort>
              <semanticId>
                <type>ExternalReference</type>
                <keys><key><type>GlobalReference</type><value>0173-1#02-AAM556#002</value></key></keys>
              </semanticId>
              <valueType>xs:string</valueType>
              <value>X123</value>
            </property>
          </value>
        </submodelElementCollection>
      </submodelElements>
    </submodel>
    <submodel>
      <idShort>TechnicalData</idShort>
      <id>urn:sm:tech</id>
      <submodelElements>
        <property>
          <idShort>MaxTemperature</idShort>
          <valueType>xs:double</valueType>
          <value>85.5</value>
        </property>
      </submodelElements>
    </submodel>
    <submodel>
      <idShort>Orphan</idShort>
      <id>urn:sm:orphan</id>
      <submodelElements>
        <property>
          <idShort>Lost</idShort>
          <value>1</value>
        </property>
      </submodelElements>
    </submodel>
  </submodels>
  <conceptDescriptions>
    <conceptDescription>
      <idShort>SerialNumber</idShort>
      <id>0173-1#02-AAM556#002</id>
      <embeddedDataSpecifications>
        <embeddedDataSpecification>
          <dataSpecificationContent>
            <dataSpecificationIec61360>
              <preferredName>
                <langStringPreferredNameTypeIec61360><language>en</language><text>serial number</text></langStringPreferredNameTypeIec61360>
              </preferredName>
              <definition>
                <langStringDefinitionTypeIec61360><language>en</language><text>unique serial number of the product</text></langStringDefinitionTypeIec61360>
              </definition>
            </dataSpecificationIec61360>
          </dataSpecificationContent>
        </embeddedDataSpecification>
      </embeddedDataSpecifications>
    </conceptDescription>
  </conceptDescriptions>
</environment>
"#;

const PUMP_JSON: &str = r#"{
  "assetAdministrationShells": [
    {
      "modelType": "AssetAdministrationShell",
      "idShort": "Pump",
      "id": "urn:aas:pump",
      "submodels": [
        { "type": "ModelReference", "keys": [ { "type": "Submodel", "value": "urn:sm:ident" } ] },
        { "type": "ModelReference", "keys": [ { "type": "Submodel", "value": "urn:sm:tech" } ] }
      ]
    }
  ],
  "submodels": [
    {
      "modelType": "Submodel",
      "id": "urn:sm:ident",
      "idShort": "Identification",
      "description": [ { "language": "en", "text": "Identification data" } ],
      "semanticId": {
        "type": "ExternalReference",
        "keys": [ { "type": "GlobalReference", "value": "urn:sem:identification" } ]
      },
      "submodelElements": [
        { "modelType": "Property", "idShort": "Owner", "valueType": "xs:string", "value": "ACME" },
        {
          "modelType": "SubmodelElementCollection",
          "idShort": "Details",
          "value": [
            {
              "modelType": "Property",
              "idShort": "SerialNumber",
              "semanticId": {
                "type": "ExternalReference",
                "keys": [ { "type": "GlobalReference", "value": "0173-1#02-AAM556#002" } ]
              },
              "valueType": "xs:string",
              "value": "X123"
            }
          ]
        }
      ]
    },
    {
      "modelType": "Submodel",
      "id": "urn:sm:tech",
      "idShort": "TechnicalData",
      "submodelElements": [
        { "modelType": "Property", "idShort": "MaxTemperature", "valueType": "xs:double", "value": "85.5" }
      ]
    },
    {
      "modelType": "Submodel",
      "id": "urn:sm:orphan",
      "idShort": "Orphan",
      "submodelElements": [ { "modelType": "Property", "idShort": "Lost", "value": "1" } ]
    }
  ],
  "conceptDescriptions": [
    {
      "modelType": "ConceptDescription",
      "id": "0173-1#02-AAM556#002",
      "idShort": "SerialNumber",
      "embeddedDataSpecifications": [
        {
          "dataSpecificationContent": {
            "modelType": "DataSpecificationIec61360",
            "preferredName": [ { "language": "en", "text": "serial number" } ],
            "definition": [ { "language": "en", "text": "unique serial number of the product" } ]
          }
        }
      ]
    }
  ]
}"#;

fn extract(xml: &str, options: ExtractOptions) -> Extraction {
    let doc = AasDocument::from_xml(xml, Some("pump.xml")).expect("parse");
    TableExtractor::new(options).extract(&doc)
}

fn table<'a>(extraction: &'a Extraction, key: &str) -> &'a SubmodelTable {
    extraction
        .tables
        .iter()
        .find(|t| t.key == key)
        .unwrap_or_else(|| panic!("no table {key}"))
}

#[test]
fn tables_are_keyed_by_shell_and_submodel() {
    let extraction = extract(PUMP_XML, ExtractOptions::default());
    let keys: Vec<&str> = extraction.tables.iter().map(|t| t.key.as_str()).collect();
    assert_eq!(keys, vec!["Pump_Identification", "Pump_TechnicalData"]);
    assert_eq!(extraction.shells, vec!["Pump".to_string()]);
    assert_eq!(extraction.unresolved, vec!["urn:sm:orphan".to_string()]);
    assert!(extraction.filtered.is_empty());

    let ident = table(&extraction, "Pump_Identification");
    assert_eq!(ident.shell_name, "Pump");
    assert_eq!(ident.submodel_short_name, "Identification");
    assert_eq!(ident.semantic_id.as_deref(), Some("urn:sem:identification"));
    assert_eq!(ident.description, vec!["Identification data".to_string()]);
}

#[test]
fn full_mode_rows_and_definition() {
    let extraction = extract(PUMP_XML, ExtractOptions::default());
    let t = &table(&extraction, "Pump_Identification").table;
    assert_eq!(
        t.column_keys(),
        vec![
            "SMC01",
            "model_type",
            "id_short",
            "semantic_id",
            "description",
            "value",
            "value_type",
            "reference_type",
            "definition"
        ]
    );
    assert_eq!(t.rows.len(), 3);

    assert_eq!(t.cell(0, "id_short"), Some("Owner"));
    assert_eq!(t.cell(0, "SMC01"), Some(NO_PARENT));
    assert_eq!(t.cell(0, "value"), Some("ACME"));

    assert_eq!(t.cell(1, "id_short"), Some("Details"));
    assert_eq!(t.cell(1, "SMC01"), Some("Details"));
    assert_eq!(t.cell(1, "model_type"), Some("SubmodelElementCollection"));

    assert_eq!(t.cell(2, "id_short"), Some("SerialNumber"));
    assert_eq!(t.cell(2, "SMC01"), Some("Details"));
    assert_eq!(t.cell(2, "semantic_id"), Some("0173-1#02-AAM556#002"));
    assert_eq!(t.cell(2, "reference_type"), Some("GlobalReference"));
    assert_eq!(
        t.cell(2, "definition"),
        Some("unique serial number of the product")
    );
    assert_eq!(t.cell(0, "definition"), None);
}

#[test]
fn collapsed_mode_drops_group_rows() {
    let options = ExtractOptions {
        mode: HierarchyMode::Collapsed,
        ..ExtractOptions::default()
    };
    let extraction = extract(PUMP_XML, options);
    let t = &table(&extraction, "Pump_Identification").table;
    assert_eq!(t.rows.len(), 2);
    assert_eq!(t.cell(0, "id_short"), Some("Owner"));
    assert_eq!(t.cell(0, "SMC01"), Some(NO_PARENT));
    assert_eq!(t.cell(1, "id_short"), Some("SerialNumber"));
    assert_eq!(t.cell(1, "SMC01"), Some("Details"));
}

#[test]
fn json_and_xml_produce_the_same_tables() {
    let from_xml = extract(PUMP_XML, ExtractOptions::default());
    let doc = AasDocument::from_json(PUMP_JSON, Some("pump.json")).expect("parse json");
    let from_json = TableExtractor::new(ExtractOptions::default()).extract(&doc);
    assert_eq!(from_json.tables, from_xml.tables);
    assert_eq!(from_json.unresolved, from_xml.unresolved);
    assert_eq!(from_json.shells, from_xml.shells);
}

const OPERATION_XML: &str = r#"<environment>
  <assetAdministrationShells>
    <assetAdministrationShell>
      <idShort>Pump</idShort>
      <submodels><reference><type>ModelReference</type><keys><key><type>Submodel</type><value>urn:sm:ops</value></key></keys></reference></submodels>
    </assetAdministrationShell>
  </assetAdministrationShells>
  <submodels>
    <submodel>
      <idShort>Operations</idShort>
      <id>urn:sm:ops</id>
      <submodelElements>
        <operation>
          <idShort>Run</idShort>
          <inputVariables>
            <operationVariable>
              <value>
                <property><idShort>Speed</idShort><valueType>xs:double</valueType></property>
              </value>
            </operationVariable>
          </inputVariables>
        </operation>
      </submodelElements>
    </submodel>
  </submodels>
</environment>"#;

const OPERATION_JSON: &str = r#"{
  "assetAdministrationShells": [
    {
      "modelType": "AssetAdministrationShell",
      "idShort": "Pump",
      "submodels": [
        { "type": "ModelReference", "keys": [ { "type": "Submodel", "value": "urn:sm:ops" } ] }
      ]
    }
  ],
  "submodels": [
    {
      "modelType": "Submodel",
      "idShort": "Operations",
      "id": "urn:sm:ops",
      "submodelElements": [
        {
          "modelType": "Operation",
          "idShort": "Run",
          "inputVariables": [
            { "value": { "modelType": "Property", "idShort": "Speed", "valueType": "xs:double" } }
          ]
        }
      ]
    }
  ]
}"#;

#[test]
fn operation_variables_match_across_formats() {
    let from_xml = extract(OPERATION_XML, ExtractOptions::default());
    let doc = AasDocument::from_json(OPERATION_JSON, Some("ops.json")).expect("parse json");
    let from_json = TableExtractor::new(ExtractOptions::default()).extract(&doc);
    assert_eq!(from_json.tables, from_xml.tables);

    let t = &table(&from_json, "Pump_Operations").table;
    let speed = (0..t.rows.len())
        .find(|&i| t.cell(i, "id_short") == Some("Speed"))
        .expect("Speed row");
    assert_eq!(t.cell(speed, "model_type"), Some("Property"));
    assert_eq!(t.cell(speed, "value_type"), Some("xs:double"));
}

#[test]
fn submodel_selection_reports_filtered_keys() {
    let options = ExtractOptions {
        submodels: vec!["technical_data".to_string()],
        ..ExtractOptions::default()
    };
    let extraction = extract(PUMP_XML, options);
    let keys: Vec<&str> = extraction.tables.iter().map(|t| t.key.as_str()).collect();
    assert_eq!(keys, vec!["Pump_TechnicalData"]);
    assert_eq!(extraction.filtered, vec!["Pump_Identification".to_string()]);

    let options = ExtractOptions {
        submodels: vec!["etc".to_string()],
        ..ExtractOptions::default()
    };
    assert!(extract(PUMP_XML, options).tables.is_empty());
}

#[test]
fn column_selection_and_unknown_names() {
    let options = ExtractOptions {
        columns: vec!["idShort".into(), "colour".into(), "value".into()],
        hierarchy: false,
        simple_model_type: true,
        ..ExtractOptions::default()
    };
    let extraction = extract(PUMP_XML, options);
    assert_eq!(extraction.unknown_columns, vec!["colour".to_string()]);
    let t = &table(&extraction, "Pump_TechnicalData").table;
    assert_eq!(t.column_keys(), vec!["id_short", "value"]);
    assert_eq!(t.cell(0, "value"), Some("85.5"));
}

#[test]
fn simple_model_types_in_cells() {
    let options = ExtractOptions {
        simple_model_type: true,
        ..ExtractOptions::default()
    };
    let extraction = extract(PUMP_XML, options);
    let t = &table(&extraction, "Pump_Identification").table;
    assert_eq!(t.cell(1, "model_type"), Some("SMC"));
}

const SHARED_CD: &str = r#"<environment>
  <assetAdministrationShells>
    <assetAdministrationShell>
      <idShort>A</idShort>
      <submodels><reference><type>ModelReference</type><keys><key><type>Submodel</type><value>urn:sm:a</value></key></keys></reference></submodels>
    </assetAdministrationShell>
    <assetAdministrationShell>
      <idShort>B</idShort>
      <submodels><reference><type>ModelReference</type><keys><key><type>Submodel</type><value>urn:sm:b</value></key></keys></reference></submodels>
    </assetAdministrationShell>
  </assetAdministrationShells>
  <submodels>
    <submodel>
      <idShort>Nameplate</idShort>
      <id>urn:sm:a</id>
      <submodelElements>
        <property>
          <idShort>Weight_CD</idShort>
          <semanticId><type>ExternalReference</type><keys><key><type>GlobalReference</type><value>0173-1#02-AAA001#001</value></key></keys></semanticId>
          <value>12</value>
        </property>
      </submodelElements>
    </submodel>
    <submodel>
      <idShort>Nameplate</idShort>
      <id>urn:sm:b</id>
      <submodelElements>
        <property>
          <idShort>Weight_CD</idShort>
          <semanticId><type>ExternalReference</type><keys><key><type>GlobalReference</type><value>0173-1#02-AAA001#001</value></key></keys></semanticId>
          <value>14</value>
        </property>
      </submodelElements>
    </submodel>
  </submodels>
  <conceptDescriptions>
    <conceptDescription>
      <idShort>Weight_CD</idShort>
      <id>0173-1#02-AAA001#001</id>
      <definition>
        <langStringDefinitionTypeIec61360><language>en</language><text>net weight</text></langStringDefinitionTypeIec61360>
      </definition>
    </conceptDescription>
  </conceptDescriptions>
</environment>"#;

#[test]
fn consumed_definitions_reach_only_the_first_matching_row() {
    let extraction = extract(SHARED_CD, ExtractOptions::default());
    assert_eq!(
        table(&extraction, "A_Nameplate").table.cell(0, "definition"),
        Some("net weight")
    );
    assert_eq!(table(&extraction, "B_Nameplate").table.cell(0, "definition"), None);
}

#[test]
fn shared_definitions_reach_every_matching_row() {
    let options = ExtractOptions {
        definitions: DefinitionPolicy::Shared,
        ..ExtractOptions::default()
    };
    let extraction = extract(SHARED_CD, options);
    for key in ["A_Nameplate", "B_Nameplate"] {
        assert_eq!(
            table(&extraction, key).table.cell(0, "definition"),
            Some("net weight")
        );
    }
}

#[test]
fn later_submodel_with_the_same_key_replaces_the_earlier() {
    let weight = r#"<property><idShort>W</idShort><semanticId><type>ExternalReference</type><keys><key><type>GlobalReference</type><value>urn:cd:w</value></key></keys></semanticId></property>"#;
    let xml = r#"<environment>
  <assetAdministrationShells>
    <assetAdministrationShell>
      <idShort>Pump</idShort>
      <submodels>
        <reference><type>ModelReference</type><keys><key><type>Submodel</type><value>urn:a</value></key></keys></reference>
        <reference><type>ModelReference</type><keys><key><type>Submodel</type><value>urn:other</value></key></keys></reference>
        <reference><type>ModelReference</type><keys><key><type>Submodel</type><value>urn:b</value></key></keys></reference>
      </submodels>
    </assetAdministrationShell>
  </assetAdministrationShells>
  <submodels>
    <submodel><idShort>Data</idShort><id>urn:a</id>
      <submodelElements><property><idShort>First</idShort><value>1</value></property>WEIGHT</submodelElements>
    </submodel>
    <submodel><idShort>Other</idShort><id>urn:other</id>
      <submodelElements><property><idShort>Middle</idShort><value>2</value></property></submodelElements>
    </submodel>
    <submodel><idShort>Data</idShort><id>urn:b</id>
      <submodelElements><property><idShort>Second</idShort><value>3</value></property>WEIGHT</submodelElements>
    </submodel>
  </submodels>
  <conceptDescriptions>
    <conceptDescription>
      <idShort>W</idShort>
      <id>urn:cd:w</id>
      <definition><langStringDefinitionTypeIec61360><language>en</language><text>weight</text></langStringDefinitionTypeIec61360></definition>
    </conceptDescription>
  </conceptDescriptions>
</environment>"#
        .replace("WEIGHT", weight);
    let extraction = extract(&xml, ExtractOptions::default());
    let keys: Vec<&str> = extraction.tables.iter().map(|t| t.key.as_str()).collect();
    assert_eq!(keys, vec!["Pump_Data", "Pump_Other"]);
    let data = &table(&extraction, "Pump_Data").table;
    assert_eq!(data.rows.len(), 2);
    assert_eq!(data.cell(0, "id_short"), Some("Second"));
    // The replaced submodel never took the definition from the pool.
    assert_eq!(data.cell(1, "id_short"), Some("W"));
    assert_eq!(data.cell(1, "definition"), Some("weight"));
}

#[test]
fn environment_without_submodels_yields_nothing() {
    let extraction = extract(
        "<environment><assetAdministrationShells/></environment>",
        ExtractOptions::default(),
    );
    assert!(extraction.tables.is_empty());
    assert!(extraction.unresolved.is_empty());
}

use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind};
use crate::predicate::{Capabilities, EntitySchema, FieldSpec, FieldType};
use crate::query::OntologyQuery;

/// A term of an ontology such as GO or HPO
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OntologyTerm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub xrefs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

const ONTOLOGY_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", "id", FieldType::String),
    FieldSpec::new("name", "name", FieldType::String),
    FieldSpec::new("namespace", "namespace", FieldType::String).groupable(),
    FieldSpec::new("source", "source", FieldType::String).groupable(),
    FieldSpec::new("synonyms", "synonyms", FieldType::String),
    FieldSpec::new("xrefs", "xrefs", FieldType::String),
    FieldSpec::new("parents", "parents", FieldType::String),
    FieldSpec::new("children", "children", FieldType::String),
    FieldSpec::new("definition", "definition", FieldType::Text),
];

pub static ONTOLOGY_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::Ontology,
    collection: "ontology",
    fields: ONTOLOGY_FIELDS,
    projectable: &[
        "id",
        "name",
        "namespace",
        "source",
        "definition",
        "synonyms",
        "xrefs",
        "parents",
        "children",
    ],
    identifier_fields: &["id", "name"],
    display_field: "name",
    region: None,
    variant: None,
    capabilities: Capabilities {
        groupable: true,
        distinctable: true,
        aggregation_stats: false,
        reliable_counts: true,
    },
};

impl Entity for OntologyTerm {
    type Query = OntologyQuery;

    fn schema() -> &'static EntitySchema {
        &ONTOLOGY_SCHEMA
    }
}

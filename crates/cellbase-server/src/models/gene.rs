use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind, Transcript};
use crate::predicate::schema::RegionPaths;
use crate::predicate::{Capabilities, EntitySchema, FieldSpec, FieldType};
use crate::query::GeneQuery;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Gene {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biotype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chromosome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transcripts: Vec<Transcript>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<GeneAnnotation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneAnnotation {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diseases: Vec<Disease>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub expression: Vec<Expression>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub drugs: Vec<Drug>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Disease {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Expression level of the gene in one tissue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Expression {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tissue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Drug {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

const GENE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", "id", FieldType::String),
    FieldSpec::new("name", "name", FieldType::String),
    FieldSpec::new("biotype", "biotype", FieldType::String).groupable(),
    FieldSpec::new("chromosome", "chromosome", FieldType::String).groupable(),
    FieldSpec::new("start", "start", FieldType::Integer),
    FieldSpec::new("end", "end", FieldType::Integer),
    FieldSpec::new("strand", "strand", FieldType::String).groupable(),
    FieldSpec::new("source", "source", FieldType::String).groupable(),
    FieldSpec::new("description", "description", FieldType::Text),
    FieldSpec::new("xrefs", "transcripts.xrefs.id", FieldType::String),
    FieldSpec::new("transcripts.id", "transcripts.id", FieldType::String),
    FieldSpec::new("transcripts.name", "transcripts.name", FieldType::String),
    FieldSpec::new("transcripts.biotype", "transcripts.biotype", FieldType::String).groupable(),
    FieldSpec::new("transcripts.xrefs", "transcripts.xrefs.id", FieldType::String),
    FieldSpec::new("transcripts.tfbs.id", "transcripts.tfbs.id", FieldType::String),
    FieldSpec::new("transcripts.flags", "transcripts.flags", FieldType::String).groupable(),
    FieldSpec::new("annotation.diseases.id", "annotation.diseases.id", FieldType::String),
    FieldSpec::new("annotation.diseases.name", "annotation.diseases.name", FieldType::String)
        .groupable(),
    FieldSpec::new(
        "annotation.expression.tissue",
        "annotation.expression.tissue",
        FieldType::String,
    )
    .groupable(),
    FieldSpec::new(
        "annotation.expression.value",
        "annotation.expression.value",
        FieldType::Float,
    ),
    FieldSpec::new("annotation.drugs.name", "annotation.drugs.name", FieldType::String).groupable(),
];

pub static GENE_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::Gene,
    collection: "gene",
    fields: GENE_FIELDS,
    projectable: &[
        "id",
        "name",
        "biotype",
        "chromosome",
        "start",
        "end",
        "strand",
        "source",
        "description",
        "transcripts",
        "annotation",
    ],
    identifier_fields: &["transcripts.xrefs.id"],
    display_field: "name",
    region: Some(RegionPaths {
        chromosome: "chromosome",
        start: "start",
        end: "end",
    }),
    variant: None,
    capabilities: Capabilities {
        groupable: true,
        distinctable: true,
        aggregation_stats: true,
        reliable_counts: true,
    },
};

impl Entity for Gene {
    type Query = GeneQuery;

    fn schema() -> &'static EntitySchema {
        &GENE_SCHEMA
    }
}

use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind, Xref};
use crate::predicate::schema::RegionPaths;
use crate::predicate::{Capabilities, EntitySchema, FieldSpec, FieldType};
use crate::query::TranscriptQuery;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Transcript {
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
    pub gene_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gene_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_level: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub xrefs: Vec<Xref>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tfbs: Vec<Tfbs>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exons: Vec<Exon>,
    #[serde(rename = "cDnaSequence", skip_serializing_if = "Option::is_none")]
    pub cdna_sequence: Option<String>,
}

/// Transcription factor binding site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tfbs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Exon {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exon_number: Option<u32>,
}

const TRANSCRIPT_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", "id", FieldType::String),
    FieldSpec::new("name", "name", FieldType::String),
    FieldSpec::new("biotype", "biotype", FieldType::String).groupable(),
    FieldSpec::new("chromosome", "chromosome", FieldType::String).groupable(),
    FieldSpec::new("start", "start", FieldType::Integer),
    FieldSpec::new("end", "end", FieldType::Integer),
    FieldSpec::new("strand", "strand", FieldType::String).groupable(),
    FieldSpec::new("geneId", "geneId", FieldType::String),
    FieldSpec::new("geneName", "geneName", FieldType::String).groupable(),
    FieldSpec::new("xrefs", "xrefs.id", FieldType::String),
    FieldSpec::new("flags", "flags", FieldType::String).groupable(),
    FieldSpec::new("supportLevel", "supportLevel", FieldType::String).groupable(),
    FieldSpec::new("tfbs.id", "tfbs.id", FieldType::String),
    FieldSpec::new("exons.id", "exons.id", FieldType::String),
];

/// Transcripts are stored nested in genes upstream, so match counts over
/// this collection are not trusted
pub static TRANSCRIPT_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::Transcript,
    collection: "transcript",
    fields: TRANSCRIPT_FIELDS,
    projectable: &[
        "id",
        "name",
        "biotype",
        "chromosome",
        "start",
        "end",
        "strand",
        "geneId",
        "geneName",
        "flags",
        "supportLevel",
        "xrefs",
        "tfbs",
        "exons",
        "cDnaSequence",
    ],
    identifier_fields: &["xrefs.id"],
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
        reliable_counts: false,
    },
};

impl Entity for Transcript {
    type Query = TranscriptQuery;

    fn schema() -> &'static EntitySchema {
        &TRANSCRIPT_SCHEMA
    }
}

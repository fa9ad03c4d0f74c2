use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind, Xref};
use crate::predicate::schema::{RegionPaths, VariantPaths};
use crate::predicate::{Capabilities, EntitySchema, FieldSpec, FieldType};
use crate::query::VariantQuery;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Variant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chromosome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub variant_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sv: Option<StructuralVariation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<VariantAnnotation>,
}

/// Breakpoint confidence intervals of a structural variant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StructuralVariation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci_start_left: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci_start_right: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci_end_left: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci_end_right: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_number: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VariantAnnotation {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub consequence_types: Vec<ConsequenceType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub xrefs: Vec<Xref>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsequenceType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gene_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ensembl_gene_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ensembl_transcript_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biotype: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sequence_ontology_terms: Vec<SequenceOntologyTerm>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SequenceOntologyTerm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accession: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

const VARIANT_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", "id", FieldType::String),
    FieldSpec::new("chromosome", "chromosome", FieldType::String).groupable(),
    FieldSpec::new("start", "start", FieldType::Integer),
    FieldSpec::new("end", "end", FieldType::Integer),
    FieldSpec::new("reference", "reference", FieldType::String),
    FieldSpec::new("alternate", "alternate", FieldType::String),
    FieldSpec::new("type", "type", FieldType::String).groupable(),
    FieldSpec::new("genes", "annotation.consequenceTypes.geneName", FieldType::String).groupable(),
    FieldSpec::new(
        "consequenceType",
        "annotation.consequenceTypes.sequenceOntologyTerms.name",
        FieldType::String,
    )
    .groupable(),
    FieldSpec::new("xrefs", "annotation.xrefs.id", FieldType::String),
    FieldSpec::new("sv.ciStartLeft", "sv.ciStartLeft", FieldType::Integer),
    FieldSpec::new("sv.ciStartRight", "sv.ciStartRight", FieldType::Integer),
    FieldSpec::new("sv.ciEndLeft", "sv.ciEndLeft", FieldType::Integer),
    FieldSpec::new("sv.ciEndRight", "sv.ciEndRight", FieldType::Integer),
    FieldSpec::new("sv.copyNumber", "sv.copyNumber", FieldType::Integer).groupable(),
    FieldSpec::new("structural", "sv", FieldType::Presence),
];

pub static VARIANT_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::Variant,
    collection: "variant",
    fields: VARIANT_FIELDS,
    projectable: &[
        "id",
        "names",
        "chromosome",
        "start",
        "end",
        "reference",
        "alternate",
        "type",
        "sv",
        "annotation",
    ],
    identifier_fields: &["id"],
    display_field: "id",
    region: Some(RegionPaths {
        chromosome: "chromosome",
        start: "start",
        end: "end",
    }),
    variant: Some(VariantPaths {
        chromosome: "chromosome",
        start: "start",
        reference: "reference",
        alternate: "alternate",
        ci_start_left: "sv.ciStartLeft",
        ci_start_right: "sv.ciStartRight",
        ci_end_left: "sv.ciEndLeft",
        ci_end_right: "sv.ciEndRight",
    }),
    capabilities: Capabilities {
        groupable: true,
        distinctable: true,
        aggregation_stats: true,
        reliable_counts: true,
    },
};

impl Entity for Variant {
    type Query = VariantQuery;

    fn schema() -> &'static EntitySchema {
        &VARIANT_SCHEMA
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_and_sv_round_trip_names() {
        let variant: Variant = serde_json::from_value(json!({
            "id": "cnv1",
            "type": "CNV",
            "sv": {"ciStartLeft": 990, "ciStartRight": 1010, "copyNumber": 3}
        }))
        .unwrap();
        assert_eq!(variant.variant_type.as_deref(), Some("CNV"));
        let sv = variant.sv.as_ref().unwrap();
        assert_eq!((sv.ci_start_left, sv.copy_number), (Some(990), Some(3)));
        assert_eq!(serde_json::to_value(&variant).unwrap()["sv"]["ciStartRight"], 1010);
    }

    #[test]
    fn test_structural_filter_targets_sv_object() {
        let spec = VARIANT_SCHEMA.require_field("structural").unwrap();
        assert_eq!((spec.path, spec.field_type), ("sv", FieldType::Presence));
    }
}

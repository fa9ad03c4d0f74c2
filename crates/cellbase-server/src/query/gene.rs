use cellbase_common::LogicalList;
use serde::Serialize;

use super::{list, text, BaseQuery, EntityQuery, FilterValue, Filters};
use crate::error::QueryBuildError;
use crate::predicate::FieldSpec;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneQuery {
    #[serde(flatten)]
    pub base: BaseQuery,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub names: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub biotypes: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub chromosomes: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub start: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub end: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub strand: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub sources: LogicalList<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub transcripts_id: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub transcripts_name: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub transcripts_biotype: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub transcripts_xrefs: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub transcripts_tfbs_id: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub transcripts_flags: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub annotation_diseases_id: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub annotation_diseases_name: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub annotation_expression_tissue: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub annotation_expression_value: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub annotation_drugs_name: LogicalList<String>,
}

impl EntityQuery for GeneQuery {
    fn base(&self) -> &BaseQuery {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseQuery {
        &mut self.base
    }

    fn filters(&self) -> Vec<(&'static str, FilterValue<'_>)> {
        Filters::new()
            .list("name", &self.names)
            .list("biotype", &self.biotypes)
            .list("chromosome", &self.chromosomes)
            .list("start", &self.start)
            .list("end", &self.end)
            .list("strand", &self.strand)
            .list("source", &self.sources)
            .text("description", &self.description)
            .list("transcripts.id", &self.transcripts_id)
            .list("transcripts.name", &self.transcripts_name)
            .list("transcripts.biotype", &self.transcripts_biotype)
            .list("transcripts.xrefs", &self.transcripts_xrefs)
            .list("transcripts.tfbs.id", &self.transcripts_tfbs_id)
            .list("transcripts.flags", &self.transcripts_flags)
            .list("annotation.diseases.id", &self.annotation_diseases_id)
            .list("annotation.diseases.name", &self.annotation_diseases_name)
            .list("annotation.expression.tissue", &self.annotation_expression_tissue)
            .list("annotation.expression.value", &self.annotation_expression_value)
            .list("annotation.drugs.name", &self.annotation_drugs_name)
            .finish()
    }

    fn set_filter(&mut self, field: &FieldSpec, raw: &str) -> Result<(), QueryBuildError> {
        match field.name {
            "id" => self.base.ids = list(raw)?,
            "xrefs" => self.base.xrefs = list(raw)?,
            "name" => self.names = list(raw)?,
            "biotype" => self.biotypes = list(raw)?,
            "chromosome" => self.chromosomes = list(raw)?,
            "start" => self.start = list(raw)?,
            "end" => self.end = list(raw)?,
            "strand" => self.strand = list(raw)?,
            "source" => self.sources = list(raw)?,
            "description" => self.description = text(raw),
            "transcripts.id" => self.transcripts_id = list(raw)?,
            "transcripts.name" => self.transcripts_name = list(raw)?,
            "transcripts.biotype" => self.transcripts_biotype = list(raw)?,
            "transcripts.xrefs" => self.transcripts_xrefs = list(raw)?,
            "transcripts.tfbs.id" => self.transcripts_tfbs_id = list(raw)?,
            "transcripts.flags" => self.transcripts_flags = list(raw)?,
            "annotation.diseases.id" => self.annotation_diseases_id = list(raw)?,
            "annotation.diseases.name" => self.annotation_diseases_name = list(raw)?,
            "annotation.expression.tissue" => self.annotation_expression_tissue = list(raw)?,
            "annotation.expression.value" => self.annotation_expression_value = list(raw)?,
            "annotation.drugs.name" => self.annotation_drugs_name = list(raw)?,
            other => return Err(QueryBuildError::invalid_parameter(other, "not a gene filter")),
        }
        Ok(())
    }
}

use cellbase_common::LogicalList;
use serde::Serialize;

use super::{list, BaseQuery, EntityQuery, FilterValue, Filters};
use crate::error::QueryBuildError;
use crate::predicate::FieldSpec;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptQuery {
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
    pub gene_ids: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub gene_names: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub flags: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub support_level: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub tfbs_id: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub exons_id: LogicalList<String>,
}

impl EntityQuery for TranscriptQuery {
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
            .list("geneId", &self.gene_ids)
            .list("geneName", &self.gene_names)
            .list("flags", &self.flags)
            .list("supportLevel", &self.support_level)
            .list("tfbs.id", &self.tfbs_id)
            .list("exons.id", &self.exons_id)
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
            "geneId" => self.gene_ids = list(raw)?,
            "geneName" => self.gene_names = list(raw)?,
            "flags" => self.flags = list(raw)?,
            "supportLevel" => self.support_level = list(raw)?,
            "tfbs.id" => self.tfbs_id = list(raw)?,
            "exons.id" => self.exons_id = list(raw)?,
            other => {
                return Err(QueryBuildError::invalid_parameter(other, "not a transcript filter"))
            },
        }
        Ok(())
    }
}

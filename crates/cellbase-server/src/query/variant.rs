use cellbase_common::LogicalList;
use serde::Serialize;

use super::{flag, list, BaseQuery, EntityQuery, FilterValue, Filters};
use crate::error::QueryBuildError;
use crate::predicate::FieldSpec;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantQuery {
    #[serde(flatten)]
    pub base: BaseQuery,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub chromosomes: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub start: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub end: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub reference: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub alternate: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub types: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub genes: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub consequence_types: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub ci_start_left: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub ci_start_right: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub ci_end_left: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub ci_end_right: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub copy_number: LogicalList<String>,
    /// Restrict to (or exclude) structural variants
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structural: Option<bool>,
}

impl EntityQuery for VariantQuery {
    fn base(&self) -> &BaseQuery {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseQuery {
        &mut self.base
    }

    fn filters(&self) -> Vec<(&'static str, FilterValue<'_>)> {
        Filters::new()
            .list("chromosome", &self.chromosomes)
            .list("start", &self.start)
            .list("end", &self.end)
            .list("reference", &self.reference)
            .list("alternate", &self.alternate)
            .list("type", &self.types)
            .list("genes", &self.genes)
            .list("consequenceType", &self.consequence_types)
            .list("sv.ciStartLeft", &self.ci_start_left)
            .list("sv.ciStartRight", &self.ci_start_right)
            .list("sv.ciEndLeft", &self.ci_end_left)
            .list("sv.ciEndRight", &self.ci_end_right)
            .list("sv.copyNumber", &self.copy_number)
            .flag("structural", self.structural)
            .finish()
    }

    fn set_filter(&mut self, field: &FieldSpec, raw: &str) -> Result<(), QueryBuildError> {
        match field.name {
            "id" => self.base.ids = list(raw)?,
            "xrefs" => self.base.xrefs = list(raw)?,
            "chromosome" => self.chromosomes = list(raw)?,
            "start" => self.start = list(raw)?,
            "end" => self.end = list(raw)?,
            "reference" => self.reference = list(raw)?,
            "alternate" => self.alternate = list(raw)?,
            "type" => self.types = list(raw)?,
            "genes" => self.genes = list(raw)?,
            "consequenceType" => self.consequence_types = list(raw)?,
            "sv.ciStartLeft" => self.ci_start_left = list(raw)?,
            "sv.ciStartRight" => self.ci_start_right = list(raw)?,
            "sv.ciEndLeft" => self.ci_end_left = list(raw)?,
            "sv.ciEndRight" => self.ci_end_right = list(raw)?,
            "sv.copyNumber" => self.copy_number = list(raw)?,
            "structural" => self.structural = flag(field, raw)?,
            other => return Err(QueryBuildError::invalid_parameter(other, "not a variant filter")),
        }
        Ok(())
    }
}

use cellbase_common::LogicalList;
use serde::Serialize;

use super::{list, text, BaseQuery, EntityQuery, FilterValue, Filters};
use crate::error::QueryBuildError;
use crate::predicate::FieldSpec;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OntologyQuery {
    #[serde(flatten)]
    pub base: BaseQuery,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub names: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub namespaces: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub sources: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub synonyms: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub parents: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub children: LogicalList<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

impl EntityQuery for OntologyQuery {
    fn base(&self) -> &BaseQuery {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseQuery {
        &mut self.base
    }

    fn filters(&self) -> Vec<(&'static str, FilterValue<'_>)> {
        Filters::new()
            .list("name", &self.names)
            .list("namespace", &self.namespaces)
            .list("source", &self.sources)
            .list("synonyms", &self.synonyms)
            .list("parents", &self.parents)
            .list("children", &self.children)
            .text("definition", &self.definition)
            .finish()
    }

    fn set_filter(&mut self, field: &FieldSpec, raw: &str) -> Result<(), QueryBuildError> {
        match field.name {
            "id" => self.base.ids = list(raw)?,
            "xrefs" => self.base.xrefs = list(raw)?,
            "name" => self.names = list(raw)?,
            "namespace" => self.namespaces = list(raw)?,
            "source" => self.sources = list(raw)?,
            "synonyms" => self.synonyms = list(raw)?,
            "parents" => self.parents = list(raw)?,
            "children" => self.children = list(raw)?,
            "definition" => self.definition = text(raw),
            other => {
                return Err(QueryBuildError::invalid_parameter(other, "not an ontology filter"))
            },
        }
        Ok(())
    }
}

//! Typed query objects
//!
//! One query struct per entity kind. Each carries a [`BaseQuery`] (ids,
//! xrefs, regions, an identifier or variant injected by the managers, and
//! [`QueryOptions`]) plus its own named filters. Queries are built once,
//! either programmatically or from REST parameters with [`from_params`],
//! and are only read afterwards.

mod gene;
mod ontology;
mod options;
mod transcript;
mod variant;

use cellbase_common::{LogicalList, Region, VariantSpec};
use serde::Serialize;
use std::fmt;

use crate::error::QueryBuildError;
use crate::predicate::{EntitySchema, FieldSpec};

pub use gene::GeneQuery;
pub use ontology::OntologyQuery;
pub use options::QueryOptions;
pub(crate) use options::split_fields;
pub use transcript::TranscriptQuery;
pub use variant::VariantQuery;

/// Keys consumed by the request context rather than the query
const CONTEXT_KEYS: &[&str] = &["species", "assembly"];

/// A populated entity-specific filter, borrowed from its query
#[derive(Debug, Clone, Copy)]
pub enum FilterValue<'a> {
    List(&'a LogicalList<String>),
    Text(&'a str),
    Flag(bool),
}

/// Filters every entity kind understands
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseQuery {
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub ids: LogicalList<String>,
    #[serde(skip_serializing_if = "LogicalList::is_empty")]
    pub xrefs: LogicalList<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<Region>,
    /// Matched against the entity's identifier fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<VariantSpec>,
    #[serde(flatten)]
    pub options: QueryOptions,
}

pub trait EntityQuery: Clone + Default + fmt::Debug + Serialize + Send + Sync + 'static {
    fn base(&self) -> &BaseQuery;

    fn base_mut(&mut self) -> &mut BaseQuery;

    /// Populated entity-specific filters, keyed by schema field name
    fn filters(&self) -> Vec<(&'static str, FilterValue<'_>)>;

    /// Set an entity-specific filter from its textual form
    fn set_filter(&mut self, field: &FieldSpec, raw: &str) -> Result<(), QueryBuildError>;

    fn options(&self) -> &QueryOptions {
        &self.base().options
    }

    fn options_mut(&mut self) -> &mut QueryOptions {
        &mut self.base_mut().options
    }

    fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.base_mut().identifier = Some(identifier.into());
        self
    }

    fn with_regions(mut self, regions: Vec<Region>) -> Self {
        self.base_mut().regions = regions;
        self
    }

    fn with_variant(mut self, variant: VariantSpec) -> Self {
        self.base_mut().variant = Some(variant);
        self
    }

    fn with_options(mut self, options: QueryOptions) -> Self {
        self.base_mut().options = options;
        self
    }
}

/// Build a query from REST parameters
///
/// Keys may be written in dot or camel case. Unknown keys are rejected.
pub fn from_params<Q: EntityQuery>(
    schema: &EntitySchema,
    params: &[(String, String)],
) -> Result<Q, QueryBuildError> {
    let mut query = Q::default();
    for (key, raw) in params {
        if query.options_mut().apply(key, raw)? || CONTEXT_KEYS.contains(&key.as_str()) {
            continue;
        }
        match key.as_str() {
            "id" => query.base_mut().ids = list(raw)?,
            "xrefs" => query.base_mut().xrefs = list(raw)?,
            "region" => query.base_mut().regions = Region::parse_list(raw)?,
            _ => {
                let spec = schema.resolve_param(key).ok_or_else(|| schema.unknown(key))?;
                query.set_filter(spec, raw)?;
            },
        }
    }
    Ok(query)
}

pub(crate) fn list(raw: &str) -> Result<LogicalList<String>, QueryBuildError> {
    Ok(LogicalList::parse(raw)?)
}

pub(crate) fn text(raw: &str) -> Option<String> {
    Some(raw.trim().to_string()).filter(|s| !s.is_empty())
}

pub(crate) fn flag(field: &FieldSpec, raw: &str) -> Result<Option<bool>, QueryBuildError> {
    options::boolean(field.name, raw).map(Some)
}

/// Collect the populated members of a query's filters
pub(crate) struct Filters<'a>(Vec<(&'static str, FilterValue<'a>)>);

impl<'a> Filters<'a> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn list(mut self, name: &'static str, value: &'a LogicalList<String>) -> Self {
        if !value.is_empty() {
            self.0.push((name, FilterValue::List(value)));
        }
        self
    }

    pub fn text(mut self, name: &'static str, value: &'a Option<String>) -> Self {
        if let Some(value) = value {
            self.0.push((name, FilterValue::Text(value)));
        }
        self
    }

    pub fn flag(mut self, name: &'static str, value: Option<bool>) -> Self {
        if let Some(value) = value {
            self.0.push((name, FilterValue::Flag(value)));
        }
        self
    }

    pub fn finish(self) -> Vec<(&'static str, FilterValue<'a>)> {
        self.0
    }
}

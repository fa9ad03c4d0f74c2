//! Per-request context
//!
//! Species and assembly select the dataset and are only echoed back, resolved
//! against the configured defaults; everything else in the query string
//! belongs to the entity query. Handlers pull out the few keys that
//! are arguments of the operation itself (`fields`, `field`) before the rest
//! is turned into a typed query.

use std::collections::BTreeMap;

use crate::config::QueryConfig;
use crate::error::QueryBuildError;
use crate::predicate::EntitySchema;
use crate::query::{self, EntityQuery};

#[derive(Debug, Clone)]
pub struct RequestContext {
    params: Vec<(String, String)>,
    echo: BTreeMap<String, String>,
}

impl RequestContext {
    pub fn new(config: &QueryConfig, params: Vec<(String, String)>) -> Self {
        let lookup = |key: &str| {
            params
                .iter()
                .rev()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        };
        let species = lookup("species").unwrap_or_else(|| config.default_species.clone());
        let assembly = lookup("assembly").unwrap_or_else(|| config.default_assembly.clone());

        let mut echo: BTreeMap<String, String> = params.iter().cloned().collect();
        echo.insert("species".to_string(), species);
        echo.insert("assembly".to_string(), assembly);

        Self { params, echo }
    }

    /// Remove an operation argument so it is not read as a filter
    pub fn take(&mut self, key: &str) -> Option<String> {
        let mut taken = None;
        self.params.retain(|(k, v)| {
            if k == key {
                taken = Some(v.clone());
                false
            } else {
                true
            }
        });
        taken
    }

    pub fn require(&mut self, key: &str) -> Result<String, QueryBuildError> {
        self.take(key)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| QueryBuildError::invalid_parameter(key, "parameter is required"))
    }

    /// Typed query from the remaining parameters
    pub fn query<Q: EntityQuery>(&self, schema: &EntitySchema) -> Result<Q, QueryBuildError> {
        query::from_params(schema, &self.params)
    }

    /// Parameters as received, with the resolved species and assembly
    pub fn params(&self) -> BTreeMap<String, String> {
        self.echo.clone()
    }
}

//! Per-entity catalog of queryable fields
//!
//! Every filter, sort key, facet and projection is checked against the
//! entity's [`EntitySchema`] before a predicate reaches the backend.

use serde::Serialize;

use crate::error::QueryBuildError;
use crate::models::EntityKind;

/// Value type of a queryable field, which fixes its comparator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Exact match, AND/OR lists allowed
    String,
    /// Exact match or `<`, `<=`, `>`, `>=` range
    Integer,
    Float,
    Boolean,
    /// Case-insensitive substring match
    Text,
    /// `true`/`false` tests whether the path is present
    Presence,
}

impl FieldType {
    pub fn comparator(self) -> &'static str {
        match self {
            FieldType::String | FieldType::Boolean => "EQUALS",
            FieldType::Integer | FieldType::Float => "RANGE",
            FieldType::Text => "REGEX",
            FieldType::Presence => "EXISTS",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Float)
    }
}

/// A queryable attribute
///
/// `name` is what callers use (and what REST parameters spell, in dot or
/// camel case); `path` is where the value lives inside the document.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub path: &'static str,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub groupable: bool,
}

impl FieldSpec {
    pub const fn new(name: &'static str, path: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            path,
            field_type,
            groupable: false,
        }
    }

    pub const fn groupable(mut self) -> Self {
        self.groupable = true;
        self
    }

    /// `transcripts.biotype` -> `transcriptsBiotype`
    pub fn camel_case_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        let mut upper = false;
        for c in self.name.chars() {
            if c == '.' {
                upper = true;
            } else if upper {
                out.extend(c.to_uppercase());
                upper = false;
            } else {
                out.push(c);
            }
        }
        out
    }
}

/// Operations an entity kind supports beyond plain search
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub groupable: bool,
    pub distinctable: bool,
    pub aggregation_stats: bool,
    /// Whether `numTotalResults`/`numMatches` can be trusted
    pub reliable_counts: bool,
}

/// Document paths holding genomic coordinates
#[derive(Debug, Clone, Copy)]
pub struct RegionPaths {
    pub chromosome: &'static str,
    pub start: &'static str,
    pub end: &'static str,
}

/// Document paths used to match variants
#[derive(Debug, Clone, Copy)]
pub struct VariantPaths {
    pub chromosome: &'static str,
    pub start: &'static str,
    pub reference: &'static str,
    pub alternate: &'static str,
    pub ci_start_left: &'static str,
    pub ci_start_right: &'static str,
    pub ci_end_left: &'static str,
    pub ci_end_right: &'static str,
}

#[derive(Debug)]
pub struct EntitySchema {
    pub kind: EntityKind,
    pub collection: &'static str,
    pub fields: &'static [FieldSpec],
    /// Top-level document keys accepted by include/exclude
    pub projectable: &'static [&'static str],
    /// Paths matched (OR-ed) when resolving an identifier for `info`
    pub identifier_fields: &'static [&'static str],
    /// Field whose values are collected in groupBy buckets
    pub display_field: &'static str,
    pub region: Option<RegionPaths>,
    pub variant: Option<VariantPaths>,
    pub capabilities: Capabilities,
}

impl EntitySchema {
    /// Look a field up by name or by document path
    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|f| f.name == key)
            .or_else(|| self.fields.iter().find(|f| f.path == key))
    }

    /// Resolve a REST parameter key in dot or camel case
    pub fn resolve_param(&self, key: &str) -> Option<&FieldSpec> {
        self.field(key)
            .or_else(|| self.fields.iter().find(|f| f.camel_case_name() == key))
    }

    pub fn require_field(&self, key: &str) -> Result<&FieldSpec, QueryBuildError> {
        self.resolve_param(key).ok_or_else(|| self.unknown(key))
    }

    /// Field usable as a grouping key or facet
    pub fn require_groupable(&self, key: &str) -> Result<&FieldSpec, QueryBuildError> {
        let spec = self.require_field(key)?;
        if spec.groupable {
            Ok(spec)
        } else {
            Err(QueryBuildError::unsupported(
                self.kind,
                format!("grouping by '{}'", spec.name),
            ))
        }
    }

    pub fn check_projection(&self, path: &str) -> Result<(), QueryBuildError> {
        let root = path.split('.').next().unwrap_or(path);
        if self.projectable.contains(&root) {
            Ok(())
        } else {
            Err(self.unknown(path))
        }
    }

    pub fn unknown(&self, key: &str) -> QueryBuildError {
        QueryBuildError::UnknownField {
            entity: self.kind,
            field: key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[FieldSpec] = &[
        FieldSpec::new("id", "id", FieldType::String),
        FieldSpec::new("transcripts.biotype", "transcripts.biotype", FieldType::String).groupable(),
        FieldSpec::new("xrefs", "transcripts.xrefs.id", FieldType::String),
    ];

    static SCHEMA: EntitySchema = EntitySchema {
        kind: EntityKind::Gene,
        collection: "gene",
        fields: FIELDS,
        projectable: &["id", "transcripts"],
        identifier_fields: &["transcripts.xrefs.id"],
        display_field: "name",
        region: None,
        variant: None,
        capabilities: Capabilities {
            groupable: true,
            distinctable: true,
            aggregation_stats: true,
            reliable_counts: true,
        },
    };

    #[test]
    fn test_camel_case_name() {
        assert_eq!(FIELDS[1].camel_case_name(), "transcriptsBiotype");
        assert_eq!(FIELDS[0].camel_case_name(), "id");
    }

    #[test]
    fn test_resolve_param_spellings() {
        assert_eq!(SCHEMA.resolve_param("transcriptsBiotype").map(|f| f.name), Some("transcripts.biotype"));
        assert_eq!(SCHEMA.resolve_param("transcripts.biotype").map(|f| f.name), Some("transcripts.biotype"));
        assert_eq!(SCHEMA.resolve_param("transcripts.xrefs.id").map(|f| f.name), Some("xrefs"));
        assert!(SCHEMA.resolve_param("transcriptBiotype").is_none());
    }

    #[test]
    fn test_groupable_and_projection_checks() {
        assert!(SCHEMA.require_groupable("transcripts.biotype").is_ok());
        assert!(matches!(
            SCHEMA.require_groupable("id"),
            Err(QueryBuildError::Unsupported { .. })
        ));
        assert!(matches!(
            SCHEMA.require_field("biotipe"),
            Err(QueryBuildError::UnknownField { .. })
        ));
        assert!(SCHEMA.check_projection("transcripts.exons").is_ok());
        assert!(SCHEMA.check_projection("annotation").is_err());
    }
}

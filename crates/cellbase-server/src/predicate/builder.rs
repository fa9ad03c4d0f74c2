//! Query object to predicate translation

use cellbase_common::LogicalList;
use serde_json::{Number, Value};

use super::{region, Bound, EntitySchema, FieldSpec, FieldType, Predicate};
use crate::backend::{FindRequest, Projection, SortField};
use crate::config::QueryConfig;
use crate::error::QueryBuildError;
use crate::query::{EntityQuery, FilterValue};

/// Translates query objects of one entity kind into predicates
#[derive(Debug, Clone, Copy)]
pub struct PredicateBuilder {
    schema: &'static EntitySchema,
}

/// A validated query, ready to dispatch
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    pub predicate: Predicate,
    pub projection: Projection,
    pub sort: Vec<SortField>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    /// Whether total counts were requested
    pub count: bool,
}

impl PreparedQuery {
    pub fn into_find_request(self, collection: &str) -> FindRequest {
        FindRequest {
            collection: collection.to_string(),
            predicate: self.predicate,
            projection: self.projection,
            sort: self.sort,
            skip: self.skip,
            limit: self.limit,
        }
    }
}

impl PredicateBuilder {
    pub fn new(schema: &'static EntitySchema) -> Self {
        Self { schema }
    }

    /// Build the filter tree for `query`
    ///
    /// Distinct fields are AND-ed; an empty query yields the match-all tree.
    pub fn build<Q: EntityQuery>(&self, query: &Q) -> Result<Predicate, QueryBuildError> {
        let base = query.base();
        let mut clauses = Vec::new();

        if !base.ids.is_empty() {
            clauses.push(self.list_clause(self.schema.require_field("id")?, &base.ids)?);
        }
        if !base.xrefs.is_empty() {
            clauses.push(self.list_clause(self.schema.require_field("xrefs")?, &base.xrefs)?);
        }
        if let Some(identifier) = &base.identifier {
            clauses.push(Predicate::or(
                self.schema
                    .identifier_fields
                    .iter()
                    .map(|path| Predicate::eq(*path, identifier.as_str()))
                    .collect(),
            ));
        }
        for (name, value) in query.filters() {
            let spec = self.schema.require_field(name)?;
            clauses.push(self.filter_clause(spec, value)?);
        }
        if !base.regions.is_empty() {
            clauses.push(region::regions_predicate(self.schema, &base.regions)?);
        }
        if let Some(variant) = &base.variant {
            clauses.push(region::variant_predicate(self.schema, variant)?);
        }

        let predicate = Predicate::and(clauses);
        tracing::debug!(entity = %self.schema.kind, predicate = ?predicate, "Built predicate");
        Ok(predicate)
    }

    /// Build the predicate and validate projection, sort and paging
    pub fn prepare<Q: EntityQuery>(
        &self,
        query: &Q,
        config: &QueryConfig,
    ) -> Result<PreparedQuery, QueryBuildError> {
        let predicate = self.build(query)?;
        let options = query.options();

        for path in options.include.iter().chain(&options.exclude) {
            self.schema.check_projection(path)?;
        }
        let sort = options
            .sort
            .iter()
            .map(|key| {
                self.schema.require_field(key).map(|spec| SortField {
                    path: spec.path.to_string(),
                    order: options.order,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PreparedQuery {
            predicate,
            projection: Projection {
                include: options.include.clone(),
                exclude: options.exclude.clone(),
            },
            sort,
            skip: options.skip,
            limit: config.effective_limit(options.limit),
            count: options.count,
        })
    }

    fn filter_clause(
        &self,
        spec: &FieldSpec,
        value: FilterValue<'_>,
    ) -> Result<Predicate, QueryBuildError> {
        match (spec.field_type, value) {
            (_, FilterValue::List(values)) => self.list_clause(spec, values),
            (FieldType::Text, FilterValue::Text(text)) => Ok(text_match(spec, text)),
            (FieldType::Presence, FilterValue::Flag(present)) => {
                Ok(Predicate::exists(spec.path, present))
            },
            (FieldType::Boolean, FilterValue::Flag(flag)) => Ok(Predicate::eq(spec.path, flag)),
            (field_type, _) => Err(QueryBuildError::invalid_value(
                spec.name,
                format!("value does not fit a {} field", field_type.comparator()),
            )),
        }
    }

    /// One leaf per value, combined with the list's logic
    fn list_clause(
        &self,
        spec: &FieldSpec,
        values: &LogicalList<String>,
    ) -> Result<Predicate, QueryBuildError> {
        let leaves = values
            .iter()
            .map(|raw| value_leaf(spec, raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(if values.is_and() {
            Predicate::and(leaves)
        } else {
            Predicate::or(leaves)
        })
    }
}

fn value_leaf(spec: &FieldSpec, raw: &str) -> Result<Predicate, QueryBuildError> {
    match spec.field_type {
        FieldType::String => Ok(Predicate::eq(spec.path, raw)),
        FieldType::Integer | FieldType::Float => numeric_leaf(spec, raw),
        FieldType::Boolean => Ok(Predicate::eq(spec.path, parse_bool(spec, raw)?)),
        FieldType::Text => Ok(text_match(spec, raw)),
        FieldType::Presence => Ok(Predicate::exists(spec.path, parse_bool(spec, raw)?)),
    }
}

fn text_match(spec: &FieldSpec, text: &str) -> Predicate {
    Predicate::regex(spec.path, regex::escape(text), true)
}

/// `100` matches exactly; `>100`, `>=100`, `<100` and `<=100` are ranges
fn numeric_leaf(spec: &FieldSpec, raw: &str) -> Result<Predicate, QueryBuildError> {
    let raw = raw.trim();
    let (op, number) = ["<=", ">=", "<", ">"]
        .iter()
        .find_map(|op| raw.strip_prefix(op).map(|rest| (*op, rest)))
        .unwrap_or(("", raw));
    let value = parse_number(spec, number.trim())?;

    Ok(match op {
        ">=" => Predicate::range(spec.path, Some(Bound::inclusive(value)), None),
        ">" => Predicate::range(spec.path, Some(Bound::exclusive(value)), None),
        "<=" => Predicate::range(spec.path, None, Some(Bound::inclusive(value))),
        "<" => Predicate::range(spec.path, None, Some(Bound::exclusive(value))),
        _ => Predicate::eq(spec.path, value),
    })
}

fn parse_number(spec: &FieldSpec, raw: &str) -> Result<Value, QueryBuildError> {
    let invalid = || QueryBuildError::invalid_value(spec.name, format!("'{raw}' is not a number"));
    if spec.field_type == FieldType::Integer {
        raw.parse::<i64>().map(Value::from).map_err(|_| invalid())
    } else {
        raw.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(invalid)
    }
}

fn parse_bool(spec: &FieldSpec, raw: &str) -> Result<bool, QueryBuildError> {
    raw.trim()
        .parse()
        .map_err(|_| QueryBuildError::invalid_value(spec.name, format!("'{raw}' is not a boolean")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::{GENE_SCHEMA, ONTOLOGY_SCHEMA, VARIANT_SCHEMA};
    use crate::predicate::Comparator;
    use crate::query::{GeneQuery, OntologyQuery, QueryOptions, VariantQuery};

    fn gene_builder() -> PredicateBuilder {
        PredicateBuilder::new(&GENE_SCHEMA)
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let predicate = gene_builder().build(&GeneQuery::default()).unwrap();
        assert!(predicate.is_match_all());
    }

    #[test]
    fn test_list_logic_maps_to_node_kind() {
        let query = GeneQuery {
            biotypes: LogicalList::any_of(vec!["miRNA".into(), "lncRNA".into()]),
            transcripts_flags: LogicalList::all_of(vec!["basic".into(), "CCDS".into()]),
            ..Default::default()
        };
        let predicate = gene_builder().build(&query).unwrap();
        let Predicate::And(children) = predicate else {
            panic!("expected AND of fields");
        };
        assert_eq!(children.len(), 3);
        assert!(matches!(&children[0], Predicate::Or(or) if or.len() == 2));
        // AND lists flatten into the top-level conjunction
        let flags: Vec<_> = children[1..]
            .iter()
            .map(|c| match c {
                Predicate::Leaf(leaf) => leaf.field.as_str(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(flags, ["transcripts.flags", "transcripts.flags"]);
    }

    #[test]
    fn test_dotted_paths_are_used_verbatim() {
        let query = GeneQuery {
            transcripts_biotype: LogicalList::any_of(vec!["protein_coding".into()]),
            ..Default::default()
        };
        assert_eq!(
            gene_builder().build(&query).unwrap(),
            Predicate::eq("transcripts.biotype", "protein_coding")
        );
    }

    #[test]
    fn test_identifier_matches_any_identifier_field() {
        let query = OntologyQuery::default().with_identifier("HP:0000118");
        let predicate = PredicateBuilder::new(&ONTOLOGY_SCHEMA).build(&query).unwrap();
        assert_eq!(
            predicate,
            Predicate::or(vec![
                Predicate::eq("id", "HP:0000118"),
                Predicate::eq("name", "HP:0000118"),
            ])
        );
    }

    #[test]
    fn test_numeric_prefixes_build_ranges() {
        let query = GeneQuery {
            annotation_expression_value: LogicalList::all_of(vec![">=0.5".into(), "<2".into()]),
            ..Default::default()
        };
        let predicate = gene_builder().build(&query).unwrap();
        let comparators: Vec<_> = predicate.conditions().iter().map(|c| c.comparator.clone()).collect();
        assert_eq!(
            comparators,
            [
                Comparator::Range {
                    lower: Some(Bound::inclusive(0.5)),
                    upper: None
                },
                Comparator::Range {
                    lower: None,
                    upper: Some(Bound::exclusive(2.0))
                },
            ]
        );
    }

    #[test]
    fn test_invalid_number_names_the_field() {
        let query = GeneQuery {
            start: LogicalList::any_of(vec!["abc".into()]),
            ..Default::default()
        };
        let err = gene_builder().build(&query).unwrap_err();
        assert_eq!(err.field(), Some("start"));
    }

    #[test]
    fn test_text_filter_is_escaped_regex() {
        let query = GeneQuery {
            description: Some("kinase (putative)".into()),
            ..Default::default()
        };
        let predicate = gene_builder().build(&query).unwrap();
        assert_eq!(predicate, Predicate::regex("description", r"kinase \(putative\)", true));
    }

    #[test]
    fn test_structural_flag_is_exists() {
        let query = VariantQuery {
            structural: Some(false),
            ..Default::default()
        };
        let predicate = PredicateBuilder::new(&VARIANT_SCHEMA).build(&query).unwrap();
        assert_eq!(predicate, Predicate::exists("sv", false));
    }

    #[test]
    fn test_prepare_validates_projection_and_sort() {
        let config = QueryConfig::default();
        let builder = gene_builder();

        let query = GeneQuery::default().with_options(QueryOptions {
            include: vec!["transcripts.id".into()],
            sort: vec!["start".into()],
            ..Default::default()
        });
        let prepared = builder.prepare(&query, &config).unwrap();
        assert_eq!(prepared.sort[0].path, "start");
        assert_eq!(prepared.limit, None);

        let bad_include = GeneQuery::default().with_options(QueryOptions {
            include: vec!["sequence".into()],
            ..Default::default()
        });
        assert!(matches!(
            builder.prepare(&bad_include, &config),
            Err(QueryBuildError::UnknownField { .. })
        ));

        let bad_sort = GeneQuery::default().with_options(QueryOptions {
            sort: vec!["popularity".into()],
            ..Default::default()
        });
        assert!(builder.prepare(&bad_sort, &config).is_err());
    }

    #[test]
    fn test_prepare_caps_limit() {
        let config = QueryConfig {
            max_limit: 10,
            ..Default::default()
        };
        let query = GeneQuery::default().with_options(QueryOptions::default().with_limit(500));
        assert_eq!(gene_builder().prepare(&query, &config).unwrap().limit, Some(10));
    }

    #[test]
    fn test_building_twice_is_identical() {
        let query = GeneQuery {
            names: LogicalList::any_of(vec!["BRCA2".into()]),
            ..Default::default()
        }
        .with_regions(vec!["13:32315000-32400000".parse().unwrap()]);
        let builder = gene_builder();
        assert_eq!(builder.build(&query).unwrap(), builder.build(&query).unwrap());
    }
}

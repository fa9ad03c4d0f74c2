//! In-process document backend
//!
//! Collections are immutable after construction, so concurrent requests
//! share them without locking. The predicate tree is compiled once per call
//! into a [`Matcher`] and evaluated against every document.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use super::document::{compare, project, resolve, to_key_string, values_equal};
use super::{
    Accumulator, AggregationStage, Document, DocumentBackend, DocumentStream, FindRequest,
    SortField, SortOrder,
};
use crate::error::BackendError;
use crate::predicate::{Bound, Comparator, Predicate};

#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    collections: HashMap<String, Arc<Vec<Document>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(mut self, name: impl Into<String>, documents: Vec<Document>) -> Self {
        self.collections.insert(name.into(), Arc::new(documents));
        self
    }

    /// Load every `<collection>.json` file (a JSON array of documents) in `dir`
    pub async fn from_dir(dir: impl AsRef<Path>) -> Result<Self, BackendError> {
        let dir = dir.as_ref();
        let mut backend = Self::new();
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| BackendError::io(format!("cannot read {}: {e}", dir.display())))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| BackendError::io(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            let raw = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| BackendError::io(format!("cannot read {}: {e}", path.display())))?;
            let documents: Vec<Document> = serde_json::from_str(&raw)?;
            tracing::debug!(collection = %name, documents = documents.len(), "Loaded fixture collection");
            backend = backend.with_collection(name, documents);
        }

        Ok(backend)
    }

    pub fn collection_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.collections.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn collection(&self, name: &str) -> Result<Arc<Vec<Document>>, BackendError> {
        self.collections
            .get(name)
            .cloned()
            .ok_or_else(|| BackendError::UnknownCollection(name.to_string()))
    }

    fn matching(&self, collection: &str, predicate: &Predicate) -> Result<Vec<Document>, BackendError> {
        let documents = self.collection(collection)?;
        let matcher = Matcher::compile(predicate)?;
        Ok(documents.iter().filter(|d| matcher.matches(d)).cloned().collect())
    }
}

#[async_trait]
impl DocumentBackend for InMemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn find(&self, request: FindRequest) -> Result<DocumentStream, BackendError> {
        let mut documents = self.matching(&request.collection, &request.predicate)?;
        sort_documents(&mut documents, &request.sort);

        let skip = request.skip.unwrap_or(0) as usize;
        let limit = request.limit.map_or(usize::MAX, |l| l as usize);
        let projection = request.projection;
        let page: Vec<Result<Document, BackendError>> = documents
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| Ok(project(doc, &projection)))
            .collect();

        Ok(stream::iter(page).boxed())
    }

    async fn aggregate(
        &self,
        collection: &str,
        stages: Vec<AggregationStage>,
    ) -> Result<DocumentStream, BackendError> {
        let mut documents: Vec<Document> = self.collection(collection)?.as_ref().clone();

        for stage in stages {
            documents = match stage {
                AggregationStage::Match(predicate) => {
                    let matcher = Matcher::compile(&predicate)?;
                    documents.into_iter().filter(|d| matcher.matches(d)).collect()
                },
                AggregationStage::Group { keys, accumulators } => group(&documents, &keys, &accumulators),
                AggregationStage::Sort(fields) => {
                    sort_documents(&mut documents, &fields);
                    documents
                },
                AggregationStage::Skip(n) => documents.into_iter().skip(n as usize).collect(),
                AggregationStage::Limit(n) => documents.into_iter().take(n as usize).collect(),
            };
        }

        Ok(stream::iter(documents.into_iter().map(Ok)).boxed())
    }

    async fn distinct_values(
        &self,
        collection: &str,
        path: &str,
        predicate: &Predicate,
    ) -> Result<Vec<String>, BackendError> {
        let values: BTreeSet<String> = self
            .matching(collection, predicate)?
            .iter()
            .flat_map(|doc| resolve(doc, path).into_iter().map(to_key_string).collect::<Vec<_>>())
            .collect();
        Ok(values.into_iter().collect())
    }

    async fn count(&self, collection: &str, predicate: &Predicate) -> Result<u64, BackendError> {
        Ok(self.matching(collection, predicate)?.len() as u64)
    }

    async fn health_check(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

/// A predicate with its regular expressions compiled
enum Matcher {
    All(Vec<Matcher>),
    Any(Vec<Matcher>),
    Equals { path: String, value: Value },
    Range {
        path: String,
        lower: Option<Bound>,
        upper: Option<Bound>,
    },
    Exists { path: String, present: bool },
    Regex { path: String, regex: Regex },
}

impl Matcher {
    fn compile(predicate: &Predicate) -> Result<Self, BackendError> {
        Ok(match predicate {
            Predicate::And(children) => {
                Matcher::All(children.iter().map(Matcher::compile).collect::<Result<_, _>>()?)
            },
            Predicate::Or(children) => {
                Matcher::Any(children.iter().map(Matcher::compile).collect::<Result<_, _>>()?)
            },
            Predicate::Leaf(condition) => {
                let path = condition.field.clone();
                match &condition.comparator {
                    Comparator::Equals { value } => Matcher::Equals {
                        path,
                        value: value.clone(),
                    },
                    Comparator::Range { lower, upper } => Matcher::Range {
                        path,
                        lower: lower.clone(),
                        upper: upper.clone(),
                    },
                    Comparator::Exists { present } => Matcher::Exists {
                        path,
                        present: *present,
                    },
                    Comparator::Regex {
                        pattern,
                        case_insensitive,
                    } => Matcher::Regex {
                        path,
                        regex: RegexBuilder::new(pattern)
                            .case_insensitive(*case_insensitive)
                            .build()
                            .map_err(|e| BackendError::Unsupported(format!("regex '{pattern}': {e}")))?,
                    },
                }
            },
        })
    }

    fn matches(&self, doc: &Document) -> bool {
        match self {
            Matcher::All(children) => children.iter().all(|m| m.matches(doc)),
            Matcher::Any(children) => children.iter().any(|m| m.matches(doc)),
            Matcher::Equals { path, value } => {
                resolve(doc, path).into_iter().any(|v| values_equal(v, value))
            },
            Matcher::Range { path, lower, upper } => resolve(doc, path).into_iter().any(|v| {
                lower.as_ref().map_or(true, |b| within(v, b, Ordering::Greater))
                    && upper.as_ref().map_or(true, |b| within(v, b, Ordering::Less))
            }),
            Matcher::Exists { path, present } => !resolve(doc, path).is_empty() == *present,
            Matcher::Regex { path, regex } => resolve(doc, path)
                .into_iter()
                .filter_map(Value::as_str)
                .any(|s| regex.is_match(s)),
        }
    }
}

/// Whether `value` lies on the `side` of `bound`, values of another JSON type never do
fn within(value: &Value, bound: &Bound, side: Ordering) -> bool {
    let comparable = matches!(
        (value, &bound.value),
        (Value::Number(_), Value::Number(_)) | (Value::String(_), Value::String(_))
    );
    if !comparable {
        return false;
    }
    match compare(value, &bound.value) {
        Ordering::Equal => bound.inclusive,
        ordering => ordering == side,
    }
}

fn sort_key(doc: &Document, path: &str) -> Value {
    resolve(doc, path).first().map_or(Value::Null, |v| (*v).clone())
}

fn sort_documents(documents: &mut [Document], fields: &[SortField]) {
    if fields.is_empty() {
        return;
    }
    documents.sort_by(|a, b| {
        for field in fields {
            let ordering = compare(&sort_key(a, &field.path), &sort_key(b, &field.path));
            let ordering = match field.order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// Distinct key tuples a document falls into; an absent key groups under null
fn key_tuples(doc: &Document, keys: &[String]) -> Vec<Vec<Value>> {
    let mut tuples: Vec<Vec<Value>> = vec![Vec::new()];
    for key in keys {
        let mut values: Vec<Value> = Vec::new();
        for value in resolve(doc, key) {
            if !values.contains(value) {
                values.push(value.clone());
            }
        }
        if values.is_empty() {
            values.push(Value::Null);
        }
        tuples = tuples
            .into_iter()
            .flat_map(|prefix| {
                values.iter().map(move |v| {
                    let mut tuple = prefix.clone();
                    tuple.push(v.clone());
                    tuple
                })
            })
            .collect();
    }
    tuples
}

fn group(documents: &[Document], keys: &[String], accumulators: &[Accumulator]) -> Vec<Document> {
    let mut order: Vec<Vec<Value>> = Vec::new();
    let mut buckets: HashMap<String, Vec<&Document>> = HashMap::new();

    for doc in documents {
        for tuple in key_tuples(doc, keys) {
            let id = Value::Array(tuple.clone()).to_string();
            let bucket = buckets.entry(id).or_insert_with(|| {
                order.push(tuple.clone());
                Vec::new()
            });
            bucket.push(doc);
        }
    }

    order
        .into_iter()
        .map(|tuple| {
            let members = buckets
                .get(&Value::Array(tuple.clone()).to_string())
                .map(Vec::as_slice)
                .unwrap_or_default();

            let mut id = Map::new();
            for (key, value) in keys.iter().zip(tuple) {
                id.insert(key.clone(), value);
            }

            let mut out = Map::new();
            out.insert("_id".to_string(), Value::Object(id));
            for accumulator in accumulators {
                match accumulator {
                    Accumulator::Count { output } => {
                        out.insert(output.clone(), Value::from(members.len()));
                    },
                    Accumulator::AddToSet { output, path } => {
                        let mut set: Vec<Value> = Vec::new();
                        for value in members.iter().flat_map(|d| resolve(d, path)) {
                            if !set.contains(value) {
                                set.push(value.clone());
                            }
                        }
                        out.insert(output.clone(), Value::Array(set));
                    },
                }
            }
            Value::Object(out)
        })
        .collect()
}

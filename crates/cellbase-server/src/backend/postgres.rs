//! Postgres document backend
//!
//! Each collection is a table `(id BIGSERIAL, document JSONB)`. Predicates
//! become `jsonb_path_exists` calls whose path expressions and values are
//! bound as parameters, so no user input is ever spliced into SQL.
//!
//! `find` and `aggregate` run the query on a spawned task that feeds a
//! bounded channel. The consumer pulls from the channel; dropping the stream
//! closes it, which stops the task and returns the connection to the pool.

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::document::project;
use super::{
    Accumulator, AggregationStage, DocumentBackend, DocumentStream, FindRequest, Projection,
    SortField, SortOrder,
};
use crate::config::DatabaseConfig;
use crate::error::BackendError;
use crate::predicate::{Comparator, Condition, Predicate};

/// Rows buffered between the database task and the consumer
pub const DEFAULT_CURSOR_BUFFER: usize = 64;

#[derive(Debug, Clone)]
pub struct PgDocumentBackend {
    pool: PgPool,
    cursor_buffer: usize,
}

impl PgDocumentBackend {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            cursor_buffer: DEFAULT_CURSOR_BUFFER,
        }
    }

    pub fn with_cursor_buffer(mut self, rows: usize) -> Self {
        self.cursor_buffer = rows.max(1);
        self
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, BackendError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await?;
        tracing::info!("Database connection pool established");
        Ok(Self::new(pool))
    }

    pub async fn run_migrations(&self) -> Result<(), BackendError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| BackendError::io(format!("Failed to run migrations: {e}")))?;
        tracing::info!("Database migrations completed");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run `query` on a background task and expose its rows as a stream
    fn stream_documents(&self, mut query: QueryBuilder<'static, Postgres>, projection: Projection) -> DocumentStream {
        let (tx, rx) = mpsc::channel(self.cursor_buffer);
        let pool = self.pool.clone();

        tokio::spawn(async move {
            let mut rows = query.build_query_scalar::<Json<Value>>().fetch(&pool);
            while let Some(row) = rows.next().await {
                let item = row
                    .map(|Json(doc)| project(doc, &projection))
                    .map_err(BackendError::from);
                let failed = item.is_err();
                if tx.send(item).await.is_err() {
                    tracing::trace!("Cursor released before exhaustion");
                    break;
                }
                if failed {
                    break;
                }
            }
        });

        ReceiverStream::new(rx).boxed()
    }
}

/// Collections map to tables; only plain lowercase identifiers are accepted
fn table(collection: &str) -> Result<String, BackendError> {
    let valid = !collection.is_empty()
        && collection
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(format!("\"{collection}\""))
    } else {
        Err(BackendError::UnknownCollection(collection.to_string()))
    }
}

/// `transcripts.biotype` -> `$."transcripts"."biotype"[*]`
fn json_path(path: &str) -> String {
    let mut out = String::from("$");
    for segment in path.split('.') {
        out.push_str(".\"");
        out.push_str(&escape_jsonpath_string(segment));
        out.push('"');
    }
    out.push_str("[*]");
    out
}

fn escape_jsonpath_string(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

fn text_path(path: &str) -> Vec<String> {
    path.split('.').map(str::to_string).collect()
}

fn push_predicate(qb: &mut QueryBuilder<'static, Postgres>, predicate: &Predicate) {
    match predicate {
        Predicate::And(children) | Predicate::Or(children) if children.is_empty() => {
            let empty = if matches!(predicate, Predicate::And(_)) { "TRUE" } else { "FALSE" };
            qb.push(empty);
        },
        Predicate::And(children) | Predicate::Or(children) => {
            let joiner = if matches!(predicate, Predicate::And(_)) { " AND " } else { " OR " };
            qb.push("(");
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    qb.push(joiner);
                }
                push_predicate(qb, child);
            }
            qb.push(")");
        },
        Predicate::Leaf(condition) => push_condition(qb, condition),
    }
}

fn push_condition(qb: &mut QueryBuilder<'static, Postgres>, condition: &Condition) {
    let path = json_path(&condition.field);
    let (negate, expression, vars) = match &condition.comparator {
        Comparator::Equals { value } => (false, format!("{path} ? (@ == $v)"), json!({ "v": value })),
        Comparator::Range { lower, upper } => {
            let mut tests = Vec::new();
            let mut vars = serde_json::Map::new();
            if let Some(bound) = lower {
                tests.push(if bound.inclusive { "@ >= $lo" } else { "@ > $lo" });
                vars.insert("lo".into(), bound.value.clone());
            }
            if let Some(bound) = upper {
                tests.push(if bound.inclusive { "@ <= $hi" } else { "@ < $hi" });
                vars.insert("hi".into(), bound.value.clone());
            }
            let expression = if tests.is_empty() {
                format!("{path} ? (@ != null)")
            } else {
                format!("{path} ? ({})", tests.join(" && "))
            };
            (false, expression, Value::Object(vars))
        },
        Comparator::Exists { present } => (!present, format!("{path} ? (@ != null)"), json!({})),
        Comparator::Regex {
            pattern,
            case_insensitive,
        } => {
            let flag = if *case_insensitive { " flag \"i\"" } else { "" };
            let expression = format!(
                "{path} ? (@ like_regex \"{}\"{flag})",
                escape_jsonpath_string(pattern)
            );
            (false, expression, json!({}))
        },
    };

    if negate {
        qb.push("NOT ");
    }
    qb.push("jsonb_path_exists(document, ");
    qb.push_bind(expression);
    qb.push("::jsonpath, ");
    qb.push_bind(Json(vars));
    qb.push("::jsonb)");
}

fn push_order(qb: &mut QueryBuilder<'static, Postgres>, sort: &[SortField]) {
    for (i, field) in sort.iter().enumerate() {
        qb.push(if i == 0 { " ORDER BY " } else { ", " });
        qb.push("document #> ");
        qb.push_bind(text_path(&field.path));
        qb.push("::text[]");
        qb.push(match field.order {
            SortOrder::Ascending => " ASC NULLS LAST",
            SortOrder::Descending => " DESC NULLS LAST",
        });
    }
}

fn push_paging(qb: &mut QueryBuilder<'static, Postgres>, skip: Option<u64>, limit: Option<u64>) {
    if let Some(limit) = limit {
        qb.push(" LIMIT ");
        qb.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    }
    if let Some(skip) = skip {
        qb.push(" OFFSET ");
        qb.push_bind(i64::try_from(skip).unwrap_or(i64::MAX));
    }
}

fn find_query(request: &FindRequest) -> Result<QueryBuilder<'static, Postgres>, BackendError> {
    let mut qb = QueryBuilder::new("SELECT document FROM ");
    qb.push(table(&request.collection)?);
    qb.push(" WHERE ");
    push_predicate(&mut qb, &request.predicate);
    push_order(&mut qb, &request.sort);
    qb.push(if request.sort.is_empty() { " ORDER BY id" } else { ", id" });
    push_paging(&mut qb, request.skip, request.limit);
    Ok(qb)
}

/// The pipeline shapes this backend can express in SQL
struct AggregatePlan {
    filter: Vec<Predicate>,
    group: Option<(Vec<String>, Vec<Accumulator>)>,
    sort: Vec<SortField>,
    skip: Option<u64>,
    limit: Option<u64>,
}

impl AggregatePlan {
    fn from_stages(stages: Vec<AggregationStage>) -> Result<Self, BackendError> {
        let mut plan = Self {
            filter: Vec::new(),
            group: None,
            sort: Vec::new(),
            skip: None,
            limit: None,
        };
        let unsupported = |what: &str| Err(BackendError::Unsupported(format!("{what} in aggregation")));

        for stage in stages {
            let shaped = !plan.sort.is_empty() || plan.skip.is_some() || plan.limit.is_some();
            match stage {
                AggregationStage::Match(predicate) if plan.group.is_none() && !shaped => {
                    plan.filter.push(predicate)
                },
                AggregationStage::Match(_) => return unsupported("match after group or paging"),
                AggregationStage::Group { keys, accumulators } if plan.group.is_none() && !shaped => {
                    plan.group = Some((keys, accumulators))
                },
                AggregationStage::Group { .. } => return unsupported("second group or group after paging"),
                AggregationStage::Sort(fields) => plan.sort.extend(fields),
                AggregationStage::Skip(n) if plan.limit.is_none() => {
                    plan.skip = Some(plan.skip.unwrap_or(0) + n)
                },
                AggregationStage::Skip(_) => return unsupported("skip after limit"),
                AggregationStage::Limit(n) => plan.limit = Some(plan.limit.map_or(n, |l| l.min(n))),
            }
        }
        Ok(plan)
    }

    fn into_query(self, collection: &str) -> Result<QueryBuilder<'static, Postgres>, BackendError> {
        let predicate = Predicate::and(self.filter);
        let Some((keys, accumulators)) = self.group else {
            let mut request = FindRequest::new(collection, predicate);
            request.sort = self.sort;
            request.skip = self.skip;
            request.limit = self.limit;
            return find_query(&request);
        };

        let mut qb = QueryBuilder::new("SELECT document FROM (SELECT jsonb_build_object('_id', jsonb_build_object(");
        for (i, key) in keys.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push_bind(key.clone());
            qb.push(format!("::text, k{i}.v"));
        }
        qb.push(")");
        for (i, accumulator) in accumulators.iter().enumerate() {
            match accumulator {
                Accumulator::Count { output } => {
                    qb.push(", ");
                    qb.push_bind(output.clone());
                    qb.push("::text, COUNT(DISTINCT d.id)");
                },
                Accumulator::AddToSet { output, .. } => {
                    qb.push(", ");
                    qb.push_bind(output.clone());
                    qb.push(format!(
                        "::text, COALESCE(jsonb_agg(DISTINCT a{i}.v) FILTER (WHERE a{i}.v IS NOT NULL), '[]'::jsonb)"
                    ));
                },
            }
        }
        qb.push(") AS document FROM ");
        qb.push(table(collection)?);
        qb.push(" d");
        for (i, key) in keys.iter().enumerate() {
            qb.push(" LEFT JOIN LATERAL jsonb_path_query(d.document, ");
            qb.push_bind(json_path(key));
            qb.push(format!("::jsonpath) AS k{i}(v) ON TRUE"));
        }
        for (i, accumulator) in accumulators.iter().enumerate() {
            if let Accumulator::AddToSet { path, .. } = accumulator {
                qb.push(" LEFT JOIN LATERAL jsonb_path_query(d.document, ");
                qb.push_bind(json_path(path));
                qb.push(format!("::jsonpath) AS a{i}(v) ON TRUE"));
            }
        }
        qb.push(" WHERE ");
        push_predicate(&mut qb, &predicate);
        qb.push(" GROUP BY ");
        let group_columns: Vec<String> = (0..keys.len()).map(|i| format!("k{i}.v")).collect();
        qb.push(group_columns.join(", "));
        qb.push(") buckets");
        push_order(&mut qb, &self.sort);
        push_paging(&mut qb, self.skip, self.limit);
        Ok(qb)
    }
}

#[async_trait]
impl DocumentBackend for PgDocumentBackend {
    fn name(&self) -> &'static str {
        "postgres"
    }

    #[tracing::instrument(skip(self, request), fields(collection = %request.collection))]
    async fn find(&self, request: FindRequest) -> Result<DocumentStream, BackendError> {
        let query = find_query(&request)?;
        Ok(self.stream_documents(query, request.projection))
    }

    #[tracing::instrument(skip(self, stages))]
    async fn aggregate(
        &self,
        collection: &str,
        stages: Vec<AggregationStage>,
    ) -> Result<DocumentStream, BackendError> {
        let query = AggregatePlan::from_stages(stages)?.into_query(collection)?;
        Ok(self.stream_documents(query, Projection::default()))
    }

    #[tracing::instrument(skip(self, predicate))]
    async fn distinct_values(
        &self,
        collection: &str,
        path: &str,
        predicate: &Predicate,
    ) -> Result<Vec<String>, BackendError> {
        let mut qb = QueryBuilder::new("SELECT DISTINCT value FROM (SELECT jsonb_path_query(document, ");
        qb.push_bind(json_path(path));
        qb.push("::jsonpath) #>> '{}' AS value FROM ");
        qb.push(table(collection)?);
        qb.push(" WHERE ");
        push_predicate(&mut qb, predicate);
        qb.push(") v WHERE value IS NOT NULL ORDER BY value");

        Ok(qb.build_query_scalar::<String>().fetch_all(&self.pool).await?)
    }

    #[tracing::instrument(skip(self, predicate))]
    async fn count(&self, collection: &str, predicate: &Predicate) -> Result<u64, BackendError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM ");
        qb.push(table(collection)?);
        qb.push(" WHERE ");
        push_predicate(&mut qb, predicate);

        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn health_check(&self) -> Result<(), BackendError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

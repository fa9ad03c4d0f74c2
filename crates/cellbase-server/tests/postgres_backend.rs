//! Engine behaviour against the PostgreSQL document backend
//!
//! Every test starts its own PostgreSQL container, applies the migrations
//! and seeds the fixture collections, then checks that the SQL translation
//! answers the same way the in-memory backend does.
//!
//! Run with:
//! ```bash
//! cargo test -p cellbase-server --test postgres_backend -- --ignored
//! ```

use anyhow::{Context, Result};
use axum::{http::StatusCode, Router};
use cellbase_common::{LogicalList, Region, VariantSpec};
use cellbase_server::{
    backend::{PgDocumentBackend, SharedBackend},
    config::QueryConfig,
    engine::EntityManager,
    models::{Entity, Gene, OntologyTerm, Variant},
    query::{EntityQuery, GeneQuery, OntologyQuery, QueryOptions, VariantQuery},
    result::UNKNOWN_COUNT,
};
use serde_json::{json, Value};
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool, QueryBuilder};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use testcontainers::{core::IntoContainerPort, runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;

mod helpers;
use helpers::*;

/// Seeded PostgreSQL container
///
/// The container is stopped when this value is dropped.
struct TestPostgres {
    _container: ContainerAsync<Postgres>,
    backend: SharedBackend,
}

impl TestPostgres {
    async fn start() -> Result<Self> {
        let container = Postgres::default()
            .with_tag("16-alpine")
            .start()
            .await
            .context("Failed to start PostgreSQL container")?;
        let host = container.get_host().await.context("Failed to get container host")?;
        let port = container
            .get_host_port_ipv4(5432.tcp())
            .await
            .context("Failed to get container port")?;

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&format!("postgresql://postgres:postgres@{host}:{port}/postgres"))
            .await
            .context("Failed to connect to PostgreSQL")?;

        let backend = PgDocumentBackend::new(pool);
        backend.run_migrations().await?;
        seed(backend.pool(), "gene", genes()).await?;
        seed(backend.pool(), "transcript", transcripts()).await?;
        seed(backend.pool(), "variant", variants()).await?;
        seed(backend.pool(), "ontology", ontology_terms()).await?;

        Ok(Self {
            _container: container,
            backend: Arc::new(backend),
        })
    }

    fn manager<E: Entity>(&self) -> EntityManager<E> {
        manager_on(Arc::clone(&self.backend))
    }

    fn app(&self) -> Router {
        test_app_with(Arc::clone(&self.backend), QueryConfig::default())
    }
}

async fn seed(pool: &PgPool, collection: &str, documents: Vec<Value>) -> Result<()> {
    let mut qb = QueryBuilder::<sqlx::Postgres>::new(format!("INSERT INTO \"{collection}\" (document) "));
    qb.push_values(documents, |mut row, document| {
        row.push_bind(Json(document));
    });
    qb.build()
        .execute(pool)
        .await
        .with_context(|| format!("Failed to seed {collection}"))?;
    Ok(())
}

fn gene_ids(results: &[Gene]) -> Vec<String> {
    results.iter().filter_map(|g| g.id.clone()).collect()
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_search_filters_and_counts() {
    let pg = TestPostgres::start().await.unwrap();
    let genes = pg.manager::<Gene>();

    let counted = GeneQuery {
        biotypes: LogicalList::any_of(vec!["protein_coding".into()]),
        ..Default::default()
    }
    .with_options(QueryOptions {
        count: true,
        limit: Some(1),
        ..Default::default()
    });
    let result = genes.search(&counted).await.unwrap();
    assert_eq!(result.num_results(), 1);
    assert_eq!(result.num_total_results(), 3);

    let all = genes.search(&GeneQuery::default()).await.unwrap();
    assert_eq!(all.num_results(), helpers::genes().len());
    assert_eq!(all.num_total_results(), UNKNOWN_COUNT);

    let page = genes
        .search(&GeneQuery::default().with_options(QueryOptions::default().with_skip(1).with_limit(2)))
        .await
        .unwrap();
    assert_eq!(page.results(), &all.results()[1..3]);

    let (_, any) = get_json(pg.app(), "/api/v1/feature/gene/search?name=BRCA1,TP53").await;
    assert_eq!(any["responses"][0]["numResults"], 2);
    let (_, both) = get_json(
        pg.app(),
        "/api/v1/feature/gene/search?transcripts.biotype=protein_coding;nonsense_mediated_decay",
    )
    .await;
    assert_eq!(both["responses"][0]["results"][0]["name"], "BRCA1");
    assert_eq!(both["responses"][0]["numResults"], 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_region_bounds_and_merge() {
    let pg = TestPostgres::start().await.unwrap();
    let genes = pg.manager::<Gene>();

    let touching = genes
        .get_by_region(&GeneQuery::default(), "17:7687550-7700000".parse().unwrap())
        .await
        .unwrap();
    assert_eq!(gene_ids(touching.results()), ["ENSG00000141510"]);
    let past = genes
        .get_by_region(&GeneQuery::default(), "17:7687551-7700000".parse().unwrap())
        .await
        .unwrap();
    assert_eq!(past.num_results(), 0);
    let whole = genes
        .get_by_region(&GeneQuery::default(), "17".parse().unwrap())
        .await
        .unwrap();
    assert_eq!(whole.num_results(), 3);

    let regions = Region::parse_list("17:7000000-8000000,17:43000000-44000000,2:1-100").unwrap();
    let split = genes
        .get_by_regions(&GeneQuery::default(), regions.clone())
        .await
        .unwrap();
    let merged = genes
        .get_by_regions(
            &GeneQuery::default().with_options(QueryOptions {
                merge: true,
                ..Default::default()
            }),
            regions,
        )
        .await
        .unwrap();
    let union: BTreeSet<String> = split.iter().flat_map(|r| gene_ids(r.results())).collect();
    let merged_ids: BTreeSet<String> = gene_ids(merged[0].results()).into_iter().collect();
    assert_eq!(merged.len(), 1);
    assert_eq!(merged_ids, union);
    assert_eq!(union.len(), 2);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_variant_matching() {
    let pg = TestPostgres::start().await.unwrap();
    let variants = pg.manager::<Variant>();

    let inputs = VariantSpec::parse_list(
        "1:230710048:A:G,\
         1:1000500<1000000..1001000>-2000500<2000000..2001000>:N:<CN0>,\
         1:5000000-6000000:N:<CN3>,\
         1:1001000<1001000..1002000>-2000000:N:<CN0>,\
         1:1001001<1001001..1002000>-2000000:N:<CN0>",
    )
    .unwrap();
    let results = variants
        .get_by_variants(&VariantQuery::default(), inputs)
        .await
        .unwrap();

    assert_eq!(results[0].results()[0].id.as_deref(), Some("rs699"));
    assert!(results[0].results().iter().all(|v| v.sv.is_none()));
    for result in &results[1..4] {
        assert_eq!(result.num_results(), 1, "{}", result.id());
        assert!(result.results().iter().all(|v| v.sv.is_some()));
    }
    assert_eq!(results[4].num_results(), 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_info_resolves_identifiers_in_order() {
    let pg = TestPostgres::start().await.unwrap();

    let ids: Vec<String> = ["TP53", "unknown", "BRCA2", "ENST00000357654"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let genes = pg
        .manager::<Gene>()
        .info(&GeneQuery::default(), ids.clone())
        .await
        .unwrap();
    let returned: Vec<&str> = genes.iter().map(|r| r.id()).collect();
    assert_eq!(returned, ids);
    assert_eq!(genes[1].num_results(), 0);
    assert_eq!(gene_ids(genes[2].results()), ["ENSG00000139618"]);
    assert_eq!(gene_ids(genes[3].results()), ["ENSG00000012048"]);

    let terms = pg
        .manager::<OntologyTerm>()
        .info(
            &OntologyQuery::default(),
            vec!["HP:0000118".into(), "cellular process".into()],
        )
        .await
        .unwrap();
    assert_eq!(terms[0].results()[0].name.as_deref(), Some("Phenotypic abnormality"));
    assert_eq!(terms[1].results()[0].id.as_deref(), Some("GO:0009987"));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_aggregations() {
    let pg = TestPostgres::start().await.unwrap();

    let (status, json) = get_json(pg.app(), "/api/v1/feature/gene/groupby?fields=biotype").await;
    assert_eq!(status, StatusCode::OK);
    let top = &json["responses"][0]["results"][0];
    assert_eq!(top["_id"]["biotype"], "protein_coding");
    assert_eq!(top["count"], 3);
    assert_eq!(top["name"].as_array().unwrap().len(), 3);

    let (status, json) = get_json(
        pg.app(),
        "/api/v1/feature/gene/aggregationStats?fields=chromosome",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let buckets = &json["responses"][0]["results"][0]["buckets"];
    assert_eq!(buckets[0]["value"], "17");
    assert_eq!(buckets[0]["count"], 3);

    let (status, json) = get_json(
        pg.app(),
        "/api/v1/feature/ontology/distinct?field=namespace&source=GO",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["responses"][0]["results"], json!(["biological_process"]));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_projection_and_streaming() {
    let pg = TestPostgres::start().await.unwrap();
    let genes = pg.manager::<Gene>();

    let projected = genes
        .search(&GeneQuery::default().with_options(QueryOptions {
            include: vec!["id".into(), "transcripts.id".into()],
            ..Default::default()
        }))
        .await
        .unwrap();
    let brca1 = projected
        .results()
        .iter()
        .find(|g| g.id.as_deref() == Some("ENSG00000012048"))
        .unwrap();
    let transcript_ids: Vec<_> = brca1.transcripts.iter().filter_map(|t| t.id.as_deref()).collect();
    assert_eq!(transcript_ids, ["ENST00000357654", "ENST00000461221"]);
    assert!(brca1.name.is_none());

    let query = GeneQuery::default().with_options(QueryOptions::default().with_limit(3));
    let streamed = genes.iterator(&query).unwrap().collect_all().await.unwrap();
    assert_eq!(streamed, genes.search(&query).await.unwrap().into_results());

    let (status, json) = get_json(pg.app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["backend"], "postgres");
}

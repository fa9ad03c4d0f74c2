//! Router tests driven through `tower::ServiceExt::oneshot`
//!
//! These tests verify:
//! - Health check reflects backend reachability
//! - Query parameters become typed queries (dot and camel case)
//! - Envelopes are wrapped in the query response shape
//! - Build errors map to 400 and backend errors to 502

use axum::http::StatusCode;
use cellbase_server::{config::QueryConfig, models::GENE_SCHEMA};

mod helpers;
use helpers::*;

#[tokio::test]
async fn test_health_check() {
    let (status, json) = get_json(test_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["backend"], "memory");

    let app = test_app_with(FailingBackend::shared("x"), QueryConfig::default());
    let (status, _) = get_json(app, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_search_with_count() {
    let (status, json) = get_json(
        test_app(),
        "/api/v1/feature/gene/search?biotype=protein_coding&count=true&limit=2",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let response = &json["responses"][0];
    assert_eq!(response["numResults"], 2);
    assert_eq!(response["numTotalResults"], 3);
    assert_eq!(response["results"].as_array().unwrap().len(), 2);
    assert_eq!(json["params"]["biotype"], "protein_coding");
    assert_eq!(json["params"]["species"], "hsapiens");
}

#[tokio::test]
async fn test_search_accepts_camel_case_and_dot_keys() {
    for uri in [
        "/api/v1/feature/gene/search?transcriptsBiotype=miRNA",
        "/api/v1/feature/gene/search?transcripts.biotype=miRNA",
    ] {
        let (status, json) = get_json(test_app(), uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(json["responses"][0]["results"][0]["name"], "MIR21");
    }
}

#[tokio::test]
async fn test_and_or_lists() {
    let (_, any) = get_json(test_app(), "/api/v1/feature/gene/search?name=BRCA1,TP53").await;
    assert_eq!(any["responses"][0]["numResults"], 2);

    let (_, all) = get_json(
        test_app(),
        "/api/v1/feature/gene/search?transcripts.biotype=protein_coding;nonsense_mediated_decay",
    )
    .await;
    assert_eq!(all["responses"][0]["numResults"], 1);
    assert_eq!(all["responses"][0]["results"][0]["name"], "BRCA1");
}

#[tokio::test]
async fn test_unknown_parameter_is_rejected() {
    let (status, json) = get_json(test_app(), "/api/v1/feature/gene/search?colour=blue").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"]["details"]["field"], "colour");
    assert_eq!(json["error"]["details"]["entity"], "gene");
}

#[tokio::test]
async fn test_limit_is_capped() {
    let config = QueryConfig {
        max_limit: 2,
        ..QueryConfig::default()
    };
    let app = test_app_with(shared_backend(), config);
    let (_, json) = get_json(app, "/api/v1/feature/gene/search?limit=100").await;
    assert_eq!(json["responses"][0]["numResults"], 2);
}

#[tokio::test]
async fn test_first() {
    let (status, json) = get_json(test_app(), "/api/v1/feature/transcript/first").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["responses"][0]["numResults"], 1);
}

#[tokio::test]
async fn test_info_returns_one_envelope_per_id() {
    let (status, json) = get_json(test_app(), "/api/v1/feature/gene/BRCA2,TP53,NOPE/info").await;
    assert_eq!(status, StatusCode::OK);

    let responses = json["responses"].as_array().unwrap();
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["id"], "BRCA2");
    assert_eq!(responses[1]["results"][0]["id"], "ENSG00000141510");
    assert_eq!(responses[2]["numResults"], 0);
}

#[tokio::test]
async fn test_info_with_failing_element() {
    let app = test_app_with(FailingBackend::shared("rs-broken"), QueryConfig::default());
    let (status, json) =
        get_json(app, "/api/v1/genomic/variant/rs699,rs6025,rs-broken,rs113488022,rs0/info").await;
    assert_eq!(status, StatusCode::OK);

    let responses = json["responses"].as_array().unwrap();
    assert_eq!(responses.len(), 5);
    assert_eq!(responses[2]["events"][0]["type"], "ERROR");
    assert_eq!(responses[2]["events"][0]["index"], 2);
    assert_eq!(responses[2]["events"][0]["entity"], "variant");
    assert_eq!(responses[3]["results"][0]["id"], "rs113488022");
}

#[tokio::test]
async fn test_backend_failure_maps_to_bad_gateway() {
    let app = test_app_with(FailingBackend::shared(""), QueryConfig::default());
    let (status, json) = get_json(app, "/api/v1/feature/gene/search").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"]["code"], "BACKEND_ERROR");
}

#[tokio::test]
async fn test_group_by() {
    let (status, json) = get_json(test_app(), "/api/v1/feature/gene/groupby?fields=biotype").await;
    assert_eq!(status, StatusCode::OK);

    let top = &json["responses"][0]["results"][0];
    assert_eq!(top["_id"]["biotype"], "protein_coding");
    assert_eq!(top["count"], 3);
    assert_eq!(top["name"].as_array().unwrap().len(), 3);

    let (status, _) = get_json(test_app(), "/api/v1/feature/gene/groupby").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_aggregation_stats() {
    let (status, json) = get_json(
        test_app(),
        "/api/v1/feature/gene/aggregationStats?fields=chromosome,biotype",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let stats = json["responses"][0]["results"].as_array().unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0]["name"], "chromosome");
    assert_eq!(stats[0]["buckets"][0]["value"], "17");
    assert_eq!(stats[0]["buckets"][0]["count"], 3);

    let (status, _) = get_json(
        test_app(),
        "/api/v1/feature/ontology/aggregationStats?fields=namespace",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_distinct() {
    let (status, json) = get_json(
        test_app(),
        "/api/v1/feature/ontology/distinct?field=namespace&source=GO",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["responses"][0]["results"],
        serde_json::json!(["biological_process"])
    );

    let (status, json) = get_json(test_app(), "/api/v1/feature/gene/distinct").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["details"]["field"], "field");
}

#[tokio::test]
async fn test_model_lists_queryable_fields() {
    let (status, json) = get_json(test_app(), "/api/v1/feature/gene/model").await;
    assert_eq!(status, StatusCode::OK);

    let fields = json["responses"][0]["results"].as_array().unwrap();
    assert_eq!(fields.len(), GENE_SCHEMA.fields.len());
    let biotype = fields.iter().find(|f| f["param"] == "transcriptsBiotype").unwrap();
    assert_eq!(biotype["comparator"], "EQUALS");
    let start = fields.iter().find(|f| f["name"] == "start").unwrap();
    assert_eq!(start["comparator"], "RANGE");
}

#[tokio::test]
async fn test_region_routes() {
    let (status, json) =
        get_json(test_app(), "/api/v1/genomic/region/17:7000000-8000000,13/gene").await;
    assert_eq!(status, StatusCode::OK);
    let responses = json["responses"].as_array().unwrap();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["results"][0]["name"], "TP53");
    assert_eq!(responses[1]["results"][0]["name"], "BRCA2");

    let (_, merged) = get_json(
        test_app(),
        "/api/v1/genomic/region/17:7000000-8000000,13/gene?merge=true",
    )
    .await;
    assert_eq!(merged["responses"].as_array().unwrap().len(), 1);
    assert_eq!(merged["responses"][0]["numResults"], 2);

    let (status, _) = get_json(test_app(), "/api/v1/genomic/region/1:500-100/gene").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_variant_match_and_labels() {
    let (status, json) = get_json(
        test_app(),
        "/api/v1/genomic/variant/1:230710048:A:G,7:140753336:A:C/match",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["responses"][0]["results"][0]["id"], "rs699");
    assert_eq!(json["responses"][1]["numResults"], 0);

    let (status, json) = get_json(test_app(), "/api/v1/genomic/variant/labels/types").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["responses"][0]["id"], "variant_types");
    assert_eq!(
        json["responses"][0]["results"],
        serde_json::json!(["SNV", "MNV", "INDEL", "CNV"])
    );

    let (status, _) = get_json(test_app(), "/api/v1/genomic/variant/1:abc:A:G/match").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = get_json(
        test_app(),
        "/api/v1/genomic/variant/1:9223372036854775807:AA:T/match",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_gene_sub_resources() {
    let (status, json) = get_json(test_app(), "/api/v1/feature/gene/BRCA2,NOPE/transcript").await;
    assert_eq!(status, StatusCode::OK);
    let responses = json["responses"].as_array().unwrap();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], "BRCA2");
    assert_eq!(responses[0]["results"][0]["id"], "ENST00000380152");
    assert_eq!(responses[1]["numResults"], 0);

    let (status, json) = get_json(test_app(), "/api/v1/feature/gene/BRCA1/tfbs").await;
    assert_eq!(status, StatusCode::OK);
    let gene = &json["responses"][0]["results"][0];
    assert_eq!(gene["name"], "BRCA1");
    assert_eq!(gene["transcripts"][0]["tfbs"][0]["id"], "MA0139.1");
    assert!(gene["transcripts"][0].get("xrefs").is_none());
    assert!(gene.get("annotation").is_none());
}

#[tokio::test]
async fn test_transcript_sequence() {
    let (status, json) = get_json(
        test_app(),
        "/api/v1/feature/transcript/ENST00000269305,ENST00000461221,ENST00000357654/sequence",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let responses = json["responses"].as_array().unwrap();
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["id"], "ENST00000269305");
    assert_eq!(responses[0]["results"], serde_json::json!(["ATGGAGGAGCCGCAGTCAGATCCTAGC"]));
    assert_eq!(responses[1]["numResults"], 0);
    assert_eq!(responses[2]["results"][0], "ATGGATTTATCTGCTCTTCGCGTTGAAGAAG");
}

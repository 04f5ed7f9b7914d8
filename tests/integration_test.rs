//! Runs against a live pgstac database. Start one with e.g.
//!
//!   docker run -e POSTGRES_DB=postgis -e POSTGRES_USER=username \
//!     -e POSTGRES_PASSWORD=password -p 5439:5432 ghcr.io/stac-utils/pgstac:v0.8.2
//!
//! and run `cargo test -- --ignored`.
use std::sync::Arc;

use pgstac_concurrenttest::config::{self, get_config};
use pgstac_concurrenttest::errors::Error;
use pgstac_concurrenttest::fanout;
use pgstac_concurrenttest::server::{SearchBackend, Server};

pub const BASE_CONFIG: &str = "./pgstac.toml";

async fn connect() -> Arc<Server> {
    config::parse(BASE_CONFIG).await.unwrap();
    Arc::new(Server::connect(&get_config().database).await.unwrap())
}

#[tokio::test]
#[ignore = "needs a running pgstac database"]
async fn test_concurrent_search() {
    let server = connect().await;
    let config = get_config();

    let summary = fanout::run(server, &config.search.query, config.search.workers)
        .await
        .unwrap();

    assert_eq!(summary.workers, 12);
}

#[tokio::test]
#[ignore = "needs a running pgstac database"]
async fn test_search_returns_json() {
    let server = connect().await;

    let item = server
        .search(&get_config().search.query)
        .await
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&item).unwrap();
    assert!(parsed.is_object());
}

#[tokio::test]
#[ignore = "needs a running pgstac database"]
async fn test_bad_query_is_fatal() {
    let server = connect().await;

    match fanout::run(server, "SELECT search('not json'::jsonb);", 4).await {
        Err(Error::QueryError(_)) => (),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
#[ignore = "needs a running pgstac database"]
async fn test_unreadable_result_is_fatal() {
    let server = connect().await;

    for query in ["SELECT NULL::jsonb;", "SELECT 1;"] {
        match fanout::run(server.clone(), query, 2).await {
            Err(Error::DecodeError(_)) => (),
            other => panic!("{}: unexpected result: {:?}", query, other),
        }
    }
}

#[tokio::test]
#[ignore = "needs a running pgstac database"]
async fn test_extra_rows_are_ignored() {
    let server = connect().await;

    let item = server
        .search(r#"SELECT '{"n": 1}'::jsonb UNION ALL SELECT '{"n": 2}'::jsonb;"#)
        .await
        .unwrap();
    assert_eq!(item, r#"{"n": 1}"#);

    match server.search("SELECT '{}'::jsonb WHERE false;").await {
        Err(Error::DecodeError(_)) => (),
        other => panic!("unexpected result: {:?}", other),
    }
}

//! Tests for the client facade

use super::*;
use crate::args::Arguments;
use crate::auth::Location;
use crate::error::Error;
use crate::http::{CountingTransport, PreparedRequest, RawResponse, Transport};
use crate::schema::{SchemaSource, BUNDLED_SCHEMA};
use crate::types::CacheBackend;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

/// Transport answering each request with a function of the request
struct FnTransport<F>(F);

#[async_trait]
impl<F> Transport for FnTransport<F>
where
    F: Fn(&PreparedRequest) -> RawResponse + Send + Sync,
{
    async fn send(&self, request: &PreparedRequest) -> crate::Result<RawResponse> {
        Ok((self.0)(request))
    }
}

fn query<'a>(req: &'a PreparedRequest, name: &str) -> Option<&'a str> {
    req.query
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn lmp_body(req: &PreparedRequest) -> RawResponse {
    let start = query(req, "start").unwrap_or("2022-01-01T00:00:00");
    RawResponse::new(
        200,
        json!([
            {"timestamp": start, "node": "HB_NORTH", "lmp": 20.0},
            {"timestamp": start, "node": "HB_WEST", "lmp": 21.0}
        ])
        .to_string(),
    )
}

fn memory_config() -> ClientConfig {
    ClientConfig::builder("test-key")
        .host("https://api.isostream.test")
        .cache_backend(CacheBackend::Memory)
        .build()
        .unwrap()
}

async fn client_with<T: Transport + 'static>(config: ClientConfig, transport: Arc<T>) -> IsoStream {
    IsoStream::with_transport(config, transport).await.unwrap()
}

fn dalmp_args() -> Arguments {
    Arguments::new()
        .arg("iso", "ercot")
        .arg("nodes", "HB_NORTH,HB_WEST")
        .arg("start", "2022-01-01")
        .arg("end", "2022-01-02")
}

fn at(d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2022, 1, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_client_config_defaults() {
    let config = ClientConfig::new("k");
    assert_eq!(config.host, DEFAULT_HOST);
    assert!(config.use_cache);
    assert_eq!(config.cache_backend, CacheBackend::File);
    assert_eq!(config.cache_name, "isostream_cache");
    assert_eq!(config.timeout, std::time::Duration::from_secs(30));
    assert_eq!(config.auth_location, Location::Header);
    assert_eq!(config.schema, SchemaSource::Bundled);
    assert!(config.expire_after.is_none());
    assert!(!config.verbose);
}

#[test]
fn test_client_config_builder() {
    let config = ClientConfig::builder("k")
        .host("http://localhost:8000/api")
        .use_cache(false)
        .cache_name("other")
        .expire_after(Duration::hours(1))
        .auth_location(Location::Query)
        .user_agent("")
        .verbose(true)
        .build()
        .unwrap();

    assert_eq!(config.base_url().unwrap().as_str(), "http://localhost:8000/api");
    assert!(!config.use_cache);
    assert_eq!(config.cache_name, "other");
    assert_eq!(config.expire_after, Some(Duration::hours(1)));
    assert_eq!(config.auth().query_param(), Some("api_key"));
    assert!(config.user_agent.is_none());
    assert!(config.verbose);
}

#[test]
fn test_client_config_rejects_bad_host() {
    let err = ClientConfig::builder("k").host("not a url").build().unwrap_err();
    assert!(matches!(err, Error::Config { .. }));

    let err = ClientConfig::builder("k").host("ftp://x.test").build().unwrap_err();
    assert!(err.to_string().contains("http(s)"));
}

#[test]
fn test_client_config_debug_hides_key() {
    let rendered = format!("{:?}", ClientConfig::new("very-secret"));
    assert!(!rendered.contains("very-secret"));
}

#[test]
fn test_call_options() {
    assert_eq!(
        CallOptions::default(),
        CallOptions {
            as_table: true,
            pivot: true
        }
    );
    assert!(!CallOptions::raw().as_table);
    assert!(CallOptions::no_pivot().as_table);
    assert!(!CallOptions::no_pivot().pivot);
}

// ============================================================================
// Discovery Tests
// ============================================================================

#[tokio::test]
async fn test_api_methods_lists_every_operation_once() {
    let client = client_with(memory_config(), Arc::new(FnTransport(lmp_body))).await;
    let names = client.api_methods(None);

    let mut expected: Vec<String> = client
        .schema()
        .names()
        .into_iter()
        .map(String::from)
        .collect();
    expected.sort();
    assert_eq!(names, expected);
    assert!(names.contains(&"dalmp_node".to_string()));
}

#[tokio::test]
async fn test_api_methods_filter_is_case_insensitive() {
    let client = client_with(memory_config(), Arc::new(FnTransport(lmp_body))).await;
    let all = client.api_methods(None);
    let filtered = client.api_methods(Some("DALMP"));

    assert_eq!(filtered, vec!["dalmp_node", "dalmp_zone"]);
    assert!(filtered.iter().all(|n| all.contains(n)));
    assert!(client.api_methods(Some("no-such")).is_empty());
}

#[tokio::test]
async fn test_describe() {
    let client = client_with(memory_config(), Arc::new(FnTransport(lmp_body))).await;
    let docs = client.describe("dalmp_node").unwrap();

    assert!(docs.starts_with("Wrapper method for API call to /dalmp/node"));
    assert!(docs.contains("iso : string, caiso,ercot,isone,miso,nyiso,pjm,spp, required = true"));
    assert!(docs.contains("start : datetime, required = true"));
    assert!(docs.contains("as_table : bool, default = true"));
    assert!(!docs.contains("api_key"));
    assert!(client.describe("nope").is_none());
}

// ============================================================================
// Call Tests
// ============================================================================

#[tokio::test]
async fn test_unknown_method() {
    let client = client_with(memory_config(), Arc::new(FnTransport(lmp_body))).await;
    let err = client
        .call("dalmp_nodes", &dalmp_args(), CallOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownMethod { ref name } if name == "dalmp_nodes"));
}

#[tokio::test]
async fn test_raw_rows_match_table_source() {
    let client = client_with(memory_config(), Arc::new(FnTransport(lmp_body))).await;

    let rows = client
        .call("dalmp_node", &dalmp_args(), CallOptions::raw())
        .await
        .unwrap()
        .into_rows()
        .unwrap();
    let table = client
        .call("dalmp_node", &dalmp_args(), CallOptions::no_pivot())
        .await
        .unwrap()
        .into_table()
        .unwrap();

    assert_eq!(rows.len(), table.num_rows());
    assert_eq!(table.to_json_rows().unwrap(), rows);
}

#[tokio::test]
async fn test_call_pivots_by_default() {
    let client = client_with(memory_config(), Arc::new(FnTransport(lmp_body))).await;
    let output = client
        .call("dalmp_node", &dalmp_args(), CallOptions::default())
        .await
        .unwrap();

    let table = output.as_table().unwrap();
    assert!(table.is_pivoted());
    assert_eq!(table.column_names(), vec!["timestamp", "HB_NORTH", "HB_WEST"]);
    assert_eq!(output.len(), 1);
}

#[tokio::test]
async fn test_cached_call_skips_transport() {
    let transport = Arc::new(CountingTransport::new(FnTransport(lmp_body)));
    let client = client_with(memory_config(), transport.clone()).await;

    client.call_rows("dalmp_node", &dalmp_args()).await.unwrap();
    client.call_rows("dalmp_node", &dalmp_args()).await.unwrap();
    assert_eq!(transport.calls(), 1);

    // Equivalent date forms share a cache entry
    let typed = dalmp_args().arg("start", NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
    client.call_rows("dalmp_node", &typed).await.unwrap();
    assert_eq!(transport.calls(), 1);
    assert_eq!(client.cache().unwrap().len().await, 1);
}

#[tokio::test]
async fn test_cache_disabled() {
    let transport = Arc::new(CountingTransport::new(FnTransport(lmp_body)));
    let config = ClientConfig::builder("k").use_cache(false).build().unwrap();
    let client = client_with(config, transport.clone()).await;

    client.call_rows("dalmp_node", &dalmp_args()).await.unwrap();
    client.call_rows("dalmp_node", &dalmp_args()).await.unwrap();
    assert_eq!(transport.calls(), 2);
    assert!(client.cache().is_none());
    client.close().await.unwrap();
}

#[tokio::test]
async fn test_missing_argument_makes_no_request() {
    let transport = Arc::new(CountingTransport::new(FnTransport(lmp_body)));
    let client = client_with(memory_config(), transport.clone()).await;

    let mut args = dalmp_args();
    args.remove("nodes");
    let err = client.call_rows("dalmp_node", &args).await.unwrap_err();

    assert!(err.is_client_side());
    assert_eq!(
        err.to_string(),
        "dalmp_node(): missing keyword-only argument 'nodes'"
    );
    assert_eq!(transport.calls(), 0);
}

// ============================================================================
// Schema Source Tests
// ============================================================================

#[tokio::test]
async fn test_remote_schema() {
    let transport = Arc::new(CountingTransport::new(FnTransport(|req: &PreparedRequest| {
        if req.url.path().ends_with("/openapi.json") {
            RawResponse::new(200, BUNDLED_SCHEMA)
        } else {
            RawResponse::new(404, "")
        }
    })));
    let config = ClientConfig::builder("k")
        .host("https://api.isostream.test/api")
        .schema(SchemaSource::Remote)
        .use_cache(false)
        .build()
        .unwrap();

    let client = client_with(config, transport.clone()).await;
    assert_eq!(transport.calls(), 1);
    assert!(client.api_methods(None).contains(&"fuelmix".to_string()));
}

#[tokio::test]
async fn test_missing_schema_file() {
    let config = ClientConfig::builder("k")
        .schema(SchemaSource::File("/definitely/not/here.yaml".into()))
        .use_cache(false)
        .build()
        .unwrap();
    let err = IsoStream::with_transport(config, Arc::new(FnTransport(lmp_body)))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

// ============================================================================
// Range Tests
// ============================================================================

#[test]
fn test_range_windows() {
    let range = RangeRequest::new(at(1, 0), at(2, 12), Duration::hours(12));
    let windows = range.windows("dalmp_node").unwrap();
    assert_eq!(
        windows,
        vec![
            (at(1, 0), at(1, 12)),
            (at(1, 12), at(2, 0)),
            (at(2, 0), at(2, 12)),
        ]
    );

    // Last window is clipped to the end
    let range = RangeRequest::new(at(1, 0), at(1, 5), Duration::hours(2));
    assert_eq!(range.windows("x").unwrap().last(), Some(&(at(1, 4), at(1, 5))));
}

#[test]
fn test_range_invalid() {
    let range = RangeRequest::new(at(1, 0), at(2, 0), Duration::zero());
    assert!(matches!(range.windows("x"), Err(Error::Argument { .. })));

    let range = RangeRequest::new(at(2, 0), at(1, 0), Duration::hours(1));
    assert!(matches!(range.windows("x"), Err(Error::Argument { .. })));
}

#[tokio::test]
async fn test_fetch_range_one_request_per_window() {
    let transport = Arc::new(CountingTransport::new(FnTransport(lmp_body)));
    let client = client_with(memory_config(), transport.clone()).await;

    let range = RangeRequest::new(at(1, 0), at(1, 3), Duration::hours(1));
    let rows = client
        .fetch_range("dalmp_node", &dalmp_args(), &range, CallOptions::raw())
        .await
        .unwrap()
        .into_rows()
        .unwrap();

    assert_eq!(transport.calls(), 3);
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0]["timestamp"], json!("2022-01-01T00:00:00"));
    assert_eq!(rows[5]["timestamp"], json!("2022-01-01T02:00:00"));
}

#[tokio::test]
async fn test_fetch_range_skips_empty_windows() {
    let transport = Arc::new(FnTransport(|req: &PreparedRequest| {
        if query(req, "start") == Some("2022-01-01T01:00:00") {
            RawResponse::new(200, "[]")
        } else {
            lmp_body(req)
        }
    }));
    let client = client_with(memory_config(), transport).await;

    let range = RangeRequest::new(at(1, 0), at(1, 3), Duration::hours(1));
    let table = client
        .fetch_range("dalmp_node", &dalmp_args(), &range, CallOptions::default())
        .await
        .unwrap()
        .into_table()
        .unwrap();
    assert_eq!(table.num_rows(), 2);
}

#[tokio::test]
async fn test_fetch_range_all_empty() {
    let transport = Arc::new(FnTransport(|_: &PreparedRequest| RawResponse::new(200, "[]")));
    let client = client_with(memory_config(), transport).await;

    let range = RangeRequest::new(at(1, 0), at(1, 2), Duration::hours(1));
    let err = client
        .fetch_range("dalmp_node", &dalmp_args(), &range, CallOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmptyResult { .. }));
}

#[tokio::test]
async fn test_fetch_range_window_params_are_validated() {
    let transport = Arc::new(CountingTransport::new(FnTransport(lmp_body)));
    let client = client_with(memory_config(), transport.clone()).await;

    let range = RangeRequest::new(at(1, 0), at(1, 1), Duration::hours(1))
        .with_params("begin", "finish");
    let err = client
        .fetch_range("dalmp_node", &dalmp_args(), &range, CallOptions::raw())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("unexpected keyword argument"));
    assert_eq!(transport.calls(), 0);
}

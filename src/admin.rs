//! The Admin Surface (C6): a JSON HTTP API over the cache, plus the
//! supplemented welcome endpoint the original program exposes at `/`.
//!
//! Grounded on the teacher's `http_server.rs` (`AppState`, `Router::new()
//! .route(...).with_state(...)`, `CorsLayer`), restyled around the cache
//! operations `/cache/all`, `/cache/get`, `/cache/delete`, `/cache/insert`
//! this spec actually calls for.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::cache::{Cache, CacheEntry};
use crate::dns::{DnsType, RData};

#[derive(Clone)]
struct AdminState {
    cache: Arc<Cache>,
}

/// One cache entry in its admin-facing JSON shape, per spec.md §4.2:
/// `{Key, Value: [ip-string, ...], Ttl: expiry_epoch, Type}`.
#[derive(Debug, Serialize)]
struct EntryView {
    #[serde(rename = "Key")]
    key: String,
    #[serde(rename = "Value")]
    value: Vec<String>,
    #[serde(rename = "Ttl")]
    ttl: i64,
    #[serde(rename = "Type")]
    rtype: &'static str,
}

fn entry_view(key: String, entry: &CacheEntry) -> EntryView {
    let rtype = entry
        .value
        .answers
        .first()
        .map(|rr| match rr.rtype {
            DnsType::Aaaa => "AAAA",
            _ => "A",
        })
        .unwrap_or("A");

    let value = entry
        .value
        .answers
        .iter()
        .filter_map(|rr| match &rr.rdata {
            RData::A(addr) => Some(addr.to_string()),
            RData::Aaaa(addr) => Some(addr.to_string()),
            RData::Raw(_) => None,
        })
        .collect();

    EntryView {
        key,
        value,
        ttl: entry.expiry_epoch,
        rtype,
    }
}

pub fn router(cache: Arc<Cache>) -> Router {
    let state = AdminState { cache };
    Router::new()
        .route("/", get(welcome))
        .route("/cache/all", get(cache_all))
        .route("/cache/get", get(cache_get))
        .route("/cache/delete", get(cache_delete))
        .route("/cache/insert", get(cache_insert))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

async fn welcome() -> impl IntoResponse {
    Json(json!({
        "name": "dnscached",
        "endpoints": ["/cache/all", "/cache/get", "/cache/delete", "/cache/insert"],
    }))
}

async fn cache_all(State(state): State<AdminState>) -> impl IntoResponse {
    let entries: Vec<EntryView> = state
        .cache
        .snapshot()
        .into_iter()
        .map(|(key, entry)| entry_view(key, &entry))
        .collect();
    Json(entries)
}

#[derive(Debug, Deserialize)]
struct KeyParam {
    key: String,
}

async fn cache_get(
    State(state): State<AdminState>,
    Query(params): Query<KeyParam>,
) -> impl IntoResponse {
    match state.cache.get_entry(&params.key) {
        Some(entry) => Json(entry_view(params.key, &entry)).into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": format!("no such key {:?}", params.key)})),
        )
            .into_response(),
    }
}

async fn cache_delete(
    State(state): State<AdminState>,
    Query(params): Query<KeyParam>,
) -> impl IntoResponse {
    if state.cache.delete(&params.key) {
        info!(key = %params.key, "admin surface deleted cache entry");
        StatusCode::NO_CONTENT.into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

#[derive(Debug, Deserialize)]
struct InsertParams {
    key: String,
    #[serde(rename = "type")]
    rtype: String,
    value: String,
    ttl: u32,
}

async fn cache_insert(
    State(state): State<AdminState>,
    Query(params): Query<InsertParams>,
) -> impl IntoResponse {
    let rtype = match params.rtype.as_str() {
        "A" => DnsType::A,
        "AAAA" => DnsType::Aaaa,
        other => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": format!("unknown type {other:?}")})),
            )
                .into_response();
        }
    };

    // The record's owner name is the key with the trailing mnemonic and dot
    // stripped, e.g. "a.bg.A." -> "a.bg.". Callers that want a literal
    // mismatch between key and name should use a key the lookup path would
    // never produce on its own.
    let name = params
        .key
        .strip_suffix(&format!("{}.", params.rtype))
        .unwrap_or(&params.key);

    if state
        .cache
        .insert_at(&params.key, name, &params.value, rtype, params.ttl)
    {
        info!(key = %params.key, "admin surface inserted cache entry");
        StatusCode::CREATED.into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "insert refused: duplicate key or cache at capacity"})),
        )
            .into_response()
    }
}

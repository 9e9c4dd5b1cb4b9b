//! Operator-facing HTML cache view, supplemented from the original
//! program's `web/web.go` (there is no HTML view in the distilled spec's
//! wire contract, but the spec's Admin Surface section assumes an
//! operator-readable rendering exists alongside the JSON API).
//!
//! Grounded on the teacher's axum `Router` conventions; the original's
//! Go `html/template` helpers `toHumanTime`/`getKey` become plain Rust
//! functions since this view renders directly from the in-process cache
//! rather than round-tripping through the admin HTTP API the way the
//! original's separate `web` binary does.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use chrono::{Local, TimeZone};
use tower_http::services::ServeDir;

use crate::cache::Cache;
use crate::dns::RData;

pub fn router(cache: Arc<Cache>, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(move || index(cache.clone())))
        .nest_service("/static", ServeDir::new(static_dir.to_string()))
}

fn human_time(expiry_epoch: i64) -> String {
    if expiry_epoch == 0 {
        return "\u{221e}".to_string(); // infinity, permanent entry
    }
    match Local.timestamp_opt(expiry_epoch, 0).single() {
        Some(dt) => dt.format("%H:%M:%S %d.%m.%Y").to_string(),
        None => expiry_epoch.to_string(),
    }
}

async fn index(cache: Arc<Cache>) -> impl IntoResponse {
    let mut entries = cache.snapshot();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut rows = String::new();
    for (key, entry) in &entries {
        let values: Vec<String> = entry
            .value
            .answers
            .iter()
            .filter_map(|rr| match &rr.rdata {
                RData::A(addr) => Some(addr.to_string()),
                RData::Aaaa(addr) => Some(addr.to_string()),
                RData::Raw(_) => None,
            })
            .collect();
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            html_escape(key),
            html_escape(&values.join(", ")),
            human_time(entry.expiry_epoch),
            entry.hits,
        );
    }

    Html(format!(
        "<!doctype html>\n<html><head><title>dnscached</title>\
         <link rel=\"stylesheet\" href=\"/static/style.css\"></head>\n\
         <body>\n<h1>Cache ({} / {})</h1>\n\
         <table>\n<thead><tr><th>Key</th><th>Value</th><th>Expires</th><th>Hits</th></tr></thead>\n\
         <tbody>\n{}</tbody>\n</table>\n</body></html>\n",
        entries.len(),
        cache.capacity(),
        rows,
    ))
}

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

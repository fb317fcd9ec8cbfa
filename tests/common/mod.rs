// tests/common/mod.rs
//
// Local fake upstreams (feeds, search API) bound to 127.0.0.1:0.
#![allow(dead_code)]

use std::time::Duration;

use shuttle_axum::axum::{self, Router};

/// Serve `router` on an ephemeral port and return its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind upstream");
    let addr = listener.local_addr().expect("upstream addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

/// Client with short timeouts so hung upstreams fail fast in tests.
pub fn test_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("test client")
}

/// Minimal RSS document; each tuple is (title, link, pubDate).
pub fn rss(items: &[(&str, &str, &str)]) -> String {
    let body: String = items
        .iter()
        .map(|(t, l, d)| {
            format!("<item><title>{t}</title><link>{l}</link><pubDate>{d}</pubDate></item>")
        })
        .collect();
    format!(r#"<?xml version="1.0"?><rss version="2.0"><channel><title>t</title>{body}</channel></rss>"#)
}

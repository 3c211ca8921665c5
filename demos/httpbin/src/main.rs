//! httpbin scenario
//!
//! Runs a short API test against <https://httpbin.org> (or the URL given as
//! first argument): two clients cloned from one base, different headers and
//! cookie policies, chained expectations, one error check per client at the
//! end.
//!
//! ```text
//! RUST_LOG=info cargo run -p httpbin-demo
//! ```

#![allow(missing_docs)]

use std::process::ExitCode;
use std::time::Duration;

use assay::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Part of the echo httpbin returns for `/anything`.
#[derive(Debug, Default, Deserialize)]
struct Echo {
    method: String,
    url: String,
    json: Option<serde_json::Value>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://httpbin.org/".to_string());

    let transport = HyperTransport::builder().with_logging().build();
    let base = Client::with_transport(base_url, transport).with_timeout(Duration::from_secs(10));

    let ui = base
        .clone()
        .with_header("h1", "v1")
        .with_header("h2", "v2")
        .use_cookies(true);
    let api = base.clone().with_header("api-key", "12345").use_cookies(false);

    api.post("/anything", "JSON body or object")
        .await
        .expect_status(200)
        .expect_header_contains("Content-Type", "json")
        .expect_body_contains("api-key");

    ui.get("/cookies/set?new_key=value")
        .await
        .expect_status(200)
        .expect_body_contains("new_key");
    ui.get("/headers")
        .await
        .expect_body_contains("H1")
        .expect_body_not_contains("Api-Key");

    api.get("/status/400")
        .await
        .expect_status(400)
        .expect_body_not_contains("missing")
        .expect_body_passes(str::is_empty);

    let mut echo = Echo::default();
    api.put("/anything", &["a", "b"])
        .await
        .expect_passes(|head, body| head.is_success() && body.contains("\"PUT\""))
        .parse_body(&mut echo);
    info!(method = %echo.method, url = %echo.url, has_json = echo.json.is_some(), "echo");

    let mut failed = false;
    for (name, client) in [("ui", &ui), ("api", &api)] {
        if let Some(err) = client.error() {
            error!(client = name, "{err}");
            failed = true;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        info!("all expectations met");
        ExitCode::SUCCESS
    }
}

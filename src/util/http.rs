use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use reqwest::{header, Client, Method, Response, Url};

use crate::logging::Logger;

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("http"));

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Builds a reqwest client for a single run.
///
/// reqwest is compiled without a bundled crypto provider, so the ring provider
/// is installed process-wide before the first client is built.
pub fn build_client() -> Result<Client> {
    // 已經安裝過會回傳 Err，忽略即可
    let _ = rustls::crypto::ring::default_provider().install_default();

    Client::builder()
        // ===== 壓縮 =====
        .brotli(true)
        .gzip(true)
        .zstd(true)
        // ===== 超時設置 =====
        .connect_timeout(Duration::from_secs(8))
        .timeout(Duration::from_secs(30))
        .tcp_nodelay(true)
        .redirect(reqwest::redirect::Policy::limited(5))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| anyhow!("Failed to create reqwest client: {:?}", e))
}

/// Appends `params` to `url` as a query string.
pub fn url_with_query(url: &str, params: &[(&str, String)]) -> Result<Url> {
    Url::parse_with_params(url, params).map_err(|why| anyhow!("Invalid url {}: {:?}", url, why))
}

/// Performs a single HTTP GET and returns the raw response.
///
/// Transport errors are returned as-is; the status code is left for the caller to inspect.
pub async fn get_response(
    client: &Client,
    url: Url,
    headers: Option<header::HeaderMap>,
) -> reqwest::Result<Response> {
    let visit_log = format!("{}:{}", Method::GET, url.path());
    let mut rb = client.request(Method::GET, url);

    if let Some(h) = headers {
        rb = rb.headers(h);
    }

    let start = Instant::now();
    let res = rb.send().await;
    let elapsed = start.elapsed().as_millis();

    match &res {
        Ok(response) => {
            LOGGER.info(format!("{} {} {} ms", visit_log, response.status(), elapsed));
        }
        Err(why) => {
            LOGGER.error(format!("{} failed because {:?}. {} ms", visit_log, why, elapsed));
        }
    }

    res
}

pub(crate) fn flush_log() {
    LOGGER.flush();
}

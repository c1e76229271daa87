use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::{
    config::App,
    crawler::coinmarketcap::CoinMarketCap,
    logging,
    publish::{self, Published},
    report::Snapshot,
};

/// 取得市值排行 -> 依 24 小時漲幅排序 -> 寫入即時檔與封存檔
pub async fn execute(settings: &App) -> Result<Published> {
    execute_at(settings, Utc::now()).await
}

pub async fn execute_at(settings: &App, now: DateTime<Utc>) -> Result<Published> {
    let cmc = CoinMarketCap::new(
        &settings.coinmarketcap.api_key,
        &settings.coinmarketcap.base_url,
    )?;

    let coins = cmc
        .listings_latest(settings.coinmarketcap.limit)
        .await
        .context("Failed to fetch coinmarketcap listings")?;

    let snapshot = Snapshot::new(
        now,
        &coins,
        settings.coinmarketcap.limit,
        settings.report.top_n,
    );

    let published = publish::write(
        &snapshot,
        &settings.report.status_path,
        &settings.report.archive_dir,
    )
    .context("Failed to write snapshot")?;

    logging::info_file_async(format!(
        "top gainers published: {} coins fetched, top {} written to {} and {}",
        coins.len(),
        settings.report.top_n.min(coins.len()),
        published.status_path.display(),
        published.archive_path.display()
    ));

    Ok(published)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::TimeZone;
    use tempfile::TempDir;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use crate::error::{FetchError, WriteError};

    use super::*;

    fn listing(name: &str, change: f64) -> serde_json::Value {
        serde_json::json!({
            "name": name,
            "symbol": name,
            "circulating_supply": 19000000,
            "quote": { "USD": {
                "price": 1234.5678,
                "volume_24h": 1000,
                "percent_change_24h": change,
                "market_cap": 1000000
            }}
        })
    }

    async fn server(changes: &[(&str, f64)]) -> MockServer {
        let data: Vec<serde_json::Value> = changes.iter().map(|(n, c)| listing(n, *c)).collect();
        let body = serde_json::json!({ "status": { "error_code": 0 }, "data": data });

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/cryptocurrency/listings/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn settings(base_url: &str, dir: &TempDir, top_n: usize) -> App {
        let mut app = App::default();
        app.coinmarketcap.api_key = "test-key".to_string();
        app.coinmarketcap.base_url = base_url.to_string();
        app.report.top_n = top_n;
        app.report.status_path = dir.path().join("README.md");
        app.report.archive_dir = dir.path().join("archive");
        app
    }

    #[tokio::test]
    async fn test_execute_end_to_end() {
        let mock_server = server(&[("FIVE", 5.0), ("DOWN", -2.0), ("UP", 20.0)]).await;
        let dir = TempDir::new().unwrap();
        let settings = settings(&mock_server.uri(), &dir, 2);
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let published = execute_at(&settings, now).await.unwrap();

        assert_eq!(published.archive_path, dir.path().join("archive").join("2024-03-01.md"));

        let status = fs::read_to_string(&settings.report.status_path).unwrap();
        let archived = fs::read_to_string(&published.archive_path).unwrap();
        assert_eq!(status, archived);

        let up = status.find("| 1 | UP |").unwrap();
        let five = status.find("| 2 | FIVE |").unwrap();
        assert!(up < five);
        assert!(!status.contains("DOWN"));
        assert!(status.contains("🟢 **20.00**"));
        assert!(status.contains("19,000,000"));
    }

    #[tokio::test]
    async fn test_fetch_failure_writes_nothing() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .expect(1)
            .mount(&mock_server)
            .await;
        let dir = TempDir::new().unwrap();
        let settings = settings(&mock_server.uri(), &dir, 20);

        let err = execute(&settings).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::Status { status: 401, .. })
        ));
        assert!(!settings.report.status_path.exists());
        assert!(!settings.report.archive_dir.exists());
    }

    #[tokio::test]
    async fn test_write_failure_is_write_error() {
        let mock_server = server(&[("UP", 1.0)]).await;
        let dir = TempDir::new().unwrap();
        let mut settings = settings(&mock_server.uri(), &dir, 20);
        settings.report.status_path = dir.path().join("no-such-dir").join("README.md");

        let err = execute(&settings).await.unwrap_err();

        assert!(err.downcast_ref::<WriteError>().is_some());
        assert!(!settings.report.archive_dir.exists());
    }
}

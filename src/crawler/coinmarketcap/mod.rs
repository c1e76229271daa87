//! # CoinMarketCap 行情採集模組
//!
//! 透過 CoinMarketCap Pro API 取得依市值排序的幣種清單。
//!
//! ## 站點資訊
//!
//! - 來源域名：`pro-api.coinmarketcap.com`
//! - 存取方式：HTTP GET 搭配 `X-CMC_PRO_API_KEY` 標頭
//! - 主要端點：`/v1/cryptocurrency/listings/latest`

use reqwest::{
    header::{self, HeaderValue},
    Client,
};

use crate::{error::FetchError, util};

/// 市值排行子模組。
pub mod listings;

/// API Key 使用的標頭名稱 (X-CMC_PRO_API_KEY)，HeaderMap 只接受小寫。
const API_KEY_HEADER: &str = "x-cmc_pro_api_key";
/// 報價換算的幣別。
pub const CONVERT: &str = "USD";

/// CoinMarketCap 行情採集器。
pub struct CoinMarketCap {
    client: Client,
    api_key: String,
    base_url: String,
}

impl CoinMarketCap {
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, FetchError> {
        let client =
            util::http::build_client().map_err(|why| FetchError::Client(why.to_string()))?;

        Ok(CoinMarketCap {
            client,
            api_key: api_key.trim().to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn headers(&self) -> Result<header::HeaderMap, FetchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(&self.api_key)
                .map_err(|why| FetchError::Client(format!("invalid api key: {}", why)))?,
        );
        headers.insert("accepts", HeaderValue::from_static("application/json"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

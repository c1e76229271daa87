use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer};

use crate::{
    config::MAX_LISTING_LIMIT,
    crawler::coinmarketcap::{CoinMarketCap, CONVERT},
    declare::CoinRecord,
    error::FetchError,
    logging, util,
};

/// 錯誤訊息中保留的回應內容長度上限
const MAX_ERROR_BODY_LEN: usize = 512;

#[derive(Deserialize, Debug)]
struct ListingsResponse {
    status: Status,
    #[serde(default)]
    data: Vec<Listing>,
}

#[derive(Deserialize, Debug)]
struct Status {
    #[serde(default, deserialize_with = "deserialize_error_code")]
    error_code: i64,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Listing {
    name: String,
    symbol: String,
    #[serde(default)]
    circulating_supply: Option<Decimal>,
    #[serde(default)]
    quote: HashMap<String, Quote>,
}

/// 以 `convert` 幣別計價的報價，API 可能回傳 null
#[derive(Deserialize, Debug)]
struct Quote {
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    volume_24h: Option<Decimal>,
    #[serde(default)]
    percent_change_24h: Option<Decimal>,
    #[serde(default)]
    market_cap: Option<Decimal>,
}

impl Listing {
    fn into_record(mut self) -> Result<CoinRecord, FetchError> {
        let quote = self.quote.remove(CONVERT).ok_or_else(|| {
            FetchError::Decode(de::Error::custom(format!(
                "{} quote missing for {}",
                CONVERT, self.symbol
            )))
        })?;

        Ok(CoinRecord {
            name: self.name,
            symbol: self.symbol,
            price: quote.price.unwrap_or_default(),
            percent_change_24h: quote.percent_change_24h.unwrap_or_default(),
            market_cap: quote.market_cap.unwrap_or_default(),
            volume_24h: quote.volume_24h.unwrap_or_default(),
            circulating_supply: self.circulating_supply.unwrap_or_default(),
        })
    }
}

/// error_code 有時是字串有時是數字
fn deserialize_error_code<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInt {
        String(String),
        Int(i64),
    }

    match StringOrInt::deserialize(deserializer)? {
        StringOrInt::String(s) => s.trim().parse().map_err(de::Error::custom),
        StringOrInt::Int(i) => Ok(i),
    }
}

impl CoinMarketCap {
    /// 取得市值前 `limit` 名的幣種，依市值由大到小排列
    ///
    /// 只送出一次請求，失敗不重試。
    pub async fn listings_latest(&self, limit: u32) -> Result<Vec<CoinRecord>, FetchError> {
        if limit == 0 || limit > MAX_LISTING_LIMIT {
            return Err(FetchError::InvalidLimit {
                limit,
                max: MAX_LISTING_LIMIT,
            });
        }

        let url = util::http::url_with_query(
            &format!("{}/v1/cryptocurrency/listings/latest", self.base_url),
            &[
                ("start", "1".to_string()),
                ("limit", limit.to_string()),
                ("convert", CONVERT.to_string()),
                ("sort", "market_cap".to_string()),
                ("sort_dir", "desc".to_string()),
            ],
        )
        .map_err(|why| FetchError::Client(why.to_string()))?;

        let res = util::http::get_response(&self.client, url, Some(self.headers()?)).await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate(body),
            });
        }

        let records = parse_listings(&body)?;
        if records.is_empty() {
            logging::warn_file_async("coinmarketcap listings/latest returned no coins".to_string());
        }
        logging::info_file_async(format!(
            "coinmarketcap listings/latest returned {} coins",
            records.len()
        ));

        Ok(records)
    }
}

fn parse_listings(body: &str) -> Result<Vec<CoinRecord>, FetchError> {
    let payload: ListingsResponse = serde_json::from_str(body)?;

    if payload.status.error_code != 0 {
        return Err(FetchError::Api {
            code: payload.status.error_code,
            message: payload.status.error_message.unwrap_or_default(),
        });
    }

    payload.data.into_iter().map(Listing::into_record).collect()
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY_LEN {
        let mut end = MAX_ERROR_BODY_LEN;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}

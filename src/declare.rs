use rust_decimal::Decimal;

/// 一筆從行情 API 取回的幣種資料，金額皆以 USD 計價
#[derive(Debug, Clone, PartialEq)]
pub struct CoinRecord {
    pub name: String,
    pub symbol: String,
    pub price: Decimal,
    /// 24 小時漲跌幅 (%)
    pub percent_change_24h: Decimal,
    pub market_cap: Decimal,
    pub volume_24h: Decimal,
    pub circulating_supply: Decimal,
}

#[cfg(test)]
impl CoinRecord {
    pub fn new(name: &str, symbol: &str) -> Self {
        CoinRecord {
            name: name.to_string(),
            symbol: symbol.to_string(),
            price: Decimal::ZERO,
            percent_change_24h: Decimal::ZERO,
            market_cap: Decimal::ZERO,
            volume_24h: Decimal::ZERO,
            circulating_supply: Decimal::ZERO,
        }
    }
}

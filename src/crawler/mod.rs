/// CoinMarketCap
pub mod coinmarketcap;

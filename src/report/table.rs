use rust_decimal::Decimal;
use strum::{AsRefStr, EnumIter};

use crate::{
    declare::CoinRecord,
    util::text::{escape_markdown_cell, format_fixed, format_thousands},
};

const HEADER: &str = "| 🔢 Rank | 🪙 Name | 🔣 Symbol | 💲 Price (USD) | 📈 24h Change (%) | 💰 Market Cap (USD) | 🔄 24h Volume (USD) | 🔢 Circulating Supply |\n\
|--------|----------|--------|-------------------|--------------------|--------------------|-----------------------|-------------------|\n";

/// 超過此漲幅視為大漲
const STRONG_THRESHOLD: Decimal = Decimal::TEN;

/// 24 小時漲跌幅的區間標示
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumIter)]
pub enum Indicator {
    #[strum(serialize = "🟢")]
    StrongPositive,
    #[strum(serialize = "🟩")]
    Positive,
    #[strum(serialize = "⚪")]
    Neutral,
    #[strum(serialize = "🔴")]
    Negative,
}

impl Indicator {
    pub fn from_change(change: Decimal) -> Self {
        if change > STRONG_THRESHOLD {
            Indicator::StrongPositive
        } else if change > Decimal::ZERO {
            Indicator::Positive
        } else if change.is_zero() {
            Indicator::Neutral
        } else {
            Indicator::Negative
        }
    }

    pub fn marker(&self) -> &str {
        self.as_ref()
    }

    /// 大漲的數字以粗體顯示
    pub fn render(&self, change: Decimal) -> String {
        let value = format_fixed(change, 2);
        match self {
            Indicator::StrongPositive => format!("{} **{}**", self.marker(), value),
            _ => format!("{} {}", self.marker(), value),
        }
    }
}

/// 依 24 小時漲幅由高到低排序，同漲幅保留原本 (市值) 順序
pub fn rank(records: &[CoinRecord], top_n: usize) -> Vec<&CoinRecord> {
    let mut sorted: Vec<&CoinRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.percent_change_24h.cmp(&a.percent_change_24h));
    sorted.truncate(top_n);
    sorted
}

/// Renders the `top_n` biggest 24h gainers as a markdown table.
///
/// The header and alignment rows are always present, followed by one row per coin
/// in ranked order. There is no trailing newline after the last row.
pub fn render(records: &[CoinRecord], top_n: usize) -> String {
    let ranked = rank(records, top_n);
    let mut table = String::with_capacity(HEADER.len() + ranked.len() * 160);
    table.push_str(HEADER);

    for (i, coin) in ranked.iter().enumerate() {
        if i > 0 {
            table.push('\n');
        }
        table.push_str(&render_row(i + 1, coin));
    }

    table
}

fn render_row(rank: usize, coin: &CoinRecord) -> String {
    let change = Indicator::from_change(coin.percent_change_24h).render(coin.percent_change_24h);

    format!(
        "| {} | {} | {} | ${} | {} | ${} | ${} | {} |",
        rank,
        escape_markdown_cell(&coin.name),
        escape_markdown_cell(&coin.symbol),
        format_fixed(coin.price, 4),
        change,
        format_thousands(coin.market_cap, 0),
        format_thousands(coin.volume_24h, 0),
        format_thousands(coin.circulating_supply, 0),
    )
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use strum::IntoEnumIterator;

    use super::*;

    fn coin(symbol: &str, change: Decimal) -> CoinRecord {
        let mut c = CoinRecord::new(symbol, symbol);
        c.percent_change_24h = change;
        c
    }

    fn rows(table: &str) -> Vec<&str> {
        table.lines().skip(2).collect()
    }

    fn change_column(row: &str) -> Decimal {
        let cell = row.split('|').nth(5).unwrap();
        let digits: String = cell
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect();
        digits.parse().unwrap()
    }

    #[test]
    fn test_indicator_thresholds() {
        assert_eq!(Indicator::from_change(dec!(15.0)), Indicator::StrongPositive);
        assert_eq!(Indicator::from_change(dec!(10.01)), Indicator::StrongPositive);
        assert_eq!(Indicator::from_change(dec!(10)), Indicator::Positive);
        assert_eq!(Indicator::from_change(dec!(5.0)), Indicator::Positive);
        assert_eq!(Indicator::from_change(dec!(0.0)), Indicator::Neutral);
        assert_eq!(Indicator::from_change(dec!(-3.2)), Indicator::Negative);
    }

    #[test]
    fn test_indicator_markers_are_distinct() {
        let markers: Vec<String> = Indicator::iter().map(|i| i.marker().to_string()).collect();
        assert_eq!(markers, vec!["🟢", "🟩", "⚪", "🔴"]);
    }

    #[test]
    fn test_indicator_render() {
        assert_eq!(Indicator::StrongPositive.render(dec!(15)), "🟢 **15.00**");
        assert_eq!(Indicator::Positive.render(dec!(5)), "🟩 5.00");
        assert_eq!(Indicator::Neutral.render(dec!(0)), "⚪ 0.00");
        assert_eq!(Indicator::Negative.render(dec!(-3.2)), "🔴 -3.20");
    }

    #[test]
    fn test_row_count_is_min_of_top_n_and_len() {
        let records: Vec<CoinRecord> = (0..7).map(|i| coin("C", Decimal::from(i))).collect();

        for top_n in [1usize, 3, 7, 20] {
            let table = render(&records, top_n);
            assert_eq!(rows(&table).len(), top_n.min(records.len()), "top_n={}", top_n);
        }

        assert_eq!(rows(&render(&[], 20)).len(), 0);
    }

    #[test]
    fn test_rows_are_non_increasing() {
        let changes = [dec!(1.5), dec!(-7), dec!(22.25), dec!(0), dec!(3), dec!(-0.5), dec!(3)];
        let records: Vec<CoinRecord> = changes.iter().map(|c| coin("C", *c)).collect();

        let table = render(&records, 20);
        let rendered: Vec<Decimal> = rows(&table).iter().map(|r| change_column(r)).collect();

        assert_eq!(rendered.len(), changes.len());
        assert!(rendered.windows(2).all(|w| w[0] >= w[1]), "{:?}", rendered);
    }

    #[test]
    fn test_top_n_selects_biggest_gainers() {
        let records = vec![coin("FIVE", dec!(5)), coin("DOWN", dec!(-2)), coin("UP", dec!(20))];

        let table = render(&records, 2);
        let rows = rows(&table);

        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("| 1 | UP | UP |"));
        assert!(rows[1].starts_with("| 2 | FIVE | FIVE |"));
        assert!(!table.contains("DOWN"));
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let records = vec![coin("A", dec!(1)), coin("B", dec!(1)), coin("C", dec!(2))];
        let symbols: Vec<&str> = rank(&records, 3).iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_row_formatting() {
        let record = CoinRecord {
            name: "Bitcoin".to_string(),
            symbol: "BTC".to_string(),
            price: dec!(1234.5678),
            percent_change_24h: dec!(15.0),
            market_cap: dec!(950000000000.4),
            volume_24h: dec!(1000000000.5),
            circulating_supply: dec!(19000000),
        };

        let table = render(&[record], 1);

        assert_eq!(
            rows(&table)[0],
            "| 1 | Bitcoin | BTC | $1234.5678 | 🟢 **15.00** | $950,000,000,000 | $1,000,000,001 | 19,000,000 |"
        );
    }

    #[test]
    fn test_header_always_present() {
        let table = render(&[], 5);
        assert_eq!(table, HEADER);
        assert_eq!(table.lines().count(), 2);
    }

    #[test]
    fn test_pipe_in_name_is_escaped() {
        let table = render(&[coin("A|B", dec!(1))], 1);
        assert!(rows(&table)[0].starts_with("| 1 | A\\|B | A\\|B |"));
    }
}

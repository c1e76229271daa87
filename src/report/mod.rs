use chrono::{DateTime, Utc};
use concat_string::concat_string;

use crate::declare::CoinRecord;

/// 漲幅排行表格
pub mod table;

/// 一次執行所產生的 markdown 文件
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub timestamp_utc: DateTime<Utc>,
    pub rendered_markdown: String,
}

impl Snapshot {
    /// 以 `universe` (市值前幾名) 中 24 小時漲幅前 `top_n` 名產生文件
    pub fn new(
        timestamp_utc: DateTime<Utc>,
        records: &[CoinRecord],
        universe: u32,
        top_n: usize,
    ) -> Self {
        let table = table::render(records, top_n);
        let updated_at = timestamp_utc.format("%Y-%m-%d %H:%M:%S").to_string();

        let rendered_markdown = concat_string!(
            "\n# 📈 \"Should have bought it...\" Top ",
            top_n.to_string(),
            " 24h gainers among the top ",
            universe.to_string(),
            " coins by market cap 🚀\n\n",
            "> Refreshed daily from the top ",
            universe.to_string(),
            " coins by market cap, ranked by 24-hour change  \n",
            "> ⏰ Updated at: **",
            updated_at,
            " (UTC)**\n\n",
            table,
            "\n\n---\n\n✨ *Maintained by an automated update bot.*\n"
        );

        Snapshot {
            timestamp_utc,
            rendered_markdown,
        }
    }

    /// 依 UTC 日期決定的封存檔名，例如 `2024-03-01.md`
    pub fn archive_file_name(&self) -> String {
        format!("{}.md", self.timestamp_utc.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use super::*;

    fn records() -> Vec<CoinRecord> {
        let mut up = CoinRecord::new("Up", "UP");
        up.percent_change_24h = dec!(20);
        let mut down = CoinRecord::new("Down", "DOWN");
        down.percent_change_24h = dec!(-2);
        vec![down, up]
    }

    #[test]
    fn test_archive_file_name_uses_utc_date() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap();
        let snapshot = Snapshot::new(ts, &records(), 500, 20);

        assert_eq!(snapshot.archive_file_name(), "2024-03-01.md");
    }

    #[test]
    fn test_document_wraps_table() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 0, 5, 9).unwrap();
        let snapshot = Snapshot::new(ts, &records(), 500, 20);
        let doc = &snapshot.rendered_markdown;

        assert!(doc.contains("Top 20 24h gainers among the top 500 coins"));
        assert!(doc.contains("**2024-03-01 00:05:09 (UTC)**"));
        assert!(doc.contains(&table::render(&records(), 20)));
        assert!(doc.find("| 1 | Up |").unwrap() < doc.find("| 2 | Down |").unwrap());
        assert!(doc.ends_with("*Maintained by an automated update bot.*\n"));
    }
}

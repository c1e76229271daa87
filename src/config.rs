use std::{env, fs, path::PathBuf, str::FromStr};

use anyhow::{anyhow, Result};
use config::{Config as config_config, File as config_file, FileFormat};
use serde::{Deserialize, Serialize};

use crate::logging;

const CONFIG_PATH: &str = "app.json";

/// CoinMarketCap 單次最多回傳的筆數
pub const MAX_LISTING_LIMIT: u32 = 500;

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct App {
    #[serde(default)]
    pub coinmarketcap: CoinMarketCap,
    #[serde(default)]
    pub report: Report,
    #[serde(default)]
    pub system: System,
}

const COINMARKETCAP_API_KEY: &str = "COINMARKETCAP_API_KEY";
const COINMARKETCAP_BASE_URL: &str = "COINMARKETCAP_BASE_URL";
const COINMARKETCAP_LIMIT: &str = "COINMARKETCAP_LIMIT";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CoinMarketCap {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 取市值前幾名來排名
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for CoinMarketCap {
    fn default() -> Self {
        CoinMarketCap {
            api_key: String::new(),
            base_url: default_base_url(),
            limit: default_limit(),
        }
    }
}

fn default_base_url() -> String {
    "https://pro-api.coinmarketcap.com".to_string()
}

fn default_limit() -> u32 {
    MAX_LISTING_LIMIT
}

const REPORT_TOP_N: &str = "REPORT_TOP_N";
const REPORT_STATUS_PATH: &str = "REPORT_STATUS_PATH";
const REPORT_ARCHIVE_DIR: &str = "REPORT_ARCHIVE_DIR";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Report {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// 每次都會覆蓋的即時檔案
    #[serde(default = "default_status_path")]
    pub status_path: PathBuf,
    /// 依日期保存的資料夾
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,
}

impl Default for Report {
    fn default() -> Self {
        Report {
            top_n: default_top_n(),
            status_path: default_status_path(),
            archive_dir: default_archive_dir(),
        }
    }
}

fn default_top_n() -> usize {
    20
}

fn default_status_path() -> PathBuf {
    PathBuf::from("README.md")
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("archive")
}

const SYSTEM_SCHEDULE: &str = "SYSTEM_SCHEDULE";
const SYSTEM_RUN_ON_START: &str = "SYSTEM_RUN_ON_START";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct System {
    /// cron 表示式 (含秒，UTC)，空字串代表只執行一次
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub run_on_start: bool,
}

impl App {
    /// 讀取 app.json (若存在) 後以 env 覆蓋，並檢查設定值
    pub fn load() -> Result<Self> {
        let config_path = config_path();
        let app = if config_path.exists() {
            App::from_json(&fs::read_to_string(&config_path)?)?
        } else {
            App::default()
        };

        let app = app.override_with_env()?;
        app.validate()?;
        Ok(app)
    }

    /// 從 json 文字建立設定，不讀取 env
    pub fn from_json(text: &str) -> Result<Self> {
        let app = config_config::builder()
            .add_source(config_file::from_str(text, FileFormat::Json))
            .build()?
            .try_deserialize::<App>()?;
        Ok(app)
    }

    /// 將來至於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(mut self) -> Result<Self> {
        if let Ok(api_key) = env::var(COINMARKETCAP_API_KEY) {
            self.coinmarketcap.api_key = api_key;
        }

        if let Ok(base_url) = env::var(COINMARKETCAP_BASE_URL) {
            self.coinmarketcap.base_url = base_url;
        }

        if let Ok(limit) = env::var(COINMARKETCAP_LIMIT) {
            self.coinmarketcap.limit = parse_env(COINMARKETCAP_LIMIT, &limit)?;
        }

        if let Ok(top_n) = env::var(REPORT_TOP_N) {
            self.report.top_n = parse_env(REPORT_TOP_N, &top_n)?;
        }

        if let Ok(path) = env::var(REPORT_STATUS_PATH) {
            self.report.status_path = PathBuf::from(path);
        }

        if let Ok(dir) = env::var(REPORT_ARCHIVE_DIR) {
            self.report.archive_dir = PathBuf::from(dir);
        }

        if let Ok(schedule) = env::var(SYSTEM_SCHEDULE) {
            self.system.schedule = schedule;
        }

        if let Ok(run_on_start) = env::var(SYSTEM_RUN_ON_START) {
            self.system.run_on_start = parse_env(SYSTEM_RUN_ON_START, &run_on_start)?;
        }

        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.coinmarketcap.api_key.trim().is_empty() {
            return Err(anyhow!("{} is not set", COINMARKETCAP_API_KEY));
        }

        if self.coinmarketcap.limit == 0 || self.coinmarketcap.limit > MAX_LISTING_LIMIT {
            return Err(anyhow!(
                "coinmarketcap.limit must be between 1 and {}, got {}",
                MAX_LISTING_LIMIT,
                self.coinmarketcap.limit
            ));
        }

        if self.report.top_n == 0 {
            return Err(anyhow!("report.top_n must be at least 1"));
        }

        if self.report.status_path.as_os_str().is_empty() {
            return Err(anyhow!("report.status_path is empty"));
        }

        logging::debug_file_async(format!(
            "config loaded: limit={} top_n={} status_path={} archive_dir={} schedule='{}'",
            self.coinmarketcap.limit,
            self.report.top_n,
            self.report.status_path.display(),
            self.report.archive_dir.display(),
            self.system.schedule
        ));

        Ok(())
    }
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Debug,
{
    T::from_str(value.trim()).map_err(|why| anyhow!("Invalid {}='{}': {:?}", name, value, why))
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}

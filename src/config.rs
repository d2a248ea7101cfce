use crate::classifier::WatchList;
use alloy_primitives::Address;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_LOG_FILE_NAME: &str = "my_transactions.log";
const DEFAULT_CURRENCY_SYMBOL: &str = "ETH";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 12;
const DEFAULT_BACKOFF_INTERVAL_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub json_rpc_urls: Vec<String>,
    pub watch_list: WatchList,
    /// Reserved for future filtering modes; reported in the startup banner.
    pub track_only_mine: bool,
    pub log_to_file: bool,
    pub log_file_name: PathBuf,
    pub currency_symbol: String,
    pub poll_interval: Duration,
    pub backoff_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let json_rpc_urls = split_list(
            &lookup("JSON_RPC_URL").context("JSON_RPC_URL must be set in .env")?,
        );
        if json_rpc_urls.is_empty() {
            anyhow::bail!("JSON_RPC_URL must contain at least one URL");
        }

        let addresses = split_list(
            &lookup("WATCH_ADDRESSES").context("WATCH_ADDRESSES must be set in .env")?,
        )
        .iter()
        .map(|address| {
            Address::from_str(address)
                .with_context(|| format!("Invalid address in WATCH_ADDRESSES: {}", address))
        })
        .collect::<Result<Vec<_>>>()?;

        let track_incoming = parse_bool(&lookup, "TRACK_INCOMING", false)?;
        let watch_list = WatchList::new(addresses, track_incoming);
        if watch_list.is_empty() {
            anyhow::bail!("WATCH_ADDRESSES must contain at least one address");
        }

        let log_file_name = lookup("LOG_FILE_NAME")
            .unwrap_or_else(|| DEFAULT_LOG_FILE_NAME.to_string())
            .into();

        let currency_symbol =
            lookup("CURRENCY_SYMBOL").unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string());

        Ok(Config {
            json_rpc_urls,
            watch_list,
            track_only_mine: parse_bool(&lookup, "TRACK_ONLY_MINE", true)?,
            log_to_file: parse_bool(&lookup, "LOG_TO_FILE", true)?,
            log_file_name,
            currency_symbol,
            poll_interval: parse_secs(&lookup, "POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?,
            backoff_interval: parse_secs(
                &lookup,
                "BACKOFF_INTERVAL_SECS",
                DEFAULT_BACKOFF_INTERVAL_SECS,
            )?,
        })
    }

    /// The file sink path, if file logging is enabled.
    pub fn log_file(&self) -> Option<&Path> {
        self.log_to_file.then_some(self.log_file_name.as_path())
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> Result<bool> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };

    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(anyhow::anyhow!("Invalid boolean for {}: {}", key, other)),
    }
}

fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<Duration> {
    let secs = match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid number of seconds for {}: {}", key, raw))?,
        None => default,
    };
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn applies_defaults() {
        let config = config_from(&[
            ("JSON_RPC_URL", "https://eth-sepolia.example/v2/key"),
            ("WATCH_ADDRESSES", "0xD843CBe0bdeE3E884Fd32cE4942219830D5944DA"),
        ])
        .unwrap();

        assert_eq!(config.json_rpc_urls.len(), 1);
        assert_eq!(config.watch_list.addresses().len(), 1);
        assert!(config.track_only_mine);
        assert!(!config.watch_list.tracks_incoming());
        assert!(config.log_to_file);
        assert_eq!(config.log_file_name, PathBuf::from("my_transactions.log"));
        assert_eq!(config.currency_symbol, "ETH");
        assert_eq!(config.poll_interval, Duration::from_secs(12));
        assert_eq!(config.backoff_interval, Duration::from_secs(10));
    }

    #[test]
    fn addresses_compare_case_insensitively() {
        let config = config_from(&[
            ("JSON_RPC_URL", "http://localhost:8545"),
            (
                "WATCH_ADDRESSES",
                concat!(
                    "0xD843CBe0bdeE3E884Fd32cE4942219830D5944DA,",
                    "0xd843cbe0bdee3e884fd32ce4942219830d5944da",
                ),
            ),
        ])
        .unwrap();

        assert_eq!(config.watch_list.addresses().len(), 1);
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("JSON_RPC_URL", "http://a:8545,http://b:8545"),
            ("WATCH_ADDRESSES", "0x00000000000000000000000000000000000000b0"),
            ("TRACK_INCOMING", "yes"),
            ("LOG_TO_FILE", "false"),
            ("CURRENCY_SYMBOL", "SepoliaETH"),
            ("POLL_INTERVAL_SECS", "3"),
            ("BACKOFF_INTERVAL_SECS", "1"),
        ])
        .unwrap();

        assert_eq!(config.json_rpc_urls, vec!["http://a:8545", "http://b:8545"]);
        assert!(config.watch_list.tracks_incoming());
        assert!(config.log_file().is_none());
        assert_eq!(config.currency_symbol, "SepoliaETH");
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.backoff_interval, Duration::from_secs(1));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(
            config_from(&[(
                "WATCH_ADDRESSES",
                "0x00000000000000000000000000000000000000b0"
            )])
            .is_err()
        );
        assert!(config_from(&[("JSON_RPC_URL", "http://localhost:8545")]).is_err());
        assert!(
            config_from(&[
                ("JSON_RPC_URL", "http://localhost:8545"),
                ("WATCH_ADDRESSES", " , "),
            ])
            .is_err()
        );
        assert!(
            config_from(&[
                ("JSON_RPC_URL", "http://localhost:8545"),
                ("WATCH_ADDRESSES", "0xnot-an-address"),
            ])
            .is_err()
        );
        assert!(
            config_from(&[
                ("JSON_RPC_URL", "http://localhost:8545"),
                ("WATCH_ADDRESSES", "0x00000000000000000000000000000000000000b0"),
                ("LOG_TO_FILE", "maybe"),
            ])
            .is_err()
        );
        assert!(
            config_from(&[
                ("JSON_RPC_URL", "http://localhost:8545"),
                ("WATCH_ADDRESSES", "0x00000000000000000000000000000000000000b0"),
                ("POLL_INTERVAL_SECS", "-1"),
            ])
            .is_err()
        );
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::PageError;
use crate::http_client::http_client;

pub const DATASET_PATH: &str = "web_data/current_analysis.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub name: String,
    pub cost: f64,
    pub current_odds: f64,
    pub jackpot: f64,
    pub net_ev: f64,
    #[serde(default, deserialize_with = "de_string_or_null")]
    pub image_url: String,
    #[serde(default)]
    pub prize_pool_remaining: Option<f64>,
    pub prize_tiers: BTreeMap<String, PrizeTier>,
    pub ticket_data: TicketData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeTier {
    pub percentage: f64,
    pub remaining: u64,
    pub total: u64,
    #[serde(default)]
    pub claimed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketData {
    pub total_tickets: u64,
    pub remaining_tickets: u64,
    pub percent_remaining: f64,
    #[serde(default)]
    pub total_winning: Option<u64>,
    #[serde(default)]
    pub remaining_winning: Option<u64>,
}

fn de_string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl GameRecord {
    /// Prize tiers ordered by prize amount, highest first. Keys are compared
    /// numerically, so `"1000"` sorts above `"500"`.
    pub fn tiers_by_prize_desc(&self) -> Vec<(f64, &PrizeTier)> {
        let mut tiers = self
            .prize_tiers
            .iter()
            .filter_map(|(key, tier)| parse_prize_key(key).map(|amount| (amount, tier)))
            .collect::<Vec<_>>();
        tiers.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        tiers
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("empty name".to_string());
        }
        if !self.cost.is_finite() || self.cost < 0.0 {
            return Err(format!("invalid cost {}", self.cost));
        }
        if !self.current_odds.is_finite() || self.current_odds <= 0.0 {
            return Err(format!("invalid current_odds {}", self.current_odds));
        }
        if !self.jackpot.is_finite() || self.jackpot < 0.0 {
            return Err(format!("invalid jackpot {}", self.jackpot));
        }
        if !self.net_ev.is_finite() {
            return Err(format!("invalid net_ev {}", self.net_ev));
        }
        for (key, tier) in &self.prize_tiers {
            if parse_prize_key(key).is_none() {
                return Err(format!("prize tier key {key:?} is not a number"));
            }
            if !tier.percentage.is_finite() {
                return Err(format!("prize tier {key} has invalid percentage"));
            }
        }
        Ok(())
    }
}

pub fn parse_prize_key(key: &str) -> Option<f64> {
    key.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    pub index: usize,
    pub name: Option<String>,
    pub reason: String,
}

impl fmt::Display for RejectedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "record {} ({name}): {}", self.index, self.reason),
            None => write!(f, "record {}: {}", self.index, self.reason),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub games: Vec<GameRecord>,
    pub rejected: Vec<RejectedRecord>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

/// Parses the dataset document. The top level must be an array; entries that
/// do not match the record schema are rejected one by one so a single bad
/// row does not hide the rest.
pub fn parse_dataset_json(raw: &str) -> Result<Dataset, PageError> {
    let root: Value =
        serde_json::from_str(raw).map_err(|err| PageError::load(format!("invalid json: {err}")))?;
    let Value::Array(items) = root else {
        return Err(PageError::load("dataset is not a json array"));
    };

    let mut dataset = Dataset::default();
    for (index, item) in items.into_iter().enumerate() {
        let name = item
            .get("name")
            .and_then(Value::as_str)
            .map(|s| s.to_string());
        let parsed = serde_json::from_value::<GameRecord>(item)
            .map_err(|err| err.to_string())
            .and_then(|game| game.validate().map(|_| game));
        match parsed {
            Ok(game) => dataset.games.push(game),
            Err(reason) => dataset.rejected.push(RejectedRecord {
                index,
                name,
                reason,
            }),
        }
    }
    Ok(dataset)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Http(String),
    File(PathBuf),
}

impl DatasetSource {
    /// `http://` and `https://` locations are fetched, anything else is read
    /// from disk.
    pub fn from_location(location: &str) -> Self {
        let trimmed = location.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DatasetSource::Http(trimmed.to_string())
        } else {
            DatasetSource::File(PathBuf::from(trimmed))
        }
    }

    pub fn from_base_url(base: &str) -> Self {
        let base = base.trim().trim_end_matches('/');
        DatasetSource::Http(format!("{base}/{DATASET_PATH}"))
    }

    pub fn describe(&self) -> String {
        match self {
            DatasetSource::Http(url) => url.clone(),
            DatasetSource::File(path) => path.display().to_string(),
        }
    }
}

impl Default for DatasetSource {
    fn default() -> Self {
        DatasetSource::File(PathBuf::from(".").join(DATASET_PATH))
    }
}

/// One read of the dataset. Transport errors, non-success statuses and
/// unparseable documents all come back as `LoadFailure`.
pub fn fetch_dataset(source: &DatasetSource) -> Result<Dataset, PageError> {
    let body = match source {
        DatasetSource::Http(url) => fetch_http_body(url)?,
        DatasetSource::File(path) => fs::read_to_string(path)
            .map_err(|err| PageError::load(format!("{}: {err}", path.display())))?,
    };
    parse_dataset_json(&body)
}

fn fetch_http_body(url: &str) -> Result<String, PageError> {
    let client = http_client().map_err(|err| PageError::load(format!("{err:#}")))?;
    let resp = client
        .get(url)
        .send()
        .map_err(|err| PageError::load(format!("request failed: {err}")))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(PageError::load(format!("http {status}")));
    }
    resp.text()
        .map_err(|err| PageError::load(format!("failed reading body: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_sort_numerically_not_lexically() {
        let raw = r#"[{
            "name": "Tiers", "cost": 1, "current_odds": 3.5, "jackpot": 1000,
            "net_ev": -0.4, "image_url": "",
            "prize_tiers": {
                "5": {"percentage": 50.0, "remaining": 10, "total": 20},
                "1000": {"percentage": 0.5, "remaining": 1, "total": 2},
                "50.0": {"percentage": 10.0, "remaining": 4, "total": 8}
            },
            "ticket_data": {"total_tickets": 100, "remaining_tickets": 40, "percent_remaining": 40.0}
        }]"#;
        let dataset = parse_dataset_json(raw).expect("valid dataset");
        let amounts = dataset.games[0]
            .tiers_by_prize_desc()
            .into_iter()
            .map(|(amount, _)| amount)
            .collect::<Vec<_>>();
        assert_eq!(amounts, vec![1000.0, 50.0, 5.0]);
    }

    #[test]
    fn location_picks_source_kind() {
        assert_eq!(
            DatasetSource::from_location("https://example.com/x.json"),
            DatasetSource::Http("https://example.com/x.json".to_string())
        );
        assert_eq!(
            DatasetSource::from_location("./web_data/current_analysis.json"),
            DatasetSource::File(PathBuf::from("./web_data/current_analysis.json"))
        );
        assert_eq!(
            DatasetSource::from_base_url("http://localhost:8000/"),
            DatasetSource::Http("http://localhost:8000/web_data/current_analysis.json".to_string())
        );
    }
}

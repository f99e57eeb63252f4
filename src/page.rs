use std::collections::HashMap;

use crate::dataset::DatasetSource;

pub const LIST_PAGE: &str = "index.html";
pub const DETAIL_PAGE: &str = "game.html";
pub const GAME_PARAM: &str = "game";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    List,
    Detail,
}

/// A page address such as `game.html?game=lucky-7`, split into the page it
/// names and its decoded query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAddress {
    pub kind: PageKind,
    pub params: HashMap<String, String>,
}

impl PageAddress {
    pub fn list() -> Self {
        Self {
            kind: PageKind::List,
            params: HashMap::new(),
        }
    }

    pub fn detail(slug: &str) -> Self {
        Self {
            kind: PageKind::Detail,
            params: HashMap::from([(GAME_PARAM.to_string(), slug.to_string())]),
        }
    }

    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let raw = raw.split_once('#').map_or(raw, |(before, _)| before);
        let (path, query) = raw.split_once('?').unwrap_or((raw, ""));

        let file = path.rsplit('/').next().unwrap_or("");
        let kind = match file {
            DETAIL_PAGE | "game" => PageKind::Detail,
            _ => PageKind::List,
        };

        // First occurrence wins, same as URLSearchParams.get.
        let mut params = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }
        Self { kind, params }
    }
}

pub fn detail_href(slug: &str) -> String {
    format!("{DETAIL_PAGE}?{GAME_PARAM}={slug}")
}

/// Everything a page controller is allowed to see: its own parameters and
/// where the dataset lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub params: HashMap<String, String>,
    pub source: DatasetSource,
}

impl PageContext {
    pub fn new(address: &PageAddress, source: DatasetSource) -> Self {
        Self {
            params: address.params.clone(),
            source,
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

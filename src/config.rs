use crate::dataset::DatasetSource;
use crate::list::SortKey;
use crate::page::PageAddress;

const DATA_URL_ENV: &str = "SCRATCHER_DATA_URL";
const BASE_URL_ENV: &str = "SCRATCHER_BASE_URL";
const DEFAULT_SORT_ENV: &str = "SCRATCHER_DEFAULT_SORT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub source: DatasetSource,
    pub start: PageAddress,
    /// `None` when a sort key was given but not recognised; the list then
    /// keeps dataset order.
    pub sort: Option<SortKey>,
    pub search: String,
}

/// Loads `.env.local` then `.env`; values already in the environment win.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

impl AppConfig {
    pub fn from_env() -> Self {
        let args = std::env::args().skip(1).collect::<Vec<_>>();
        Self::from_parts(&args, |key| std::env::var(key).ok())
    }

    /// Flags take precedence over environment values.
    pub fn from_parts(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let source = if let Some(data) = arg_value(args, "--data") {
            DatasetSource::from_location(&data)
        } else if let Some(url) = env(DATA_URL_ENV) {
            DatasetSource::from_location(&url)
        } else if let Some(base) = env(BASE_URL_ENV) {
            DatasetSource::from_base_url(&base)
        } else {
            DatasetSource::default()
        };

        let start = if let Some(game) = arg_value(args, "--game") {
            PageAddress::detail(&game)
        } else if let Some(page) = arg_value(args, "--page") {
            PageAddress::parse(&page)
        } else {
            PageAddress::list()
        };

        let sort = match arg_value(args, "--sort").or_else(|| env(DEFAULT_SORT_ENV)) {
            Some(raw) => SortKey::parse(&raw),
            None => Some(SortKey::Ev),
        };

        Self {
            source,
            start,
            sort,
            search: arg_value(args, "--search").unwrap_or_default(),
        }
    }
}

/// Accepts both `--name=value` and `--name value`.
fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
            && !next.starts_with("--")
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::page::PageKind;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_to_local_file_and_list() {
        let cfg = AppConfig::from_parts(&[], |_| None);
        assert_eq!(cfg.source, DatasetSource::default());
        assert_eq!(cfg.start.kind, PageKind::List);
        assert_eq!(cfg.sort, Some(SortKey::Ev));
    }

    #[test]
    fn flags_override_env() {
        let env = HashMap::from([
            (DATA_URL_ENV, "https://env.example/data.json"),
            (DEFAULT_SORT_ENV, "cost"),
        ]);
        let lookup = |key: &str| env.get(key).map(|v| v.to_string());

        let cfg = AppConfig::from_parts(&args(&["--data", "local.json", "--sort=odds"]), lookup);
        assert_eq!(cfg.source, DatasetSource::from_location("local.json"));
        assert_eq!(cfg.sort, Some(SortKey::Odds));

        let cfg = AppConfig::from_parts(&[], lookup);
        assert_eq!(
            cfg.source,
            DatasetSource::Http("https://env.example/data.json".to_string())
        );
        assert_eq!(cfg.sort, Some(SortKey::Cost));
    }

    #[test]
    fn unknown_sort_key_keeps_dataset_order() {
        let cfg = AppConfig::from_parts(&args(&["--sort=newest"]), |_| None);
        assert_eq!(cfg.sort, None);

        let cfg = AppConfig::from_parts(&[], |key| {
            (key == DEFAULT_SORT_ENV).then(|| "popularity".to_string())
        });
        assert_eq!(cfg.sort, None);

        let cfg = AppConfig::from_parts(&args(&["--sort", "NAME"]), |_| None);
        assert_eq!(cfg.sort, Some(SortKey::Name));
    }

    #[test]
    fn base_url_builds_dataset_path() {
        let cfg = AppConfig::from_parts(&[], |key| {
            (key == BASE_URL_ENV).then(|| "http://localhost:8080".to_string())
        });
        assert_eq!(
            cfg.source,
            DatasetSource::Http("http://localhost:8080/web_data/current_analysis.json".to_string())
        );
    }

    #[test]
    fn start_page_from_flags() {
        let cfg = AppConfig::from_parts(&args(&["--game=lucky-7"]), |_| None);
        assert_eq!(cfg.start, PageAddress::detail("lucky-7"));

        let cfg = AppConfig::from_parts(&args(&["--page", "game.html?game=x"]), |_| None);
        assert_eq!(cfg.start, PageAddress::detail("x"));
    }
}

use std::cmp::Ordering;

use chrono::Local;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::dataset::{Dataset, GameRecord, fetch_dataset};
use crate::error::PageError;
use crate::format::{format_currency, format_grouped_currency, format_odds};
use crate::page::{PageContext, detail_href};
use crate::slug::slugify;

pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/400?text=No+Image";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Ev,
    Cost,
    Name,
    Odds,
    Jackpot,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Ev,
        SortKey::Cost,
        SortKey::Name,
        SortKey::Odds,
        SortKey::Jackpot,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ev" => Some(SortKey::Ev),
            "cost" => Some(SortKey::Cost),
            "name" => Some(SortKey::Name),
            "odds" => Some(SortKey::Odds),
            "jackpot" => Some(SortKey::Jackpot),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Ev => "EXPECTED VALUE",
            SortKey::Cost => "TICKET COST",
            SortKey::Name => "NAME",
            SortKey::Odds => "BEST ODDS",
            SortKey::Jackpot => "TOP PRIZE",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SortKey::Ev => SortKey::Cost,
            SortKey::Cost => SortKey::Name,
            SortKey::Name => SortKey::Odds,
            SortKey::Odds => SortKey::Jackpot,
            SortKey::Jackpot => SortKey::Ev,
        }
    }
}

/// Search text plus sort order. `sort: None` keeps dataset order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search: String,
    pub sort: Option<SortKey>,
}

/// Records whose name contains `query`, case-insensitively, in dataset
/// order. An empty query keeps everything.
pub fn filter_games<'a>(games: &'a [GameRecord], query: &str) -> Vec<&'a GameRecord> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return games.iter().collect();
    }
    games
        .iter()
        .filter(|game| game.name.to_lowercase().contains(&needle))
        .collect()
}

/// Stable sort: records with equal keys keep their relative order.
pub fn sort_games(games: &mut [&GameRecord], key: SortKey) {
    match key {
        SortKey::Ev => games.sort_by(|a, b| desc(a.net_ev, b.net_ev)),
        SortKey::Cost => games.sort_by(|a, b| desc(a.cost, b.cost)),
        SortKey::Name => games.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortKey::Odds => games.sort_by(|a, b| {
            a.current_odds
                .partial_cmp(&b.current_odds)
                .unwrap_or(Ordering::Equal)
        }),
        SortKey::Jackpot => games.sort_by(|a, b| desc(a.jackpot, b.jackpot)),
    }
}

fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Collation close to the default English locale order. Levels, compared in
/// turn: base letters ignoring accents and case, then accents, then case
/// (lowercase first). Whitespace sorts before punctuation, punctuation
/// before digits, digits before letters.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let (a_chars, b_chars) = (decompose(a), decompose(b));
    primary_key(&a_chars)
        .cmp(&primary_key(&b_chars))
        .then_with(|| accent_key(&a_chars).cmp(&accent_key(&b_chars)))
        .then_with(|| case_key(&a_chars).cmp(&case_key(&b_chars)))
        .then_with(|| a.cmp(b))
}

// Root collation order for ASCII punctuation and symbols.
const PUNCT_ORDER: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

fn decompose(s: &str) -> Vec<char> {
    s.nfd().collect()
}

fn primary_key(chars: &[char]) -> Vec<(u8, u32)> {
    chars
        .iter()
        .filter(|c| !is_combining_mark(**c))
        .flat_map(|c| c.to_lowercase())
        .map(weight)
        .collect()
}

/// Combining marks grouped under the base character they follow.
fn accent_key(chars: &[char]) -> Vec<Vec<char>> {
    let mut key: Vec<Vec<char>> = Vec::new();
    for &c in chars {
        if is_combining_mark(c) {
            if let Some(last) = key.last_mut() {
                last.push(c);
            }
        } else {
            key.push(Vec::new());
        }
    }
    key
}

fn case_key(chars: &[char]) -> Vec<bool> {
    chars
        .iter()
        .filter(|c| !is_combining_mark(**c))
        .map(|c| c.is_uppercase())
        .collect()
}

fn weight(c: char) -> (u8, u32) {
    if c.is_whitespace() {
        (0, c as u32)
    } else if c.is_numeric() {
        (2, c as u32)
    } else if c.is_alphabetic() {
        (3, c as u32)
    } else {
        let rank = PUNCT_ORDER
            .chars()
            .position(|p| p == c)
            .map_or(PUNCT_ORDER.len() as u32 + c as u32, |pos| pos as u32);
        (1, rank)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvSign {
    Positive,
    Negative,
}

impl EvSign {
    pub fn of(net_ev: f64) -> Self {
        if net_ev >= 0.0 {
            EvSign::Positive
        } else {
            EvSign::Negative
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameCard {
    pub name: String,
    pub slug: String,
    pub cost: String,
    pub odds: String,
    pub jackpot: String,
    pub net_ev: String,
    pub ev_sign: EvSign,
    pub image_url: String,
    pub href: String,
}

impl GameCard {
    pub fn from_game(game: &GameRecord) -> Self {
        let slug = slugify(&game.name);
        let image = game.image_url.trim();
        Self {
            name: game.name.clone(),
            cost: format_currency(game.cost),
            odds: format_odds(game.current_odds),
            jackpot: format_grouped_currency(game.jackpot),
            net_ev: format_currency(game.net_ev),
            ev_sign: EvSign::of(game.net_ev),
            image_url: if image.is_empty() {
                PLACEHOLDER_IMAGE.to_string()
            } else {
                image.to_string()
            },
            href: detail_href(&slug),
            slug,
        }
    }
}

/// Recomputed from the full dataset on every call; no incremental state.
pub fn build_cards(games: &[GameRecord], query: &ListQuery) -> Vec<GameCard> {
    let mut filtered = filter_games(games, &query.search);
    if let Some(key) = query.sort {
        sort_games(&mut filtered, key);
    }
    filtered.into_iter().map(GameCard::from_game).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListStatus {
    Loading,
    Ready {
        dataset: Dataset,
        last_updated: String,
    },
    Failed(PageError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListView {
    Loading,
    Error(String),
    Grid {
        cards: Vec<GameCard>,
        total: usize,
        rejected: usize,
        last_updated: String,
    },
}

#[derive(Debug, Clone)]
pub struct ListController {
    ctx: PageContext,
    status: ListStatus,
}

impl ListController {
    /// The list always starts loading; the caller performs the one fetch
    /// for `ctx.source` and hands the outcome to [`ListController::apply_load`].
    pub fn open(ctx: PageContext) -> Self {
        Self {
            ctx,
            status: ListStatus::Loading,
        }
    }

    /// Open and fetch on the calling thread.
    pub fn load(ctx: PageContext) -> Self {
        let mut controller = Self::open(ctx);
        let result = fetch_dataset(&controller.ctx.source);
        controller.apply_load(result);
        controller
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, ListStatus::Loading)
    }

    pub fn apply_load(&mut self, result: Result<Dataset, PageError>) {
        self.status = match result {
            Ok(dataset) => ListStatus::Ready {
                dataset,
                last_updated: format!(
                    "Last updated: {}",
                    Local::now().format("%Y-%m-%d %H:%M:%S")
                ),
            },
            Err(err) => ListStatus::Failed(err),
        };
    }

    pub fn games(&self) -> &[GameRecord] {
        match &self.status {
            ListStatus::Ready { dataset, .. } => dataset.games.as_slice(),
            _ => &[],
        }
    }

    pub fn view(&self, query: &ListQuery) -> ListView {
        match &self.status {
            ListStatus::Loading => ListView::Loading,
            ListStatus::Failed(err) => ListView::Error(err.to_string()),
            ListStatus::Ready {
                dataset,
                last_updated,
            } => ListView::Grid {
                cards: build_cards(&dataset.games, query),
                total: dataset.games.len(),
                rejected: dataset.rejected.len(),
                last_updated: last_updated.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_compare_case_insensitively() {
        assert_eq!(compare_names("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_names("Zebra", "alpha"), Ordering::Greater);
        assert_eq!(compare_names("apple", "Apple"), Ordering::Less);
        assert_eq!(compare_names("Same", "Same"), Ordering::Equal);
    }

    #[test]
    fn digits_and_spaces_before_letters() {
        assert_eq!(compare_names("7s Wild", "Aces"), Ordering::Less);
        assert_eq!(compare_names("Gold Rush", "Golden"), Ordering::Less);
        assert_eq!(compare_names("$100 Frenzy", "100 Frenzy"), Ordering::Less);
    }

    #[test]
    fn accented_names_sort_with_their_base_letter() {
        let mut names = vec!["Fun Cash", "Émerald 7s", "Zip", "Año Nuevo", "Azure"];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(names, vec!["Año Nuevo", "Azure", "Émerald 7s", "Fun Cash", "Zip"]);

        assert_eq!(compare_names("Ano", "Año"), Ordering::Less);
        assert_eq!(compare_names("Año", "Anz"), Ordering::Less);
        assert_eq!(compare_names("émerald", "Emerald"), Ordering::Greater);
    }

    #[test]
    fn punctuation_follows_root_order() {
        let mut names = vec!["-x", "_x", " x", "$x", "1x"];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(names, vec![" x", "_x", "-x", "$x", "1x"]);
    }

    #[test]
    fn sort_key_cycles_through_all() {
        let mut key = SortKey::Ev;
        for expected in SortKey::ALL.iter().skip(1) {
            key = key.next();
            assert_eq!(key, *expected);
        }
        assert_eq!(key.next(), SortKey::Ev);
        assert_eq!(SortKey::parse("JACKPOT"), Some(SortKey::Jackpot));
        assert_eq!(SortKey::parse("newest"), None);
    }
}

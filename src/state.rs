use std::collections::VecDeque;

use crate::dataset::{Dataset, DatasetSource};
use crate::detail::{DetailController, DetailStatus};
use crate::error::PageError;
use crate::list::{GameCard, ListController, ListQuery, SortKey, build_cards};
use crate::page::{PageAddress, PageContext, PageKind};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

/// One dataset read the UI asked for. `visit` identifies the page visit
/// that will consume the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub visit: u64,
    pub kind: PageKind,
    pub source: DatasetSource,
}

#[derive(Debug, Clone)]
pub enum Delta {
    ListLoaded {
        visit: u64,
        result: Result<Dataset, PageError>,
    },
    DetailLoaded {
        visit: u64,
        result: Result<Dataset, PageError>,
    },
}

pub struct AppState {
    pub screen: Screen,
    pub visit: u64,
    pub source: DatasetSource,
    pub list: Option<ListController>,
    pub detail: Option<DetailController>,
    pub query: ListQuery,
    pub selected: usize,
    pub detail_scroll: u16,
    pub input_mode: InputMode,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
}

impl AppState {
    pub fn new(source: DatasetSource, sort: Option<SortKey>) -> Self {
        Self {
            screen: Screen::List,
            visit: 0,
            source,
            list: None,
            detail: None,
            query: ListQuery {
                search: String::new(),
                sort,
            },
            selected: 0,
            detail_scroll: 0,
            input_mode: InputMode::Normal,
            help_overlay: false,
            logs: VecDeque::new(),
        }
    }

    /// Starts a fresh page visit. The previous page's controller is dropped,
    /// so any fetch still in flight for it is ignored when it lands.
    pub fn open(&mut self, address: &PageAddress) -> Option<FetchRequest> {
        self.visit += 1;
        self.selected = 0;
        self.detail_scroll = 0;
        self.input_mode = InputMode::Normal;
        let ctx = PageContext::new(address, self.source.clone());

        match address.kind {
            PageKind::List => {
                self.screen = Screen::List;
                self.detail = None;
                self.list = Some(ListController::open(ctx));
                self.push_log(format!("[INFO] Loading {}", self.source.describe()));
                Some(self.fetch_request(PageKind::List))
            }
            PageKind::Detail => {
                self.screen = Screen::Detail;
                self.list = None;
                let controller = DetailController::open(ctx);
                let needs_fetch = controller.needs_fetch();
                if let Some(err) = controller.error_message() {
                    self.push_log(format!("[ERROR] {err}"));
                }
                self.detail = Some(controller);
                needs_fetch.then(|| self.fetch_request(PageKind::Detail))
            }
        }
    }

    fn fetch_request(&self, kind: PageKind) -> FetchRequest {
        FetchRequest {
            visit: self.visit,
            kind,
            source: self.source.clone(),
        }
    }

    /// Follows the selected card's link to its detail page.
    pub fn open_selected(&mut self) -> Option<FetchRequest> {
        let Some(card) = self.selected_card() else {
            self.push_log("[INFO] No game selected");
            return None;
        };
        let address = PageAddress::parse(&card.href);
        self.open(&address)
    }

    pub fn back_to_list(&mut self) -> Option<FetchRequest> {
        self.open(&PageAddress::list())
    }

    pub fn cards(&self) -> Vec<GameCard> {
        match &self.list {
            Some(list) => build_cards(list.games(), &self.query),
            None => Vec::new(),
        }
    }

    pub fn selected_card(&self) -> Option<GameCard> {
        self.cards().into_iter().nth(self.selected)
    }

    pub fn select_next(&mut self) {
        let total = self.cards().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.cards().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        if self.selected == 0 {
            self.selected = total - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn clamp_selection(&mut self) {
        let total = self.cards().len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    pub fn cycle_sort(&mut self) {
        let next = self.query.sort.map_or(SortKey::Ev, SortKey::next);
        self.query.sort = Some(next);
        self.selected = 0;
    }

    pub fn push_search_char(&mut self, ch: char) {
        self.query.search.push(ch);
        self.selected = 0;
    }

    pub fn pop_search_char(&mut self) {
        self.query.search.pop();
        self.clamp_selection();
    }

    pub fn clear_search(&mut self) {
        self.query.search.clear();
        self.clamp_selection();
    }

    /// Each tier takes three lines in the tier list.
    pub fn scroll_detail_down(&mut self) {
        let lines = self
            .detail
            .as_ref()
            .and_then(|d| d.detail())
            .map_or(0, |d| d.tiers.len() * 3);
        let max_scroll = u16::try_from(lines.saturating_sub(1)).unwrap_or(u16::MAX);
        self.detail_scroll = self.detail_scroll.saturating_add(1).min(max_scroll);
    }

    pub fn scroll_detail_up(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::ListLoaded { visit, result } => {
            if visit != state.visit {
                return;
            }
            let Some(list) = state.list.as_mut() else {
                return;
            };
            let logs = load_logs(&state.source, &result);
            list.apply_load(result);
            for line in logs {
                state.push_log(line);
            }
            state.clamp_selection();
        }
        Delta::DetailLoaded { visit, result } => {
            if visit != state.visit {
                return;
            }
            let Some(detail) = state.detail.as_mut() else {
                return;
            };
            let mut logs = load_logs(&state.source, &result);
            detail.apply_load(result);
            match detail.status() {
                DetailStatus::Ready(game) => {
                    logs.push(format!("[INFO] Showing {}", game.name));
                    let collisions = detail.slug_collisions();
                    if collisions > 0 {
                        logs.push(format!(
                            "[WARN] {collisions} other game(s) share slug {}; showing the first",
                            game.slug
                        ));
                    }
                }
                DetailStatus::Failed(PageError::NotFound) => logs.push(format!(
                    "[ERROR] Game not found: {}",
                    detail.slug().unwrap_or_default()
                )),
                _ => {}
            }
            for line in logs {
                state.push_log(line);
            }
        }
    }
}

fn load_logs(source: &DatasetSource, result: &Result<Dataset, PageError>) -> Vec<String> {
    match result {
        Ok(dataset) => {
            let mut lines = vec![format!(
                "[INFO] Loaded {} games from {}",
                dataset.len(),
                source.describe()
            )];
            lines.extend(
                dataset
                    .rejected
                    .iter()
                    .map(|rejected| format!("[WARN] Skipped {rejected}")),
            );
            lines
        }
        Err(err) => vec![format!("[ERROR] {err}")],
    }
}

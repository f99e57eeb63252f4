use crate::dataset::{Dataset, GameRecord, fetch_dataset};
use crate::error::PageError;
use crate::format::{
    format_count, format_currency, format_grouped_currency, format_odds, format_percentage,
    to_fixed,
};
use crate::list::EvSign;
use crate::page::{GAME_PARAM, PageContext};
use crate::slug::slugify;

pub const SITE_TITLE: &str = "AZ Scratcher Analytics";
pub const CHART_TITLE: &str = "Distribution of Remaining Winning Tickets";
pub const CHART_SERIES_LABEL: &str = "% of Remaining Winning Tickets";
pub const CHART_AXIS_TITLE: &str = "% of Winning Tickets";

/// Percent label shared by the tier list, bar values and axis ticks.
pub fn percent_label(value: f64) -> String {
    format!("{}%", format_percentage(value))
}

#[derive(Debug, Clone, PartialEq)]
pub struct TierRow {
    pub prize_amount: f64,
    pub prize: String,
    pub percentage: f64,
    pub remaining: u64,
    pub total: u64,
    pub claimed: Option<u64>,
}

impl TierRow {
    pub fn percentage_text(&self) -> String {
        format!("{} of winning tickets", percent_label(self.percentage))
    }

    pub fn remaining_text(&self) -> String {
        format!(
            "Remaining: {} / {}",
            format_count(self.remaining),
            format_count(self.total)
        )
    }

    /// Only present when the source reports claimed counts for the tier.
    pub fn claimed_text(&self) -> Option<String> {
        self.claimed
            .map(|claimed| format!("Claimed: {}", format_count(claimed)))
    }

    /// `$1,000,000 — 0.002000% of winning tickets, Remaining: 1 / 5`
    pub fn line(&self) -> String {
        format!(
            "{} — {}, {}",
            self.prize,
            self.percentage_text(),
            self.remaining_text()
        )
    }
}

/// Bar chart input: one categorical label and one value per tier, in tier
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct PrizeChart {
    pub title: &'static str,
    pub series_label: &'static str,
    pub axis_title: &'static str,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl PrizeChart {
    pub fn from_tiers(tiers: &[TierRow]) -> Self {
        Self {
            title: CHART_TITLE,
            series_label: CHART_SERIES_LABEL,
            axis_title: CHART_AXIS_TITLE,
            labels: tiers.iter().map(|t| t.prize.clone()).collect(),
            values: tiers.iter().map(|t| t.percentage).collect(),
        }
    }

    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    pub fn value_label(&self, value: f64) -> String {
        percent_label(value)
    }

    pub fn tooltip(&self, value: f64) -> String {
        format!("{} of winning tickets", percent_label(value))
    }

    /// Y axis ticks from the top down: max, half of max, zero.
    pub fn axis_ticks(&self) -> Vec<String> {
        let max = self.max_value();
        [max, max / 2.0, 0.0]
            .into_iter()
            .map(percent_label)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameDetail {
    pub title: String,
    pub name: String,
    pub slug: String,
    pub cost: String,
    pub odds: String,
    pub jackpot: String,
    pub net_ev: String,
    pub ev_sign: EvSign,
    pub prize_pool: Option<String>,
    pub note: String,
    pub ticket_summary: String,
    pub winning_summary: Option<String>,
    pub tiers: Vec<TierRow>,
    pub chart: PrizeChart,
}

impl GameDetail {
    pub fn from_game(game: &GameRecord) -> Self {
        let tiers = game
            .tiers_by_prize_desc()
            .into_iter()
            .map(|(amount, tier)| TierRow {
                prize_amount: amount,
                prize: format_grouped_currency(amount),
                percentage: tier.percentage,
                remaining: tier.remaining,
                total: tier.total,
                claimed: tier.claimed,
            })
            .collect::<Vec<_>>();
        let chart = PrizeChart::from_tiers(&tiers);
        let tickets = &game.ticket_data;
        let winning_summary = match (tickets.remaining_winning, tickets.total_winning) {
            (Some(remaining), Some(total)) => Some(format!(
                "Winning tickets remaining: {} / {}",
                format_count(remaining),
                format_count(total)
            )),
            _ => None,
        };

        Self {
            title: format!("{} - {SITE_TITLE}", game.name),
            name: game.name.clone(),
            slug: slugify(&game.name),
            cost: format_currency(game.cost),
            odds: format_odds(game.current_odds),
            jackpot: format_grouped_currency(game.jackpot),
            net_ev: format_currency(game.net_ev),
            ev_sign: EvSign::of(game.net_ev),
            prize_pool: game.prize_pool_remaining.map(format_grouped_currency),
            note: format!(
                "Percentages shown represent the distribution of remaining winning tickets. \
                 The actual odds of winning any prize are 1 in {} as stated on the ticket.",
                to_fixed(game.current_odds, 2)
            ),
            ticket_summary: format!(
                "Total tickets: {}, Remaining: {} ({}%)",
                format_count(tickets.total_tickets),
                format_count(tickets.remaining_tickets),
                to_fixed(tickets.percent_remaining, 1)
            ),
            winning_summary,
            tiers,
            chart,
        }
    }
}

/// First record whose slug equals `slug`, plus how many records share it.
pub fn locate_game<'a>(games: &'a [GameRecord], slug: &str) -> (Option<&'a GameRecord>, usize) {
    let mut first = None;
    let mut matches = 0;
    for game in games {
        if slugify(&game.name) == slug {
            matches += 1;
            if first.is_none() {
                first = Some(game);
            }
        }
    }
    (first, matches)
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailStatus {
    Loading,
    Ready(Box<GameDetail>),
    Failed(PageError),
}

#[derive(Debug, Clone)]
pub struct DetailController {
    ctx: PageContext,
    slug: Option<String>,
    status: DetailStatus,
    slug_matches: usize,
}

impl DetailController {
    /// Fails straight away when the `game` parameter is missing or empty;
    /// otherwise waits for its own fetch of the dataset.
    pub fn open(ctx: PageContext) -> Self {
        let slug = ctx
            .param(GAME_PARAM)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let status = if slug.is_some() {
            DetailStatus::Loading
        } else {
            DetailStatus::Failed(PageError::MissingParameter)
        };
        Self {
            ctx,
            slug,
            status,
            slug_matches: 0,
        }
    }

    pub fn load(ctx: PageContext) -> Self {
        let mut controller = Self::open(ctx);
        if controller.needs_fetch() {
            let result = fetch_dataset(&controller.ctx.source);
            controller.apply_load(result);
        }
        controller
    }

    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    pub fn status(&self) -> &DetailStatus {
        &self.status
    }

    pub fn needs_fetch(&self) -> bool {
        matches!(self.status, DetailStatus::Loading)
    }

    /// Records beyond the first that share the requested slug.
    pub fn slug_collisions(&self) -> usize {
        self.slug_matches.saturating_sub(1)
    }

    pub fn apply_load(&mut self, result: Result<Dataset, PageError>) {
        if !self.needs_fetch() {
            return;
        }
        let Some(slug) = self.slug.as_deref() else {
            self.status = DetailStatus::Failed(PageError::MissingParameter);
            return;
        };
        self.status = match result {
            Ok(dataset) => {
                let (game, matches) = locate_game(&dataset.games, slug);
                self.slug_matches = matches;
                match game {
                    Some(game) => DetailStatus::Ready(Box::new(GameDetail::from_game(game))),
                    None => DetailStatus::Failed(PageError::NotFound),
                }
            }
            Err(err) => DetailStatus::Failed(err),
        };
    }

    pub fn detail(&self) -> Option<&GameDetail> {
        match &self.status {
            DetailStatus::Ready(detail) => Some(detail.as_ref()),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        match &self.status {
            DetailStatus::Failed(err) => Some(err.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(amount: f64, percentage: f64) -> TierRow {
        TierRow {
            prize_amount: amount,
            prize: format_grouped_currency(amount),
            percentage,
            remaining: 1,
            total: 2,
            claimed: None,
        }
    }

    #[test]
    fn chart_labels_use_tier_formatting() {
        let tiers = vec![tier(1000.0, 0.004), tier(10.0, 12.5)];
        let chart = PrizeChart::from_tiers(&tiers);
        assert_eq!(chart.labels, vec!["$1,000", "$10"]);
        assert_eq!(chart.value_label(0.004), "0.004000%");
        assert_eq!(chart.tooltip(12.5), "12.50% of winning tickets");
        assert_eq!(tiers[0].percentage_text(), chart.tooltip(0.004));
        assert_eq!(chart.axis_ticks(), vec!["12.50%", "6.25%", "0.000000%"]);
    }

    #[test]
    fn claimed_count_is_optional() {
        let mut row = tier(100.0, 5.0);
        assert_eq!(row.claimed_text(), None);
        row.claimed = Some(12_500);
        assert_eq!(row.claimed_text().as_deref(), Some("Claimed: 12,500"));
    }

    #[test]
    fn empty_chart_has_zero_axis() {
        let chart = PrizeChart::from_tiers(&[]);
        assert_eq!(chart.max_value(), 0.0);
        assert_eq!(chart.axis_ticks(), vec!["0.000000%"; 3]);
    }
}

//! Plain-text rendering of both pages for non-interactive output.

use crate::detail::{DetailController, DetailStatus, GameDetail};
use crate::list::{EvSign, GameCard, ListView};

pub fn ev_flag(sign: EvSign) -> &'static str {
    match sign {
        EvSign::Positive => "+EV",
        EvSign::Negative => "-EV",
    }
}

pub fn card_lines(card: &GameCard) -> Vec<String> {
    vec![
        card.name.clone(),
        format!("  TICKET COST     {}", card.cost),
        format!("  OVERALL ODDS    {}", card.odds),
        format!("  TOP PRIZE       {}", card.jackpot),
        format!(
            "  EXPECTED VALUE  {} ({})",
            card.net_ev,
            ev_flag(card.ev_sign)
        ),
        format!("  Image: {}", card.image_url),
        format!("  View Details: {}", card.href),
    ]
}

pub fn render_list_text(view: &ListView) -> String {
    match view {
        ListView::Loading => "Loading game data...".to_string(),
        ListView::Error(msg) => msg.clone(),
        ListView::Grid {
            cards,
            total,
            rejected,
            last_updated,
        } => {
            let mut lines = vec![
                last_updated.clone(),
                format!("Showing {} of {} games", cards.len(), total),
            ];
            if *rejected > 0 {
                lines.push(format!("{rejected} malformed record(s) skipped"));
            }
            for card in cards {
                lines.push(String::new());
                lines.extend(card_lines(card));
            }
            lines.join("\n")
        }
    }
}

pub fn detail_lines(detail: &GameDetail) -> Vec<String> {
    let mut lines = vec![
        detail.title.clone(),
        String::new(),
        format!("TICKET COST     {}", detail.cost),
        format!("OVERALL ODDS    {}", detail.odds),
        format!("TOP PRIZE       {}", detail.jackpot),
        format!(
            "EXPECTED VALUE  {} ({})",
            detail.net_ev,
            ev_flag(detail.ev_sign)
        ),
    ];
    if let Some(pool) = &detail.prize_pool {
        lines.push(format!("PRIZE POOL      {pool}"));
    }
    lines.push(String::new());
    lines.push(format!("Note: {}", detail.note));
    lines.push(detail.ticket_summary.clone());
    if let Some(winning) = &detail.winning_summary {
        lines.push(winning.clone());
    }
    lines.push(String::new());
    lines.push("Prize tiers:".to_string());
    lines.extend(detail.tiers.iter().map(|tier| match tier.claimed_text() {
        Some(claimed) => format!("  {}, {claimed}", tier.line()),
        None => format!("  {}", tier.line()),
    }));
    lines
}

pub fn render_detail_text(controller: &DetailController) -> String {
    match controller.status() {
        DetailStatus::Loading => "Loading game data...".to_string(),
        DetailStatus::Failed(err) => err.to_string(),
        DetailStatus::Ready(detail) => detail_lines(detail).join("\n"),
    }
}

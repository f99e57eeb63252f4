use std::path::PathBuf;

use scratcher_terminal::dataset::DatasetSource;
use scratcher_terminal::detail::{DetailController, DetailStatus};
use scratcher_terminal::error::PageError;
use scratcher_terminal::list::EvSign;
use scratcher_terminal::page::{PageAddress, PageContext};
use scratcher_terminal::report::render_detail_text;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn open(address: &str, fixture: &str) -> DetailController {
    let ctx = PageContext::new(
        &PageAddress::parse(address),
        DatasetSource::File(fixture_path(fixture)),
    );
    DetailController::load(ctx)
}

#[test]
fn lucky_seven_tier_row() {
    let controller = open("game.html?game=lucky-7", "lucky7.json");
    let detail = controller.detail().expect("detail should render");
    assert_eq!(detail.name, "Lucky 7");
    assert_eq!(detail.title, "Lucky 7 - AZ Scratcher Analytics");
    assert_eq!(detail.cost, "$5.00");
    assert_eq!(detail.odds, "1:4.12");
    assert_eq!(detail.jackpot, "$100,000");
    assert_eq!(detail.net_ev, "$-0.83");
    assert_eq!(detail.ev_sign, EvSign::Negative);
    assert_eq!(detail.tiers.len(), 1);
    assert_eq!(
        detail.tiers[0].line(),
        "$1,000,000 — 0.002000% of winning tickets, Remaining: 1 / 5"
    );
    assert_eq!(
        detail.ticket_summary,
        "Total tickets: 1,000,000, Remaining: 400,000 (40.0%)"
    );
    assert!(detail.note.contains("1 in 4.12"));
    assert_eq!(detail.chart.labels, vec!["$1,000,000"]);
    assert_eq!(detail.chart.values, vec![0.002]);
}

#[test]
fn tiers_are_ordered_by_prize_amount() {
    let controller = open("game.html?game=gold-rush", "current_analysis.json");
    let detail = controller.detail().expect("detail should render");
    let prizes = detail.tiers.iter().map(|t| t.prize.as_str()).collect::<Vec<_>>();
    assert_eq!(prizes, vec!["$500,000", "$100", "$10"]);
    assert_eq!(detail.chart.labels, vec!["$500,000", "$100", "$10"]);
    assert_eq!(
        detail.tiers[0].line(),
        "$500,000 — 0.0125% of winning tickets, Remaining: 1 / 4"
    );
    assert_eq!(
        detail.tiers[2].line(),
        "$10 — 62.50% of winning tickets, Remaining: 5,000 / 12,000"
    );
    assert_eq!(detail.tiers[2].claimed, Some(7000));
    assert_eq!(
        detail.ticket_summary,
        "Total tickets: 600,000, Remaining: 254,000 (42.3%)"
    );
    assert_eq!(
        detail.winning_summary.as_deref(),
        Some("Winning tickets remaining: 8,000 / 18,004")
    );
    assert_eq!(detail.prize_pool.as_deref(), Some("$1,250,000"));
}

#[test]
fn chart_and_tier_list_share_formatting() {
    let controller = open("game.html?game=golden-ticket", "current_analysis.json");
    let detail = controller.detail().expect("detail should render");
    for (tier, value) in detail.tiers.iter().zip(&detail.chart.values) {
        assert_eq!(tier.percentage_text(), detail.chart.tooltip(*value));
    }
    assert_eq!(detail.chart.value_label(0.0004), "0.000400%");
    assert_eq!(detail.chart.axis_ticks()[0], "100.00%");
}

#[test]
fn unknown_slug_is_not_found() {
    let controller = open("game.html?game=nonexistent", "lucky7.json");
    assert_eq!(controller.status(), &DetailStatus::Failed(PageError::NotFound));
    assert!(controller.detail().is_none());
    assert_eq!(controller.error_message().as_deref(), Some("Game not found"));
    assert_eq!(render_detail_text(&controller), "Game not found");
}

#[test]
fn missing_or_empty_parameter_fails_without_fetching() {
    for address in ["game.html", "game.html?game=", "game.html?other=lucky-7"] {
        let ctx = PageContext::new(
            &PageAddress::parse(address),
            DatasetSource::File(fixture_path("does_not_exist.json")),
        );
        let controller = DetailController::open(ctx);
        assert!(!controller.needs_fetch());
        assert_eq!(
            controller.status(),
            &DetailStatus::Failed(PageError::MissingParameter)
        );
        assert_eq!(controller.error_message().as_deref(), Some("No game specified"));
    }
}

#[test]
fn load_failure_keeps_content_hidden() {
    let controller = open("game.html?game=lucky-7", "not_array.json");
    assert!(controller.detail().is_none());
    let msg = controller.error_message().expect("should fail");
    assert!(msg.starts_with("Failed to load game data: "));
}

#[test]
fn slug_collision_takes_first_match() {
    let controller = open("game.html?game=win-big", "slug_collision.json");
    let detail = controller.detail().expect("detail should render");
    assert_eq!(detail.name, "Win Big!");
    assert_eq!(controller.slug_collisions(), 1);
}

#[test]
fn report_lists_every_tier_line() {
    let controller = open("game.html?game=lucky-7", "lucky7.json");
    let text = render_detail_text(&controller);
    assert!(text.starts_with("Lucky 7 - AZ Scratcher Analytics"));
    assert!(text.contains("$1,000,000 — 0.002000% of winning tickets, Remaining: 1 / 5"));
    assert!(text.contains("EXPECTED VALUE  $-0.83 (-EV)"));
}

#[test]
fn report_shows_claimed_counts_when_present() {
    let controller = open("game.html?game=gold-rush", "current_analysis.json");
    let text = render_detail_text(&controller);
    assert!(text.contains(
        "  $10 — 62.50% of winning tickets, Remaining: 5,000 / 12,000, Claimed: 7,000"
    ));
    assert!(text.contains("  $500,000 — 0.0125% of winning tickets, Remaining: 1 / 4, Claimed: 3"));
}

use std::collections::HashMap;
use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Wrap};

use scratcher_terminal::config::{AppConfig, load_dotenv};
use scratcher_terminal::detail::{DetailStatus, GameDetail, PrizeChart, SITE_TITLE};
use scratcher_terminal::list::{EvSign, GameCard, ListView};
use scratcher_terminal::loader::spawn_dataset_fetch;
use scratcher_terminal::page::{PageAddress, PageKind};
use scratcher_terminal::state::{AppState, Delta, FetchRequest, InputMode, Screen, apply_delta};

// Bars take integer heights; percentages are scaled so tiers far below 1%
// still get a distinct height.
const CHART_SCALE: f64 = 1_000_000.0;
const CARD_WIDTH: u16 = 36;
const CARD_HEIGHT: u16 = 8;

struct App {
    state: AppState,
    should_quit: bool,
    tx: mpsc::Sender<Delta>,
}

impl App {
    fn new(state: AppState, tx: mpsc::Sender<Delta>) -> Self {
        Self {
            state,
            should_quit: false,
            tx,
        }
    }

    fn dispatch(&mut self, request: Option<FetchRequest>) {
        if let Some(request) = request {
            spawn_dataset_fetch(request, self.tx.clone());
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.input_mode == InputMode::Search {
            self.on_search_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Char('r') => self.reload(),
            _ => match self.state.screen {
                Screen::List => self.on_list_key(key),
                Screen::Detail => self.on_detail_key(key),
            },
        }
    }

    fn on_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('/') => self.state.input_mode = InputMode::Search,
            KeyCode::Char('s') => self.state.cycle_sort(),
            KeyCode::Char('c') => self.state.clear_search(),
            KeyCode::Char('j') | KeyCode::Down | KeyCode::Right => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up | KeyCode::Left => self.state.select_prev(),
            KeyCode::Char('d') | KeyCode::Enter => {
                let request = self.state.open_selected();
                self.dispatch(request);
            }
            _ => {}
        }
    }

    fn on_detail_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('b') | KeyCode::Esc | KeyCode::Backspace => {
                let request = self.state.back_to_list();
                self.dispatch(request);
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_detail_down(),
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_detail_up(),
            _ => {}
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state.clear_search();
                self.state.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => self.state.input_mode = InputMode::Normal,
            KeyCode::Backspace => self.state.pop_search_char(),
            KeyCode::Char(ch) => self.state.push_search_char(ch),
            _ => {}
        }
    }

    /// A reload is a new visit to the current page.
    fn reload(&mut self) {
        let address = match self.state.screen {
            Screen::List => PageAddress::list(),
            Screen::Detail => match self.state.detail.as_ref().and_then(|d| d.slug()) {
                Some(slug) => PageAddress::detail(slug),
                None => PageAddress {
                    kind: PageKind::Detail,
                    params: HashMap::new(),
                },
            },
        };
        let request = self.state.open(&address);
        self.dispatch(request);
    }
}

fn main() -> anyhow::Result<()> {
    load_dotenv();
    let config = AppConfig::from_env();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let mut state = AppState::new(config.source.clone(), config.sort);
    state.query.search = config.search.clone();
    if config.sort.is_none() {
        state.push_log("[WARN] Unknown sort key; keeping dataset order");
    }
    let request = state.open(&config.start);

    let mut app = App::new(state, tx);
    app.dispatch(request);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::List => render_list(frame, chunks[1], &app.state),
        Screen::Detail => render_detail(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let title = match state.screen {
        Screen::List => {
            let sort = state.query.sort.map_or("NONE", |key| key.label());
            let search = if state.input_mode == InputMode::Search {
                format!("{}_", state.query.search)
            } else if state.query.search.is_empty() {
                "-".to_string()
            } else {
                state.query.search.clone()
            };
            format!(
                "{} | Sort: {} | Search: {}",
                SITE_TITLE.to_uppercase(),
                sort,
                search
            )
        }
        Screen::Detail => state
            .detail
            .as_ref()
            .and_then(|d| d.detail())
            .map(|d| d.title.clone())
            .unwrap_or_else(|| SITE_TITLE.to_string()),
    };
    format!("  $$  {title}\n [**]\n")
}

fn footer_text(state: &AppState) -> String {
    match (state.screen, state.input_mode) {
        (Screen::List, InputMode::Search) => {
            "Type to search | Backspace Delete | Enter Done | Esc Clear".to_string()
        }
        (Screen::List, InputMode::Normal) => {
            "j/k/↑/↓ Move | Enter/d Details | / Search | c Clear | s Sort | r Reload | ? Help | q Quit"
                .to_string()
        }
        (Screen::Detail, _) => {
            "b/Esc Back | j/k Scroll tiers | r Reload | ? Help | q Quit".to_string()
        }
    }
}

fn render_list(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(list) = &state.list else {
        return;
    };
    match list.view(&state.query) {
        ListView::Loading => render_loading(frame, area),
        ListView::Error(msg) => render_error(frame, area, &msg),
        ListView::Grid {
            cards,
            total,
            rejected,
            last_updated,
        } => {
            let sections = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(1)])
                .split(area);

            let mut summary = format!("{last_updated} | {} of {total} games", cards.len());
            if rejected > 0 {
                summary.push_str(&format!(" | {rejected} malformed skipped"));
            }
            let summary = Paragraph::new(summary).style(Style::default().fg(Color::DarkGray));
            frame.render_widget(summary, sections[0]);

            render_card_grid(frame, sections[1], &cards, state.selected);
        }
    }
}

fn render_card_grid(frame: &mut Frame, area: Rect, cards: &[GameCard], selected: usize) {
    if cards.is_empty() {
        let empty = Paragraph::new("No games match this search")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }
    if area.height < CARD_HEIGHT || area.width < CARD_WIDTH {
        let empty = Paragraph::new("Card grid needs more room")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let columns = (area.width / CARD_WIDTH).max(1) as usize;
    let visible_rows = (area.height / CARD_HEIGHT) as usize;
    let total_rows = cards.len().div_ceil(columns);
    let (start_row, end_row) = visible_range(selected / columns, total_rows, visible_rows);

    for (row_offset, row) in (start_row..end_row).enumerate() {
        for col in 0..columns {
            let idx = row * columns + col;
            let Some(card) = cards.get(idx) else {
                break;
            };
            let card_area = Rect {
                x: area.x + (col as u16) * CARD_WIDTH,
                y: area.y + (row_offset as u16) * CARD_HEIGHT,
                width: CARD_WIDTH,
                height: CARD_HEIGHT,
            };
            render_card(frame, card_area, card, idx == selected);
        }
    }
}

fn render_card(frame: &mut Frame, area: Rect, card: &GameCard, selected: bool) {
    let border_style = if selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .title(card.name.clone())
        .borders(Borders::ALL)
        .border_style(border_style);

    let label = Style::default().fg(Color::DarkGray);
    let lines = vec![
        Line::from(vec![
            Span::styled("TICKET COST  ", label),
            Span::raw(card.cost.clone()),
        ]),
        Line::from(vec![
            Span::styled("OVERALL ODDS ", label),
            Span::raw(card.odds.clone()),
        ]),
        Line::from(vec![
            Span::styled("TOP PRIZE    ", label),
            Span::raw(card.jackpot.clone()),
        ]),
        Line::from(vec![
            Span::styled("EXPECTED VAL ", label),
            Span::styled(card.net_ev.clone(), ev_style(card.ev_sign)),
        ]),
        Line::from(Span::styled(card.image_url.clone(), label)),
        Line::from(Span::styled(
            format!("View Details → {}", card.href),
            Style::default().fg(Color::Blue),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn ev_style(sign: EvSign) -> Style {
    match sign {
        EvSign::Positive => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        EvSign::Negative => Style::default().fg(Color::Red),
    }
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(controller) = &state.detail else {
        return;
    };
    match controller.status() {
        DetailStatus::Loading => render_loading(frame, area),
        DetailStatus::Failed(err) => render_error(frame, area, &err.to_string()),
        DetailStatus::Ready(detail) => render_game_detail(frame, area, detail, state.detail_scroll),
    }
}

fn render_game_detail(frame: &mut Frame, area: Rect, detail: &GameDetail, scroll: u16) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(6),
            Constraint::Min(6),
        ])
        .split(area);

    let label = Style::default().fg(Color::DarkGray);
    let mut stats = vec![
        Line::from(vec![
            Span::styled("TICKET COST ", label),
            Span::raw(format!("{:<12}", detail.cost)),
            Span::styled("OVERALL ODDS ", label),
            Span::raw(detail.odds.clone()),
        ]),
        Line::from(vec![
            Span::styled("TOP PRIZE   ", label),
            Span::raw(format!("{:<12}", detail.jackpot)),
            Span::styled("EXPECTED VALUE ", label),
            Span::styled(detail.net_ev.clone(), ev_style(detail.ev_sign)),
        ]),
    ];
    if let Some(pool) = &detail.prize_pool {
        stats[1]
            .spans
            .push(Span::styled(format!("   PRIZE POOL {pool}"), label));
    }
    let stats = Paragraph::new(stats)
        .block(Block::default().title(detail.name.clone()).borders(Borders::ALL));
    frame.render_widget(stats, rows[0]);

    let mut note_lines = vec![
        Line::from(detail.note.clone()),
        Line::from(Span::styled(detail.ticket_summary.clone(), label)),
    ];
    if let Some(winning) = &detail.winning_summary {
        note_lines.push(Line::from(Span::styled(winning.clone(), label)));
    }
    let note = Paragraph::new(note_lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Note").borders(Borders::ALL));
    frame.render_widget(note, rows[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[2]);

    let tier_lines = detail
        .tiers
        .iter()
        .flat_map(|tier| {
            [
                Line::from(Span::styled(
                    format!("PRIZE: {}", tier.prize),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(tier.percentage_text()),
                Line::from(Span::styled(
                    match tier.claimed_text() {
                        Some(claimed) => format!("{}, {claimed}", tier.remaining_text()),
                        None => tier.remaining_text(),
                    },
                    label,
                )),
            ]
        })
        .collect::<Vec<_>>();
    let max_scroll = (tier_lines.len() as u16).saturating_sub(1);
    let tiers = Paragraph::new(tier_lines)
        .scroll((scroll.min(max_scroll), 0))
        .block(Block::default().title("Prize Tiers").borders(Borders::ALL));
    frame.render_widget(tiers, bottom[0]);

    render_prize_chart(frame, bottom[1], &detail.chart);
}

fn render_prize_chart(frame: &mut Frame, area: Rect, chart: &PrizeChart) {
    let block = Block::default()
        .title(format!("{} ({})", chart.title, chart.series_label))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if chart.values.is_empty() {
        let empty = Paragraph::new("No prize tiers").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }
    if inner.height < 3 || inner.width < 16 {
        return;
    }

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(12), Constraint::Min(1)])
        .split(inner);

    render_chart_axis(frame, cols[0], chart);

    let bars = chart
        .labels
        .iter()
        .zip(&chart.values)
        .map(|(label, value)| {
            Bar::default()
                .value(scaled(*value))
                .label(Line::from(label.clone()))
                .text_value(chart.value_label(*value))
                .style(Style::default().fg(Color::Blue))
        })
        .collect::<Vec<_>>();

    let count = bars.len() as u16;
    let bar_width = (cols[1].width / count.max(1)).saturating_sub(1).clamp(1, 12);
    let widget = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .max(scaled(chart.max_value()).max(1))
        .value_style(Style::default().fg(Color::White).bg(Color::Blue));
    frame.render_widget(widget, cols[1]);
}

fn render_chart_axis(frame: &mut Frame, area: Rect, chart: &PrizeChart) {
    if area.height < 3 {
        return;
    }
    // The bar chart's bottom row holds category labels; the axis title sits
    // beside it and the ticks span the plot rows above.
    let plot_height = (area.height - 1) as usize;
    let mut lines = vec![Line::from(""); plot_height];
    let positions = [0, plot_height / 2, plot_height - 1];
    for (pos, tick) in positions.into_iter().zip(chart.axis_ticks()) {
        lines[pos] = Line::from(tick);
    }
    lines.push(Line::from(Span::styled(
        chart.axis_title,
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(Paragraph::new(lines), area);
}

fn scaled(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        (value * CHART_SCALE).round() as u64
    } else {
        0
    }
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let loading = Paragraph::new("Loading game data...")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(loading, area);
}

fn render_error(frame: &mut Frame, area: Rect, msg: &str) {
    let error = Paragraph::new(msg.to_string())
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Red))
        .block(Block::default().title("Error").borders(Borders::ALL));
    frame.render_widget(error, area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Scratcher Terminal - Help",
        "",
        "Global:",
        "  r            Reload current page",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Games:",
        "  j/k or ↑/↓   Move selection",
        "  Enter / d    Open details",
        "  /            Search by name",
        "  c            Clear search",
        "  s            Cycle sort (EV, cost, name, odds, jackpot)",
        "",
        "Details:",
        "  b / Esc      Back to games",
        "  j/k          Scroll prize tiers",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

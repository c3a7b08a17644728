use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState};
use ratatui::Frame;

pub mod layout;
pub mod view_model;
pub mod widgets;

use crate::app::{App, InputMode};
use crate::core::NotifyLevel;
use view_model::{SummaryCard, TableRow};
use widgets::VolumeBars;

pub fn draw(f: &mut Frame, app: &mut App) {
    let areas = layout::areas(f.size());

    draw_header(f, areas.header, app);
    draw_cards(f, areas.cards, app);
    draw_table(f, areas.table, app);
    draw_pagination(f, areas.pagination, app);
    draw_breakdown(f, areas.breakdown, app);
    draw_volume(f, areas.volume, app);
    draw_status_line(f, areas.status_line, app);
    draw_command_line(f, areas.command_line, app);
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let mut spans = vec![
        Span::styled(
            "Screener",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
    ];
    match app.query.as_ref() {
        Some(query) => {
            spans.push(Span::styled(
                query.chain.name(),
                Style::default().fg(Color::LightMagenta),
            ));
            spans.push(Span::raw("  "));
            spans.push(Span::raw(short_addr(&query.address)));
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                query.range.to_string(),
                Style::default().fg(Color::DarkGray),
            ));
        }
        None => spans.push(Span::styled(
            ":analyze <chain> <address> <from> <to>",
            Style::default().fg(Color::DarkGray),
        )),
    }

    let title = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let (state, color) = if app.is_loading() {
        ("loading…", Color::LightYellow)
    } else if app.is_exporting() {
        ("exporting…", Color::LightYellow)
    } else {
        match app.health.as_ref() {
            Some(health) => (health.status.as_str(), Color::LightGreen),
            None => ("idle", Color::DarkGray),
        }
    };
    let backend = Paragraph::new(Line::from(vec![
        Span::styled("API ", Style::default().fg(Color::DarkGray)),
        Span::styled(state, Style::default().fg(color)),
    ]))
    .alignment(Alignment::Right)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(backend, chunks[1]);
}

fn draw_cards(f: &mut Frame, area: Rect, app: &App) {
    let cards = view_model::summary_cards(&app.store);
    if cards.is_empty() {
        let hint = Paragraph::new("No analysis loaded")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Summary"));
        f.render_widget(hint, area);
        return;
    }

    let constraints = vec![Constraint::Ratio(1, cards.len() as u32); cards.len()];
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (card, chunk) in cards.iter().zip(chunks.iter()) {
        f.render_widget(card_widget(card), *chunk);
    }
}

fn card_widget(card: &SummaryCard) -> Paragraph<'static> {
    let value_color = if card.value.starts_with('-') {
        Color::LightRed
    } else if card.value.starts_with('+') {
        Color::LightGreen
    } else {
        Color::White
    };
    let mut lines = vec![Line::from(Span::styled(
        card.value.clone(),
        Style::default().fg(value_color).add_modifier(Modifier::BOLD),
    ))];
    if let Some(detail) = &card.detail {
        lines.push(Line::from(Span::styled(
            detail.clone(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(card.title))
}

fn draw_table(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL).title(table_title(app));
    let rows = view_model::table_rows(&app.store);

    if rows.is_empty() {
        let message = if app.store.analysis().is_some() {
            "No transactions match the current filters"
        } else {
            "Run :analyze to load transactions"
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let header = Row::new(view_model::column_titles(&app.store))
        .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD));
    let widths = [
        Constraint::Length(18),
        Constraint::Length(13),
        Constraint::Length(10),
        Constraint::Length(9),
        Constraint::Length(13),
        Constraint::Min(14),
        Constraint::Length(7),
        Constraint::Length(12),
        Constraint::Length(9),
    ];
    let table = Table::new(rows.iter().map(table_row), widths)
        .header(header)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = TableState::default();
    state.select(Some(app.selected.min(rows.len() - 1)));
    f.render_stateful_widget(table, area, &mut state);
}

fn table_row(row: &TableRow) -> Row<'static> {
    let amount_color = if row.incoming {
        Color::LightGreen
    } else {
        Color::LightRed
    };
    let status_color = if row.failed {
        Color::LightRed
    } else {
        Color::Gray
    };
    let hash = if row.edited {
        format!("{}*", row.hash)
    } else {
        row.hash.clone()
    };
    Row::new(vec![
        Span::raw(row.date.clone()),
        Span::styled(hash, Style::default().fg(Color::LightCyan)),
        Span::raw(row.tx_type.clone()),
        Span::styled(row.direction.clone(), Style::default().fg(amount_color)),
        Span::raw(row.counterparty.clone()),
        Span::styled(row.amount.clone(), Style::default().fg(amount_color)),
        Span::raw(row.token.clone()),
        Span::raw(row.usd_value.clone()),
        Span::styled(row.status.clone(), Style::default().fg(status_color)),
    ])
}

fn table_title(app: &App) -> String {
    let state = app.store.view_state();
    let mut title = String::from("Transactions");
    if let Some(tx_type) = state.type_filter {
        title.push_str(&format!("  type:{}", tx_type));
    }
    if !state.search_term.is_empty() {
        title.push_str(&format!("  search:{}", state.search_term));
    }
    title
}

fn draw_pagination(f: &mut Frame, area: Rect, app: &App) {
    let info = app.store.page_info();
    let arrows = format!(
        "{} prev  next {}",
        if info.has_prev() { "◀" } else { " " },
        if info.has_next() { "▶" } else { " " }
    );
    let line = Line::from(vec![
        Span::raw(view_model::pagination_label(&app.store)),
        Span::raw("   "),
        Span::styled(arrows, Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(line).alignment(Alignment::Right), area);
}

fn draw_breakdown(f: &mut Frame, area: Rect, app: &App) {
    let rows = view_model::type_breakdown(&app.store);
    let bar_width = area.width.saturating_sub(22) as usize;
    let lines: Vec<Line> = rows
        .iter()
        .map(|row| {
            let filled = bar_width * row.percent as usize / 100;
            Line::from(vec![
                Span::raw(format!("{:<11}", row.label)),
                Span::styled("█".repeat(filled), Style::default().fg(Color::LightBlue)),
                Span::styled(
                    format!(" {} ({}%)", row.count, row.percent),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();
    let panel =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("By Type"));
    f.render_widget(panel, area);
}

fn draw_volume(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL).title("Daily Volume");
    let inner = block.inner(area);
    f.render_widget(block, area);
    let bars = view_model::daily_bars(&app.store);
    f.render_widget(VolumeBars::new(&bars), inner);
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let state = app.store.view_state();
    let mut spans = vec![
        Span::styled("Sort ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(
            "{} {}  ",
            state.sort_field.title(),
            state.sort_direction.arrow()
        )),
        Span::styled("Page size ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", state.page_size)),
        Span::styled("Backend ", Style::default().fg(Color::DarkGray)),
        Span::raw(app.backend_url.clone()),
    ];
    let overlay = app.store.overlay();
    if !overlay.is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            "Edited ",
            Style::default().fg(Color::LightYellow),
        ));
        spans.push(Span::raw("(u to reset)"));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

/// Get command hint for autocompletion
fn command_hint(input: &str) -> Option<&'static str> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    let commands = [
        ("analyze", "<chain> <address> <from> <to>"),
        ("filter", "<type|all>"),
        ("search", "<hash|type|address>"),
        ("sort", "<field> [asc|desc]"),
        ("page", "next|prev"),
        ("delete", "<hash>"),
        ("edit", "<hash> key=value..."),
        ("opening", "<amount> [SYMBOL=amount...]"),
        ("current", "<amount> [SYMBOL=amount...]"),
        ("reset", "Restore fetched data"),
        ("export", "csv|pdf|server-csv"),
        ("health", "Check backend"),
        ("refresh", "Re-fetch, bypassing cache"),
        ("quit", "Exit"),
    ];

    let word = input.split_whitespace().next().unwrap_or("");
    commands
        .iter()
        .find(|(name, _)| name.starts_with(word))
        .map(|(_, hint)| *hint)
}

fn draw_command_line(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.input_mode {
        InputMode::Command => {
            let hint_text = command_hint(&app.command.input).unwrap_or("analyze | filter | sort | export");
            Line::from(vec![
                Span::styled(": ", Style::default().fg(Color::Yellow)),
                Span::raw(app.command.input.clone()),
                Span::styled(
                    format!("  {}", hint_text),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
        InputMode::Normal => {
            if let Some((text, level)) = app.status_text() {
                let color = match level {
                    NotifyLevel::Info => Color::LightGreen,
                    NotifyLevel::Warn => Color::LightYellow,
                    NotifyLevel::Error => Color::LightRed,
                };
                Line::from(vec![
                    Span::styled("msg: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(text.to_string(), Style::default().fg(color)),
                ])
            } else {
                action_hints()
            }
        }
    };

    let paragraph = Paragraph::new(content).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

fn action_hints() -> Line<'static> {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let text = |t: &'static str| Span::styled(t, Style::default().fg(Color::DarkGray));
    Line::from(vec![
        key(":"),
        text(" command  "),
        key("n/p"),
        text(" page  "),
        key("s/d"),
        text(" sort  "),
        key("↑/↓"),
        text(" select  "),
        key("x"),
        text(" delete  "),
        key("u"),
        text(" reset  "),
        key("r"),
        text(" refresh  "),
        key("e"),
        text(" export  "),
        key("q"),
        text(" quit"),
    ])
}

fn short_addr(value: &str) -> String {
    let value = value.trim();
    if value.len() <= 14 {
        return value.to_string();
    }
    let start: String = value.chars().take(8).collect();
    let end: String = value
        .chars()
        .rev()
        .take(6)
        .collect::<String>()
        .chars()
        .rev()
        .collect();
    format!("{}…{}", start, end)
}

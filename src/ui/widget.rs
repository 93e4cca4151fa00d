use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::machine::Phase;
use crate::menu::MENU;
use crate::tweet::{format_count, Tweet};

const TWITTER_BLUE: Color = Color::Rgb(0x1d, 0x9b, 0xf0);
const RETWEET_GREEN: Color = Color::Rgb(0x00, 0xba, 0x7c);
const LIKE_PINK: Color = Color::Rgb(0xf9, 0x18, 0x80);

const PLACEHOLDER_ID: &str = "1585396100026208257";

pub fn draw(frame: &mut Frame, app: &App) {
    // bottom line is the property-menu surface, outside the card itself
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let card_area = center_rect(60, 60, chunks[0]);

    match app.phase() {
        Phase::Input => render_input_form(frame, card_area, app),
        Phase::Awaiting => render_loading(frame, card_area, app),
        Phase::Display => {
            if let Some(tweet) = app.tweet() {
                render_card(frame, card_area, tweet);
            }
        }
    }

    render_menu_bar(frame, chunks[1], app.phase());

    if let Some(text) = app.toast_text() {
        render_toast(frame, chunks[0], text);
    }
}

fn render_input_form(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(TWITTER_BLUE))
        .title("Chirp");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let input_line = if app.pending_input().is_empty() {
        Line::from(vec![
            Span::styled("█", Style::default().fg(Color::Gray)),
            Span::styled(PLACEHOLDER_ID, Style::default().fg(Color::DarkGray)),
        ])
    } else {
        Line::from(vec![
            Span::styled(app.pending_input(), Style::default().fg(Color::White)),
            Span::styled("█", Style::default().fg(Color::Gray)),
        ])
    };

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Chirp",
            Style::default()
                .fg(TWITTER_BLUE)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Tweet URL/ID", Style::default().fg(Color::White))),
        input_line,
        Line::from(""),
        Line::from(Span::styled(
            "[ Embed ]",
            Style::default()
                .fg(Color::White)
                .bg(TWITTER_BLUE)
                .add_modifier(Modifier::BOLD),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Left);
    frame.render_widget(paragraph, inner);
}

fn render_loading(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray))
        .title("Chirp");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{} Loading tweet…", app.spinner_frame()),
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_card(frame: &mut Frame, area: Rect, tweet: &Tweet) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(TWITTER_BLUE))
        .title("Chirp");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut author_spans = vec![Span::styled(
        tweet.author.name.clone(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )];
    if tweet.author.verified {
        author_spans.push(Span::styled(" ✓", Style::default().fg(TWITTER_BLUE)));
    }
    author_spans.push(Span::styled(
        format!(" @{}", tweet.author.username),
        Style::default().fg(Color::DarkGray),
    ));

    let mut text = vec![Line::from(author_spans), Line::from("")];

    let wrap_width = inner.width.saturating_sub(2).max(8) as usize;
    for line in textwrap::wrap(&tweet.text, wrap_width) {
        text.push(Line::from(Span::styled(
            line.into_owned(),
            Style::default().fg(Color::White),
        )));
    }

    text.push(Line::from(""));
    text.push(Line::from(vec![
        Span::styled(
            format!("💬 {}", format_count(tweet.public_metrics.reply_count)),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("   "),
        Span::styled(
            format!("⟳ {}", format_count(tweet.public_metrics.retweet_count)),
            Style::default().fg(RETWEET_GREEN),
        ),
        Span::raw("   "),
        Span::styled(
            format!("♥ {}", format_count(tweet.public_metrics.like_count)),
            Style::default().fg(LIKE_PINK),
        ),
    ]));

    let paragraph = Paragraph::new(text).alignment(Alignment::Left);
    frame.render_widget(paragraph, inner);
}

fn render_menu_bar(frame: &mut Frame, area: Rect, phase: Phase) {
    let hint = match phase {
        Phase::Input => "Enter: Embed | Esc: Quit".to_string(),
        Phase::Awaiting => "Esc: Quit".to_string(),
        Phase::Display => {
            let mut parts: Vec<String> = MENU
                .iter()
                .map(|item| format!("{}: {} {}", item.key, item.icon, item.tooltip))
                .collect();
            parts.push("q: Quit".to_string());
            parts.join(" | ")
        }
    };

    let paragraph = Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray)))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_toast(frame: &mut Frame, area: Rect, message: &str) {
    let toast_area = Rect::new(
        area.x + 2,
        area.y + area.height.saturating_sub(3),
        area.width.saturating_sub(4),
        3,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let paragraph = Paragraph::new(message).block(block);
    frame.render_widget(Clear, toast_area);
    frame.render_widget(paragraph, toast_area);
}

fn center_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

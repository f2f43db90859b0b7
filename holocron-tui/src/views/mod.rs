//! View rendering dispatch.

pub mod list;
pub mod people;
pub mod profile;
pub mod species;

use crate::nav::View;
use crate::state::App;
use crate::theme::{notification_color, notification_label};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);

    match app.active_view {
        View::People => people::render(f, app, layout[1]),
        View::Species => species::render(f, app, layout[1]),
        View::Profile => profile::render(f, app, layout[1]),
    }

    render_footer(f, app, layout[2]);
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        "HOLOCRON ",
        Style::default()
            .fg(app.theme.primary)
            .add_modifier(Modifier::BOLD),
    )];
    for (index, view) in View::all().iter().enumerate() {
        let style = if *view == app.active_view {
            Style::default()
                .fg(app.theme.bg)
                .bg(app.theme.primary)
        } else {
            Style::default().fg(app.theme.text_dim)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!(" {} {} ", index + 1, view.title()),
            style,
        ));
    }
    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(header, area);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let help = if app.profile.editor.is_some() {
        "Enter save • Esc cancel"
    } else {
        "j/k move • Tab/1-3 switch view • e edit • r refresh • q quit"
    };
    let (text, style) = match app.active_toast() {
        Some(note) => (
            format!("{}: {}", notification_label(note.level), note.message),
            Style::default().fg(notification_color(note.level, &app.theme)),
        ),
        None => (help.to_string(), Style::default().fg(app.theme.text_dim)),
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(footer, area);
}

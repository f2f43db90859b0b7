//! Shared rendering for paginated lists.

use crate::state::{App, ListViewState};
use crate::widgets::status::{ListStatus, ERROR_TEXT, LOADING_TEXT};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Split into list and detail columns.
pub fn columns(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);
    (chunks[0], chunks[1])
}

pub fn render_list<T>(
    f: &mut Frame<'_>,
    app: &App,
    area: Rect,
    title: &str,
    view: &ListViewState<T>,
    label: impl Fn(&T) -> String,
) {
    let block = Block::default()
        .title(format!("{} ({})", title, view.query.item_count()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border_focus));

    let trailer = match ListStatus::of(&view.query) {
        ListStatus::Loading => {
            let loading = Paragraph::new(LOADING_TEXT)
                .style(Style::default().fg(app.theme.text_dim))
                .block(block);
            f.render_widget(loading, area);
            return;
        }
        ListStatus::Failed(reason) => {
            tracing::trace!(%reason, "rendering failed list");
            let failed = Paragraph::new(ERROR_TEXT)
                .style(Style::default().fg(app.theme.error))
                .block(block);
            f.render_widget(failed, area);
            return;
        }
        ListStatus::Ready(trailer) => trailer,
    };

    let mut items: Vec<ListItem> = view
        .query
        .items()
        .map(|item| ListItem::new(Line::from(Span::raw(label(item)))))
        .collect();
    if let Some(trailer) = trailer {
        items.push(ListItem::new(Line::from(Span::styled(
            trailer.text(),
            Style::default()
                .fg(app.theme.text_dim)
                .add_modifier(Modifier::DIM),
        ))));
    }

    let mut state = ListState::default();
    state.select(view.selected);

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(app.theme.primary)
                .bg(app.theme.bg_highlight),
        )
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut state);
}

//! Profile view: the cached user record and the field editor.

use crate::state::{App, FieldEditor};
use holocron_core::UserRecord;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use serde_json::Value;

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let (fields_area, editor_area) = match &app.profile.editor {
        Some(_) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(3)])
                .split(area);
            (chunks[0], Some(chunks[1]))
        }
        None => (area, None),
    };

    let user = app.user.get();
    let block = Block::default()
        .title(profile_title(user.as_ref(), app.profile.saving))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border_focus));

    let fields = app.profile_fields();
    if fields.is_empty() {
        let message = if user.is_some() {
            "No profile fields loaded"
        } else {
            "Not signed in"
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(app.theme.text_dim))
            .block(block);
        f.render_widget(empty, fields_area);
    } else {
        let items: Vec<ListItem> = fields
            .iter()
            .map(|(field, value)| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{}: ", field),
                        Style::default().fg(app.theme.secondary),
                    ),
                    Span::raw(display_value(value)),
                ]))
            })
            .collect();
        let mut state = ListState::default();
        state.select(Some(app.profile.selected.min(fields.len() - 1)));
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(app.theme.bg_highlight))
            .highlight_symbol("> ");
        f.render_stateful_widget(list, fields_area, &mut state);
    }

    if let (Some(editor), Some(area)) = (&app.profile.editor, editor_area) {
        render_editor(f, app, editor, area);
    }
}

fn profile_title(user: Option<&UserRecord>, saving: bool) -> String {
    let id = user
        .and_then(UserRecord::id)
        .map(|id| format!(" #{}", id))
        .unwrap_or_default();
    let suffix = if saving { " (saving...)" } else { "" };
    format!("Profile{}{}", id, suffix)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_editor(f: &mut Frame<'_>, app: &App, editor: &FieldEditor, area: Rect) {
    let paragraph = Paragraph::new(editor.text())
        .style(Style::default().fg(app.theme.text))
        .block(
            Block::default()
                .title(format!("Edit {}", editor.field))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.primary)),
        );
    f.render_widget(paragraph, area);

    let (row, col) = editor.textarea.cursor();
    let x = area.x + 1 + cursor_column(editor, row, col);
    let y = area.y + 1 + row as u16;
    if x < area.right().saturating_sub(1) && y < area.bottom().saturating_sub(1) {
        f.set_cursor(x, y);
    }
}

/// Display width of the text left of the cursor.
fn cursor_column(editor: &FieldEditor, row: usize, col: usize) -> u16 {
    let before: String = editor
        .textarea
        .lines()
        .get(row)
        .map(|line| line.chars().take(col).collect())
        .unwrap_or_default();
    u16::try_from(Span::raw(before).width()).unwrap_or(u16::MAX)
}

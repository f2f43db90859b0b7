//! People list view.

use crate::state::App;
use crate::views::list::{columns, render_list};
use crate::widgets::DetailPanel;
use ratatui::{layout::Rect, style::Style, Frame};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let (list_area, detail_area) = columns(area);
    render_list(f, app, list_area, "People", &app.people, |person| {
        person.name.clone()
    });

    let mut detail = DetailPanel::new("Details", Style::default().fg(app.theme.secondary));
    if let Some(person) = app.people.selected_item() {
        detail = detail
            .field("Name", Some(person.name.as_str()))
            .field("Hair", person.hair_color.as_deref())
            .field("Eyes", person.eye_color.as_deref());
    }
    detail.render(f, detail_area);
}

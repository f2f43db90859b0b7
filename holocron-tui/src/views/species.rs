//! Species list view.

use crate::state::App;
use crate::views::list::{columns, render_list};
use crate::widgets::DetailPanel;
use ratatui::{layout::Rect, style::Style, Frame};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let (list_area, detail_area) = columns(area);
    render_list(f, app, list_area, "Species", &app.species, |species| {
        match &species.language {
            Some(language) => format!("{} ({})", species.name, language),
            None => species.name.clone(),
        }
    });

    let mut detail = DetailPanel::new("Details", Style::default().fg(app.theme.secondary));
    if let Some(species) = app.species.selected_item() {
        detail = detail
            .field("Name", Some(species.name.as_str()))
            .field("Language", species.language.as_deref())
            .field("Lifespan", species.average_lifespan.as_deref());
    }
    detail.render(f, detail_area);
}

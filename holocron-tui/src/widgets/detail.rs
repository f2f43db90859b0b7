//! Detail panel widget for showing field/value pairs.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub struct DetailPanel<'a> {
    pub title: &'a str,
    pub fields: Vec<(&'a str, String)>,
    pub label_style: Style,
    pub empty_message: &'a str,
}

impl<'a> DetailPanel<'a> {
    pub fn new(title: &'a str, label_style: Style) -> Self {
        Self {
            title,
            fields: Vec::new(),
            label_style,
            empty_message: "Nothing selected",
        }
    }

    /// Add a row; `None` renders as "unknown".
    pub fn field(mut self, label: &'a str, value: Option<&str>) -> Self {
        self.fields
            .push((label, value.unwrap_or("unknown").to_string()));
        self
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let lines: Vec<Line> = if self.fields.is_empty() {
            vec![Line::from(self.empty_message)]
        } else {
            self.fields
                .iter()
                .map(|(label, value)| {
                    Line::from(vec![
                        Span::styled(format!("{}: ", label), self.label_style),
                        Span::raw(value.clone()),
                    ])
                })
                .collect()
        };

        let widget = Paragraph::new(Text::from(lines))
            .block(Block::default().title(self.title).borders(Borders::ALL))
            .wrap(Wrap { trim: true });

        f.render_widget(widget, area);
    }
}

//! Read-only overview of the loaded document.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use crate::domain::document::{SclDocument, attribute};

/// Figures shown in the overview header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentStats {
    pub title: String,
    pub edit_count: u64,
    pub dirty: bool,
}

/// Displays the IEDs of the document behind the dialog.
#[derive(Debug, Default)]
pub struct DocumentView;

impl DocumentView {
    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        document: Option<&SclDocument>,
        stats: &DocumentStats,
    ) {
        let block = Block::default()
            .title(format!("Document · {}", stats.title))
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let Some(document) = document else {
            let placeholder = Paragraph::new("No document loaded")
                .wrap(Wrap { trim: true })
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(placeholder, inner);
            return;
        };

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(1)])
            .split(inner);

        let ieds = document.ieds();
        frame.render_widget(Paragraph::new(header_lines(ieds.len(), stats)), layout[0]);

        if ieds.is_empty() {
            let empty = Paragraph::new("No IEDs in this document").style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            );
            frame.render_widget(empty, layout[1]);
            return;
        }

        let rows: Vec<ListItem> = ieds
            .iter()
            .map(|(_, ied)| {
                let name = attribute(ied, "name").unwrap_or("?");
                let manufacturer = attribute(ied, "manufacturer").unwrap_or("");
                let kind = attribute(ied, "type").unwrap_or("");
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{name:<24}"),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("{manufacturer:<20}"), Style::default().fg(Color::Gray)),
                    Span::styled(kind.to_owned(), Style::default().fg(Color::Gray)),
                ]))
            })
            .collect();
        frame.render_widget(List::new(rows), layout[1]);
    }
}

fn header_lines(ied_count: usize, stats: &DocumentStats) -> Vec<Line<'static>> {
    let mut first = vec![
        Span::styled("IEDs: ", Style::default().fg(Color::Gray)),
        Span::styled(
            ied_count.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled("  edits: ", Style::default().fg(Color::Gray)),
        Span::raw(stats.edit_count.to_string()),
    ];
    if stats.dirty {
        first.push(Span::styled(
            "  ● unsaved",
            Style::default().fg(Color::Yellow),
        ));
    }
    vec![
        Line::from(first),
        Line::styled(
            format!("{:<24}{:<20}{}", "name", "manufacturer", "type"),
            Style::default().fg(Color::DarkGray),
        ),
    ]
}

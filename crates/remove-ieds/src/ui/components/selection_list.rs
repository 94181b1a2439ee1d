//! Selection list component.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem as ListRow, ListState, Paragraph};

use crate::app::selection::SelectionListState;

/// Ratatui component rendering a [`SelectionListState`].
#[derive(Debug, Default)]
pub struct SelectionList;

impl SelectionList {
    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        state: &SelectionListState,
        has_focus: bool,
    ) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(area);

        let filter_text = if state.filter().is_empty() {
            "⌕ filter (press /)".to_string()
        } else {
            format!("⌕ {}", state.filter())
        };
        let mut filter_style = Style::default().fg(Color::Gray);
        if state.is_filter_active() {
            filter_style = filter_style.add_modifier(Modifier::BOLD).fg(Color::Cyan);
        }
        let header = Line::from(vec![
            Span::styled(
                format!("{} ", state.check_state().symbol()),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled(filter_text, filter_style),
            Span::styled(
                format!("  {} selected", state.selected_count()),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        frame.render_widget(Paragraph::new(header), layout[0]);

        if state.visible_len() == 0 {
            let text = if state.is_empty() {
                "No IEDs in this document"
            } else {
                "No IEDs match filter"
            };
            let placeholder = Paragraph::new(text).style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            );
            frame.render_widget(placeholder, layout[1]);
            return;
        }

        let rows: Vec<ListRow> = state
            .visible_items()
            .map(|item| {
                let mark = if item.selected { "[x] " } else { "[ ] " };
                let mut name_style = Style::default();
                if item.selected {
                    name_style = name_style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
                }
                ListRow::new(vec![
                    Line::from(vec![
                        Span::styled(mark, Style::default().fg(Color::Yellow)),
                        Span::styled(item.headline.clone(), name_style),
                    ]),
                    Line::styled(
                        format!("    {}", item.supporting_text),
                        Style::default().fg(Color::Gray),
                    ),
                ])
            })
            .collect();

        let mut list_state = ListState::default();
        list_state.select(state.cursor());

        let highlight_style = if has_focus {
            Style::default().bg(Color::Rgb(40, 40, 60))
        } else {
            Style::default()
        };
        let list = List::new(rows)
            .highlight_style(highlight_style)
            .highlight_symbol("▸ ");
        frame.render_stateful_widget(list, layout[1], &mut list_state);
    }
}

//! Modal overlay hosting the IED selection list and its actions.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::dialog::RemoveIedsDialog;
use crate::ui::components::selection_list::SelectionList;

/// Which part of the dialog receives keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DialogFocus {
    #[default]
    List,
    Close,
    Remove,
}

impl DialogFocus {
    /// Cycle list → Close → Remove IEDs → list.
    pub fn next(self) -> Self {
        match self {
            DialogFocus::List => DialogFocus::Close,
            DialogFocus::Close => DialogFocus::Remove,
            DialogFocus::Remove => DialogFocus::List,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            DialogFocus::List => DialogFocus::Remove,
            DialogFocus::Close => DialogFocus::List,
            DialogFocus::Remove => DialogFocus::Close,
        }
    }
}

/// Visual component for the removal dialog.
#[derive(Debug, Default)]
pub struct RemoveDialog {
    list: SelectionList,
}

impl RemoveDialog {
    /// Draw the dialog centred in `area` if it is open.
    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        dialog: &RemoveIedsDialog,
        focus: DialogFocus,
    ) {
        if !dialog.is_open() {
            return;
        }

        let popup = centered_rect(area, 80, 24);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title("Remove IEDs")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(inner);

        self.list.render(
            frame,
            layout[0],
            dialog.list(),
            focus == DialogFocus::List,
        );

        let button = |label: &'static str, focused: bool| {
            let style = if focused {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan)
            };
            Span::styled(format!(" {label} "), style)
        };
        let actions = Line::from(vec![
            button("Close", focus == DialogFocus::Close),
            Span::raw("  "),
            button("Remove IEDs", focus == DialogFocus::Remove),
        ])
        .alignment(Alignment::Right);
        frame.render_widget(Paragraph::new(actions), layout[1]);
    }
}

/// A rectangle of at most `width` x `height` centred in `area`.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

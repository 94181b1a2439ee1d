//! Application loop for the TUI.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::{Frame, Terminal};

use crate::app::dialog::{DialogOptions, RemoveIedsDialog};
use crate::app::host::{EditorHost, Host};
use crate::domain::model::RemovalReport;
use crate::infra::config::Config;
use crate::infra::scl::WriteOptions;
use crate::ui::components::document_view::{DocumentStats, DocumentView};
use crate::ui::components::remove_dialog::{DialogFocus, RemoveDialog};
use crate::ui::keys::{DialogAction, DialogKeymap};

const TICK_RATE: Duration = Duration::from_millis(120);

/// Interactive editor: shows the document and hosts the removal dialog.
pub struct UiApp {
    config: Config,
    host: EditorHost,
    output: Option<PathBuf>,
    dialog: RemoveIedsDialog,
    dialog_focus: DialogFocus,
    keymap: DialogKeymap,
    document_view: DocumentView,
    dialog_component: RemoveDialog,
    status: Option<StatusMessage>,
    quit_armed: bool,
    should_quit: bool,
}

impl UiApp {
    /// Build the editor around a host. Saves go to `output`, or back to the source file.
    pub fn new(config: Config, host: EditorHost, output: Option<PathBuf>) -> Result<Self> {
        let keymap = DialogKeymap::from_config(&config.keybindings)?;
        Ok(Self {
            dialog: RemoveIedsDialog::new(DialogOptions::from_config(&config)),
            config,
            host,
            output,
            dialog_focus: DialogFocus::default(),
            keymap,
            document_view: DocumentView,
            dialog_component: RemoveDialog::default(),
            status: None,
            quit_armed: false,
            should_quit: false,
        })
    }

    /// Launch the terminal UI and enter the event loop.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to initialize terminal")?;
        terminal.hide_cursor().ok();

        let event_loop_result = self.event_loop(&mut terminal);

        disable_raw_mode().ok();
        let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        event_loop_result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            self.dialog.sync(&self.host);
            terminal.draw(|frame| self.render(frame))?;
            self.tick();

            if self.should_quit {
                break;
            }

            if event::poll(TICK_RATE)? {
                let ev = event::read()?;
                self.handle_event(ev)?;
            }
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame<'_>) {
        let size = frame.size();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(2),
            ])
            .split(size);

        let stats = DocumentStats {
            title: self.document_title(),
            edit_count: self.host.edit_count(),
            dirty: self.host.is_dirty(),
        };
        self.document_view
            .render(frame, layout[0], self.host.document(), &stats);

        frame.render_widget(Paragraph::new(self.hints()), layout[1]);
        self.render_status(frame, layout[2]);

        self.dialog_component
            .render(frame, size, &self.dialog, self.dialog_focus);
    }

    fn hints(&self) -> Line<'static> {
        let key = |text: String| Span::styled(text, Style::default().fg(Color::Cyan));
        let spans = if self.dialog.is_open() {
            let bindings = &self.config.keybindings;
            vec![
                key(format!("{}/{}", bindings.down(), bindings.up())),
                Span::raw(" move · "),
                key(bindings.toggle().to_owned()),
                Span::raw(" toggle · "),
                key(bindings.toggle_all().to_owned()),
                Span::raw(" all · "),
                key(bindings.filter().to_owned()),
                Span::raw(" filter · "),
                key("tab".into()),
                Span::raw(" actions · "),
                key(bindings.remove().to_owned()),
                Span::raw(" remove · "),
                key("esc".into()),
                Span::raw(" close"),
            ]
        } else {
            vec![
                key("r".into()),
                Span::raw(" remove IEDs · "),
                key("ctrl+s".into()),
                Span::raw(" save · "),
                key("q".into()),
                Span::raw(" quit"),
            ]
        };
        Line::from(spans).style(Style::default().fg(Color::Gray))
    }

    fn render_status(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let message = self.status.as_ref().map(|status| {
            let style = match status.level {
                StatusLevel::Info => Style::default().fg(Color::Gray),
                StatusLevel::Success => Style::default().fg(Color::Green),
                StatusLevel::Error => Style::default().fg(Color::Red),
            };
            Line::styled(status.text.clone(), style)
        });

        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let line = message.unwrap_or_else(|| {
            Line::styled(
                "Ready · press r to remove IEDs",
                Style::default().fg(Color::DarkGray),
            )
        });
        frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), inner);
    }

    fn tick(&mut self) {
        if let Some(status) = &self.status
            && status.is_expired()
        {
            self.status = None;
        }
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key_event(key)?,
            Event::Key(_) | Event::Resize(..) | Event::Mouse(_) => {}
            Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }

        if self.dialog.is_open() {
            self.handle_dialog_key(key)
        } else {
            self.handle_editor_key(key)
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.code != KeyCode::Char('q') {
            self.quit_armed = false;
        }

        match key.code {
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => self.save(),
            KeyCode::Char('r') | KeyCode::Enter => self.open_dialog(),
            KeyCode::Char('q') => {
                if self.host.is_dirty() && !self.quit_armed {
                    self.quit_armed = true;
                    self.set_status(
                        StatusLevel::Error,
                        "Unsaved changes · press q again to quit, ctrl+s to save",
                    );
                } else {
                    self.should_quit = true;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.dialog.list().is_filter_active() {
            return self.handle_filter_input(key);
        }

        match key.code {
            KeyCode::Esc => {
                self.close_dialog();
                return Ok(());
            }
            KeyCode::Tab => {
                self.dialog_focus = self.dialog_focus.next();
                return Ok(());
            }
            KeyCode::BackTab => {
                self.dialog_focus = self.dialog_focus.previous();
                return Ok(());
            }
            KeyCode::Enter => {
                match self.dialog_focus {
                    DialogFocus::List => self.dialog.list_mut().toggle_current(),
                    DialogFocus::Close => self.close_dialog(),
                    DialogFocus::Remove => self.submit_dialog(),
                }
                return Ok(());
            }
            KeyCode::Up => {
                self.dialog.list_mut().select_previous();
                return Ok(());
            }
            KeyCode::Down => {
                self.dialog.list_mut().select_next();
                return Ok(());
            }
            _ => {}
        }

        match self.keymap.action(&key) {
            Some(DialogAction::Up) => self.dialog.list_mut().select_previous(),
            Some(DialogAction::Down) => self.dialog.list_mut().select_next(),
            Some(DialogAction::Toggle) => self.dialog.list_mut().toggle_current(),
            Some(DialogAction::ToggleAll) => self.dialog.list_mut().toggle_all_visible(),
            Some(DialogAction::Filter) => {
                self.dialog_focus = DialogFocus::List;
                self.dialog.list_mut().begin_filter();
            }
            Some(DialogAction::Remove) => self.submit_dialog(),
            None => {}
        }
        Ok(())
    }

    fn handle_filter_input(&mut self, key: KeyEvent) -> Result<()> {
        let list = self.dialog.list_mut();
        match key.code {
            KeyCode::Esc | KeyCode::Enter => list.end_filter(),
            KeyCode::Backspace => list.pop_filter_char(),
            KeyCode::Char(ch) => {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    list.push_filter_char(ch);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn open_dialog(&mut self) {
        if self.host.document().is_none() {
            self.set_status(StatusLevel::Error, "No document loaded");
            return;
        }
        self.dialog_focus = DialogFocus::List;
        self.dialog.run(&self.host);
    }

    fn close_dialog(&mut self) {
        self.dialog.close();
        self.dialog_focus = DialogFocus::List;
    }

    fn submit_dialog(&mut self) {
        if self.dialog.list().selected_count() == 0 {
            self.set_status(StatusLevel::Info, "No IEDs selected");
            return;
        }
        let report = self.dialog.submit(&mut self.host);
        if !self.dialog.is_open() {
            self.dialog_focus = DialogFocus::List;
        }
        let (level, text) = describe_report(&report);
        self.set_status(level, text);
    }

    fn save(&mut self) {
        let options = WriteOptions::from_config(&self.config);
        match self.host.save(self.output.as_deref(), &options) {
            Ok(path) => {
                self.set_status(StatusLevel::Success, format!("Saved {}", path.display()))
            }
            Err(err) => {
                tracing::warn!(error = %err, "save failed");
                self.set_status(StatusLevel::Error, format!("{err:#}"));
            }
        }
    }

    fn document_title(&self) -> String {
        self.host
            .source()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "untitled".into())
    }

    fn set_status<S: Into<String>>(&mut self, level: StatusLevel, message: S) {
        self.status = Some(StatusMessage::new(level, message.into()));
    }
}

fn describe_report(report: &RemovalReport) -> (StatusLevel, String) {
    let removed = match report.removed.len() {
        1 => format!("Removed IED {}", report.removed[0]),
        n => format!("Removed {n} IEDs"),
    };
    if report.skipped.is_empty() {
        (StatusLevel::Success, removed)
    } else {
        (
            StatusLevel::Error,
            format!("{removed} · skipped {}", report.skipped.join(", ")),
        )
    }
}

#[derive(Debug)]
struct StatusMessage {
    level: StatusLevel,
    text: String,
    expires_at: Instant,
}

impl StatusMessage {
    fn new(level: StatusLevel, text: String) -> Self {
        Self {
            level,
            text,
            expires_at: Instant::now() + Duration::from_secs(4),
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusLevel {
    Info,
    Success,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    use ratatui::backend::TestBackend;

    use crate::domain::document::SclDocument;

    fn app() -> UiApp {
        let doc = SclDocument::parse(
            r#"<SCL><IED name="IED1" manufacturer="ABB"/><IED name="IED2" type="RTU"/><IED name="IED3"/></SCL>"#,
        )
        .unwrap();
        UiApp::new(
            Config::default(),
            EditorHost::with_document(doc),
            None,
        )
        .unwrap()
    }

    fn press(app: &mut UiApp, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap();
    }

    fn press_ctrl(app: &mut UiApp, ch: char) {
        app.handle_key_event(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL))
            .unwrap();
    }

    fn remaining(app: &UiApp) -> usize {
        app.host.document().unwrap().ieds().len()
    }

    #[test]
    fn r_opens_and_escape_closes_the_dialog() {
        let mut app = app();
        press(&mut app, KeyCode::Char('r'));
        assert!(app.dialog.is_open());
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Esc);
        assert!(!app.dialog.is_open());

        press(&mut app, KeyCode::Char('r'));
        assert!(app.dialog.list().selected_handles().is_empty());
    }

    #[test]
    fn selecting_and_submitting_removes_ieds() {
        let mut app = app();
        press(&mut app, KeyCode::Char('r'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char(' '));
        press_ctrl(&mut app, 'r');

        assert_eq!(remaining(&app), 2);
        assert!(app.host.document().unwrap().find_ied("IED2").is_none());
        assert!(app.dialog.is_open());
        assert!(app.dialog.sync(&app.host));
        assert_eq!(app.dialog.list().items().len(), 2);
        assert_eq!(
            app.status.as_ref().map(|status| status.text.as_str()),
            Some("Removed IED IED2")
        );
    }

    #[test]
    fn remove_button_submits_via_tab_focus() {
        let mut app = app();
        press(&mut app, KeyCode::Char('r'));
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.dialog_focus, DialogFocus::Remove);
        press(&mut app, KeyCode::Enter);

        assert_eq!(remaining(&app), 0);
    }

    #[test]
    fn close_button_discards_selection() {
        let mut app = app();
        press(&mut app, KeyCode::Char('r'));
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);

        assert!(!app.dialog.is_open());
        assert_eq!(remaining(&app), 3);
    }

    #[test]
    fn filter_typing_does_not_trigger_actions() {
        let mut app = app();
        press(&mut app, KeyCode::Char('r'));
        press(&mut app, KeyCode::Char('/'));
        for ch in "rtu".chars() {
            press(&mut app, KeyCode::Char(ch));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.dialog.list().filter(), "rtu");
        assert_eq!(app.dialog.list().visible_len(), 1);

        press(&mut app, KeyCode::Char('a'));
        press_ctrl(&mut app, 'r');
        assert!(app.host.document().unwrap().find_ied("IED2").is_none());
        assert_eq!(remaining(&app), 2);
    }

    #[test]
    fn submitting_nothing_reports_it() {
        let mut app = app();
        press(&mut app, KeyCode::Char('r'));
        press_ctrl(&mut app, 'r');
        assert_eq!(remaining(&app), 3);
        assert_eq!(app.host.edit_count(), 0);
        assert_eq!(
            app.status.as_ref().map(|status| status.level),
            Some(StatusLevel::Info)
        );
    }

    #[test]
    fn quitting_with_unsaved_changes_needs_confirmation() {
        let mut app = app();
        press(&mut app, KeyCode::Char('r'));
        press(&mut app, KeyCode::Char(' '));
        press_ctrl(&mut app, 'r');
        press(&mut app, KeyCode::Esc);

        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn saving_without_target_reports_an_error() {
        let mut app = app();
        press_ctrl(&mut app, 's');
        assert_eq!(
            app.status.as_ref().map(|status| status.level),
            Some(StatusLevel::Error)
        );
    }

    #[test]
    fn renders_editor_and_dialog() {
        let mut app = app();
        press(&mut app, KeyCode::Char('r'));
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("Document · untitled"));
        assert!(text.contains("Remove IEDs"));
        assert!(text.contains("IED3"));
    }

    #[test]
    fn report_summary_mentions_skipped_ieds() {
        let report = RemovalReport {
            removed: vec!["A".into(), "B".into()],
            skipped: vec!["C".into()],
        };
        let (level, text) = describe_report(&report);
        assert_eq!(level, StatusLevel::Error);
        assert_eq!(text, "Removed 2 IEDs · skipped C");
    }

    #[test]
    fn dialog_hints_follow_rebound_keys() {
        let doc = SclDocument::parse(r#"<SCL><IED name="IED1"/></SCL>"#).unwrap();
        let mut config = Config::default();
        config.keybindings.toggle = Some("x".into());
        config.keybindings.remove = Some("ctrl+d".into());
        let mut app = UiApp::new(config, EditorHost::with_document(doc), None).unwrap();
        press(&mut app, KeyCode::Char('r'));

        let hints: String = app
            .hints()
            .spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect();
        assert!(hints.contains("x toggle"));
        assert!(hints.contains("ctrl+d remove"));
        assert!(hints.contains("j/k move"));
        assert!(!hints.contains("space"));
    }
}

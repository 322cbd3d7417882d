//! Interactive onboarding wizard demonstrating the modal flow store.
//!
//! The wizard drives a single "onboarding" modal: welcome, plan selection,
//! an optional billing step (registered only when the paid plan is chosen)
//! and a confirmation step. Back navigation follows the flow actually taken,
//! so returning from confirmation lands on billing when it was visited.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use serde_json::json;
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use crate::config::Config;
use crate::handle::{ModalHandle, ModalOptions};
use crate::store::{to_flow_data, FlowData, ModalStore};
use crate::ui::{DebugOverlay, StepView};

const MODAL_ID: &str = "onboarding";
const PLANS: [&str; 2] = ["free", "pro"];
const CYCLES: [&str; 2] = ["monthly", "yearly"];

pub struct App {
    config: Config,
    handle: ModalHandle,
    debug_overlay: DebugOverlay,
    should_quit: bool,
    plan_index: usize,
    cycle_index: usize,
    completed: Rc<RefCell<Option<FlowData>>>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let store = ModalStore::new().into_shared();
        store.borrow_mut().subscribe(|snapshot| {
            tracing::trace!(open = snapshot.open_modal_ids().len(), "store committed");
        });

        let completed = Rc::new(RefCell::new(None));
        let on_complete = Rc::clone(&completed);

        let handle = ModalHandle::with_options(
            store,
            MODAL_ID,
            ModalOptions::new()
                .initial_data(to_flow_data(json!({"source": "wizard"})))
                .on_complete(move |data| *on_complete.borrow_mut() = Some(data.clone()))
                .on_cancel(|| tracing::info!("onboarding cancelled")),
        );
        handle.add_step("welcome");
        handle.add_step("plan");
        handle.add_step("confirm");

        Self {
            config,
            handle,
            debug_overlay: DebugOverlay::new(),
            should_quit: false,
            plan_index: 0,
            cycle_index: 0,
            completed,
        }
    }

    /// Run the wizard to completion; returns the collected flow data, or
    /// `None` when the user cancelled.
    pub fn run(mut self) -> Result<Option<FlowData>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result?;
        Ok(self.completed.borrow_mut().take())
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        let tick_rate = Duration::from_millis(self.config.ui.tick_rate_ms);

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;

            if !event::poll(tick_rate)? {
                continue;
            }
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key.code);
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) {
        if self.debug_overlay.visible && code != KeyCode::Char('d') {
            self.debug_overlay.toggle();
            return;
        }

        match code {
            KeyCode::Char('q') => {
                self.handle.cancel();
                self.should_quit = true;
            }
            KeyCode::Char('d') => self.debug_overlay.toggle(),
            KeyCode::Esc => self.go_back(),
            KeyCode::Up | KeyCode::Down => self.move_selection(code),
            KeyCode::Enter => self.advance(),
            _ => {}
        }
    }

    fn go_back(&mut self) {
        if self.handle.is_first_step() {
            self.handle.cancel();
            self.should_quit = true;
        } else {
            self.handle.prev();
        }
    }

    fn move_selection(&mut self, code: KeyCode) {
        let delta: isize = if code == KeyCode::Up { -1 } else { 1 };
        match self.handle.current_step().as_deref() {
            Some("plan") => {
                self.plan_index =
                    (self.plan_index as isize + delta).rem_euclid(PLANS.len() as isize) as usize;
            }
            Some("billing") => {
                self.cycle_index =
                    (self.cycle_index as isize + delta).rem_euclid(CYCLES.len() as isize) as usize;
            }
            _ => {}
        }
    }

    fn advance(&mut self) {
        match self.handle.current_step().as_deref() {
            Some("welcome") => self.handle.next(),
            Some("plan") => {
                self.handle
                    .set_data(to_flow_data(json!({"plan": PLANS[self.plan_index]})));
                let wants_billing = self.handle.add_step_if("billing", Some("plan"), |data| {
                    data.get("plan").and_then(|v| v.as_str()) == Some("pro")
                });
                if wants_billing {
                    self.handle.go_to("billing");
                } else {
                    self.handle.next();
                }
            }
            Some("billing") => {
                self.handle.go_to_with(
                    "confirm",
                    Some(to_flow_data(json!({"cycle": CYCLES[self.cycle_index]}))),
                    true,
                );
            }
            Some("confirm") => {
                self.handle.complete();
                self.should_quit = true;
            }
            _ => {}
        }
    }

    // ─── Rendering ──────────────────────────────────────────────────────────

    fn render(&mut self, frame: &mut Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.render_title(frame, chunks[0]);
        self.render_body(frame, chunks[1]);
        self.render_footer(frame, chunks[2]);

        let snapshot = self.handle.snapshot();
        self.debug_overlay.render(frame, &snapshot);
    }

    fn render_title(&self, frame: &mut Frame<'_>, area: Rect) {
        let step = self.handle.current_step_index() + 1;
        let total = self.handle.total_steps();
        let title = Paragraph::new(format!("Onboarding (step {step} of {total})"))
            .style(Style::default().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, area);
    }

    fn render_body(&self, frame: &mut Frame<'_>, area: Rect) {
        let data = self.handle.data();
        let plan_index = self.plan_index;
        let cycle_index = self.cycle_index;

        let drew = StepView::new()
            .step("welcome", |frame, area| {
                let text = vec![
                    Line::from("Welcome!"),
                    Line::from(""),
                    Line::from("This wizard sets up your account in a few steps."),
                ];
                frame.render_widget(
                    Paragraph::new(text).block(Block::default().borders(Borders::ALL)),
                    area,
                );
            })
            .step("plan", move |frame, area| {
                let mut lines = vec![Line::from("Choose a plan:"), Line::from("")];
                for (index, plan) in PLANS.iter().enumerate() {
                    let marker = if index == plan_index { "> " } else { "  " };
                    let style = if index == plan_index {
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    lines.push(Line::from(Span::styled(format!("{marker}{plan}"), style)));
                }
                frame.render_widget(
                    Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
                    area,
                );
            })
            .step("billing", move |frame, area| {
                let mut lines = vec![Line::from("Billing cycle:"), Line::from("")];
                for (index, cycle) in CYCLES.iter().enumerate() {
                    let marker = if index == cycle_index { "> " } else { "  " };
                    let style = if index == cycle_index {
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    lines.push(Line::from(Span::styled(format!("{marker}{cycle}"), style)));
                }
                frame.render_widget(
                    Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
                    area,
                );
            })
            .step("confirm", move |frame, area| {
                let mut lines = vec![Line::from("Review your choices:"), Line::from("")];
                for (key, value) in &data {
                    lines.push(Line::from(format!("  {key}: {value}")));
                }
                lines.push(Line::from(""));
                lines.push(Line::from("Press Enter to finish."));
                frame.render_widget(
                    Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
                    area,
                );
            })
            .render(self.handle.current_step().as_deref(), frame, area);

        if !drew {
            frame.render_widget(
                Paragraph::new("No step registered")
                    .block(Block::default().borders(Borders::ALL)),
                area,
            );
        }
    }

    fn render_footer(&self, frame: &mut Frame<'_>, area: Rect) {
        let back_hint = if self.handle.is_first_step() {
            "Esc cancel"
        } else {
            "Esc back"
        };
        let footer = Paragraph::new(format!(
            "Enter continue | {back_hint} | Up/Down select | d debugger | q quit"
        ))
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        App::new(Config::default())
    }

    #[test]
    fn test_wizard_registers_base_steps() {
        let app = test_app();
        assert_eq!(app.handle.total_steps(), 3);
        assert_eq!(app.handle.current_step(), Some("welcome".to_string()));
    }

    #[test]
    fn test_free_plan_skips_billing() {
        let mut app = test_app();
        app.advance(); // welcome -> plan
        app.advance(); // plan (free) -> confirm

        assert_eq!(app.handle.current_step(), Some("confirm".to_string()));
        assert_eq!(app.handle.total_steps(), 3);
    }

    #[test]
    fn test_pro_plan_visits_billing_and_back_follows_history() {
        let mut app = test_app();
        app.advance(); // welcome -> plan
        app.move_selection(KeyCode::Down); // select pro
        app.advance(); // plan -> billing (registered on demand)

        assert_eq!(app.handle.current_step(), Some("billing".to_string()));
        assert_eq!(app.handle.total_steps(), 4);

        app.advance(); // billing -> confirm
        assert_eq!(app.handle.current_step(), Some("confirm".to_string()));

        app.go_back(); // confirm -> billing, not the adjacent index
        assert_eq!(app.handle.current_step(), Some("billing".to_string()));

        app.go_back(); // billing -> plan via declared previous step
        assert_eq!(app.handle.current_step(), Some("plan".to_string()));
    }

    #[test]
    fn test_complete_collects_merged_data() {
        let mut app = test_app();
        app.advance(); // welcome -> plan
        app.move_selection(KeyCode::Down); // pro
        app.advance(); // -> billing
        app.move_selection(KeyCode::Down); // yearly
        app.advance(); // -> confirm
        app.advance(); // complete

        assert!(app.should_quit);
        let data = app.completed.borrow().clone().unwrap();
        assert_eq!(data.get("plan"), Some(&json!("pro")));
        assert_eq!(data.get("cycle"), Some(&json!("yearly")));
        assert_eq!(data.get("source"), Some(&json!("wizard")));
        assert!(!app.handle.is_open());
    }

    #[test]
    fn test_cancel_on_first_step() {
        let mut app = test_app();
        app.go_back();

        assert!(app.should_quit);
        assert!(app.completed.borrow().is_none());
        assert!(!app.handle.is_open());
    }
}

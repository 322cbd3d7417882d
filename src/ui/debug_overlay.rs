//! Toggleable inspector overlay for the modal store.
//!
//! Draws every open modal with its step sequence, current position, history
//! depth and merged data, on top of whatever the app rendered underneath.

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::centered_rect;
use crate::store::StoreSnapshot;

pub struct DebugOverlay {
    pub visible: bool,
}

impl DebugOverlay {
    pub fn new() -> Self {
        Self { visible: false }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn render(&self, frame: &mut Frame<'_>, snapshot: &StoreSnapshot) {
        if !self.visible {
            return;
        }

        let area = centered_rect(70, 80, frame.area());
        frame.render_widget(Clear, area);

        let mut lines = vec![
            Line::from(Span::styled(
                "Open Modals",
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .fg(Color::Cyan),
            )),
            Line::from(""),
        ];

        let modal_ids = snapshot.open_modal_ids();
        if modal_ids.is_empty() {
            lines.push(Line::from(Span::styled(
                "(none)",
                Style::default().fg(Color::Gray),
            )));
        }

        for modal_id in modal_ids {
            let Some(state) = snapshot.modal_state(&modal_id) else {
                continue;
            };

            lines.push(Line::from(Span::styled(
                modal_id,
                Style::default().add_modifier(Modifier::BOLD).fg(Color::Yellow),
            )));

            let mut steps_line = vec![Span::raw("  steps: ")];
            for (index, step) in state.steps.iter().enumerate() {
                if index > 0 {
                    steps_line.push(Span::raw(" > "));
                }
                let style = if index == state.current_step_index {
                    Style::default().add_modifier(Modifier::BOLD).fg(Color::Green)
                } else {
                    Style::default()
                };
                steps_line.push(Span::styled(step.id.clone(), style));
            }
            if state.steps.is_empty() {
                steps_line.push(Span::styled("(no steps)", Style::default().fg(Color::Gray)));
            }
            lines.push(Line::from(steps_line));

            lines.push(Line::from(format!(
                "  index: {}/{}  history depth: {}",
                state.current_step_index,
                state.steps.len(),
                state.navigation_history.len()
            )));

            let data = serde_json::to_string_pretty(&state.data)
                .unwrap_or_else(|_| "{}".to_string());
            for data_line in data.lines() {
                lines.push(Line::from(Span::styled(
                    format!("  {data_line}"),
                    Style::default().fg(Color::Gray),
                )));
            }
            lines.push(Line::from(""));
        }

        lines.push(Line::from(Span::styled(
            "Press d to close",
            Style::default().fg(Color::Gray),
        )));

        let overlay = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" Modal Debugger ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .alignment(Alignment::Left);

        frame.render_widget(overlay, area);
    }
}

impl Default for DebugOverlay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{to_flow_data, ModalStore};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use serde_json::json;

    fn rendered_text(overlay: &DebugOverlay, snapshot: &StoreSnapshot) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal
            .draw(|frame| overlay.render(frame, snapshot))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_overlay_toggle() {
        let mut overlay = DebugOverlay::new();
        assert!(!overlay.visible);

        overlay.toggle();
        assert!(overlay.visible);

        overlay.toggle();
        assert!(!overlay.visible);
    }

    #[test]
    fn test_hidden_overlay_draws_nothing() {
        let overlay = DebugOverlay::new();
        let store = ModalStore::new();
        let text = rendered_text(&overlay, &store.snapshot());
        assert!(!text.contains("Modal Debugger"));
    }

    #[test]
    fn test_overlay_lists_modals_and_current_step() {
        let mut store = ModalStore::new();
        store.open("wizard", Some(to_flow_data(json!({"plan": "pro"}))));
        store.add_step("wizard", "choose-plan", None, None);
        store.add_step("wizard", "confirm", None, None);
        store.next_step("wizard", None);

        let mut overlay = DebugOverlay::new();
        overlay.toggle();
        let text = rendered_text(&overlay, &store.snapshot());

        assert!(text.contains("Modal Debugger"));
        assert!(text.contains("wizard"));
        assert!(text.contains("choose-plan"));
        assert!(text.contains("index: 1/2"));
        assert!(text.contains("history depth: 1"));
        assert!(text.contains("\"plan\""));
    }

    #[test]
    fn test_overlay_with_no_modals() {
        let mut overlay = DebugOverlay::new();
        overlay.toggle();
        let store = ModalStore::new();
        let text = rendered_text(&overlay, &store.snapshot());
        assert!(text.contains("(none)"));
    }
}

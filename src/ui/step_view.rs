//! Declarative step-to-renderer dispatch.
//!
//! A `StepView` pairs step ids with render closures and draws the one
//! matching the flow's current step. The view is rebuilt each frame, so
//! closures can freely capture references to per-frame state.

use ratatui::layout::Rect;
use ratatui::Frame;

type RenderFn<'a> = Box<dyn FnOnce(&mut Frame<'_>, Rect) + 'a>;

/// Renders the registered view for the current step of a flow
#[derive(Default)]
pub struct StepView<'a> {
    candidates: Vec<(String, RenderFn<'a>)>,
}

impl<'a> StepView<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a renderer for `step_id`; first registration wins
    #[must_use]
    pub fn step(mut self, step_id: impl Into<String>, render: impl FnOnce(&mut Frame<'_>, Rect) + 'a) -> Self {
        self.candidates.push((step_id.into(), Box::new(render)));
        self
    }

    /// Draw the view matching `current` into `area`.
    ///
    /// Returns false (drawing nothing) when `current` is `None` or no
    /// candidate matches, so callers can fall back to a placeholder.
    pub fn render(self, current: Option<&str>, frame: &mut Frame<'_>, area: Rect) -> bool {
        let Some(current) = current else {
            return false;
        };
        for (step_id, render) in self.candidates {
            if step_id == current {
                render(frame, area);
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::widgets::Paragraph;
    use ratatui::Terminal;
    use std::cell::Cell;

    fn test_terminal() -> Terminal<TestBackend> {
        Terminal::new(TestBackend::new(40, 10)).unwrap()
    }

    #[test]
    fn test_renders_matching_step() {
        let rendered = Cell::new(None);
        let mut matched = false;
        test_terminal()
            .draw(|frame| {
                let view = StepView::new()
                    .step("welcome", |frame, area| {
                        rendered.set(Some("welcome"));
                        frame.render_widget(Paragraph::new("hello"), area);
                    })
                    .step("confirm", |_, _| rendered.set(Some("confirm")));
                matched = view.render(Some("confirm"), frame, frame.area());
            })
            .unwrap();
        assert!(matched);
        assert_eq!(rendered.get(), Some("confirm"));
    }

    #[test]
    fn test_no_current_step_renders_nothing() {
        let rendered = Cell::new(None);
        let mut matched = true;
        test_terminal()
            .draw(|frame| {
                let view = StepView::new().step("welcome", |_, _| rendered.set(Some("welcome")));
                matched = view.render(None, frame, frame.area());
            })
            .unwrap();
        assert!(!matched);
        assert_eq!(rendered.get(), None);
    }

    #[test]
    fn test_unmatched_step_renders_nothing() {
        let rendered = Cell::new(None);
        let mut matched = true;
        test_terminal()
            .draw(|frame| {
                let view = StepView::new().step("welcome", |_, _| rendered.set(Some("welcome")));
                matched = view.render(Some("billing"), frame, frame.area());
            })
            .unwrap();
        assert!(!matched);
        assert_eq!(rendered.get(), None);
    }

    #[test]
    fn test_first_registration_wins_on_duplicate_id() {
        let rendered = Cell::new(None);
        test_terminal()
            .draw(|frame| {
                let view = StepView::new()
                    .step("welcome", |_, _| rendered.set(Some("first")))
                    .step("welcome", |_, _| rendered.set(Some("second")));
                view.render(Some("welcome"), frame, frame.area());
            })
            .unwrap();
        assert_eq!(rendered.get(), Some("first"));
    }
}

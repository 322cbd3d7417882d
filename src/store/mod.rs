//! Single source of truth for all currently-active modal flows.
//!
//! `ModalStore` maps modal ids to immutable per-modal states and funnels all
//! mutation through a small operation set. Each operation computes a fresh
//! state for the affected modal and swaps it in whole, so holders of an
//! earlier snapshot keep a consistent (stale but valid) view. Subscribers are
//! notified synchronously after every committed mutation.
//!
//! Unknown modal or step ids never produce errors: every such case degrades
//! to a no-op or a neutral default, and the caller is expected to gate user
//! actions on the derived getters (`is_first_step`, `is_last_step`,
//! `is_modal_open`) instead of relying on failures.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

mod subscription;
mod types;

pub use subscription::SubscriberId;
pub use types::{to_flow_data, FlowData, ModalState, Step, StoreSnapshot};

use types::merge;


/// Shared handle to a store in the single-threaded cooperative model:
/// UI code, adapters and the event loop all hold clones of this.
pub type SharedModalStore = Rc<RefCell<ModalStore>>;

/// Observable in-memory store of modal flow states
#[derive(Debug, Default)]
pub struct ModalStore {
    state: StoreSnapshot,
    subscribers: subscription::SubscriberRegistry,
}

impl ModalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the store for shared single-threaded use
    pub fn into_shared(self) -> SharedModalStore {
        Rc::new(RefCell::new(self))
    }

    // ─── Lifecycle ──────────────────────────────────────────────────────────

    /// Create a modal with empty steps and the given initial data.
    ///
    /// Idempotent: opening an already-open modal keeps its accumulated
    /// steps and progress untouched and commits nothing.
    pub fn open(&mut self, modal_id: &str, initial_data: Option<FlowData>) {
        if self.state.modals.contains_key(modal_id) {
            tracing::debug!(modal = modal_id, "open ignored, modal already open");
            return;
        }
        tracing::debug!(modal = modal_id, "modal opened");
        self.commit(modal_id, ModalState::new(initial_data.unwrap_or_default()));
    }

    /// Remove a modal entirely; no-op for unknown ids
    pub fn close(&mut self, modal_id: &str) {
        if self.state.modals.remove(modal_id).is_some() {
            tracing::debug!(modal = modal_id, "modal closed");
            self.notify();
        }
    }

    /// Remove every open modal
    pub fn close_all(&mut self) {
        if self.state.modals.is_empty() {
            return;
        }
        tracing::debug!(count = self.state.modals.len(), "all modals closed");
        self.state.modals.clear();
        self.notify();
    }

    // ─── Step registration ──────────────────────────────────────────────────

    /// Append a step to a modal's flow.
    ///
    /// A duplicate `step_id` is ignored, except that a supplied
    /// `previous_step` updates the existing step's back target. Re-registering
    /// a step this way lets a flow adjust its predecessor as conditions
    /// change.
    pub fn add_step(
        &mut self,
        modal_id: &str,
        step_id: &str,
        data: Option<FlowData>,
        previous_step: Option<&str>,
    ) {
        let Some(modal) = self.state.modals.get(modal_id) else {
            tracing::debug!(modal = modal_id, step = step_id, "add_step on unknown modal");
            return;
        };

        if let Some(index) = modal.step_index(step_id) {
            let Some(previous) = previous_step else {
                tracing::debug!(modal = modal_id, step = step_id, "duplicate step ignored");
                return;
            };
            let mut next = ModalState::clone(modal);
            next.steps[index].previous_step = Some(previous.to_string());
            self.commit(modal_id, next);
            return;
        }

        let mut next = ModalState::clone(modal);
        next.steps.push(Step {
            id: step_id.to_string(),
            data: data.unwrap_or_default(),
            previous_step: previous_step.map(str::to_string),
        });
        tracing::trace!(modal = modal_id, step = step_id, "step registered");
        self.commit(modal_id, next);
    }

    // ─── Navigation ─────────────────────────────────────────────────────────

    /// Advance to the next step, merging `data` into the modal data.
    ///
    /// Rejected at the last step (and while no steps exist). On success the
    /// departed step's id is pushed onto the navigation history.
    pub fn next_step(&mut self, modal_id: &str, data: Option<FlowData>) {
        let Some(modal) = self.state.modals.get(modal_id) else {
            tracing::debug!(modal = modal_id, "next_step on unknown modal");
            return;
        };

        let next_index = modal.current_step_index + 1;
        if next_index >= modal.steps.len() {
            tracing::debug!(modal = modal_id, "next_step rejected at last step");
            return;
        }

        let mut next = ModalState::clone(modal);
        if let Some(current) = next.current_step_id().map(str::to_string) {
            next.navigation_history.push(current);
        }
        next.current_step_index = next_index;
        if let Some(data) = data {
            merge(&mut next.data, data);
        }
        self.commit(modal_id, next);
    }

    /// Move back one step.
    ///
    /// Precedence:
    /// 1. the current step's declared `previous_step`, when it resolves to a
    ///    registered step (pops the last history entry);
    /// 2. the last visited step id popped off the navigation history;
    /// 3. plain `current_step_index - 1`, when that stays in bounds.
    ///
    /// A popped history id that no longer resolves is consumed and navigation
    /// falls through to the index fallback. No data is merged on back moves.
    pub fn prev_step(&mut self, modal_id: &str) {
        let Some(modal) = self.state.modals.get(modal_id) else {
            tracing::debug!(modal = modal_id, "prev_step on unknown modal");
            return;
        };

        let mut next = ModalState::clone(modal);

        let declared = next
            .steps
            .get(next.current_step_index)
            .and_then(|s| s.previous_step.clone());
        if let Some(target) = declared {
            if let Some(index) = next.step_index(&target) {
                next.current_step_index = index;
                next.navigation_history.pop();
                self.commit(modal_id, next);
                return;
            }
            tracing::debug!(
                modal = modal_id,
                target = %target,
                "declared previous_step not registered, falling back"
            );
        }

        let mut popped_stale = false;
        if let Some(visited) = next.navigation_history.pop() {
            if let Some(index) = next.step_index(&visited) {
                next.current_step_index = index;
                self.commit(modal_id, next);
                return;
            }
            popped_stale = true;
        }

        if next.current_step_index > 0 {
            next.current_step_index -= 1;
            self.commit(modal_id, next);
            return;
        }

        if popped_stale {
            // The stale history entry is gone even though the step didn't
            // move; commit so the cleanup isn't lost.
            self.commit(modal_id, next);
            return;
        }
        tracing::debug!(modal = modal_id, "prev_step rejected at first step");
    }

    /// Jump directly to the step with id `step_id`, merging `data`.
    ///
    /// When `add_to_history` is set, the current step id is pushed onto the
    /// history first so a later `prev_step` returns here.
    pub fn go_to_step(
        &mut self,
        modal_id: &str,
        step_id: &str,
        data: Option<FlowData>,
        add_to_history: bool,
    ) {
        let Some(modal) = self.state.modals.get(modal_id) else {
            tracing::debug!(modal = modal_id, step = step_id, "go_to_step on unknown modal");
            return;
        };
        let Some(index) = modal.step_index(step_id) else {
            tracing::debug!(modal = modal_id, step = step_id, "go_to_step to unknown step");
            return;
        };

        let mut next = ModalState::clone(modal);
        if add_to_history {
            if let Some(current) = next.current_step_id().map(str::to_string) {
                next.navigation_history.push(current);
            }
        }
        next.current_step_index = index;
        if let Some(data) = data {
            merge(&mut next.data, data);
        }
        self.commit(modal_id, next);
    }

    /// Jump to the step at `index`; rejected when out of bounds.
    ///
    /// Like `go_to_step`, the departed step is recorded in the history.
    pub fn go_to_index(&mut self, modal_id: &str, index: usize, data: Option<FlowData>) {
        let Some(modal) = self.state.modals.get(modal_id) else {
            tracing::debug!(modal = modal_id, index, "go_to_index on unknown modal");
            return;
        };
        if index >= modal.steps.len() {
            tracing::debug!(modal = modal_id, index, "go_to_index out of bounds");
            return;
        }

        let mut next = ModalState::clone(modal);
        if let Some(current) = next.current_step_id().map(str::to_string) {
            next.navigation_history.push(current);
        }
        next.current_step_index = index;
        if let Some(data) = data {
            merge(&mut next.data, data);
        }
        self.commit(modal_id, next);
    }

    // ─── Data ───────────────────────────────────────────────────────────────

    /// Shallow-merge `data` into the modal's data; no step or index change
    pub fn update_data(&mut self, modal_id: &str, data: FlowData) {
        let Some(modal) = self.state.modals.get(modal_id) else {
            tracing::debug!(modal = modal_id, "update_data on unknown modal");
            return;
        };
        let mut next = ModalState::clone(modal);
        merge(&mut next.data, data);
        self.commit(modal_id, next);
    }

    // ─── Subscription ───────────────────────────────────────────────────────

    /// Register a listener invoked synchronously after every committed
    /// mutation with the post-mutation snapshot
    pub fn subscribe(&mut self, listener: impl Fn(&StoreSnapshot) + 'static) -> SubscriberId {
        self.subscribers.subscribe(Box::new(listener))
    }

    /// Remove a listener; returns false if the id was already unsubscribed
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // ─── Derived getters ────────────────────────────────────────────────────

    /// Current committed view of every open modal
    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.clone()
    }

    /// Merged data for a modal, empty if the modal is not open
    pub fn modal_data(&self, modal_id: &str) -> FlowData {
        self.state.modal_data(modal_id)
    }

    /// Payload a step was registered with, `None` for unknown modal or step
    pub fn step_data(&self, modal_id: &str, step_id: &str) -> Option<FlowData> {
        self.state.step_data(modal_id, step_id)
    }

    /// Id of the current step, `None` if the modal is absent or has no steps
    pub fn current_step(&self, modal_id: &str) -> Option<String> {
        self.state.current_step(modal_id)
    }

    /// Index of the current step, 0 if the modal is not open
    pub fn current_step_index(&self, modal_id: &str) -> usize {
        self.state.current_step_index(modal_id)
    }

    /// Number of registered steps, 0 if the modal is not open
    pub fn total_steps(&self, modal_id: &str) -> usize {
        self.state.total_steps(modal_id)
    }

    /// True while nothing has been visited yet (history empty)
    pub fn is_first_step(&self, modal_id: &str) -> bool {
        self.state.is_first_step(modal_id)
    }

    /// True iff the current step is the last registered step
    pub fn is_last_step(&self, modal_id: &str) -> bool {
        self.state.is_last_step(modal_id)
    }

    /// Whether the modal id exists in the store
    pub fn is_modal_open(&self, modal_id: &str) -> bool {
        self.state.is_modal_open(modal_id)
    }

    /// Ids of all open modals, sorted for stable display order
    pub fn open_modal_ids(&self) -> Vec<String> {
        self.state.open_modal_ids()
    }

    /// Full state of one modal, for read-only inspection
    pub fn modal_state(&self, modal_id: &str) -> Option<Arc<ModalState>> {
        self.state.modal_state(modal_id)
    }

    // ─── Internals ──────────────────────────────────────────────────────────

    fn commit(&mut self, modal_id: &str, state: ModalState) {
        self.state.modals.insert(modal_id.to_string(), Arc::new(state));
        self.notify();
    }

    fn notify(&self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.state.clone();
        self.subscribers.notify(&snapshot);
    }
}

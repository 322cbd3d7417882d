//! Per-modal adapter over the shared store.
//!
//! A `ModalHandle` binds one modal id to a [`SharedModalStore`] and exposes
//! the operation set without the caller having to thread the id through
//! every call. Construction opens the modal; `complete`/`cancel` close it
//! and run the configured callbacks. All reads go through the store's
//! derived getters, so a handle for a modal that was closed elsewhere simply
//! reports the absent defaults.

use crate::store::{FlowData, SharedModalStore, StoreSnapshot};

type CompleteCallback = Box<dyn Fn(&FlowData)>;
type CancelCallback = Box<dyn Fn()>;

/// Options for opening a modal through a handle
#[derive(Default)]
pub struct ModalOptions {
    /// Data the modal starts with
    pub initial_data: Option<FlowData>,
    /// Invoked with the merged flow data when the flow completes
    pub on_complete: Option<CompleteCallback>,
    /// Invoked when the flow is cancelled
    pub on_cancel: Option<CancelCallback>,
}

impl ModalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initial_data(mut self, data: FlowData) -> Self {
        self.initial_data = Some(data);
        self
    }

    pub fn on_complete(mut self, callback: impl Fn(&FlowData) + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn on_cancel(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_cancel = Some(Box::new(callback));
        self
    }
}

/// Ergonomic view of one modal flow
pub struct ModalHandle {
    store: SharedModalStore,
    modal_id: String,
    on_complete: Option<CompleteCallback>,
    on_cancel: Option<CancelCallback>,
}

impl ModalHandle {
    /// Open `modal_id` (idempotent) and bind a handle to it
    pub fn new(store: SharedModalStore, modal_id: impl Into<String>) -> Self {
        Self::with_options(store, modal_id, ModalOptions::default())
    }

    /// Open `modal_id` with initial data and lifecycle callbacks
    pub fn with_options(
        store: SharedModalStore,
        modal_id: impl Into<String>,
        options: ModalOptions,
    ) -> Self {
        let modal_id = modal_id.into();
        store.borrow_mut().open(&modal_id, options.initial_data);
        Self {
            store,
            modal_id,
            on_complete: options.on_complete,
            on_cancel: options.on_cancel,
        }
    }

    /// The modal id this handle is bound to
    pub fn modal_id(&self) -> &str {
        &self.modal_id
    }

    // ─── State reads ────────────────────────────────────────────────────────

    pub fn is_open(&self) -> bool {
        self.store.borrow().is_modal_open(&self.modal_id)
    }

    pub fn current_step(&self) -> Option<String> {
        self.store.borrow().current_step(&self.modal_id)
    }

    pub fn current_step_index(&self) -> usize {
        self.store.borrow().current_step_index(&self.modal_id)
    }

    pub fn total_steps(&self) -> usize {
        self.store.borrow().total_steps(&self.modal_id)
    }

    pub fn is_first_step(&self) -> bool {
        self.store.borrow().is_first_step(&self.modal_id)
    }

    pub fn is_last_step(&self) -> bool {
        self.store.borrow().is_last_step(&self.modal_id)
    }

    pub fn data(&self) -> FlowData {
        self.store.borrow().modal_data(&self.modal_id)
    }

    /// Snapshot of the whole store, for debug tooling
    pub fn snapshot(&self) -> StoreSnapshot {
        self.store.borrow().snapshot()
    }

    // ─── Actions ────────────────────────────────────────────────────────────

    /// Register a step at the end of the flow
    pub fn add_step(&self, step_id: &str) {
        self.store
            .borrow_mut()
            .add_step(&self.modal_id, step_id, None, None);
    }

    /// Register a step with a payload and/or an explicit back target
    pub fn add_step_with(&self, step_id: &str, data: Option<FlowData>, previous_step: Option<&str>) {
        self.store
            .borrow_mut()
            .add_step(&self.modal_id, step_id, data, previous_step);
    }

    /// Register a step only when `predicate` holds over the current flow
    /// data. Conditional flows live here, not in the store: the store never
    /// evaluates predicates.
    ///
    /// Returns whether the predicate held.
    pub fn add_step_if(
        &self,
        step_id: &str,
        previous_step: Option<&str>,
        predicate: impl Fn(&FlowData) -> bool,
    ) -> bool {
        let wanted = predicate(&self.data());
        if wanted {
            self.add_step_with(step_id, None, previous_step);
        }
        wanted
    }

    /// Advance to the next step
    pub fn next(&self) {
        self.store.borrow_mut().next_step(&self.modal_id, None);
    }

    /// Advance to the next step, merging `data`
    pub fn next_with(&self, data: FlowData) {
        self.store.borrow_mut().next_step(&self.modal_id, Some(data));
    }

    /// Navigate back one step
    pub fn prev(&self) {
        self.store.borrow_mut().prev_step(&self.modal_id);
    }

    /// Jump to a step, recording the departure in the history
    pub fn go_to(&self, step_id: &str) {
        self.store
            .borrow_mut()
            .go_to_step(&self.modal_id, step_id, None, true);
    }

    /// Jump to a step with full control over data merge and history
    pub fn go_to_with(&self, step_id: &str, data: Option<FlowData>, add_to_history: bool) {
        self.store
            .borrow_mut()
            .go_to_step(&self.modal_id, step_id, data, add_to_history);
    }

    /// Shallow-merge `data` into the flow data
    pub fn set_data(&self, data: FlowData) {
        self.store.borrow_mut().update_data(&self.modal_id, data);
    }

    // ─── Lifecycle ──────────────────────────────────────────────────────────

    /// Close the flow, running the `on_cancel` callback first
    pub fn cancel(&self) {
        if let Some(callback) = &self.on_cancel {
            callback();
        }
        self.store.borrow_mut().close(&self.modal_id);
    }

    /// Close the flow, handing the merged data to `on_complete` first
    pub fn complete(&self) {
        let data = self.data();
        if let Some(callback) = &self.on_complete {
            callback(&data);
        }
        self.store.borrow_mut().close(&self.modal_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{to_flow_data, ModalStore};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_handle_opens_modal_on_construction() {
        let store = ModalStore::new().into_shared();
        let handle = ModalHandle::new(Rc::clone(&store), "signup");

        assert!(handle.is_open());
        assert!(store.borrow().is_modal_open("signup"));
    }

    #[test]
    fn test_handle_reopen_keeps_progress() {
        let store = ModalStore::new().into_shared();
        let handle = ModalHandle::new(Rc::clone(&store), "signup");
        handle.add_step("one");
        handle.add_step("two");
        handle.next();

        // A second handle for the same id must not reset the flow
        let again = ModalHandle::new(Rc::clone(&store), "signup");
        assert_eq!(again.current_step_index(), 1);
        assert_eq!(again.total_steps(), 2);
    }

    #[test]
    fn test_handle_navigation_and_flags() {
        let store = ModalStore::new().into_shared();
        let handle = ModalHandle::new(store, "signup");
        handle.add_step("one");
        handle.add_step("two");

        assert!(handle.is_first_step());
        assert!(!handle.is_last_step());

        handle.next_with(to_flow_data(json!({"name": "sam"})));
        assert_eq!(handle.current_step(), Some("two".to_string()));
        assert!(handle.is_last_step());
        assert!(!handle.is_first_step());

        handle.prev();
        assert_eq!(handle.current_step(), Some("one".to_string()));
        assert!(handle.is_first_step());
        assert_eq!(handle.data(), to_flow_data(json!({"name": "sam"})));
    }

    #[test]
    fn test_add_step_if_respects_predicate() {
        let store = ModalStore::new().into_shared();
        let handle = ModalHandle::with_options(
            store,
            "signup",
            ModalOptions::new().initial_data(to_flow_data(json!({"plan": "pro"}))),
        );
        handle.add_step("plan");

        let added = handle.add_step_if("billing", Some("plan"), |data| {
            data.get("plan").and_then(|v| v.as_str()) == Some("pro")
        });
        assert!(added);
        assert_eq!(handle.total_steps(), 2);

        let skipped = handle.add_step_if("enterprise", None, |data| {
            data.get("plan").and_then(|v| v.as_str()) == Some("enterprise")
        });
        assert!(!skipped);
        assert_eq!(handle.total_steps(), 2);
    }

    #[test]
    fn test_complete_passes_merged_data_and_closes() {
        let store = ModalStore::new().into_shared();
        let received = Rc::new(RefCell::new(None));
        let captured = Rc::clone(&received);

        let handle = ModalHandle::with_options(
            Rc::clone(&store),
            "signup",
            ModalOptions::new()
                .initial_data(to_flow_data(json!({"plan": "free"})))
                .on_complete(move |data| *captured.borrow_mut() = Some(data.clone())),
        );
        handle.set_data(to_flow_data(json!({"name": "sam"})));
        handle.complete();

        assert_eq!(
            *received.borrow(),
            Some(to_flow_data(json!({"plan": "free", "name": "sam"})))
        );
        assert!(!store.borrow().is_modal_open("signup"));
    }

    #[test]
    fn test_cancel_runs_callback_and_closes() {
        let store = ModalStore::new().into_shared();
        let cancelled = Rc::new(RefCell::new(false));
        let captured = Rc::clone(&cancelled);

        let handle = ModalHandle::with_options(
            Rc::clone(&store),
            "signup",
            ModalOptions::new().on_cancel(move || *captured.borrow_mut() = true),
        );
        handle.cancel();

        assert!(*cancelled.borrow());
        assert!(!store.borrow().is_modal_open("signup"));
    }

    #[test]
    fn test_handle_after_external_close_reports_defaults() {
        let store = ModalStore::new().into_shared();
        let handle = ModalHandle::new(Rc::clone(&store), "signup");
        handle.add_step("one");

        store.borrow_mut().close("signup");

        assert!(!handle.is_open());
        assert_eq!(handle.total_steps(), 0);
        assert_eq!(handle.current_step(), None);
    }
}

//! Type definitions for the modal flow store

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Key-value payload shared across a modal flow (initial data, per-step
/// payloads, merge arguments).
pub type FlowData = serde_json::Map<String, serde_json::Value>;

/// Coerce a JSON value into a `FlowData` map.
///
/// Non-object values (arrays, scalars, null) yield an empty map, so callers
/// can pass `serde_json::json!({..})` literals without unwrapping.
pub fn to_flow_data(value: serde_json::Value) -> FlowData {
    match value {
        serde_json::Value::Object(map) => map,
        _ => FlowData::new(),
    }
}

/// Shallow-merge `source` into `target`; later keys overwrite, unspecified
/// keys are left untouched.
pub(crate) fn merge(target: &mut FlowData, source: FlowData) {
    for (key, value) in source {
        target.insert(key, value);
    }
}

/// A single step in a modal flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Unique identifier within the owning modal's step list
    pub id: String,
    /// Payload the step was registered with
    #[serde(default)]
    pub data: FlowData,
    /// Step to return to when navigating back from this step.
    /// `None` means the fallback policy applies (history, then index - 1).
    #[serde(default)]
    pub previous_step: Option<String>,
}

/// The state of one open modal flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalState {
    /// Steps in registration order; order defines default adjacency
    pub steps: Vec<Step>,
    /// Index of the current step; 0 while `steps` is empty
    pub current_step_index: usize,
    /// Data shared and merged across the whole flow
    pub data: FlowData,
    /// Visited step ids, pushed on forward moves and popped on back moves
    pub navigation_history: Vec<String>,
}

impl ModalState {
    pub(crate) fn new(initial_data: FlowData) -> Self {
        Self {
            steps: Vec::new(),
            current_step_index: 0,
            data: initial_data,
            navigation_history: Vec::new(),
        }
    }

    /// Position of a step id in the step list
    pub fn step_index(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == step_id)
    }

    /// Id of the step at `current_step_index`, `None` while no steps exist
    pub fn current_step_id(&self) -> Option<&str> {
        self.steps.get(self.current_step_index).map(|s| s.id.as_str())
    }

    /// A flow is on its first step while nothing has been visited yet.
    ///
    /// History-based, not index-based: under branching flows the two can
    /// diverge, and the empty-history reading is the one that tells a UI
    /// whether "back" has anywhere to go.
    pub fn is_first_step(&self) -> bool {
        self.navigation_history.is_empty()
    }

    /// Whether the current step is the last registered step
    pub fn is_last_step(&self) -> bool {
        !self.steps.is_empty() && self.current_step_index == self.steps.len() - 1
    }
}

/// Immutable view of every open modal at one committed point.
///
/// Cloning is cheap (the per-modal states are `Arc`-shared), so a snapshot
/// can be handed to subscribers and read later without observing partial
/// updates from subsequent operations.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub(crate) modals: HashMap<String, Arc<ModalState>>,
}

impl StoreSnapshot {
    fn modal(&self, modal_id: &str) -> Option<&Arc<ModalState>> {
        self.modals.get(modal_id)
    }

    /// Merged data for a modal, empty if the modal is not open
    pub fn modal_data(&self, modal_id: &str) -> FlowData {
        self.modal(modal_id).map(|m| m.data.clone()).unwrap_or_default()
    }

    /// Payload a step was registered with, `None` for unknown modal or step
    pub fn step_data(&self, modal_id: &str, step_id: &str) -> Option<FlowData> {
        let modal = self.modal(modal_id)?;
        let index = modal.step_index(step_id)?;
        Some(modal.steps[index].data.clone())
    }

    /// Id of the current step, `None` if the modal is absent or has no steps
    pub fn current_step(&self, modal_id: &str) -> Option<String> {
        self.modal(modal_id)
            .and_then(|m| m.current_step_id().map(str::to_string))
    }

    /// Index of the current step, 0 if the modal is not open
    pub fn current_step_index(&self, modal_id: &str) -> usize {
        self.modal(modal_id).map_or(0, |m| m.current_step_index)
    }

    /// Number of registered steps, 0 if the modal is not open
    pub fn total_steps(&self, modal_id: &str) -> usize {
        self.modal(modal_id).map_or(0, |m| m.steps.len())
    }

    /// True while the navigation history is empty (see
    /// [`ModalState::is_first_step`]); also true for an absent modal
    pub fn is_first_step(&self, modal_id: &str) -> bool {
        self.modal(modal_id).is_none_or(|m| m.is_first_step())
    }

    /// True iff the current step is the last one; false when absent or empty
    pub fn is_last_step(&self, modal_id: &str) -> bool {
        self.modal(modal_id).is_some_and(|m| m.is_last_step())
    }

    /// Whether the modal id exists in the store
    pub fn is_modal_open(&self, modal_id: &str) -> bool {
        self.modals.contains_key(modal_id)
    }

    /// Ids of all open modals, sorted for stable display order
    pub fn open_modal_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.modals.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Full state of one modal, for read-only inspection
    pub fn modal_state(&self, modal_id: &str) -> Option<Arc<ModalState>> {
        self.modal(modal_id).cloned()
    }
}

//! Modalflow - Multi-step modal flow state management
//!
//! A small observable store for modal dialogs made of ordered steps, with
//! shared flow data, branch-aware back navigation and synchronous change
//! notification. The `ui` module layers ratatui widgets on top: a
//! step-to-renderer dispatcher and a store inspector overlay.

pub mod config;
pub mod handle;
pub mod logging;
pub mod store;
pub mod ui;

pub use handle::{ModalHandle, ModalOptions};
pub use store::{
    to_flow_data, FlowData, ModalState, ModalStore, SharedModalStore, Step, StoreSnapshot,
    SubscriberId,
};

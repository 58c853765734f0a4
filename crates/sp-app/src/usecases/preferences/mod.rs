//! Preference form use cases.
//!
//! This module exposes the form controller and the use cases it drives.

mod context;
pub mod controller;
mod load_initial_state;
mod retry;
mod submit_selection;

pub use controller::{ControllerError, PreferenceFormController};
pub use load_initial_state::LoadInitialState;
pub use retry::RetryPolicy;
pub use submit_selection::{SaveLearningLevel, SubmitOutcome, SubmitSelection};

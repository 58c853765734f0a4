//! Preference form domain.
//!
//! Form data, validation, diffing and the pure state machine that drives the
//! Selection → Confirmation → Success flow.

mod baseline;
pub mod diff;
mod form;
mod learning_level;
mod status;
pub mod state_machine;
pub mod validation;
mod view;

pub use baseline::SubscriptionBaseline;
pub use diff::{compute_change_set, compute_diff, ChangeSet, SelectionDiff};
pub use form::{FieldName, FormData, TextField};
pub use learning_level::{LearningLevel, LearningLevelError, MAX_LEARNING_LEVEL, MIN_LEARNING_LEVEL};
pub use state_machine::{FormAction, FormEvent, FormStateMachine, SubmitCheck};
pub use status::{FormStatus, Stage, SubmitStatus};
pub use validation::{validate_all, validate_field, FieldErrors, ValidationState};
pub use view::FormView;

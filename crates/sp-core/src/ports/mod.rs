//! Port interfaces for the application layer
//!
//! Ports define the contract between the application logic (use cases)
//! and infrastructure implementations. The preference flow depends only on
//! these traits; backends are chosen once at wiring time.

mod errors;
mod form_event;
pub mod preference_api;

pub use errors::PreferenceApiError;
pub use form_event::{FocusTarget, FormEventPort};
pub use preference_api::{
    PreferenceApiPort, SubscribeRequest, SubscribeResponse, UpdatePreferencesRequest,
    UpdatePreferencesResponse, UserSubscriptions,
};

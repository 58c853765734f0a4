//! # sp-app
//!
//! Use cases and the form controller for the subscription-preference flow.
//! Depends only on the ports defined in `sp-core`; adapters are injected.

pub mod usecases;

pub use usecases::preferences::{ControllerError, PreferenceFormController, RetryPolicy};

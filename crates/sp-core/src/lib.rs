//! # sp-core
//!
//! Core domain models and workflow logic for the subscription-preference flow.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

// Public module exports
pub mod config;
pub mod newsletter;
pub mod ports;
pub mod preference;
pub mod session;

// Re-export commonly used types at the crate root
pub use config::AppConfig;
pub use newsletter::{Newsletter, NewsletterKey, NewsletterSelection};
pub use preference::{
    FieldErrors, FieldName, FormData, FormStatus, FormView, LearningLevel, Stage, SubmitStatus,
    ValidationState,
};
pub use session::SessionContext;

pub mod api;
pub mod events;

pub use api::{ApiBackend, HttpPreferenceApi, InMemoryPreferenceApi};
pub use events::TracingFormEventPort;

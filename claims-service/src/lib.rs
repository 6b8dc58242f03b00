pub mod config;
pub mod consent;
pub mod gate;
pub mod resume;
pub mod service;
pub mod steps;
pub mod submit;

pub use config::ServiceConfig;
pub use service::{AppState, app};

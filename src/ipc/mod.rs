mod error;
mod handlers;
mod router;
mod types;
mod views;

pub use router::handle_request;
pub use types::{AppState, Request};

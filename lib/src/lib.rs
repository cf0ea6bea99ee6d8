mod api;
mod config;
mod event;
mod message;

pub use api::*;
pub use config::*;
pub use event::*;
pub use message::*;

pub mod config;
pub mod error;
pub mod messages;
pub mod types;

pub use config::ConciergeConfig;
pub use error::{ConciergeError, Result};
pub use messages::Message;
pub use types::*;

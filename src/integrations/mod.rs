//! External service integrations.

pub mod calculator_client {
    pub use crate::calculator_client::*;
}

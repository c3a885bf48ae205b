//! External service integrations.

pub mod webhook_models {
    pub use crate::webhook_models::*;
}

pub mod capture_models {
    pub use crate::capture_models::*;
}

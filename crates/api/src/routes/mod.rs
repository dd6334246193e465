//! Route modules; each exposes a `router()` merged in `crate::router`.

pub mod gallery;
pub mod generate;
pub mod health;
pub mod upload;

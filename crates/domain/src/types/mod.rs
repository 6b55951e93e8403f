//! Domain types and models

pub mod user;

pub use user::{SessionSnapshot, TokenPair, User};

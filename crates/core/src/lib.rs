//! Core business logic for Foodgram.

pub mod services;

pub use services::*;

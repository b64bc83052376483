//! API Routes
//!
//! Route handlers organized by functionality.

pub mod days;
pub mod foods;
pub mod health;
pub mod pages;
pub mod settings;

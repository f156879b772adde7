//! Background tasks module
//! 
//! This module contains the countdown task that runs alongside the HTTP server.

pub mod countdown;

// Re-export main items
pub use countdown::{countdown_task, Command, Request};

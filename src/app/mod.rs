//! Application orchestration: controller, state, event loop plumbing, and
//! input handling.

pub mod controller;
pub mod event;
pub mod fetch_runtime;
pub mod handler;
pub mod state;

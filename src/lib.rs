//! Client-side session watchdog for a storefront. Tracks user activity,
//! enforces an inactivity timeout, polls the server for session validity and
//! runs a one-shot logout-and-redirect sequence once either signal says the
//! session is over.

pub mod monitor;
pub mod session_api;
pub mod surface;
pub mod utils;

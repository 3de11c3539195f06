//! Command Handlers module
//!
//! Command handlers validate input before it reaches the store and
//! orchestrate writes that span both collections.

mod commands;
mod venue_handler;


pub use commands::*;
pub use venue_handler::VenueHandler;

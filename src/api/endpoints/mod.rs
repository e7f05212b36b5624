//! API endpoint handlers.
//!
//! Each module maps to one screen or resource. Handlers open a connection
//! per request on the blocking pool and delegate to the service modules.

pub mod health;
pub mod home;
pub mod knowledge;
pub mod locations;
pub mod members;
pub mod records;
pub mod reminders;
pub mod schedule;

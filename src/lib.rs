//! Clinic notification dispatcher.
//!
//! Receives clinic events over HTTP, resolves recipients to device addresses
//! and fans push messages out through FCM, pruning dead addresses and
//! recording what was delivered. A daily job reminds patients of the next
//! day's appointments.

pub mod config;
pub mod context;
pub mod db;
pub mod directory;
pub mod error;
pub mod models;
pub mod reminder;
pub mod routes;
pub mod services;

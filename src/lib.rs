//! Chartering back-office: vessels, charters, voyages and their paperwork
//! kept in PostgreSQL, with a small HTTP front door.

pub mod config;
pub mod database;
pub mod errors;
pub mod models;
pub mod server;

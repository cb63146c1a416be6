//! Authoritative server for the dog-walker delivery game
//!
//! The library exposes the simulation kernel (world model, tick pipeline,
//! player registry), the record store, and the HTTP command surface; the
//! binary in `main.rs` wires them together.

pub mod app;
pub mod cli;
pub mod config;
pub mod game;
pub mod http;
pub mod store;
pub mod ticker;

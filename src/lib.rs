// ABOUTME: Library module for mysql-db-compare
// ABOUTME: Exports all core functionality for use in binary and tests

pub mod commands;
pub mod compare;
pub mod config;
pub mod dump;
pub mod error;
pub mod mysql;
pub mod policy;
pub mod utils;

#[cfg(test)]
mod testing;

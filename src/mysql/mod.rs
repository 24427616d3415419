// ABOUTME: MySQL access module
// ABOUTME: Exports connection setup and the snapshot-bound query session

pub mod connection;
pub mod session;

pub use connection::connect;
pub use session::{MysqlSession, Session, TextRow};

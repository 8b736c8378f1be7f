//! Integration tests for urldb
//!
//! These tests drive the public API end to end: building a database,
//! searching it, saving and reloading its files, and the cookie jar.

mod config_tests;
mod cookie_tests;
mod database_tests;
mod persistence_tests;

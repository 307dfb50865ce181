//! Persistence for the collection files.
//!
//! All state lives in two JSON documents under one data directory:
//! `companies.json` and `alerts.json`. Loads tolerate a missing file;
//! saves rewrite the whole collection atomically.

mod json_file;

pub use json_file::{JsonFileStore, ALERTS_FILE, COMPANIES_FILE};

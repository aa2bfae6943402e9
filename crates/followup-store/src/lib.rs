//! # Follow-Up Store
//!
//! HTTP client for the lead/call table in Airtable. Read side is a
//! filter-formula query with pagination; write side is a partial patch of
//! one record. Every call hits the network — there is no local cache.

pub mod client;
pub mod filter;

pub use client::AirtableStore;
pub use filter::Formula;

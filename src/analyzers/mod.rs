//! Carrier route analysis.
//!
//! This module narrows normalized records to a single carrier, aggregates
//! them per route, computes first-vs-last-year revenue trends, and flags
//! routes where the carrier holds a low share on flat or declining revenue.

pub mod aggregate;
pub mod analyzer;
pub mod classify;
pub mod types;
pub mod utility;

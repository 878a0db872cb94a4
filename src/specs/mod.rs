// src/specs/mod.rs
//! # Page specs
//!
//! One module per remote page. Each knows where the data lives in that page's
//! HTML and how to pull it out; none of them cache, pace, or match.
//!
//! - `roster`: race card → entrants (name + profile URL).
//! - `pedigree`: profile pedigree table → 62 ancestor names in label order.
//!
//! ## Conventions
//! - Case-insensitive tag scanning inside known blocks (`<table class=…>`),
//!   via `core::html`; no full-document regexes.
//! - A page without the expected table is an empty result, not an error.
//!   Input that isn't HTML at all is a `Parse` error.
//! - `fetch` does the GET through `core::HttpGet`; `parse` is pure and is
//!   what the tests drive with saved fixtures.
pub mod pedigree;
pub mod roster;

//! JSON fixtures shaped like Discord API responses.
//!
//! Fixtures are used both to seed fake remote registries and to check that
//! server managed fields never leak into attribute comparison.

pub mod attributes;

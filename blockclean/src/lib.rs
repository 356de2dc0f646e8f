// blockclean/src/lib.rs
//! # blockclean CLI Application
//!
//! Command-line front end for `blockclean-core`: sanitizes editor documents,
//! cleans single strings and prints composed tool rules.

pub mod cli;
pub mod commands;
pub mod logger;

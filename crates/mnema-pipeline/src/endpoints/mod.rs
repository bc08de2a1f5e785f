//! The six pipeline entry points, each one configuration of the
//! shared skeleton (scorer, prompt template, thresholds, fallback).

pub mod analyze;
pub mod media;
pub mod query;
pub mod search;
pub mod suggestions;

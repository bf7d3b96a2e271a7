//! Core utilities shared across the dispatch engine

pub mod time;

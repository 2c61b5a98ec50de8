#![forbid(unsafe_code)]

//! hsr — Hansard Speaker Resolver.
//!
//! Library entry point exposing the resolution pipeline for free-text
//! speaker attributions in the historical Hansard corpus. The binary
//! (`main.rs`) is a thin CLI wrapper around this library.

pub mod cascade;
pub mod distance;
pub mod error;
pub mod index;
pub mod loader;
pub mod member;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod rules;
pub mod sink;

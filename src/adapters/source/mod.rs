//! System description sources

mod json;

pub use json::{JsonSystemSource, parse_description};

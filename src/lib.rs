//! symflow library: signal graphs, rule matching and change propagation for
//! symbolic computation.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
pub mod server;

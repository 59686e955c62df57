pub mod builder;
pub mod command;
pub mod condition;
pub mod description;
pub mod edge;
pub mod error;
pub mod event;
pub mod graph;
pub mod ids;
pub mod matching;
pub mod network;
pub mod node;
pub mod pattern;
pub mod ports;
pub mod traversal;

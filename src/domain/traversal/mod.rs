//! Upstream graph walks with pluggable strategies and visitors.

pub mod engine;
pub mod scanner;
pub mod strategy;
pub mod visitor;

pub use engine::{ConcurrencyMode, TraversalEngine};
pub use scanner::Scanner;
pub use strategy::{AllPathsStrategy, ScanStrategy, SpanningTreeStrategy, VisitedSet};
pub use visitor::{ScanRoot, ScanVisitor, Visit};

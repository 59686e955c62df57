//! Derived-property providers

mod constant;

pub use constant::ConstantEntityProvider;

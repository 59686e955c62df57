pub mod catalog;
pub mod observer;
pub mod properties;
pub mod source;

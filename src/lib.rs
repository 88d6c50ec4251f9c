pub mod config;
pub mod error;
pub mod finder;
pub mod policy;
pub mod selector;
pub mod source;

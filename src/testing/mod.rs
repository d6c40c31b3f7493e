//! Testing utilities and mock implementations
//!
//! Mock pipeline stages for exercising the page fetch tool without network
//! access or a real HTML extractor.

pub mod mocks;

pub use mocks::*;

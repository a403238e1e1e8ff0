//! The concrete test suites contributed to the registry.
//!
//! Each suite namespaces its labels with its own prefix so suites can be
//! added independently without colliding in the registry.

pub mod cxml;
pub mod cxml_fetch;
pub mod playback;

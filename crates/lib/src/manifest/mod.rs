//! Manifest units exchanged between producers and the dispatcher.

mod types;

pub use types::*;

//! Relations and their data bags.
//!
//! A relation connects the dispatcher to one producer application for one
//! category. Each side owns a data bag of string keys and values; producers
//! publish their manifests in their own bag.

mod store;
mod types;

pub use store::*;
pub use types::*;

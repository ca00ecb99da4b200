mod common;
mod dispatch_tests;
mod store_tests;

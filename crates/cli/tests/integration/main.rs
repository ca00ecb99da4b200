mod common;
mod hook_tests;
mod relation_tests;

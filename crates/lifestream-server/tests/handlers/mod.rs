//! Handler test suites.

mod harness;

mod api_tests;
mod e2e_tests;

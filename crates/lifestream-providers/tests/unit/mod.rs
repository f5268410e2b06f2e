//! Provider test suites.

mod blob_tests;

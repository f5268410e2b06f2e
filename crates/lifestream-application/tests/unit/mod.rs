//! Application-layer test suites.

mod test_utils;

mod dispatcher_tests;
mod indexer_tests;
mod orchestrator_tests;
mod search_tests;
mod upload_tests;

//! Scenario-based tests for the packaging pipeline

mod helpers;

mod failure_handling;
mod success_chain;

//! Scenario tests for the query pipeline and shared fixtures.

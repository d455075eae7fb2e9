//! Integration tests for the agent relay
//!
//! These tests drive the real router through `axum_test::TestServer`, with
//! the agent runtime either scripted in-process or served by wiremock.

mod chat_completions;

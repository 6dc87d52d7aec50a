//! Integration test suite for AgileFlow.
//!
//! # Test Categories
//!
//! - `prioritize_flow`: request → prompt → generator → reconciled response
//! - `board_flow`: board, notes and dashboard over a file-backed workspace,
//!   including applying priorities back onto the board
//!
//! The generator is mocked (or a local fake `claude` script), so no test
//! makes a network call.

mod fixtures;

mod board_flow;
mod prioritize_flow;

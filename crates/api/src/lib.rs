//! HTTP boundary: extracts untrusted tenant identifiers, runs them through
//! the gate, and renders oracle-free denials.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;

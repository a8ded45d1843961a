//! prop-ev: +EV player prop analysis and slip generation
//!
//! This library provides the core components for:
//! - Vig removal from two-sided American odds
//! - Fixed-line vs reference-line edge evaluation
//! - Break-even thresholds derived from payout tables
//! - Exhaustive and Monte Carlo slip search with diversity rules
//! - Publishing ranked slips to Parquet and JSON
//! - Full observability stack

pub mod cli;
pub mod config;
pub mod data;
pub mod edge;
pub mod engine;
pub mod odds;
pub mod slip;
pub mod telemetry;

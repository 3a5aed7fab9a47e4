//! Status Board
//!
//! Tracks the health of every (tenant, network) scope across scans:
//! health buckets, alarm deltas against the previous scan, and manual
//! maintenance flags. This state lives outside the inference engines and is
//! never passed into them.

mod board;

pub use board::{Board, BoardColumn, BoardConfig, BoardRow, Health, ScopeDelta, ScopeSummary, StatusBoard};

//! Tests for the simulated file subsystem.
//!
//! Test modules:
//! - `basic`: Handle allocation, reads, writes, deletes
//! - `durability`: Close as the flush point, crash consistency
//! - `faults`: Limits and injected failures

mod basic;
mod durability;
mod faults;

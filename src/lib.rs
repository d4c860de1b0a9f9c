//! Verification harness for the graybox engine family.
//!
//! Each run points one engine backend at one compiled example artifact,
//! supervises it in its own process group under a wall-clock deadline, and
//! judges the captured combined output against the scenario's expectation.

pub mod backend;
pub mod constants;
pub mod dispatch;
pub mod domain;
pub mod pipeline;
pub mod scenario;
pub mod supervisor;
pub mod verify;

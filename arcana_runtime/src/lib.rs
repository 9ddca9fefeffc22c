#![forbid(unsafe_code)]

//! Arcana runtime.
//!
//! Wraps the pure `arcana_engine` kernel with sessions, snapshot
//! encoding, replay and drift detection. No casting rules live here;
//! every transition and every invariant check is delegated to the kernel.

pub mod config;
pub mod drift;
pub mod replay;
pub mod scenario;
pub mod session;
pub mod snapshot_codec;

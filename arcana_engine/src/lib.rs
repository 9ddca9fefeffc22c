#![forbid(unsafe_code)]

//! Arcana engine: spellcasting resources and heat feedback.
//!
//! Pure-function kernel. Every operation takes a state record by
//! reference and returns a new one; nothing here holds state between
//! calls. The only randomness (the concentration save) comes in through
//! `dice::DieRoller`.

/// Version of the casting rules. Bound into every canonical hash.
pub const ENGINE_VERSION: u32 = 1;

pub mod actions;
pub mod dice;
pub mod domain;
pub mod engine;
pub mod error;
pub mod harmonic;
pub mod hashing;
pub mod heat;
pub mod invariants;
pub mod overclock;
pub mod pool;
pub mod state;
pub mod utils;

//! Resource pool primitives.
//!
//! Every spendable quantity in the kernel (AFP, charges, heat, faith
//! feedback) is a `ResourcePool`. All operations are total: they clamp
//! instead of failing, and the caller decides whether a short pool blocks
//! an action.

use serde::{Deserialize, Serialize};

/// `{current, maximum, temporary}` with `0 <= current <= maximum + temporary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourcePool {
    pub current: i32,
    pub maximum: i32,
    /// Delta applied to the cap. May be negative.
    pub temporary: i32,
}

impl ResourcePool {
    /// Full pool with no temporary delta.
    pub fn full(maximum: i32) -> Self {
        let maximum = maximum.max(0);
        Self {
            current: maximum,
            maximum,
            temporary: 0,
        }
    }

    /// Empty pool with no temporary delta.
    pub fn empty(maximum: i32) -> Self {
        Self {
            current: 0,
            maximum: maximum.max(0),
            temporary: 0,
        }
    }

    /// `maximum + temporary`, never below zero.
    pub fn effective_maximum(&self) -> i32 {
        self.maximum.saturating_add(self.temporary).max(0)
    }
}

/// Remove `amount` from the pool. `current` never drops below 0.
pub fn spend(pool: &ResourcePool, amount: i32) -> ResourcePool {
    let amount = amount.max(0);
    ResourcePool {
        current: pool.current.saturating_sub(amount).max(0),
        ..*pool
    }
}

/// Add `amount` to the pool, clamped at the effective maximum.
pub fn restore(pool: &ResourcePool, amount: i32) -> ResourcePool {
    let amount = amount.max(0);
    ResourcePool {
        current: pool
            .current
            .saturating_add(amount)
            .min(pool.effective_maximum()),
        ..*pool
    }
}

/// Set `current` directly, clamped into `[0, effective maximum]`.
pub fn set_current(pool: &ResourcePool, value: i32) -> ResourcePool {
    ResourcePool {
        current: value.clamp(0, pool.effective_maximum()),
        ..*pool
    }
}

pub fn has_at_least(pool: &ResourcePool, cost: i32) -> bool {
    pool.current >= cost
}

/// Fraction of the effective maximum still available, in `[0, 1]`.
pub fn percent_remaining(pool: &ResourcePool) -> f64 {
    let cap = pool.effective_maximum();
    if cap == 0 {
        return 0.0;
    }
    (f64::from(pool.current) / f64::from(cap)).clamp(0.0, 1.0)
}

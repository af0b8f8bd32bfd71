//! Debug-only guard against strategy callbacks re-entering the map.
//!
//! `KeyHasher` and `KeyEq` run user code in the middle of a bucket scan or a
//! rehash. A strategy that reaches back into the same map (through a raw
//! pointer or shared handle) would observe a half-moved table, so every
//! public entry point that invokes a strategy holds a `StrategyGuard`. Debug
//! builds panic on nested entry; release builds compile it away.

use core::cell::Cell;
#[cfg(not(debug_assertions))]
use core::marker::PhantomData;

/// Per-map reentrancy flag. `Send` but not `Sync`, matching the map's
/// single-threaded contract.
#[derive(Debug, Default)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    busy: Cell<bool>,
    #[cfg(not(debug_assertions))]
    _unsync: PhantomData<Cell<()>>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            busy: Cell::new(false),
            #[cfg(not(debug_assertions))]
            _unsync: PhantomData,
        }
    }

    /// Mark the map busy until the returned guard drops.
    #[inline]
    pub(crate) fn enter(&self) -> StrategyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.busy.replace(true),
                "reentrancy detected: hash/eq strategy called back into the map"
            );
            StrategyGuard { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            StrategyGuard { _lt: PhantomData }
        }
    }
}

// Clones and moved-from maps start idle.
impl Clone for DebugReentrancy {
    fn clone(&self) -> Self {
        Self::new()
    }
}

pub(crate) struct StrategyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _lt: PhantomData<&'a ()>,
}

impl Drop for StrategyGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.busy.set(false);
    }
}

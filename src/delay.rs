//! Simulated storage-access latency.
//!
//! The reference inserts a busy loop before every access to a "persistent"
//! table or block, modelling the cost of a secondary-storage round trip, and
//! defeats the optimizer with an inline-asm memory clobber so the loop
//! survives release builds. [`std::hint::black_box`] is the portable,
//! stable equivalent: it tells the compiler the value may be observed and
//! must not be elided.

use crate::config::DELAY;

/// Burns `DELAY` loop iterations that the optimizer cannot remove.
pub(crate) fn insert_delay() {
    for i in 0..DELAY {
        std::hint::black_box(i);
    }
}

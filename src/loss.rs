//! Loss simulation for deterministic fault-injection testing.
//!
//! The dispatch path queries the generator exactly once per received frame,
//! before the frame is recorded as accepted and before header validation.
//! A dropped frame is therefore indistinguishable from genuine network loss
//! to the handlers while remaining visible to the event recorder.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::net::Endpoint;

/// Per-frame drop decision.
///
/// A pure decision over the frame's source and length: implementations must
/// not mutate or retain the frame.
pub trait LossGenerator {
    /// Returns `true` if the frame should be treated as lost.
    fn should_drop_frame(&mut self, src: Endpoint, length: usize) -> bool;
}

/// Loss generator that never drops a frame. The production default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLoss;

impl LossGenerator for NoLoss {
    fn should_drop_frame(&mut self, _src: Endpoint, _length: usize) -> bool {
        false
    }
}

/// Seeded random loss at a fixed rate.
///
/// The same seed yields the same drop sequence, so a test harness can replay
/// an exact loss scenario against higher-level reliability logic.
#[derive(Debug, Clone)]
pub struct RandomLossGenerator {
    rng: SmallRng,
    rate: f64,
}

impl RandomLossGenerator {
    /// Creates a generator dropping `rate` of frames, `0.0..=1.0`.
    ///
    /// Rates outside the range are clamped.
    #[must_use]
    pub fn new(rate: f64, seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            rate: rate.clamp(0.0, 1.0),
        }
    }
}

impl LossGenerator for RandomLossGenerator {
    fn should_drop_frame(&mut self, _src: Endpoint, _length: usize) -> bool {
        self.rng.random::<f64>() < self.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src() -> Endpoint {
        Endpoint::localhost(9000)
    }

    #[test]
    fn no_loss_never_drops() {
        let mut lossgen = NoLoss;
        for len in [0, 1, 65535] {
            assert!(!lossgen.should_drop_frame(src(), len));
        }
    }

    #[test]
    fn rate_bounds() {
        let mut never = RandomLossGenerator::new(0.0, 42);
        let mut always = RandomLossGenerator::new(1.0, 42);
        for _ in 0..1000 {
            assert!(!never.should_drop_frame(src(), 64));
            assert!(always.should_drop_frame(src(), 64));
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = RandomLossGenerator::new(0.5, 7);
        let mut b = RandomLossGenerator::new(0.5, 7);
        for _ in 0..256 {
            assert_eq!(
                a.should_drop_frame(src(), 64),
                b.should_drop_frame(src(), 64)
            );
        }
    }

    #[test]
    fn rate_is_clamped() {
        let mut lossgen = RandomLossGenerator::new(7.5, 1);
        assert!(lossgen.should_drop_frame(src(), 64)); // clamped to 1.0
    }
}

// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Register Jitter Generator
//!
//! This module provides the pseudo-random source used to add jitter to
//! simulated register values, so that a client sees a slightly noisy signal
//! instead of a perfectly smooth waveform.
//!
//! A single generator is owned by the simulation engine and seeded once. All
//! channels draw from the same sequence, which keeps consecutive calls
//! independent while allowing tests to inject a fixed seed.
//!
//! ## Examples
//!
//! ```rust
//! use modbus_simulator::utility::noise_generator::NoiseGenerator;
//!
//! // Reproducible sequence for tests
//! let mut generator = NoiseGenerator::new(12345);
//! let value = generator.jitter(250, 3);
//! assert!((247..253).contains(&value));
//! ```

use std::time::SystemTime;

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Uniform integer jitter source backed by a seeded [`StdRng`].
///
/// The same seed always yields the same sequence of offsets, which makes
/// noisy channels reproducible under test.
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    rng: StdRng,
}

impl NoiseGenerator {
    /// Creates a new noise generator with a given seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use modbus_simulator::utility::noise_generator::NoiseGenerator;
    ///
    /// let mut a = NoiseGenerator::new(7);
    /// let mut b = NoiseGenerator::new(7);
    /// assert_eq!(a.jitter(100, 10), b.jitter(100, 10));
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a new noise generator seeded from the system time.
    ///
    /// Sequences differ from one process run to the next.
    pub fn new_from_system_time() -> Self {
        let seed = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;
        Self::new(seed)
    }

    /// Draws an offset uniformly from `[-range, range)`.
    ///
    /// Returns 0 when `range` is zero or negative.
    pub fn offset(&mut self, range: i16) -> i32 {
        if range <= 0 {
            return 0;
        }
        let range = i32::from(range);
        self.rng.random_range(-range..range)
    }

    /// Adds a random offset from `[-range, range)` to `value`.
    ///
    /// The result saturates at the bounds of a 16-bit signed register.
    ///
    /// # Examples
    ///
    /// ```
    /// use modbus_simulator::utility::noise_generator::NoiseGenerator;
    ///
    /// let mut generator = NoiseGenerator::new(1);
    /// assert_eq!(generator.jitter(42, 0), 42);
    /// ```
    pub fn jitter(&mut self, value: i16, range: i16) -> i16 {
        let noisy = i32::from(value) + self.offset(range);
        noisy.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
    }
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new_from_system_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_stays_in_half_open_range() {
        let mut generator = NoiseGenerator::new(42);
        for _ in 0..10_000 {
            let value = generator.jitter(250, 5);
            assert!((245..255).contains(&value), "value {} out of range", value);
        }
    }

    #[test]
    fn test_jitter_reaches_lower_bound_but_not_upper() {
        let mut generator = NoiseGenerator::new(3);
        let samples: Vec<i16> = (0..10_000).map(|_| generator.jitter(0, 2)).collect();
        assert!(samples.contains(&-2));
        assert!(!samples.contains(&2));
    }

    #[test]
    fn test_zero_and_negative_range_are_no_ops() {
        let mut generator = NoiseGenerator::new(9);
        assert_eq!(generator.jitter(123, 0), 123);
        assert_eq!(generator.jitter(123, -4), 123);
    }

    #[test]
    fn test_jitter_saturates_at_register_bounds() {
        let mut generator = NoiseGenerator::new(11);
        for _ in 0..1_000 {
            let high = generator.jitter(i16::MAX, 100);
            assert!(high >= i16::MAX - 100);
            let low = generator.jitter(i16::MIN, 100);
            assert!(low < i16::MIN + 100);
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = NoiseGenerator::new(2025);
        let mut b = NoiseGenerator::new(2025);
        let seq_a: Vec<i16> = (0..32).map(|_| a.jitter(0, 50)).collect();
        let seq_b: Vec<i16> = (0..32).map(|_| b.jitter(0, 50)).collect();
        assert_eq!(seq_a, seq_b);
    }
}

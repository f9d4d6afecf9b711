//! Benchmark profiles for the Aether automaton.
//!
//! - [`reference_profile`]: a 2D `i64` source that reaches a few hundred
//!   stored cells within the warm-up
//! - [`stress_profile`]: a 3D source for larger grids
//! - [`warmed`]: an engine already advanced past its first steps

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use aether_core::Value;
use aether_engine::{AetherEngine, EngineConfig};

/// A 2D source of one million.
pub fn reference_profile() -> EngineConfig<i64> {
    EngineConfig::new(2, 1_000_000)
}

/// A 3D source of one billion.
pub fn stress_profile() -> EngineConfig<i64> {
    EngineConfig::new(3, 1_000_000_000)
}

/// A memory-backed engine advanced by `steps`.
///
/// Panics if the configuration is rejected.
pub fn warmed<V: Value>(config: EngineConfig<V>, steps: usize) -> AetherEngine<V> {
    let mut engine = match AetherEngine::new(config, ()) {
        Ok(engine) => engine,
        Err(e) => panic!("benchmark profile rejected: {e}"),
    };
    for _ in 0..steps {
        if let Err(e) = engine.next_step() {
            panic!("warm-up step failed: {e}");
        }
    }
    engine
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_are_valid() {
        assert!(reference_profile().validate().is_ok());
        assert!(stress_profile().validate().is_ok());
    }

    #[test]
    fn warm_up_advances() {
        let engine = warmed(reference_profile(), 3);
        assert_eq!(engine.step(), 3);
        assert_eq!(engine.max_coordinate(), 3);
    }
}

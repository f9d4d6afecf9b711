//! Integration test: the folded engine against the unfolded reference.
//!
//! The reference steps every lattice position with its raw neighbours,
//! so agreement at every position and step shows that folding, share
//! multipliers and the growth rule lose nothing.

use aether_core::Value;
use aether_engine::{AetherEngine, EngineConfig};
use aether_test_utils::ReferenceSimulation;
use num_bigint::BigInt;

fn assert_agrees<V: Value>(dimension: usize, initial: V, steps: usize) {
    let mut engine = AetherEngine::<V>::new(EngineConfig::new(dimension, initial.clone()), ())
        .expect("valid configuration");
    let mut reference = ReferenceSimulation::new(dimension, initial);

    for step in 1..=steps {
        let changed = engine.next_step().unwrap();
        let reference_changed = reference.next_step();
        assert_eq!(changed, reference_changed, "changed flag at step {step}");
        assert_eq!(
            engine.max_coordinate(),
            reference.max_coordinate(),
            "bounds at step {step}"
        );
        for p in reference.positions(reference.max_coordinate() + 1) {
            assert_eq!(
                engine.get(&p).unwrap(),
                reference.get(&p),
                "value at {p:?}, step {step}"
            );
        }
    }
}

#[test]
fn one_dimension_positive() {
    assert_agrees(1, 97i64, 40);
}

#[test]
fn one_dimension_negative() {
    assert_agrees(1, -97i64, 40);
}

#[test]
fn two_dimensions_positive() {
    assert_agrees(2, 500i64, 25);
}

#[test]
fn two_dimensions_negative() {
    assert_agrees(2, -500i32, 25);
}

#[test]
fn three_dimensions() {
    assert_agrees(3, 1000i64, 10);
    assert_agrees(3, -300i64, 10);
}

#[test]
fn big_integers() {
    assert_agrees(2, BigInt::from(10_000), 12);
}

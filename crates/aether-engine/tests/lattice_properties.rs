//! Integration test: properties every run must keep, whatever the source.

use aether_engine::{AetherEngine, EngineConfig};
use aether_space::HypercubicSymmetry;
use num_bigint::BigInt;
use num_rational::BigRational;
use proptest::prelude::*;

fn cube(dimension: usize, reach: i32) -> Vec<Vec<i32>> {
    let mut all = vec![Vec::new()];
    for _ in 0..dimension {
        all = all
            .into_iter()
            .flat_map(|p| {
                (-reach..=reach).map(move |c| {
                    let mut q = p.clone();
                    q.push(c);
                    q
                })
            })
            .collect();
    }
    all
}

fn neighbours(p: &[i32]) -> Vec<Vec<i32>> {
    let mut out = Vec::with_capacity(2 * p.len());
    for axis in 0..p.len() {
        for delta in [-1, 1] {
            let mut q = p.to_vec();
            q[axis] += delta;
            out.push(q);
        }
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn mass_is_conserved(dimension in 1usize..=3, initial in -2000i64..2000, steps in 1usize..12) {
        let mut engine = AetherEngine::<i64>::new(EngineConfig::new(dimension, initial), ()).unwrap();
        let expected = BigRational::from_integer(BigInt::from(initial));
        for _ in 0..steps {
            engine.next_step().unwrap();
            prop_assert_eq!(engine.total_mass().unwrap(), expected.clone());
        }
    }

    #[test]
    fn images_under_symmetry_agree(dimension in 1usize..=3, initial in -800i64..800) {
        let mut engine = AetherEngine::<i64>::new(EngineConfig::new(dimension, initial), ()).unwrap();
        let symmetry = HypercubicSymmetry::new(dimension).unwrap();
        for _ in 0..6 {
            engine.next_step().unwrap();
        }
        let reach = engine.max_coordinate() + 1;
        for p in cube(dimension, reach) {
            let value = engine.get(&p).unwrap();
            for image in symmetry.orbit(&p) {
                prop_assert_eq!(engine.get(&image).unwrap(), value);
            }
        }
    }

    #[test]
    fn bounds_grow_by_at_most_one(dimension in 1usize..=3, initial in -800i64..800) {
        let mut engine = AetherEngine::<i64>::new(EngineConfig::new(dimension, initial), ()).unwrap();
        for _ in 0..10 {
            let before = engine.max_coordinate();
            engine.next_step().unwrap();
            let after = engine.max_coordinate();
            prop_assert!(after == before || after == before + 1);
            prop_assert_eq!(after > before, engine.last_metrics().grew);

            for p in cube(dimension, after + 2) {
                if p.iter().any(|c| c.abs() > after) {
                    prop_assert_eq!(engine.get(&p).unwrap(), 0);
                }
            }
        }
    }

    #[test]
    fn cells_without_smaller_neighbours_only_gain(dimension in 1usize..=2, initial in -600i64..600) {
        let mut engine = AetherEngine::<i64>::new(EngineConfig::new(dimension, initial), ()).unwrap();
        for _ in 0..8 {
            let reach = engine.max_coordinate() + 1;
            let mut stable = Vec::new();
            for p in cube(dimension, reach) {
                let value = engine.get(&p).unwrap();
                let exceeds_any = neighbours(&p)
                    .iter()
                    .any(|q| engine.get(q).unwrap() < value);
                if !exceeds_any {
                    stable.push((p, value));
                }
            }
            engine.next_step().unwrap();
            for (p, value) in stable {
                prop_assert!(engine.get(&p).unwrap() >= value, "{:?} lost mass", p);
            }
        }
    }
}

#[test]
fn equal_neighbours_receive_equal_values() {
    // Every axis neighbour of the origin is equal after the first step.
    let mut engine = AetherEngine::<i64>::new(EngineConfig::new(3, 71), ()).unwrap();
    engine.next_step().unwrap();
    let first = engine.get(&[1, 0, 0]).unwrap();
    for q in neighbours(&[0, 0, 0]) {
        assert_eq!(engine.get(&q).unwrap(), first);
    }
    // 71 / 7 = 10 rem 1: each neighbour gets 10, the origin keeps 11.
    assert_eq!(first, 10);
    assert_eq!(engine.get(&[0, 0, 0]).unwrap(), 11);
}

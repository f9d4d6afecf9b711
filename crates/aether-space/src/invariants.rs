//! Geometry invariant checks shared by the unit tests.
//!
//! Each helper brute-forces the property it checks from first
//! principles (raw axis neighbours, explicit orbits) rather than trusting
//! the closed forms under test.

use aether_core::Coord;

use crate::layout::PyramidLayout;
use crate::symmetry::HypercubicSymmetry;

/// Assert the folded neighbourhood of `canonical` accounts for every real
/// neighbour exactly once and that each share multiplier matches a
/// brute-force count of mirrored cells adjacent to the neighbour.
pub fn assert_fold_balanced(sym: &HypercubicSymmetry, canonical: &[i32]) {
    let folded = sym.folded_neighbours(canonical);
    let total: u32 = folded.iter().map(|n| n.symmetry_count).sum();
    assert_eq!(total as usize, 2 * sym.dimension(), "fold of {canonical:?}: {folded:?}");

    let orbit = sym.orbit_size(canonical);
    for n in &folded {
        assert!(sym.is_canonical(&n.position), "{:?} not canonical", n.position);
        assert_ne!(n.position.as_slice(), canonical, "{canonical:?} folds onto itself");
        assert_eq!(
            u64::from(n.share_multiplier) * sym.orbit_size(&n.position),
            u64::from(n.symmetry_count) * orbit,
            "share multiplier of {:?} from {canonical:?}",
            n.position
        );

        // Count the real neighbours of the stored neighbour that are copies of the cell.
        let mut adjacent_copies = 0;
        let mut probe: Coord = n.position.clone();
        for axis in 0..probe.len() {
            for delta in [-1, 1] {
                probe[axis] = n.position[axis] + delta;
                if sym.canonical(&probe).as_slice() == canonical {
                    adjacent_copies += 1;
                }
            }
            probe[axis] = n.position[axis];
        }
        assert_eq!(
            adjacent_copies, n.share_multiplier,
            "{canonical:?} -> {:?}",
            n.position
        );
    }
}

/// Assert the explicit orbit of `canonical` has `orbit_size` distinct
/// members, all folding back onto `canonical`.
pub fn assert_orbit_consistent(sym: &HypercubicSymmetry, canonical: &[i32]) {
    let images = sym.orbit(canonical);
    assert_eq!(images.len() as u64, sym.orbit_size(canonical));
    for image in &images {
        assert_eq!(sym.canonical(image).as_slice(), canonical);
    }
}

/// Assert the layout enumerates the pyramid `0..=max_coordinate` as a
/// gap-free sequence of addresses in slice order.
pub fn assert_layout_bijective(layout: &PyramidLayout, max_coordinate: i32) {
    let sym = HypercubicSymmetry::new(layout.dimension()).unwrap();
    let mut expected = 0u64;
    for x in 0..=max_coordinate {
        assert_eq!(layout.cells_before(x), expected, "cells before slice {x}");
        let mut in_slice = 0u64;
        for cell in layout.slice_cells(x) {
            assert!(sym.is_canonical(&cell), "{cell:?} not canonical");
            assert_eq!(cell[0], x);
            assert_eq!(layout.address(&cell), expected, "address of {cell:?}");
            assert_eq!(layout.offset_in_slice(&cell), in_slice);
            assert_eq!(layout.position_at(expected), cell);
            expected += 1;
            in_slice += 1;
        }
        assert_eq!(in_slice, layout.slice_len(x), "length of slice {x}");
    }
    assert_eq!(layout.total_cells(max_coordinate), expected);
}

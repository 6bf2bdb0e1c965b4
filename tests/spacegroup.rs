//! End-to-end checks of the symmetry pipeline through the public entry
//! points, on structures whose answers are textbook material.

extern crate env_logger;
extern crate spgr;
#[macro_use] extern crate spgr_assert_close;

use spgr::{find_symmetry, SpgError};

fn init_logger() {
    let _ = env_logger::try_init();
}

const CUBIC_4: [[f64; 3]; 3] = [[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]];

#[test]
fn simple_cubic_is_221() {
    init_logger();
    let positions = [[0.0, 0.0, 0.0]];
    let data = spgr::get_dataset(&CUBIC_4, &positions, &[1], 1e-5).unwrap();

    assert_eq!(data.spacegroup.number, 221);
    assert_eq!(data.spacegroup.international, "Pm-3m");
    assert_eq!(data.spacegroup.schoenflies, "Oh^1");
    assert_eq!(data.operations.len(), 48);
    assert_eq!(data.wyckoffs, vec![0]);
    assert_eq!(data.equivalent_atoms, vec![0]);
    assert_eq!(data.num_atoms, 1);
}

#[test]
fn body_centered_cubic_is_229() {
    init_logger();
    let positions = [[0.0, 0.0, 0.0], [0.5, 0.5, 0.5]];
    let data = spgr::get_dataset(&CUBIC_4, &positions, &[1, 1], 1e-5).unwrap();

    assert_eq!(data.spacegroup.number, 229);
    assert_eq!(data.spacegroup.international, "Im-3m");
    // 48 point operations times the centering translation
    assert_eq!(data.operations.len(), 96);
    assert_eq!(data.equivalent_atoms, vec![0, 0]);

    // the pure-translation subgroup has size 2, and primitive reduction
    // halves the cell
    let prim = spgr::find_primitive(&CUBIC_4, &positions, &[1, 1], 1e-5)
        .unwrap()
        .expect("a body-centered cell must reduce");
    assert_eq!(prim.num_atoms(), 1);
    assert!((prim.lattice().volume() - 32.0).abs() < 1e-9);
}

#[test]
fn identity_only_structure() {
    init_logger();
    let lattice = [[3.1, 0.0, 0.0], [0.4, 4.7, 0.0], [-0.9, 1.3, 5.3]];
    let positions = [[0.0, 0.0, 0.0], [0.137, 0.271, 0.413]];
    let types = [1, 2];

    let mut rotations = [[[0; 3]; 3]; 8];
    let mut translations = [[0.0; 3]; 8];
    let size = spgr::get_symmetry(
        &mut rotations, &mut translations, &lattice, &positions, &types, 1e-5,
    ).unwrap();

    assert_eq!(size, 1);
    assert_eq!(rotations[0], [[1, 0, 0], [0, 1, 0], [0, 0, 1]]);
    assert_eq!(translations[0], [0.0, 0.0, 0.0]);
}

#[test]
fn every_operation_maps_the_structure() {
    init_logger();
    // rock salt: two interpenetrating fcc sublattices
    let positions = [
        [0.0, 0.0, 0.0], [0.0, 0.5, 0.5], [0.5, 0.0, 0.5], [0.5, 0.5, 0.0],
        [0.5, 0.5, 0.5], [0.5, 0.0, 0.0], [0.0, 0.5, 0.0], [0.0, 0.0, 0.5],
    ];
    let types = [11, 11, 11, 11, 17, 17, 17, 17];

    let cell = spgr::build_cell(&CUBIC_4, &positions, &types).unwrap();
    let group = find_symmetry(&cell, 1e-5);
    assert_eq!(group.len(), 192);
    spgr::dumb_symmetry_test(&cell, group.ops(), 1e-5).unwrap();

    let data = spgr::get_dataset(&CUBIC_4, &positions, &types, 1e-5).unwrap();
    assert_eq!(data.spacegroup.number, 225);
    // one orbit per species
    assert_eq!(data.equivalent_atoms[..4], [0, 0, 0, 0]);
    assert_eq!(data.equivalent_atoms[4..], [4, 4, 4, 4]);
    // 4a and 4b
    assert_eq!(data.wyckoffs[..4], [0, 0, 0, 0]);
    assert_eq!(data.wyckoffs[4..], [1, 1, 1, 1]);
}

#[test]
fn hexagonal_close_packing_is_194() {
    init_logger();
    let a = 3.2;
    let c = 5.2;
    let lattice = [
        [a, 0.0, 0.0],
        [-0.5 * a, 0.75_f64.sqrt() * a, 0.0],
        [0.0, 0.0, c],
    ];
    let positions = [
        [1.0 / 3.0, 2.0 / 3.0, 0.25],
        [2.0 / 3.0, 1.0 / 3.0, 0.75],
    ];
    let data = spgr::get_dataset(&lattice, &positions, &[22, 22], 1e-5).unwrap();

    assert_eq!(data.spacegroup.number, 194);
    assert_eq!(data.spacegroup.international, "P6_3/mmc");
    assert_eq!(data.operations.len(), 24);
    // one orbit; both atoms resolve to the same letter
    assert_eq!(data.equivalent_atoms, vec![0, 0]);
    assert_eq!(data.wyckoffs[0], data.wyckoffs[1]);
    assert!(data.wyckoffs[0] >= 0);
}

#[test]
fn diamond_is_227() {
    init_logger();
    let fcc = [
        [0.0, 0.0, 0.0], [0.0, 0.5, 0.5], [0.5, 0.0, 0.5], [0.5, 0.5, 0.0],
    ];
    let mut positions = vec![];
    for site in &fcc {
        positions.push(*site);
        positions.push([site[0] + 0.25, site[1] + 0.25, site[2] + 0.25]);
    }
    let types = [6; 8];
    let data = spgr::get_dataset(&CUBIC_4, &positions, &types, 1e-5).unwrap();

    assert_eq!(data.spacegroup.number, 227);
    assert_eq!(data.spacegroup.international, "Fd-3m");
    // all eight atoms are one orbit
    assert!(data.equivalent_atoms.iter().all(|&e| e == 0));
    assert!(data.wyckoffs.iter().all(|&w| w == 0));
}

#[test]
fn primitive_reduction_is_idempotent() {
    init_logger();
    let positions = [[0.0, 0.0, 0.0]];
    assert!(spgr::find_primitive(&CUBIC_4, &positions, &[1], 1e-5).unwrap().is_none());
}

#[test]
fn capacity_contract_is_honored() {
    init_logger();
    let positions = [[0.0, 0.0, 0.0]];

    let max = spgr::get_max_multiplicity(&CUBIC_4, &positions, &[1], 1e-5).unwrap();
    assert_eq!(max, 48);

    // deliberately too small: error, and no partial write
    let mut rotations = [[[7; 3]; 3]; 10];
    let mut translations = [[7.0; 3]; 10];
    let result = spgr::get_symmetry(
        &mut rotations, &mut translations, &CUBIC_4, &positions, &[1], 1e-5,
    );
    match result {
        Err(SpgError::CapacityExceeded { required, capacity }) => {
            assert_eq!(required, 48);
            assert_eq!(capacity, 10);
        }
        other => panic!("expected a capacity error, got {:?}", other),
    }
    assert!(rotations.iter().all(|r| *r == [[7; 3]; 3]));
    assert!(translations.iter().all(|t| *t == [7.0; 3]));

    // adequate capacity succeeds
    let mut rotations = vec![[[0; 3]; 3]; max];
    let mut translations = vec![[0.0; 3]; max];
    let size = spgr::get_symmetry(
        &mut rotations, &mut translations, &CUBIC_4, &positions, &[1], 1e-5,
    ).unwrap();
    assert_eq!(size, 48);
}

#[test]
fn refinement_only_sharpens_symmetry() {
    init_logger();
    // a cubic cell rattled at the 1e-6 level
    let rattled = [
        [4.0, 1e-6, -1e-6],
        [2e-6, 4.0 - 1e-6, 0.0],
        [0.0, 1e-6, 4.0 + 2e-6],
    ];
    let positions = [[1e-7, -1e-7, 0.0]];

    let before = {
        let cell = spgr::build_cell(&rattled, &positions, &[1]).unwrap();
        find_symmetry(&cell, 1e-4).len()
    };

    let refined = spgr::refine_cell(&rattled, &positions, &[1], 1e-4).unwrap();
    assert!(!refined.is_failure());

    let after = find_symmetry(&refined.cell, 1e-4).len();
    assert!(after >= before);
    assert_eq!(after, 48);
}

#[test]
fn degenerate_lattice_is_rejected() {
    init_logger();
    let singular = [[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
    assert!(spgr::get_dataset(&singular, &[[0.0; 3]], &[1], 1e-5).is_err());
}

#[test]
fn tolerance_controls_what_is_found() {
    init_logger();
    // a cell distorted at the 1e-3 level: loose tolerance sees cubic
    // symmetry, tight tolerance does not
    let distorted = [
        [4.0, 0.0, 0.0],
        [0.0, 4.002, 0.0],
        [0.0, 0.0, 3.999],
    ];
    let positions = [[0.0, 0.0, 0.0]];

    let loose = spgr::get_multiplicity(&distorted, &positions, &[1], 1e-2).unwrap();
    assert_eq!(loose, 48);

    let tight = spgr::get_multiplicity(&distorted, &positions, &[1], 1e-6).unwrap();
    assert_eq!(tight, 8);
}

#[test]
fn smallest_lattice_is_reduced() {
    init_logger();
    let skewed = [[1.0, 0.0, 0.0], [4.0, 1.0, 0.0], [-3.0, 2.0, 1.0]];
    let reduced = spgr::get_smallest_lattice(&skewed).unwrap();
    for row in &reduced {
        let norm = (row[0] * row[0] + row[1] * row[1] + row[2] * row[2]).sqrt();
        assert!(norm < 1.5);
    }

    // reduction never changes the cell volume
    let volume =
        reduced[0][0] * (reduced[1][1] * reduced[2][2] - reduced[1][2] * reduced[2][1])
        - reduced[0][1] * (reduced[1][0] * reduced[2][2] - reduced[1][2] * reduced[2][0])
        + reduced[0][2] * (reduced[1][0] * reduced[2][1] - reduced[1][1] * reduced[2][0]);
    assert_close!(abs=1e-9, volume.abs(), 1.0);
}

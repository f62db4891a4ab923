//! Test randomized insert orders against a sorted model.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::e2e_tests::helpers::*;
use crate::{TableConfig, TableError};

fn run_workload(seed: u64, count: usize, config: TableConfig) {
    let dir = TestDir::new();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut model = BTreeSet::new();

    {
        let mut table = dir.open_with(config);
        for _ in 0..count {
            let id = rng.random_range(0..2_000);
            match table.insert(&row(id)) {
                Ok(()) => assert!(model.insert(id), "seed {seed}: {id} inserted twice"),
                Err(TableError::DuplicateKey(dup)) => {
                    assert_eq!(dup, id);
                    assert!(model.contains(&id), "seed {seed}: spurious duplicate {id}");
                }
                Err(e) => panic!("seed {seed}: unexpected error {e}"),
            }
        }

        let stats = table.verify().expect("valid tree");
        assert_eq!(stats.row_count as usize, model.len());
        table.close().expect("close");
    }

    let mut table = dir.open_with(config);
    let expected: Vec<u32> = model.iter().copied().collect();
    assert_eq!(scan_ids(&mut table), expected, "seed {seed}");
    for id in expected.iter().step_by(17) {
        assert_eq!(table.get(*id).expect("get"), Some(row(*id)));
    }
}

#[test]
fn test_random_ids_default_fan_out() {
    for seed in 0..4 {
        run_workload(seed, 300, TableConfig::default());
    }
}

#[test]
fn test_random_ids_minimum_fan_out() {
    let config = TableConfig {
        max_pages: 200,
        internal_node_max_cells: 2,
    };
    for seed in 10..14 {
        run_workload(seed, 300, config);
    }
}

#[test]
fn test_shuffled_permutation() {
    let dir = TestDir::new();
    let mut ids: Vec<u32> = (1..=400).collect();
    ids.shuffle(&mut StdRng::seed_from_u64(42));

    let config = TableConfig {
        max_pages: 250,
        internal_node_max_cells: 4,
    };
    let mut table = dir.open_with(config);
    for (i, &id) in ids.iter().enumerate() {
        table.insert(&row(id)).expect("insert");
        if i % 50 == 49 {
            table.verify().expect("valid tree");
        }
    }

    assert_eq!(scan_ids(&mut table), (1..=400).collect::<Vec<_>>());
    let stats = table.verify().expect("valid tree");
    assert_eq!(stats.row_count, 400);
    assert!(stats.depth >= 3);
}

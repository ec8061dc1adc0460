//! Randomized insert/update/remove sequences checked against `BTreeMap`.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Avl, Balance, BinarySearchTree, RedBlack, Unbalanced};


fn run<B: Balance>(seed: u64, steps: usize, key_range: i32) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tree = BinarySearchTree::<i32, u32, B>::new();
    let mut model = BTreeMap::new();

    for step in 0..steps {
        let key = rng.gen_range(-key_range..key_range);
        if rng.gen_bool(0.6) {
            let value = rng.r#gen::<u32>();
            let shape = tree.to_string();
            let replaced = tree.add_or_update(key, value);
            assert_eq!(replaced, model.insert(key, value), "step {step}");
            if replaced.is_some() {
                assert_eq!(tree.to_string(), shape, "update changed the shape at step {step}");
            }
        } else {
            assert_eq!(tree.remove(&key), model.remove(&key), "step {step}");
        }

        if let Err(e) = tree.check_invariants() {
            panic!("step {step} (seed {seed}): {e}\n{tree}");
        }
        assert_eq!(tree.len(), model.len());
    }

    assert!(tree.iter().eq(model.iter()));
    for key in -key_range..key_range {
        assert_eq!(tree.find(&key), model.get(&key));
    }
}

#[test]
fn plain_matches_btreemap() {
    for seed in 0..4 {
        run::<Unbalanced>(seed, 2000, 200);
    }
}

#[test]
fn red_black_matches_btreemap() {
    for seed in 0..8 {
        run::<RedBlack>(seed, 3000, 300);
    }
}

#[test]
fn avl_matches_btreemap() {
    for seed in 0..8 {
        run::<Avl>(seed, 3000, 300);
    }
}

#[test]
fn balanced_heights_stay_logarithmic() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut red_black = BinarySearchTree::<u32, (), RedBlack>::new();
    let mut avl = BinarySearchTree::<u32, (), Avl>::new();
    for _ in 0..4000 {
        let key = rng.gen_range(0..10_000);
        red_black.add_or_update(key, ());
        avl.add_or_update(key, ());
    }
    let n = red_black.len() as f64;
    assert!((red_black.height() as f64) <= 2.0 * (n + 1.0).log2());
    assert!((avl.height() as f64) <= 1.45 * (n + 2.0).log2());
}

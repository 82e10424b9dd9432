use std::thread;
use std::time::Duration;

use proptest::prelude::*;
use wren::{PMapOptions, ParallelMap, pmap};

fn scramble(x: i32) -> i64 {
    i64::from(x).wrapping_mul(31).wrapping_add(7)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn ordered_results_match_sequential_map(
        inputs in prop::collection::vec(any::<i32>(), 0..48),
        pool in 0usize..12,
    ) {
        let expected: Vec<i64> = inputs.iter().copied().map(scramble).collect();
        let options = PMapOptions::default().with_fixed_pool(pool);
        let results = pmap(Some(scramble), Some(&options), inputs);
        prop_assert_eq!(results, expected);
    }

    #[test]
    fn unordered_results_are_a_permutation(
        inputs in prop::collection::vec(any::<i32>(), 0..48),
        pool in 0usize..12,
    ) {
        let mut expected: Vec<i64> = inputs.iter().copied().map(scramble).collect();
        let options = PMapOptions::default().with_fixed_pool(pool).with_random_order(true);
        let mut results = pmap(Some(scramble), Some(&options), inputs);
        expected.sort_unstable();
        results.sort_unstable();
        prop_assert_eq!(results, expected);
    }
}

#[test]
fn test_every_pool_size_keeps_order_under_uneven_latency() {
    let inputs: Vec<u64> = (0..12).collect();
    for pool in 0..=inputs.len() + 1 {
        let results = ParallelMap::new(|x: u64| {
            thread::sleep(Duration::from_millis((12 - x) % 4));
            x * 2
        })
        .workers(pool)
        .run(inputs.clone());
        assert_eq!(results, inputs.iter().map(|x| x * 2).collect::<Vec<_>>(), "pool {pool}");
    }
}

#[test]
fn test_empty_inputs_and_missing_function() {
    assert!(pmap(Some(|x: i32| x), None, Vec::new()).is_empty());
    assert!(pmap(None::<fn(i32) -> i32>, None, vec![1, 2, 3]).is_empty());
    assert!(pmap(None::<fn(i32) -> i32>, Some(&PMapOptions::cpu_bound()), Vec::new()).is_empty());
}

#[test]
fn test_transformation_may_borrow_from_caller() {
    let offsets = vec![100, 200, 300];
    let results = pmap(
        Some(|i: usize| offsets[i] + i),
        Some(&PMapOptions::cpu_bound()),
        vec![2, 0, 1],
    );
    assert_eq!(results, vec![302, 100, 201]);
}

#[test]
fn test_failures_are_encoded_in_results() {
    let results: Vec<Result<u8, String>> = pmap(
        Some(|s: &str| s.parse::<u8>().map_err(|err| format!("{s}: {err}"))),
        None,
        vec!["1", "x", "300"],
    );
    assert_eq!(results[0], Ok(1));
    assert!(results[1].is_err());
    assert!(results[2].is_err());
}

#[test]
fn test_worker_panic_reaches_caller() {
    let outcome = std::panic::catch_unwind(|| {
        ParallelMap::new(|x: i32| {
            if x == 3 {
                panic!("bad input");
            }
            x
        })
        .workers(2)
        .run((0..6).collect())
    });
    assert!(outcome.is_err());
}

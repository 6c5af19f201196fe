//! Integration test: normalize, write, read back, compare.

use std::collections::HashMap;

use approx::assert_abs_diff_eq;
use nmmc_io::{
    ReaderConfig, read_back_tolerance, read_counts, read_matrix, write_counts, write_matrix,
};
use nmmc_markov::{MarkovConfig, StateKey, TransitionLog, TransitionMatrix, normalize};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Half a unit in the last written decimal place.
const CODEC_TOLERANCE: f64 = 0.005;

/// Random counts for `n_rows` history keys over `n_states` next-states.
fn synthetic_log(n_states: usize, n_rows: usize, seed: u64) -> TransitionLog {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut log = TransitionLog::new(n_states);
    for _ in 0..n_rows {
        let history = [rng.random_range(0..n_states), rng.random_range(0..n_states)];
        let to = rng.random_range(0..n_states);
        let weight = rng.random_range(1..50);
        for _ in 0..weight {
            log.record_history(&history, to).unwrap();
        }
    }
    log
}

fn round_trip(matrix: &TransitionMatrix) -> HashMap<StateKey, Vec<f64>> {
    let mut buf = Vec::new();
    write_matrix(matrix, &mut buf).expect("write");
    read_matrix(buf.as_slice(), &ReaderConfig::default()).expect("read")
}

#[test]
fn worked_example() {
    let mut log = TransitionLog::new(2);
    log.insert(StateKey::new("A").unwrap(), vec![2, 2]);
    log.insert(StateKey::new("B").unwrap(), vec![0, 4]);

    let matrix = normalize(&log, &MarkovConfig::new(2)).unwrap();
    let rows = round_trip(&matrix);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows["A"], vec![0.5, 0.5]);
    assert_eq!(rows["B"], vec![0.0, 1.0]);
}

#[test]
fn values_within_codec_tolerance() {
    for seed in 0..5 {
        let log = synthetic_log(7, 300, seed);
        let matrix = normalize(&log, &MarkovConfig::new(7)).unwrap();
        let rows = round_trip(&matrix);

        assert_eq!(rows.len(), matrix.len(), "seed {seed}: row count");
        for (key, original) in matrix.rows() {
            let restored = rows
                .get(key)
                .unwrap_or_else(|| panic!("seed {seed}: key {key} missing"));
            assert_eq!(restored.len(), original.len());
            for (a, b) in original.iter().zip(restored) {
                assert_abs_diff_eq!(*a, *b, epsilon = CODEC_TOLERANCE + 1e-12);
            }
        }
    }
}

#[test]
fn rebuilt_matrix_keeps_canonical_order() {
    let log = synthetic_log(12, 200, 42);
    let matrix = normalize(&log, &MarkovConfig::new(12)).unwrap();

    let rebuilt = TransitionMatrix::from_records(round_trip(&matrix), 12).expect("rebuild");
    let original_keys: Vec<&StateKey> = matrix.keys().collect();
    let rebuilt_keys: Vec<&StateKey> = rebuilt.keys().collect();
    assert_eq!(original_keys, rebuilt_keys);
}

#[test]
fn thirds_validate_after_read_back() {
    let mut log = TransitionLog::new(3);
    log.insert(StateKey::new("A").unwrap(), vec![1, 1, 1]);
    log.insert(StateKey::new("B").unwrap(), vec![2, 1, 0]);
    let matrix = normalize(&log, &MarkovConfig::new(3)).unwrap();

    let mut buf = Vec::new();
    write_matrix(&matrix, &mut buf).unwrap();
    assert_eq!(
        String::from_utf8(buf.clone()).unwrap(),
        "A,0.33,0.33,0.33\nB,0.67,0.33,0.00\n"
    );

    let records = read_matrix(buf.as_slice(), &ReaderConfig::default()).unwrap();
    let rebuilt = TransitionMatrix::from_records(records, 3).unwrap();
    rebuilt
        .validate_with_tolerance(read_back_tolerance(3))
        .expect("rounded rows stay within the read-back tolerance");
}

#[test]
fn random_matrices_validate_after_read_back() {
    for seed in 10..15 {
        let log = synthetic_log(9, 400, seed);
        let matrix = normalize(&log, &MarkovConfig::new(9)).unwrap();
        let rebuilt = TransitionMatrix::from_records(round_trip(&matrix), 9).unwrap();
        assert!(
            rebuilt.validate_with_tolerance(read_back_tolerance(9)).is_ok(),
            "seed {seed}"
        );
    }
}

#[test]
fn rewrite_is_stable() {
    // Once rounded, a matrix writes back to the same text.
    let log = synthetic_log(5, 100, 7);
    let matrix = normalize(&log, &MarkovConfig::new(5)).unwrap();

    let mut first = Vec::new();
    write_matrix(&matrix, &mut first).unwrap();

    let rebuilt = TransitionMatrix::from_records(round_trip(&matrix), 5).unwrap();
    let mut second = Vec::new();
    write_matrix(&rebuilt, &mut second).unwrap();

    assert_eq!(
        String::from_utf8(first).unwrap(),
        String::from_utf8(second).unwrap()
    );
}

#[test]
fn counts_round_trip_exactly() {
    let log = synthetic_log(4, 150, 9);
    let mut buf = Vec::new();
    write_counts(&log, &mut buf).unwrap();

    let restored = read_counts(buf.as_slice(), &ReaderConfig::default(), 4).unwrap();
    assert_eq!(restored, log);
}

//! Integration tests for the host backend
//!
//! These exercise every shape through the public entry points and check the
//! results against sequential definitions.
#![cfg(feature = "cpu")]

mod common;

use common::*;
use offload::ops;
use offload::prelude::*;
use rand::Rng;
use rand::seq::SliceRandom;
use std::sync::atomic::{AtomicUsize, Ordering};

const N: usize = 1000;

#[test]
fn test_iota_map_reduce_filter_scenario() {
    init_tracing();
    let (client, _device) = create_host_client();

    for n in [N, N + 1] {
        let data = iota(n);
        let mapped = ops::map(&client, &Scale, &DefaultAllocator, None, &data, &1.0).unwrap();
        let expected: Vec<f64> = (0..n).map(|i| i as f64).collect();
        assert_eq!(mapped, expected, "map n={n}");

        let total = ops::reduce(&client, &Sum, &DefaultAllocator, None, &mapped).unwrap();
        assert_eq!(total, (n * (n - 1) / 2) as f64, "reduce n={n}");

        let evens = ops::filter(&client, &Even, &DefaultAllocator, None, &mapped).unwrap();
        assert_eq!(evens.len(), n.div_ceil(2), "filter len n={n}");
        let expected: Vec<f64> = (0..n).step_by(2).map(|i| i as f64).collect();
        assert_eq!(sorted_f64(evens), expected, "filter values n={n}");
    }
}

#[test]
fn test_map_independent_of_launch_config() {
    let (client, _device) = create_host_client_with(4);
    let data = iota(777);
    let expected: Vec<f64> = data.iter().map(|&x| x as f64 * 0.5).collect();

    let configs = [
        None,
        Some(LaunchConfig::new(1, 1).unwrap()),
        Some(LaunchConfig::new(3, 7).unwrap()),
        Some(LaunchConfig::new(64, 256).unwrap()),
        Some(LaunchConfig::new(2000, 1).unwrap()),
    ];
    for cfg in configs {
        let out = ops::map(&client, &Scale, &DefaultAllocator, cfg, &data, &0.5).unwrap();
        assert_eq!(out, expected, "config {cfg:?}");
    }
}

#[test]
fn test_reduce_and_filter_independent_of_launch_config() {
    let (client, _device) = create_host_client_with(3);
    let data = iota(1234);
    let expected_sum: i64 = data.iter().sum();
    let expected_even: Vec<i64> = data.iter().copied().filter(|x| x % 2 == 0).collect();

    for (groups, threads) in [(1, 1), (5, 3), (17, 100), (4096, 4)] {
        let cfg = Some(LaunchConfig::new(groups, threads).unwrap());
        let sum = ops::reduce(&client, &Sum, &DefaultAllocator, cfg, &data).unwrap();
        assert_eq!(sum, expected_sum, "{groups}x{threads}");
        let evens = ops::filter(&client, &Even, &DefaultAllocator, cfg, &data).unwrap();
        assert_eq!(sorted(evens), expected_even, "{groups}x{threads}");
    }
}

#[test]
fn test_mutating_and_new_allocation_maps_agree() {
    let (client, _device) = create_host_client();
    let data = iota(N);

    let fresh = ops::map(&client, &Shift, &DefaultAllocator, None, &data, &3_i64).unwrap();
    let mut in_place = data.clone();
    let returned =
        ops::map_in_place(&client, &Shift, &DefaultAllocator, None, &mut in_place, &3_i64).unwrap();

    assert_eq!(returned, fresh.as_slice());
    assert_eq!(in_place, fresh);
}

#[test]
fn test_reduce_shuffle_invariance() {
    let (client, _device) = create_host_client();
    let mut rng = rand::rng();
    let mut data: Vec<f64> = (0..10_000).map(|_| rng.random_range(-1.0..1.0)).collect();

    let before = ops::reduce(&client, &Sum, &DefaultAllocator, None, &data).unwrap();
    data.shuffle(&mut rng);
    let after = ops::reduce(&client, &Sum, &DefaultAllocator, None, &data).unwrap();
    let sequential: f64 = data.iter().sum();

    assert_allclose_f64(&[after], &[before], 1e-9, 1e-9, "shuffled reduce");
    assert_allclose_f64(&[after], &[sequential], 1e-9, 1e-9, "sequential reduce");
}

#[test]
fn test_reduce_uses_explicit_identity() {
    let (client, _device) = create_host_client();
    let data: Vec<i64> = vec![-50, -3, -7, -1, -900];
    let max = ops::reduce(&client, &Max, &DefaultAllocator, None, &data).unwrap();
    assert_eq!(max, -1);
}

#[test]
fn test_filter_matches_sequential_selection() {
    let (client, _device) = create_host_client();
    let mut rng = rand::rng();
    let data: Vec<f64> = (0..5000).map(|_| rng.random_range(0.0..1.0)).collect();

    let alg = AtLeast(0.75);
    let kept = ops::filter(&client, &alg, &DefaultAllocator, None, &data).unwrap();
    let expected: Vec<f64> = data.iter().copied().filter(|&x| x >= 0.75).collect();

    assert_eq!(kept.len(), expected.len());
    assert_eq!(sorted_f64(kept), sorted_f64(expected));
}

#[test]
fn test_filter_is_idempotent() {
    let (client, _device) = create_host_client();
    let data = iota(N);
    let once = ops::filter(&client, &Even, &DefaultAllocator, None, &data).unwrap();
    let twice = ops::filter(&client, &Even, &DefaultAllocator, None, &once).unwrap();
    assert_eq!(sorted(once), sorted(twice));
}

#[test]
fn test_filter_rejecting_everything_is_empty() {
    let (client, _device) = create_host_client();
    let data = vec![1.0, 3.0, 5.0];
    let kept = ops::filter(&client, &Even, &DefaultAllocator, None, &data).unwrap();
    assert!(kept.is_empty());
}

#[test]
fn test_map_filter_equals_filter_of_map() {
    let (client, _device) = create_host_client();
    let data = iota(N);

    let fused = ops::map_filter(&client, &ScaleEven, &DefaultAllocator, None, &data, &1.5).unwrap();
    let mapped = ops::map(&client, &Scale, &DefaultAllocator, None, &data, &1.5).unwrap();
    let staged = ops::filter(&client, &Even, &DefaultAllocator, None, &mapped).unwrap();

    assert_eq!(sorted_f64(fused), sorted_f64(staged));
}

#[test]
fn test_map_reduce_equals_reduce_of_map() {
    let (client, _device) = create_host_client();
    let data = iota(N);

    let fused = ops::map_reduce(&client, &ScaleSum, &DefaultAllocator, None, &data, &2.0).unwrap();
    let mapped = ops::map(&client, &Scale, &DefaultAllocator, None, &data, &2.0).unwrap();
    let staged = ops::reduce(&client, &Sum, &DefaultAllocator, None, &mapped).unwrap();

    assert_allclose_f64(&[fused], &[staged], 1e-12, 0.0, "map-reduce");
    assert_eq!(fused, (N * (N - 1)) as f64);
}

#[test]
fn test_in_place_fused_shapes_leave_input_untouched() {
    let (client, _device) = create_host_client();
    let data = iota(N);
    let original = data.clone();

    let sum = ops::map_in_place_reduce(&client, &Shift, &DefaultAllocator, None, &data, &1_i64).unwrap();
    assert_eq!(sum, (1..=N as i64).sum::<i64>());

    let evens =
        ops::map_in_place_filter(&client, &Shift, &DefaultAllocator, None, &data, &1_i64).unwrap();
    let expected: Vec<i64> = (1..=N as i64).filter(|x| x % 2 == 0).collect();
    assert_eq!(sorted(evens), expected);

    assert_eq!(data, original);
}

#[test]
fn test_empty_inputs() {
    let (client, _device) = create_host_client();
    let empty: Vec<i64> = Vec::new();

    let mapped = ops::map(&client, &Scale, &DefaultAllocator, None, &empty, &1.0).unwrap();
    assert!(mapped.is_empty());

    let kept = ops::filter(&client, &Even, &DefaultAllocator, None, &empty).unwrap();
    assert!(kept.is_empty());

    let max = ops::reduce(&client, &Max, &DefaultAllocator, None, &empty).unwrap();
    assert_eq!(max, i64::MIN);

    let total = ops::map_reduce(&client, &ScaleSum, &DefaultAllocator, None, &empty, &1.0).unwrap();
    assert_eq!(total, 0.0);

    let mut nothing: Vec<i64> = Vec::new();
    let same = ops::map_in_place(&client, &Shift, &DefaultAllocator, None, &mut nothing, &1_i64).unwrap();
    assert!(same.is_empty());
}

#[test]
fn test_allocation_failure_propagates() {
    let (client, _device) = create_host_client();
    let data = iota(100);
    let alloc = TrackingAllocator::with_limit(64);

    let err = ops::map(&client, &Scale, &alloc, None, &data, &1.0).unwrap_err();
    assert!(matches!(err, Error::OutOfMemory { size: 800 }));

    let err = ops::filter(&client, &Even, &alloc, None, &data).unwrap_err();
    assert!(matches!(err, Error::OutOfMemory { .. }));

    // reductions return a scalar and allocate nothing
    let sum = ops::reduce(&client, &Sum, &alloc, None, &data).unwrap();
    assert_eq!(sum, 4950);
    assert_eq!(alloc.allocated_bytes(), 0);
}

#[test]
fn test_allocator_without_capacity_is_an_error() {
    #[derive(Clone)]
    struct NoCapacity;

    impl HostAllocator for NoCapacity {
        fn allocate<T>(&self, _len: usize) -> Result<Vec<T>> {
            Ok(Vec::new())
        }
    }

    let (client, _device) = create_host_client();
    let data = iota(100);

    let err = ops::map(&client, &Scale, &NoCapacity, None, &data, &1.0).unwrap_err();
    assert!(matches!(err, Error::Internal(_)), "{err}");
    let err = ops::filter(&client, &Even, &NoCapacity, None, &data).unwrap_err();
    assert!(matches!(err, Error::Internal(_)), "{err}");
    let err = ops::map_filter(&client, &ScaleEven, &NoCapacity, None, &data, &1.0).unwrap_err();
    assert!(matches!(err, Error::Internal(_)), "{err}");
}

#[test]
fn test_reduce_folds_partials_before_combining() {
    struct CountingSum {
        identities: AtomicUsize,
        combines: AtomicUsize,
    }

    impl Reduce<i64> for CountingSum {
        fn identity(&self) -> i64 {
            self.identities.fetch_add(1, Ordering::Relaxed);
            0
        }

        fn reduce(&self, acc: &mut i64, partial: &i64) {
            self.combines.fetch_add(1, Ordering::Relaxed);
            *acc += partial;
        }
    }

    let (client, _device) = create_host_client_with(4);
    let size = 100_000;
    let data = iota(size);
    let alg = CountingSum {
        identities: AtomicUsize::new(0),
        combines: AtomicUsize::new(0),
    };

    let sum = ops::reduce(&client, &alg, &DefaultAllocator, None, &data).unwrap();
    assert_eq!(sum, (0..size as i64).sum::<i64>());

    // one identity per rayon split, not one per element
    let identities = alg.identities.load(Ordering::Relaxed);
    assert!(identities < size / 10, "identity called {identities} times");
    // every element folds once; merges add only a split-sized overhead
    let combines = alg.combines.load(Ordering::Relaxed);
    assert!(combines >= size, "reduce called {combines} times");
    assert!(combines < size + size / 10, "reduce called {combines} times");
}

#[test]
fn test_tracking_allocator_sees_result_allocations() {
    let (client, _device) = create_host_client();
    let data = iota(10);
    let alloc = TrackingAllocator::new();

    ops::map(&client, &Scale, &alloc, None, &data, &1.0).unwrap();
    assert_eq!(alloc.allocated_bytes(), 10 * size_of::<f64>());

    // filter reserves for the worst case
    ops::filter(&client, &Even, &alloc, None, &data).unwrap();
    assert_eq!(
        alloc.allocated_bytes(),
        10 * size_of::<f64>() + 10 * size_of::<i64>()
    );
}

#[test]
fn test_filter_owned_values() {
    struct NonEmpty;

    impl Filter<String> for NonEmpty {
        fn filter(&self, item: &String) -> bool {
            !item.is_empty()
        }
    }

    let (client, _device) = create_host_client();
    let data: Vec<String> = ["a", "", "bc", "", "def"].map(String::from).to_vec();
    let kept = ops::filter(&client, &NonEmpty, &DefaultAllocator, None, &data).unwrap();
    assert_eq!(sorted(kept), vec!["a", "bc", "def"]);
}

#[test]
fn test_parallel_for_visits_each_index_once() {
    let (client, _device) = create_host_client_with(4);
    let hits: Vec<AtomicUsize> = (0..500).map(|_| AtomicUsize::new(0)).collect();
    let cfg = client.default_config(hits.len());

    client.parallel_for(&cfg, hits.len(), |i| {
        hits[i].fetch_add(1, Ordering::Relaxed);
    });

    assert!(hits.iter().all(|h| h.load(Ordering::Relaxed) == 1));
}

#[test]
fn test_default_config_covers_input() {
    let (client, device) = create_host_client_with(4);
    assert_eq!(device.num_threads(), 4);
    for size in [0, 1, 3, 4, 5, 1000] {
        let cfg = client.default_config(size);
        assert!(cfg.covers(size), "size {size}");
        assert!(cfg.group_count() <= 4, "size {size}: {cfg:?}");
    }
    client.synchronize().unwrap();
}

#[test]
fn test_backend_identity() {
    assert_eq!(HostBackend::name(), "host");
    assert!(HostBackend::is_available());
    let (client, device) = create_host_client();
    assert!(client.device().is_same(&device));
}

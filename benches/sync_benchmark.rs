/*!
 * Synchronization Primitives Benchmarks
 *
 * Compare the parking_lot and std backends on the uncontended paths and a
 * wait/notify round trip.
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use native_sync::core::id;
use native_sync::core::sync::{Backend, BackendType, OwnedConditionVariable, Signaler, SyncConfig};
use std::sync::Arc;
use std::thread;

const BACKENDS: [BackendType; 2] = [BackendType::ParkingLot, BackendType::Std];

fn backend(kind: BackendType) -> Backend {
    Backend::from_config(&SyncConfig {
        backend: kind,
        ..Default::default()
    })
}

fn bench_lock_unlock(c: &mut Criterion) {
    let mut group = c.benchmark_group("lock_unlock");

    for kind in BACKENDS {
        let cv = OwnedConditionVariable::with_backend(&backend(kind)).unwrap();
        let me = id::current();

        group.bench_with_input(BenchmarkId::from_parameter(format!("{:?}", kind)), &cv, |b, cv| {
            b.iter(|| {
                cv.lock(black_box(me)).unwrap();
                cv.unlock(black_box(me)).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_notify_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("notify_round_trip");
    group.sample_size(20);

    for kind in BACKENDS {
        let backend = backend(kind);

        group.bench_with_input(BenchmarkId::from_parameter(format!("{:?}", kind)), &backend, |b, backend| {
            b.iter(|| {
                let cv = Arc::new(OwnedConditionVariable::with_backend(backend).unwrap());
                let cv_clone = cv.clone();

                let waiter = thread::spawn(move || {
                    let me = id::current();
                    cv_clone.lock(me).unwrap();
                    cv_clone.wait(me).unwrap();
                    cv_clone.unlock(me).unwrap();
                });

                while cv.waiter_count() == 0 {
                    thread::yield_now();
                }
                cv.notify_all().unwrap();
                waiter.join().unwrap();
            });
        });
    }

    group.finish();
}

fn bench_broadcast_no_waiters(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcast_no_waiters");

    for kind in BACKENDS {
        let signaler = Signaler::with_backend(&backend(kind)).unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", kind)),
            &signaler,
            |b, signaler| {
                b.iter(|| signaler.broadcast().unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_lock_unlock,
    bench_notify_round_trip,
    bench_broadcast_no_waiters
);
criterion_main!(benches);

/*!
 * Environment Configuration Tests
 *
 * Kept in their own binary: they mutate process environment variables.
 */

use native_sync::core::limits::{ENV_BACKEND, ENV_STACK_SIZE};
use native_sync::{Backend, OwnedConditionVariable, Signaler, ThreadSpawner};
use std::sync::mpsc;

#[test]
fn test_environment_drives_defaults() {
    std::env::set_var(ENV_BACKEND, "std");
    std::env::set_var(ENV_STACK_SIZE, "262144");

    assert_eq!(Backend::default().name(), "std");
    assert_eq!(OwnedConditionVariable::create().unwrap().backend_name(), "std");
    assert_eq!(Signaler::create().unwrap().backend_name(), "std");

    let spawner = ThreadSpawner::default();
    assert!(format!("{:?}", spawner).contains("262144"));
    let (tx, rx) = mpsc::channel();
    let handle = spawner.spawn(Box::new(move || tx.send(()).unwrap())).unwrap();
    rx.recv().unwrap();
    handle.into_native().join().unwrap();

    std::env::set_var(ENV_BACKEND, "parking_lot");
    assert_eq!(Backend::default().name(), "parking_lot");

    std::env::remove_var(ENV_BACKEND);
    std::env::remove_var(ENV_STACK_SIZE);
}

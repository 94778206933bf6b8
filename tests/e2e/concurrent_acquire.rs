//! End-to-end: concurrent acquire
//!
//! Scenario:
//! 1. Many tasks acquire for the same tenant at once
//! 2. The number of successes equals the final usage
//! 3. Overshoot is bounded by the number of racing tasks
//! 4. Concurrent releases never go below zero

use crate::common::*;
use quotaron::{limit::Limit, manager::QuotaManager, resource::Resource, tenant::Tenant};
use std::sync::Arc;

const LIMIT: u64 = 20;
const TASKS: u64 = 50;

async fn spawn_acquires(manager: Arc<QuotaManager>, tenant: &str) -> u64 {
    let mut handles = Vec::new();
    for _ in 0..TASKS {
        let manager = manager.clone();
        let tenant = Tenant::from(tenant);
        handles.push(tokio::spawn(async move {
            manager
                .acquire_one(&tenant, &Resource::from("recipe"))
                .await
                .unwrap()
                .allowed()
        }));
    }

    let mut allowed = 0;
    for handle in handles {
        if handle.await.unwrap() {
            allowed += 1;
        }
    }
    allowed
}

/// End-to-end: concurrent acquire
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_e2e_concurrent_acquire() {
    init_tracing();
    let storage = create_memory_storage();
    let counter = create_stored_counter(&["recipe"], storage);
    let manager = Arc::new(create_manager(Some(Limit::Bounded(LIMIT)), counter.clone()));

    let allowed = spawn_acquires(manager.clone(), "acme").await;
    let used = usage(&*counter, "acme", "recipe").await;

    // each success adds exactly one
    assert_eq!(allowed, used);
    // optimistic acquire: at least full, overshoot bounded by concurrency
    assert!(used >= LIMIT, "used {} below limit", used);
    assert!(used <= TASKS);

    // once full, sequential acquires are all denied
    for _ in 0..5 {
        let result = manager
            .acquire_one(&Tenant::from("acme"), &Resource::from("recipe"))
            .await
            .unwrap();
        assert!(result.is_denied());
    }
    assert_eq!(usage(&*counter, "acme", "recipe").await, used);
}

/// End-to-end: sequential acquires never overshoot
#[tokio::test]
async fn test_e2e_sequential_acquire_exact() {
    let storage = create_memory_storage();
    let counter = create_stored_counter(&["recipe"], storage);
    let manager = create_manager(Some(Limit::Bounded(LIMIT)), counter.clone());
    let tenant = Tenant::from("acme");

    let mut allowed = 0;
    for _ in 0..TASKS {
        if manager
            .acquire_one(&tenant, &Resource::from("recipe"))
            .await
            .unwrap()
            .allowed()
        {
            allowed += 1;
        }
    }
    assert_eq!(allowed, LIMIT);
    assert_eq!(usage(&*counter, "acme", "recipe").await, LIMIT);
}

/// End-to-end: concurrent releases clamp at zero
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_e2e_concurrent_release_clamps() {
    let storage = create_memory_storage();
    let counter = create_stored_counter(&["recipe"], storage);
    let manager = Arc::new(create_manager(Some(Limit::Bounded(LIMIT)), counter.clone()));
    let tenant = Tenant::from("acme");

    for _ in 0..10 {
        manager
            .acquire_one(&tenant, &Resource::from("recipe"))
            .await
            .unwrap();
    }

    let mut handles = Vec::new();
    for _ in 0..30 {
        let manager = manager.clone();
        let tenant = tenant.clone();
        handles.push(tokio::spawn(async move {
            manager
                .release_one(&tenant, &Resource::from("recipe"))
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        let result = handle.await.unwrap();
        assert!(result.allowed());
    }

    assert_eq!(usage(&*counter, "acme", "recipe").await, 0);
}

/// End-to-end: tenants do not affect each other
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_e2e_tenants_in_parallel() {
    let storage = create_memory_storage();
    let counter = create_stored_counter(&["recipe"], storage);
    let manager = Arc::new(create_manager(Some(Limit::Bounded(LIMIT)), counter.clone()));

    let (a, b) = tokio::join!(
        spawn_acquires(manager.clone(), "acme"),
        spawn_acquires(manager.clone(), "globex")
    );
    assert_eq!(a, usage(&*counter, "acme", "recipe").await);
    assert_eq!(b, usage(&*counter, "globex", "recipe").await);
}

//! Storage integration tests

use crate::common::*;
use quotaron::{
    counter::ResourceCounter,
    resource::{Resource, ResourceKind},
    storage::{UsageKey, UsageStorage},
    tenant::Tenant,
};

#[tokio::test]
async fn test_counter_and_storage_agree() {
    let storage = create_memory_storage();
    let counter = create_stored_counter(&["recipe", "recipe_book"], storage.clone());
    let tenant = Tenant::from("acme");

    counter
        .increment(&tenant, &Resource::from("recipe"), 4)
        .await
        .unwrap();
    counter
        .increment(&tenant, &Resource::instance("recipe_book", "3"), 1)
        .await
        .unwrap();

    let key = UsageKey::new(&tenant, &ResourceKind::from("recipe"));
    assert_eq!(storage.get_usage(&key).await.unwrap(), 4);
    assert_eq!(storage.len(), 2);

    storage.reset(&key).await.unwrap();
    assert_eq!(usage(&*counter, "acme", "recipe").await, 0);
    assert_eq!(usage(&*counter, "acme", "recipe_book").await, 1);
}

#[tokio::test]
async fn test_shared_storage_between_counters() {
    let storage = create_memory_storage();
    let first = create_stored_counter(&["recipe"], storage.clone());
    let second = create_stored_counter(&["recipe"], storage.clone());
    let tenant = Tenant::from("acme");

    first
        .increment(&tenant, &Resource::from("recipe"), 2)
        .await
        .unwrap();
    second
        .decrement(&tenant, &Resource::from("recipe"), 1)
        .await
        .unwrap();
    assert_eq!(usage(&*first, "acme", "recipe").await, 1);
}

#[tokio::test]
async fn test_unsupported_kind_not_served() {
    let storage = create_memory_storage();
    let counter = create_stored_counter(&["recipe"], storage);
    assert!(!counter.supports(&Tenant::from("acme"), &Resource::from("tag")));
    assert!(counter.supports(&Tenant::from("acme"), &Resource::instance("recipe", "x")));
}

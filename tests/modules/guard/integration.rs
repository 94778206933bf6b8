//! Quota guard integration tests

use crate::common::*;
use quotaron::{
    error::QuotaError,
    guard::QuotaGuard,
    limit::{FnQuotaLimitResolver, Limit},
    manager::QuotaManager,
    resource::Resource,
    tenant::{FixedTenantResolver, Tenant},
};

/// Input of the guarded operation
struct CreateRecipe {
    author: u64,
    title: String,
}

#[tokio::test]
async fn test_guarded_create_flow() {
    let storage = create_memory_storage();
    let counter = create_stored_counter(&["recipe"], storage);
    let manager = create_manager(Some(Limit::Bounded(2)), counter.clone());

    let guard = QuotaGuard::<CreateRecipe>::new(manager, "recipe")
        .with_tenant_fn(|input: &CreateRecipe| Ok(Tenant::from(input.author)));

    let input = CreateRecipe {
        author: 42,
        title: "Pancakes".to_string(),
    };

    for _ in 0..2 {
        let title = guard
            .run_acquired(&input, async { Ok::<_, QuotaError>(input.title.clone()) })
            .await
            .unwrap();
        assert_eq!(title, "Pancakes");
    }
    assert_eq!(usage(&*counter, "42", "recipe").await, 2);

    let err = guard
        .run_acquired(&input, async { Ok::<_, QuotaError>(()) })
        .await
        .unwrap_err();
    match err {
        QuotaError::QuotaExceeded {
            resource,
            used,
            limit,
            ..
        } => {
            assert_eq!(resource, "recipe");
            assert_eq!(used, 2);
            assert_eq!(limit, Limit::Bounded(2));
        }
        other => panic!("expected QuotaExceeded, got {:?}", other),
    }

    // deleting gives the quota back
    guard.release(&input).await.unwrap();
    assert!(guard.check(&input).await.is_ok());
}

#[tokio::test]
async fn test_tenant_fn_error_short_circuits() {
    let storage = create_memory_storage();
    let counter = create_stored_counter(&["recipe"], storage);
    let manager = create_manager(Some(Limit::Bounded(2)), counter.clone());

    let guard = QuotaGuard::<Option<String>>::new(manager, "recipe").with_tenant_fn(
        |owner: &Option<String>| {
            owner
                .as_deref()
                .map(Tenant::from)
                .ok_or_else(|| QuotaError::TenantUnresolved("owner is missing".to_string()))
        },
    );

    let err = guard.acquire(&None).await.unwrap_err();
    assert!(matches!(err, QuotaError::TenantUnresolved(_)));
    assert!(counter.storage().is_empty());
}

#[tokio::test]
async fn test_guard_with_count_based_counter() {
    let counter = std::sync::Arc::new(RowCounter::new("recipe", 0));
    let manager = create_manager(Some(Limit::Bounded(1)), counter.clone());
    let guard: QuotaGuard = QuotaGuard::new(manager, "recipe")
        .tenant_resolver(FixedTenantResolver::new("acme"))
        .message("Recipe limit reached");

    let id = guard
        .guard(&(), async {
            counter.set_rows(1);
            7
        })
        .await
        .unwrap();
    assert_eq!(id, 7);

    let err = guard.guard(&(), async { 8 }).await.unwrap_err();
    assert_eq!(err.to_string(), "Recipe limit reached");
}

/// Saving a recipe, optionally into a book
struct SaveRecipe {
    book: Option<u64>,
}

#[tokio::test]
async fn test_resource_fn_selects_checked_resource() {
    let storage = create_memory_storage();
    let counter = create_stored_counter(&["recipe", "recipe_book"], storage);
    let manager = QuotaManager::builder()
        .limit_resolver(FnQuotaLimitResolver::new(
            |_: &Tenant, resource: &Resource| match resource.kind().as_str() {
                "recipe" => Some(Limit::Bounded(5)),
                "recipe_book" => Some(Limit::Bounded(1)),
                _ => None,
            },
        ))
        .counter_arc(counter.clone())
        .build()
        .unwrap();

    let guard = QuotaGuard::<SaveRecipe>::new(manager, "recipe")
        .tenant_resolver(FixedTenantResolver::new("acme"))
        .with_resource_fn(|input: &SaveRecipe| match input.book {
            Some(id) => Resource::instance("recipe_book", id.to_string()),
            None => Resource::from("recipe"),
        });

    let loose = SaveRecipe { book: None };
    let in_book = SaveRecipe { book: Some(9) };
    assert_eq!(guard.resolve_resource(&in_book), Resource::instance("recipe_book", "9"));
    assert_eq!(guard.resolve_resource(&loose), Resource::from("recipe"));

    guard.acquire(&loose).await.unwrap();
    guard.acquire(&in_book).await.unwrap();
    assert_eq!(usage(&*counter, "acme", "recipe").await, 1);
    assert_eq!(usage(&*counter, "acme", "recipe_book").await, 1);

    match guard.check(&in_book).await {
        Err(QuotaError::QuotaExceeded {
            message, resource, ..
        }) => {
            assert_eq!(resource, "recipe_book");
            assert_eq!(message, "Quota exceeded for recipe_book");
        }
        other => panic!("expected QuotaExceeded, got {:?}", other),
    }
    assert!(guard.check(&loose).await.is_ok());

    // a failed save gives back the extracted resource
    let result: Result<(), QuotaError> = guard
        .run_acquired(&loose, async {
            Err(QuotaError::ConfigError("insert failed".to_string()))
        })
        .await;
    assert!(result.is_err());
    assert_eq!(usage(&*counter, "acme", "recipe").await, 1);

    guard.release(&in_book).await.unwrap();
    assert_eq!(usage(&*counter, "acme", "recipe_book").await, 0);
    assert!(guard.check(&in_book).await.is_ok());
}

//! Tests for the in-memory secret store.

use super::*;

/// Verify insert, fetch, and removal.
#[tokio::test]
async fn test_insert_fetch_remove() {
    let store = InMemorySecretStore::new();
    store.insert("signing", "s3cret").await;

    let name = SecretName::new("signing").unwrap();
    assert_eq!(store.get_secret(&name).await.unwrap().expose(), "s3cret");

    assert!(store.remove("signing").await);
    assert!(matches!(
        store.get_secret(&name).await,
        Err(SecretStoreError::NotFound { .. })
    ));
}

/// Verify an absent secret is reported as not found.
#[tokio::test]
async fn test_absent_secret_not_found() {
    let store = InMemorySecretStore::new();
    let name = SecretName::new("missing").unwrap();
    assert!(matches!(
        store.get_secret(&name).await,
        Err(SecretStoreError::NotFound { .. })
    ));
}

/// Verify the store is always healthy.
#[tokio::test]
async fn test_health_check() {
    assert!(InMemorySecretStore::new().health_check().await.is_ok());
}

use std::time::Duration;

use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult};
use amora_store::{collections, from_document, to_document, DocumentStore};

use crate::models::Profile;

/// Fetch the user's profile, creating an empty one on first sign-in.
pub async fn ensure_profile(store: &dyn DocumentStore, user: Uuid) -> AppResult<Profile> {
    if let Some(doc) = store.get(collections::PROFILES, &user.to_string()).await? {
        return Ok(from_document(doc)?);
    }

    let profile = Profile::default();
    store
        .set(
            collections::PROFILES,
            &user.to_string(),
            to_document(&profile)?,
            false,
        )
        .await?;

    tracing::info!(user = %user, "empty profile created on first sign-in");
    Ok(profile)
}

/// Fetch the user's profile if it exists.
pub async fn load_profile(store: &dyn DocumentStore, user: Uuid) -> AppResult<Option<Profile>> {
    match store.get(collections::PROFILES, &user.to_string()).await? {
        Some(doc) => Ok(Some(from_document(doc)?)),
        None => Ok(None),
    }
}

/// Fetch a profile for a hot path that must not fail: a store error,
/// malformed document or timeout degrades to a minimal profile instead of
/// blocking the caller.
pub async fn profile_or_minimal(
    store: &dyn DocumentStore,
    user: Uuid,
    timeout: Duration,
) -> Profile {
    match tokio::time::timeout(timeout, store.get(collections::PROFILES, &user.to_string())).await
    {
        Ok(Ok(Some(doc))) => from_document(doc).unwrap_or_else(|err| {
            tracing::warn!(user = %user, error = %err, "malformed profile document, degrading to minimal profile");
            Profile::default()
        }),
        Ok(Ok(None)) => Profile::default(),
        Ok(Err(err)) => {
            tracing::warn!(
                user = %user,
                class = err.class(),
                error = %err,
                "profile fetch failed, degrading to minimal profile"
            );
            Profile::default()
        }
        Err(_) => {
            tracing::warn!(user = %user, "profile fetch timed out, degrading to minimal profile");
            Profile::default()
        }
    }
}

/// Merge the given fields into the user's profile document and return the
/// updated profile. Only the provided fields change.
pub async fn save_profile_fields(
    store: &dyn DocumentStore,
    user: Uuid,
    fields: serde_json::Value,
) -> AppResult<Profile> {
    store
        .set(collections::PROFILES, &user.to_string(), fields, true)
        .await?;

    let doc = store
        .get(collections::PROFILES, &user.to_string())
        .await?
        .ok_or_else(|| AppError::internal("profile vanished after merge write"))?;
    Ok(from_document(doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use amora_store::{MemoryStore, Predicate, StoreError, StoreResult};
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::broadcast;

    #[tokio::test]
    async fn ensure_profile_is_idempotent() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();

        ensure_profile(&store, user).await.unwrap();
        store
            .update(
                collections::PROFILES,
                &user.to_string(),
                json!({"full_name": "Ada"}),
            )
            .await
            .unwrap();

        // A second sign-in must not wipe the edited profile.
        let profile = ensure_profile(&store, user).await.unwrap();
        assert_eq!(profile.full_name, "Ada");
    }

    #[tokio::test]
    async fn merge_save_keeps_unrelated_fields() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();

        save_profile_fields(&store, user, json!({"full_name": "Ada", "dob": "1990-01-01"}))
            .await
            .unwrap();
        let profile = save_profile_fields(&store, user, json!({"onboarding_completed": true}))
            .await
            .unwrap();

        assert_eq!(profile.full_name, "Ada");
        assert_eq!(profile.dob.as_deref(), Some("1990-01-01"));
        assert!(profile.onboarding_completed);
    }

    struct BrokenStore;

    #[async_trait]
    impl DocumentStore for BrokenStore {
        async fn get(&self, _: &str, _: &str) -> StoreResult<Option<amora_store::Document>> {
            Err(StoreError::PermissionDenied("rules rejected read".into()))
        }
        async fn set(
            &self,
            _: &str,
            _: &str,
            _: amora_store::Document,
            _: bool,
        ) -> StoreResult<()> {
            Err(StoreError::PermissionDenied("rules rejected write".into()))
        }
        async fn update(&self, _: &str, _: &str, _: amora_store::Document) -> StoreResult<()> {
            Err(StoreError::PermissionDenied("rules rejected write".into()))
        }
        async fn delete(&self, _: &str, _: &str) -> StoreResult<()> {
            Err(StoreError::PermissionDenied("rules rejected delete".into()))
        }
        async fn query(
            &self,
            _: &str,
            _: &[Predicate],
            _: Option<usize>,
        ) -> StoreResult<Vec<(String, amora_store::Document)>> {
            Err(StoreError::PermissionDenied("rules rejected query".into()))
        }
        fn watch(&self, _: &str) -> broadcast::Receiver<amora_store::DocChange> {
            broadcast::channel(1).1
        }
    }

    #[tokio::test]
    async fn degraded_fetch_never_fails() {
        let profile =
            profile_or_minimal(&BrokenStore, Uuid::new_v4(), Duration::from_secs(1)).await;
        assert_eq!(profile, Profile::default());

        let store = MemoryStore::new();
        let profile =
            profile_or_minimal(&store, Uuid::new_v4(), Duration::from_secs(1)).await;
        assert_eq!(profile, Profile::default());
    }
}

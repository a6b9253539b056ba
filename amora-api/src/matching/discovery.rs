use std::collections::HashSet;

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use amora_store::{collections, from_document, DocumentStore, Predicate, StoreResult};

use crate::models::{Like, MatchingPreferences, Pass, Profile};

use super::filter;

#[derive(Debug, Default)]
pub struct DiscoveryOptions {
    /// Re-surface candidates the viewer already passed on.
    pub include_passed: bool,
    pub preferences: Option<MatchingPreferences>,
    pub viewer_coords: Option<(f64, f64)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub id: Uuid,
    #[serde(flatten)]
    pub profile: Profile,
}

/// Fetch a randomized set of discoverable profiles for `viewer_id`.
///
/// One fixed-size page of onboarded profiles is fetched and then thinned
/// by the exclusion set and the preference filter, so the result can be
/// empty even while eligible candidates exist deeper in the collection;
/// the caller treats empty as "no more profiles right now". Discovery is
/// best-effort: any store failure is logged with its classification and
/// reported as an empty set.
pub async fn discover(
    store: &dyn DocumentStore,
    viewer_id: Uuid,
    session_excluded: &[Uuid],
    max_results: usize,
    opts: &DiscoveryOptions,
    rng: &mut (impl Rng + Send),
    today: NaiveDate,
) -> Vec<Candidate> {
    match discover_inner(store, viewer_id, session_excluded, max_results, opts, rng, today).await
    {
        Ok(candidates) => candidates,
        Err(err) => {
            tracing::warn!(
                viewer = %viewer_id,
                class = err.class(),
                error = %err,
                "discovery fetch failed, returning no candidates"
            );
            Vec::new()
        }
    }
}

async fn discover_inner(
    store: &dyn DocumentStore,
    viewer_id: Uuid,
    session_excluded: &[Uuid],
    max_results: usize,
    opts: &DiscoveryOptions,
    rng: &mut (impl Rng + Send),
    today: NaiveDate,
) -> StoreResult<Vec<Candidate>> {
    let mut excluded: HashSet<Uuid> = session_excluded.iter().copied().collect();
    excluded.insert(viewer_id);

    let liked = store
        .query(
            collections::LIKES,
            &[Predicate::eq("fromUserId", viewer_id.to_string())],
            None,
        )
        .await?;
    excluded.extend(
        liked
            .into_iter()
            .filter_map(|(_, doc)| from_document::<Like>(doc).ok())
            .map(|like| like.to_user_id),
    );

    if !opts.include_passed {
        let passed = store
            .query(
                collections::PASSES,
                &[Predicate::eq("fromUserId", viewer_id.to_string())],
                None,
            )
            .await?;
        excluded.extend(
            passed
                .into_iter()
                .filter_map(|(_, doc)| from_document::<Pass>(doc).ok())
                .map(|pass| pass.to_user_id),
        );
    }

    let page = store
        .query(
            collections::PROFILES,
            &[Predicate::eq("onboarding_completed", true)],
            Some(max_results),
        )
        .await?;

    let mut candidates: Vec<Candidate> = page
        .into_iter()
        .filter_map(|(id, doc)| {
            let id: Uuid = id.parse().ok()?;
            let profile: Profile = from_document(doc).ok()?;
            let eligible = !excluded.contains(&id)
                && profile.is_discoverable()
                && filter::passes_filters(
                    &profile,
                    opts.preferences.as_ref(),
                    opts.viewer_coords,
                    today,
                );
            eligible.then_some(Candidate { id, profile })
        })
        .collect();

    candidates.shuffle(rng);
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::engine;
    use crate::models::{AgeRange, LikeType};
    use amora_store::{to_document, DocChange, MemoryStore, StoreError};
    use async_trait::async_trait;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;
    use tokio::sync::broadcast;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn onboarded(name: &str) -> Profile {
        Profile {
            full_name: name.into(),
            onboarding_completed: true,
            ..Profile::default()
        }
    }

    async fn insert_profile(store: &MemoryStore, id: Uuid, profile: &Profile) {
        store
            .set(
                collections::PROFILES,
                &id.to_string(),
                to_document(profile).unwrap(),
                false,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn excludes_viewer_session_liked_and_passed() {
        let store = MemoryStore::new();
        let viewer = Uuid::new_v4();
        let liked = Uuid::new_v4();
        let passed = Uuid::new_v4();
        let session_hidden = Uuid::new_v4();
        let fresh = Uuid::new_v4();

        insert_profile(&store, viewer, &onboarded("Viewer")).await;
        insert_profile(&store, liked, &onboarded("Liked")).await;
        insert_profile(&store, passed, &onboarded("Passed")).await;
        insert_profile(&store, session_hidden, &onboarded("Hidden")).await;
        insert_profile(&store, fresh, &onboarded("Fresh")).await;

        engine::record_like(&store, viewer, liked, LikeType::Heart)
            .await
            .unwrap();
        engine::record_pass(&store, viewer, passed).await.unwrap();

        let found = discover(
            &store,
            viewer,
            &[session_hidden],
            50,
            &DiscoveryOptions::default(),
            &mut rng(),
            today(),
        )
        .await;

        let ids: HashSet<Uuid> = found.iter().map(|c| c.id).collect();
        assert_eq!(ids, HashSet::from([fresh]));
    }

    #[tokio::test]
    async fn include_passed_resurfaces_passed_profiles() {
        let store = MemoryStore::new();
        let viewer = Uuid::new_v4();
        let passed = Uuid::new_v4();

        insert_profile(&store, passed, &onboarded("Passed")).await;
        engine::record_pass(&store, viewer, passed).await.unwrap();

        let opts = DiscoveryOptions {
            include_passed: true,
            ..DiscoveryOptions::default()
        };
        let found = discover(&store, viewer, &[], 50, &opts, &mut rng(), today()).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, passed);
    }

    #[tokio::test]
    async fn drops_incomplete_and_nameless_profiles() {
        let store = MemoryStore::new();
        let viewer = Uuid::new_v4();
        let nameless = Uuid::new_v4();
        let not_onboarded = Uuid::new_v4();
        let ok = Uuid::new_v4();

        insert_profile(
            &store,
            nameless,
            &Profile {
                onboarding_completed: true,
                ..Profile::default()
            },
        )
        .await;
        insert_profile(&store, not_onboarded, &onboarded("Almost")).await;
        store
            .update(
                collections::PROFILES,
                &not_onboarded.to_string(),
                json!({"onboarding_completed": false}),
            )
            .await
            .unwrap();
        insert_profile(&store, ok, &onboarded("Ready")).await;

        let found = discover(
            &store,
            viewer,
            &[],
            50,
            &DiscoveryOptions::default(),
            &mut rng(),
            today(),
        )
        .await;

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, ok);
    }

    #[tokio::test]
    async fn applies_preference_filter() {
        let store = MemoryStore::new();
        let viewer = Uuid::new_v4();
        let young = Uuid::new_v4();
        let old = Uuid::new_v4();

        let mut young_profile = onboarded("Young");
        young_profile.dob = Some("1996-01-15".into());
        let mut old_profile = onboarded("Old");
        old_profile.dob = Some("1984-01-15".into());

        insert_profile(&store, young, &young_profile).await;
        insert_profile(&store, old, &old_profile).await;

        let opts = DiscoveryOptions {
            preferences: Some(MatchingPreferences {
                age_range: AgeRange { min: 25, max: 35 },
                ..MatchingPreferences::default()
            }),
            ..DiscoveryOptions::default()
        };

        let found = discover(&store, viewer, &[], 50, &opts, &mut rng(), today()).await;
        let ids: Vec<Uuid> = found.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![young]);
    }

    #[tokio::test]
    async fn same_seed_same_permutation_and_same_membership() {
        let store = MemoryStore::new();
        let viewer = Uuid::new_v4();
        let mut expected = HashSet::new();
        for i in 0..12 {
            let id = Uuid::new_v4();
            expected.insert(id);
            insert_profile(&store, id, &onboarded(&format!("User {i}"))).await;
        }

        let run = |seed: u64| {
            let store = &store;
            async move {
                let mut rng = StdRng::seed_from_u64(seed);
                discover(
                    store,
                    viewer,
                    &[],
                    50,
                    &DiscoveryOptions::default(),
                    &mut rng,
                    today(),
                )
                .await
                .iter()
                .map(|c| c.id)
                .collect::<Vec<_>>()
            }
        };

        let first = run(7).await;
        let second = run(7).await;
        assert_eq!(first, second);
        assert_eq!(first.iter().copied().collect::<HashSet<_>>(), expected);
    }

    #[tokio::test]
    async fn respects_page_size() {
        let store = MemoryStore::new();
        let viewer = Uuid::new_v4();
        for i in 0..10 {
            insert_profile(&store, Uuid::new_v4(), &onboarded(&format!("User {i}"))).await;
        }

        let found = discover(
            &store,
            viewer,
            &[],
            4,
            &DiscoveryOptions::default(),
            &mut rng(),
            today(),
        )
        .await;
        assert_eq!(found.len(), 4);
    }

    /// A store whose every call fails, for exercising the swallow path.
    struct UnavailableStore;

    #[async_trait]
    impl DocumentStore for UnavailableStore {
        async fn get(&self, _: &str, _: &str) -> StoreResult<Option<amora_store::Document>> {
            Err(StoreError::Unavailable("backend offline".into()))
        }
        async fn set(
            &self,
            _: &str,
            _: &str,
            _: amora_store::Document,
            _: bool,
        ) -> StoreResult<()> {
            Err(StoreError::Unavailable("backend offline".into()))
        }
        async fn update(&self, _: &str, _: &str, _: amora_store::Document) -> StoreResult<()> {
            Err(StoreError::Unavailable("backend offline".into()))
        }
        async fn delete(&self, _: &str, _: &str) -> StoreResult<()> {
            Err(StoreError::Unavailable("backend offline".into()))
        }
        async fn query(
            &self,
            _: &str,
            _: &[Predicate],
            _: Option<usize>,
        ) -> StoreResult<Vec<(String, amora_store::Document)>> {
            Err(StoreError::Unavailable("backend offline".into()))
        }
        fn watch(&self, _: &str) -> broadcast::Receiver<DocChange> {
            broadcast::channel(1).1
        }
    }

    #[tokio::test]
    async fn store_failure_yields_empty_not_error() {
        let found = discover(
            &UnavailableStore,
            Uuid::new_v4(),
            &[],
            50,
            &DiscoveryOptions::default(),
            &mut rng(),
            today(),
        )
        .await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn empty_store_yields_empty() {
        let store = MemoryStore::new();
        let found = discover(
            &store,
            Uuid::new_v4(),
            &[],
            50,
            &DiscoveryOptions::default(),
            &mut rng(),
            today(),
        )
        .await;
        assert!(found.is_empty());
    }
}

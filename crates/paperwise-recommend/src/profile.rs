//! Personalization profile construction.
//!
//! The profile is derived from the strongest signal available, in order:
//!
//! | Rung | Signal | Confidence |
//! |------|--------|------------|
//! | 1 | Saved papers | 0.80 – 0.95 |
//! | 2 | Collection names and descriptions | 0.60 – 0.75 |
//! | 3 | Registered subject area | 0.50 |
//! | 4 | Generic default domains | 0.30 |
//!
//! A rung is consulted only when every earlier rung produced no domain, so a
//! user with saved papers never triggers a collection lookup.

use std::collections::HashMap;
use std::sync::Arc;

use paperwise_core::defaults::{
    COLLECTION_INFERENCE_CONFIDENCE, EXPLICIT_ACTIVITY_CONFIDENCE, GENERIC_DEFAULT_CONFIDENCE,
    GENERIC_DEFAULT_DOMAINS, SUBJECT_AREA_CONFIDENCE,
};
use paperwise_core::domains::canonical_domain;
use paperwise_core::{
    infer_domains, logging, ActivityLevel, DomainMatch, ProfileSignalStore, Result, SignalSource,
    UserProfile,
};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Builds a [`UserProfile`] from the signal store.
pub struct ProfileBuilder {
    store: Arc<dyn ProfileSignalStore>,
    domain_limit: usize,
}

impl ProfileBuilder {
    pub fn new(store: Arc<dyn ProfileSignalStore>, domain_limit: usize) -> Self {
        Self {
            store,
            domain_limit: domain_limit.max(1),
        }
    }

    /// Build the profile for a user, optionally scoped to a project.
    ///
    /// Missing signals never fail: a user with no history at all gets the
    /// generic default profile. Errors from the store itself are returned.
    #[instrument(
        skip(self),
        fields(subsystem = "recommend", component = "profile_builder", op = "build")
    )]
    pub async fn build(&self, user_id: Uuid, project_id: Option<Uuid>) -> Result<UserProfile> {
        let saved = self.store.saved_items(user_id, project_id).await?;
        let activity_level = ActivityLevel::from_saved_count(saved.len());

        let matches = infer_domains(saved.iter().map(|s| s.signal_text()));
        if !matches.is_empty() {
            return Ok(self.finish(
                matches,
                EXPLICIT_ACTIVITY_CONFIDENCE,
                SignalSource::ExplicitActivity,
                activity_level,
            ));
        }

        let collections = self.store.collections(user_id, project_id).await?;
        let matches = infer_domains(collections.iter().map(|c| c.signal_text()));
        if !matches.is_empty() {
            return Ok(self.finish(
                matches,
                COLLECTION_INFERENCE_CONFIDENCE,
                SignalSource::CollectionInference,
                activity_level,
            ));
        }

        if let Some(area) = self.store.subject_area(user_id).await? {
            let domain = canonical_domain(&area);
            if !domain.is_empty() {
                return Ok(self.finish(
                    vec![DomainMatch { domain, hits: 1 }],
                    (SUBJECT_AREA_CONFIDENCE, SUBJECT_AREA_CONFIDENCE),
                    SignalSource::SubjectArea,
                    activity_level,
                ));
            }
        }

        let generic = GENERIC_DEFAULT_DOMAINS
            .iter()
            .map(|d| DomainMatch {
                domain: d.to_string(),
                hits: 1,
            })
            .collect();
        Ok(self.finish(
            generic,
            (GENERIC_DEFAULT_CONFIDENCE, GENERIC_DEFAULT_CONFIDENCE),
            SignalSource::GenericDefault,
            activity_level,
        ))
    }

    /// Keep the strongest matches and spread confidence across the band.
    fn finish(
        &self,
        mut matches: Vec<DomainMatch>,
        (floor, ceiling): (f32, f32),
        signal_source: SignalSource,
        activity_level: ActivityLevel,
    ) -> UserProfile {
        matches.truncate(self.domain_limit);
        let max_hits = matches.iter().map(|m| m.hits).max().unwrap_or(1).max(1);

        let domain_confidence: HashMap<String, f32> = matches
            .iter()
            .map(|m| {
                let share = m.hits as f32 / max_hits as f32;
                (m.domain.clone(), floor + (ceiling - floor) * share)
            })
            .collect();
        let primary_domains: Vec<String> = matches.into_iter().map(|m| m.domain).collect();

        debug!(
            { logging::SIGNAL_SOURCE } = %signal_source,
            domains = ?primary_domains,
            activity = ?activity_level,
            "Profile built"
        );

        UserProfile {
            primary_domains,
            domain_confidence,
            signal_source,
            activity_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{collection, saved, MemorySignals};
    use paperwise_core::Error;

    fn builder(store: MemorySignals) -> (ProfileBuilder, Arc<MemorySignals>) {
        let store = Arc::new(store);
        (ProfileBuilder::new(store.clone(), 3), store)
    }

    #[tokio::test]
    async fn test_explicit_activity_wins() {
        let (builder, store) = builder(MemorySignals {
            saved: vec![
                saved("Chronic kidney disease progression"),
                saved("Renal outcomes after dialysis"),
                saved("Heart failure in CKD"),
            ],
            collections: vec![collection("Oncology reading list")],
            subject_area: Some("Psychiatry".to_string()),
            ..Default::default()
        });

        let profile = builder.build(Uuid::new_v4(), None).await.unwrap();
        assert_eq!(profile.signal_source, SignalSource::ExplicitActivity);
        assert_eq!(profile.primary_domain(), Some("nephrology"));
        assert_eq!(profile.activity_level, ActivityLevel::Moderate);
        assert!((profile.confidence("nephrology") - 0.95).abs() < 1e-6);
        let cardio = profile.confidence("cardiology");
        assert!((0.80..0.95).contains(&cardio), "cardiology {}", cardio);

        // Lower rungs are never consulted once saved items produce domains.
        assert_eq!(*store.calls.lock().unwrap(), vec!["saved_items"]);
    }

    #[tokio::test]
    async fn test_collection_inference_when_no_saved_items() {
        let (builder, store) = builder(MemorySignals {
            collections: vec![collection("Tumor immunology")],
            subject_area: Some("Nephrology".to_string()),
            ..Default::default()
        });

        let profile = builder.build(Uuid::new_v4(), None).await.unwrap();
        assert_eq!(profile.signal_source, SignalSource::CollectionInference);
        assert_eq!(profile.activity_level, ActivityLevel::New);
        for d in &profile.primary_domains {
            let c = profile.confidence(d);
            assert!((0.60..=0.75).contains(&c), "{} {}", d, c);
        }
        assert!(!store.calls.lock().unwrap().contains(&"subject_area"));
    }

    #[tokio::test]
    async fn test_saved_items_without_keywords_fall_through() {
        let (builder, _) = builder(MemorySignals {
            saved: vec![saved("Untitled"), saved("Misc notes")],
            collections: vec![collection("Cardiac imaging")],
            ..Default::default()
        });

        let profile = builder.build(Uuid::new_v4(), None).await.unwrap();
        assert_eq!(profile.signal_source, SignalSource::CollectionInference);
        assert_eq!(profile.primary_domain(), Some("cardiology"));
        assert_eq!(profile.activity_level, ActivityLevel::Moderate);
    }

    #[tokio::test]
    async fn test_subject_area_fallback() {
        let (builder, _) = builder(MemorySignals {
            subject_area: Some("Nephrology".to_string()),
            ..Default::default()
        });

        let profile = builder.build(Uuid::new_v4(), None).await.unwrap();
        assert_eq!(profile.signal_source, SignalSource::SubjectArea);
        assert_eq!(profile.primary_domains, vec!["nephrology".to_string()]);
        assert_eq!(profile.confidence("nephrology"), SUBJECT_AREA_CONFIDENCE);
    }

    #[tokio::test]
    async fn test_blank_subject_area_uses_generic_default() {
        let (builder, _) = builder(MemorySignals {
            subject_area: Some("   ".to_string()),
            ..Default::default()
        });

        let profile = builder.build(Uuid::new_v4(), None).await.unwrap();
        assert_eq!(profile.signal_source, SignalSource::GenericDefault);
    }

    #[tokio::test]
    async fn test_generic_default_for_new_user() {
        let (builder, _) = builder(MemorySignals::default());

        let profile = builder.build(Uuid::new_v4(), None).await.unwrap();
        assert_eq!(profile.signal_source, SignalSource::GenericDefault);
        assert_eq!(profile.activity_level, ActivityLevel::New);
        assert_eq!(profile.primary_domains.len(), GENERIC_DEFAULT_DOMAINS.len());
        for d in &profile.primary_domains {
            assert_eq!(profile.confidence(d), GENERIC_DEFAULT_CONFIDENCE);
        }
    }

    #[tokio::test]
    async fn test_domain_limit_is_respected() {
        let store = Arc::new(MemorySignals {
            saved: vec![saved(
                "Kidney cancer, heart disease, brain imaging and diabetes",
            )],
            ..Default::default()
        });
        let builder = ProfileBuilder::new(store, 2);

        let profile = builder.build(Uuid::new_v4(), None).await.unwrap();
        assert_eq!(profile.primary_domains.len(), 2);
        assert_eq!(profile.domain_confidence.len(), 2);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let (builder, _) = builder(MemorySignals {
            unreachable: true,
            ..Default::default()
        });

        let err = builder.build(Uuid::new_v4(), None).await.unwrap_err();
        assert!(matches!(err, Error::SignalStore(_)));
        assert!(err.is_signal_failure());
    }
}

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    BundleIdentity, BundleIdentityCache, Classification, DependencyRequest, ExternalEntry,
    ExternalMap, ExternalRegistry, RequestClassifier,
};

static NEXT_SESSION_ID: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Classifying,
    /// At least one external has been recorded.
    Registered,
    IdentityComputed,
    Injected,
}

/// The external set as of the end of graph construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedGraph {
    pub identity: BundleIdentity,
    /// Merged snapshot the identity was computed over; the vendor template is
    /// generated from this, so name and content always agree.
    pub externals: ExternalMap,
}

/// State of one host build pass.
///
/// Created when the pass starts and handed by reference to every hook, so
/// independent pipelines never share accumulation state.
#[derive(Debug)]
pub struct BuildSession {
    id: usize,
    registry: ExternalRegistry,
    finalized: Option<FinalizedGraph>,
    phase: SessionPhase,
}

impl Default for BuildSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildSession {
    pub fn new() -> Self {
        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            registry: Default::default(),
            finalized: None,
            phase: SessionPhase::Idle,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn registry(&self) -> &ExternalRegistry {
        &self.registry
    }

    pub fn finalized(&self) -> Option<&FinalizedGraph> {
        self.finalized.as_ref()
    }

    /// Classifies one dependency and, if external, registers it.
    pub fn observe_dependency(
        &mut self,
        classifier: &RequestClassifier<'_>,
        dependency: &DependencyRequest,
    ) -> Classification {
        if self.finalized.is_some() {
            tracing::warn!(
                "session {} observed {:?} after graph finalization",
                self.id,
                dependency.request
            );
        }
        let classification = classifier.classify(dependency);
        tracing::trace!("classified {:?} as {:?}", dependency.request, classification);
        if let Classification::External { resolved_identity } = &classification {
            self.registry.register(ExternalEntry {
                request: dependency.request.clone(),
                resolved_identity: resolved_identity.clone(),
            });
        }
        if self.finalized.is_none() {
            self.transition(if self.registry.is_empty() {
                SessionPhase::Classifying
            } else {
                SessionPhase::Registered
            });
        }
        classification
    }

    /// Computes the identity once per session; later calls return the same
    /// result without touching the cache again.
    pub fn finalize_graph(&mut self, cache: &mut BundleIdentityCache) -> &FinalizedGraph {
        let finalized = match self.finalized.take() {
            Some(finalized) => finalized,
            None => {
                let identity = cache.compute_identity(&self.registry);
                self.transition(SessionPhase::IdentityComputed);
                FinalizedGraph {
                    identity,
                    externals: cache.snapshot().clone(),
                }
            }
        };
        self.finalized.insert(finalized)
    }

    pub fn mark_injected(&mut self) {
        self.transition(SessionPhase::Injected);
    }

    fn transition(&mut self, next: SessionPhase) {
        if self.phase != next {
            tracing::trace!("session {} {:?} -> {:?}", self.id, self.phase, next);
            self.phase = next;
        }
    }
}

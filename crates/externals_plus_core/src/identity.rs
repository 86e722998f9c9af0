use std::fmt;

use sha2::{Digest, Sha256};

use crate::{ExternalMap, ExternalRegistry, SnapshotPolicy};

const HASH_LEN: usize = 32;

/// Content-addressed name of a vendor bundle, `vendor.<hash>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BundleIdentity(String);

impl BundleIdentity {
    /// Hashes keys and values in map order. Each field is length-prefixed so
    /// that no two distinct maps share an encoding.
    pub fn of(externals: &ExternalMap) -> Self {
        let mut hasher = Sha256::new();
        for (request, resolved) in externals {
            hasher.update((request.len() as u64).to_le_bytes());
            hasher.update(request.as_bytes());
            hasher.update((resolved.len() as u64).to_le_bytes());
            hasher.update(resolved.as_bytes());
        }
        let mut hash = hex::encode(hasher.finalize());
        hash.truncate(HASH_LEN);
        Self(format!("vendor.{}", hash))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn digest(&self) -> &str {
        self.0.trim_start_matches("vendor.")
    }

    pub fn file_name(&self, ext: &str) -> String {
        format!("{}.{}", self.0, ext)
    }
}

impl fmt::Display for BundleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Process-lifetime memory of the external set, merged with every pass.
#[derive(Debug, Default)]
pub struct BundleIdentityCache {
    policy: SnapshotPolicy,
    snapshot: ExternalMap,
}

impl BundleIdentityCache {
    pub fn new(policy: SnapshotPolicy) -> Self {
        Self {
            policy,
            snapshot: Default::default(),
        }
    }

    pub fn policy(&self) -> SnapshotPolicy {
        self.policy
    }

    pub fn snapshot(&self) -> &ExternalMap {
        &self.snapshot
    }

    /// Merges `registry` into the snapshot and names the result.
    ///
    /// Under [`SnapshotPolicy::Retain`] an entry already in the snapshot keeps
    /// its value; new requests are added. The map is ordered, so discovery
    /// order never reaches the digest.
    pub fn compute_identity(&mut self, registry: &ExternalRegistry) -> BundleIdentity {
        match self.policy {
            SnapshotPolicy::Retain => {
                registry.iter().for_each(|(request, resolved)| {
                    self.snapshot
                        .entry(request.clone())
                        .or_insert_with(|| resolved.clone());
                });
            }
            SnapshotPolicy::Replace => {
                self.snapshot = registry.snapshot();
            }
        }
        let identity = BundleIdentity::of(&self.snapshot);
        tracing::trace!(
            "bundle identity {} over {} externals",
            identity,
            self.snapshot.len()
        );
        identity
    }
}

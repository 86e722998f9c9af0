use std::collections::BTreeMap;

use hashbrown::HashMap;

/// Externals ordered by request. Used wherever output must be reproducible.
pub type ExternalMap = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalEntry {
    pub request: String,
    pub resolved_identity: String,
}

/// Externals discovered during one build pass.
#[derive(Debug, Default, Clone)]
pub struct ExternalRegistry {
    externals: HashMap<String, String>,
}

impl ExternalRegistry {
    /// Re-registering a request overwrites; classification is deterministic
    /// for a fixed request so the value cannot change within a pass.
    pub fn register(&mut self, entry: ExternalEntry) {
        self.externals.insert(entry.request, entry.resolved_identity);
    }

    pub fn get(&self, request: &str) -> Option<&str> {
        self.externals.get(request).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.externals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.externals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.externals.iter()
    }

    pub fn snapshot(&self) -> ExternalMap {
        self.externals
            .iter()
            .map(|(request, resolved)| (request.clone(), resolved.clone()))
            .collect()
    }
}

impl FromIterator<(String, String)> for ExternalRegistry {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut registry = ExternalRegistry::default();
        iter.into_iter()
            .for_each(|(request, resolved_identity)| {
                registry.register(ExternalEntry {
                    request,
                    resolved_identity,
                })
            });
        registry
    }
}

use std::path::Path;

use hashbrown::HashMap;
use sugar_path::SugarPath;

use crate::NormalizedInputOptions;

/// A module reference as written by the importer, together with the
/// directory it is resolved relative to.
#[derive(Debug, Hash, PartialEq, Eq, Clone)]
pub struct DependencyRequest {
    pub context: String,
    pub request: String,
}

impl DependencyRequest {
    pub fn new(context: impl Into<String>, request: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            request: request.into().replace('\\', "/"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Bundle,
    External { resolved_identity: String },
}

impl Classification {
    pub fn is_external(&self) -> bool {
        matches!(self, Classification::External { .. })
    }

    pub fn resolved_identity(&self) -> Option<&str> {
        match self {
            Classification::External { resolved_identity } => Some(resolved_identity),
            Classification::Bundle => None,
        }
    }
}

/// Decides whether a dependency is bundled or deferred to the vendor bundle.
///
/// The decision is a pure function of the request, its context and the
/// options; it never fails and never touches the filesystem.
#[derive(Debug, Clone, Copy)]
pub struct RequestClassifier<'a> {
    alias: &'a HashMap<String, String>,
    internal_prefix: &'a str,
    nested_marker: &'a str,
}

impl<'a> RequestClassifier<'a> {
    pub fn new(options: &'a NormalizedInputOptions) -> Self {
        Self {
            alias: &options.alias,
            internal_prefix: &options.internal_prefix,
            nested_marker: &options.nested_marker,
        }
    }

    pub fn classify(&self, dependency: &DependencyRequest) -> Classification {
        let request = dependency.request.as_str();

        if self.is_bundle_controlled(request) {
            if is_path_shaped(request) && self.traverses_nested_dependency(request) {
                return Classification::External {
                    resolved_identity: resolve_absolute(&dependency.context, request),
                };
            }
            return Classification::Bundle;
        }

        if self.is_aliased(request) {
            Classification::Bundle
        } else {
            Classification::External {
                resolved_identity: request.to_string(),
            }
        }
    }

    /// Relative, absolute and loader-syntax requests, plus the host's own
    /// internal requests.
    fn is_bundle_controlled(&self, request: &str) -> bool {
        request.starts_with(['.', '/', '!'])
            || (!self.internal_prefix.is_empty() && request.starts_with(self.internal_prefix))
    }

    fn traverses_nested_dependency(&self, request: &str) -> bool {
        !self.nested_marker.is_empty() && request.contains(self.nested_marker)
    }

    fn is_aliased(&self, request: &str) -> bool {
        let leading = request.split('/').next().unwrap_or(request);
        self.alias.contains_key(leading)
    }
}

/// Loader chains and internal requests are not filesystem paths, so only
/// relative and absolute requests can be resolved against the context.
fn is_path_shaped(request: &str) -> bool {
    request.starts_with(['.', '/'])
}

fn resolve_absolute(context: &str, request: &str) -> String {
    Path::new(context)
        .join(request)
        .absolutize()
        .to_string_lossy()
        .replace('\\', "/")
}

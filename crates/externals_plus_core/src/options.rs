use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{default_asset_rules, AssetRule, OptionsError};

pub const DEFAULT_NAMESPACE: &str = "ExternalsPlus";
pub const DEFAULT_INTERNAL_PREFIX: &str = "webpack";
pub const DEFAULT_NESTED_MARKER: &str = "node_modules";

/// What happens to snapshot entries the current build pass did not observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SnapshotPolicy {
    /// Keep them. The identity stays stable under partial graph traversal, at
    /// the price of removed dependencies lingering until the process exits.
    #[default]
    Retain,
    /// The snapshot becomes exactly the externals of the latest pass.
    Replace,
}

/// Options as written by the user, e.g. in a JSON config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputOptions {
    pub output_path: String,
    #[serde(default)]
    pub public_path: Option<String>,
    /// Dev-server content base; overrides `output_path` when present.
    #[serde(default)]
    pub content_base: Option<String>,
    #[serde(default)]
    pub alias: HashMap<String, String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub internal_prefix: Option<String>,
    #[serde(default)]
    pub nested_marker: Option<String>,
    #[serde(default)]
    pub snapshot_policy: SnapshotPolicy,
    #[serde(default)]
    pub asset_rules: Option<Vec<AssetRule>>,
}

impl InputOptions {
    pub fn from_json(source: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn normalize(self) -> Result<NormalizedInputOptions, OptionsError> {
        let asset_rules = self.asset_rules.unwrap_or_else(default_asset_rules);
        for rule in &asset_rules {
            rule.validate()
                .map_err(|source| OptionsError::InvalidAssetRule {
                    test: rule.test.clone(),
                    source,
                })?;
        }
        Ok(NormalizedInputOptions {
            output_path: self.output_path,
            public_path: self.public_path.unwrap_or_default(),
            content_base: self.content_base,
            alias: self.alias,
            namespace: self
                .namespace
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            internal_prefix: self
                .internal_prefix
                .unwrap_or_else(|| DEFAULT_INTERNAL_PREFIX.to_string()),
            nested_marker: self
                .nested_marker
                .unwrap_or_else(|| DEFAULT_NESTED_MARKER.to_string()),
            snapshot_policy: self.snapshot_policy,
            asset_rules,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NormalizedInputOptions {
    pub output_path: String,
    pub public_path: String,
    pub content_base: Option<String>,
    /// First-party path prefixes. Only the keys matter for classification.
    pub alias: HashMap<String, String>,
    pub namespace: String,
    pub internal_prefix: String,
    pub nested_marker: String,
    pub snapshot_policy: SnapshotPolicy,
    pub asset_rules: Vec<AssetRule>,
}

impl Default for NormalizedInputOptions {
    fn default() -> Self {
        Self {
            output_path: "dist".to_string(),
            public_path: Default::default(),
            content_base: None,
            alias: Default::default(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            internal_prefix: DEFAULT_INTERNAL_PREFIX.to_string(),
            nested_marker: DEFAULT_NESTED_MARKER.to_string(),
            snapshot_policy: SnapshotPolicy::default(),
            asset_rules: default_asset_rules(),
        }
    }
}

/// Where the vendor bundle is written and the URL prefix it is served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputVars {
    pub output_path: String,
    pub public_path: String,
}

impl NormalizedInputOptions {
    pub fn output_vars(&self) -> OutputVars {
        let output_path = self
            .content_base
            .clone()
            .unwrap_or_else(|| self.output_path.clone());
        let mut public_path = self.public_path.clone();
        if !public_path.ends_with('/') {
            public_path.push('/');
        }
        OutputVars {
            output_path,
            public_path,
        }
    }
}

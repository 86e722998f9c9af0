use std::{
    collections::BTreeMap,
    fmt::Debug,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::{AssetRule, BundleIdentity, VendorError, TEMPLATE_EXT, VENDOR_EXT};

/// Everything the host needs to compile the vendor entry on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorBuildConfig {
    /// Chunk name to entry file.
    pub entry: BTreeMap<String, PathBuf>,
    pub output_path: PathBuf,
    pub filename: String,
    pub rules: Vec<AssetRule>,
}

#[derive(Debug, Default, Clone)]
pub struct VendorBuildStats {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl VendorBuildStats {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// The host's ability to run an independent build of an entry plus loader
/// rules into a named output.
#[async_trait]
pub trait VendorCompiler: Debug + Send + Sync {
    async fn compile(&self, config: VendorBuildConfig) -> anyhow::Result<VendorBuildStats>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorBuildOutcome {
    /// An artifact with this identity was already on disk.
    Skipped,
    Built,
    /// Logged and swallowed; the primary build is unaffected.
    Failed,
}

#[derive(Debug)]
pub struct VendorBuildRunner {
    compiler: Arc<dyn VendorCompiler>,
    rules: Vec<AssetRule>,
    locks: DashMap<BundleIdentity, Arc<Mutex<()>>>,
}

impl VendorBuildRunner {
    pub fn new(compiler: Arc<dyn VendorCompiler>, rules: Vec<AssetRule>) -> Self {
        Self {
            compiler,
            rules,
            locks: Default::default(),
        }
    }

    pub fn vendor_path(output_path: &Path, identity: &BundleIdentity) -> PathBuf {
        output_path.join(identity.file_name(VENDOR_EXT))
    }

    pub fn template_path(output_path: &Path, identity: &BundleIdentity) -> PathBuf {
        output_path.join(identity.file_name(TEMPLATE_EXT))
    }

    /// Builds `output_path/<identity>.js` unless it already exists.
    ///
    /// The existence check and the build happen under a lock keyed by the
    /// identity, so concurrent callers with the same identity compile once.
    #[instrument(skip(self, identity, template), fields(identity = %identity))]
    pub async fn ensure_vendor_bundle(
        &self,
        identity: &BundleIdentity,
        output_path: &Path,
        template: &str,
    ) -> Result<VendorBuildOutcome, VendorError> {
        tracing::info!("compiling vendor bundle");

        tokio::fs::create_dir_all(output_path)
            .await
            .map_err(|source| VendorError::CreateOutputDir {
                path: output_path.to_path_buf(),
                source,
            })?;

        let lock = self.locks.entry(identity.clone()).or_default().clone();
        let outcome = {
            let _guard = lock.lock().await;
            self.build_if_missing(identity, output_path, template).await
        };
        drop(lock);
        self.locks.remove_if(identity, |_, held| Arc::strong_count(held) == 1);
        outcome
    }

    async fn build_if_missing(
        &self,
        identity: &BundleIdentity,
        output_path: &Path,
        template: &str,
    ) -> Result<VendorBuildOutcome, VendorError> {
        let vendor_path = Self::vendor_path(output_path, identity);
        if tokio::fs::try_exists(&vendor_path).await.unwrap_or(false) {
            tracing::info!("vendor bundle {:?} is up to date", vendor_path);
            return Ok(VendorBuildOutcome::Skipped);
        }

        let template_path = Self::template_path(output_path, identity);
        write_atomic(&template_path, template).await?;

        let config = VendorBuildConfig {
            entry: BTreeMap::from([(identity.to_string(), template_path)]),
            output_path: output_path.to_path_buf(),
            filename: "[name].js".to_string(),
            rules: self.rules.clone(),
        };

        match self.compiler.compile(config).await {
            Ok(stats) if !stats.has_errors() => {
                tracing::info!("vendor bundle compiled successfully");
                Ok(VendorBuildOutcome::Built)
            }
            Ok(stats) => {
                tracing::error!(errors = ?stats.errors, "vendor bundle compilation failed");
                Ok(VendorBuildOutcome::Failed)
            }
            Err(err) => {
                tracing::error!("vendor bundle compilation failed: {:#}", err);
                Ok(VendorBuildOutcome::Failed)
            }
        }
    }
}

/// Writes through a temp file in the same directory, then renames into
/// place, so a reader never observes a half-written template.
async fn write_atomic(path: &Path, contents: &str) -> Result<(), VendorError> {
    let target = path.to_path_buf();
    let contents = contents.to_string();
    tokio::task::spawn_blocking(move || -> io::Result<()> {
        let dir = target.parent().unwrap_or_else(|| Path::new("."));
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(contents.as_bytes())?;
        file.persist(&target).map_err(|err| err.error)?;
        Ok(())
    })
    .await
    .map_err(|err| io::Error::new(io::ErrorKind::Other, err))
    .and_then(|written| written)
    .map_err(|source| VendorError::WriteTemplate {
        path: path.to_path_buf(),
        source,
    })
}

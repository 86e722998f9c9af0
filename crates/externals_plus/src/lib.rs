use std::{path::PathBuf, sync::Arc};

pub use externals_plus_core::*;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct ResolveArgs<'a> {
    /// Directory the request is resolved relative to.
    pub context: &'a str,
    pub request: &'a str,
}

/// Moves third-party dependencies out of the main bundle and into a vendor
/// bundle that is rebuilt only when the external set changes.
///
/// The host drives one [`BuildSession`] per build pass through three hooks:
/// [`resolve`](Self::resolve) for every dependency,
/// [`build_done`](Self::build_done) once the graph is complete, and
/// [`before_html_processing`](Self::before_html_processing) when the HTML
/// generator is about to render. The last two may come in either order.
#[derive(Debug)]
pub struct ExternalsPlus {
    options: Arc<NormalizedInputOptions>,
    identity_cache: BundleIdentityCache,
    runner: Arc<VendorBuildRunner>,
}

impl ExternalsPlus {
    pub fn new(options: NormalizedInputOptions, compiler: Arc<dyn VendorCompiler>) -> Self {
        let runner = VendorBuildRunner::new(compiler, options.asset_rules.clone());
        Self {
            identity_cache: BundleIdentityCache::new(options.snapshot_policy),
            options: Arc::new(options),
            runner: Arc::new(runner),
        }
    }

    pub fn options(&self) -> &NormalizedInputOptions {
        &self.options
    }

    pub fn identity_cache(&self) -> &BundleIdentityCache {
        &self.identity_cache
    }

    pub fn begin_build(&self) -> BuildSession {
        let session = BuildSession::new();
        tracing::debug!("build session {} started", session.id());
        session
    }

    /// `None` means "resolve normally"; otherwise the host substitutes the
    /// request with the returned runtime lookup.
    pub fn resolve(
        &self,
        session: &mut BuildSession,
        args: ResolveArgs<'_>,
    ) -> Option<ExternalReference> {
        let dependency = DependencyRequest::new(args.context, args.request);
        let classifier = RequestClassifier::new(&self.options);
        session
            .observe_dependency(&classifier, &dependency)
            .is_external()
            .then(|| ExternalReference::global(&self.options.namespace, &dependency.request))
    }

    /// Computes the identity and schedules the vendor build on a fresh task.
    ///
    /// Returns immediately; the host's own completion is never blocked on the
    /// vendor bundle. Errors are logged here and only surface through the
    /// handle. Must be called within a tokio runtime.
    pub fn build_done(
        &mut self,
        session: &mut BuildSession,
    ) -> JoinHandle<Result<VendorBuildOutcome, VendorError>> {
        let finalized = session.finalize_graph(&mut self.identity_cache).clone();
        let template = generate_entry_template(&self.options.namespace, &finalized.externals);
        let output_path = PathBuf::from(self.options.output_vars().output_path);
        let runner = self.runner.clone();
        let session_id = session.id();

        tokio::spawn(async move {
            tokio::task::yield_now().await;
            let result = runner
                .ensure_vendor_bundle(&finalized.identity, &output_path, &template)
                .await;
            match &result {
                Ok(outcome) => {
                    tracing::debug!("session {} vendor bundle {:?}", session_id, outcome)
                }
                Err(err) => {
                    tracing::error!("session {} vendor bundle aborted: {}", session_id, err)
                }
            }
            result
        })
    }

    /// Prepends the vendor script to the HTML generator's assets.
    pub fn before_html_processing(
        &mut self,
        session: &mut BuildSession,
        data: &mut HtmlPluginData,
    ) {
        let identity = session.finalize_graph(&mut self.identity_cache).identity.clone();
        let public_path = self.options.output_vars().public_path;
        inject_vendor_reference(&mut data.assets, &public_path, &identity);
        session.mark_injected();
    }

    /// Public URL of the vendor bundle for a finalized session.
    pub fn vendor_url(&self, session: &BuildSession) -> Option<String> {
        session.finalized().map(|finalized| {
            vendor_public_url(&self.options.output_vars().public_path, &finalized.identity)
        })
    }
}

pub fn externals_plus(
    options: NormalizedInputOptions,
    compiler: Arc<dyn VendorCompiler>,
) -> ExternalsPlus {
    ExternalsPlus::new(options, compiler)
}

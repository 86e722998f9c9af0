
use std::sync::Arc;

use externals_plus::{
    externals_plus, log::enable_tracing_by_env, BundleIdentity, ExternalMap, ResolveArgs,
    SessionPhase, SnapshotPolicy, VendorBuildOutcome, VendorBuildRunner,
};

use crate::common::{fixture_options, run_pass, test_plugin, RecordingCompiler, SRC};

#[tokio::test]
async fn bare_requests_become_global_lookups() {
    enable_tracing_by_env();
    let dir = tempfile::tempdir().unwrap();
    let (plugin, _) = test_plugin(dir.path());
    let mut session = plugin.begin_build();

    let lodash = plugin.resolve(&mut session, ResolveArgs { context: SRC, request: "lodash" });
    let app = plugin.resolve(&mut session, ResolveArgs { context: SRC, request: "./App" });
    let button = plugin.resolve(
        &mut session,
        ResolveArgs {
            context: SRC,
            request: "components/Button",
        },
    );

    assert_eq!(
        lodash.unwrap().expression,
        "window['ExternalsPlus']['lodash']"
    );
    assert!(app.is_none());
    assert!(button.is_none());
    assert_eq!(session.registry().len(), 1);
}

#[tokio::test]
async fn vendor_bundle_is_built_and_injected_first() {
    enable_tracing_by_env();
    let dir = tempfile::tempdir().unwrap();
    let (mut plugin, compiler) = test_plugin(dir.path());

    let pass = run_pass(
        &mut plugin,
        &["./App", "lodash", "react", "../node_modules/legacy/index.js"],
    )
    .await;

    assert_eq!(pass.outcome, VendorBuildOutcome::Built);
    assert_eq!(pass.session.phase(), SessionPhase::Injected);
    assert_eq!(compiler.calls(), 1);

    let identity = pass.session.finalized().unwrap().identity.clone();
    assert_eq!(
        pass.html.assets.js,
        vec![format!("/assets/{}.js", identity), "/assets/main.js".to_string()]
    );
    assert_eq!(plugin.vendor_url(&pass.session), Some(pass.html.assets.js[0].clone()));

    let dist = dir.path().join("dist");
    let vendor = std::fs::read_to_string(VendorBuildRunner::vendor_path(&dist, &identity)).unwrap();
    assert_eq!(
        vendor,
        "window['ExternalsPlus'] = {\n\
         '../node_modules/legacy/index.js': require('/project/node_modules/legacy/index.js'),\n\
         'lodash': require('lodash'),\n\
         'react': require('react'),\n\
         }"
    );
    assert!(VendorBuildRunner::template_path(&dist, &identity).exists());

    let configs = compiler.configs.lock().unwrap();
    let config = &configs[0];
    assert_eq!(config.filename, "[name].js");
    assert_eq!(config.rules, plugin.options().asset_rules);
    assert_eq!(
        config.entry.get(identity.as_str()),
        Some(&VendorBuildRunner::template_path(&dist, &identity))
    );
}

#[tokio::test]
async fn unchanged_externals_do_not_rebuild() {
    let dir = tempfile::tempdir().unwrap();
    let (mut plugin, compiler) = test_plugin(dir.path());

    let first = run_pass(&mut plugin, &["lodash", "react"]).await;
    let second = run_pass(&mut plugin, &["react", "lodash", "./App"]).await;

    assert_eq!(first.outcome, VendorBuildOutcome::Built);
    assert_eq!(second.outcome, VendorBuildOutcome::Skipped);
    assert_eq!(first.html.assets.js[0], second.html.assets.js[0]);
    assert_eq!(compiler.calls(), 1);
}

#[tokio::test]
async fn new_process_reuses_vendor_bundle_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let (mut first_process, _) = test_plugin(dir.path());
    run_pass(&mut first_process, &["lodash"]).await;

    let (mut second_process, compiler) = test_plugin(dir.path());
    let pass = run_pass(&mut second_process, &["lodash"]).await;

    assert_eq!(pass.outcome, VendorBuildOutcome::Skipped);
    assert_eq!(compiler.calls(), 0);
}

#[tokio::test]
async fn partial_pass_keeps_previous_identity() {
    let dir = tempfile::tempdir().unwrap();
    let (mut plugin, compiler) = test_plugin(dir.path());

    let full = run_pass(&mut plugin, &["lodash", "./vendor/legacy.js[node_modules]"]).await;
    let partial = run_pass(&mut plugin, &["lodash"]).await;

    let expected = BundleIdentity::of(&ExternalMap::from([
        (
            "./vendor/legacy.js[node_modules]".to_string(),
            "/project/src/vendor/legacy.js[node_modules]".to_string(),
        ),
        ("lodash".to_string(), "lodash".to_string()),
    ]));
    assert_eq!(full.session.finalized().unwrap().identity, expected);
    assert_eq!(partial.session.finalized().unwrap().identity, expected);
    assert_eq!(partial.outcome, VendorBuildOutcome::Skipped);
    assert_eq!(compiler.calls(), 1);
}

#[tokio::test]
async fn replace_policy_rebuilds_after_removal() {
    let dir = tempfile::tempdir().unwrap();
    let compiler = Arc::new(RecordingCompiler::default());
    let options = externals_plus::NormalizedInputOptions {
        snapshot_policy: SnapshotPolicy::Replace,
        ..fixture_options(dir.path())
    };
    let mut plugin = externals_plus(options, compiler.clone());

    let full = run_pass(&mut plugin, &["lodash", "react"]).await;
    let trimmed = run_pass(&mut plugin, &["lodash"]).await;

    assert_ne!(
        full.session.finalized().unwrap().identity,
        trimmed.session.finalized().unwrap().identity
    );
    assert_eq!(trimmed.outcome, VendorBuildOutcome::Built);
    assert_eq!(plugin.identity_cache().snapshot().len(), 1);
    assert_eq!(compiler.calls(), 2);
}

#[tokio::test]
async fn failed_vendor_build_still_injects() {
    let dir = tempfile::tempdir().unwrap();
    let compiler = Arc::new(RecordingCompiler {
        fail: true,
        ..Default::default()
    });
    let mut plugin = externals_plus(fixture_options(dir.path()), compiler.clone());

    let pass = run_pass(&mut plugin, &["lodash"]).await;

    assert_eq!(pass.outcome, VendorBuildOutcome::Failed);
    assert_eq!(pass.session.phase(), SessionPhase::Injected);
    assert!(pass.html.assets.js[0].starts_with("/assets/vendor."));

    // nothing was emitted, so the next pass tries again
    let retry = run_pass(&mut plugin, &["lodash"]).await;
    assert_eq!(retry.outcome, VendorBuildOutcome::Failed);
    assert_eq!(compiler.calls(), 2);
}

#[tokio::test]
async fn html_hook_before_done_uses_the_same_identity() {
    let dir = tempfile::tempdir().unwrap();
    let (mut plugin, compiler) = test_plugin(dir.path());
    let mut session = plugin.begin_build();
    plugin.resolve(&mut session, ResolveArgs { context: SRC, request: "vue" });

    let mut html = Default::default();
    plugin.before_html_processing(&mut session, &mut html);
    let outcome = plugin.build_done(&mut session).await.unwrap().unwrap();

    let identity = &session.finalized().unwrap().identity;
    assert_eq!(html.assets.js, vec![format!("/assets/{}.js", identity)]);
    assert_eq!(outcome, VendorBuildOutcome::Built);
    assert_eq!(compiler.calls(), 1);
}

#[tokio::test]
async fn content_base_redirects_vendor_output() {
    let dir = tempfile::tempdir().unwrap();
    let compiler = Arc::new(RecordingCompiler::default());
    let public = dir.path().join("public");
    let options = externals_plus::NormalizedInputOptions {
        content_base: Some(public.to_string_lossy().to_string()),
        ..fixture_options(dir.path())
    };
    let mut plugin = externals_plus(options, compiler);

    let pass = run_pass(&mut plugin, &["lodash"]).await;

    let identity = &pass.session.finalized().unwrap().identity;
    assert!(VendorBuildRunner::vendor_path(&public, identity).exists());
    assert!(!dir.path().join("dist").exists());
}

#[tokio::test]
async fn independent_plugins_do_not_share_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let (mut left, _) = test_plugin(&dir.path().join("left"));
    let (mut right, _) = test_plugin(&dir.path().join("right"));

    run_pass(&mut left, &["lodash", "react"]).await;
    let pass = run_pass(&mut right, &["lodash"]).await;

    assert_eq!(right.identity_cache().snapshot().len(), 1);
    assert_eq!(
        pass.session.finalized().unwrap().identity,
        BundleIdentity::of(&ExternalMap::from([("lodash".to_string(), "lodash".to_string())]))
    );
}

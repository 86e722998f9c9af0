use crate::{BundleIdentity, VENDOR_EXT};

/// Asset lists the HTML generator turns into tags.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HtmlAssets {
    pub js: Vec<String>,
    pub css: Vec<String>,
}

/// What the HTML generator exposes to its before-processing hook.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HtmlPluginData {
    pub assets: HtmlAssets,
    pub html: String,
    pub output_name: String,
}

pub fn vendor_public_url(public_path: &str, identity: &BundleIdentity) -> String {
    format!("{}{}", public_path, identity.file_name(VENDOR_EXT))
}

/// Puts the vendor script first so the namespace is populated before any
/// other bundle reads from it.
pub fn inject_vendor_reference(
    assets: &mut HtmlAssets,
    public_path: &str,
    identity: &BundleIdentity,
) {
    let url = vendor_public_url(public_path, identity);
    assets.js.retain(|existing| existing != &url);
    assets.js.insert(0, url);
}

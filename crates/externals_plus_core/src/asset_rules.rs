use serde::{Deserialize, Serialize};

const INLINE_LIMIT: u64 = 10240;

/// A loader rule handed verbatim to the secondary vendor build.
///
/// The rule is never executed here; `test` is only checked to be a valid
/// pattern so that a typo fails at option normalization instead of deep
/// inside the host compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRule {
    pub test: String,
    pub loader: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<LoaderOptions>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
}

impl AssetRule {
    pub fn new(test: &str, loader: &str) -> Self {
        Self {
            test: test.to_string(),
            loader: loader.to_string(),
            options: None,
        }
    }

    fn emitting(mut self, name: &str, limit: Option<u64>, mimetype: Option<&str>) -> Self {
        self.options = Some(LoaderOptions {
            limit,
            name: name.to_string(),
            mimetype: mimetype.map(str::to_string),
        });
        self
    }

    pub fn validate(&self) -> Result<(), regex::Error> {
        regex::Regex::new(&self.test).map(|_| ())
    }
}

/// Image, font and style rules needed to resolve transitive asset references
/// inside externalized modules.
pub fn default_asset_rules() -> Vec<AssetRule> {
    let limit = Some(INLINE_LIMIT);
    vec![
        AssetRule::new(r"\.(gif|jpg|png|woff|eot|ttf)\??.*$", "url-loader").emitting(
            "images/[name].[ext]?[hash]",
            limit,
            None,
        ),
        AssetRule::new(r"\.woff(#\w*)*$", "url-loader").emitting(
            "fonts/[name].[ext]",
            limit,
            Some("application/font-woff"),
        ),
        AssetRule::new(r"\.woff2(#\w*)*$", "url-loader").emitting(
            "fonts/[name].[ext]",
            limit,
            Some("application/font-woff"),
        ),
        AssetRule::new(r"\.ttf(#\w*)*$", "url-loader").emitting(
            "fonts/[name].[ext]",
            limit,
            Some("application/octet-stream"),
        ),
        AssetRule::new(r"\.eot(#\w*)*$", "file-loader").emitting("fonts/[name].[ext]", limit, None),
        AssetRule::new(r"\.svg(#\w*)*$", "url-loader").emitting(
            "fonts/[name].[ext]",
            limit,
            Some("image/svg+xml"),
        ),
        AssetRule::new(r"\.css$", "style-loader!css-loader"),
        AssetRule::new(r"\.styl$", "style-loader!css-loader!stylus-loader"),
        AssetRule::new(r"\.less$", "style-loader!css-loader!less-loader"),
    ]
}

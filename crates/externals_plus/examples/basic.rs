use std::sync::Arc;

use async_trait::async_trait;
use externals_plus::{
    externals_plus, log::enable_tracing_by_env, HtmlPluginData, InputOptions, ResolveArgs,
    VendorBuildConfig, VendorBuildStats, VendorCompiler,
};

/// Emits the entry template unchanged as the vendor bundle.
#[derive(Debug)]
struct CopyCompiler;

#[async_trait]
impl VendorCompiler for CopyCompiler {
    async fn compile(&self, config: VendorBuildConfig) -> anyhow::Result<VendorBuildStats> {
        for (name, entry) in &config.entry {
            let out = config.output_path.join(config.filename.replace("[name]", name));
            tokio::fs::copy(entry, out).await?;
        }
        Ok(VendorBuildStats::default())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    enable_tracing_by_env();
    let root = std::env::temp_dir().join("externals-plus-basic");
    let options = InputOptions::from_json(&format!(
        r#"{{
            "outputPath": {:?},
            "publicPath": "/static",
            "alias": {{ "components": "./src/components" }}
        }}"#,
        root.join("dist").to_string_lossy()
    ))?
    .normalize()?;

    let mut plugin = externals_plus(options, Arc::new(CopyCompiler));
    let mut session = plugin.begin_build();
    for request in ["./App", "react", "react-dom", "components/Button", "./node_modules/legacy.js"] {
        let external = plugin.resolve(
            &mut session,
            ResolveArgs {
                context: "./src",
                request,
            },
        );
        println!("{:<28} {:?}", request, external.map(|e| e.expression));
    }

    let vendor_build = plugin.build_done(&mut session);
    let mut html = HtmlPluginData::default();
    plugin.before_html_processing(&mut session, &mut html);
    println!("scripts {:?}", html.assets.js);
    println!("vendor build {:?}", vendor_build.await??);
    Ok(())
}

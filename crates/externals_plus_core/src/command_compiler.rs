use anyhow::Context;
use async_trait::async_trait;

use crate::{VendorBuildConfig, VendorBuildStats, VendorCompiler};

/// Runs the host bundler as a child process.
///
/// The build config is written as JSON next to the template and its path is
/// appended as the last argument. A non-zero exit status is reported as a
/// failed build, with stderr as the error message.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    program: String,
    args: Vec<String>,
}

impl CommandCompiler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

#[async_trait]
impl VendorCompiler for CommandCompiler {
    async fn compile(&self, config: VendorBuildConfig) -> anyhow::Result<VendorBuildStats> {
        let name = config
            .entry
            .keys()
            .next()
            .cloned()
            .unwrap_or_else(|| "vendor".to_string());
        let config_path = config.output_path.join(format!("{}.config.json", name));
        tokio::fs::write(&config_path, serde_json::to_vec_pretty(&config)?)
            .await
            .with_context(|| format!("fail to write {:?}", config_path))?;

        tracing::debug!("running {} {:?} {:?}", self.program, self.args, config_path);
        let output = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(&config_path)
            .output()
            .await
            .with_context(|| format!("fail to spawn {}", self.program))?;

        let mut stats = VendorBuildStats::default();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            stats.errors.push(if stderr.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                stderr
            });
        }
        Ok(stats)
    }
}

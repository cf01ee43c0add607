#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use toml_config::ClientConfig;

#[cfg(feature = "cli")]
use crate::utils::error::Result;

#[cfg(feature = "cli")]
impl ClientConfig {
    /// 合併設定檔與命令列參數，命令列優先
    pub fn resolve(cli: &CliConfig) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Self::from_file(path)?
            }
            None => {
                let base_url =
                    crate::utils::validation::validate_required_field("api.base_url", &cli.base_url)?;
                Self::with_base_url(base_url.clone())
            }
        };

        if let Some(base_url) = &cli.base_url {
            config.api.base_url = base_url.clone();
        }

        Ok(config)
    }
}

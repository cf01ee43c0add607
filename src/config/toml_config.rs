use crate::domain::model::MissingScorePolicy;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ClientError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub grading: GradingConfig,
    #[serde(default)]
    pub print: PrintConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// 唯一的 API 位址，登入與其他請求都從這裡組出
    pub base_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradingConfig {
    #[serde(default)]
    pub missing_score_policy: MissingScorePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_print_command")]
    pub command: Vec<String>,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            command: default_print_command(),
        }
    }
}

fn default_output_dir() -> String {
    std::env::temp_dir()
        .join("gradebook-print")
        .to_string_lossy()
        .into_owned()
}

fn default_print_command() -> Vec<String> {
    vec!["lp".to_string()]
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    #[serde(default)]
    pub json: bool,
}

impl ClientConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.into(),
            },
            grading: GradingConfig::default(),
            print: PrintConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ClientError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ClientError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GRADEBOOK_API})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ClientError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 列印只需要輸出目錄、列印指令與缺分策略，不檢查 API 位址
    pub fn print_settings(config: Option<&Self>) -> Result<(PrintConfig, MissingScorePolicy)> {
        let (print, policy) = match config {
            Some(config) => (config.print.clone(), config.grading.missing_score_policy),
            None => (PrintConfig::default(), MissingScorePolicy::default()),
        };
        print.validate()?;
        Ok((print, policy))
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api.base_url", &self.api.base_url)?;
        self.print.validate()
    }
}

impl Validate for PrintConfig {
    fn validate(&self) -> Result<()> {
        validate_path("print.output_dir", &self.output_dir)?;

        let program = self.command.first().map(String::as_str).unwrap_or("");
        validate_non_empty_string("print.command", program)?;

        Ok(())
    }
}

impl ConfigProvider for ClientConfig {
    fn base_url(&self) -> &str {
        &self.api.base_url
    }

    fn missing_score_policy(&self) -> MissingScorePolicy {
        self.grading.missing_score_policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = ClientConfig::from_toml_str(
            r#"
[api]
base_url = "https://grades.example.edu"

[grading]
missing_score_policy = "exclude"

[print]
output_dir = "./print"
command = ["lp", "-d", "office"]

[logging]
level = "debug"
json = true
"#,
        )
        .unwrap();

        assert_eq!(config.base_url(), "https://grades.example.edu");
        assert_eq!(config.missing_score_policy(), MissingScorePolicy::Exclude);
        assert_eq!(config.print.command, ["lp", "-d", "office"]);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert!(config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_toml_str(
            r#"
[api]
base_url = "http://localhost:5000"
"#,
        )
        .unwrap();

        assert_eq!(config.missing_score_policy(), MissingScorePolicy::CountAsZero);
        assert_eq!(config.print.command, ["lp"]);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("GRADEBOOK_TEST_API_HOST", "api.example.edu");
        let config = ClientConfig::from_toml_str(
            r#"
[api]
base_url = "https://${GRADEBOOK_TEST_API_HOST}"
"#,
        )
        .unwrap();
        assert_eq!(config.base_url(), "https://api.example.edu");
    }

    #[test]
    fn test_missing_api_section_fails() {
        let result = ClientConfig::from_toml_str("[grading]\n");
        assert!(matches!(
            result,
            Err(ClientError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ClientConfig::with_base_url("ftp://grades.example.edu");
        assert!(config.validate().is_err());

        config.api.base_url = "https://grades.example.edu".to_string();
        config.print.command = vec![];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_print_settings_ignore_base_url() {
        let (print, policy) = ClientConfig::print_settings(None).unwrap();
        assert_eq!(print.command, ["lp"]);
        assert_eq!(policy, MissingScorePolicy::CountAsZero);

        let mut config = ClientConfig::with_base_url("not a url");
        config.grading.missing_score_policy = MissingScorePolicy::Exclude;
        let (_, policy) = ClientConfig::print_settings(Some(&config)).unwrap();
        assert_eq!(policy, MissingScorePolicy::Exclude);

        config.print.command = vec![];
        assert!(matches!(
            ClientConfig::print_settings(Some(&config)),
            Err(ClientError::InvalidConfigValueError { .. })
        ));
    }
}

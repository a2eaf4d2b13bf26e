use crate::utils::error::{ReleaseError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_slug, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional `release.toml` overriding the built-in layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseToml {
    #[serde(default)]
    pub plugin: PluginSection,
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub exclude: ExcludeSection,
    #[serde(default)]
    pub version: VersionSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginSection {
    pub dir: Option<String>,
    pub slug: Option<String>,
    pub bootstrap: Option<String>,
    pub artifact_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsSection {
    pub changelog: Option<String>,
    pub fragments_dir: Option<String>,
    pub readme: Option<String>,
    pub dist: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeSection {
    #[serde(default)]
    pub dirs: Vec<String>,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub suffixes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionSection {
    /// Extra `*_VERSION` style constant names to look for.
    #[serde(default)]
    pub constants: Vec<String>,
}

impl ReleaseToml {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReleaseError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReleaseError::ConfigValidation {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PLUGIN_SLUG})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for ReleaseToml {
    fn validate(&self) -> Result<()> {
        if let Some(dir) = &self.plugin.dir {
            validate_path("plugin.dir", dir)?;
        }
        if let Some(slug) = &self.plugin.slug {
            validate_slug("plugin.slug", slug)?;
        }
        if let Some(prefix) = &self.plugin.artifact_prefix {
            validate_non_empty_string("plugin.artifact_prefix", prefix)?;
        }
        for name in &self.version.constants {
            validate_non_empty_string("version.constants", name)?;
        }
        Ok(())
    }
}

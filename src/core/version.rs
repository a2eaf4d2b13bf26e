use crate::domain::model::Version;
use crate::utils::error::{ReleaseError, Result};
use crate::utils::fs::read_lossy;
use regex::{Regex, RegexBuilder};
use std::path::Path;

const HEADER_PATTERN: &str = r"(?m)^\s*\*?\s*Version:\s*([0-9A-Za-z._-]+)";

/// Resolves a plugin version from its bootstrap file.
///
/// The `Version:` header line wins; otherwise the fallback constants are
/// tried in order (`define('X_VERSION', '1.2.3')` and `const X_VERSION = '1.2.3'`).
#[derive(Debug, Clone)]
pub struct VersionResolver {
    fallbacks: Vec<String>,
}

impl VersionResolver {
    /// Builds the fallback list from a plugin slug, e.g. `order-sentinel`
    /// gives `ORDER_SENTINEL_VERSION`, `ORDERSENTINEL_VERSION` and `VERSION`.
    pub fn for_slug(slug: &str) -> Self {
        let upper = slug.to_uppercase().replace(['-', ' ', '.'], "_");
        let compact = upper.replace('_', "");
        let underscored = regex::escape(&format!("{}_VERSION", upper));
        let compacted = regex::escape(&format!("{}_VERSION", compact));

        Self {
            fallbacks: vec![
                define_pattern(&underscored),
                define_pattern(&compacted),
                const_pattern(&underscored),
                const_pattern("VERSION"),
            ],
        }
    }

    /// Adds extra constant names, tried after the built-in ones.
    pub fn with_constants(mut self, names: &[String]) -> Self {
        for name in names {
            let escaped = regex::escape(name);
            self.fallbacks.push(define_pattern(&escaped));
            self.fallbacks.push(const_pattern(&escaped));
        }
        self
    }

    pub fn resolve(&self, bootstrap: &Path) -> Result<Version> {
        if !bootstrap.is_file() {
            return Err(ReleaseError::MissingInput {
                what: "plugin bootstrap file".to_string(),
                path: bootstrap.to_path_buf(),
            });
        }

        let source = read_lossy(bootstrap)?;
        self.resolve_str(&source)?
            .ok_or_else(|| ReleaseError::VersionNotFound {
                path: bootstrap.to_path_buf(),
            })
    }

    pub fn resolve_str(&self, source: &str) -> Result<Option<Version>> {
        if let Some(version) = header_version(source)? {
            return Ok(Some(version));
        }

        for pattern in &self.fallbacks {
            let re = RegexBuilder::new(pattern).case_insensitive(true).build()?;
            if let Some(caps) = re.captures(source) {
                tracing::debug!("Version taken from constant pattern {}", pattern);
                return Ok(Some(Version::new(&caps[1])));
            }
        }

        Ok(None)
    }
}

fn define_pattern(name: &str) -> String {
    format!(r#"define\s*\(\s*['"]{}['"]\s*,\s*['"]([^'"]+)['"]"#, name)
}

fn const_pattern(name: &str) -> String {
    format!(r#"\bconst\s+{}\s*=\s*['"]([^'"]+)['"]"#, name)
}

fn header_version(source: &str) -> Result<Option<Version>> {
    let re = Regex::new(HEADER_PATTERN)?;
    Ok(re.captures(source).map(|caps| Version::new(&caps[1])))
}

/// Header-only lookup with a default, for quick local ZIP builds.
pub fn resolve_or_default(bootstrap: &Path, default: &str) -> Version {
    match read_lossy(bootstrap) {
        Ok(source) => match header_version(&source) {
            Ok(Some(version)) => version,
            _ => Version::new(default),
        },
        Err(e) => {
            tracing::debug!("Cannot read {}: {}", bootstrap.display(), e);
            Version::new(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "<?php\n/**\n * Plugin Name: OrderSentinel\n * Version: 1.0.37\n * Author: Someone\n */\n";

    #[test]
    fn test_header_version() {
        let resolver = VersionResolver::for_slug("order-sentinel");
        let version = resolver.resolve_str(HEADER).unwrap().unwrap();
        assert_eq!(version.as_str(), "1.0.37");
    }

    #[test]
    fn test_header_without_star() {
        let resolver = VersionResolver::for_slug("order-sentinel");
        let version = resolver.resolve_str("Version: 2.1.0-beta\n").unwrap().unwrap();
        assert_eq!(version.as_str(), "2.1.0-beta");
    }

    #[test]
    fn test_define_fallback() {
        let resolver = VersionResolver::for_slug("order-sentinel");
        let src = "<?php\ndefine( 'ORDER_SENTINEL_VERSION', '0.9.1' );\n";
        assert_eq!(resolver.resolve_str(src).unwrap().unwrap().as_str(), "0.9.1");

        let compact = "<?php\ndefine('ordersentinel_version','0.9.2');\n";
        assert_eq!(resolver.resolve_str(compact).unwrap().unwrap().as_str(), "0.9.2");
    }

    #[test]
    fn test_const_fallback_order() {
        let resolver = VersionResolver::for_slug("order-sentinel");
        let src = "class X {\n  const VERSION = '3.0.0';\n  const ORDER_SENTINEL_VERSION = '2.0.0';\n}\n";
        // the slug constant is tried before the generic one
        assert_eq!(resolver.resolve_str(src).unwrap().unwrap().as_str(), "2.0.0");
    }

    #[test]
    fn test_extra_constant() {
        let resolver =
            VersionResolver::for_slug("order-sentinel").with_constants(&["OS_PLUGIN_VER".to_string()]);
        let src = "define('OS_PLUGIN_VER', '4.4.4');";
        assert_eq!(resolver.resolve_str(src).unwrap().unwrap().as_str(), "4.4.4");
    }

    #[test]
    fn test_no_version() {
        let resolver = VersionResolver::for_slug("order-sentinel");
        assert!(resolver.resolve_str("<?php echo 'hi';").unwrap().is_none());
    }

    #[test]
    fn test_resolve_file_errors() {
        let dir = TempDir::new().unwrap();
        let resolver = VersionResolver::for_slug("order-sentinel");

        let missing = dir.path().join("order-sentinel.php");
        assert!(matches!(
            resolver.resolve(&missing),
            Err(ReleaseError::MissingInput { .. })
        ));

        fs::write(&missing, "<?php\n").unwrap();
        assert!(matches!(
            resolver.resolve(&missing),
            Err(ReleaseError::VersionNotFound { .. })
        ));
    }

    #[test]
    fn test_resolve_or_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plugin.php");
        assert_eq!(resolve_or_default(&path, "0.1.0").as_str(), "0.1.0");

        fs::write(&path, HEADER).unwrap();
        assert_eq!(resolve_or_default(&path, "0.1.0").as_str(), "1.0.37");
    }
}

//! Configuration file parsing for `sift.toml`.
//!
//! ```toml
//! [pagination]
//! default_size = 25
//! max_size = 500
//! request_total = false
//!
//! [sql]
//! dialect = "sqlite"
//!
//! [debug]
//! log_queries = true
//! ```
//!
//! Values of the form `${VAR}` are replaced with the environment variable
//! `VAR` before parsing. Unset variables are left untouched.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{ErrorCode, QueryError, QueryResult};
use crate::page_request::{DEFAULT_PAGE_SIZE, PageRequest};
use crate::sql::DatabaseType;

/// Largest page size engines accept unless configured otherwise.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 1000;

/// Main configuration structure for `sift.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SiftConfig {
    /// Page request defaults and limits.
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// SQL generation settings.
    #[serde(default)]
    pub sql: SqlConfig,

    /// Debug/logging settings.
    #[serde(default)]
    pub debug: DebugConfig,
}

impl SiftConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            QueryError::new(
                ErrorCode::ConfigIo,
                format!("Failed to read {}", path.display()),
            )
            .with_source(e)
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> QueryResult<Self> {
        let expanded = expand_env_vars(content);

        let config: Self = toml::from_str(&expanded).map_err(|e| {
            QueryError::invalid_configuration(format!("Invalid configuration: {}", e.message()))
                .with_source(e)
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> QueryResult<()> {
        let pagination = &self.pagination;
        if pagination.default_size == 0 {
            return Err(QueryError::invalid_configuration(
                "pagination.default_size must be at least 1",
            ));
        }
        if pagination.max_size < pagination.default_size {
            return Err(QueryError::invalid_configuration(format!(
                "pagination.max_size ({}) is smaller than pagination.default_size ({})",
                pagination.max_size, pagination.default_size
            )));
        }
        Ok(())
    }
}

/// Page request defaults and limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PaginationConfig {
    /// Page size used when none is given.
    #[serde(default = "default_size")]
    pub default_size: u32,

    /// Largest page size engines accept.
    #[serde(default = "default_max_size")]
    pub max_size: u32,

    /// Whether requests ask for totals by default.
    #[serde(default = "default_true")]
    pub request_total: bool,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: DEFAULT_MAX_PAGE_SIZE,
            request_total: true,
        }
    }
}

impl PaginationConfig {
    /// An offset request for `page` using the configured defaults.
    pub fn page_request(&self, page: u64) -> QueryResult<PageRequest> {
        PageRequest::of(page, self.default_size, self.request_total)
    }
}

fn default_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_max_size() -> u32 {
    DEFAULT_MAX_PAGE_SIZE
}

fn default_true() -> bool {
    true
}

/// SQL generation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SqlConfig {
    /// Placeholder and quoting dialect.
    #[serde(default)]
    pub dialect: DatabaseType,
}

/// Debug/logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugConfig {
    /// Log every generated SQL statement at info level.
    #[serde(default)]
    pub log_queries: bool,
}

static ENV_VAR: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"\$\{([^}]+)\}").expect("environment variable pattern is valid")
});

/// Expand `${VAR}` references from the environment.
fn expand_env_vars(content: &str) -> String {
    let mut result = content.to_string();

    for cap in ENV_VAR.captures_iter(content) {
        let var_name = &cap[1];
        let full_match = &cap[0];

        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(full_match, &value);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_request::Mode;

    #[test]
    fn test_default_config() {
        let config = SiftConfig::default();
        assert_eq!(config.pagination.default_size, 10);
        assert_eq!(config.pagination.max_size, 1000);
        assert!(config.pagination.request_total);
        assert_eq!(config.sql.dialect, DatabaseType::PostgreSQL);
        assert!(!config.debug.log_queries);
    }

    #[test]
    fn test_parse_empty_config() {
        assert_eq!(SiftConfig::from_str("").unwrap(), SiftConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [pagination]
            default_size = 25
            max_size = 500
            request_total = false

            [sql]
            dialect = "sqlite"

            [debug]
            log_queries = true
        "#;

        let config = SiftConfig::from_str(toml).unwrap();
        assert_eq!(config.pagination.default_size, 25);
        assert_eq!(config.pagination.max_size, 500);
        assert!(!config.pagination.request_total);
        assert_eq!(config.sql.dialect, DatabaseType::SQLite);
        assert!(config.debug.log_queries);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let err = SiftConfig::from_str("[pagination]\npage_size = 5\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
    }

    #[test]
    fn test_inconsistent_sizes_are_rejected() {
        let err = SiftConfig::from_str("[pagination]\ndefault_size = 50\nmax_size = 20\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);

        let err = SiftConfig::from_str("[pagination]\ndefault_size = 0\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
    }

    #[test]
    fn test_env_var_expansion() {
        // SAFETY: test-local variable name, not read by other tests
        unsafe { std::env::set_var("SIFT_TEST_DIALECT", "mysql") };
        let config = SiftConfig::from_str("[sql]\ndialect = \"${SIFT_TEST_DIALECT}\"\n").unwrap();
        assert_eq!(config.sql.dialect, DatabaseType::MySQL);
    }

    #[test]
    fn test_page_request_from_config() {
        let config = SiftConfig::from_str("[pagination]\ndefault_size = 20\nrequest_total = false\n").unwrap();
        let request = config.pagination.page_request(3).unwrap();
        assert_eq!(request.page(), 3);
        assert_eq!(request.size(), 20);
        assert_eq!(request.mode(), Mode::Offset);
        assert!(!request.request_total());
    }

    #[test]
    fn test_missing_file() {
        let err = SiftConfig::from_file("/nonexistent/sift.toml").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigIo);
    }
}

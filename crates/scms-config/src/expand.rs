//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// Bare `$VAR` is left as is.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(LookupError {
                var_name: var.to_owned(),
            }),
        }
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.var_name),
    })
}

struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_var() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("SCMS_TEST_EXPAND_VAR", "/srv/pages");
        }
        let result = expand_env("${SCMS_TEST_EXPAND_VAR}/docs", "content.source_dir").unwrap();
        assert_eq!(result, "/srv/pages/docs");
        unsafe {
            std::env::remove_var("SCMS_TEST_EXPAND_VAR");
        }
    }

    #[test]
    fn test_expand_default() {
        let result = expand_env("${SCMS_TEST_UNSET_VAR:-/wiki}", "render.context_path").unwrap();
        assert_eq!(result, "/wiki");
    }

    #[test]
    fn test_expand_missing_var() {
        let err = expand_env("${SCMS_TEST_MISSING_VAR}", "books.prefix").unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert_eq!(
            err.to_string(),
            "Environment variable error in books.prefix: ${SCMS_TEST_MISSING_VAR} not set"
        );
    }

    #[test]
    fn test_bare_dollar_unchanged() {
        assert_eq!(expand_env("/$root", "render.context_path").unwrap(), "/$root");
    }
}

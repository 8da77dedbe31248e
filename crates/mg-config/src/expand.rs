//! `${VAR}` expansion in configuration strings.

use crate::ConfigError;

/// Unset variable reported by the lookup closure.
struct Unset(String);

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// An unset `${VAR}` without a default is an error naming `field`. Values
/// without `${` are returned as is, so a bare `$` never triggers expansion.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |name| match std::env::var(name) {
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(Unset(name.to_owned())),
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

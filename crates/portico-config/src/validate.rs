//! Validation helpers and parsing utilities for configuration values.

use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// Parse a boolean toggle as written in environment variables or YAML strings.
///
/// # Errors
///
/// Returns `ConfigError::InvalidField` when the value is not a recognised toggle.
pub fn parse_flag(field: &'static str, raw: &str) -> ConfigResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidField {
            field,
            value: Some(raw.to_string()),
            reason: "not_a_boolean",
        }),
    }
}

/// Parse the remote endpoint, accepting only absolute http(s) URLs.
///
/// # Errors
///
/// Returns `ConfigError::InvalidField` when the URL is malformed or not http(s).
pub fn parse_server_url(raw: &str) -> ConfigResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|_| ConfigError::InvalidField {
        field: "server_url",
        value: Some(raw.to_string()),
        reason: "malformed_url",
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidField {
            field: "server_url",
            value: Some(raw.to_string()),
            reason: "unsupported_scheme",
        });
    }
    Ok(url)
}

/// Reject blank identifiers.
///
/// # Errors
///
/// Returns `ConfigError::InvalidField` when `value` is empty after trimming.
pub fn ensure_non_empty(field: &'static str, value: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidField {
            field,
            value: Some(value.to_string()),
            reason: "empty",
        });
    }
    Ok(())
}

/// Derive a locale identifier from a POSIX `LANG` value (`en_US.UTF-8` -> `en_US`).
#[must_use]
pub fn locale_from_lang(lang: &str) -> Option<String> {
    let base = lang
        .split(['.', '@'])
        .next()
        .map(str::trim)
        .unwrap_or_default();
    if base.is_empty() || base.eq_ignore_ascii_case("C") || base.eq_ignore_ascii_case("POSIX") {
        return None;
    }
    Some(base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_flag_accepts_common_spellings() -> ConfigResult<()> {
        assert!(parse_flag("debug", "TrUe")?);
        assert!(parse_flag("debug", " on ")?);
        assert!(!parse_flag("debug", "0")?);
        assert!(!parse_flag("debug", "off")?);
        assert!(matches!(
            parse_flag("debug", "maybe"),
            Err(ConfigError::InvalidField {
                field: "debug",
                reason: "not_a_boolean",
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn parse_server_url_requires_http_scheme() {
        assert!(parse_server_url("https://example.test/config.php").is_ok());
        assert!(matches!(
            parse_server_url("ftp://example.test"),
            Err(ConfigError::InvalidField {
                reason: "unsupported_scheme",
                ..
            })
        ));
        assert!(matches!(
            parse_server_url("not a url"),
            Err(ConfigError::InvalidField {
                reason: "malformed_url",
                ..
            })
        ));
    }

    #[test]
    fn locale_from_lang_strips_encoding_and_modifier() {
        assert_eq!(locale_from_lang("en_US.UTF-8").as_deref(), Some("en_US"));
        assert_eq!(locale_from_lang("de_DE@euro").as_deref(), Some("de_DE"));
        assert_eq!(locale_from_lang("C.UTF-8"), None);
        assert_eq!(locale_from_lang("POSIX"), None);
        assert_eq!(locale_from_lang(""), None);
    }

    #[test]
    fn ensure_non_empty_rejects_whitespace() {
        assert!(ensure_non_empty("store_id", "123").is_ok());
        assert!(ensure_non_empty("store_id", "  ").is_err());
    }
}

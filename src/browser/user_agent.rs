//! User-agent sanitizing.
//!
//! Runtimes append product tokens such as `Electron/28.0.0` or
//! `my-shell/1.2.0`. The shell strips them so the session presents as a
//! generic Chromium browser.

use regex::Regex;

use crate::error::Result;

/// Removes the first ` {token}/{version}` occurrence of each product token.
///
/// Tokens are matched literally. Empty tokens are ignored.
///
/// # Errors
///
/// Returns [`Error::Regex`](crate::Error::Regex) if a pattern cannot be built.
///
/// # Example
///
/// ```
/// use tabbed_shell::browser::sanitize_user_agent;
///
/// let ua = "Mozilla/5.0 (X11) shell/0.1.0 Chrome/120.0 Electron/28.0.0 Safari/537.36";
/// let clean = sanitize_user_agent(ua, &["Electron", "shell"]).unwrap();
/// assert_eq!(clean, "Mozilla/5.0 (X11) Chrome/120.0 Safari/537.36");
/// ```
pub fn sanitize_user_agent(user_agent: &str, tokens: &[&str]) -> Result<String> {
    let mut sanitized = user_agent.to_string();

    for token in tokens.iter().filter(|token| !token.is_empty()) {
        let pattern = Regex::new(&format!(r"\s{}/\S+", regex::escape(token)))?;
        sanitized = pattern.replace(&sanitized, "").into_owned();
    }

    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_runtime_and_app_tokens() {
        let ua = "Mozilla/5.0 (KHTML, like Gecko) shell/0.1.0 Chrome/120 Electron/28.3.3 Safari/537.36";
        let clean = sanitize_user_agent(ua, &["Electron", "shell"]).unwrap();
        assert_eq!(clean, "Mozilla/5.0 (KHTML, like Gecko) Chrome/120 Safari/537.36");
    }

    #[test]
    fn test_token_is_literal() {
        let ua = "Mozilla/5.0 a.b/1.0 axb/2.0";
        let clean = sanitize_user_agent(ua, &["a.b"]).unwrap();
        assert_eq!(clean, "Mozilla/5.0 axb/2.0");
    }

    #[test]
    fn test_missing_token_leaves_ua() {
        let ua = "Mozilla/5.0 Chrome/120";
        assert_eq!(sanitize_user_agent(ua, &["Electron", ""]).unwrap(), ua);
    }

    #[test]
    fn test_only_first_occurrence_removed() {
        let ua = "X shell/1 Y shell/2";
        assert_eq!(sanitize_user_agent(ua, &["shell"]).unwrap(), "X Y shell/2");
    }
}

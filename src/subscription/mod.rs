//! Per-client subscription payloads.
//!
//! Proxy client apps fetch `/sub/{id}` and expect a base64 body plus a
//! `profile-title` header of the form `base64:<encoded title>`. The template
//! is read from disk on every request so edits apply without a restart.
//!
//! No check is made that the id exists in the directory: anyone who knows
//! the URL shape gets a rendered payload for any id.

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::SubscriptionConfig;

/// Header carrying the encoded title.
pub const PROFILE_TITLE_HEADER: &str = "profile-title";

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("subscription template unavailable: {0}")]
    TemplateUnavailable(#[from] std::io::Error),
}

/// An encoded subscription ready to serve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// Base64 of the rendered template.
    pub payload: String,
    /// Value for [`PROFILE_TITLE_HEADER`].
    pub title_header: String,
}

/// Replace every `placeholder` with `identity` and encode the result.
pub fn render(template: &str, placeholder: &str, identity: &str, title: &str) -> Subscription {
    let body = template.replace(placeholder, identity);
    Subscription {
        payload: BASE64_STANDARD.encode(body.as_bytes()),
        title_header: encode_title(title),
    }
}

/// `base64:` prefixed title as understood by client apps.
pub fn encode_title(title: &str) -> String {
    format!("base64:{}", BASE64_STANDARD.encode(title.as_bytes()))
}

/// Reads the template file and renders it with configured title and placeholder.
#[derive(Debug, Clone)]
pub struct SubscriptionRenderer {
    template_path: PathBuf,
    placeholder: String,
    title: String,
}

impl SubscriptionRenderer {
    pub fn new(template_path: impl Into<PathBuf>, config: &SubscriptionConfig) -> Self {
        Self {
            template_path: template_path.into(),
            placeholder: config.placeholder.clone(),
            title: config.title.clone(),
        }
    }

    pub async fn render_for(&self, identity: &str) -> Result<Subscription, SubscriptionError> {
        let template = tokio::fs::read_to_string(&self.template_path).await?;
        Ok(render(&template, &self.placeholder, identity, &self.title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(s: &str) -> String {
        String::from_utf8(BASE64_STANDARD.decode(s).unwrap()).unwrap()
    }

    #[test]
    fn test_render_substitutes_identity() {
        let sub = render("hello $CLIENT$", "$CLIENT$", "bob", "Xray Pult");
        assert_eq!(decode(&sub.payload), "hello bob");
    }

    #[test]
    fn test_render_replaces_every_occurrence() {
        let template = "vless://$CLIENT$@host:443?sni=x#$CLIENT$\nvless://$CLIENT$@alt:443#alt";
        let sub = render(template, "$CLIENT$", "3f1c", "t");
        assert_eq!(
            decode(&sub.payload),
            "vless://3f1c@host:443?sni=x#3f1c\nvless://3f1c@alt:443#alt"
        );
    }

    #[test]
    fn test_title_header() {
        assert_eq!(encode_title("Xray Pult"), "base64:WHJheSBQdWx0");
        let sub = render("", "$CLIENT$", "bob", "Привет");
        let encoded = sub.title_header.strip_prefix("base64:").unwrap();
        assert_eq!(decode(encoded), "Привет");
    }

    #[tokio::test]
    async fn test_renderer_reads_template_each_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub.txt");
        std::fs::write(&path, "v1 $CLIENT$").unwrap();

        let renderer = SubscriptionRenderer::new(&path, &SubscriptionConfig::default());
        assert_eq!(decode(&renderer.render_for("a").await.unwrap().payload), "v1 a");

        std::fs::write(&path, "v2 $CLIENT$").unwrap();
        assert_eq!(decode(&renderer.render_for("a").await.unwrap().payload), "v2 a");
    }

    #[tokio::test]
    async fn test_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = SubscriptionRenderer::new(dir.path().join("nope"), &SubscriptionConfig::default());
        assert!(matches!(
            renderer.render_for("a").await,
            Err(SubscriptionError::TemplateUnavailable(_))
        ));
    }
}

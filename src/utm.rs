//! UTM-tagged links for attributing leads to videos.

use url::Url;

use crate::config::UtmConfig;
use crate::error::{Error, Result};

/// Parse a landing-page URL, requiring an http(s) scheme and a host.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::config(format!("invalid base_url '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none_or(str::is_empty) {
        return Err(Error::config(format!(
            "base_url must be an http(s) URL with a host, got '{raw}'"
        )));
    }
    Ok(url)
}

/// A landing link with UTM parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtmLink {
    pub base_url: Url,
    pub source: String,
    pub medium: String,
    pub campaign: String,
    pub content: String,
}

impl UtmLink {
    /// Link for `video_id` using the configured landing page and tags.
    pub fn for_video(config: &UtmConfig, video_id: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(&config.base_url)?,
            source: config.source.clone(),
            medium: config.medium.clone(),
            campaign: config.campaign.clone(),
            content: video_id.trim().to_string(),
        })
    }

    #[must_use]
    pub fn with_campaign(mut self, campaign: impl Into<String>) -> Self {
        self.campaign = campaign.into();
        self
    }

    /// Render the link.
    ///
    /// Tags are appended after any query already on the base URL and the
    /// fragment is kept; empty tags are left out.
    #[must_use]
    pub fn build(&self) -> String {
        let params: Vec<(&str, &str)> = [
            ("utm_source", self.source.trim()),
            ("utm_medium", self.medium.trim()),
            ("utm_campaign", self.campaign.trim()),
            ("utm_content", self.content.trim()),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .collect();

        let mut link = self.base_url.clone();
        if !params.is_empty() {
            link.query_pairs_mut().extend_pairs(params);
        }
        link.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::extract_video_id;

    fn link(base: &str) -> UtmLink {
        UtmLink {
            base_url: Url::parse(base).unwrap(),
            source: "youtube".into(),
            medium: "video".into(),
            campaign: "organic".into(),
            content: "dQw4w9WgXcQ".into(),
        }
    }

    #[test]
    fn test_build_plain_base() {
        assert_eq!(
            link("https://example.com/apply").build(),
            "https://example.com/apply?utm_source=youtube&utm_medium=video&utm_campaign=organic&utm_content=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_build_keeps_existing_query_and_fragment() {
        let built = link("https://example.com/apply?ref=bio#form").build();
        assert!(built.starts_with("https://example.com/apply?ref=bio&utm_source=youtube"));
        assert!(built.ends_with("#form"));
    }

    #[test]
    fn test_build_encodes_and_skips_empty() {
        let built = link("https://example.com/")
            .with_campaign("spring launch & more")
            .build();
        assert!(built.contains("utm_campaign=spring+launch+%26+more"));

        let mut bare = link("https://example.com/");
        bare.medium = String::new();
        assert!(!bare.build().contains("utm_medium"));

        bare.source = " ".into();
        bare.campaign = String::new();
        bare.content = String::new();
        assert_eq!(bare.build(), "https://example.com/");
    }

    #[test]
    fn test_link_attributes_back_to_video() {
        let built = link("https://example.com/apply").build();
        assert_eq!(extract_video_id(&built).as_deref(), Some("dQw4w9WgXcQ"));

        let custom = link("https://example.com/apply").build().replace("dQw4w9WgXcQ", "launch+video");
        assert_eq!(extract_video_id(&custom).as_deref(), Some("launch video"));
    }

    #[test]
    fn test_for_video_uses_config() {
        let config = UtmConfig::default();
        let utm = UtmLink::for_video(&config, " abc ").unwrap();
        assert_eq!(utm.content, "abc");
        assert_eq!(utm.source, "youtube");
        assert_eq!(utm.medium, "video");
        assert_eq!(utm.base_url.as_str(), "https://example.com/apply");
    }

    #[test]
    fn test_base_url_needs_scheme_and_host() {
        assert!(parse_base_url("https://example.com/apply").is_ok());
        assert!(parse_base_url("http://localhost:8080").is_ok());
        for bad in ["https://", "example.com/apply", "ftp://example.com", "mailto:a@b.c", ""] {
            assert!(
                matches!(parse_base_url(bad), Err(Error::Config(_))),
                "{bad}"
            );
        }

        let config = UtmConfig {
            base_url: "https://".into(),
            ..UtmConfig::default()
        };
        assert!(UtmLink::for_video(&config, "abc").is_err());
    }
}

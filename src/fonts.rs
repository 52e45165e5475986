//! Font discovery from observed network resources.

use std::collections::HashSet;

use crate::types::{ResourceEvent, ResourceKind};

const FONT_EXTENSIONS: &[&str] = &["woff2", "woff", "ttf", "otf", "eot"];

/// Hosts that only serve font files
const FONT_HOSTS: &[&str] = &["fonts.gstatic.com", "use.typekit.net", "p.typekit.net"];

/// Classify a resource from its URL and the browser's initiator type
pub fn classify_resource(url: &str, initiator: &str) -> ResourceKind {
    let parsed = url::Url::parse(url).ok();
    let path = parsed
        .as_ref()
        .map(|u| u.path().to_ascii_lowercase())
        .unwrap_or_else(|| url.split(['?', '#']).next().unwrap_or("").to_ascii_lowercase());
    let host = parsed
        .as_ref()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .unwrap_or_default();

    let extension = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");

    if FONT_EXTENSIONS.contains(&extension) || FONT_HOSTS.contains(&host.as_str()) {
        return ResourceKind::Font;
    }

    if extension == "css" {
        ResourceKind::Stylesheet
    } else if matches!(extension, "js" | "mjs") || initiator == "script" {
        ResourceKind::Script
    } else if matches!(
        extension,
        "png" | "jpg" | "jpeg" | "gif" | "webp" | "avif" | "svg"
    ) || initiator == "img"
    {
        ResourceKind::Image
    } else {
        ResourceKind::Other
    }
}

/// Fold resource events into the unique font URLs, in first-seen order
pub fn collect_font_urls<I>(events: I) -> Vec<String>
where
    I: IntoIterator<Item = ResourceEvent>,
{
    let mut seen = HashSet::new();
    events
        .into_iter()
        .filter(|event| event.kind == ResourceKind::Font)
        .filter_map(|event| seen.insert(event.url.clone()).then_some(event.url))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(url: &str, kind: ResourceKind) -> ResourceEvent {
        ResourceEvent {
            url: url.to_string(),
            kind,
        }
    }

    #[test]
    fn test_classify_font_by_extension_and_host() {
        assert_eq!(
            classify_resource("https://cdn.example.com/f/Inter.woff2?v=3", "css"),
            ResourceKind::Font
        );
        assert_eq!(
            classify_resource("https://example.com/fonts/brand.TTF", "other"),
            ResourceKind::Font
        );
        assert_eq!(
            classify_resource("https://fonts.gstatic.com/s/inter/v12/abc", "css"),
            ResourceKind::Font
        );
    }

    #[test]
    fn test_classify_other_resources() {
        assert_eq!(
            classify_resource("https://example.com/site.css", "link"),
            ResourceKind::Stylesheet
        );
        assert_eq!(
            classify_resource("https://example.com/app.js", "script"),
            ResourceKind::Script
        );
        assert_eq!(
            classify_resource("https://example.com/hero.webp", "img"),
            ResourceKind::Image
        );
        assert_eq!(
            classify_resource("https://example.com/api/data", "fetch"),
            ResourceKind::Other
        );
    }

    #[test]
    fn test_collect_font_urls_dedups_in_order() {
        let events = vec![
            event("https://a.com/b.woff2", ResourceKind::Font),
            event("https://a.com/site.css", ResourceKind::Stylesheet),
            event("https://a.com/a.woff2", ResourceKind::Font),
            event("https://a.com/b.woff2", ResourceKind::Font),
        ];
        assert_eq!(
            collect_font_urls(events),
            vec![
                "https://a.com/b.woff2".to_string(),
                "https://a.com/a.woff2".to_string()
            ]
        );
    }

    #[test]
    fn test_collect_font_urls_empty() {
        assert!(collect_font_urls(Vec::new()).is_empty());
    }
}

//! Turning user input into the URL to render.
//!
//! A URL or bare domain is used directly. Anything else is treated as a
//! brand name and sent to a search engine, whose results page is then
//! analyzed. Resolution is purely local and never fails for non-empty input.

use url::Url;

use crate::errors::BrandprobeError;

pub const DEFAULT_SEARCH_URL: &str = "https://www.google.com/search";

/// How an input was interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A site address
    Site(Url),
    /// A brand name resolved through a search query
    Search { query: String, url: Url },
}

impl Target {
    pub fn url(&self) -> &Url {
        match self {
            Target::Site(url) => url,
            Target::Search { url, .. } => url,
        }
    }
}

/// Resolve `input` using `search_base` for brand names
pub fn resolve_target(input: &str, search_base: &str) -> Result<Target, BrandprobeError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(BrandprobeError::InvalidInput(
            "expected a URL, domain or brand name".to_string(),
        ));
    }

    let looks_like_address = input.contains('.') && !input.chars().any(char::is_whitespace);
    if looks_like_address {
        let candidate = if input.starts_with("http://") || input.starts_with("https://") {
            input.to_string()
        } else {
            format!("https://{}", input)
        };
        return Url::parse(&candidate)
            .ok()
            .filter(|u| u.host_str().is_some())
            .map(Target::Site)
            .ok_or_else(|| BrandprobeError::InvalidInput(format!("not a valid URL: {}", input)));
    }

    let mut url = Url::parse(search_base).map_err(|e| {
        BrandprobeError::InvalidInput(format!("invalid search URL {}: {}", search_base, e))
    })?;
    url.query_pairs_mut().append_pair("q", input);

    Ok(Target::Search {
        query: input.to_string(),
        url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_domain_gets_https() {
        let target = resolve_target("gsap.com", DEFAULT_SEARCH_URL).unwrap();
        assert_eq!(target.url().as_str(), "https://gsap.com/");
        assert!(matches!(target, Target::Site(_)));
    }

    #[test]
    fn test_full_url_is_kept() {
        let target = resolve_target("  http://example.com/pricing  ", DEFAULT_SEARCH_URL).unwrap();
        assert_eq!(target.url().as_str(), "http://example.com/pricing");
    }

    #[test]
    fn test_brand_name_becomes_search() {
        let target = resolve_target("Acme Rockets", DEFAULT_SEARCH_URL).unwrap();
        match target {
            Target::Search { query, url } => {
                assert_eq!(query, "Acme Rockets");
                assert_eq!(url.as_str(), "https://www.google.com/search?q=Acme+Rockets");
            }
            other => panic!("expected search target, got {:?}", other),
        }
    }

    #[test]
    fn test_single_word_without_dot_is_a_name() {
        let target = resolve_target("stripe", "https://duckduckgo.com/").unwrap();
        assert_eq!(target.url().as_str(), "https://duckduckgo.com/?q=stripe");
    }

    #[test]
    fn test_empty_and_invalid_input() {
        assert!(matches!(
            resolve_target("   ", DEFAULT_SEARCH_URL),
            Err(BrandprobeError::InvalidInput(_))
        ));
        // Whitespace means it is not an address
        assert!(matches!(
            resolve_target("https://exa mple.com", DEFAULT_SEARCH_URL),
            Ok(Target::Search { .. })
        ));
        assert!(resolve_target("stripe", "not a url").is_err());
    }
}

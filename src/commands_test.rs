#[cfg(test)]
mod tests {
    use crate::commands::analyze::render_simple;
    use crate::commands::utils::RenderArgs;
    use brandprobe::types::*;
    use brandprobe::ViewportSize;
    use chrono::Utc;
    use std::time::Duration;

    fn args() -> RenderArgs {
        RenderArgs {
            browser: "chrome".to_string(),
            viewport: None,
            no_headless: false,
            webdriver_url: None,
            timeout_ms: 60000,
            search_url: None,
            heuristics: None,
        }
    }

    #[test]
    fn test_render_options_defaults() {
        let options = args().render_options().unwrap();
        assert_eq!(options.viewport, ViewportSize::default());
        assert_eq!(options.timeout, Duration::from_secs(60));
        assert!(options.headless);
    }

    #[test]
    fn test_render_options_overrides() {
        let mut a = args();
        a.viewport = Some("1280x800".to_string());
        a.no_headless = true;
        a.timeout_ms = 5000;

        let options = a.render_options().unwrap();
        assert_eq!(options.viewport.width, 1280);
        assert_eq!(options.timeout, Duration::from_millis(5000));
        assert!(!options.headless);

        a.viewport = Some("wide".to_string());
        assert!(a.render_options().is_err());
    }

    #[test]
    fn test_simple_output() {
        let default_style = DefaultStyle {
            bg: "rgb(10, 132, 255)".to_string(),
            color: "rgb(255, 255, 255)".to_string(),
            radius: "8px".to_string(),
            font: "Inter".to_string(),
        };
        let report = BrandReport {
            url: "https://gsap.com/".to_string(),
            page_background: "rgb(14, 16, 15)".to_string(),
            fonts: vec!["https://gsap.com/fonts/mori.woff2".to_string()],
            buttons: vec![FinalButton {
                text: "Get GSAP".to_string(),
                score: 120,
                x: 700.0,
                y: 400.0,
                hover_style: HoverStyle::from(&default_style),
                default_style,
                hover_sampled: false,
            }],
            analysis: Analysis {
                mood: "Unavailable".to_string(),
                easing_hint: "power2.out".to_string(),
                advice: "n/a".to_string(),
                source: AnalysisSource::Fallback,
            },
            analyzed_at: Utc::now(),
        };

        let text = render_simple(&report);
        assert!(text.contains("Background: rgb(14, 16, 15)"));
        assert!(text.contains("1. \"Get GSAP\" (score 120) at (700, 400)"));
        assert!(text.contains("(not sampled)"));
        assert!(text.contains("Unavailable (fallback)"));
    }
}

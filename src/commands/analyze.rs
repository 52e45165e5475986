use anyhow::Result;
use tracing::info;

use brandprobe::types::{AnalysisSource, BrandReport, OutputFormat};
use brandprobe::SessionLimiter;

use crate::commands::utils::{self, RenderArgs};

pub async fn handle_analyze(input: String, format: OutputFormat, args: RenderArgs) -> Result<()> {
    let analyzer = utils::build_analyzer(&args, SessionLimiter::new(1))?;

    let report = analyzer.analyze(&input).await?;
    info!(
        "Found {} buttons and {} fonts on {}",
        report.buttons.len(),
        report.fonts.len(),
        report.url
    );

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Simple => print!("{}", render_simple(&report)),
    }
    Ok(())
}

pub(crate) fn render_simple(report: &BrandReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("URL:        {}\n", report.url));
    out.push_str(&format!("Background: {}\n", report.page_background));

    out.push_str(&format!("Fonts:      {}\n", report.fonts.len()));
    for font in &report.fonts {
        out.push_str(&format!("  {}\n", font));
    }

    out.push_str(&format!("Buttons:    {}\n", report.buttons.len()));
    for (i, button) in report.buttons.iter().enumerate() {
        let d = &button.default_style;
        let h = &button.hover_style;
        out.push_str(&format!(
            "  {}. \"{}\" (score {}) at ({:.0}, {:.0})\n",
            i + 1,
            button.text,
            button.score,
            button.x,
            button.y
        ));
        out.push_str(&format!(
            "     default: bg {} | color {} | radius {} | font {}\n",
            d.bg, d.color, d.radius, d.font
        ));
        let note = if button.hover_sampled { "" } else { " (not sampled)" };
        out.push_str(&format!("     hover:   bg {} | color {}{}\n", h.bg, h.color, note));
    }

    let a = &report.analysis;
    let source = match a.source {
        AnalysisSource::Generated => "",
        AnalysisSource::Fallback => " (fallback)",
    };
    out.push_str(&format!("Mood:       {}{}\n", a.mood, source));
    out.push_str(&format!("Ease:       {}\n", a.easing_hint));
    out.push_str(&format!("Advice:     {}\n", a.advice));
    out
}

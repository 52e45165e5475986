// Unit tests for candidate scoring and ranking

use super::*;
use crate::types::{BoundingBox, PaintTree, StyleRecord, ViewportSize};

const BLUE: &str = "rgb(37, 99, 235)";
const CLEAR: &str = "rgba(0, 0, 0, 0)";

fn node(index: usize, text: &str, bg: &str, rect: (f64, f64, f64, f64)) -> NodeSnapshot {
    NodeSnapshot {
        index,
        tag: "a".to_string(),
        text: text.to_string(),
        rect: BoundingBox {
            x: rect.0,
            y: rect.1,
            width: rect.2,
            height: rect.3,
        },
        paint: PaintTree {
            style: StyleRecord {
                background_color: bg.to_string(),
                color: "rgb(255, 255, 255)".to_string(),
                border_width: "0px".to_string(),
                display: "inline-block".to_string(),
                visibility: "visible".to_string(),
                opacity: "1".to_string(),
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

fn page(nodes: Vec<NodeSnapshot>) -> PageSnapshot {
    PageSnapshot {
        viewport: ViewportSize::default(),
        background_color: "rgb(255, 255, 255)".to_string(),
        nodes,
    }
}

#[test]
fn test_candidate_text_fallbacks_and_truncation() {
    let mut n = node(0, "   ", BLUE, (0.0, 0.0, 100.0, 40.0));
    n.aria_label = Some("Open menu".to_string());
    assert_eq!(candidate_text(&n, 25), "Open menu");

    let mut submit = node(1, "", BLUE, (0.0, 0.0, 100.0, 40.0));
    submit.value = Some("Subscribe".to_string());
    assert_eq!(candidate_text(&submit, 25), "Subscribe");

    let long = node(2, "Start your free trial today and save", BLUE, (0.0, 0.0, 1.0, 1.0));
    assert_eq!(candidate_text(&long, 25), "Start your free trial tod");

    let multiline = node(3, "Shop\n   Now", BLUE, (0.0, 0.0, 1.0, 1.0));
    assert_eq!(candidate_text(&multiline, 25), "Shop Now");

    let empty = node(4, "", BLUE, (0.0, 0.0, 1.0, 1.0));
    assert_eq!(candidate_text(&empty, 25), "Button");
}

#[test]
fn test_size_invariant_discards_tiny_nodes() {
    let config = HeuristicConfig::default();
    assert!(to_candidate(&node(0, "x", BLUE, (0.0, 0.0, 30.0, 40.0)), &config).is_none());
    assert!(to_candidate(&node(0, "x", BLUE, (0.0, 0.0, 120.0, 15.0)), &config).is_none());
    assert!(to_candidate(&node(0, "x", BLUE, (0.0, 0.0, 31.0, 16.0)), &config).is_some());
}

#[test]
fn test_hidden_nodes_are_not_candidates() {
    let config = HeuristicConfig::default();
    let mut n = node(0, "Shop", BLUE, (0.0, 300.0, 160.0, 48.0));
    n.paint.style.display = "none".to_string();
    assert!(to_candidate(&n, &config).is_none());
}

#[test]
fn test_full_bonus_stack() {
    let config = HeuristicConfig::default();
    let scorer = Scorer::new(&config, 900);

    // y = 360 is 40% of 900: hero zone
    let scored = scorer
        .score(&node(0, "Shop Now", BLUE, (600.0, 360.0, 180.0, 52.0)))
        .unwrap();
    assert_eq!(scored.score, 50 + 20 + 10 + 40);
    assert_eq!(scored.center.x, 690.0);
    assert_eq!(scored.center.y, 386.0);
}

#[test]
fn test_position_outside_hero_zone() {
    let config = HeuristicConfig::default();
    let scorer = Scorer::new(&config, 900);

    // Nav bar at the very top
    let nav = scorer
        .score(&node(0, "Pricing", BLUE, (900.0, 20.0, 90.0, 36.0)))
        .unwrap();
    assert_eq!(nav.score, 20);

    // Footer below the band
    let footer = scorer
        .score(&node(1, "Pricing", BLUE, (900.0, 700.0, 90.0, 36.0)))
        .unwrap();
    assert_eq!(footer.score, 20);
}

#[test]
fn test_configurable_band_and_tall_bonus() {
    let config = HeuristicConfig {
        hero_band: crate::config::Band {
            top: 0.15,
            bottom: 0.65,
        },
        bonuses: crate::config::Bonuses {
            tall: 15,
            ..Default::default()
        },
        ..Default::default()
    };
    let scorer = Scorer::new(&config, 900);

    // 12% of the viewport: inside the default band, outside this one
    let scored = scorer
        .score(&node(0, "Learn more", BLUE, (0.0, 108.0, 90.0, 40.0)))
        .unwrap();
    assert_eq!(scored.score, 20 + 15);
}

#[test]
fn test_polish_keyword_bonus() {
    let config = HeuristicConfig::default();
    let scorer = Scorer::new(&config, 900);
    let scored = scorer
        .score(&node(0, "Kup teraz", BLUE, (0.0, 800.0, 90.0, 30.0)))
        .unwrap();
    assert_eq!(scored.score, 20 + 40);
}

#[test]
fn test_unpainted_nodes_are_dropped() {
    let config = HeuristicConfig::default();
    let scorer = Scorer::new(&config, 900);
    assert!(
        scorer
            .score(&node(0, "Shop Now", CLEAR, (600.0, 360.0, 180.0, 52.0)))
            .is_none()
    );
}

#[test]
fn test_consent_artifact_never_ranks_even_with_max_bonuses() {
    let config = HeuristicConfig::default();
    let scorer = Scorer::new(&config, 900);

    let scored = scorer
        .score(&node(0, "Accept & Start Shopping", BLUE, (600.0, 360.0, 400.0, 60.0)))
        .unwrap();
    assert_eq!(scored.score, config.consent_penalty);

    let ranked = score_and_rank(
        &page(vec![node(0, "Accept & Start Shopping", BLUE, (600.0, 360.0, 400.0, 60.0))]),
        &config,
    );
    assert!(ranked.is_empty());
}

#[test]
fn test_rank_is_descending_stable_and_capped() {
    let config = HeuristicConfig::default();
    let nodes = vec![
        node(0, "About", BLUE, (0.0, 800.0, 90.0, 30.0)),        // 20
        node(1, "Shop Now", BLUE, (0.0, 360.0, 180.0, 50.0)),   // 120
        node(2, "Contact", BLUE, (0.0, 810.0, 90.0, 30.0)),      // 20
        node(3, "Blog", BLUE, (0.0, 820.0, 90.0, 30.0)),         // 20
        node(4, "Buy", BLUE, (0.0, 360.0, 180.0, 50.0)),         // 120
        node(5, "Careers", BLUE, (0.0, 830.0, 90.0, 30.0)),      // 20
        node(6, "Team", BLUE, (0.0, 840.0, 90.0, 30.0)),         // 20
        node(7, "Press", BLUE, (0.0, 850.0, 90.0, 30.0)),        // 20
        node(8, "Nav", CLEAR, (0.0, 10.0, 40.0, 20.0)),          // no paint
    ];

    let ranked = score_and_rank(&page(nodes), &config);
    assert_eq!(ranked.len(), 6);

    let order: Vec<usize> = ranked.iter().map(|r| r.candidate.index).collect();
    assert_eq!(order, vec![1, 4, 0, 2, 3, 5]);

    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn test_rank_respects_configured_cap() {
    let config = HeuristicConfig {
        max_candidates: 2,
        ..Default::default()
    };
    let nodes = (0..5)
        .map(|i| node(i, "Start", BLUE, (0.0, 400.0, 150.0, 40.0)))
        .collect();
    let ranked = score_and_rank(&page(nodes), &config);
    let order: Vec<usize> = ranked.iter().map(|r| r.candidate.index).collect();
    assert_eq!(order, vec![0, 1]);
}

#[test]
fn test_long_labels_are_matched_before_truncation() {
    let config = HeuristicConfig::default();
    let scorer = Scorer::new(&config, 900);

    // Consent term sits past the display cut
    let consent = node(
        0,
        "Click here to continue and accept cookies",
        BLUE,
        (600.0, 360.0, 180.0, 52.0),
    );
    let scored = scorer.score(&consent).unwrap();
    assert_eq!(scored.candidate.text, "Click here to continue an");
    assert_eq!(scored.score, config.consent_penalty);

    // So does the action keyword
    let action = node(
        1,
        "Our seasonal collection is ready: shop now",
        BLUE,
        (600.0, 360.0, 180.0, 52.0),
    );
    let scored = scorer.score(&action).unwrap();
    assert_eq!(scored.candidate.text, "Our seasonal collection i");
    assert_eq!(scored.score, 50 + 20 + 10 + 40);

    let ranked = score_and_rank(&page(vec![consent, action]), &config);
    let order: Vec<usize> = ranked.iter().map(|r| r.candidate.index).collect();
    assert_eq!(order, vec![1]);
}

#[test]
fn test_visible_text_is_collapsed_but_not_truncated() {
    let n = node(
        0,
        "  Start your\n free trial today and save  ",
        BLUE,
        (0.0, 0.0, 1.0, 1.0),
    );
    assert_eq!(visible_text(&n), "Start your free trial today and save");

    let mut labelled = node(1, "", BLUE, (0.0, 0.0, 1.0, 1.0));
    labelled.aria_label = Some("Manage cookie preferences for this site".to_string());
    assert_eq!(visible_text(&labelled), "Manage cookie preferences for this site");
}

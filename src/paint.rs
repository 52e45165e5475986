//! Paint resolution: find which layer of a node actually carries color.
//!
//! Component-library buttons rarely paint themselves. The fill often sits on
//! a `::before` overlay or an inner wrapper, so resolution walks a fixed
//! priority order: the node, `::before`, `::after`, then the largest painted
//! descendant.

use crate::color::{first_color, is_painted};
use crate::types::{HoverStyle, PaintOrigin, PaintTree, PaintedBox, PointProbe, ResolvedStyle};

/// Resolve the paint-bearing style of `tree`, or `None` when nothing in it
/// is visibly painted.
pub fn resolve_paint(tree: &PaintTree) -> Option<ResolvedStyle> {
    let own = &tree.style;
    let bordered = own.border_width_px() > 0.0 && is_painted(first_color(&own.border_color));
    if is_painted(&own.background_color) || bordered {
        return Some(ResolvedStyle::from_record(own, PaintOrigin::Node));
    }

    for (pseudo, origin) in [
        (&tree.before, PaintOrigin::Before),
        (&tree.after, PaintOrigin::After),
    ] {
        if let Some(style) = pseudo
            && is_painted(&style.background_color)
        {
            return Some(ResolvedStyle::from_record(style, origin));
        }
    }

    // Largest painted descendant with a visible box; strict comparison keeps
    // the first in document order on ties
    let mut best: Option<(f64, &PaintedBox)> = None;
    for child in &tree.descendants {
        let area = child.rect.area();
        if area <= 0.0 || !is_painted(&child.style.background_color) {
            continue;
        }
        if best.is_none_or(|(best_area, _)| area > best_area) {
            best = Some((area, child));
        }
    }

    best.map(|(_, child)| ResolvedStyle::from_record(&child.style, PaintOrigin::Descendant))
}

/// Resolve hover paint for the element under the pointer, falling back to
/// its parent when the hit element resolves to nothing.
pub fn resolve_hover_paint(probe: &PointProbe) -> Option<HoverStyle> {
    resolve_paint(&probe.hit)
        .or_else(|| probe.parent.as_ref().and_then(resolve_paint))
        .map(|style| HoverStyle {
            bg: style.background_color,
            color: style.color,
        })
}

#[cfg(test)]
#[path = "paint_test.rs"]
mod paint_test;

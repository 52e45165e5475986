//! Color visibility checks for CSS computed values.
//!
//! Browsers report computed colors as `rgb(...)`/`rgba(...)` strings, but
//! fixtures, pseudo-elements and some engines can hand back hex, `hsl()` or
//! keyword forms. Everything funnels through [`parse_alpha`]; a color is
//! painted only when it parses and its alpha channel is above zero.

/// Returns true when `value` is a visible (non-transparent) color.
///
/// Zero alpha is never painted, whatever the RGB channels say. Values that
/// cannot be parsed are treated as not painted.
pub fn is_painted(value: &str) -> bool {
    matches!(parse_alpha(value), Some(alpha) if alpha > 0.0)
}

/// First color of a space-separated shorthand value such as a computed
/// `border-color` whose sides differ ("rgb(255, 0, 0) rgb(0, 0, 255)").
/// Whitespace inside a function's parentheses does not split.
pub fn first_color(value: &str) -> &str {
    let value = value.trim();
    let mut depth = 0usize;
    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => return &value[..i],
            _ => {}
        }
    }
    value
}

/// Extract the alpha channel of a CSS color string, in `0.0..=1.0`.
///
/// Returns `None` for unrecognized formats.
pub fn parse_alpha(value: &str) -> Option<f64> {
    let v = value.trim().to_ascii_lowercase();
    if v.is_empty() {
        return None;
    }

    match v.as_str() {
        "transparent" | "none" | "initial" | "inherit" | "unset" => {
            return Some(0.0);
        }
        _ => {}
    }

    if let Some(hex) = v.strip_prefix('#') {
        return hex_alpha(hex);
    }

    if let Some((name, args)) = split_function(&v) {
        return match name {
            "rgb" | "rgba" | "hsl" | "hsla" | "hwb" | "lab" | "lch" | "oklab" | "oklch"
            | "color" => function_alpha(args),
            _ => None,
        };
    }

    // Bare keyword: accept plain alphabetic names as opaque colors
    if v.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(1.0);
    }

    None
}

fn hex_alpha(hex: &str) -> Option<f64> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 | 6 => Some(1.0),
        4 => {
            let a = u8::from_str_radix(&hex[3..4].repeat(2), 16).ok()?;
            Some(f64::from(a) / 255.0)
        }
        8 => {
            let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
            Some(f64::from(a) / 255.0)
        }
        _ => None,
    }
}

/// Split `name(args)` into its parts.
fn split_function(v: &str) -> Option<(&str, &str)> {
    let open = v.find('(')?;
    let inner = v[open + 1..].strip_suffix(')')?;
    Some((v[..open].trim(), inner))
}

fn function_alpha(args: &str) -> Option<f64> {
    // CSS4 form: `r g b / a`
    if let Some((channels, alpha)) = args.split_once('/') {
        let channels: Vec<&str> = channels.split_whitespace().collect();
        if channels.len() != 3 || !channels.iter().all(|p| looks_numeric(p)) {
            return None;
        }
        return parse_alpha_component(alpha.trim());
    }

    let parts: Vec<&str> = if args.contains(',') {
        args.split(',').map(str::trim).collect()
    } else {
        args.split_whitespace().collect()
    };

    if !(3..=4).contains(&parts.len()) || !parts[..3].iter().all(|p| looks_numeric(p)) {
        return None;
    }
    match parts.get(3) {
        Some(alpha) => parse_alpha_component(alpha),
        None => Some(1.0),
    }
}

fn parse_alpha_component(raw: &str) -> Option<f64> {
    let alpha = if let Some(pct) = raw.strip_suffix('%') {
        pct.trim().parse::<f64>().ok()? / 100.0
    } else {
        raw.parse::<f64>().ok()?
    };
    if alpha.is_nan() {
        return None;
    }
    Some(alpha.clamp(0.0, 1.0))
}

fn looks_numeric(p: &str) -> bool {
    let p = p
        .trim_end_matches('%')
        .trim_end_matches("deg")
        .trim_end_matches("turn")
        .trim_end_matches("rad");
    p == "none" || p.parse::<f64>().is_ok()
}

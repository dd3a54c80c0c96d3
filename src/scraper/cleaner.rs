use crate::error::ScrapeCause;
use crate::models::TokenStats;

/// Text the page shows in the liquidity slot when a token has no liquidity
/// block. Layout-specific heuristic observed on the live page.
pub const NO_LIQUIDITY_MARKER: &str = "Instant";

// ── Parsers ───────────────────────────────────────────────────────────────────

/// Parse the organic score. "87.5" → 87.5 | " 92 % " → 92.0
pub fn parse_score(s: &str) -> Result<f64, ScrapeCause> {
    let trimmed = s.trim();
    match trimmed.trim_end_matches('%').trim().parse::<f64>() {
        Ok(score) if score.is_finite() => Ok(score),
        _ => Err(ScrapeCause::InvalidScore(trimmed.to_string())),
    }
}

/// Price text with every whitespace and control character dropped.
/// "$0.00\u{200b}0421\n" → "$0.000421"
pub fn clean_price(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && !c.is_control() && !is_zero_width(*c))
        .collect()
}

fn is_zero_width(c: char) -> bool {
    matches!(c, '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}')
}

/// Map the stat blocks (page order: mkt cap, liquidity, 24h vol, holders)
/// onto named fields. When the liquidity slot holds the no-liquidity marker
/// the remaining blocks are read from their shifted positions and liquidity
/// is reported as missing.
pub fn remap_stats(raw: &[String]) -> Result<TokenStats, ScrapeCause> {
    if raw.len() < 4 {
        return Err(ScrapeCause::MissingStats { found: raw.len() });
    }

    let liquidity = if raw[1].trim() == NO_LIQUIDITY_MARKER {
        None
    } else {
        Some(raw[1].clone())
    };

    Ok(TokenStats {
        market_cap: raw[0].clone(),
        liquidity,
        volume_24h: raw[2].clone(),
        holders: raw[3].clone(),
    })
}

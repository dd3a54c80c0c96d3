use crate::config::Selectors;
use crate::error::ScrapeCause;
use crate::models::RawTokenPage;
use scraper::{ElementRef, Html, Selector};

// ── Token page ────────────────────────────────────────────────────────────────

/// Pull the raw name/score/price/stat texts out of a rendered token page.
pub fn parse_token_page(html: &str, selectors: &Selectors) -> Result<RawTokenPage, ScrapeCause> {
    let doc = Html::parse_document(html);

    let name = first_text(&doc, &selectors.name)?;
    let score = first_text(&doc, &selectors.score)?;
    let price = first_text(&doc, &selectors.price)?;

    let stat_sel = selector(&selectors.stats)?;
    let stats: Vec<String> = doc.select(&stat_sel).map(element_text).collect();

    Ok(RawTokenPage {
        name,
        score,
        price,
        stats,
    })
}

fn selector(s: &str) -> Result<Selector, ScrapeCause> {
    Selector::parse(s).map_err(|_| ScrapeCause::InvalidSelector(s.to_string()))
}

fn first_text(doc: &Html, s: &str) -> Result<String, ScrapeCause> {
    let sel = selector(s)?;
    doc.select(&sel)
        .next()
        .map(element_text)
        .ok_or_else(|| ScrapeCause::MissingElement(s.to_string()))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

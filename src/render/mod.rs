use crate::config::RenderConfig;
use crate::models::ScanRecord;
use colored::*;
use tabled::{
    Table,
    Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

pub const TABLE_TITLE: &str = "Jupiter Organic Scores";
const SCRAPED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Colour band of an organic score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    High,
    Medium,
    Low,
}

impl ScoreTier {
    pub const HIGH_THRESHOLD: f64 = 80.0;

    /// `>= 80` high, `(0, 80)` medium, everything else (0, negatives, NaN) low.
    pub fn from_score(score: f64) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            ScoreTier::High
        } else if score > 0.0 {
            ScoreTier::Medium
        } else {
            ScoreTier::Low
        }
    }

    fn paint(self, text: &str) -> ColoredString {
        match self {
            ScoreTier::High => text.bright_green().bold(),
            ScoreTier::Medium => text.bright_yellow().bold(),
            ScoreTier::Low => text.bright_red().bold(),
        }
    }
}

#[derive(Tabled)]
struct ScanRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Token")]
    token: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Mkt Cap")]
    market_cap: String,
    #[tabled(rename = "Liquidity")]
    liquidity: String,
    #[tabled(rename = "24h Vol")]
    volume_24h: String,
    #[tabled(rename = "Holders")]
    holders: String,
    #[tabled(rename = "GMGN")]
    analytics: String,
}

/// OSC 8 terminal hyperlink.
pub fn hyperlink(url: &str, text: &str) -> String {
    format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", url, text)
}

fn link(url: &str, text: &str, options: &RenderConfig) -> String {
    let label = if options.color {
        text.underline().bright_blue().to_string()
    } else {
        text.to_string()
    };
    if options.hyperlinks {
        hyperlink(url, &label)
    } else {
        label
    }
}

fn to_row(record: &ScanRecord, options: &RenderConfig) -> ScanRow {
    let score = format!("{:.2}", record.score);
    let score = if options.color {
        ScoreTier::from_score(record.score).paint(&score).to_string()
    } else {
        score
    };

    let name = if options.color {
        record.name.bold().white().to_string()
    } else {
        record.name.clone()
    };

    // Without hyperlink support the analytics column shows the URL itself.
    let analytics_text = if options.hyperlinks {
        &record.name
    } else {
        &record.analytics_url
    };

    ScanRow {
        name,
        token: link(&record.risk_check_url, &record.address, options),
        score,
        price: record.price.clone(),
        market_cap: record.stats.market_cap.clone(),
        liquidity: record.stats.liquidity_display().to_string(),
        volume_24h: record.stats.volume_24h.clone(),
        holders: record.stats.holders.clone(),
        analytics: link(&record.analytics_url, analytics_text, options),
    }
}

/// Format scan records as a table, one row per record, input order kept.
/// The footer carries the time of the most recent scrape.
pub fn render_table(records: &[ScanRecord], options: &RenderConfig) -> String {
    let rows: Vec<ScanRow> = records.iter().map(|r| to_row(r, options)).collect();

    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::new(0..)).with(Alignment::center()));

    let title = if options.color {
        TABLE_TITLE.bright_cyan().bold().to_string()
    } else {
        TABLE_TITLE.to_string()
    };

    match records.iter().map(|r| r.scraped_at).max() {
        Some(latest) => format!(
            "{}\n{}\nScraped at {} UTC",
            title,
            table,
            latest.format(SCRAPED_AT_FORMAT)
        ),
        None => format!("{}\n{}", title, table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TokenStats;
    use chrono::NaiveDate;

    fn record(name: &str, address: &str, score: f64, liquidity: Option<&str>) -> ScanRecord {
        ScanRecord {
            address: address.into(),
            name: name.into(),
            score,
            price: "$0.0123".into(),
            stats: TokenStats {
                market_cap: "$12.3M".into(),
                liquidity: liquidity.map(String::from),
                volume_24h: "$4.5M".into(),
                holders: "892".into(),
            },
            risk_check_url: format!("https://rugcheck.xyz/tokens/{}", address),
            analytics_url: format!("https://gmgn.ai/sol/token/{}", address),
            scraped_at: NaiveDate::from_ymd_opt(2024, 12, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        }
    }

    fn plain() -> RenderConfig {
        RenderConfig {
            color: false,
            hyperlinks: false,
        }
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(ScoreTier::from_score(80.0), ScoreTier::High);
        assert_eq!(ScoreTier::from_score(99.9), ScoreTier::High);
        assert_eq!(ScoreTier::from_score(79.99), ScoreTier::Medium);
        assert_eq!(ScoreTier::from_score(0.01), ScoreTier::Medium);
        assert_eq!(ScoreTier::from_score(0.0), ScoreTier::Low);
        assert_eq!(ScoreTier::from_score(-3.0), ScoreTier::Low);
        assert_eq!(ScoreTier::from_score(f64::NAN), ScoreTier::Low);
    }

    #[test]
    fn test_plain_table_has_all_columns() {
        let out = render_table(&[record("Bonk", "So1abc", 87.5, Some("$1.1M"))], &plain());

        assert!(out.starts_with(TABLE_TITLE));
        for header in ["Name", "Token", "Score", "Price", "Mkt Cap", "Liquidity", "24h Vol", "Holders", "GMGN"] {
            assert!(out.contains(header), "missing header {}", header);
        }
        for cell in ["Bonk", "So1abc", "87.50", "$0.0123", "$12.3M", "$1.1M", "$4.5M", "892"] {
            assert!(out.contains(cell), "missing cell {}", cell);
        }
        assert!(out.contains("https://gmgn.ai/sol/token/So1abc"));
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn test_missing_liquidity_renders_none() {
        let out = render_table(&[record("Bonk", "So1abc", 10.0, None)], &plain());
        assert!(out.contains("None"));
    }

    #[test]
    fn test_hyperlinks_point_at_derived_urls() {
        let options = RenderConfig {
            color: false,
            hyperlinks: true,
        };
        let out = render_table(&[record("Bonk", "So1abc", 50.0, None)], &options);
        assert!(out.contains(&hyperlink("https://rugcheck.xyz/tokens/So1abc", "So1abc")));
        assert!(out.contains(&hyperlink("https://gmgn.ai/sol/token/So1abc", "Bonk")));
    }

    #[test]
    fn test_row_per_record_in_order() {
        let records = vec![
            record("First", "AAA", 90.0, None),
            record("Second", "BBB", 0.0, None),
        ];
        let out = render_table(&records, &plain());
        let first = out.find("First").unwrap();
        let second = out.find("Second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_colored_score_uses_tier() {
        colored::control::set_override(true);
        let high = to_row(&record("A", "AAA", 80.0, None), &RenderConfig::default());
        let low = to_row(&record("B", "BBB", 0.0, None), &RenderConfig::default());
        assert_eq!(high.score, "80.00".bright_green().bold().to_string());
        assert_eq!(low.score, "0.00".bright_red().bold().to_string());
    }

    #[test]
    fn test_render_does_not_mutate_input() {
        let records = vec![record("Bonk", "So1abc", 42.0, Some("$1"))];
        let before = records.clone();
        let _ = render_table(&records, &RenderConfig::default());
        assert_eq!(records, before);
    }

    #[test]
    fn test_footer_shows_latest_scrape_time() {
        let mut later = record("Later", "BBB", 20.0, None);
        later.scraped_at = later.scraped_at + chrono::Duration::minutes(5);
        let out = render_table(&[record("Early", "AAA", 10.0, None), later], &plain());

        assert!(out.ends_with("Scraped at 2024-12-01 12:05:00 UTC"));
    }
}

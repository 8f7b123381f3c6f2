//! Dashboard rendering
//!
//! Pure text projection of an analysis: strategy summary, one card per
//! recommendation, a confidence chart, and the grounded source list.
//! Rendering is deterministic; the same analysis always produces the same
//! text, in input order.

use std::fmt::Write;

use crate::models::{AnalysisResult, StockRecommendation, UserProfile};

/// Source list is capped to the top entries.
pub const MAX_SOURCES: usize = 5;

const CHART_WIDTH: usize = 50;

/// Market-quote lookup link for a symbol. An existing "SYM:EXCH" form is
/// preserved (case-normalized); bare symbols default to NSE.
pub fn finance_quote_url(symbol: &str) -> String {
    let cleaned = symbol.trim().to_uppercase();
    match cleaned.split_once(':') {
        Some((sym, exchange)) => {
            format!("https://www.google.com/finance/quote/{}:{}", sym, exchange)
        }
        None => format!("https://www.google.com/finance/quote/{}:NSE", cleaned),
    }
}

pub fn render_analysis(analysis: &AnalysisResult, profile: &UserProfile) -> String {
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(out, "══ Personalized Investment Strategy ══");
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", analysis.risk_profile);
    let _ = writeln!(out);
    let _ = writeln!(out, "Market outlook: {}", analysis.market_summary);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Target Market: Indian Equity | Focus: {} Risk",
        profile.risk_tolerance
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "── Recommended Stocks ──");
    for stock in &analysis.recommendations {
        out.push_str(&render_card(stock));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "── Confidence Distribution ──");
    out.push_str(&render_confidence_chart(&analysis.recommendations));

    if !analysis.sources.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "── Grounded In Research ──");
        for source in analysis.sources.iter().take(MAX_SOURCES) {
            let _ = writeln!(out, "  {} — {}", source.title, source.uri);
        }
    }

    out
}

fn render_card(stock: &StockRecommendation) -> String {
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = write!(out, "  {} — {}", stock.symbol, stock.company_name);
    if let Some(target) = &stock.target_price {
        let _ = write!(out, "  [Target: {}]", target);
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  {} | Confidence: {}%",
        stock.sector.to_uppercase(),
        stock.confidence
    );
    let _ = writeln!(out, "  {}", stock.reason);

    let _ = writeln!(out, "  Recent highlights:");
    match stock.news_highlights.as_deref() {
        Some(news) if !news.is_empty() => {
            for item in news {
                let _ = writeln!(out, "    • {}", item);
            }
        }
        _ => {
            let _ = writeln!(out, "    No recent snippets found.");
        }
    }

    let _ = writeln!(out, "  Key metrics:");
    match stock.key_metrics.as_deref() {
        Some(metrics) if !metrics.is_empty() => {
            for item in metrics {
                let _ = writeln!(out, "    • {}", item);
            }
        }
        _ => {
            let _ = writeln!(out, "    Metrics unavailable.");
        }
    }

    let _ = writeln!(out, "  Verify live price: {}", finance_quote_url(&stock.symbol));

    out
}

/// Horizontal bars keyed by symbol, scaled so 100 fills the chart width.
pub fn render_confidence_chart(recommendations: &[StockRecommendation]) -> String {
    let mut out = String::new();

    for stock in recommendations {
        let confidence = stock.confidence.min(100) as usize;
        let filled = confidence * CHART_WIDTH / 100;
        let _ = writeln!(
            out,
            "  {:>10} {:>3}% {}",
            stock.symbol,
            stock.confidence,
            "█".repeat(filled)
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GroundingSource, RiskTolerance};

    fn test_profile() -> UserProfile {
        UserProfile {
            name: "Asha".to_string(),
            age: 31,
            occupation: "Engineer".to_string(),
            monthly_income: 150_000,
            risk_tolerance: RiskTolerance::High,
        }
    }

    fn stock(symbol: &str, confidence: u8) -> StockRecommendation {
        StockRecommendation {
            symbol: symbol.to_string(),
            company_name: format!("{} Ltd", symbol),
            reason: "Solid fundamentals".to_string(),
            sector: "Energy".to_string(),
            confidence,
            target_price: None,
            news_highlights: None,
            key_metrics: None,
        }
    }

    fn sample_analysis() -> AnalysisResult {
        AnalysisResult {
            risk_profile: "Aggressive growth investor".to_string(),
            market_summary: "Nifty trending up".to_string(),
            recommendations: vec![stock("RELIANCE", 88), stock("TCS", 75)],
            sources: vec![GroundingSource {
                title: "NSE India".to_string(),
                uri: "https://nseindia.com".to_string(),
            }],
        }
    }

    #[test]
    fn quote_url_defaults_to_nse() {
        assert_eq!(
            finance_quote_url("TCS"),
            "https://www.google.com/finance/quote/TCS:NSE"
        );
    }

    #[test]
    fn quote_url_preserves_an_exchange_prefix() {
        assert_eq!(
            finance_quote_url("tcs:bse"),
            "https://www.google.com/finance/quote/TCS:BSE"
        );
        assert_eq!(
            finance_quote_url("  nse:reliance  "),
            "https://www.google.com/finance/quote/NSE:RELIANCE"
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let analysis = sample_analysis();
        let profile = test_profile();
        assert_eq!(
            render_analysis(&analysis, &profile),
            render_analysis(&analysis, &profile)
        );
    }

    #[test]
    fn cards_follow_input_order() {
        let rendered = render_analysis(&sample_analysis(), &test_profile());
        let first = rendered.find("RELIANCE — RELIANCE Ltd").unwrap();
        let second = rendered.find("TCS — TCS Ltd").unwrap();
        assert!(first < second);
    }

    #[test]
    fn missing_optional_blocks_render_placeholders() {
        let rendered = render_analysis(&sample_analysis(), &test_profile());
        assert!(rendered.contains("No recent snippets found."));
        assert!(rendered.contains("Metrics unavailable."));
    }

    #[test]
    fn source_list_is_capped_at_five() {
        let mut analysis = sample_analysis();
        analysis.sources = (0..8)
            .map(|i| GroundingSource {
                title: format!("Source {}", i),
                uri: format!("https://example.com/{}", i),
            })
            .collect();

        let rendered = render_analysis(&analysis, &test_profile());
        assert!(rendered.contains("Source 4"));
        assert!(!rendered.contains("Source 5"));
    }

    #[test]
    fn chart_bars_scale_with_confidence() {
        let chart = render_confidence_chart(&[stock("A", 100), stock("B", 50)]);
        let lines: Vec<&str> = chart.lines().collect();
        let bar_len = |line: &str| line.chars().filter(|c| *c == '█').count();
        assert_eq!(bar_len(lines[0]), CHART_WIDTH);
        assert_eq!(bar_len(lines[1]), CHART_WIDTH / 2);
    }
}

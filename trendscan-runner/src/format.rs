//! Human-readable rendering of results and scans.
//!
//! Output is plain UTF-8 text with a few emoji markers; no transport-specific
//! markup, so any notifier can deliver it unchanged.

use chrono::{DateTime, Utc};
use trendscan_core::template::CRITERION_COUNT;
use trendscan_core::{Criterion, ScreenResult, TemplateConfig, Verdict};

use crate::screener::BatchResult;

fn status_marker(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Perfect => "🚀",
        Verdict::Qualifies => "⚡",
        Verdict::NearMiss => "👀",
        Verdict::Fails | Verdict::Incomplete => "📊",
    }
}

fn price(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.1}%"))
}

/// Criterion label using the configured windows and thresholds.
pub fn criterion_label(criterion: Criterion, config: &TemplateConfig) -> String {
    let (s, m, l) = (config.short_window, config.medium_window, config.long_window);
    match criterion {
        Criterion::PriceAboveMediumSma => format!("Price > {m}-day SMA"),
        Criterion::PriceAboveLongSma => format!("Price > {l}-day SMA"),
        Criterion::MediumSmaAboveLongSma => format!("{m}-day SMA > {l}-day SMA"),
        Criterion::LongSmaTrendingUp => {
            format!("{l}-day SMA up over {} bars", config.trend_lookback)
        }
        Criterion::ShortSmaAboveMediumSma => format!("{s}-day SMA > {m}-day SMA"),
        Criterion::ShortSmaAboveLongSma => format!("{s}-day SMA > {l}-day SMA"),
        Criterion::PriceAboveShortSma => format!("Price > {s}-day SMA"),
        Criterion::AboveRangeLow => {
            format!("≥{}% above 52W low", config.min_above_low_pct)
        }
        Criterion::NearRangeHigh => {
            format!("Within {}% of 52W high", config.max_below_high_pct)
        }
    }
}

/// Full alert message for one result.
pub fn render_alert(result: &ScreenResult, config: &TemplateConfig) -> String {
    let ind = &result.indicators;
    let mut out = format!(
        "{} TREND TEMPLATE ALERT: {}\n\
{} - Score: {}/{}\n",
        status_marker(result.verdict),
        result.symbol,
        result.verdict.label(),
        result.score,
        CRITERION_COUNT
    );
    if let Some(date) = result.as_of {
        out.push_str(&format!("As of: {date}\n"));
    }

    out.push_str(&format!(
        "\n💰 Price: {}\n\n\
📊 Moving averages:\n\
• {}-day SMA: {}\n\
• {}-day SMA: {}\n\
• {}-day SMA: {}\n\n",
        price(ind.price),
        config.short_window,
        price(ind.sma_short),
        config.medium_window,
        price(ind.sma_medium),
        config.long_window,
        price(ind.sma_long)
    ));

    if ind.range_complete {
        out.push_str("📈 52-week range:\n");
    } else {
        out.push_str(&format!("📈 52-week range (partial, {} bars):\n", ind.range_bars));
    }
    out.push_str(&format!(
        "• High: {} ({} away)\n• Low: {} ({} above)\n",
        price(ind.range_high),
        pct(ind.pct_below_high()),
        price(ind.range_low),
        pct(ind.pct_above_low())
    ));

    out.push_str("\nCriteria:\n");
    for c in &result.criteria {
        let icon = match (c.evaluated, c.passed) {
            (false, _) => "⏳",
            (true, true) => "✅",
            (true, false) => "❌",
        };
        out.push_str(&format!("{icon} {}\n", criterion_label(c.criterion, config)));
    }

    out.push_str(&format!("\n#TrendTemplate #{}", hashtag(&result.symbol)));
    out
}

/// Exchange suffixes like `.NS` are dropped from hashtags.
fn hashtag(symbol: &str) -> String {
    symbol
        .split('.')
        .next()
        .unwrap_or(symbol)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Scan digest: counts plus the best `top_n` qualifying results.
pub fn render_scan_summary(batch: &BatchResult, scanned_at: DateTime<Utc>, top_n: usize) -> String {
    let s = &batch.summary;
    let qualified: Vec<&ScreenResult> = batch
        .ranked()
        .into_iter()
        .filter(|r| r.qualifies)
        .collect();

    let marker = if qualified.is_empty() { "📊" } else { "🎯" };
    let mut out = format!(
        "{marker} Trend Template scan complete\n\n\
⏰ Scan time: {}\n\
🔎 Screened: {}/{}\n",
        scanned_at.format("%Y-%m-%d %H:%M UTC"),
        s.screened,
        s.total
    );
    if s.errored > 0 {
        out.push_str(&format!("⚠️ Errors: {}\n", s.errored));
    }
    if s.skipped > 0 {
        out.push_str(&format!("⏹ Skipped (cancelled): {}\n", s.skipped));
    }
    out.push_str(&format!(
        "📈 Qualified: {} ({} perfect), near misses: {}\n\n",
        s.qualified, s.perfect, s.near_miss
    ));

    if qualified.is_empty() {
        out.push_str("No stocks currently meet the Trend Template.");
        return out;
    }

    out.push_str("Top results:\n");
    for r in qualified.iter().take(top_n) {
        out.push_str(&format!(
            "• {} (Score: {}/{CRITERION_COUNT})\n",
            r.symbol, r.score
        ));
    }
    if qualified.len() > top_n {
        out.push_str(&format!("…and {} more\n", qualified.len() - top_n));
    }
    out.push_str("\n#TrendTemplateScan");
    out
}

/// One line per near miss, listing the criteria that failed.
pub fn render_near_misses(results: &[&ScreenResult], config: &TemplateConfig) -> String {
    if results.is_empty() {
        return "No near misses.".to_string();
    }
    let mut out = format!("👀 Near misses ({}):", results.len());
    for r in results {
        let missing: Vec<String> = r
            .failed_criteria()
            .map(|c| criterion_label(c.criterion, config))
            .collect();
        out.push_str(&format!(
            "\n• {} {}/{CRITERION_COUNT}, missing: {}",
            r.symbol,
            r.score,
            missing.join("; ")
        ));
    }
    out
}

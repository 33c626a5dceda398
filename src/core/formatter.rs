/// Inserts `,` between groups of three digits: 1234567 -> "1,234,567".
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Returns "12,345".
pub fn format_count(count: u64) -> String {
    group_thousands(&count.to_string())
}

/// Returns "€14,062.50" (or "-€1,140.00" for negative amounts).
pub fn format_currency(amount: f64, symbol: &str) -> String {
    if !amount.is_finite() {
        return format!("{}-", symbol);
    }
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}{}.{}", sign, symbol, group_thousands(int_part), frac_part)
}

/// Returns "12.5h".
pub fn format_hours(hours: f64) -> String {
    format!("{:.1}h", hours)
}

/// Returns "+14702.6%" for gains, "-12.0%" for losses, "0.0%" otherwise.
pub fn format_signed_percent(percent: f64) -> String {
    if percent > 0.0 {
        format!("+{:.1}%", percent)
    } else {
        format!("{:.1}%", percent)
    }
}

/// Returns "today", "yesterday", "5d ago" or "never".
pub fn format_days_since(days: Option<i64>) -> String {
    match days {
        None => "never".to_string(),
        Some(d) if d <= 0 => "today".to_string(),
        Some(1) => "yesterday".to_string(),
        Some(d) => format!("{}d ago", d),
    }
}

/// Returns "[██████░░░░░░]" where █ = the given percentage of the width.
pub fn format_percent_bar(percent: f64, width: usize) -> String {
    let percent = if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let filled_blocks = ((percent / 100.0) * width as f64).round() as usize;
    let empty_blocks = width.saturating_sub(filled_blocks);

    format!("[{}{}]", "█".repeat(filled_blocks), "░".repeat(empty_blocks))
}

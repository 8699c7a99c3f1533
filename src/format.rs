//! Number formatting and template filling
//!
//! Amounts are passed through verbatim (no currency conversion) and rendered
//! with a fixed symbol prefix and comma thousands separators.

/// Fixed currency prefix for every rendered amount
pub const CURRENCY_SYMBOL: &str = "$";

/// Group the integer part of `value` in threes, keeping `decimals` fraction digits
pub fn group_thousands(value: f64, decimals: usize) -> String {
    let raw = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let digits = int_part.as_bytes();
    let mut grouped = String::with_capacity(raw.len() + digits.len() / 3 + 1);
    for (i, d) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*d as char);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    let is_zero = raw.bytes().all(|b| b == b'0' || b == b'.');
    if value < 0.0 && !is_zero {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Whole amounts without decimals, fractional amounts with two
pub fn money(value: f64) -> String {
    let decimals = if value.fract() == 0.0 { 0 } else { 2 };
    format!("{}{}", CURRENCY_SYMBOL, group_thousands(value, decimals))
}

/// Amount rounded to the nearest whole unit
pub fn money_whole(value: f64) -> String {
    format!("{}{}", CURRENCY_SYMBOL, group_thousands(value, 0))
}

/// Month counts are shown with one decimal
pub fn months(value: f64) -> String {
    format!("{:.1}", value)
}

pub fn percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Fill `{name}` slots in a template. Unknown slots are left untouched.
pub fn render(template: &str, slots: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len() + 32);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match slots.iter().find(|(slot, _)| *slot == name) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Slot names referenced by a template, in order of appearance
pub fn slot_names(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        names.push(&after[..close]);
        rest = &after[close + 1..];
    }
    names
}

/// Truncate to at most `max` characters (not bytes)
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(330_000.0, 0), "330,000");
        assert_eq!(group_thousands(999.0, 0), "999");
        assert_eq!(group_thousands(1_000.0, 0), "1,000");
        assert_eq!(group_thousands(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(group_thousands(-1_200.0, 0), "-1,200");
        assert_eq!(group_thousands(-0.2, 0), "0");
    }

    #[test]
    fn test_money_picks_precision() {
        assert_eq!(money(330_000.0), "$330,000");
        assert_eq!(money(2_550.5), "$2,550.50");
        assert_eq!(money_whole(1_083.333), "$1,083");
        assert_eq!(months(2.0), "2.0");
        assert_eq!(percent(80.0), "80.0%");
    }

    #[test]
    fn test_render_named_slots() {
        let out = render(
            "Cash {cash}, Total {total}, keep {unknown}",
            &[("cash", "$5,000".into()), ("total", "$330,000".into())],
        );
        assert_eq!(out, "Cash $5,000, Total $330,000, keep {unknown}");
    }

    #[test]
    fn test_render_handles_unclosed_brace() {
        assert_eq!(render("open { brace", &[]), "open { brace");
    }

    #[test]
    fn test_slot_names_and_truncate() {
        assert_eq!(slot_names("{a} and {b}"), vec!["a", "b"]);
        assert_eq!(truncate_chars("नमस्ते दुनिया", 3), "नमस");
        assert_eq!(truncate_chars("short", 120), "short");
    }
}

/// Group an unsigned integer string with thousands separators: 1234567 -> 1,234,567
fn with_commas(int_part: &str) -> String {
    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped.chars().rev().collect()
}

/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let parts: Vec<&str> = cents.split('.').collect();
    let int_part = with_commas(parts[0]);
    let dec_part = parts[1];

    if negative {
        format!("-${int_part}.{dec_part}")
    } else {
        format!("${int_part}.{dec_part}")
    }
}

/// Dollar amount rounded to whole dollars: $1,235. Amounts under $10 keep
/// their cents so small values don't collapse to $0.
pub fn money0(val: f64) -> String {
    if val.abs() < 10.0 {
        return money(val);
    }
    let negative = val < 0.0;
    let rounded = format!("{:.0}", val.abs());
    let grouped = with_commas(&rounded);
    if negative {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Percentage with two decimals: 12.34%
pub fn pct(val: f64) -> String {
    format!("{val:.2}%")
}

/// Percentage with one decimal: 12.3%
pub fn pct1(val: f64) -> String {
    format!("{val:.1}%")
}

/// French month name for a 1-based month number. The report layout is
/// French throughout, so month headers are too.
pub fn month_name_fr(month: u32) -> &'static str {
    match month {
        1 => "Janvier",
        2 => "Février",
        3 => "Mars",
        4 => "Avril",
        5 => "Mai",
        6 => "Juin",
        7 => "Juillet",
        8 => "Août",
        9 => "Septembre",
        10 => "Octobre",
        11 => "Novembre",
        12 => "Décembre",
        _ => "?",
    }
}

/// Header label for a "YYYY-MM" month key.
pub fn month_label(month_key: &str) -> String {
    month_key
        .split('-')
        .nth(1)
        .and_then(|m| m.parse::<u32>().ok())
        .map(|m| month_name_fr(m).to_string())
        .unwrap_or_else(|| month_key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56), "$1,234.56");
        assert_eq!(money(-500.00), "-$500.00");
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(1000000.99), "$1,000,000.99");
        assert_eq!(money(42.10), "$42.10");
    }

    #[test]
    fn test_money0_rounds_whole_dollars() {
        assert_eq!(money0(523456.78), "$523,457");
        assert_eq!(money0(-1234.6), "-$1,235");
        assert_eq!(money0(10.0), "$10");
    }

    #[test]
    fn test_money0_keeps_cents_under_ten() {
        assert_eq!(money0(9.99), "$9.99");
        assert_eq!(money0(0.0), "$0.00");
        assert_eq!(money0(-2.5), "-$2.50");
    }

    #[test]
    fn test_pct() {
        assert_eq!(pct(2.5), "2.50%");
        assert_eq!(pct(-0.125), "-0.12%");
        assert_eq!(pct1(25.04), "25.0%");
    }

    #[test]
    fn test_month_labels() {
        assert_eq!(month_name_fr(1), "Janvier");
        assert_eq!(month_name_fr(8), "Août");
        assert_eq!(month_label("2026-02"), "Février");
        assert_eq!(month_label("garbage"), "garbage");
    }
}

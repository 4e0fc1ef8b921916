//! Currency-aware rendering of minor-unit amounts, used for order note
//! text only. Arithmetic stays in integer minor units everywhere else.

/// Currencies whose minor unit is the whole unit: no fraction part is
/// rendered for these.
const ZERO_DECIMAL: &[&str] = &[
    "bif", "clp", "djf", "gnf", "jpy", "kmf", "krw", "mga", "pyg", "rwf", "ugx", "vnd", "vuv",
    "xaf", "xof", "xpf",
];

pub fn is_zero_decimal(currency: &str) -> bool {
    ZERO_DECIMAL.contains(&currency)
}

fn symbol(currency: &str) -> Option<&'static str> {
    match currency {
        "usd" => Some("$"),
        "aud" => Some("A$"),
        "cad" => Some("C$"),
        "nzd" => Some("NZ$"),
        "hkd" => Some("HK$"),
        "eur" => Some("€"),
        "gbp" => Some("£"),
        "jpy" => Some("¥"),
        "inr" => Some("₹"),
        "krw" => Some("₩"),
        "vnd" => Some("₫"),
        "brl" => Some("R$"),
        _ => None,
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Render a minor-unit amount as a human-readable, currency-aware string.
///
/// `format_amount(1999, "eur")` is `€19.99`; `format_amount(1500, "jpy")`
/// is `¥1,500`. Currencies without a known symbol fall back to the
/// uppercase code: `format_amount(1234, "chf")` is `CHF 12.34`.
/// Deterministic for identical input.
pub fn format_amount(amount_minor: i64, currency: &str) -> String {
    let currency = currency.to_ascii_lowercase();
    let magnitude = amount_minor.unsigned_abs();

    let body = if is_zero_decimal(&currency) {
        group_thousands(magnitude)
    } else {
        format!("{}.{:02}", group_thousands(magnitude / 100), magnitude % 100)
    };

    let rendered = match symbol(&currency) {
        Some(sym) => format!("{}{}", sym, body),
        None => format!("{} {}", currency.to_ascii_uppercase(), body),
    };

    if amount_minor < 0 {
        format!("-{}", rendered)
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_decimal_currencies() {
        assert_eq!(format_amount(1999, "eur"), "€19.99");
        assert_eq!(format_amount(1500, "usd"), "$15.00");
        assert_eq!(format_amount(5, "gbp"), "£0.05");
    }

    #[test]
    fn test_zero_decimal_currencies() {
        assert_eq!(format_amount(1500, "jpy"), "¥1,500");
        assert_eq!(format_amount(75, "krw"), "₩75");
    }

    #[test]
    fn test_thousands_grouping() {
        assert_eq!(format_amount(123_456_789, "usd"), "$1,234,567.89");
        assert_eq!(format_amount(100_000, "jpy"), "¥100,000");
    }

    #[test]
    fn test_unknown_currency_falls_back_to_code() {
        assert_eq!(format_amount(1234, "chf"), "CHF 12.34");
        assert_eq!(format_amount(1234, "CHF"), "CHF 12.34");
    }

    #[test]
    fn test_negative_amounts() {
        assert_eq!(format_amount(-1999, "eur"), "-€19.99");
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(format_amount(1999, "eur"), format_amount(1999, "eur"));
    }
}

//! Lenient money parsing
//!
//! Brazilian amounts come in many shapes: "50", "50,90", "1.234,56",
//! "R$ 1.500", "2k", "3 mil", and the occasional US-style "12.50".

use std::sync::LazyLock;

use regex::Regex;

/// A money token inside a sentence, with an optional thousand multiplier
static AMOUNT_IN_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,3}(?:\.\d{3})+(?:,\d+)?|\d+(?:[.,]\d+)?)(?:\s*(k|mil)\b)?")
        .expect("valid regex")
});

/// Date-shaped tokens whose digits must not be read as money
static DATE_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\b\d{4}-\d{2}-\d{2}\b",
        r"|\b\d{1,2}/\d{1,2}(?:/\d{2,4})?\b",
        r"|\b\d{1,2}-\d{1,2}-\d{2,4}\b",
        r"|\b\d{1,2}\.\d{1,2}\.\d{2,4}\b",
        r"|\bdia\s+\d{1,2}\b",
    ))
    .expect("valid regex")
});

/// Parse a single amount token, keeping its sign
///
/// Returns `None` for anything that is not a finite number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let lowered = raw.trim().to_lowercase();
    let mut token: String = lowered
        .replace("r$", "")
        .replace("reais", "")
        .replace('$', "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let negative = token.starts_with('-');
    if negative || token.starts_with('+') {
        token.remove(0);
    }

    let mut multiplier = 1.0;
    if let Some(stripped) = token.strip_suffix("mil") {
        token = stripped.to_string();
        multiplier = 1000.0;
    } else if let Some(stripped) = token.strip_suffix('k') {
        token = stripped.to_string();
        multiplier = 1000.0;
    }

    let value = parse_number(&token)? * multiplier;
    Some(if negative { -value } else { value })
}

/// Find the first money amount in free text (always non-negative)
///
/// Dates ("15/03", "05-04-23", "01.02.2024", "2024-06-09", "dia 5") are skipped.
pub fn find_amount(text: &str) -> Option<f64> {
    let without_dates = DATE_TOKENS.replace_all(text, " ");
    let caps = AMOUNT_IN_TEXT.captures(&without_dates)?;

    let value = parse_number(&caps[1])?;
    let multiplier = if caps.get(2).is_some() { 1000.0 } else { 1.0 };
    Some(value * multiplier)
}

fn parse_number(token: &str) -> Option<f64> {
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return None;
    }

    let dots = token.matches('.').count();
    let commas = token.matches(',').count();

    let normalized = match (dots, commas) {
        (0, 0) => token.to_string(),
        // Both present: the last one is the decimal separator
        (_, _) if dots > 0 && commas > 0 => {
            let last_dot = token.rfind('.')?;
            let last_comma = token.rfind(',')?;
            if last_comma > last_dot {
                token.replace('.', "").replace(',', ".")
            } else {
                token.replace(',', "")
            }
        }
        (0, 1) => token.replace(',', "."),
        (0, _) => token.replace(',', ""),
        (1, 0) => {
            // "1.500" is fifteen hundred, "12.50" is twelve and a half
            let decimals = token.len() - token.rfind('.')? - 1;
            if decimals == 3 {
                token.replace('.', "")
            } else {
                token.to_string()
            }
        }
        (_, _) => token.replace('.', ""),
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_brazilian_formats() {
        assert_eq!(parse_amount("50"), Some(50.0));
        assert_eq!(parse_amount("50,90"), Some(50.9));
        assert_eq!(parse_amount("1.234,56"), Some(1234.56));
        assert_eq!(parse_amount("R$ 1.500"), Some(1500.0));
        assert_eq!(parse_amount("1.000.000"), Some(1_000_000.0));
    }

    #[test]
    fn test_parse_amount_other_formats() {
        assert_eq!(parse_amount("12.50"), Some(12.5));
        assert_eq!(parse_amount("1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("$ 20"), Some(20.0));
        assert_eq!(parse_amount("2k"), Some(2000.0));
        assert_eq!(parse_amount("3 mil"), Some(3000.0));
        assert_eq!(parse_amount("1,5k"), Some(1500.0));
    }

    #[test]
    fn test_parse_amount_sign() {
        assert_eq!(parse_amount("-12,50"), Some(-12.5));
        assert_eq!(parse_amount("+80"), Some(80.0));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("cinquenta"), None);
        assert_eq!(parse_amount("12a"), None);
        assert_eq!(parse_amount("R$"), None);
    }

    #[test]
    fn test_find_amount_in_sentence() {
        assert_eq!(find_amount("Gastei 50 reais no mercado ontem"), Some(50.0));
        assert_eq!(find_amount("paguei R$ 1.234,56 de aluguel"), Some(1234.56));
        assert_eq!(find_amount("recebi 2k de freela"), Some(2000.0));
        assert_eq!(find_amount("ganhei 3 mil de bônus"), Some(3000.0));
        assert_eq!(find_amount("lanche de 12.50"), Some(12.5));
    }

    #[test]
    fn test_find_amount_skips_dates() {
        assert_eq!(find_amount("15/03/2024 gastei 80 na farmácia"), Some(80.0));
        assert_eq!(find_amount("no dia 5 paguei 120 de luz"), Some(120.0));
        assert_eq!(find_amount("2024-06-09 uber 23,40"), Some(23.4));
        assert_eq!(find_amount("05-04-23 paguei 50 reais no mercado"), Some(50.0));
        assert_eq!(find_amount("01.02.2024 gastei 80 na farmacia"), Some(80.0));
    }

    #[test]
    fn test_find_amount_keeps_yearless_pairs() {
        assert_eq!(find_amount("gastei 10-12 reais"), Some(10.0));
        assert_eq!(find_amount("1.234.567 de herança"), Some(1_234_567.0));
    }

    #[test]
    fn test_find_amount_none() {
        assert_eq!(find_amount("comprei pão"), None);
        assert_eq!(find_amount(""), None);
    }

    #[test]
    fn test_thousand_multiplier_needs_word_boundary() {
        assert_eq!(find_amount("viajei 50 milhas"), Some(50.0));
    }
}

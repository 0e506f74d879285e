// src/allocation/format.rs

/// Lê um número digitado com separadores de milhar ("1,250,000").
/// Qualquer entrada que não seja um número finito vale zero.
pub fn parse_formatted_number(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Formata com separador de milhar e no máximo duas casas decimais.
pub fn format_number_with_commas(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let cents = (value.abs() * 100.0).round() as u128;
    let integer = cents / 100;
    let fraction = cents % 100;

    let digits = integer.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    match fraction {
        0 => format!("{sign}{grouped}"),
        f if f % 10 == 0 => format!("{sign}{grouped}.{}", f / 10),
        f => format!("{sign}{grouped}.{f:02}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_grouped_numbers() {
        assert_eq!(parse_formatted_number("1,250,000"), 1_250_000.0);
        assert_eq!(parse_formatted_number(" 12,500.75 "), 12_500.75);
        assert_eq!(parse_formatted_number("-3,000"), -3_000.0);
    }

    #[test]
    fn malformed_input_parses_to_zero() {
        assert_eq!(parse_formatted_number("abc"), 0.0);
        assert_eq!(parse_formatted_number(""), 0.0);
        assert_eq!(parse_formatted_number("1.2.3"), 0.0);
        assert_eq!(parse_formatted_number("inf"), 0.0);
    }

    #[test]
    fn formats_with_grouping_separators() {
        assert_eq!(format_number_with_commas(1_250_000.0), "1,250,000");
        assert_eq!(format_number_with_commas(999.0), "999");
        assert_eq!(format_number_with_commas(1_000.0), "1,000");
        assert_eq!(format_number_with_commas(0.0), "0");
        assert_eq!(format_number_with_commas(1_234.5), "1,234.5");
        assert_eq!(format_number_with_commas(1_234.567), "1,234.57");
        assert_eq!(format_number_with_commas(-45_000.0), "-45,000");
    }

    #[test]
    fn format_then_parse_keeps_the_value() {
        let raw = format_number_with_commas(98_765_432.1);
        assert_eq!(raw, "98,765,432.1");
        assert_eq!(parse_formatted_number(&raw), 98_765_432.1);
    }
}

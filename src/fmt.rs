use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Round to cents, midpoint away from zero.
pub fn cents(val: Decimal) -> Decimal {
    val.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a decimal with pt-BR grouping: 1.234,56
pub fn number(val: Decimal) -> String {
    let negative = val.is_sign_negative() && !val.is_zero();
    let abs = cents(val.abs());
    let fixed = format!("{:.2}", abs);
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut with_dots = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_dots.push('.');
        }
        with_dots.push(c);
    }
    let with_dots: String = with_dots.chars().rev().collect();

    if negative {
        format!("-{with_dots},{dec_part}")
    } else {
        format!("{with_dots},{dec_part}")
    }
}

/// Format a decimal as a real amount: R$ 1.234,56
pub fn money(val: Decimal) -> String {
    format!("R$ {}", number(val))
}

/// Parse a pt-BR amount ("10.000,00", "R$ 1.234,56", "1234,5"). Dots are
/// thousands separators and the first comma is the decimal separator.
pub fn parse_money(input: &str) -> Option<Decimal> {
    let cleaned: String = input
        .replace("R$", "")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let normalized = cleaned.replacen(',', ".", 1);
    Decimal::from_str(&normalized).ok()
}

/// Live mask for the amount field: keep digits and commas, then regroup.
/// Input that does not parse is returned as typed.
pub fn mask_money_input(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',')
        .collect();
    match parse_money(&cleaned) {
        Some(val) => number(val),
        None => input.to_string(),
    }
}

pub fn date(d: NaiveDate) -> String {
    d.format("%d/%m/%Y").to_string()
}

/// Parse dd/mm/yyyy, falling back to ISO yyyy-mm-dd.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    NaiveDate::parse_from_str(s, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(dec("1234.56")), "R$ 1.234,56");
        assert_eq!(money(dec("-500")), "R$ -500,00");
        assert_eq!(money(Decimal::ZERO), "R$ 0,00");
        assert_eq!(money(dec("1000000.99")), "R$ 1.000.000,99");
        assert_eq!(money(dec("42.1")), "R$ 42,10");
    }

    #[test]
    fn test_number_rounds_half_away_from_zero() {
        assert_eq!(number(dec("0.005")), "0,01");
        assert_eq!(number(dec("1000")), "1.000,00");
        assert_eq!(number(dec("999.999")), "1.000,00");
    }

    #[test]
    fn test_parse_money_variants() {
        assert_eq!(parse_money("10.000,00"), Some(dec("10000.00")));
        assert_eq!(parse_money("R$ 1.234,56"), Some(dec("1234.56")));
        assert_eq!(parse_money("1234"), Some(dec("1234")));
        assert_eq!(parse_money("1234,5"), Some(dec("1234.5")));
        assert_eq!(parse_money(" R$ 238,92 "), Some(dec("238.92")));
    }

    #[test]
    fn test_parse_money_rejects_garbage() {
        assert_eq!(parse_money(""), None);
        assert_eq!(parse_money("R$"), None);
        assert_eq!(parse_money("abc"), None);
        assert_eq!(parse_money("—"), None);
        assert_eq!(parse_money("1,2,3"), None);
    }

    #[test]
    fn test_mask_money_input() {
        assert_eq!(mask_money_input("10000,00"), "10.000,00");
        assert_eq!(mask_money_input("R$ 730000"), "730.000,00");
        assert_eq!(mask_money_input("abc"), "abc");
    }

    #[test]
    fn test_date_roundtrip_formats() {
        let d = NaiveDate::from_ymd_opt(2022, 11, 4).unwrap();
        assert_eq!(date(d), "04/11/2022");
        assert_eq!(parse_date("04/11/2022"), Some(d));
        assert_eq!(parse_date("2022-11-04"), Some(d));
        assert_eq!(parse_date("31/02/2022"), None);
        assert_eq!(parse_date("yesterday"), None);
    }
}

//! Display formatting shared by the list cards, the detail page and the
//! prize chart. Both pages must go through these helpers so the same number
//! always renders the same way.

/// `$5.00`, `$-0.83`.
pub fn format_currency(value: f64) -> String {
    format!("${}", to_fixed(value, 2))
}

/// Overall odds as `1:N` with two decimals.
pub fn format_odds(odds: f64) -> String {
    format!("1:{}", to_fixed(odds, 2))
}

/// Locale grouped currency used for jackpots and prize amounts: `$100,000`.
pub fn format_grouped_currency(value: f64) -> String {
    format!("${}", format_grouped(value))
}

pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Number of decimals used for a percentage, scaled so that very small
/// shares keep their significant digits.
pub fn percentage_precision(value: f64) -> usize {
    if value < 0.01 {
        6
    } else if value < 0.1 {
        4
    } else if value < 1.0 {
        3
    } else {
        2
    }
}

/// `0.0005 -> 0.000500`, `0.05 -> 0.0500`, `0.5 -> 0.500`, `5 -> 5.00`.
pub fn format_percentage(value: f64) -> String {
    to_fixed(value, percentage_precision(value))
}

/// Fixed-point rendering that rounds half up on the exact binary value,
/// matching browser `Number.prototype.toFixed`.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    // 40 extra digits are enough for the digit after the cut to be exact for
    // any value large enough to round to something other than zero.
    let exact = format!("{:.*}", digits + 40, value.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let (int_out, frac_out) = round_decimal(int_part, frac_part, digits);

    let sign = if value < 0.0 { "-" } else { "" };
    if digits == 0 {
        format!("{sign}{int_out}")
    } else {
        format!("{sign}{int_out}.{frac_out}")
    }
}

/// en-US `toLocaleString` for plain numbers: thousands separators, at most
/// three fraction digits, trailing zeros dropped.
pub fn format_grouped(value: f64) -> String {
    if !value.is_finite() {
        return to_fixed(value, 0);
    }
    let shortest = value.abs().to_string();
    let (int_part, frac_part) = shortest
        .split_once('.')
        .unwrap_or((shortest.as_str(), ""));
    let (int_out, frac_out) = round_decimal(int_part, frac_part, 3);
    let frac_out = frac_out.trim_end_matches('0');

    let sign = if value < 0.0 { "-" } else { "" };
    let grouped = group_thousands(&int_out);
    if frac_out.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_out}")
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Rounds an unsigned decimal (split at the point) to `digits` fraction
/// digits, half up.
fn round_decimal(int_part: &str, frac_part: &str, digits: usize) -> (String, String) {
    let mut int: Vec<u8> = int_part.bytes().collect();
    let mut frac: Vec<u8> = frac_part.bytes().collect();
    let round_up = frac.get(digits).is_some_and(|d| *d >= b'5');
    frac.resize(digits, b'0');

    if round_up {
        let mut carry = true;
        for d in frac.iter_mut().rev().chain(int.iter_mut().rev()) {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            int.insert(0, b'1');
        }
    }
    if int.is_empty() {
        int.push(b'0');
    }

    let to_string = |bytes: Vec<u8>| bytes.into_iter().map(char::from).collect::<String>();
    (to_string(int), to_string(frac))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_scales_with_magnitude() {
        assert_eq!(format_percentage(0.0005), "0.000500");
        assert_eq!(format_percentage(0.05), "0.0500");
        assert_eq!(format_percentage(0.5), "0.500");
        assert_eq!(format_percentage(5.0), "5.00");
        assert_eq!(format_percentage(0.002), "0.002000");
        assert_eq!(format_percentage(0.01), "0.0100");
        assert_eq!(format_percentage(0.1), "0.100");
        assert_eq!(format_percentage(1.0), "1.00");
        assert_eq!(format_percentage(0.0), "0.000000");
    }

    #[test]
    fn to_fixed_rounds_half_up_on_exact_value() {
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(2.5, 0), "3");
        // 1.005 is stored slightly below the midpoint.
        assert_eq!(to_fixed(1.005, 2), "1.00");
        assert_eq!(to_fixed(9.999, 2), "10.00");
        assert_eq!(to_fixed(-0.83, 2), "-0.83");
        assert_eq!(to_fixed(-0.0, 2), "0.00");
        assert_eq!(to_fixed(-0.001, 2), "-0.00");
    }

    #[test]
    fn currency_and_odds() {
        assert_eq!(format_currency(5.0), "$5.00");
        assert_eq!(format_currency(-0.83), "$-0.83");
        assert_eq!(format_odds(4.12), "1:4.12");
        assert_eq!(format_odds(3.0), "1:3.00");
    }

    #[test]
    fn grouped_numbers() {
        assert_eq!(format_grouped(100000.0), "100,000");
        assert_eq!(format_grouped(1_000_000.0), "1,000,000");
        assert_eq!(format_grouped(999.0), "999");
        assert_eq!(format_grouped(1234.5), "1,234.5");
        assert_eq!(format_grouped(0.12345), "0.123");
        assert_eq!(format_grouped(999.9996), "1,000");
        assert_eq!(format_grouped(-2500.0), "-2,500");
        assert_eq!(format_grouped_currency(100000.0), "$100,000");
        assert_eq!(format_count(400000), "400,000");
        assert_eq!(format_count(5), "5");
    }
}

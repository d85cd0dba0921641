//! Free-form duration expression parsing.

use crate::error::GeneratorError;

/// Recognized unit tokens and their multipliers in seconds.
const UNITS: [(&str, u64); 4] = [("hr", 3600), ("h", 3600), ("min", 60), ("m", 60)];

/// Parses a duration expression like "1hr 30m" or "45min" into total seconds.
///
/// Casing and whitespace are insignificant, and any number of quantity/unit
/// pairs combine additively ("1hr30m" = 5400, "2h 2h" = 14400). Text that is
/// not a recognized quantity/unit pair is ignored; the expression is only
/// rejected when nothing recognizable remains, i.e. the total is zero.
pub fn parse_duration(expr: &str) -> Result<u64, GeneratorError> {
    let normalized: String = expr
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let mut total: u64 = 0;
    let mut rest = normalized.as_str();
    while !rest.is_empty() {
        let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits == 0 {
            let mut chars = rest.chars();
            chars.next();
            rest = chars.as_str();
            continue;
        }

        let (quantity, tail) = rest.split_at(digits);
        let letters = tail.chars().take_while(|c| c.is_ascii_alphabetic()).count();
        let (unit, remainder) = tail.split_at(letters);

        if let Some(&(_, multiplier)) = UNITS.iter().find(|(name, _)| *name == unit) {
            // No upper bound on magnitude; saturate instead of overflowing.
            let value = quantity.chars().fold(0u64, |acc, c| {
                acc.saturating_mul(10)
                    .saturating_add(u64::from(c as u8 - b'0'))
            });
            total = total.saturating_add(value.saturating_mul(multiplier));
        }
        rest = remainder;
    }

    if total == 0 {
        return Err(GeneratorError::InvalidFormat(expr.to_string()));
    }
    Ok(total)
}

use super::error::{CalcError, CalcResult};

pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Annual percentage rate to per-month decimal rate.
pub fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 100.0 / MONTHS_PER_YEAR
}

/// Fixed installment that amortizes `pv` over `nper` periods at rate `r`.
pub fn payment(pv: f64, r: f64, nper: f64) -> CalcResult<f64> {
    if !nper.is_finite() || nper <= 0.0 {
        return Err(CalcError::invalid("nper", "must be > 0"));
    }
    if !pv.is_finite() {
        return Err(CalcError::invalid("pv", "must be finite"));
    }
    if !r.is_finite() {
        return Err(CalcError::invalid("r", "must be finite"));
    }
    if r == 0.0 {
        return Ok(pv / nper);
    }
    Ok(r * pv / (1.0 - (1.0 + r).powf(-nper)))
}

/// Number of periods a payment of `pmt` needs to amortize `pv` at rate `r`.
///
/// Returns `None` when the payment never clears the balance (it does not
/// cover the first period's interest) or the solve is otherwise meaningless.
pub fn periods_to_amortize(pv: f64, r: f64, pmt: f64) -> Option<f64> {
    if pmt <= 0.0 {
        return None;
    }
    let periods = if r == 0.0 {
        pv / pmt
    } else {
        -(1.0 - pv * r / pmt).ln() / (1.0 + r).ln()
    };
    (periods.is_finite() && periods >= 0.0).then_some(periods)
}

pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parses a user-typed amount, ignoring currency symbols and separators.
/// Exponent markers are kept so `"1e5"` is read as written, not as `15`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | 'e' | 'E'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `1234567.891` -> `"1,234,567.89"`.
pub fn format_currency(value: f64) -> String {
    let fixed = format!("{:.2}", round_currency(value).abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && round_currency(value) != 0.0 {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{fraction}")
}

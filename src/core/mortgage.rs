use tracing::debug;

use super::error::{
    CalcError, CalcResult, optional_positive, require_non_negative, require_positive,
};
use super::formula::{MONTHS_PER_YEAR, monthly_rate, payment, periods_to_amortize, round_currency};
use super::types::{LoanInput, MortgageResult, YearsRemaining};

#[derive(Debug, Clone, Copy)]
struct MonthlyTerms {
    principal: f64,
    initial_rate: f64,
    secondary_rate: Option<f64>,
    loan_months: f64,
    fixed_months: f64,
    target_months: Option<f64>,
    overpayment: f64,
}

impl MonthlyTerms {
    fn horizon_months(self) -> f64 {
        self.target_months.unwrap_or(self.loan_months)
    }

    fn switch_months(self) -> f64 {
        self.loan_months - self.fixed_months
    }
}

pub fn compute_mortgage(input: &LoanInput) -> CalcResult<MortgageResult> {
    let terms = validate(input)?;

    let required = payment(terms.principal, terms.initial_rate, terms.horizon_months())?;
    let initial_payment = required.abs() + terms.overpayment;

    let mut secondary_monthly_payment = None;
    let mut remaining_balance_after_fixed_term = None;
    if terms.switch_months() > 0.0 {
        let balance = balance_at_switch(terms, initial_payment);
        if !balance.is_finite() {
            return Err(CalcError::invalid("loanTermYears", "is too long to amortize"));
        }
        let secondary_rate = terms
            .secondary_rate
            .ok_or_else(|| CalcError::invalid("secondaryAnnualRatePercent", "is required"))?;
        let secondary = payment(balance, secondary_rate, terms.switch_months())?.abs();
        secondary_monthly_payment = Some(round_currency(secondary));
        remaining_balance_after_fixed_term = Some(round_currency(balance.abs()));
    }

    let years_remaining = years_remaining(input, terms)?;

    debug!(
        principal = terms.principal,
        initial_payment,
        ?secondary_monthly_payment,
        ?years_remaining,
        "computed mortgage"
    );

    Ok(MortgageResult {
        initial_monthly_payment: round_currency(initial_payment),
        secondary_monthly_payment,
        years_remaining,
        remaining_balance_after_fixed_term,
    })
}

fn validate(input: &LoanInput) -> CalcResult<MonthlyTerms> {
    let principal = require_positive("principal", input.principal)?;
    let initial_rate =
        require_positive("initialAnnualRatePercent", input.initial_annual_rate_percent)?;
    let loan_term = require_positive("loanTermYears", input.loan_term_years)?;
    let fixed_term = require_positive("fixedTermYears", input.fixed_term_years)?;
    let overpayment = require_non_negative("overpayment", input.overpayment)?;
    let target_years = optional_positive("targetYears", input.target_years)?;

    let secondary_rate = if fixed_term < loan_term {
        let rate = input
            .secondary_annual_rate_percent
            .ok_or_else(|| CalcError::invalid("secondaryAnnualRatePercent", "is required"))?;
        Some(monthly_rate(require_positive("secondaryAnnualRatePercent", rate)?))
    } else {
        None
    };

    Ok(MonthlyTerms {
        principal,
        initial_rate: monthly_rate(initial_rate),
        secondary_rate,
        loan_months: loan_term * MONTHS_PER_YEAR,
        fixed_months: fixed_term * MONTHS_PER_YEAR,
        target_months: target_years.map(|years| years * MONTHS_PER_YEAR),
        overpayment,
    })
}

/// Future value of the principal at the switch month minus the annuity paid so far.
fn balance_at_switch(terms: MonthlyTerms, applied_payment: f64) -> f64 {
    let growth = (1.0 + terms.initial_rate).powf(terms.fixed_months);
    let future_value = terms.principal * growth;
    let paid_so_far = applied_payment * (growth - 1.0) / terms.initial_rate;
    future_value - paid_so_far
}

fn years_remaining(input: &LoanInput, terms: MonthlyTerms) -> CalcResult<YearsRemaining> {
    let has_overpayment = terms.overpayment > 0.0;
    match (input.target_years, has_overpayment) {
        (_, true) => {
            let term_payment = payment(terms.principal, terms.initial_rate, terms.horizon_months())?
                + terms.overpayment;
            Ok(
                match periods_to_amortize(terms.principal, terms.initial_rate, term_payment) {
                    Some(months) => YearsRemaining::Years(round_currency(months / MONTHS_PER_YEAR)),
                    None => YearsRemaining::NotApplicable,
                },
            )
        }
        (Some(target), false) => Ok(YearsRemaining::Years(target)),
        (None, false) => Ok(YearsRemaining::Years(input.loan_term_years)),
    }
}

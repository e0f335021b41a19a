use tracing::{debug, warn};

use super::error::{
    CalcError, CalcResult, optional_positive, require_non_negative, require_positive,
};
use super::formula::{MONTHS_PER_YEAR, monthly_rate, payment, round_currency};
use super::types::{CostBreakdown, PayoffInput, PayoffResult, SimulationResult, Termination};

pub const MAX_MONTHS: u32 = 600;
pub const DEFAULT_APR_PERCENT: f64 = 25.0;
pub const MINIMUM_PAYMENT_FLOOR: f64 = 15.0;
pub const MINIMUM_PRINCIPAL_SHARE: f64 = 0.025;
const GROWTH_STREAK_LIMIT: u32 = 3;
const SETTLED_BALANCE: f64 = 0.005;

/// Payment below which a balance is likely to grow: interest plus 2.5% of the
/// balance, never less than 15.
pub fn safe_minimum_payment(balance: f64, monthly_rate: f64) -> f64 {
    MINIMUM_PAYMENT_FLOOR.max(balance * (monthly_rate + MINIMUM_PRINCIPAL_SHARE))
}

pub fn effective_apr(annual_rate_percent: Option<f64>) -> f64 {
    match annual_rate_percent {
        Some(rate) if rate > 0.0 => rate,
        _ => DEFAULT_APR_PERCENT,
    }
}

/// Month-by-month interest accrual and payment, capped at `MAX_MONTHS`.
pub fn simulate_payoff(
    principal: f64,
    annual_rate_percent: f64,
    monthly_payment: f64,
    overpayment: f64,
    target_months: Option<u32>,
) -> SimulationResult {
    let inputs_finite = [principal, annual_rate_percent, monthly_payment, overpayment]
        .iter()
        .all(|v| v.is_finite());
    if !inputs_finite {
        let untouched = if principal.is_finite() {
            principal.max(0.0)
        } else {
            0.0
        };
        return SimulationResult {
            payoff_months: 0,
            total_interest: 0.0,
            total_paid: round_currency(untouched),
            final_balance: round_currency(untouched),
            can_pay_off: false,
            growing_debt: false,
            termination: Termination::NoPayment,
            months_below_safe_minimum: 0,
        };
    }

    let rate = monthly_rate(annual_rate_percent);
    let payment_this_month = monthly_payment + overpayment;

    let mut balance = principal;
    let mut previous_balance = principal;
    let mut months = 0u32;
    let mut total_interest = 0.0;
    let mut growth_streak = 0u32;
    let mut months_below_safe_minimum = 0u32;
    let mut termination = Termination::CapReached;

    while months < MAX_MONTHS && balance > 0.0 {
        let interest = balance * rate;
        total_interest += interest;
        balance += interest;

        // Advisory only: never changes the payment applied below.
        let reference_minimum =
            MINIMUM_PAYMENT_FLOOR.max(interest + balance * MINIMUM_PRINCIPAL_SHARE);
        if payment_this_month < reference_minimum {
            months_below_safe_minimum += 1;
        }

        if payment_this_month <= 0.0 {
            termination = Termination::NoPayment;
            break;
        }
        balance = (balance - payment_this_month).max(0.0);
        if balance < SETTLED_BALANCE {
            balance = 0.0;
        }
        months += 1;

        if target_months.is_some_and(|target| months >= target) {
            termination = Termination::TargetReached;
            break;
        }

        if balance > previous_balance {
            growth_streak += 1;
            if growth_streak >= GROWTH_STREAK_LIMIT {
                termination = Termination::Diverging;
                break;
            }
        } else {
            growth_streak = 0;
        }
        previous_balance = balance;
    }

    if balance <= 0.0 && termination == Termination::CapReached {
        termination = Termination::PaidOff;
    }

    let growing_debt = balance > principal || termination == Termination::Diverging;
    let can_pay_off = balance <= 0.0 && !growing_debt;

    SimulationResult {
        payoff_months: months,
        total_interest: round_currency(total_interest),
        total_paid: round_currency(principal + total_interest),
        final_balance: round_currency(balance),
        can_pay_off,
        growing_debt,
        termination,
        months_below_safe_minimum,
    }
}

pub fn compute_payoff(input: &PayoffInput) -> CalcResult<PayoffResult> {
    let principal = require_positive("outstandingBalance", input.outstanding_balance)?;
    let overpayment = require_non_negative("overpayment", input.overpayment)?;
    let target_years = optional_positive("targetYears", input.target_years)?;
    let chosen_payment = optional_positive("monthlyPayment", input.monthly_payment)?;
    if input.annual_rate_percent.is_some_and(|rate| !rate.is_finite()) {
        return Err(CalcError::invalid("annualRatePercent", "must be finite"));
    }

    let used_apr = effective_apr(input.annual_rate_percent);
    let rate = monthly_rate(used_apr);
    let safe_minimum = safe_minimum_payment(principal, rate);

    let target_months = target_years.map(target_years_to_months).transpose()?;
    let monthly_payment = match target_months {
        Some(months) => payment(principal, rate, f64::from(months))?,
        None => chosen_payment.unwrap_or(safe_minimum),
    };

    let below_safe_minimum = target_months.is_none() && monthly_payment < safe_minimum;
    if below_safe_minimum {
        warn!(
            monthly_payment,
            safe_minimum, "payment is below the safe minimum; debt may grow"
        );
    }

    let simulation = simulate_payoff(
        principal,
        used_apr,
        monthly_payment,
        overpayment,
        target_months,
    );

    debug!(
        principal,
        used_apr,
        monthly_payment,
        months = simulation.payoff_months,
        termination = ?simulation.termination,
        "simulated payoff"
    );

    Ok(PayoffResult {
        used_apr,
        monthly_payment: round_currency(monthly_payment),
        payoff_months: simulation.payoff_months,
        total_interest_paid: simulation.total_interest,
        total_paid: simulation.total_paid,
        final_balance: simulation.final_balance,
        can_pay_off: simulation.can_pay_off,
        growing_debt: simulation.growing_debt,
        safe_minimum_payment: round_currency(safe_minimum),
        below_safe_minimum,
        termination: simulation.termination,
        months_below_safe_minimum: simulation.months_below_safe_minimum,
        breakdown: CostBreakdown {
            principal: round_currency(principal),
            interest: simulation.total_interest,
        },
    })
}

fn target_years_to_months(years: f64) -> CalcResult<u32> {
    let months = (years * MONTHS_PER_YEAR).round();
    if months < 1.0 {
        return Err(CalcError::invalid("targetYears", "must be at least one month"));
    }
    Ok(months.min(f64::from(MAX_MONTHS)) as u32)
}

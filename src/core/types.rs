use serde::Serialize;

/// Dual-rate mortgage parameters. Rates are annual percentages.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanInput {
    pub principal: f64,
    pub initial_annual_rate_percent: f64,
    pub secondary_annual_rate_percent: Option<f64>,
    pub loan_term_years: f64,
    pub fixed_term_years: f64,
    pub overpayment: f64,
    pub target_years: Option<f64>,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum YearsRemaining {
    Years(f64),
    NotApplicable,
}

impl YearsRemaining {
    pub fn years(self) -> Option<f64> {
        match self {
            YearsRemaining::Years(years) => Some(years),
            YearsRemaining::NotApplicable => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageResult {
    pub initial_monthly_payment: f64,
    pub secondary_monthly_payment: Option<f64>,
    pub years_remaining: YearsRemaining,
    pub remaining_balance_after_fixed_term: Option<f64>,
}

/// Credit-card style balance to simulate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PayoffInput {
    pub outstanding_balance: f64,
    pub annual_rate_percent: Option<f64>,
    pub target_years: Option<f64>,
    pub overpayment: f64,
    pub monthly_payment: Option<f64>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Termination {
    PaidOff,
    TargetReached,
    Diverging,
    NoPayment,
    CapReached,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub payoff_months: u32,
    pub total_interest: f64,
    pub total_paid: f64,
    pub final_balance: f64,
    pub can_pay_off: bool,
    pub growing_debt: bool,
    pub termination: Termination,
    pub months_below_safe_minimum: u32,
}

/// Principal vs interest split of the total paid.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub principal: f64,
    pub interest: f64,
}

impl CostBreakdown {
    pub fn interest_share(self) -> f64 {
        let total = self.principal + self.interest;
        if total <= 0.0 { 0.0 } else { self.interest / total }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffResult {
    #[serde(rename = "usedAPR")]
    pub used_apr: f64,
    pub monthly_payment: f64,
    pub payoff_months: u32,
    pub total_interest_paid: f64,
    pub total_paid: f64,
    pub final_balance: f64,
    pub can_pay_off: bool,
    pub growing_debt: bool,
    pub safe_minimum_payment: f64,
    pub below_safe_minimum: bool,
    pub termination: Termination,
    pub months_below_safe_minimum: u32,
    pub breakdown: CostBreakdown,
}

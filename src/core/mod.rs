mod error;
pub mod formula;
mod mortgage;
mod payoff;
mod types;

pub use error::{CalcError, CalcResult};
pub use mortgage::compute_mortgage;
pub use payoff::{
    DEFAULT_APR_PERCENT, MAX_MONTHS, compute_payoff, effective_apr, safe_minimum_payment,
    simulate_payoff,
};
pub use types::{
    CostBreakdown, LoanInput, MortgageResult, PayoffInput, PayoffResult, SimulationResult,
    Termination, YearsRemaining,
};

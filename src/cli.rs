use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::api::run_http_server;
use crate::config::ServerConfig;
use crate::core::{
    LoanInput, MortgageResult, PayoffInput, PayoffResult, Termination, YearsRemaining,
    compute_mortgage, compute_payoff, formula::format_currency,
};

#[derive(Parser, Debug)]
#[command(
    name = "repay",
    version,
    about = "Dual-rate mortgage and credit-card payoff calculator"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON calculator API
    Serve(ServeArgs),
    /// Monthly payments for a mortgage with an initial fixed-rate period
    Mortgage(MortgageArgs),
    /// Simulate paying off a credit-card balance
    Payoff(PayoffArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, help = "TOML file with host and port settings")]
    pub config: Option<PathBuf>,
    #[arg(long, help = "Address to bind, overrides the config file")]
    pub host: Option<IpAddr>,
    #[arg(long, help = "Port to listen on, overrides the config file")]
    pub port: Option<u16>,
}

#[derive(Args, Debug)]
pub struct MortgageArgs {
    #[arg(long)]
    pub principal: f64,
    #[arg(long, help = "Annual rate during the fixed term in percent, e.g. 4.5")]
    pub initial_rate: f64,
    #[arg(
        long,
        help = "Annual rate after the fixed term in percent; required when --fixed-term < --loan-term"
    )]
    pub secondary_rate: Option<f64>,
    #[arg(long, help = "Loan term in years")]
    pub loan_term: f64,
    #[arg(long, help = "Fixed-rate term in years")]
    pub fixed_term: f64,
    #[arg(long, default_value_t = 0.0, help = "Extra amount paid every month")]
    pub overpayment: f64,
    #[arg(long, help = "Desired payoff horizon in years")]
    pub target_years: Option<f64>,
    #[arg(long, help = "Print the result as JSON")]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct PayoffArgs {
    #[arg(long)]
    pub balance: f64,
    #[arg(long, help = "Annual percentage rate; 25 is used when omitted or <= 0")]
    pub apr: Option<f64>,
    #[arg(long, help = "Desired payoff horizon in years")]
    pub target_years: Option<f64>,
    #[arg(long, default_value_t = 0.0, help = "Extra amount paid every month")]
    pub overpayment: f64,
    #[arg(
        long,
        help = "Fixed monthly payment; defaults to the safe minimum when no target is given"
    )]
    pub monthly_payment: Option<f64>,
    #[arg(long, help = "Print the result as JSON")]
    pub json: bool,
}

impl From<&MortgageArgs> for LoanInput {
    fn from(args: &MortgageArgs) -> Self {
        LoanInput {
            principal: args.principal,
            initial_annual_rate_percent: args.initial_rate,
            secondary_annual_rate_percent: args.secondary_rate,
            loan_term_years: args.loan_term,
            fixed_term_years: args.fixed_term,
            overpayment: args.overpayment,
            target_years: args.target_years,
        }
    }
}

impl From<&PayoffArgs> for PayoffInput {
    fn from(args: &PayoffArgs) -> Self {
        PayoffInput {
            outstanding_balance: args.balance,
            annual_rate_percent: args.apr,
            target_years: args.target_years,
            overpayment: args.overpayment,
            monthly_payment: args.monthly_payment,
        }
    }
}

pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Serve(args) => {
            let config = match &args.config {
                Some(path) => ServerConfig::from_file(path)?,
                None => ServerConfig::default(),
            };
            run_http_server(config.with_overrides(args.host, args.port)).await?;
        }
        Command::Mortgage(args) => {
            let result = compute_mortgage(&LoanInput::from(&args))?;
            let output = if args.json {
                serde_json::to_string_pretty(&result)?
            } else {
                render_mortgage(&result)
            };
            println!("{output}");
        }
        Command::Payoff(args) => {
            let result = compute_payoff(&PayoffInput::from(&args))?;
            let output = if args.json {
                serde_json::to_string_pretty(&result)?
            } else {
                render_payoff(&result)
            };
            println!("{output}");
        }
    }
    Ok(())
}

fn render_mortgage(result: &MortgageResult) -> String {
    let mut lines = vec![format!(
        "Initial monthly payment:        {}",
        format_currency(result.initial_monthly_payment)
    )];
    if let Some(payment) = result.secondary_monthly_payment {
        lines.push(format!(
            "Monthly payment after fixed term: {}",
            format_currency(payment)
        ));
    }
    if let Some(balance) = result.remaining_balance_after_fixed_term {
        lines.push(format!(
            "Balance when fixed term ends:   {}",
            format_currency(balance)
        ));
    }
    lines.push(match result.years_remaining {
        YearsRemaining::Years(years) => format!("Years to pay off:               {years:.2}"),
        YearsRemaining::NotApplicable => {
            "Years to pay off:               not applicable".to_string()
        }
    });
    lines.join("\n")
}

fn render_payoff(result: &PayoffResult) -> String {
    let mut lines = vec![
        format!("APR used:            {:.2}%", result.used_apr),
        format!(
            "Monthly payment:     {}",
            format_currency(result.monthly_payment)
        ),
        format!(
            "Safe minimum:        {}",
            format_currency(result.safe_minimum_payment)
        ),
        format!("Months simulated:    {}", result.payoff_months),
        format!(
            "Total interest:      {}",
            format_currency(result.total_interest_paid)
        ),
        format!("Total paid:          {}", format_currency(result.total_paid)),
        format!(
            "Final balance:       {}",
            format_currency(result.final_balance)
        ),
        format!(
            "Interest share:      {:.1}%",
            result.breakdown.interest_share() * 100.0
        ),
    ];

    let outcome = match (result.can_pay_off, result.termination) {
        (true, _) => "Outcome: paid off",
        (false, Termination::Diverging) => {
            "Outcome: debt is growing, payment does not cover interest"
        }
        (false, Termination::CapReached) => "Outcome: not paid off within 50 years",
        (false, Termination::NoPayment) => "Outcome: no payment applied",
        (false, _) => "Outcome: balance remains",
    };
    lines.push(outcome.to_string());
    if result.below_safe_minimum {
        lines.push("Warning: payment is below the safe minimum; debt may grow".to_string());
    }
    lines.join("\n")
}

use clap::{Parser, Subcommand, ValueEnum};

use kompass::core::{
    FilingStatus, MilestoneTarget, ProjectionInput, Region, TaxClass, TaxInput, TaxYearConfig,
    compute_tax, monthly_breakdown, project, resolve_milestones, summarize,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFilingStatus {
    Single,
    Married,
}

impl From<CliFilingStatus> for FilingStatus {
    fn from(value: CliFilingStatus) -> Self {
        match value {
            CliFilingStatus::Single => FilingStatus::Single,
            CliFilingStatus::Married => FilingStatus::Married,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliTaxClass {
    I,
    Ii,
    Iii,
    Iv,
    V,
    Vi,
}

impl From<CliTaxClass> for TaxClass {
    fn from(value: CliTaxClass) -> Self {
        match value {
            CliTaxClass::I => TaxClass::I,
            CliTaxClass::Ii => TaxClass::II,
            CliTaxClass::Iii => TaxClass::III,
            CliTaxClass::Iv => TaxClass::IV,
            CliTaxClass::V => TaxClass::V,
            CliTaxClass::Vi => TaxClass::VI,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliRegion {
    BadenWuerttemberg,
    Bavaria,
    Other,
}

impl From<CliRegion> for Region {
    fn from(value: CliRegion) -> Self {
        match value {
            CliRegion::BadenWuerttemberg => Region::BadenWuerttemberg,
            CliRegion::Bavaria => Region::Bavaria,
            CliRegion::Other => Region::Other,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "kompass",
    about = "Personal-finance engine: progressive income tax, net-worth projection, FIRE calculators"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the JSON HTTP API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// One-shot tax breakdown printed as JSON
    Tax {
        #[arg(long, help = "Gross annual income")]
        gross: f64,
        #[arg(long, value_enum, default_value_t = CliFilingStatus::Single)]
        filing_status: CliFilingStatus,
        #[arg(long, value_enum, help = "Wage-tax class; derived from filing status when omitted")]
        tax_class: Option<CliTaxClass>,
        #[arg(long, default_value_t = 0)]
        children: u32,
        #[arg(long, default_value_t = false)]
        church_tax: bool,
        #[arg(long, value_enum)]
        region: Option<CliRegion>,
        #[arg(long, default_value_t = 30)]
        age: u32,
        #[arg(long, default_value_t = 2024)]
        fiscal_year: u32,
        #[arg(long, default_value_t = false, help = "Print the per-month view instead")]
        monthly: bool,
    },
    /// One-shot net-worth projection printed as JSON
    Project {
        #[arg(long, default_value_t = 0.0)]
        cash_savings: f64,
        #[arg(long, default_value_t = 0.0)]
        investments: f64,
        #[arg(long, default_value_t = 0.0)]
        debt: f64,
        #[arg(long, default_value_t = 0.0)]
        monthly_expenses: f64,
        #[arg(long, default_value_t = 0.0)]
        monthly_contribution: f64,
        #[arg(long, default_value_t = 0.0)]
        monthly_debt_payment: f64,
        #[arg(long, default_value_t = 7.0, help = "Expected annual return in percent")]
        annual_return: f64,
        #[arg(long, default_value_t = 2.0, help = "Expected annual inflation in percent")]
        inflation: f64,
        #[arg(long, default_value_t = 30)]
        years: u32,
        #[arg(long, default_value_t = 30)]
        starting_age: u32,
        #[arg(long, help = "Net-worth milestone targets", num_args = 0..)]
        milestone: Vec<f64>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Serve { port } => {
            if let Err(e) = kompass::api::run_http_server(port).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Tax {
            gross,
            filing_status,
            tax_class,
            children,
            church_tax,
            region,
            age,
            fiscal_year,
            monthly,
        } => {
            let cfg = match TaxYearConfig::for_year(fiscal_year) {
                Ok(cfg) => cfg,
                Err(e) => fail(&e.to_string()),
            };
            let input = TaxInput {
                gross_annual_income: gross,
                filing_status: filing_status.into(),
                tax_class: tax_class.map(Into::into),
                number_of_children: children,
                include_church_tax: church_tax,
                resident_region: region.map(Into::into),
                age,
            };
            match compute_tax(&input, &cfg) {
                Ok(annual) => {
                    let result = if monthly {
                        monthly_breakdown(&annual)
                    } else {
                        annual
                    };
                    print_json(&result);
                }
                Err(e) => fail(&e.to_string()),
            }
        }
        Command::Project {
            cash_savings,
            investments,
            debt,
            monthly_expenses,
            monthly_contribution,
            monthly_debt_payment,
            annual_return,
            inflation,
            years,
            starting_age,
            milestone,
        } => {
            let input = ProjectionInput {
                current_cash_savings: cash_savings,
                current_investments: investments,
                current_debt: debt,
                monthly_expenses,
                monthly_investment_contribution: monthly_contribution,
                monthly_debt_payment,
                expected_annual_return_pct: annual_return,
                annual_inflation_pct: inflation,
                projection_years: years,
                starting_age,
            };
            match project(&input) {
                Ok(snapshots) => {
                    let targets: Vec<MilestoneTarget> = milestone
                        .into_iter()
                        .map(|target| MilestoneTarget {
                            target_net_worth: target,
                            label: format!("{target:.0}"),
                        })
                        .collect();
                    print_json(&serde_json::json!({
                        "years": snapshots,
                        "summary": summarize(&snapshots),
                        "milestones": resolve_milestones(&snapshots, &targets),
                    }));
                }
                Err(e) => fail(&e.to_string()),
            }
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => fail(&format!("serialization error: {e}")),
    }
}

fn fail(msg: &str) -> ! {
    eprintln!("{msg}");
    std::process::exit(1)
}

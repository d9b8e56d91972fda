mod cli;

use bidscore::eligibility::{
    determine, filter_candidates, EligibilityContext, FilterOptions, TierScorer,
};
use bidscore::engine::tier;
use bidscore::error::{BidError, Result};
use bidscore::formula::FormulaStore;
use bidscore::industry::{IndustryAverage, IndustryAverages};
use bidscore::report::{self, CandidateCheck, FormulaListing, OutputFormat};
use bidscore::types::config::BidConfig;
use bidscore::types::formula::EligibilityRules;
use bidscore::types::request::{EvaluateRequest, EvaluationInputs};
use bidscore::types::result::{EvaluationError, EvaluationMeta, EvaluationResult};
use bidscore::{candidates, config, telemetry};
use clap::Parser;
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const WARNINGS: i32 = 1;
    pub const BLOCKING: i32 = 2;
    pub const RUNTIME_FAILURE: i32 = 3;
}

/// Configuration, rule documents and industry averages for one workspace.
struct Session {
    config: BidConfig,
    store: FormulaStore,
    averages: IndustryAverages,
}

impl Session {
    fn open(workspace: &Path) -> Result<Self> {
        if !workspace.exists() {
            return Err(BidError::PathNotFound(workspace.display().to_string()));
        }

        let config = match config::load_config(workspace)? {
            Some(config) => config,
            None => {
                info!(
                    workspace = %workspace.display(),
                    "no {} found, using built-in defaults",
                    config::DEFAULT_CONFIG_FILE
                );
                BidConfig::default()
            }
        };

        let store = FormulaStore::load(
            config.formulas.defaults.as_deref(),
            config.formulas.overrides.as_deref(),
        )?;
        let averages = match config.industry.averages.as_deref() {
            Some(path) => IndustryAverages::load(path)?,
            None => IndustryAverages::builtin()?,
        };

        Ok(Self {
            config,
            store,
            averages,
        })
    }

    fn agency_id(&self, requested: Option<&str>) -> Result<String> {
        requested
            .or(self.config.evaluation.default_agency.as_deref())
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or(BidError::MissingAgency)
    }

    fn industry_avg(&self, trade: Option<&str>) -> Option<IndustryAverage> {
        let trade = trade.or(self.config.evaluation.default_trade.as_deref())?;
        let average = self.averages.get(trade);
        if average.is_none() {
            warn!(trade, "no industry average for trade; using raw ratios");
        }
        average
    }

    fn eligibility_rules(
        &mut self,
        agency_id: &str,
        defaults_only: bool,
    ) -> Result<EligibilityRules> {
        let resolved = if defaults_only {
            self.store.defaults()?
        } else {
            self.store.merged()?
        };
        Ok(resolved
            .document
            .find_agency(agency_id)
            .map(|agency| agency.eligibility)
            .unwrap_or_default())
    }
}

fn output_format(format: cli::ReportFormat) -> OutputFormat {
    match format {
        cli::ReportFormat::Json => OutputFormat::Json,
        cli::ReportFormat::Md => OutputFormat::Md,
    }
}

fn eligibility_context(args: &cli::EligibilityArgs) -> EligibilityContext {
    EligibilityContext {
        entry_amount: args.entry_amount,
        base_amount: args.base_amount,
        duty_regions: args.regions.clone(),
        performance_target: args.perf_target,
    }
}

fn run() -> Result<i32> {
    let cli = cli::Cli::parse();
    telemetry::init(cli.verbose, cli.quiet)?;

    match cli.command {
        cli::Commands::Evaluate(cmd) => {
            let mut session = Session::open(&cmd.workspace.workspace)?;
            let request = EvaluateRequest {
                agency_id: session.agency_id(cmd.bid.agency.as_deref())?,
                amount: cmd.bid.amount,
                inputs: EvaluationInputs {
                    debt_ratio: cmd.debt_ratio,
                    current_ratio: cmd.current_ratio,
                    biz_years: cmd.biz_years.map(Value::String),
                    quality_eval: cmd.quality_eval,
                    perf5y: cmd.perf5y,
                    base_amount: cmd.base_amount,
                    credit_grade: cmd.credit_grade,
                    estimated_amount: cmd.bid.estimated_amount,
                    file_type: cmd.bid.file_type.clone(),
                },
                industry_avg: session.industry_avg(cmd.bid.trade.as_deref()),
                use_defaults_only: cmd.bid.defaults_only,
                evaluation_date: cmd.bid.as_of,
            };

            let result = session.store.evaluate(&request)?;
            println!(
                "{}",
                report::render(&result, output_format(cmd.workspace.format))?
            );

            if result.ok {
                Ok(exit_code::SUCCESS)
            } else {
                Ok(exit_code::BLOCKING)
            }
        }
        cli::Commands::Check(cmd) => {
            let mut session = Session::open(&cmd.workspace.workspace)?;
            let agency_id = session.agency_id(cmd.bid.agency.as_deref())?;
            let industry_avg = session.industry_avg(cmd.bid.trade.as_deref());
            let rules = session.eligibility_rules(&agency_id, cmd.bid.defaults_only)?;
            let ctx = eligibility_context(&cmd.eligibility);
            let records = candidates::load(&cmd.candidates)?;

            let mut checks = Vec::with_capacity(records.len());
            for record in &records {
                let profile = record.profile();
                let mut inputs = EvaluationInputs::from_profile(&profile, ctx.base_amount);
                inputs.estimated_amount = cmd.bid.estimated_amount;
                inputs.file_type = cmd.bid.file_type.clone();

                let evaluation = session.store.evaluate(&EvaluateRequest {
                    agency_id: agency_id.clone(),
                    amount: cmd.bid.amount,
                    inputs,
                    industry_avg,
                    use_defaults_only: cmd.bid.defaults_only,
                    evaluation_date: cmd.bid.as_of,
                })?;
                let verdict = evaluation
                    .ok
                    .then(|| determine(&profile, &ctx, rules, evaluation.management.as_ref()));
                checks.push(CandidateCheck {
                    profile,
                    evaluation,
                    verdict,
                });
            }

            println!(
                "{}",
                report::render(&checks, output_format(cmd.workspace.format))?
            );

            if checks.iter().any(|check| !check.evaluation.ok) {
                Ok(exit_code::BLOCKING)
            } else if checks
                .iter()
                .any(|check| check.verdict.as_ref().is_some_and(|verdict| !verdict.ok))
            {
                Ok(exit_code::WARNINGS)
            } else {
                Ok(exit_code::SUCCESS)
            }
        }
        cli::Commands::Filter(cmd) => {
            let mut session = Session::open(&cmd.workspace.workspace)?;
            let agency_id = session.agency_id(cmd.bid.agency.as_deref())?;
            let industry_avg = session.industry_avg(cmd.bid.trade.as_deref());
            let format = output_format(cmd.workspace.format);
            let records = candidates::load(&cmd.candidates)?;

            let mut options = FilterOptions::from(&session.config.filter);
            options.always_exclude.extend(cmd.exclude.iter().cloned());
            if cmd.include_single_bid_eligible {
                options.exclude_single_bid_eligible = false;
            }
            if let Some(grade) = &cmd.min_credit_grade {
                options.min_credit_grade = Some(grade.clone());
            }

            let resolved = if cmd.bid.defaults_only {
                session.store.defaults()?
            } else {
                session.store.merged()?
            };
            let agency = resolved
                .document
                .find_agency(&agency_id)
                .ok_or_else(|| BidError::UnknownAgency(agency_id.clone()))?;
            let selection = tier::select_tier(agency, cmd.bid.amount);
            let Some(selected) = selection.tier else {
                let failure = EvaluationResult::failure(
                    EvaluationError::NoTier,
                    EvaluationMeta {
                        effective_amount: selection.effective_amount,
                        formula_fingerprint: Some(resolved.fingerprint.clone()),
                        ..Default::default()
                    },
                );
                println!("{}", report::render(&failure, format)?);
                return Ok(exit_code::BLOCKING);
            };

            if cmd.baseline_grade {
                options.min_credit_grade = selected
                    .rules
                    .management
                    .credit()
                    .and_then(|credit| credit.baseline_grade())
                    .map(str::to_string);
                if options.min_credit_grade.is_none() {
                    warn!(agency = %agency.id, "tier has no baseline credit grade");
                }
            }

            let scorer = TierScorer {
                rules: &selected.rules,
                industry_avg,
                base_amount: cmd.eligibility.base_amount,
                estimated_amount: cmd.bid.estimated_amount,
                file_type: cmd.bid.file_type.clone(),
                evaluation_date: cmd.bid.as_of,
            };
            let outcome = filter_candidates(
                &records,
                &eligibility_context(&cmd.eligibility),
                agency.eligibility,
                &options,
                Some(&scorer),
            );
            println!("{}", report::render(&outcome, format)?);

            if outcome.excluded.is_empty() {
                Ok(exit_code::SUCCESS)
            } else {
                Ok(exit_code::WARNINGS)
            }
        }
        cli::Commands::Formulas(cmd) => {
            let mut session = Session::open(&cmd.workspace.workspace)?;
            let overrides_applied = !cmd.defaults_only && session.store.has_overrides();
            let resolved = if cmd.defaults_only {
                session.store.defaults()?
            } else {
                session.store.merged()?
            };
            let listing = FormulaListing::new(resolved, overrides_applied);
            println!(
                "{}",
                report::render(&listing, output_format(cmd.workspace.format))?
            );
            Ok(exit_code::SUCCESS)
        }
    }
}

fn main() {
    match run() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(exit_code::RUNTIME_FAILURE);
        }
    }
}

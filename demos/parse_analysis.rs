use anyhow::Context;
use income_ledger_builder::{IncomeStatementParser, LayoutProfile};
use std::env;
use std::fs;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let input = args
        .next()
        .context("usage: parse_analysis <analysis.json> [layout_profile.json]")?;

    let parser = match args.next() {
        Some(profile_path) => {
            let profile = LayoutProfile::from_json_file(&profile_path)
                .with_context(|| format!("loading layout profile {}", profile_path))?;
            IncomeStatementParser::with_profile(profile)?
        }
        None => IncomeStatementParser::new(),
    };

    let raw = fs::read_to_string(&input).with_context(|| format!("reading {}", input))?;
    let outcome = parser.parse_json(&raw);

    println!("{}", outcome.to_json()?);

    if let Some(summary) = &outcome.summary {
        println!("\nYears: {}", summary.years.join(", "));
        println!("Total: {:.2}", summary.total_amount);
    }

    if let Some(report) = &outcome.verification {
        if report.total_match {
            println!("Printed totals agree with extracted rows");
        } else {
            println!(
                "Printed totals differ by {:.2} ({} mismatching years)",
                report.total_diff,
                report.mismatches.len()
            );
        }
    }

    if !outcome.success {
        std::process::exit(1);
    }

    Ok(())
}

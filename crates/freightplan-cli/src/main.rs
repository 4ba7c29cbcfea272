// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

mod outputs;

use freightplan_model::prelude::ProblemLoader;
use freightplan_solver::config::{ConfigError, PlanConfig};
use freightplan_solver::disruption::events_from_json;
use freightplan_solver::pipeline::run_plan;
use freightplan_solver::prelude::StopToken;
use freightplan_solver::report::SummaryFile;
use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const EXIT_OK: i32 = 0;
const EXIT_UNEXPECTED: i32 = 1;
const EXIT_INVALID_DATA: i32 = 2;

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

struct Args {
    data_dir: PathBuf,
    out_dir: PathBuf,
    events_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
}

fn usage() -> &'static str {
    "usage: freightplan <data-dir> [--out <dir>] [--events <file>] [--config <file>]"
}

fn parse_args(argv: &[String]) -> Result<Args, String> {
    let mut data_dir = None;
    let mut out_dir = PathBuf::from("outputs");
    let mut events_path = None;
    let mut config_path = None;

    let mut it = argv.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--out" => {
                out_dir = it.next().ok_or("--out needs a directory")?.into();
            }
            "--events" => {
                events_path = Some(it.next().ok_or("--events needs a file")?.into());
            }
            "--config" => {
                config_path = Some(it.next().ok_or("--config needs a file")?.into());
            }
            flag if flag.starts_with("--") => {
                return Err(format!("unknown flag {flag}"));
            }
            positional => {
                if data_dir.replace(PathBuf::from(positional)).is_some() {
                    return Err("more than one data directory given".to_owned());
                }
            }
        }
    }

    Ok(Args {
        data_dir: data_dir.ok_or("missing data directory")?,
        out_dir,
        events_path,
        config_path,
    })
}

fn run(args: &Args) -> i32 {
    let config = match &args.config_path {
        None => PlanConfig::default(),
        Some(path) => match File::open(path)
            .map_err(ConfigError::from)
            .and_then(PlanConfig::from_json_reader)
        {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("invalid configuration {}: {e}", path.display());
                return EXIT_INVALID_DATA;
            }
        },
    };

    let problem = match ProblemLoader::new().from_dir(&args.data_dir) {
        Ok(problem) => problem,
        Err(e) => {
            tracing::error!("data validation failed: {e}");
            return EXIT_INVALID_DATA;
        }
    };
    tracing::info!(
        flights = problem.flights().len(),
        cargo = problem.cargo().len(),
        rules = problem.rules().len(),
        "loaded {}",
        args.data_dir.display()
    );

    let events = match &args.events_path {
        None => Vec::new(),
        Some(path) => {
            let raw = match std::fs::read_to_string(path) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::error!("cannot read events {}: {e}", path.display());
                    return EXIT_INVALID_DATA;
                }
            };
            match events_from_json(&raw) {
                Ok(events) => events,
                Err(e) => {
                    tracing::error!("invalid events {}: {e}", path.display());
                    return EXIT_INVALID_DATA;
                }
            }
        }
    };

    let t0 = Instant::now();
    let report = run_plan(&problem, &config, &events, &StopToken::new());
    tracing::info!(
        runtime_ms = t0.elapsed().as_millis() as u64,
        total_margin = report.scenario.total_margin.value(),
        delivered = report.scenario.delivered_count(),
        alerts = report.alerts.len(),
        "plan complete"
    );

    if let Err(e) = write_outputs(args, &report, &problem) {
        tracing::error!("failed to write outputs: {e}");
        return EXIT_UNEXPECTED;
    }
    tracing::info!("wrote outputs to {}", args.out_dir.display());
    EXIT_OK
}

fn write_outputs(
    args: &Args,
    report: &freightplan_solver::pipeline::PlanReport,
    problem: &freightplan_model::prelude::Problem,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&args.out_dir)?;
    outputs::write_plan_routes(
        File::create(args.out_dir.join("plan_routes.csv"))?,
        problem,
        &report.scenario,
    )?;
    outputs::write_flight_loads(
        File::create(args.out_dir.join("flight_loads.csv"))?,
        &report.flights,
        &report.scenario,
    )?;
    outputs::write_alerts(File::create(args.out_dir.join("alerts.csv"))?, &report.alerts)?;
    std::fs::write(
        args.out_dir.join("plan_summary.json"),
        SummaryFile::build(report).to_json_pretty()?,
    )?;
    Ok(())
}

fn main() {
    enable_tracing();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{}", usage());
            std::process::exit(EXIT_INVALID_DATA);
        }
    };

    std::process::exit(run(&args));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_minimal_args() {
        let args = parse_args(&argv(&["data"])).unwrap();
        assert_eq!(args.data_dir, PathBuf::from("data"));
        assert_eq!(args.out_dir, PathBuf::from("outputs"));
        assert!(args.events_path.is_none());
        assert!(args.config_path.is_none());
    }

    #[test]
    fn test_parse_full_args() {
        let args = parse_args(&argv(&[
            "data", "--out", "run1", "--events", "e.json", "--config", "c.json",
        ]))
        .unwrap();
        assert_eq!(args.out_dir, PathBuf::from("run1"));
        assert_eq!(args.events_path, Some(PathBuf::from("e.json")));
        assert_eq!(args.config_path, Some(PathBuf::from("c.json")));
    }

    #[test]
    fn test_parse_rejects_unknown_flag() {
        assert!(parse_args(&argv(&["data", "--fast"])).is_err());
    }

    #[test]
    fn test_parse_rejects_missing_data_dir() {
        assert!(parse_args(&argv(&[])).is_err());
    }

    #[test]
    fn test_parse_rejects_two_positionals() {
        assert!(parse_args(&argv(&["a", "b"])).is_err());
    }
}

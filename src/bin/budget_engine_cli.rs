use std::{env, path::PathBuf, process};

use budget_engine::{
    config::{app_data_dir, ConfigManager},
    init,
    utils::build_info,
    Engine, FixedClock, Flow, JsonStore, PeriodKind, SeriesMetric, SeriesWindow,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use uuid::Uuid;

const LEDGER_FILE: &str = "ledger.json";

fn main() {
    init();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

#[derive(Debug, Default)]
struct Options {
    ledger: Option<PathBuf>,
    at: Option<NaiveDateTime>,
    flow: Option<Flow>,
    categories: Vec<Uuid>,
    positional: Vec<String>,
}

fn parse_options(
    mut args: impl Iterator<Item = String>,
) -> Result<Options, Box<dyn std::error::Error>> {
    let mut options = Options::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--ledger" => options.ledger = Some(PathBuf::from(required(&mut args, "--ledger")?)),
            "--at" => options.at = Some(parse_instant(&required(&mut args, "--at")?)?),
            "--flow" => options.flow = Some(parse_flow(&required(&mut args, "--flow")?)?),
            "--category" => options
                .categories
                .push(Uuid::parse_str(&required(&mut args, "--category")?)?),
            _ => options.positional.push(arg),
        }
    }
    Ok(options)
}

fn required(
    args: &mut impl Iterator<Item = String>,
    flag: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    args.next()
        .ok_or_else(|| format!("{flag} expects a value").into())
}

fn parse_instant(value: &str) -> Result<NaiveDateTime, Box<dyn std::error::Error>> {
    if let Ok(instant) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(instant);
    }
    let day = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("`{value}` is not YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS"))?;
    Ok(budget_engine::clock::start_of_day(day))
}

fn parse_flow(value: &str) -> Result<Flow, Box<dyn std::error::Error>> {
    match value.to_ascii_lowercase().as_str() {
        "income" => Ok(Flow::Income),
        "expense" | "expenses" => Ok(Flow::Expense),
        other => Err(format!("unknown flow `{other}`").into()),
    }
}

fn print_json(value: &impl Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_engine(options: &Options) -> Result<Engine, Box<dyn std::error::Error>> {
    let config = ConfigManager::new()?.load()?;
    let path = options
        .ledger
        .clone()
        .or(config.ledger_path)
        .unwrap_or_else(|| app_data_dir().join(LEDGER_FILE));
    let store = JsonStore::open(path)?;
    tracing::debug!(path = %store.path().display(), "ledger opened");
    let engine = Engine::new(store, config.calendar);
    Ok(match options.at {
        Some(at) => engine.with_clock(FixedClock(at)),
        None => engine,
    })
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let options = parse_options(env::args().skip(1))?;
    let Some(command) = options.positional.first().cloned() else {
        print_usage();
        process::exit(1);
    };
    let arg = |index: usize| options.positional.get(index).map(String::as_str);

    match command.as_str() {
        "version" => print_json(&build_info::current())?,
        "period" => {
            let kind: PeriodKind = arg(1).unwrap_or("month").parse()?;
            let engine = open_engine(&options)?;
            print_json(&engine.compute_period(engine.now(), kind))?;
        }
        "advance" => {
            let mut engine = open_engine(&options)?;
            let now = engine.now();
            let created = engine.advance_recurrences(now);
            print_json(&serde_json::json!({ "materialized": created }))?;
        }
        "rollover" => {
            let mut engine = open_engine(&options)?;
            let now = engine.now();
            print_json(&engine.rollover_budgets(now))?;
        }
        "maintain" => {
            let mut engine = open_engine(&options)?;
            let now = engine.now();
            print_json(&engine.run_maintenance(now))?;
        }
        "summary" => {
            let kind: PeriodKind = arg(1).unwrap_or("month").parse()?;
            let engine = open_engine(&options)?;
            let now = engine.now();
            let window = engine.window(kind, now);
            print_json(&engine.aggregate(window, options.flow, &options.categories, now))?;
        }
        "series" => {
            let window: SeriesWindow = arg(1).unwrap_or("week").parse()?;
            let metric: SeriesMetric = arg(2).unwrap_or("cumulative").parse()?;
            let engine = open_engine(&options)?;
            print_json(&engine.build_series(window, metric, options.flow).into_points())?;
        }
        "leftover" => {
            let id = arg(1).ok_or("leftover expects a budget id")?;
            let engine = open_engine(&options)?;
            print_json(&engine.budget_status(Uuid::parse_str(id)?, engine.now())?)?;
        }
        _ => {
            print_usage();
            process::exit(1);
        }
    }

    Ok(())
}

fn print_usage() {
    eprintln!(
        "Usage:\n  budget_engine_cli [--ledger PATH] [--at YYYY-MM-DD[THH:MM:SS]] [--flow income|expense] [--category UUID]... <command>\n\nCommands:\n  period [day|week|month|year|all]\n  advance\n  rollover\n  maintain\n  summary [day|week|month|year|all]\n  series [week|month|ytd] [cumulative|per-bucket]\n  leftover <budget-id>\n  version"
    );
}

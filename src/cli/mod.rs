pub mod output;
pub mod reference;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use output::{ChartKind, ChartReport, ComparisonReport, ExportReport, OutputFormat, Report};
use reference::ReferenceArgs;
use tracing::{debug, level_filters::LevelFilter};

use crate::{
    aggregate::{
        daily::{change_percent, DayComparison},
        Calendar, MonthPartition, Period, WeekStart,
    },
    labels::LabelTable,
    storage::{
        app_usage::AppUsageDataset,
        dataset::UsageDataset,
        source::{JsonUsageFile, UsageSource},
    },
    utils::{
        clock::{Clock, DefaultClock},
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX},
    },
};

const DEFAULT_DATA_FILE: &str = "usage.json";
const DEFAULT_APP_DATA_FILE: &str = "app_usage.json";
/// Roughly two centuries either way, far inside the dates chrono can represent.
const MAX_WEEK_OFFSET: i64 = 10_000;

#[derive(Parser, Debug)]
#[command(name = "Usagechart", version, long_about = None)]
#[command(about = "Aggregates recorded usage time into weekly, monthly and yearly charts", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Daily usage file. By default reads usage.json from $XDG_STATE_HOME/usagechart or $HOME/.local/state/usagechart"
    )]
    data: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "Per application usage file. By default reads app_usage.json from the same directory as usage.json"
    )]
    apps: Option<PathBuf>,
    #[command(flatten)]
    reference: ReferenceArgs,
    #[arg(long, global = true, default_value_t = WeekStart::Monday, help = "First day of a week")]
    week_start: WeekStart,
    #[arg(long, global = true, default_value_t = MonthPartition::FixedChunk, help = "How days of a month are grouped into weeks")]
    partition: MonthPartition,
    #[arg(
        long,
        global = true,
        help = "JSON file with \"weekdays\" (7, Monday first), \"months\" (12) and \"week_template\" (containing {n})"
    )]
    labels: Option<PathBuf>,
    #[arg(long, short, global = true, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug, Clone)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Daily usage of a week, with its total, average and the previous week")]
    Week {
        #[arg(
            long,
            default_value_t = 0,
            allow_negative_numbers = true,
            value_parser = clap::value_parser!(i64).range(-MAX_WEEK_OFFSET..=MAX_WEEK_OFFSET),
            help = "Move by whole weeks. -1 is the previous week"
        )]
        offset: i64,
    },
    #[command(about = "Weekly usage of a month")]
    Month {},
    #[command(about = "Monthly usage of a year")]
    Year {},
    #[command(about = "Usage of a day compared to the day before")]
    Today {},
    #[command(about = "Usage per application over a week, month or year")]
    Apps {
        #[arg(long, default_value_t = Period::Weekly)]
        period: Period,
        #[arg(long, help = "Only show this many of the most used applications")]
        top: Option<usize>,
    },
    #[command(about = "Per application records of a date range")]
    Export {
        #[arg(long, help = "First day of the range. Defaults to the reference date")]
        from: Option<String>,
        #[arg(long, help = "Last day of the range. Defaults to the reference date")]
        to: Option<String>,
    },
}

impl Commands {
    fn uses_app_usage(&self) -> bool {
        matches!(self, Commands::Apps { .. } | Commands::Export { .. })
    }
}

/// Everything a command is evaluated against.
struct ReportContext<'a> {
    calendar: Calendar,
    labels: &'a LabelTable,
    usage: &'a UsageDataset,
    apps: &'a AppUsageDataset,
    reference_args: &'a ReferenceArgs,
    reference: NaiveDate,
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let application_dir = create_application_default_path()?;
    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &application_dir, logging_level, args.log)?;

    let reference = args.reference.resolve(&DefaultClock)?;
    let labels = match &args.labels {
        Some(path) => LabelTable::load(path)?,
        None => LabelTable::default(),
    };

    let usage_path = args
        .data
        .unwrap_or_else(|| application_dir.join(DEFAULT_DATA_FILE));
    let apps_path = args.apps.unwrap_or_else(|| {
        usage_path
            .parent()
            .map_or_else(|| application_dir.clone(), |v| v.to_path_buf())
            .join(DEFAULT_APP_DATA_FILE)
    });

    let usage = JsonUsageFile::<UsageDataset>::new(usage_path).load().await?;
    let apps = if args.commands.uses_app_usage() || usage.is_empty() {
        JsonUsageFile::<AppUsageDataset>::new(apps_path).load().await?
    } else {
        AppUsageDataset::new()
    };
    let usage = if usage.is_empty() && !apps.is_empty() {
        debug!("No daily usage recorded, summing application usage instead");
        apps.daily_totals()
    } else {
        usage
    };

    let calendar = Calendar::new(args.week_start, args.partition);
    debug!("Building report for {reference} with {calendar:?}");

    let context = ReportContext {
        calendar,
        labels: &labels,
        usage: &usage,
        apps: &apps,
        reference_args: &args.reference,
        reference,
    };
    let report = build_report(&args.commands, &context, &DefaultClock)?;
    print!("{}", report.render(args.format)?);
    Ok(())
}

fn build_report(
    command: &Commands,
    context: &ReportContext,
    clock: &impl Clock,
) -> Result<Report> {
    let ReportContext {
        calendar,
        labels,
        usage,
        apps,
        reference_args,
        reference,
    } = context;
    let reference = *reference;

    Ok(match command {
        Commands::Week { offset } => {
            let chart = calendar.week_chart(labels, usage, reference, *offset);
            let (current, previous) = calendar.compare_to_previous_week(usage, reference, *offset);
            let mut report = ChartReport::new(ChartKind::Usage, Period::Weekly, reference, chart);
            report.average = Some(calendar.week_average(usage, reference, *offset));
            report.previous_total = Some(previous);
            report.change_percent = change_percent(current, previous);
            Report::Chart(report)
        }
        Commands::Month {} => usage_report(Period::Monthly, context),
        Commands::Year {} => usage_report(Period::Yearly, context),
        Commands::Today {} => Report::Comparison(ComparisonReport::from((
            reference,
            DayComparison::new(usage, reference),
        ))),
        Commands::Apps { period, top } => Report::Chart(ChartReport::new(
            ChartKind::Apps,
            *period,
            reference,
            calendar.app_chart(*period, apps, reference, *top),
        )),
        Commands::Export { from, to } => {
            let resolve = |date: &Option<String>| match date {
                Some(date) => reference_args.parse(date, clock),
                None => Ok(reference),
            };
            let (start, end) = (resolve(from)?, resolve(to)?);
            if start > end {
                return Err(Args::command()
                    .error(
                        clap::error::ErrorKind::ValueValidation,
                        format!("Export range starts on {start}, after it ends on {end}"),
                    )
                    .into());
            }
            Report::Export(ExportReport {
                start,
                end,
                rows: apps.rows_between(start, end),
            })
        }
    })
}

fn usage_report(period: Period, context: &ReportContext) -> Report {
    let chart = context
        .calendar
        .chart(period, context.labels, context.usage, context.reference);
    Report::Chart(ChartReport::new(
        ChartKind::Usage,
        period,
        context.reference,
        chart,
    ))
}

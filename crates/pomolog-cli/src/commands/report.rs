use chrono::{Local, NaiveDate, Utc};
use clap::Args;
use pomolog_core::DailyReport;

use super::{format_duration, print_json, Context};

#[derive(Args)]
pub struct ReportArgs {
    /// Day to report (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Group by tag instead of note
    #[arg(long)]
    by_tag: bool,
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub fn run(args: ReportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::open()?;
    let report = if ctx.config.report.utc {
        let day = args.date.unwrap_or_else(|| Utc::now().date_naive());
        if args.by_tag {
            ctx.tracker.report_by_tag(day, &Utc)
        } else {
            ctx.tracker.report(day, &Utc)
        }
    } else {
        let day = args.date.unwrap_or_else(|| Local::now().date_naive());
        if args.by_tag {
            ctx.tracker.report_by_tag(day, &Local)
        } else {
            ctx.tracker.report(day, &Local)
        }
    };

    if args.json {
        print_json(&report)?;
    } else {
        print!("{}", render(&report));
    }
    Ok(())
}

fn render(report: &DailyReport) -> String {
    let mut out = format!("{}\n", report.day);
    if report.is_empty() {
        out.push_str("  no sessions\n");
        return out;
    }
    let width = report
        .rows
        .iter()
        .map(|row| row.label.chars().count())
        .max()
        .unwrap_or(0)
        .max("total".len());
    for row in &report.rows {
        out.push_str(&format!(
            "  {:<width$}  {:>8}  ({})\n",
            row.label,
            format_duration(row.total_seconds),
            row.sessions
        ));
    }
    out.push_str(&format!(
        "  {:<width$}  {:>8}\n",
        "total",
        format_duration(report.total_seconds)
    ));
    out
}

pub mod format;

use std::fmt::{Display, Write};

use anyhow::Result;
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;

use crate::{
    aggregate::{daily::DayComparison, Chart, Period},
    storage::app_usage::AppUsageRow,
};

use self::format::{csv_field, format_duration, html_escape};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
    Html,
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Html => write!(f, "html"),
        }
    }
}

/// What the buckets of a chart measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Total usage per bucket of days.
    Usage,
    /// Usage per application over the whole period.
    Apps,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartReport {
    pub kind: ChartKind,
    pub period: Period,
    pub reference: NaiveDate,
    pub chart: Chart,
    pub total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average: Option<u64>,
    /// Total of the period before this one, when it's compared against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,
}

impl ChartReport {
    pub fn new(kind: ChartKind, period: Period, reference: NaiveDate, chart: Chart) -> Self {
        Self {
            kind,
            period,
            reference,
            total: chart.total(),
            chart,
            average: None,
            previous_total: None,
            change_percent: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub reference: NaiveDate,
    #[serde(flatten)]
    pub comparison: DayComparison,
    pub change_percent: Option<f64>,
}

impl From<(NaiveDate, DayComparison)> for ComparisonReport {
    fn from((reference, comparison): (NaiveDate, DayComparison)) -> Self {
        Self {
            reference,
            comparison,
            change_percent: comparison.change_percent(),
        }
    }
}

/// Per application records of a date range, the way the dashboard exports them.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub rows: Vec<AppUsageRow>,
}

/// Everything a command prints. Rendering never recomputes anything.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Report {
    Chart(ChartReport),
    Comparison(ComparisonReport),
    Export(ExportReport),
}

/// A table row. `cells` are the describing columns, `seconds` the measured usage.
struct Row {
    cells: Vec<String>,
    seconds: u64,
}

impl Report {
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        Ok(match format {
            OutputFormat::Text => self.render_text(),
            OutputFormat::Json => serde_json::to_string_pretty(self)?,
            OutputFormat::Csv => self.render_csv(),
            OutputFormat::Html => self.render_html(),
        })
    }

    fn title(&self) -> String {
        match self {
            Report::Chart(report) => match report.kind {
                ChartKind::Usage => format!("{} usage for {}", report.period, report.reference),
                ChartKind::Apps => format!(
                    "{} application usage for {}",
                    report.period, report.reference
                ),
            },
            Report::Comparison(report) => format!("Daily usage for {}", report.reference),
            Report::Export(report) => {
                format!("Application usage from {} to {}", report.start, report.end)
            }
        }
    }

    fn columns(&self) -> &'static [&'static str] {
        match self {
            Report::Chart(_) | Report::Comparison(_) => &["label", "seconds"],
            Report::Export(_) => &["date", "app_name", "total_usage"],
        }
    }

    fn rows(&self) -> Vec<Row> {
        match self {
            Report::Chart(report) => report
                .chart
                .iter()
                .map(|(label, seconds)| Row {
                    cells: vec![label.to_string()],
                    seconds,
                })
                .collect(),
            Report::Comparison(ComparisonReport { comparison, .. }) => vec![
                Row {
                    cells: vec!["today".into()],
                    seconds: comparison.today,
                },
                Row {
                    cells: vec!["yesterday".into()],
                    seconds: comparison.yesterday,
                },
            ],
            Report::Export(report) => report
                .rows
                .iter()
                .map(|row| Row {
                    cells: vec![row.date.to_string(), row.app_name.clone()],
                    seconds: row.total_usage,
                })
                .collect(),
        }
    }

    fn summary(&self) -> Vec<(&'static str, String)> {
        match self {
            Report::Chart(report) => {
                let mut summary = vec![("total", format_duration(report.total))];
                if let Some(average) = report.average {
                    summary.push(("average", format_duration(average)));
                }
                if let Some(previous) = report.previous_total {
                    summary.push(("previous", format_duration(previous)));
                    summary.push(("change", format_change(report.change_percent)));
                }
                summary
            }
            Report::Comparison(report) => vec![("change", format_change(report.change_percent))],
            Report::Export(report) => vec![(
                "total",
                format_duration(
                    report
                        .rows
                        .iter()
                        .fold(0u64, |sum, row| sum.saturating_add(row.total_usage)),
                ),
            )],
        }
    }

    fn render_text(&self) -> String {
        let mut out = self.title();
        out.push('\n');
        for Row { cells, seconds } in self.rows() {
            for cell in cells {
                let _ = write!(out, "{cell}\t");
            }
            let _ = writeln!(out, "{}\t{seconds}", format_duration(seconds));
        }
        out.push('\n');
        for (name, value) in self.summary() {
            let _ = writeln!(out, "{name}\t{value}");
        }
        out
    }

    fn render_csv(&self) -> String {
        let mut out = self.columns().join(",");
        out.push('\n');
        for Row { cells, seconds } in self.rows() {
            for cell in cells {
                let _ = write!(out, "{},", csv_field(&cell));
            }
            let _ = writeln!(out, "{seconds}");
        }
        out
    }

    fn render_html(&self) -> String {
        let mut out = format!(
            "<html><body><h3>{}</h3><table border='1'><tr>",
            html_escape(&self.title())
        );
        for column in self.columns() {
            let _ = write!(out, "<th>{column}</th>");
        }
        out.push_str("</tr>");
        for Row { cells, seconds } in self.rows() {
            out.push_str("<tr>");
            for cell in cells {
                let _ = write!(out, "<td>{}</td>", html_escape(&cell));
            }
            let _ = write!(out, "<td>{seconds}</td></tr>");
        }
        out.push_str("</table><ul>");
        for (name, value) in self.summary() {
            let _ = write!(out, "<li>{name}: {}</li>", html_escape(&value));
        }
        out.push_str("</ul></body></html>");
        out
    }
}

fn format_change(change_percent: Option<f64>) -> String {
    change_percent
        .map(|v| format!("{v:+.0}%"))
        .unwrap_or_else(|| "n/a".into())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;

    use super::{ChartKind, ChartReport, ComparisonReport, ExportReport, OutputFormat, Report};
    use crate::{
        aggregate::{daily::DayComparison, Chart, Period},
        storage::app_usage::AppUsageRow,
    };

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()
    }

    fn chart_report() -> Report {
        let chart = Chart::new_opt(vec!["Mon".into(), "Tue".into()], vec![3600, 61]).unwrap();
        let mut report = ChartReport::new(ChartKind::Usage, Period::Weekly, reference(), chart);
        report.average = Some(1831);
        Report::Chart(report)
    }

    fn export_report() -> Report {
        Report::Export(ExportReport {
            start: reference(),
            end: reference(),
            rows: vec![
                AppUsageRow {
                    date: reference(),
                    app_name: "code".into(),
                    total_usage: 300,
                },
                AppUsageRow {
                    date: reference(),
                    app_name: "a,b".into(),
                    total_usage: 5,
                },
            ],
        })
    }

    #[test]
    fn text_lists_buckets_and_summary() -> Result<()> {
        let text = chart_report().render(OutputFormat::Text)?;
        assert_eq!(
            text,
            "weekly usage for 2024-01-03\n\
             Mon\t1h 0m 0s\t3600\n\
             Tue\t1m 1s\t61\n\
             \n\
             total\t1h 1m 1s\n\
             average\t30m 31s\n"
        );
        Ok(())
    }

    #[test]
    fn week_summary_compares_with_previous_week() -> Result<()> {
        let chart = Chart::new_opt(vec!["Mon".into()], vec![150]).unwrap();
        let mut report = ChartReport::new(ChartKind::Usage, Period::Weekly, reference(), chart);
        report.previous_total = Some(100);
        report.change_percent = Some(50.);
        let report = Report::Chart(report);

        assert!(report
            .render(OutputFormat::Text)?
            .ends_with("previous\t1m 40s\nchange\t+50%\n"));

        let json: serde_json::Value = serde_json::from_str(&report.render(OutputFormat::Json)?)?;
        assert_eq!(json["previous_total"], 100);
        assert_eq!(json["change_percent"], 50.0);
        Ok(())
    }

    #[test]
    fn csv_has_one_row_per_bucket() -> Result<()> {
        let csv = chart_report().render(OutputFormat::Csv)?;
        assert_eq!(csv, "label,seconds\nMon,3600\nTue,61\n");
        Ok(())
    }

    #[test]
    fn json_keeps_labels_and_values_apart() -> Result<()> {
        let json: serde_json::Value =
            serde_json::from_str(&chart_report().render(OutputFormat::Json)?)?;
        assert_eq!(json["kind"], "usage");
        assert_eq!(json["period"], "weekly");
        assert_eq!(json["reference"], "2024-01-03");
        assert_eq!(json["chart"]["labels"][1], "Tue");
        assert_eq!(json["chart"]["values"][0], 3600);
        assert_eq!(json["total"], 3661);
        assert!(json.get("previous_total").is_none());
        Ok(())
    }

    #[test]
    fn apps_chart_title() -> Result<()> {
        let chart = Chart::new_opt(vec!["code".into()], vec![60]).unwrap();
        let report = Report::Chart(ChartReport::new(
            ChartKind::Apps,
            Period::Monthly,
            reference(),
            chart,
        ));
        assert!(report
            .render(OutputFormat::Text)?
            .starts_with("monthly application usage for 2024-01-03\ncode\t1m 0s\t60\n"));
        Ok(())
    }

    #[test]
    fn comparison_report() -> Result<()> {
        let report = Report::Comparison(ComparisonReport::from((
            reference(),
            DayComparison::from((100, 50)),
        )));

        let json: serde_json::Value = serde_json::from_str(&report.render(OutputFormat::Json)?)?;
        assert_eq!(json["today"], 100);
        assert_eq!(json["yesterday"], 50);
        assert_eq!(json["change_percent"], 100.0);

        let text = report.render(OutputFormat::Text)?;
        assert!(text.ends_with("change\t+100%\n"));

        let without_yesterday = Report::Comparison(ComparisonReport::from((
            reference(),
            DayComparison::from((100, 0)),
        )));
        assert!(without_yesterday
            .render(OutputFormat::Text)?
            .ends_with("change\tn/a\n"));
        Ok(())
    }

    #[test]
    fn export_renders_records() -> Result<()> {
        let report = export_report();
        assert_eq!(
            report.render(OutputFormat::Csv)?,
            "date,app_name,total_usage\n2024-01-03,code,300\n2024-01-03,\"a,b\",5\n"
        );

        let json: serde_json::Value = serde_json::from_str(&report.render(OutputFormat::Json)?)?;
        assert_eq!(json["rows"][0]["app_name"], "code");
        assert_eq!(json["rows"][0]["total_usage"], 300);
        assert_eq!(json["rows"][0]["date"], "2024-01-03");

        let html = report.render(OutputFormat::Html)?;
        assert!(html.contains("<th>date</th><th>app_name</th><th>total_usage</th>"));
        assert!(html.contains("<tr><td>2024-01-03</td><td>code</td><td>300</td></tr>"));

        assert!(report.render(OutputFormat::Text)?.ends_with("total\t5m 5s\n"));
        Ok(())
    }

    #[test]
    fn html_escapes_labels() -> Result<()> {
        let chart = Chart::new_opt(vec!["<b>".into()], vec![1]).unwrap();
        let report = Report::Chart(ChartReport::new(
            ChartKind::Usage,
            Period::Monthly,
            reference(),
            chart,
        ));
        let html = report.render(OutputFormat::Html)?;
        assert!(html.contains("<td>&lt;b&gt;</td><td>1</td>"));
        assert!(!html.contains("average"));
        Ok(())
    }
}

use crate::formatting::{format_amount, format_count, format_metric};
use crate::layout::{DashboardLayout, Panel, Viewport};
use crate::percent::Direction;
use crate::statistics::{ComparisonRecord, Period, StatisticsPayload};
use chrono::{DateTime, Local};
use colored::{Color, Colorize};
use std::path::Path;

const TOP_PRODUCTS_SHOWN: usize = 5;
const BANNER: &str = "==================== Zipkart Dashboard ====================";
const TABLE_SEPARATOR: &str = "-----------+------------------+------------------+--------";

pub struct SummaryPaths<'a> {
    pub(crate) csv: Option<&'a Path>,
    pub(crate) html: Option<&'a Path>,
    pub(crate) layout: &'a Path,
}

pub struct SummaryContext<'a> {
    pub(crate) run_started_at: &'a DateTime<Local>,
    pub(crate) source: &'a str,
    pub(crate) period: Period,
    pub(crate) payload: &'a StatisticsPayload,
    pub(crate) comparisons: &'a [ComparisonRecord],
    pub(crate) layout: &'a DashboardLayout,
    pub(crate) viewport: Viewport,
    pub(crate) paths: SummaryPaths<'a>,
}

pub fn print_summary(context: &SummaryContext<'_>) {
    for line in summary_lines(context) {
        println!("{line}");
    }
}

fn summary_lines(context: &SummaryContext<'_>) -> Vec<String> {
    let mut lines = vec![String::new()];
    lines.extend(header_lines(context));
    lines.extend(path_lines(&context.paths));
    lines.push(String::new());
    lines.push("Period Comparison".bold().bright_magenta().to_string());
    lines.extend(comparison_lines(context.comparisons, context.period));
    lines.push(String::new());
    lines.push(inventory_line(context.payload));
    lines.extend(top_product_lines(context.payload));
    lines.push(String::new());
    lines.extend(panel_order_lines(context.layout, context.viewport));
    lines.push("=".repeat(BANNER.len()).bright_cyan().to_string());
    lines
}

fn header_lines(context: &SummaryContext<'_>) -> Vec<String> {
    let started = context
        .run_started_at
        .format("%Y-%m-%d %H:%M:%S %Z")
        .to_string();
    vec![
        BANNER.bold().bright_cyan().to_string(),
        format!("{} {}", "Run started".bright_yellow().bold(), started.bright_white()),
        format!(
            "{} {} | {}",
            "Source".bright_yellow().bold(),
            context.source.bright_white(),
            format!("period: {}", context.period).bright_white()
        ),
    ]
}

fn path_lines(paths: &SummaryPaths<'_>) -> Vec<String> {
    vec![
        path_line("Statistics CSV", paths.csv, "not saved (use --save-csv)"),
        path_line("HTML Report", paths.html, "not saved (use --save-html)"),
        path_line("Layout", Some(paths.layout), ""),
    ]
}

fn path_line(label: &str, path: Option<&Path>, hint: &str) -> String {
    let value = path.map_or_else(
        || hint.bright_black(),
        |path| path.display().to_string().bright_white(),
    );
    format!("{} {value}", label.bright_yellow().bold())
}

const fn change_color(direction: Direction) -> Color {
    match direction {
        Direction::Up => Color::BrightGreen,
        Direction::Down => Color::BrightRed,
        Direction::Neutral => Color::BrightWhite,
    }
}

fn comparison_lines(records: &[ComparisonRecord], period: Period) -> Vec<String> {
    if records.is_empty() {
        return vec!["No statistics available.".bright_black().to_string()];
    }

    let header = format!(
        "{:<10} | {:>16} | {:>16} | {:>7}",
        "Metric", "Current", "Previous", "Change"
    );
    let mut lines = vec![
        header.bold().bright_white().to_string(),
        TABLE_SEPARATOR.bright_black().to_string(),
    ];
    for record in records {
        let row = format!(
            "{:<10} | {:>16} | {:>16} |",
            record.metric.label(),
            format_metric(record.metric, record.current),
            format_metric(record.metric, record.previous),
        );
        let change = format!("{:>7}", record.change).color(change_color(record.percent.direction()));
        lines.push(format!("{} {change}", row.bright_white()));
    }
    lines.push(period.comparison_caption().bright_black().to_string());
    lines
}

fn inventory_line(payload: &StatisticsPayload) -> String {
    let inventory = &payload.inventory;
    format!(
        "{} {} | {} | {}",
        "Inventory".bright_yellow().bold(),
        format!("in stock: {}", format_count(inventory.in_stock)).bright_white(),
        format!("low: {}", format_count(inventory.low_stock)).bright_yellow(),
        format!("out: {}", format_count(inventory.out_of_stock)).bright_red()
    )
}

fn top_product_lines(payload: &StatisticsPayload) -> Vec<String> {
    let title = "Top products".bright_yellow().bold();
    let ranked = payload.ranked_products(TOP_PRODUCTS_SHOWN);
    if ranked.is_empty() {
        return vec![format!("{title} {}", "none reported".bright_black())];
    }
    let mut lines = vec![title.to_string()];
    lines.extend(ranked.iter().enumerate().map(|(position, product)| {
        format!(
            "{:>3}. {:<24} {:>8} units {:>14}",
            position + 1,
            product.name,
            format_count(product.units_sold),
            format_amount(product.revenue)
        )
    }));
    lines
}

fn panel_order_lines(layout: &DashboardLayout, viewport: Viewport) -> Vec<String> {
    let mut lines = vec!["Panel Order".bold().bright_magenta().to_string()];
    for (side, keys) in layout.columns(viewport) {
        let titles: Vec<&str> = keys.iter().map(|key| panel_title(key)).collect();
        lines.push(format!(
            "{} {}",
            format!("{side:>6}:").bright_yellow().bold(),
            titles.join(" > ").bright_white()
        ));
    }
    lines
}

/// Display title for a stored key, or the key itself when it names no panel.
pub(crate) fn panel_title(key: &str) -> &str {
    Panel::from_key(key).map_or(key, |panel| panel.title())
}

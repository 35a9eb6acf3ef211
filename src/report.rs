use crate::formatting::{format_amount, format_count, format_metric};
use crate::layout::{DashboardLayout, Panel, Viewport};
use crate::output::write_output_file;
use crate::percent::PercentChange;
use crate::statistics::{ComparisonRecord, Metric, Period, StatisticsPayload};
use anyhow::Result;
use chrono::{DateTime, Local};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use minify_html::{Cfg, minify};
use std::path::Path;

const TOP_PRODUCTS_SHOWN: usize = 5;

pub struct HtmlReportContext<'a> {
    pub(crate) run_started_at: &'a DateTime<Local>,
    pub(crate) source: &'a str,
    pub(crate) period: Period,
    pub(crate) payload: &'a StatisticsPayload,
    pub(crate) comparisons: &'a [ComparisonRecord],
    pub(crate) layout: &'a DashboardLayout,
    pub(crate) viewport: Viewport,
    pub(crate) csv_path: Option<&'a Path>,
    pub(crate) output_path: &'a Path,
}

pub async fn save_html_report(output_path: &Path, context: &HtmlReportContext<'_>) -> Result<()> {
    let html = render_html_report(context);
    let mut cfg = Cfg::new();
    cfg.minify_css = true;
    let minified = minify(html.as_bytes(), &cfg);
    write_output_file(output_path, &minified).await
}

pub(crate) fn render_html_report(context: &HtmlReportContext<'_>) -> String {
    let generated_at = context
        .run_started_at
        .format("%Y-%m-%d %H:%M:%S %Z")
        .to_string();
    let title = format!(
        "Zipkart Dashboard - {}",
        context.run_started_at.format("%Y-%m-%d")
    );
    let columns = context.layout.columns(context.viewport);
    let grid_class = match context.viewport {
        Viewport::Desktop => "grid grid-two",
        Viewport::Mobile => "grid grid-one",
    };

    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                style { (PreEscaped(REPORT_STYLE)) }
            }
            body {
                div.page {
                    header.hero {
                        div.pill { "Zipkart v" (env!("CARGO_PKG_VERSION")) }
                        h1 { "Zipkart Dashboard" }
                        div.meta {
                            div { span.label { "Generated" } span.value.mono { (generated_at) } }
                            div { span.label { "Source" } span.value.mono { (context.source) } }
                            div { span.label { "Period" } span.value.mono { (context.period.as_str()) } }
                        }
                    }
                    section class=(grid_class) {
                        @for (side, keys) in &columns {
                            div.column data-side=(side.as_str()) {
                                @for key in keys.iter() {
                                    @if let Some(panel) = Panel::from_key(key) {
                                        (render_panel(panel, context))
                                    }
                                }
                            }
                        }
                    }
                    (render_downloads(context))
                    footer.footer { "Changes are " (context.period.comparison_caption()) "." }
                }
            }
        }
    };
    markup.into_string()
}

fn render_panel(panel: Panel, context: &HtmlReportContext<'_>) -> Markup {
    let body = match panel {
        Panel::Sales => render_metric(Metric::Sales, context),
        Panel::Purchase => render_metric(Metric::Purchase, context),
        Panel::Chart => render_chart(context.payload),
        Panel::Inventory => render_inventory(context.payload),
        Panel::Product => render_metric(Metric::Products, context),
        Panel::TopProducts => render_top_products(context.payload),
    };
    html! {
        article.panel data-panel=(panel.key()) {
            h2 { (panel.title()) }
            (body)
        }
    }
}

fn render_metric(metric: Metric, context: &HtmlReportContext<'_>) -> Markup {
    let Some(record) = context
        .comparisons
        .iter()
        .find(|record| record.metric == metric)
    else {
        return html! { p.muted { "No data." } };
    };
    html! {
        div.figure { (format_metric(metric, record.current)) }
        div.compare {
            (change_badge(record.percent))
            span.muted { " " (context.period.comparison_caption()) }
        }
        div.previous { "Previous: " (format_metric(metric, record.previous)) }
    }
}

fn render_chart(payload: &StatisticsPayload) -> Markup {
    let rows = [
        ("Sales", payload.sales),
        ("Purchase", payload.purchase),
        ("Profit", payload.profit()),
    ];
    let peak = rows
        .iter()
        .flat_map(|(_, figures)| [figures.current.abs(), figures.previous.abs()])
        .fold(0.0_f64, f64::max);
    html! {
        table.chart {
            thead { tr { th { "" } th { "Current" } th { "Previous" } th { "Change" } } }
            tbody {
                @for (label, figures) in rows {
                    tr {
                        td.lang { (label) }
                        td { (bar(figures.current, peak)) span.num { (format_amount(figures.current)) } }
                        td { (bar(figures.previous, peak)) span.num { (format_amount(figures.previous)) } }
                        td { (change_badge(figures.change())) }
                    }
                }
            }
        }
    }
}

fn bar(value: f64, peak: f64) -> Markup {
    let width = bar_width(value, peak);
    html! { span.bar style=(format!("width: {width:.0}%")) {} }
}

fn bar_width(value: f64, peak: f64) -> f64 {
    if peak > 0.0 && value.is_finite() {
        (value.abs() / peak * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

fn render_inventory(payload: &StatisticsPayload) -> Markup {
    let inventory = &payload.inventory;
    html! {
        dl.inventory {
            dt { "In stock" } dd { (format_count(inventory.in_stock)) }
            dt { "Low stock" } dd.warn { (format_count(inventory.low_stock)) }
            dt { "Out of stock" } dd.down { (format_count(inventory.out_of_stock)) }
        }
    }
}

fn render_top_products(payload: &StatisticsPayload) -> Markup {
    let ranked = payload.ranked_products(TOP_PRODUCTS_SHOWN);
    html! {
        @if ranked.is_empty() {
            p.muted { "No products sold in this period." }
        } @else {
            table {
                thead { tr { th { "#" } th { "Product" } th { "Units" } th { "Revenue" } } }
                tbody {
                    @for (position, product) in ranked.iter().enumerate() {
                        tr {
                            td.num { ((position + 1).to_string()) }
                            td.lang { (product.name) }
                            td.num { (format_count(product.units_sold)) }
                            td.num { (format_amount(product.revenue)) }
                        }
                    }
                }
            }
        }
    }
}

fn change_badge(change: PercentChange) -> Markup {
    let class = format!("trend {}", change.direction().css_class());
    html! { span class=(class) { (change.to_string()) } }
}

fn render_downloads(context: &HtmlReportContext<'_>) -> Markup {
    html! {
        section.downloads {
            h3 { "Downloads" }
            @match context.csv_path {
                Some(path) => {
                    @let full_display = path.to_string_lossy().into_owned();
                    @if let Some(rel) = relative_link(context.output_path, path) {
                        a.download-link href=(rel) title=(full_display) { (rel) }
                    } @else {
                        span.download-path title=(full_display) { (full_display) }
                    }
                }
                None => {
                    p.muted { "No CSV file was saved. Use --save-csv." }
                }
            }
        }
    }
}

fn relative_link(html_path: &Path, target: &Path) -> Option<String> {
    let html_dir = html_path.parent()?;
    let target_dir = target.parent()?;
    if html_dir == target_dir {
        target
            .file_name()
            .and_then(|name| name.to_str())
            .map(std::string::ToString::to_string)
    } else {
        None
    }
}

const REPORT_STYLE: &str = r"
:root {
  color-scheme: light;
  --bg: #f4f6fb;
  --ink: #1d2433;
  --muted: #6b7385;
  --card: #ffffff;
  --border: #e1e5ee;
  --up: #1f9d55;
  --down: #d64545;
  --warn: #c98a0b;
  --accent: #3056d3;
}
* { box-sizing: border-box; }
body {
  margin: 0;
  font-family: 'Segoe UI', system-ui, sans-serif;
  color: var(--ink);
  background: var(--bg);
}
.page { max-width: 1200px; margin: 0 auto; padding: 32px 20px 48px; }
.hero {
  background: var(--card);
  border: 1px solid var(--border);
  border-radius: 16px;
  padding: 24px 28px;
}
.pill {
  display: inline-block;
  padding: 4px 12px;
  border-radius: 999px;
  background: rgba(48, 86, 211, 0.1);
  color: var(--accent);
  font-size: 12px;
  font-weight: 600;
  text-transform: uppercase;
}
h1 { margin: 12px 0 8px; }
.meta { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 12px; }
.label { display: block; font-size: 12px; text-transform: uppercase; color: var(--muted); }
.value { font-weight: 600; }
.mono { font-family: ui-monospace, monospace; }
.grid { display: grid; gap: 20px; margin: 24px 0; }
.grid-two { grid-template-columns: 1fr 1fr; }
.grid-one { grid-template-columns: 1fr; }
.column { display: flex; flex-direction: column; gap: 20px; }
.panel {
  background: var(--card);
  border: 1px solid var(--border);
  border-radius: 14px;
  padding: 18px 20px;
}
.panel h2 { font-size: 15px; margin: 0 0 12px; color: var(--muted); }
.figure { font-size: 28px; font-weight: 700; }
.previous { font-size: 13px; color: var(--muted); margin-top: 4px; }
.trend { font-weight: 600; }
.trend.up { color: var(--up); }
.trend.down, dd.down { color: var(--down); }
dd.warn { color: var(--warn); }
.trend.neutral { color: var(--muted); }
.muted { color: var(--muted); }
table { width: 100%; border-collapse: collapse; font-size: 14px; }
th, td { padding: 6px 8px; border-bottom: 1px solid var(--border); text-align: left; }
td.num, span.num { font-family: ui-monospace, monospace; }
.bar { display: block; height: 6px; border-radius: 3px; background: var(--accent); margin-bottom: 4px; }
.inventory { display: grid; grid-template-columns: auto 1fr; gap: 6px 16px; margin: 0; }
.inventory dd { margin: 0; font-weight: 600; }
.downloads, .footer { color: var(--muted); font-size: 13px; }
";

use crate::cli::Cli;
use crate::layout::DashboardLayout;
use crate::output::save_comparisons_csv;
use crate::progress::{ProgressState, Stage};
use crate::report::{HtmlReportContext, save_html_report};
use crate::sources::load_statistics;
use crate::statistics::build_comparisons;
use crate::summary::{SummaryContext, SummaryPaths, print_summary};
use anyhow::Result;
use chrono::Local;
use tracing::{debug, info};

/// Default run: load statistics, apply the stored layout, write the
/// requested outputs and print the summary.
pub async fn run(cli: Cli) -> Result<()> {
    let source = cli.statistics_source()?;
    let Cli {
        period,
        layout: layout_path,
        viewport,
        save_csv,
        save_html,
        archive_csv,
        no_progress,
        ..
    } = cli;

    let run_started_at = Local::now();
    let source_label = source.describe();
    info!(source = %source_label, %period, "dashboard run started");

    let progress = ProgressState::new(!no_progress);
    let payload = progress
        .track(
            Stage::Fetch {
                source: &source_label,
                period,
            },
            load_statistics(&source, period),
        )
        .await?;

    let comparisons = build_comparisons(&payload, period);
    let layout = DashboardLayout::load(&layout_path).await?;
    debug!(?layout, "layout loaded");

    let csv_written = match save_csv.as_deref() {
        Some(path) => Some(save_comparisons_csv(&comparisons, path, archive_csv).await?),
        None => None,
    };

    if let Some(path) = save_html.as_deref() {
        let context = HtmlReportContext {
            run_started_at: &run_started_at,
            source: &source_label,
            period,
            payload: &payload,
            comparisons: &comparisons,
            layout: &layout,
            viewport,
            csv_path: csv_written.as_deref(),
            output_path: path,
        };
        progress
            .track(Stage::Render { output: path }, save_html_report(path, &context))
            .await?;
    }

    print_summary(&SummaryContext {
        run_started_at: &run_started_at,
        source: &source_label,
        period,
        payload: &payload,
        comparisons: &comparisons,
        layout: &layout,
        viewport,
        paths: SummaryPaths {
            csv: csv_written.as_deref(),
            html: save_html.as_deref(),
            layout: &layout_path,
        },
    });

    Ok(())
}

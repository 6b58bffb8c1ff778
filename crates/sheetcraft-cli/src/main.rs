//! Sheetcraft CLI - build a sample report or inspect an existing workbook

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use sheetcraft::prelude::*;
use sheetcraft::{CompressionLevel, SaveOptions, XlsxReader};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const REGIONS: [&str; 8] = [
    "North", "South", "East", "West", "Central", "Coastal", "Mountain", "Island",
];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Parser)]
#[command(name = "sheetcraft")]
#[command(author, version, about = "Build and inspect styled spreadsheets")]
struct Cli {
    /// Log build phases and package writing
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a sample sales report
    Demo {
        /// Output workbook path
        #[arg(short, long)]
        output: PathBuf,

        /// Number of sales regions (1-8)
        #[arg(long, default_value = "4", value_parser = clap::value_parser!(u8).range(1..=8))]
        regions: u8,

        /// Number of months of data (1-12)
        #[arg(long, default_value = "6", value_parser = clap::value_parser!(u8).range(1..=12))]
        months: u8,

        /// Deflate effort: none, fast, default or best
        #[arg(long, default_value = "default")]
        compression: CompressionLevel,
    },

    /// Summarize an existing .xlsx file
    Inspect {
        /// Input workbook
        input: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Demo {
            output,
            regions,
            months,
            compression,
        } => demo(&output, regions as usize, months as usize, compression),
        Commands::Inspect { input, json } => inspect(&input, json),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("sheetcraft=debug,sheetcraft_xlsx=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Deterministic sample revenue for a region and month
fn revenue(region: usize, month: usize) -> f64 {
    let base = 1000.0 + 250.0 * region as f64;
    let seasonal = ((month * 7 + region * 3) % 11) as f64 * 45.0;
    base + seasonal
}

fn demo(output: &Path, regions: usize, months: usize, compression: CompressionLevel) -> Result<()> {
    let engine = XlsxEngine::new().with_options(SaveOptions::new().with_compression(compression));
    let mut wb = WorkbookBuilder::with_engine(engine);

    let header = StyleConfig::new()
        .bold(true)
        .fill_color(Color::rgb(0xDD, 0xEB, 0xF7));
    let money = StyleConfig::new().number_format(NumberFormat::currency());

    ReportAssembler::new()
        .header_style(header.clone())
        .job("Data", move || {
            let mut set = RowSet::new().with_header(["Region", "Month", "Revenue"]);
            for (r, region) in REGIONS.iter().take(regions).enumerate() {
                for (m, month) in MONTHS.iter().take(months).enumerate() {
                    set.push_row([
                        CellValue::from(*region),
                        CellValue::from(*month),
                        CellValue::Number(revenue(r, m)),
                    ]);
                }
            }
            Ok(set)
        })
        .job("Totals", move || {
            let mut set = RowSet::new().with_header(["Region", "Total"]);
            for (r, region) in REGIONS.iter().take(regions).enumerate() {
                let total: f64 = (0..months).map(|m| revenue(r, m)).sum();
                set.push_row([CellValue::from(*region), CellValue::Number(total)]);
            }
            Ok(set)
        })
        .assemble(&mut wb)
        .context("Failed to assemble report data")?;

    let data_rows = regions * months;
    {
        let mut data = wb.sheet("Data")?;
        data.column_width("A", 14.0)?
            .column_width("C", 14.0)?
            .freeze_panes("A2")?
            .data_validation(
                DataValidationBuilder::list(REGIONS.iter().take(regions).copied())
                    .range(format!("A2:A{}", data_rows + 1))
                    .error_alert(
                        "Unknown region",
                        "Pick a region from the list",
                        ValidationErrorStyle::Stop,
                    ),
            )?;
    }
    wb.sheet("Totals")?.column_width("B", 14.0)?;

    {
        let mut summary = wb.add_sheet("Summary")?;
        summary
            .row()?
            .cell("Sales summary")?
            .style(&header)
            .merge_to("D1")?
            .done()
            .done()
            .row()?
            .cell("Grand total")?
            .done()
            .cell(CellValue::formula(format!("SUM(Totals!B2:B{})", regions + 1)))?
            .style(&money);
        summary
            .chart(
                ChartBuilder::new(ChartKind::Column)
                    .title("Revenue by region")
                    .series_with_categories(
                        "Total",
                        format!("Totals!A2:A{}", regions + 1),
                        format!("Totals!B2:B{}", regions + 1),
                    )
                    .y_axis_title("Revenue")
                    .legend(LegendPosition::Bottom)
                    .anchor("F3"),
            )?
            .pivot_table(
                PivotTableBuilder::new("RevenueByRegion")
                    .source(format!("Data!A1:C{}", data_rows + 1))
                    .target("A4")
                    .add_row_field("Region")
                    .add_column_field("Month")
                    .add_value_field("Revenue", Aggregation::Sum),
            )?;
    }
    wb.set_active_sheet("Summary")?;

    let mut built = wb.build().context("Failed to build workbook")?;
    tracing::info!(
        styles = built.registry().len(),
        sheets = built.engine().sheet_count(),
        "built report"
    );
    built
        .save_as(output)
        .with_context(|| format!("Failed to write '{}'", output.display()))?;
    tracing::info!(path = %output.display(), rows = data_rows, "saved report");

    eprintln!(
        "Wrote {} rows for {} regions to '{}' ({} styles)",
        data_rows,
        regions,
        output.display(),
        built.registry().len()
    );
    Ok(())
}

#[derive(Debug, Serialize)]
struct WorkbookSummary {
    file: String,
    active_sheet: usize,
    styles: usize,
    sheets: Vec<SheetSummary>,
}

#[derive(Debug, Serialize)]
struct SheetSummary {
    name: String,
    cells: usize,
    dimension: Option<String>,
    frozen_at: Option<String>,
    merged: Vec<String>,
    column_widths: Vec<(u16, f64)>,
}

fn inspect(input: &Path, json: bool) -> Result<()> {
    let engine = XlsxReader::read_file(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;
    tracing::info!(
        path = %input.display(),
        sheets = engine.sheet_count(),
        "opened workbook"
    );

    let summary = WorkbookSummary {
        file: input.display().to_string(),
        active_sheet: engine.active_sheet(),
        styles: engine.style_count(),
        sheets: engine
            .worksheets()
            .map(|sheet| SheetSummary {
                name: sheet.name().to_string(),
                cells: sheet.cell_count(),
                dimension: sheet.dimension().map(|r| r.to_string()),
                frozen_at: sheet.freeze_panes().map(|c| c.to_string()),
                merged: sheet.merged_ranges().iter().map(|r| r.to_string()).collect(),
                column_widths: sheet.column_widths().collect(),
            })
            .collect(),
    };

    if json {
        let text = serde_json::to_string_pretty(&summary).context("Failed to encode summary")?;
        println!("{}", text);
        return Ok(());
    }

    println!("File: {}", summary.file);
    println!("Styles: {}", summary.styles);
    println!("Sheets: {}", summary.sheets.len());
    for (i, sheet) in summary.sheets.iter().enumerate() {
        let marker = if i == summary.active_sheet { "*" } else { " " };
        println!(
            "{} [{}] {} ({} cells, range {})",
            marker,
            i,
            sheet.name,
            sheet.cells,
            sheet.dimension.as_deref().unwrap_or("empty")
        );
        if let Some(cell) = &sheet.frozen_at {
            println!("      frozen at {}", cell);
        }
        if !sheet.merged.is_empty() {
            println!("      merged {}", sheet.merged.join(", "));
        }
    }
    Ok(())
}

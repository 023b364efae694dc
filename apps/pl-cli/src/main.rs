use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{CellAlignment, ContentArrangement, Table};
use pl_app::{
    AppResult, BomReport, ResolveOptions, ResolveProgressEvent, ResolveRequest, catalog_service,
    report, resolve_service,
};
use pl_bom::{CellValue, Row};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "partledger")]
#[command(about = "PartLedger CLI - bill of materials resolution tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate catalog file syntax and structure
    Validate {
        /// Path to the catalog YAML file
        catalog_path: PathBuf,
    },
    /// List parts in a catalog
    Parts {
        /// Path to the catalog YAML file
        catalog_path: PathBuf,
    },
    /// Resolve the BOM rooted at a part
    Resolve {
        /// Path to the catalog YAML file
        catalog_path: PathBuf,
        /// Root part reference (e.g. `printer` or `catalog:printer`)
        root: String,
        /// Maximum number of distinct rows (0 = unlimited)
        #[arg(long)]
        max_parts: Option<usize>,
        /// Resolve calls to make before giving up
        #[arg(long, default_value_t = 8)]
        max_sweeps: usize,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Save the report as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show a saved report
    ShowReport {
        /// Path to the report JSON file
        report_path: PathBuf,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { catalog_path } => cmd_validate(&catalog_path),
        Commands::Parts { catalog_path } => cmd_parts(&catalog_path),
        Commands::Resolve {
            catalog_path,
            root,
            max_parts,
            max_sweeps,
            format,
            output,
        } => cmd_resolve(
            &catalog_path,
            &root,
            ResolveOptions {
                maximum_parts: max_parts,
                max_sweeps,
                ..ResolveOptions::default()
            },
            format,
            output.as_deref(),
        ),
        Commands::ShowReport { report_path } => cmd_show_report(&report_path),
    }
}

fn cmd_validate(catalog_path: &Path) -> AppResult<()> {
    println!("Validating catalog: {}", catalog_path.display());
    let catalog = catalog_service::load_catalog(catalog_path)?;
    catalog_service::validate(&catalog)?;
    println!("✓ Catalog is valid ({} parts)", catalog.parts.len());
    Ok(())
}

fn cmd_parts(catalog_path: &Path) -> AppResult<()> {
    let catalog = catalog_service::load_catalog(catalog_path)?;
    let parts = catalog_service::list_parts(&catalog);

    if parts.is_empty() {
        println!("No parts found in catalog");
    } else {
        println!("Parts in catalog '{}':", catalog.name);
        for part in parts {
            println!(
                "  {} - {} (cost {:.2}, {} children)",
                part.id, part.title, part.cost, part.child_count
            );
        }
    }
    Ok(())
}

fn cmd_resolve(
    catalog_path: &Path,
    root: &str,
    options: ResolveOptions,
    format: OutputFormat,
    output: Option<&Path>,
) -> AppResult<()> {
    let table = matches!(format, OutputFormat::Table);
    let request = ResolveRequest {
        catalog_path,
        root,
        options,
    };

    let response = if table {
        println!("Resolving BOM for: {}", root);
        let mut last_emit = Instant::now();
        let mut last_stage = String::new();
        let response = resolve_service::resolve_bom_with_progress(
            &request,
            Some(&mut |event| {
                let stage_key = format!("{:?}", event.stage);
                let emit_now = stage_key != last_stage || last_emit.elapsed().as_millis() >= 100;
                if emit_now {
                    render_cli_progress(&event);
                    last_stage = stage_key;
                    last_emit = Instant::now();
                }
            }),
        )?;
        clear_progress_line();
        response
    } else {
        resolve_service::resolve_bom(&request)?
    };

    if let Some(path) = output {
        report::save_report(path, &response.report)?;
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response.report)?);
        }
        OutputFormat::Table => {
            if response.converged {
                println!(
                    "✓ Resolved in {} sweep(s), {} catalog fetches",
                    response.sweeps, response.catalog_fetches
                );
            } else {
                println!(
                    "✗ Not fully resolved after {} sweep(s)",
                    response.sweeps
                );
            }
            if response.refreshed > 0 {
                println!("  Refreshed {} stale part(s)", response.refreshed);
            }
            println!();
            print_report(&response.report);
            if let Some(path) = output {
                println!("\n✓ Report saved to {}", path.display());
            }
        }
    }
    Ok(())
}

fn cmd_show_report(report_path: &Path) -> AppResult<()> {
    let report = report::load_report(report_path)?;
    println!("Report generated at {}", report.generated_at);
    println!("Source: {}\n", report.source);
    print_report(&report);
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &ResolveProgressEvent) {
    let spinner = ['|', '/', '-', '\\'];
    let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
    let mut line = format!(
        "\r{} {}  rows={}  elapsed={:.2}s",
        spinner[spin_idx],
        event.stage.label(),
        event.rows,
        event.elapsed_wall_s
    );
    if let Some(sweep) = event.sweep {
        line.push_str(&format!("  sweep={}", sweep));
    }
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {}", msg));
    }
    print!("{}", line);
    let _ = io::stdout().flush();
}

fn format_cell(value: &CellValue) -> String {
    match value {
        CellValue::Number(n) => format!("{:.2}", n),
        CellValue::Text(text) => text.clone(),
    }
}

fn print_report(report: &BomReport) {
    println!("{}", report.title);

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(report.columns.iter().map(|c| c.title.as_str()));
    for row in &report.rows {
        table.add_row(
            report
                .columns
                .iter()
                .map(|c| format_cell(&row.item(c.column))),
        );
    }
    for (index, description) in report.columns.iter().enumerate() {
        if description.numeric
            && let Some(column) = table.column_mut(index)
        {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    println!("{table}");

    println!("\nSummary:");
    println!("  Rows:       {}", report.rows.len());
    println!("  Part count: {}", report.part_count);
    println!("  Total cost: {:.2}", report.total_cost);
    println!("  Resolved:   {}", report.resolved);
    println!("  Fresh:      {}", report.fresh);
    if report.maximum_parts > 0 {
        println!("  Row limit:  {}", report.maximum_parts);
    }
}

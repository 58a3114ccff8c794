use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use report_pdf::{FontSet, LayoutMetrics, RenderOptions, Renderer};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PageSize {
    A4,
    Letter,
}

/// Render a two-column JSON report into a paginated PDF.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Report JSON: `{title, sections: [...]}` or `{title, totalItems, summary, items}`
    input: PathBuf,

    /// Output path; defaults to `<title>.pdf` in the current directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file with layout metrics overriding the page-size preset
    #[arg(long, conflicts_with = "page_size")]
    layout: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "a4")]
    page_size: PageSize,

    /// Redraw table headers on every page a table continues on
    #[arg(long)]
    repeat_headers: bool,

    /// Footers read "Page | n of N"
    #[arg(long)]
    page_totals: bool,

    /// TrueType/OpenType file for regular text
    #[arg(long, conflicts_with = "font_family")]
    font: Option<PathBuf>,

    /// TrueType/OpenType file for bold text (requires --font)
    #[arg(long, requires = "font")]
    bold_font: Option<PathBuf>,

    /// Font family resolved from system font directories and REPORT_PDF_FONTS
    #[arg(long)]
    font_family: Option<String>,
}

fn build_renderer(cli: &Cli) -> report_pdf::Result<Renderer> {
    let fonts = match (&cli.font, &cli.font_family) {
        (Some(regular), _) => FontSet::from_files(regular, cli.bold_font.as_deref())?,
        (None, Some(family)) => FontSet::from_family(family)?,
        (None, None) => FontSet::helvetica(),
    };
    let metrics = match &cli.layout {
        Some(path) => LayoutMetrics::from_json_file(path)?,
        None => match cli.page_size {
            PageSize::A4 => LayoutMetrics::a4(),
            PageSize::Letter => LayoutMetrics::letter(),
        },
    };
    Ok(Renderer::new(fonts)
        .with_metrics(metrics)?
        .with_options(RenderOptions {
            repeat_table_header: cli.repeat_headers,
            footer_with_total: cli.page_totals,
        }))
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = build_renderer(&cli).and_then(|renderer| {
        report_pdf::convert_report_to_pdf(&renderer, &cli.input, cli.output.as_deref())
    });
    match result {
        Ok(path) => {
            println!("Wrote {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

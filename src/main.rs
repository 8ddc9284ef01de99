use anyhow::Context;
use clap::{Parser, ValueEnum};
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use reelrank::insights::{
    gross_by_certificate, gross_summary_frame, top_titles_frame, top_titles_per_year,
};
use reelrank::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AxisArg {
    Actor,
    Director,
    Both,
}

impl AxisArg {
    fn axes(self) -> &'static [Axis] {
        match self {
            AxisArg::Actor => &[Axis::Actor],
            AxisArg::Director => &[Axis::Director],
            AxisArg::Both => &[Axis::Actor, Axis::Director],
        }
    }
}

/// Builds yearly top-N actor and director leaderboards from a movie CSV.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Path to the movie table (imdb_top_1000.csv layout).
    csv: PathBuf,

    #[arg(long, value_enum, default_value_t = AxisArg::Both)]
    axis: AxisArg,

    #[arg(long, default_value_t = config::DEFAULT_TOP_N)]
    top_n: usize,

    /// First as-of year; defaults to the earliest release year.
    #[arg(long)]
    from: Option<i32>,

    /// Last as-of year; defaults to the latest release year.
    #[arg(long)]
    to: Option<i32>,

    /// Directory for the frame CSVs. Without it only a summary is logged.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Titles per year in the top titles table.
    #[arg(long, default_value_t = 10)]
    titles_per_year: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "reelrank=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let movies = data::load(&cli.csv)
        .with_context(|| format!("loading {}", cli.csv.display()))?;

    let years = match (cli.from, cli.to, movies.year_span()) {
        (None, None, _) => None,
        (from, to, span) => {
            let start = from.or(span.map(|s| s.start())).context("no --from and empty table")?;
            let end = to.or(span.map(|s| s.end())).context("no --to and empty table")?;
            Some(YearRange::new(start, end)?)
        }
    };

    if let Some(dir) = &cli.out {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    for &axis in cli.axis.axes() {
        let mut config = LeaderboardConfig::new(axis).with_top_n(cli.top_n);
        config.years = years;

        let sequence = FrameBuilder::new(&movies, config)?.build()?;
        tracing::info!(
            axis = %axis,
            frames = sequence.len(),
            rows = sequence.rows().count(),
            "frame sequence ready"
        );
        if let Some(dir) = &cli.out {
            let mut df = sequence.to_dataframe()?;
            write_csv(&mut df, &dir.join(format!("{axis}_frames.csv")))?;
        }
    }

    if let Some(dir) = &cli.out {
        let mut top = top_titles_frame(&top_titles_per_year(&movies, cli.titles_per_year))?;
        write_csv(&mut top, &dir.join("top_titles_per_year.csv"))?;
        let mut gross = gross_summary_frame(&gross_by_certificate(&movies))?;
        write_csv(&mut gross, &dir.join("gross_by_certificate.csv"))?;
    }
    Ok(())
}

fn write_csv(df: &mut DataFrame, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(file).include_header(true).finish(df)?;
    tracing::info!(path = %path.display(), rows = df.height(), "wrote csv");
    Ok(())
}

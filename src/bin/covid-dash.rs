use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use covid_dash::config::DEFAULT_BASE_URL;
use covid_dash::models::WORLDWIDE;
use covid_dash::view::Dashboard;
use covid_dash::{Client, Config, Metric, Session, chart};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "covid-dash",
    version,
    about = "Fetch and summarize global and per-country COVID-19 statistics"
)]
struct Cli {
    /// Base URL of the statistics API.
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    api_url: String,
    /// Request timeout in seconds.
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the summary cards for the world or one country.
    Summary(SummaryArgs),
    /// Print countries ordered by total cases.
    Table(TableArgs),
    /// List selectable country codes.
    Countries,
    /// Write the worldwide daily-new chart as SVG.
    Chart(ChartArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MetricArg {
    Cases,
    Recovered,
    Deaths,
}

impl From<MetricArg> for Metric {
    fn from(m: MetricArg) -> Self {
        match m {
            MetricArg::Cases => Metric::Cases,
            MetricArg::Recovered => Metric::Recovered,
            MetricArg::Deaths => Metric::Deaths,
        }
    }
}

#[derive(Args, Debug)]
struct SummaryArgs {
    /// Country code (ISO2, e.g. DE or de) or `worldwide`.
    #[arg(short, long, default_value = "worldwide", value_parser = country_code)]
    country: String,
    /// Highlighted metric.
    #[arg(short, long, value_enum, default_value = "cases")]
    metric: MetricArg,
}

/// Country codes are matched upper-case, `worldwide` in any case.
fn country_code(s: &str) -> Result<String, String> {
    let s = s.trim();
    if s.is_empty() {
        Err("country code must not be empty".to_string())
    } else if s.eq_ignore_ascii_case(WORLDWIDE) {
        Ok(WORLDWIDE.to_string())
    } else {
        Ok(s.to_ascii_uppercase())
    }
}

#[derive(Args, Debug)]
struct TableArgs {
    /// Show only the first N rows.
    #[arg(short, long)]
    limit: Option<usize>,
}

#[derive(Args, Debug)]
struct ChartArgs {
    /// Output path (.svg).
    #[arg(long)]
    out: PathBuf,
    #[arg(short, long, value_enum, default_value = "cases")]
    metric: MetricArg,
    /// Days of history to request.
    #[arg(long, default_value_t = 120)]
    days: u32,
    /// Width of the chart (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the chart (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// Locale for tick labels, e.g. en, de or de-AT.
    #[arg(long, default_value = "en")]
    locale: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = Config::default()
        .with_base_url(cli.api_url.as_str())
        .with_timeout(Duration::from_secs(cli.timeout));
    match cli.cmd {
        Command::Summary(args) => cmd_summary(&config, args),
        Command::Table(args) => cmd_table(&config, args),
        Command::Countries => cmd_countries(&config),
        Command::Chart(args) => cmd_chart(config, args),
    }
}

/// Start a session and wait for the initial load.
fn load(config: &Config) -> Result<Session> {
    let client = Client::new(config)?;
    let mut session = Session::new(Arc::new(client), config.history_days);
    session.start();
    session
        .wait_idle(config.timeout * 2)
        .context("waiting for initial data")?;
    Ok(session)
}

fn fail_on_notice(dash: &Dashboard) -> Result<()> {
    match &dash.notice {
        Some(msg) => anyhow::bail!("{msg}"),
        None => Ok(()),
    }
}

fn cmd_summary(config: &Config, args: SummaryArgs) -> Result<()> {
    let mut session = load(config)?;
    fail_on_notice(&session.dashboard())?;
    session.select_metric(args.metric.into());
    if args.country != session.state().active_country().code() {
        session.select_country(&args.country)?;
        session.wait_idle(config.timeout * 2)?;
    }
    let dash = session.dashboard();
    fail_on_notice(&dash)?;

    println!("{}", dash.country_label);
    for card in &dash.cards {
        let marker = if card.active { "*" } else { " " };
        println!(
            "{} {:<18} today {:>12}   total {:>8}",
            marker, card.title, card.delta, card.total
        );
    }
    Ok(())
}

fn cmd_table(config: &Config, args: TableArgs) -> Result<()> {
    let session = load(config)?;
    let dash = session.dashboard();
    fail_on_notice(&dash)?;
    let limit = args.limit.unwrap_or(dash.table.len());
    for line in dash.table.iter().take(limit) {
        println!("{:<32} {:>15}", line.country, line.cases);
    }
    Ok(())
}

fn cmd_countries(config: &Config) -> Result<()> {
    let session = load(config)?;
    let dash = session.dashboard();
    fail_on_notice(&dash)?;
    println!("{:<8} Worldwide", "worldwide");
    for opt in &dash.options {
        println!("{:<8} {}", opt.code, opt.display_name);
    }
    Ok(())
}

fn cmd_chart(config: Config, args: ChartArgs) -> Result<()> {
    let config = config.with_history_days(args.days);
    let mut session = load(&config)?;
    session.select_metric(args.metric.into());
    let dash = session.dashboard();
    fail_on_notice(&dash)?;
    chart::render_svg(&dash.chart, &args.out, args.width, args.height, &args.locale)?;
    eprintln!(
        "Wrote {} ({} days) to {}",
        dash.chart.title,
        dash.chart.points.len(),
        args.out.display()
    );
    Ok(())
}

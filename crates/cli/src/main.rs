use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use quantbt_analytics::{BlackScholes, StatisticalTests};
use quantbt_backtest::{CsvOptionChain, CsvPriceProvider};
use quantbt_cli::{run_backtest, write_report, AppConfig, ConfigLoader};
use quantbt_core::{OptionChainProvider, OptionSide, PriceProvider};

#[derive(Parser)]
#[command(name = "quantbt")]
#[command(about = "Strategy backtesting and risk analytics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configured strategy over a price file and analyze the result
    Backtest {
        /// Daily price CSV (date,open,high,low,close,volume)
        #[arg(short, long)]
        prices: PathBuf,
        /// Market index price CSV used for beta and the t-test
        #[arg(short, long)]
        market: Option<PathBuf>,
        /// Option chain CSV (expiration,side,strike,last_price)
        #[arg(long)]
        chain: Option<PathBuf>,
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: PathBuf,
        /// Overlay config/Config.<profile>.toml
        #[arg(long, env = "QUANTBT_PROFILE")]
        profile: Option<String>,
        /// Write the risk report as a one-row CSV
        #[arg(short, long)]
        report: Option<PathBuf>,
    },
    /// Price a European option and compute its Greeks
    Greeks {
        #[arg(long)]
        spot: f64,
        #[arg(long)]
        strike: f64,
        /// Time to expiry in years
        #[arg(long)]
        time: f64,
        /// Annual risk-free rate
        #[arg(long, default_value_t = 0.0)]
        rate: f64,
        /// Annualized volatility
        #[arg(long)]
        volatility: f64,
        /// call or put
        #[arg(long, default_value = "call")]
        side: OptionSide,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Backtest {
            prices,
            market,
            chain,
            config,
            profile,
            report,
        } => {
            let app_config = match profile.as_deref() {
                Some(profile) => ConfigLoader::load_with_profile(&config, profile)?,
                None => ConfigLoader::load(&config)?,
            };
            run_backtest_command(
                &app_config,
                &prices,
                market.as_deref(),
                chain.as_deref(),
                report.as_deref(),
            )?;
        }
        Commands::Greeks {
            spot,
            strike,
            time,
            rate,
            volatility,
            side,
        } => {
            run_greeks(spot, strike, time, rate, volatility, side)?;
        }
    }

    Ok(())
}

fn run_backtest_command(
    config: &AppConfig,
    prices_path: &Path,
    market_path: Option<&Path>,
    chain_path: Option<&Path>,
    report_path: Option<&Path>,
) -> anyhow::Result<()> {
    tracing::info!(prices = %prices_path.display(), "Running backtest");

    let prices = CsvPriceProvider::new(prices_path)
        .fetch()
        .with_context(|| format!("Failed to load prices: {}", prices_path.display()))?;

    let market = market_path
        .map(|path| {
            CsvPriceProvider::new(path)
                .fetch()
                .map(|series| series.returns())
                .with_context(|| format!("Failed to load market prices: {}", path.display()))
        })
        .transpose()?;

    let chain = chain_path
        .map(|path| {
            CsvOptionChain::load(path)
                .with_context(|| format!("Failed to load option chain: {}", path.display()))
        })
        .transpose()?;

    let outcome = run_backtest(
        config,
        &prices,
        market.as_ref(),
        chain.as_ref().map(|c| c as &dyn OptionChainProvider),
    )?;

    println!("\n=== {} ===\n", outcome.strategy);
    println!(
        "Final value: {:.2} (buy and hold: {:.2})\n",
        outcome.portfolio.last_total(),
        outcome.benchmark.last_total()
    );
    print!("{}", outcome.analysis.report);

    if let Some(hedge) = outcome.analysis.hedge {
        println!("\n{hedge}");
    }
    print_tests(&outcome.analysis.tests);

    if let Some(path) = report_path {
        write_report(path, &outcome.analysis.report)?;
        println!("\nReport written to {}", path.display());
    }

    Ok(())
}

fn print_tests(tests: &StatisticalTests) {
    println!("\nStatistical tests:");
    if let Some(welch) = &tests.welch {
        println!(
            "  Welch t-test vs market: t = {:.4}, p = {:.4}",
            welch.t_statistic, welch.p_value
        );
    }
    if let Some(adf) = &tests.adf {
        println!(
            "  ADF: statistic = {:.4}, p = {:.4}, lags = {} (1%: {:.3}, 5%: {:.3}, 10%: {:.3})",
            adf.statistic,
            adf.p_value,
            adf.used_lag,
            adf.critical_values.one_percent,
            adf.critical_values.five_percent,
            adf.critical_values.ten_percent
        );
    }
    let acf: Vec<String> = tests.acf.iter().map(|v| format!("{v:.3}")).collect();
    println!("  ACF: [{}]", acf.join(", "));
}

fn run_greeks(
    spot: f64,
    strike: f64,
    time: f64,
    rate: f64,
    volatility: f64,
    side: OptionSide,
) -> anyhow::Result<()> {
    let model = BlackScholes::new(spot, strike, time, rate, volatility)?;
    let greeks = model.greeks(side);

    println!("\n=== Black-Scholes {side} ===\n");
    println!("Price: {:>10.4}", model.price(side));
    println!("Delta: {:>10.4}", greeks.delta);
    println!("Gamma: {:>10.4}", greeks.gamma);
    println!("Theta: {:>10.4}", greeks.theta);
    println!("Vega:  {:>10.4}", greeks.vega);

    Ok(())
}

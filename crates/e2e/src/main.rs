//! login-e2e - scenario runner entry point

use std::path::PathBuf;
use std::process::ExitCode;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use login_e2e::playwright::Browser;
use login_e2e::{E2eResult, RunnerConfig, Scenario, TestRunner};

/// Browser E2E scenarios for the demo login page
#[derive(Parser, Debug)]
#[command(name = "login-e2e")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = "login-e2e.toml", global = true)]
    config: PathBuf,

    /// Base URL of the page under test
    #[arg(long, env = "LOGIN_E2E_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long, global = true)]
    browser: Option<Browser>,

    /// Show the browser window
    #[arg(long, global = true)]
    headed: bool,

    /// Implicit wait for actions and expectations
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Output directory for results and screenshots
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Directory of YAML scenarios instead of the built-in suite
    #[arg(short, long, global = true)]
    specs: Option<PathBuf>,

    /// Skip the target reachability check
    #[arg(long, global = true)]
    skip_reachability_check: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run scenarios
    Run {
        /// Run only scenarios with this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Run only the scenario with this name
        #[arg(short, long, conflicts_with = "tag")]
        name: Option<String>,
    },

    /// List scenarios
    List,

    /// Print the generated Playwright script for a scenario
    Script {
        #[arg(short, long)]
        name: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            return ExitCode::from(2);
        }
    };

    match rt.block_on(async_main(cli)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn load_config(cli: &Cli) -> E2eResult<RunnerConfig> {
    let mut config = RunnerConfig::load(&cli.config)?;

    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(browser) = cli.browser {
        config.browser = browser;
    }
    if cli.headed {
        config.headless = false;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.command_timeout_ms = timeout_ms;
    }
    if let Some(output) = &cli.output {
        config.output_dir = output.clone();
    }
    if let Some(specs) = &cli.specs {
        config.specs_dir = Some(specs.clone());
    }
    if cli.skip_reachability_check {
        config.reachability.enabled = false;
    }

    config.validate()?;
    Ok(config)
}

async fn async_main(cli: Cli) -> E2eResult<bool> {
    let config = load_config(&cli)?;
    let runner = TestRunner::with_config(config);

    match cli.command {
        Commands::List => {
            for scenario in runner.load_scenarios()? {
                print_scenario(&scenario);
            }
            Ok(true)
        }
        Commands::Script { name } => {
            println!("{}", runner.script_for(&name)?);
            Ok(true)
        }
        Commands::Run { tag, name } => {
            info!("login-e2e v{}", env!("CARGO_PKG_VERSION"));
            runner.preflight().await?;

            let results = if let Some(name) = name {
                runner.run_named(&name).await?
            } else if let Some(tag) = tag {
                runner.run_tagged(&tag).await?
            } else {
                runner.run_all().await?
            };

            runner.write_results(&results)?;
            Ok(results.success())
        }
    }
}

fn print_scenario(scenario: &Scenario) {
    if scenario.tags.is_empty() {
        println!("[{}] {}", scenario.group, scenario.name);
    } else {
        println!("[{}] {} ({})", scenario.group, scenario.name, scenario.tags.join(", "));
    }
}

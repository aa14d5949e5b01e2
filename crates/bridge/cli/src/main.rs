//! contract-bridge - generate, analyze and deploy Anchor programs
//!
//! - `prompt` prints the generation prompt and its placeholder program id
//! - `generate` asks the AI backend for code and prints the contract
//! - `run` executes the whole pipeline through deployment

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bridge_pipeline::adapters::OpenAiClient;
use bridge_pipeline::{BridgeConfig, ContractPipeline, Generator, PromptBuilder};
use bridge_types::{CodeParams, Contract, ContractView, StatusType};

/// Solana contract bridge CLI
#[derive(Parser)]
#[command(name = "contract-bridge")]
#[command(about = "Generate, analyze and deploy Solana Anchor programs", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "BRIDGE_CONFIG", global = true)]
    config: Option<String>,

    /// Log level (overrides the configured level)
    #[arg(long, env = "BRIDGE_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "BRIDGE_LOG_JSON", global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the generation prompt without calling the AI backend
    Prompt(ContractArgs),

    /// Generate code and print the resulting contract
    Generate {
        #[command(flatten)]
        contract: ContractArgs,

        /// Use this prompt instead of the built-in template
        #[arg(long)]
        prompt: Option<String>,
    },

    /// Generate, analyze and deploy
    Run {
        #[command(flatten)]
        contract: ContractArgs,

        /// Use this prompt instead of the built-in template
        #[arg(long)]
        prompt: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
struct ContractArgs {
    /// What the contract is for, e.g. "token"
    #[arg(long = "type")]
    contract_type: String,

    /// Contract name; its lowercase form becomes the program module
    #[arg(long)]
    name: String,

    /// Author credited in the generated code
    #[arg(long)]
    author: Option<String>,

    /// Target cluster: testnet, devnet or mainnet
    #[arg(long, default_value = "testnet")]
    network: String,
}

impl ContractArgs {
    fn params(&self) -> anyhow::Result<CodeParams> {
        CodeParams::parse(
            &self.contract_type,
            &self.name,
            self.author.clone(),
            &self.network,
        )
        .context("invalid contract parameters")
    }
}

fn init_tracing(level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.to_string().into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_contract(contract: &Contract) -> anyhow::Result<()> {
    let view = ContractView::from(contract);
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

fn exit_code(contract: &Contract) -> ExitCode {
    if contract.status_type() == StatusType::Failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = BridgeConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, cli.json_logs || config.logging.json);

    match cli.command {
        Command::Prompt(args) => {
            let params = args.params()?;
            println!("placeholder: {}", PromptBuilder::placeholder_for(&params));
            println!();
            print!("{}", PromptBuilder::build(&params));
            Ok(ExitCode::SUCCESS)
        }
        Command::Generate { contract, prompt } => {
            let params = contract.params()?;
            let ai = OpenAiClient::from_config(&config.ai)?;
            info!(model = %ai.model(), "Generating contract");
            let generator = Generator::new(Arc::new(ai), config.ai.timeout());
            let contract = generator.generate(&params, prompt.as_deref()).await?;
            print_contract(&contract)?;
            Ok(exit_code(&contract))
        }
        Command::Run { contract, prompt } => {
            let params = contract.params()?;
            let pipeline = ContractPipeline::from_config(config)?;
            info!(analyzers = ?pipeline.aggregator().tools(), "Running pipeline");
            let run = pipeline.run(&params, prompt.as_deref()).await?;
            print_contract(&run.contract)?;
            Ok(exit_code(&run.contract))
        }
    }
}

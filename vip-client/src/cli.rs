use std::num::NonZeroU64;

use alloy::rpc::types::BlockNumberOrTag;
use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use vip_common::{
    address::AddressQuery,
    models::{rank_scores, total_score, StageId},
};
use vip_ethereum::{
    collector::DEFAULT_PAGE_SIZE, rpc::config::RPCRetryConfig, CollectorConfig,
    EthereumRpcClient, EvmScoreContract, PaginatedCollector,
};

use crate::output::{render_reports, OutputFormat, StageReport};

/// VIP Client CLI - A tool for reading VIP scores from an EVM score contract
///
/// Pages through `getScores` of the configured contract, drops padding entries and prints the
/// accounts ranked by score.
#[derive(Parser, Debug, Clone, PartialEq)]
#[clap(version = env!("CARGO_PKG_VERSION"))]
struct CliArgs {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging. This will show every fetched page and the calls sent to the
    /// node. Ignored if RUST_LOG is set.
    #[clap(long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines instead of human readable text.
    #[clap(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// Collect all scores of one or more stages and print them ranked.
    Scores(ScoresArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ScoresArgs {
    /// Ethereum node client rpc url
    #[clap(long, env = "RPC_URL")]
    pub rpc_url: String,

    /// Address of the VIP score contract.
    #[clap(long, env = "VIP_SCORE_CONTRACT")]
    pub contract: String,

    /// Stage to collect. Repeat the flag or pass a comma separated list to collect several
    /// stages concurrently.
    #[clap(long, env = "VIP_STAGE", value_delimiter = ',', required = true)]
    pub stage: Vec<StageId>,

    /// Number of entries requested per call.
    #[clap(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: NonZeroU64,

    /// Fail instead of fetching more than this many pages per stage. Unlimited by default.
    #[clap(long)]
    pub max_pages: Option<usize>,

    /// Block number to read the scores at. Defaults to the latest block.
    #[clap(long)]
    pub block: Option<u64>,

    /// How often a rate limited or failed request is retried before giving up.
    #[clap(long, default_value = "3")]
    pub max_retries: usize,

    /// Only print this account. Accepts a hex address in any case or an `init1...` bech32
    /// address. The printed rank is the account's rank among all collected scores.
    #[clap(long)]
    pub address: Option<AddressQuery>,

    /// Output format.
    #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl ScoresArgs {
    fn validate(&self) -> Result<(), String> {
        if self.max_pages == Some(0) {
            return Err("max_pages must be at least 1".to_string());
        }
        let mut stages = self.stage.clone();
        stages.sort_unstable();
        stages.dedup();
        if stages.len() != self.stage.len() {
            return Err("Each stage may only be requested once".to_string());
        }
        Ok(())
    }
}

pub async fn run_cli() -> anyhow::Result<()> {
    // Parse CLI Args
    let args: CliArgs = CliArgs::parse();

    init_logging(args.verbose, args.log_json)?;

    match args.command {
        Command::Scores(scores_args) => {
            scores_args
                .validate()
                .map_err(|e| anyhow!(e))?;
            let reports = collect_reports(&scores_args).await?;
            println!("{}", render_reports(&reports, scores_args.format)?);
        }
    }
    Ok(())
}

fn init_logging(verbose: bool, json: bool) -> anyhow::Result<()> {
    let log_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // stdout is reserved for the score output
    let result = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.context("Failed to set up logging subscriber")
}

/// Collects and ranks the scores of every requested stage.
pub async fn collect_reports(args: &ScoresArgs) -> anyhow::Result<Vec<StageReport>> {
    let retry_config = RPCRetryConfig { max_retries: args.max_retries, ..Default::default() };
    let client = EthereumRpcClient::new(&args.rpc_url)?.with_retry(retry_config);

    let mut contract = EvmScoreContract::from_str_address(client, &args.contract)?;
    if let Some(block) = args.block {
        contract = contract.at_block(BlockNumberOrTag::Number(block));
    }
    info!(contract = %contract.address(), stages = ?args.stage, "Collecting VIP scores");

    let collector = PaginatedCollector::with_config(
        contract,
        CollectorConfig::new(args.page_size, args.max_pages),
    );

    let results = collector
        .collect_stages(&args.stage)
        .await;

    args.stage
        .iter()
        .zip(results)
        .map(|(stage, result)| -> anyhow::Result<StageReport> {
            let scores =
                result.with_context(|| format!("Failed to collect scores for stage {stage}"))?;
            debug!(stage, total = %total_score(&scores), "Stage collected");
            let mut ranked = rank_scores(&scores);
            if let Some(query) = &args.address {
                ranked.retain(|entry| query.matches(&entry.address));
            }
            Ok(StageReport { stage: *stage, scores: ranked })
        })
        .collect()
}

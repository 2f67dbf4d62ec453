//! REACH+ Agent - Entry Point
//!
//! Answers one query from the command line and prints the merged response
//! plus a next-best-action recommendation as JSON.

use anyhow::{bail, Context};
use reach_agent::{Assistant, Config, ProviderRegistry, RunMode, UserContext};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

struct Args {
    mode: Option<RunMode>,
    user: String,
    district: Option<String>,
    city: Option<String>,
    operator: Option<String>,
    emergency: Option<String>,
    json_logs: bool,
    query: String,
}

fn print_help() {
    println!("REACH+ Agent v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: reach-agent [OPTIONS] <query>");
    println!();
    println!("Options:");
    println!("  --react              ReAct pass over the keyword-selected providers");
    println!("  --all                Run every registered provider");
    println!("  --user ID            User id (default: cli)");
    println!("  --district D         User district");
    println!("  --city C             User city (default: İstanbul)");
    println!("  --operator OP        Mobile operator");
    println!("  --emergency LEVEL    low | medium | high | critical");
    println!("  --json-logs          Log to stderr as JSON");
    println!("  --help, -h           Show this help");
    println!();
    println!("Environment variables:");
    println!("  OLLAMA_URL           Enables LLM agent selection");
    println!("  REACH_LLM_MODEL      Selection model (default: llama3.2:3b)");
    println!("  REACH_CONFIG         TOML tuning file");
    println!("  RUST_LOG             Log filter (default: info)");
}

fn parse_args(args: &[String]) -> anyhow::Result<Args> {
    let mut parsed = Args {
        mode: None,
        user: "cli".to_string(),
        district: None,
        city: None,
        operator: None,
        emergency: None,
        json_logs: false,
        query: String::new(),
    };
    let mut words = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .cloned()
                .with_context(|| format!("{} needs a value", name))
        };
        match arg.as_str() {
            "--react" => parsed.mode = Some(RunMode::React),
            "--all" => parsed.mode = Some(RunMode::All),
            "--json-logs" => parsed.json_logs = true,
            "--user" => parsed.user = value("--user")?,
            "--district" => parsed.district = Some(value("--district")?),
            "--city" => parsed.city = Some(value("--city")?),
            "--operator" => parsed.operator = Some(value("--operator")?),
            "--emergency" => parsed.emergency = Some(value("--emergency")?),
            flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
            word => words.push(word.to_string()),
        }
    }

    parsed.query = words.join(" ");
    Ok(parsed)
}

impl Args {
    fn user_context(&self) -> anyhow::Result<UserContext> {
        let mut ctx = UserContext::new(&self.user);
        if self.district.is_some() || self.city.is_some() {
            ctx = ctx.with_location(
                self.district.as_deref().unwrap_or(reach_agent::types::UNKNOWN_DISTRICT),
                self.city.as_deref().unwrap_or(reach_agent::types::DEFAULT_CITY),
            );
        }
        if let Some(op) = &self.operator {
            ctx = ctx.with_operator(op);
        }
        if let Some(level) = &self.emergency {
            let level: reach_agent::Severity = level.parse().map_err(anyhow::Error::msg)?;
            ctx = ctx.with_preference("emergencyLevel", json!(level));
        }
        Ok(ctx)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    if raw.is_empty() || raw.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }
    let args = parse_args(&raw)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.json_logs {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    if args.query.trim().is_empty() {
        bail!("No query given");
    }

    info!("REACH+ Agent v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().context("Failed to load configuration")?;
    let assistant = Assistant::from_config(&config, ProviderRegistry::new());
    let ctx = args.user_context()?;
    let mode = args.mode.unwrap_or(assistant.mode());

    let reply = assistant.process_with_mode(mode, &args.query, &ctx).await;
    let recommendation = assistant.recommend(&args.query, &ctx)?;

    let output = json!({
        "response": reply.response,
        "mode": reply.mode,
        "stats": reply.stats,
        "reasoning": reply.reasoning,
        "recommendation": recommendation,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

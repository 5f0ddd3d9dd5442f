use anyhow::{Context, Result};
use chatrelay_core::chat::{ChatReply, ChatRequest, ChatService};
use chatrelay_core::config::{self, Settings};
use chatrelay_core::providers::OpenRouterProvider;
use clap::Parser;
use console::style;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML config file (defaults and CHATRELAY_* variables are used otherwise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model to use, overriding the configured one
    #[arg(short, long)]
    model: Option<String>,

    /// Send a single prompt and exit
    #[arg(short, long)]
    prompt: Option<String>,

    /// Maximum tool iterations per query
    #[arg(long)]
    max_iterations: Option<u32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply_to(&self, settings: &mut Settings) {
        if let Some(model) = &self.model {
            settings.provider.model = model.clone();
        }
        if let Some(level) = &self.log_level {
            settings.app.log_level = level.clone();
        }
        if let Some(max_iterations) = self.max_iterations {
            settings.chat.max_iterations = max_iterations;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = config::load(cli.config.as_deref()).context("Failed to load settings")?;
    cli.apply_to(&mut settings);
    init_tracing(&settings.app.log_level);

    let provider =
        OpenRouterProvider::from_settings(&settings).context("Failed to create provider client")?;
    let service = ChatService::new(Arc::new(provider), settings.chat.clone());

    match &cli.prompt {
        Some(prompt) => {
            let reply = service.process_query(&ChatRequest::new(prompt.as_str())).await?;
            println!("{}", reply.response);
            Ok(())
        }
        None => interactive(&service).await,
    }
}

async fn interactive(service: &ChatService) -> Result<()> {
    println!("{}", style("\nchatrelay").bold().cyan());
    println!(
        "Model {} {}\n",
        style(service.model()).green(),
        style("- type \"exit\" or \"quit\" to end the session").dim()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if is_exit_command(input) {
            break;
        }

        match service.process_query(&ChatRequest::new(input)).await {
            Ok(reply) => render(&reply),
            Err(e) => eprintln!("{} {}", style("error:").red().bold(), e),
        }
    }

    println!("{}", style("Goodbye").dim());
    Ok(())
}

fn render(reply: &ChatReply) {
    println!("{}", reply.response);
    let mut footer = format!("{} iteration(s)", reply.iterations);
    if reply.tools_called > 0 {
        footer.push_str(&format!(", tools: {}", reply.tool_names.join(", ")));
    }
    if reply.max_iterations_reached {
        footer.push_str(", iteration limit reached");
    }
    println!("{}\n", style(footer).dim());
}

fn is_exit_command(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

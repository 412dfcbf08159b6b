//! threadtext: thread text aggregation and bot housekeeping over thread exports.

use std::path::{Path, PathBuf};

use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod purge;
mod responder;

use commands::{Bot, Outcome};
use responder::ConsoleResponder;
use threadtext_core::ThreadTextConfig;
use threadtext_docs::HttpDocumentFetcher;
use threadtext_thread::MemoryThread;

/// Positional arguments plus the flags that were given.
#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    positional: Vec<String>,
    flags: Vec<String>,
    bot_id: Option<String>,
    invoker: Option<String>,
}

impl Args {
    fn has(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }
}

fn parse_args(raw: &[String]) -> anyhow::Result<Args> {
    let mut args = Args::default();
    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--bot-id" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--bot-id needs a value"))?;
                args.bot_id = Some(value.clone());
            }
            "--as" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--as needs a value"))?;
                args.invoker = Some(value.clone());
            }
            flag if flag.starts_with("--") => args.flags.push(flag.to_string()),
            _ => args.positional.push(arg.clone()),
        }
    }
    Ok(args)
}

fn print_usage() {
    println!("threadtext: thread text aggregation over thread exports");
    println!();
    println!("Usage: threadtext <command> [options]");
    println!();
    println!("Commands:");
    println!("  text <export> [--include-bots]             Aggregate the thread's text");
    println!("  embeds <export> [--merged] [--exclude-bots] Collect embed field names and values");
    println!("  purge <export> --bot-id <id> [--as <name>] [--write]");
    println!("                                             Delete the bot's unkept messages");
    println!("  delete <export> <message-id> --bot-id <id> [--as <name>] [--write]");
    println!("                                             Delete one of the bot's messages");
    println!("  help                                       Show this help message");
}

fn export_path(args: &Args) -> anyhow::Result<PathBuf> {
    args.positional
        .first()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("missing thread export path"))
}

fn bot_id(args: &Args) -> anyhow::Result<&str> {
    args.bot_id
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("--bot-id is required"))
}

/// Name used when addressing the invoker in replies.
fn invoker(args: &Args) -> &str {
    args.invoker.as_deref().unwrap_or("there")
}

fn save_if_requested(args: &Args, thread: &MemoryThread, path: &Path) -> anyhow::Result<()> {
    if args.has("--write") {
        thread.save(path)?;
        info!("Wrote {} messages back to {}", thread.len(), path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = raw.first().cloned() else {
        print_usage();
        std::process::exit(1);
    };
    if matches!(command.as_str(), "help" | "--help" | "-h") {
        print_usage();
        return Ok(());
    }
    let args = parse_args(&raw[1..])?;

    let config = ThreadTextConfig::from_env()?;
    let fetcher = HttpDocumentFetcher::new(config.docs_base_url.clone(), config.fetch_timeout())?;
    let responder = ConsoleResponder::stdout(&config);
    let bot = Bot::new(config, responder, fetcher);
    info!("Output directory: {}", bot.config().output_dir.display());

    let path = export_path(&args)?;
    let thread = MemoryThread::load(&path)?;

    let outcome = match command.as_str() {
        "text" => bot.thread_text(&thread, args.has("--include-bots")).await?,
        "embeds" => {
            bot.embeds(&thread, args.has("--merged"), args.has("--exclude-bots"))
                .await?
        }
        "purge" => {
            let outcome = bot.purge(&thread, bot_id(&args)?, invoker(&args)).await?;
            save_if_requested(&args, &thread, &path)?;
            outcome
        }
        "delete" => {
            let message_id: u64 = args
                .positional
                .get(1)
                .ok_or_else(|| anyhow::anyhow!("missing message id"))?
                .parse()?;
            let outcome = bot
                .delete(&thread, message_id, bot_id(&args)?, invoker(&args))
                .await?;
            save_if_requested(&args, &thread, &path)?;
            outcome
        }
        other => {
            eprintln!("Unknown command: {}. Use 'threadtext help' for usage.", other);
            std::process::exit(1);
        }
    };

    if let Outcome::Refused(reason) = outcome {
        info!("Command refused: {}", reason);
        std::process::exit(1);
    }
    Ok(())
}

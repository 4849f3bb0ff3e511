use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use client::{ApiClient, BookTracker, PollState};

/// Submit a Project Gutenberg book and follow its analysis
#[derive(Parser, Debug)]
#[command(name = "watch_book", version)]
struct Args {
    /// Gutenberg book id
    book_id: String,

    /// Base URL of the analysis service
    #[arg(long, default_value = "http://localhost:3000")]
    api_url: String,

    /// Delay between status polls
    #[arg(long, default_value_t = 2000)]
    interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let api = ApiClient::new(&args.api_url)?;
    let mut tracker = BookTracker::with_interval(Arc::new(api), Duration::from_millis(args.interval_ms));
    let mut updates = tracker.subscribe();

    println!("=== Watching book {} ===\n", args.book_id);
    tracker.track(Some(args.book_id.as_str()));

    let mut metadata_shown = false;
    let mut last_seen = PollState::default();
    while updates.changed().await.is_ok() {
        let state = updates.borrow_and_update().clone();

        if !metadata_shown {
            if let Some(metadata) = &state.metadata {
                println!("{} by {}", metadata.title, metadata.author);
                println!("  Language: {}  Rights: {}", metadata.language, metadata.rights);
                if !metadata.subjects.is_empty() {
                    println!("  Subjects: {}", metadata.subjects.join("; "));
                }
                println!();
                metadata_shown = true;
            }
        }

        if state.analysis != last_seen.analysis {
            if let Some(analysis) = &state.analysis {
                let (nodes, edges) = analysis
                    .graph
                    .as_ref()
                    .map(|g| (g.nodes.len(), g.edges.len()))
                    .unwrap_or((0, 0));
                println!(
                    "[{:?}] {} characters, {} interactions, {} quotes",
                    analysis.status,
                    nodes,
                    edges,
                    analysis.quotes.len()
                );
            }
        }

        if let Some(error) = &state.error {
            eprintln!("Error: {}", error);
            break;
        }

        let finished = state
            .analysis
            .as_ref()
            .is_some_and(|analysis| analysis.status.is_terminal());
        if finished {
            print_quotes(&state);
            break;
        }

        last_seen = state;
    }

    tracker.wait_until_settled().await;
    Ok(())
}

fn print_quotes(state: &PollState) {
    let Some(analysis) = &state.analysis else {
        return;
    };

    println!("\n=== QUOTES ===\n");
    if analysis.quotes.is_empty() {
        println!("  (none)");
    }
    for quote in &analysis.quotes {
        println!(
            "  {} ({}): \"{}\"",
            quote.character_name, quote.sentiment, quote.text
        );
    }
}

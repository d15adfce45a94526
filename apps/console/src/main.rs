use std::{
    io::{self, BufRead, Write},
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{HttpAnswerGateway, QueryController, QueryEvent};
use tracing::info;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
struct Args {
    /// Base URL of the answer service; overrides console.toml and env.
    #[arg(long)]
    gateway_url: Option<String>,
    /// Ask one question and exit instead of starting the prompt loop.
    #[arg(long, short = 'q')]
    question: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let settings = load_settings();
    let gateway_url = args.gateway_url.unwrap_or(settings.gateway_url);
    info!("using answer gateway at {gateway_url}");

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.request_timeout_seconds))
        .build()
        .context("failed to build http client")?;
    let gateway = Arc::new(HttpAnswerGateway::with_client(http, gateway_url));
    let controller = QueryController::new(gateway);

    if let Some(question) = args.question {
        ask_and_render(&controller, &question).await;
        return Ok(());
    }

    println!("Want to talk about it? (empty line to skip, Ctrl-D to quit)");
    let stdin = io::stdin();
    loop {
        print!("Your question: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        // Empty input never issues a request.
        if question.is_empty() {
            continue;
        }

        ask_and_render(&controller, question).await;
    }

    Ok(())
}

async fn ask_and_render(controller: &Arc<QueryController>, question: &str) {
    let mut events = controller.subscribe_events();
    controller.update_question(question).await;
    if !controller.submit().await {
        return;
    }
    println!("Thinking...");

    loop {
        match events.recv().await {
            Ok(QueryEvent::SubmissionStarted) => {}
            Ok(QueryEvent::AnswerReady { answer, sources }) => {
                println!();
                println!("{answer}");
                if !sources.is_empty() {
                    println!();
                    println!("Sources:");
                    for (index, source) in sources.iter().enumerate() {
                        println!("  {}. {source}", index + 1);
                    }
                }
                println!();
                break;
            }
            Ok(QueryEvent::QueryFailed { message }) => {
                println!("Error: {message}");
                println!();
                break;
            }
            Err(_) => break,
        }
    }
}

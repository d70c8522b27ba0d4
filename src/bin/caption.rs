//! Captions a local image through a running caption server.

use std::path::PathBuf;
use std::process::ExitCode;

use ai_caption_generator::client::{CaptionBackend, CaptionSession, HttpCaptionClient};
use ai_caption_generator::init_tracing;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "caption", about = "Generate a social-media caption for an image")]
struct Args {
    /// Image file (PNG, JPEG, WebP, ...)
    image: PathBuf,

    /// Caption server base URL
    #[arg(long, env = "CAPTION_SERVER", default_value = "http://localhost:3000")]
    server: String,

    /// Number of captions to generate for the same image
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=10))]
    variants: u32,
}

async fn run<B: CaptionBackend>(session: &mut CaptionSession<B>, args: &Args) -> bool {
    session.select_file(&args.image).await;
    let mut ok = report(session);

    for _ in 1..args.variants {
        if !ok {
            break;
        }
        session.regenerate().await;
        ok = report(session);
    }
    ok
}

fn report<B: CaptionBackend>(session: &CaptionSession<B>) -> bool {
    match (session.result(), session.display()) {
        (Some(Ok(_)), Some(text)) => {
            println!("{text}");
            true
        }
        (_, Some(text)) => {
            eprintln!("{text}");
            false
        }
        _ => false,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing("caption=warn,ai_caption_generator=warn");

    let args = Args::parse();
    let backend = HttpCaptionClient::new(reqwest::Client::new(), &args.server);
    let mut session = CaptionSession::new(backend);

    if run(&mut session, &args).await {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

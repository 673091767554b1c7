use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "notes-cli")]
#[command(about = "Command-line client for the Notes API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5000")]
    url: String,

    /// Bearer token; falls back to NOTES_TOKEN
    #[arg(short, long, env = "NOTES_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service health
    Health,
    /// List your notes, newest first
    List,
    /// Show one note
    Get { id: String },
    /// Create a note
    Create {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        content: String,
    },
    /// Replace a note's title and content
    Update {
        id: String,
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        content: String,
    },
    /// Delete a note
    Delete { id: String },
    /// Ask the server to summarize a note
    Summarize { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
    }

    let request = match cli.command {
        Commands::Health => client.get(format!("{}/api/health", base)),
        Commands::List => client.get(format!("{}/api/notes", base)),
        Commands::Get { id } => client.get(format!("{}/api/notes/{}", base, id)),
        Commands::Create { title, content } => client
            .post(format!("{}/api/notes", base))
            .json(&json!({ "title": title, "content": content })),
        Commands::Update { id, title, content } => client
            .put(format!("{}/api/notes/{}", base, id))
            .json(&json!({ "title": title, "content": content })),
        Commands::Delete { id } => client.delete(format!("{}/api/notes/{}", base, id)),
        Commands::Summarize { id } => client.post(format!("{}/api/notes/{}/summarize", base, id)),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Notes API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

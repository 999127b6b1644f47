//! CZQT Tools CLI - submit and preview customer inquiries.
//!
//! # Usage
//!
//! ```bash
//! # Send an inquiry to a running site
//! czqt submit -n "Li Wei" -e li@acme.com -p "+86 139 0000 0000" \
//!     -r "Need D10 4-flute for HRC62"
//!
//! # Send to another relay
//! czqt submit --relay-url https://czqttools.com/api/contact -n ... -e ... -p ... -r ...
//!
//! # Show what would be sent, without sending
//! czqt preview -n "Li Wei" -e li@acme.com -p "+86 139 0000 0000" -r "HRC62"
//! ```
//!
//! # Commands
//!
//! - `submit` - Post an inquiry to the relay, falling back to a `mailto:` link
//! - `preview` - Render the inquiry text, `mailto:` link and tracking pixel URL

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use czqt_core::InquiryForm;
use url::Url;

mod commands;

#[derive(Parser)]
#[command(name = "czqt")]
#[command(author, version, about = "CZQT Tools inquiry CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit an inquiry to the relay
    Submit {
        #[command(flatten)]
        inquiry: InquiryArgs,

        /// Relay endpoint (overrides `CZQT_RELAY_URL`)
        #[arg(long)]
        relay_url: Option<Url>,

        /// Request the tracking pixel as the landing page does
        #[arg(long)]
        track: bool,
    },
    /// Render an inquiry without sending it
    Preview {
        #[command(flatten)]
        inquiry: InquiryArgs,
    },
}

/// Inquiry form fields.
#[derive(Args, Debug, Clone)]
struct InquiryArgs {
    /// Customer name
    #[arg(short, long)]
    name: String,

    /// Customer email address
    #[arg(short, long)]
    email: String,

    /// Customer phone number
    #[arg(short, long)]
    phone: String,

    /// Customer company
    #[arg(short, long, default_value = "")]
    company: String,

    /// Product requirements
    #[arg(short, long)]
    requirements: String,
}

impl From<InquiryArgs> for InquiryForm {
    fn from(args: InquiryArgs) -> Self {
        Self {
            name: args.name,
            email: args.email,
            phone: args.phone,
            company: args.company,
            requirements: args.requirements,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "czqt=info,czqt_client=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Submit {
            inquiry,
            relay_url,
            track,
        } => commands::submit::run(inquiry.into(), relay_url, track).await?,
        Commands::Preview { inquiry } => commands::preview::run(&inquiry.into())?,
    }
    Ok(())
}

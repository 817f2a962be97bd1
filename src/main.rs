//! CLI entry point for letterbox

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "letterbox")]
#[command(version)]
#[command(about = "Serve a newsletter archive from markdown letters", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the archive server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (defaults to server.port from the config)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (defaults to server.ip from the config)
        #[arg(short, long)]
        ip: Option<String>,

        /// Reload open pages when letters change
        #[arg(short, long)]
        watch: bool,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// Create a new letter
    New {
        /// Subject of the new letter
        subject: String,

        /// Slug (defaults to the slugified subject)
        #[arg(short, long)]
        slug: Option<String>,

        /// Publish date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List letters, newest first
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Render one letter page to stdout or a file
    Render {
        /// Slug of the letter
        slug: String,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "letterbox=debug,tower_http=debug,info"
    } else {
        "letterbox=info"
    };

    // Logs go to stderr so `render` output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Serve {
            port,
            ip,
            watch,
            open,
        } => {
            let app = letterbox::Letterbox::new(&base_dir)?;
            let port = port.unwrap_or(app.config.server.port);
            let ip = ip.unwrap_or_else(|| app.config.server.ip.clone());

            tracing::info!("Serving letters from {:?}", app.letters_dir);
            letterbox::server::start(&app, &ip, port, watch, open).await?;
        }

        Commands::New {
            subject,
            slug,
            date,
        } => {
            let app = letterbox::Letterbox::new(&base_dir)?;
            letterbox::commands::new::run(&app, &subject, slug.as_deref(), date.as_deref())?;
        }

        Commands::List { json } => {
            let app = letterbox::Letterbox::new(&base_dir)?;
            letterbox::commands::list::run(&app, json)?;
        }

        Commands::Render { slug, output } => {
            let app = letterbox::Letterbox::new(&base_dir)?;
            letterbox::commands::render::run(&app, &slug, output.as_deref())?;
        }

        Commands::Version => {
            println!("letterbox version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

//! CLI definitions for the `chatgate` binary.

use clap::{Parser, Subcommand};

/// Conversational gateway over MySQL and OpenAI-compatible chat providers.
#[derive(Parser)]
#[command(name = "chatgate", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Emit logs as JSON lines instead of text.
    #[arg(long, global = true, env = "LOG_JSON")]
    pub log_json: bool,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "OTEL_ENABLED")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Address to bind.
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on.
        #[arg(short, long, env = "PORT", default_value_t = 3000)]
        port: u16,
    },

    /// Check the database connection and required tables, then exit.
    Verify,
}

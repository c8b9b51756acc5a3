use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process;

mod commands;

/// Standardized exit codes for CLI.
/// 0 = OK, 2 = input error, 3 = partial failure (206), 4 = auth (401/403), 5 = not found (404), 1 = other.
#[allow(dead_code)]
const EXIT_OK: i32 = 0;
const EXIT_OTHER: i32 = 1;
const EXIT_INPUT: i32 = 2;
const EXIT_PARTIAL: i32 = 3;
const EXIT_AUTH: i32 = 4;
const EXIT_NOT_FOUND: i32 = 5;

#[derive(Parser)]
#[command(name = "mediax", version, about = "Media gate CLI: search, transform, manage assets")]
struct Cli {
    /// Gate server URL (default: http://localhost:3000)
    #[arg(long, env = "MEDIA_GATE_URL", default_value = "http://localhost:3000")]
    gate: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search assets with a Cloudinary search expression
    Search {
        /// Search expression (empty matches everything)
        #[arg(default_value = "")]
        expression: String,
        #[arg(long)]
        max_results: Option<u32>,
        /// Sort order, `field` or `field:asc|desc` (repeatable)
        #[arg(long)]
        sort_by: Vec<String>,
        #[arg(long)]
        next_cursor: Option<String>,
        /// Print the full search result instead of the URL list
        #[arg(long)]
        raw: bool,
    },
    /// Build a delivery URL for a transformed asset
    Transform {
        public_id: String,
        /// Transformation string (`w_300,c_scale`) or JSON object/array
        transformation: String,
    },
    /// Rename an asset
    Rename {
        from: String,
        to: String,
        #[arg(long)]
        overwrite: bool,
        #[arg(long)]
        invalidate: bool,
    },
    /// Delete an asset
    Destroy {
        public_id: String,
        #[arg(long)]
        invalidate: bool,
    },
    /// Upload a file (remote URL or data URI) under a public id
    Upload {
        public_id: String,
        file: String,
        /// Tag to attach (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        overwrite: bool,
    },
    /// Manage asset tags
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },
    /// Check gate server health
    Health,
    /// Print the gate's OpenAPI document
    Openapi,
}

#[derive(Subcommand)]
pub enum TagAction {
    /// Add a tag to assets
    Add {
        tag: String,
        #[arg(required = true)]
        public_ids: Vec<String>,
    },
    /// Remove a tag from assets
    Remove {
        tag: String,
        #[arg(required = true)]
        public_ids: Vec<String>,
    },
    /// Replace every tag of the assets with one tag
    Replace {
        tag: String,
        #[arg(required = true)]
        public_ids: Vec<String>,
    },
    /// Strip all tags from assets
    RemoveAll {
        #[arg(required = true)]
        public_ids: Vec<String>,
    },
}

/// Map error strings to exit codes. A gate answer (`HTTP <code>: ...`) is
/// decided by its status alone; anything else by the local failure kind.
fn exit_code_for(err: &str) -> i32 {
    let status = err
        .strip_prefix("HTTP ")
        .and_then(|rest| rest.get(..3))
        .and_then(|code| code.parse::<u16>().ok());
    match status {
        Some(206) => EXIT_PARTIAL,
        Some(401 | 403) => EXIT_AUTH,
        Some(404) => EXIT_NOT_FOUND,
        Some(400 | 413 | 415) => EXIT_INPUT,
        Some(_) => EXIT_OTHER,
        None if err.starts_with("parse ") || err.starts_with("missing ") => EXIT_INPUT,
        None => EXIT_OTHER,
    }
}

fn main() {
    let cli = Cli::parse();
    let client = commands::Client::new(&cli.gate);

    let result = match cli.command {
        Commands::Search {
            expression,
            max_results,
            sort_by,
            next_cursor,
            raw,
        } => commands::search(
            &client,
            &expression,
            max_results,
            &sort_by,
            next_cursor.as_deref(),
            raw,
        ),
        Commands::Transform {
            public_id,
            transformation,
        } => commands::transform(&client, &public_id, &transformation),
        Commands::Rename {
            from,
            to,
            overwrite,
            invalidate,
        } => commands::rename(&client, &from, &to, overwrite, invalidate),
        Commands::Destroy {
            public_id,
            invalidate,
        } => commands::destroy(&client, &public_id, invalidate),
        Commands::Upload {
            public_id,
            file,
            tags,
            overwrite,
        } => commands::upload(&client, &public_id, &file, &tags, overwrite),
        Commands::Tag { action } => commands::tag(&client, action),
        Commands::Health => commands::health(&client),
        Commands::Openapi => commands::openapi(&client),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        process::exit(exit_code_for(&e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_gate_status() {
        assert_eq!(exit_code_for("HTTP 206: 1 of 2 assets were not affected"), EXIT_PARTIAL);
        assert_eq!(exit_code_for("HTTP 401: Invalid Signature"), EXIT_AUTH);
        assert_eq!(exit_code_for("HTTP 404: asset \"a\" not found"), EXIT_NOT_FOUND);
        assert_eq!(exit_code_for("HTTP 400: missing argument \"tag\""), EXIT_INPUT);
        assert_eq!(exit_code_for("HTTP 502: boom"), EXIT_OTHER);
        assert_eq!(exit_code_for("request failed: connection refused"), EXIT_OTHER);
    }

    #[test]
    fn status_wins_over_message_wording() {
        assert_eq!(exit_code_for("HTTP 502: missing upstream field"), EXIT_OTHER);
        assert_eq!(exit_code_for("HTTP 500: cannot parse response"), EXIT_OTHER);
        assert_eq!(exit_code_for("HTTP 415: content-type must be application/json"), EXIT_INPUT);
        assert_eq!(exit_code_for("parse response: expected an array"), EXIT_INPUT);
    }
}

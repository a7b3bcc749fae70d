//! Siebel web-template generator CLI
//!
//! Each subcommand maps onto one registry tool and prints the tool's JSON result.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use siebel_webtemplate::tools::{ToolContext, ToolRegistry};
use siebel_webtemplate::{Config, Workspace};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "webtemplate")]
#[command(version)]
#[command(about = "Decompose HTML mockups into Siebel web templates", long_about = None)]
struct Cli {
    /// Directory holding run directories (overrides WEBTEMPLATE_OUTPUT_ROOT)
    #[arg(long, global = true, value_name = "DIR")]
    output_root: Option<PathBuf>,

    /// Directory for uploaded screenshots (overrides WEBTEMPLATE_UPLOAD_ROOT)
    #[arg(long, global = true, value_name = "DIR")]
    upload_root: Option<PathBuf>,

    /// Print compact instead of pretty JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a run from a model reply containing fenced json/html/css blocks
    Ingest {
        /// File with the model reply
        #[arg(long, value_name = "FILE")]
        response_file: PathBuf,

        /// Source screenshot to record with the run
        #[arg(long, value_name = "FILE")]
        image: Option<PathBuf>,
    },
    /// Create a run from HTML, manifest and CSS files
    Import {
        #[arg(long, value_name = "FILE")]
        html: PathBuf,

        #[arg(long, value_name = "FILE")]
        manifest: PathBuf,

        #[arg(long, value_name = "FILE")]
        css: Option<PathBuf>,
    },
    /// Check a run's manifest selectors against its HTML
    Validate {
        run: String,
    },
    /// Suggest resolving selectors similar to SELECTOR
    Suggest {
        run: String,
        selector: String,
    },
    /// Write applet and view templates for a run
    Generate {
        run: String,

        /// Skip building the zip archive
        #[arg(long)]
        no_archive: bool,
    },
    /// Zip a run's webtemplate directory
    Package {
        run: String,
    },
    /// Render a run's HTML with its CSS inlined
    Preview {
        run: String,

        /// Write the page to FILE instead of stdout
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// List registered tools with their parameter schemas
    Tools,
}

impl Command {
    /// Registry tool name and its parameters
    fn into_call(self) -> Option<(&'static str, Value)> {
        let call = match self {
            Command::Ingest { response_file, image } => (
                "ingest",
                json!({ "response_file": response_file, "image": image }),
            ),
            Command::Import { html, manifest, css } => (
                "import",
                json!({ "html": html, "manifest": manifest, "css": css }),
            ),
            Command::Validate { run } => ("validate", json!({ "run": run })),
            Command::Suggest { run, selector } => ("suggest", json!({ "run": run, "selector": selector })),
            Command::Generate { run, no_archive } => ("generate", json!({ "run": run, "archive": !no_archive })),
            Command::Package { run } => ("package", json!({ "run": run })),
            Command::Preview { run, output } => ("preview", json!({ "run": run, "output": output })),
            Command::Tools => return None,
        };
        Some(call)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(root) = &cli.output_root {
        config = config.output_root(root);
    }
    if let Some(root) = &cli.upload_root {
        config = config.upload_root(root);
    }

    let registry = ToolRegistry::with_defaults();
    let preview_to_stdout = matches!(cli.command, Command::Preview { output: None, .. });

    let Some((tool, params)) = cli.command.into_call() else {
        print_json(&registry.describe(), cli.compact)?;
        return Ok(());
    };

    log::debug!("Output root: {}", config.output_root.display());
    let workspace = Workspace::new(config);
    let mut context = ToolContext::new(&workspace);

    let result = registry
        .execute(tool, params, &mut context)
        .with_context(|| format!("'{}' failed", tool))?;

    // Raw HTML is more useful than a JSON string when previewing to stdout
    if preview_to_stdout {
        if let Some(html) = result.data.as_ref().and_then(|d| d.get("html")).and_then(Value::as_str) {
            println!("{}", html);
            return Ok(());
        }
    }

    print_json(&serde_json::to_value(&result)?, cli.compact)?;
    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

fn print_json(value: &Value, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", text);
    Ok(())
}

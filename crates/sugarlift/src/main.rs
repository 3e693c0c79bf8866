//! sugarlift - operator recovery for decompiled C# trees
//!
//! Usage:
//!   sugarlift run <tree.json>            Rewrite a serialized statement and print it as C#
//!   sugarlift run <tree.json> --json     Print the rewritten tree as JSON instead
//!   sugarlift rules                      List rewrite rules and whether they are enabled

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use sugarlift_core::Stmt;
use sugarlift_transforms::{
    AstTransform, DefaultTypeBuilder, LanguageVersion, ReplaceMethodCallsWithOperators,
    RewriteRule, TransformContext, TransformSettings,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sugarlift")]
#[command(about = "Recovers C# operator syntax from decompiled syntax trees", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a JSON-serialized statement tree
    Run {
        /// Path to the tree (a serialized statement)
        tree: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,

        /// Print the rewritten tree as JSON instead of C#
        #[arg(long)]
        json: bool,
    },
    /// List rewrite rules and whether they are enabled
    Rules {
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

#[derive(clap::Args)]
struct SettingsArgs {
    /// Settings file (JSON)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Target language version (e.g. 5, csharp6, latest)
    #[arg(short = 'l', long)]
    language_version: Option<LanguageVersion>,

    /// Force a rewrite rule on
    #[arg(long = "enable", value_name = "RULE")]
    enable: Vec<RewriteRule>,

    /// Force a rewrite rule off
    #[arg(long = "disable", value_name = "RULE")]
    disable: Vec<RewriteRule>,
}

impl SettingsArgs {
    /// Settings file first, then command-line overrides.
    fn load(&self) -> Result<TransformSettings> {
        let mut settings = match &self.settings {
            Some(path) => TransformSettings::from_json_file(path)
                .with_context(|| format!("Failed to load settings: {}", path.display()))?,
            None => TransformSettings::default(),
        };
        if let Some(version) = self.language_version {
            settings.language_version = version;
        }
        for &rule in &self.enable {
            settings = settings.enable_rule(rule);
        }
        for &rule in &self.disable {
            settings = settings.disable_rule(rule);
        }
        Ok(settings)
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "sugarlift=debug,sugarlift_transforms=debug",
        _ => "sugarlift=trace,sugarlift_transforms=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            tree,
            settings,
            json,
        } => {
            let settings = settings.load()?;
            run(&tree, &settings, json)
        }
        Commands::Rules { settings } => {
            let settings = settings.load()?;
            print_rules(&settings);
            Ok(())
        }
    }
}

fn load_tree(path: &Path) -> Result<Stmt> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read tree: {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse tree: {}", path.display()))
}

fn run(path: &Path, settings: &TransformSettings, json: bool) -> Result<()> {
    let mut root = load_tree(path)?;
    debug!(
        language_version = ?settings.language_version,
        "loaded {}",
        path.display()
    );

    let builder = DefaultTypeBuilder::new(settings.use_keywords);
    let ctx = TransformContext::new(settings, &builder);
    let pass = ReplaceMethodCallsWithOperators::new();
    pass.run(&mut root, &ctx);
    info!(pass = pass.name(), "finished");

    if json {
        let out = serde_json::to_string_pretty(&root).context("Failed to serialize tree")?;
        println!("{}", out);
    } else {
        print!("{}", root);
    }
    Ok(())
}

fn print_rules(settings: &TransformSettings) {
    println!("Rewrite rules (language version: {:?})", settings.language_version);
    println!("{:<24} {:<8} DESCRIPTION", "RULE", "STATUS");
    for (rule, enabled, description) in settings.list_rules() {
        let status = if enabled { "on" } else { "off" };
        println!("{:<24} {:<8} {}", rule.name(), status, description);
    }
}

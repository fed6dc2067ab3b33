//! Lore inspection entry point.
//!
//! Registers attributes against a config directory, reads item lore and
//! prints what every attribute extracts from it, in dispatch order.
mod attribute_arg;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use attribute_core::{EntityId, EventContext, ItemStack, NoBonus, PlaceholderType, StatusType};
use attribute_runtime::{AttributeRuntime, FileConfigStore, RuntimeConfig, default_config_dir};
use clap::Parser;

use attribute_arg::{AttributeArg, parse_attribute};

/// Extract attribute values from item lore
#[derive(Parser)]
#[command(name = "lore-inspect")]
#[command(about = "Extract attribute values from item lore", long_about = None)]
#[command(version)]
struct Cli {
    /// Attribute config directory
    /// (defaults to ATTRIBUTE_CONFIG_DIR, then the platform config directory)
    #[arg(short, long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Attribute to register (repeatable)
    /// If none is given, every config file in the directory is used
    #[arg(
        short,
        long = "attribute",
        value_name = "NAME[:KIND[:percent]]",
        value_parser = parse_attribute
    )]
    attributes: Vec<AttributeArg>,

    /// Placeholder rendered for each attribute (min, max, percent, range)
    #[arg(short, long, value_name = "KIND", default_value = "range")]
    placeholder: PlaceholderType,

    /// Also run the attributes through the execution pipeline
    #[arg(long)]
    dispatch: bool,

    /// Lore file, one lore line per line, blank lines between items
    /// Reads stdin when omitted
    #[arg(value_name = "LORE")]
    lore: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let cli = Cli::parse();

    let mut config = RuntimeConfig::from_env();
    if let Some(dir) = cli.config_dir {
        config.config_dir = Some(dir);
    }
    let config_dir = config
        .config_dir
        .get_or_insert_with(default_config_dir)
        .clone();

    let attributes = if cli.attributes.is_empty() {
        FileConfigStore::new(&config_dir)?
            .list_attributes()?
            .into_iter()
            .map(AttributeArg::from_config_name)
            .collect()
    } else {
        cli.attributes
    };
    if attributes.is_empty() {
        anyhow::bail!(
            "No attributes given and none configured in {}",
            config_dir.display()
        );
    }

    let items = read_items(cli.lore.as_deref())?;
    tracing::info!(
        items = items.len(),
        attributes = attributes.len(),
        config_dir = %config_dir.display(),
        "Inspecting lore"
    );

    let runtime = AttributeRuntime::start(config)?;
    let handle = runtime.handle();

    let mut pending = Vec::with_capacity(attributes.len());
    for attribute in attributes {
        pending.push(handle.register(attribute.into_attribute()).await?);
    }
    for registration in pending {
        let name = registration.definition().name().to_string();
        if let Err(err) = registration.settled().await {
            tracing::warn!(attribute = %name, error = %err, "Skipping attribute");
        }
    }

    println!(
        "{:>8}  {:<20} {:<8} {:<16} VALUE",
        "PRIORITY", "ATTRIBUTE", "KIND", "PLACEHOLDER"
    );
    for definition in handle.attributes() {
        let kind: &'static str = definition.kind().into();
        println!(
            "{:>8}  {:<20} {:<8} {:<16} {}",
            definition.priority(),
            definition.display_name(),
            kind,
            definition.placeholder(cli.placeholder, &items, &NoBonus),
            definition.parse_value(&items, &NoBonus)
        );
    }

    if cli.dispatch {
        let mut kinds: Vec<StatusType> = Vec::new();
        for definition in handle.attributes() {
            if !kinds.contains(&definition.kind()) {
                kinds.push(definition.kind());
            }
        }

        println!();
        for kind in kinds {
            let label: &'static str = kind.into();
            for record in handle.dispatch(context_for(kind), &items, &NoBonus) {
                match record.outcome {
                    Ok(outcome) => println!("{label:<8} {:<20} {outcome:?}", record.attribute),
                    Err(err) => println!("{label:<8} {:<20} error: {err}", record.attribute),
                }
            }
        }
    }

    runtime.shutdown().await?;

    Ok(())
}

/// Setup logging to stderr, filtered by `RUST_LOG` (default: warn)
fn setup_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

fn read_items(path: Option<&Path>) -> Result<Vec<ItemStack>> {
    let content = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read lore file: {}", path.display()))?,
        None => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read lore from stdin")?;
            content
        }
    };

    Ok(parse_items(&content))
}

/// Blank lines separate items.
fn parse_items(content: &str) -> Vec<ItemStack> {
    let mut items = Vec::new();
    let mut lore = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            if !lore.is_empty() {
                items.push(ItemStack::new(std::mem::take(&mut lore)));
            }
        } else {
            lore.push(line.trim_end().to_string());
        }
    }
    if !lore.is_empty() {
        items.push(ItemStack::new(lore));
    }

    items
}

/// Event roles for a dry-run dispatch; the inspected items belong to entity 0.
fn context_for(kind: StatusType) -> EventContext {
    let subject = EntityId(0);
    match kind {
        StatusType::Attack => EventContext::Attack {
            attacker: subject,
            victim: EntityId(1),
        },
        StatusType::Update => EventContext::Update { executor: subject },
        StatusType::Defense => EventContext::Defense { victim: subject },
        StatusType::Custom => EventContext::Custom { executor: subject },
        StatusType::Runtime => EventContext::Runtime { executor: subject },
    }
}

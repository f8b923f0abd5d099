//! Command implementations for scout CLI

use crate::cli::{Commands, OutputFormat};
use crate::config::{ScoutConfig, StoreKind, TargetConfig};
use crate::error::{Result, ScoutError};
use crate::fetch::SocrataFetcher;
use crate::notes::MoreInfoLink;
use crate::notify::{ConsoleNotifier, SlackNotifier};
use crate::output::{JsonFormatter, PrettyPrinter, TargetStatus};
use crate::report::{assemble_report, ReportConfig};
use crate::snapshot::Snapshot;
use crate::store::BaselineStore;
use crate::sync::{Notifier, SnapshotStore, SyncController, SyncOutcome};
use crate::workspace::ScoutWorkspace;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::path::Path;

/// Execute a command
pub fn execute_command(command: Commands, workspace_path: Option<&Path>, verbose: bool) -> Result<()> {
    match command {
        Commands::Init { force, store } => init_command(workspace_path, force, &store),
        Commands::AddTarget {
            name,
            domain,
            link,
            slack_url,
            locale,
        } => add_target_command(workspace_path, name, domain, link, slack_url, locale),
        Commands::Run {
            target,
            dry_run,
            seed,
            quiet,
        } => run_command(workspace_path, target.as_deref(), dry_run, seed, quiet, verbose),
        Commands::Diff {
            old,
            new,
            domain,
            link,
            label,
            max_visible,
            seed,
        } => diff_command(&old, &new, &domain, link, &label, max_visible, seed),
        Commands::Export { target, output } => export_command(workspace_path, &target, output.as_deref()),
        Commands::Show { target, format } => show_command(workspace_path, &target, &format),
        Commands::List { format } => list_command(workspace_path, &format),
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Initialize scout workspace
fn init_command(workspace_path: Option<&Path>, force: bool, store: &str) -> Result<()> {
    let store = StoreKind::parse(store).map_err(ScoutError::invalid_input)?;
    let current_dir = std::env::current_dir()?;
    let root = workspace_path.unwrap_or(&current_dir);

    let had_config = ScoutWorkspace::from_root(root.to_path_buf()).config_path().exists();
    let workspace = ScoutWorkspace::create_new(root.to_path_buf())?;

    if force || !had_config {
        let config = ScoutConfig {
            store,
            ..ScoutConfig::default()
        };
        workspace.save_config(&config)?;
    } else {
        println!("ℹ️  Keeping existing configuration (use --force to overwrite)");
    }

    println!("✅ Initialized scout workspace at: {}", workspace.root.display());
    println!("📁 Workspace directory: {}", workspace.scout_dir.display());

    Ok(())
}

/// Add a catalog to the configuration
fn add_target_command(
    workspace_path: Option<&Path>,
    name: String,
    domain: String,
    link: String,
    slack_url: Option<String>,
    locale: String,
) -> Result<()> {
    let workspace = ScoutWorkspace::find(workspace_path)?;
    let mut config = workspace.load_config()?;

    let target = TargetConfig {
        locale,
        slack_url,
        ..TargetConfig::new(name, domain, link)
    };
    config.add_target(target.clone())?;
    workspace.save_config(&config)?;

    println!("✅ Watching {} ({})", target.name, target.domain);
    if target.slack_url.is_none() {
        println!("💡 No webhook set: reports for this target print to stdout");
    }

    Ok(())
}

/// Run one sync cycle per selected target, targets in parallel
fn run_command(
    workspace_path: Option<&Path>,
    selector: Option<&str>,
    dry_run: bool,
    seed: Option<u64>,
    quiet: bool,
    verbose: bool,
) -> Result<()> {
    let workspace = ScoutWorkspace::find(workspace_path)?;
    let config = workspace.load_config()?;
    let targets = config.select_targets(selector)?;

    // Concurrent bars would garble each other
    let show_progress = !quiet && targets.len() == 1;

    let results: Vec<(String, Result<SyncOutcome>)> = targets
        .par_iter()
        .enumerate()
        .map(|(i, target)| {
            let target_seed = seed.map(|s| s.wrapping_add(i as u64));
            let result = run_target(&workspace, &config, target, dry_run, target_seed, show_progress);
            (target.name.clone(), result)
        })
        .collect();

    let mut failures = 0;
    for (name, result) in &results {
        match result {
            Ok(outcome) => PrettyPrinter::print_outcome(name, outcome, verbose),
            Err(e) => {
                failures += 1;
                eprintln!("❌ {}: {}", name, e);
            }
        }
    }

    if failures > 0 {
        return Err(ScoutError::Generic(anyhow::anyhow!(
            "{} of {} targets failed",
            failures,
            results.len()
        )));
    }

    Ok(())
}

/// Run one cycle for one target while holding its lock
pub fn run_target(
    workspace: &ScoutWorkspace,
    config: &ScoutConfig,
    target: &TargetConfig,
    dry_run: bool,
    seed: Option<u64>,
    show_progress: bool,
) -> Result<SyncOutcome> {
    let _lock = workspace.lock_target(target.key())?;

    let store = BaselineStore::open(config.store, workspace);
    let fetcher = SocrataFetcher::new(config.request.clone(), show_progress)?;
    let notifier: Box<dyn Notifier> = match &target.slack_url {
        Some(url) => Box::new(SlackNotifier::new(url.clone(), config.request.timeout_secs)?),
        None => Box::new(ConsoleNotifier::new(format!("{} updates", target.name))),
    };

    let controller = SyncController::new(
        target,
        &fetcher,
        &store,
        notifier.as_ref(),
        config.report_config(target),
    )
    .with_dry_run(dry_run);

    controller.run_cycle(&mut seeded_rng(seed))
}

/// Compare two exported snapshot files
fn diff_command(
    old_path: &Path,
    new_path: &Path,
    domain: &str,
    link: Option<String>,
    label: &str,
    max_visible: usize,
    seed: Option<u64>,
) -> Result<()> {
    let old = Snapshot::load_json_file(old_path)?;
    let new = Snapshot::load_json_file(new_path)?;

    println!("🔍 Comparing snapshots: {} → {}", old_path.display(), new_path.display());

    let link = link.unwrap_or_else(|| format!("https://{}", domain));
    let report_config = ReportConfig {
        max_visible,
        ..ReportConfig::new(format!("https://{}/resource", domain), MoreInfoLink::new(link, label))
    };

    let report = assemble_report(&old, &new, &report_config, &mut seeded_rng(seed));
    PrettyPrinter::print_report(&report);

    Ok(())
}

/// Resolve a single target from the configuration
fn resolve_target(config: &ScoutConfig, selector: &str) -> Result<TargetConfig> {
    config
        .select_targets(Some(selector))?
        .into_iter()
        .next()
        .ok_or_else(|| ScoutError::invalid_input(format!("no target named '{}'", selector)))
}

/// Export a target's baseline as JSON
fn export_command(workspace_path: Option<&Path>, selector: &str, output: Option<&Path>) -> Result<()> {
    let workspace = ScoutWorkspace::find(workspace_path)?;
    let config = workspace.load_config()?;
    let target = resolve_target(&config, selector)?;

    let snapshot = BaselineStore::open(config.store, &workspace).load(target.key())?;
    let json = snapshot.to_json()?;

    match output {
        Some(path) => {
            let path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                workspace.root.join(path)
            };
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, json)?;
            println!("💾 Exported {} datasets to: {}", snapshot.len(), path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Show baseline information for a target
fn show_command(workspace_path: Option<&Path>, selector: &str, format: &str) -> Result<()> {
    let output_format = OutputFormat::parse(format).map_err(ScoutError::invalid_input)?;
    let workspace = ScoutWorkspace::find(workspace_path)?;
    let config = workspace.load_config()?;
    let target = resolve_target(&config, selector)?;

    let store = BaselineStore::open(config.store, &workspace);
    let metadata = store.metadata(target.key())?;

    match output_format {
        OutputFormat::Pretty => {
            PrettyPrinter::print_baseline(&target.name, &metadata);
            if let BaselineStore::Archive(archive) = &store {
                println!();
                PrettyPrinter::print_archive_stats(&archive.archive_stats(target.key())?);
            }
        }
        OutputFormat::Json => println!("{}", JsonFormatter::format(&metadata)?),
    }

    Ok(())
}

/// List configured targets with their baseline status
fn list_command(workspace_path: Option<&Path>, format: &str) -> Result<()> {
    let output_format = OutputFormat::parse(format).map_err(ScoutError::invalid_input)?;
    let workspace = ScoutWorkspace::find(workspace_path)?;
    let config = workspace.load_config()?;
    let store = BaselineStore::open(config.store, &workspace);

    let statuses = config
        .targets
        .iter()
        .map(|target| -> Result<TargetStatus> {
            Ok(TargetStatus {
                name: target.name.clone(),
                domain: target.domain.clone(),
                webhook: target.slack_url.is_some(),
                baseline: store.try_metadata(target.key())?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    match output_format {
        OutputFormat::Pretty => {
            PrettyPrinter::print_target_list(&statuses);
            println!();
            PrettyPrinter::print_workspace_stats(&workspace.stats()?);
        }
        OutputFormat::Json => println!("{}", JsonFormatter::format(&statuses)?),
    }

    Ok(())
}

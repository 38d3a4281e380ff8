//! Roadmap CLI - track progress through a learning roadmap.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use roadmap_core::{FocusType, NodeId, NodeStatus, StudySession, Time};
use roadmap_progress::{ProgressEngine, Snapshot};
use roadmap_storage::{read_catalog_file, JsonStorage, Storage};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "roadmap")]
#[command(about = "Learning roadmap progress tracker", long_about = None)]
struct Cli {
    /// Data directory
    #[arg(long, default_value = ".roadmap", global = true)]
    data_dir: PathBuf,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a catalog and start fresh progress
    Init {
        /// Catalog JSON file
        catalog: PathBuf,
        /// Discard existing progress
        #[arg(long)]
        reset: bool,
    },
    /// List nodes and their status
    List {
        /// Filter by status (locked, available, inProgress, completed, needsReview)
        #[arg(long)]
        status: Option<String>,
    },
    /// Start an available node
    Start {
        /// Node ID
        id: String,
    },
    /// Complete (or re-review) a node
    Complete {
        /// Node ID
        id: String,
        /// Mastery level (1-5)
        #[arg(long)]
        mastery: u8,
        /// Insights gained
        #[arg(long)]
        insights: Option<String>,
    },
    /// Log a study session
    Session {
        /// Node ID
        id: String,
        /// Duration in minutes
        #[arg(long)]
        minutes: u32,
        /// Focus: deep-work, review, practice, project
        #[arg(long, default_value = "deep-work")]
        focus: FocusType,
        /// Effectiveness (1-5)
        #[arg(long, default_value = "3")]
        effectiveness: u8,
        /// Day of the session (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Move the next review of a completed node
    Review {
        /// Node ID
        id: String,
        /// Review day (YYYY-MM-DD)
        #[arg(long)]
        on: NaiveDate,
    },
    /// Replace a node's notes
    Notes {
        /// Node ID
        id: String,
        /// Note text
        text: String,
    },
    /// Show nodes due for review
    Due {
        /// Evaluate as of the end of this day (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Show progress analytics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut storage = JsonStorage::new(&cli.data_dir).await?;

    if let Commands::Init { catalog, reset } = &cli.command {
        return init(&mut storage, catalog, *reset).await;
    }

    let catalog = storage
        .load_catalog()
        .await?
        .ok_or_else(|| anyhow!("no catalog in {}; run `roadmap init <catalog>` first", cli.data_dir.display()))?;
    let engine = ProgressEngine::new(storage.load_config().await?);
    let snapshot = match storage.load_state().await? {
        Some(state) => engine.restore_snapshot(catalog, state),
        None => engine.initialize_snapshot(catalog),
    };
    debug!(revision = storage.revision().await?, "state loaded");

    let updated = match cli.command {
        Commands::Init { .. } => None,
        Commands::List { status } => {
            let filter = status
                .map(|s| s.parse::<NodeStatus>().map_err(|e| anyhow!(e)))
                .transpose()?;
            list(&snapshot, filter);
            None
        }
        Commands::Start { id } => Some(engine.start_node(&snapshot, &NodeId::new(id))?),
        Commands::Complete { id, mastery, insights } => {
            let next = engine.complete_node(&snapshot, &NodeId::new(id), mastery, insights)?;
            report_unlocks(&snapshot, &next);
            Some(next)
        }
        Commands::Session {
            id,
            minutes,
            focus,
            effectiveness,
            date,
        } => {
            let date = date.unwrap_or_else(|| engine.now().date_naive());
            let session = StudySession::new(id, date, minutes, focus, effectiveness);
            Some(engine.record_study_session(&snapshot, session))
        }
        Commands::Review { id, on } => {
            Some(engine.schedule_review(&snapshot, &NodeId::new(id), start_of_day(on))?)
        }
        Commands::Notes { id, text } => Some(engine.update_notes(&snapshot, &NodeId::new(id), text)?),
        Commands::Due { as_of } => {
            let as_of = as_of.map(end_of_day).unwrap_or_else(|| engine.now());
            let due = engine.get_due_for_review(&snapshot, as_of);
            println!("Due for review ({})", due.len());
            for node in due {
                let next = snapshot
                    .record(&node.id)
                    .and_then(|r| r.next_review_date)
                    .map(|t| t.date_naive().to_string())
                    .unwrap_or_default();
                println!("  {} | {} | due {}", node.id, node.label, next);
            }
            None
        }
        Commands::Stats => {
            stats(&snapshot);
            None
        }
    };

    if let Some(next) = updated {
        let revision = storage.save_state(&next.to_persisted()).await?;
        info!(revision, "progress saved");
    }

    Ok(())
}

async fn init(storage: &mut JsonStorage, catalog_path: &Path, reset: bool) -> Result<()> {
    let catalog = read_catalog_file(catalog_path)
        .await
        .with_context(|| format!("loading catalog {}", catalog_path.display()))?;
    storage.save_catalog(&catalog).await?;
    println!("Imported {} nodes", catalog.len());

    if reset || storage.load_state().await?.is_none() {
        let engine = ProgressEngine::new(storage.load_config().await?);
        let snapshot = engine.initialize_snapshot(catalog);
        storage.save_state(&snapshot.to_persisted()).await?;
        println!("Progress initialized");
    }
    Ok(())
}

fn list(snapshot: &Snapshot, filter: Option<NodeStatus>) {
    let nodes: Vec<_> = snapshot
        .catalog()
        .nodes()
        .iter()
        .filter_map(|node| Some((node, snapshot.record(&node.id)?)))
        .filter(|(node, _)| filter.is_none() || snapshot.status(&node.id) == filter)
        .collect();

    println!("Nodes ({})", nodes.len());
    for (node, record) in nodes {
        println!(
            "  {} | {:<11} | mastery {} | {} min | {}",
            node.id,
            record.status_at(snapshot.as_of()).as_str(),
            record.mastery_level,
            record.time_spent_minutes,
            node.label,
        );
    }
}

fn report_unlocks(before: &Snapshot, after: &Snapshot) {
    for record in after.records() {
        if record.status == NodeStatus::Available
            && before.record(&record.node_id).map(|r| r.status) == Some(NodeStatus::Locked)
        {
            println!("Unlocked: {}", record.node_id);
        }
    }
}

fn stats(snapshot: &Snapshot) {
    let a = snapshot.analytics();

    println!("Roadmap Progress");
    println!("  Nodes: {}/{} completed, {} in progress, {} due for review",
        a.completed_nodes, a.total_nodes, a.in_progress_nodes, a.review_due_nodes);
    println!("  Hours: {:.1}/{:.1}", a.completed_hours, a.total_hours);
    println!("  Average mastery: {:.2}", a.average_mastery);
    println!("  Study time: {} min total", a.total_study_minutes);
    println!("  Streak: {} days (longest {})", a.current_streak, a.longest_streak);
    println!(
        "  This week (from {}): {}/{} min ({:.0}%), {}/{} nodes",
        a.weekly_goal.week_start,
        a.weekly_goal.actual_minutes,
        a.weekly_goal.target_minutes,
        a.weekly_goal.minutes_percentage(),
        a.weekly_goal.actual_nodes,
        a.weekly_goal.target_nodes,
    );

    println!("  Phases:");
    for (phase, pct) in &a.phase_progress {
        println!("    {}: {:.0}%", phase, pct);
    }
    if !a.skills_acquired.is_empty() {
        println!("  Skills: {}", a.skills_acquired.join(", "));
    }
    if !a.weak_areas.is_empty() {
        println!("  Weak areas: {}", join_ids(&a.weak_areas));
    }
    if !a.strong_areas.is_empty() {
        println!("  Strong areas: {}", join_ids(&a.strong_areas));
    }
    if !a.checkpoints_reached.is_empty() {
        println!("  Checkpoints: {}", join_ids(&a.checkpoints_reached));
    }
}

fn join_ids<T: std::fmt::Display>(ids: &[T]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}

fn start_of_day(day: NaiveDate) -> Time {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::default()))
}

fn end_of_day(day: NaiveDate) -> Time {
    start_of_day(day + Duration::days(1)) - Duration::seconds(1)
}

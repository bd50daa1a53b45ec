use std::path::Path;

use nyoworks_core::ProjectClient;
use nyoworks_core::docs;
use nyoworks_core::infrastructure::StateStore;
use nyoworks_core::types::{NewDecision, NewTask, Phase, Priority, TaskFilter, TaskStatus};

use crate::output;
use crate::storage::Backend;

pub type Client = ProjectClient<Backend>;

// ─── Project ────────────────────────────────────────────────────────────────

pub fn init(client: &Client, name: &str, code: Option<&str>) -> anyhow::Result<()> {
    let state = client.init(name, code)?;
    output::success(format!(
        "Created project {} ({}) at {}",
        state.name,
        state.code,
        client.store().describe()
    ));
    Ok(())
}

pub fn status(client: &Client) -> anyhow::Result<()> {
    let summary = client.summary()?;

    output::header(&format!("Project: {}", summary.name));
    println!("Code:     {}", summary.code);
    println!("Phase:    {}", summary.phase);
    println!("Features: {}", join_or_none(&summary.enabled_features));
    println!();
    println!(
        "Tasks:    {} pending, {} in progress, {} completed",
        summary.pending, summary.in_progress, summary.completed
    );
    println!("Agents:   {}", join_or_none(&summary.agents));
    println!("Locks:    {} ({} live)", summary.locks, summary.live_locks);
    Ok(())
}

pub fn phase(client: &Client, set: Option<&str>) -> anyhow::Result<()> {
    if let Some(value) = set {
        let phase = client.set_phase(value)?;
        output::success(format!("Phase set to {}", phase));
        return Ok(());
    }

    let current = client.phase()?;
    output::header("Workflow Phases");
    for phase in Phase::ALL {
        let (marker, label) = if phase == current {
            (">>>", " [CURRENT]")
        } else if phase < current {
            ("   ", " [DONE]")
        } else {
            ("   ", "")
        };
        println!("{} {}. {}{}", marker, phase.to_index() + 1, phase, label);
    }
    Ok(())
}

// ─── Tasks ──────────────────────────────────────────────────────────────────

pub fn task_list(client: &Client, status: Option<&str>, feature: Option<String>) -> anyhow::Result<()> {
    let filter = TaskFilter {
        status: status.map(str::parse::<TaskStatus>).transpose()?,
        feature,
    };
    let tasks = client.list_tasks(&filter)?;
    if tasks.is_empty() {
        output::info("No tasks found.");
        return Ok(());
    }

    output::header("Tasks");
    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                output::truncate(&t.title, 40),
                t.status.to_string(),
                t.priority.to_string(),
                output::or_dash(t.assignee.as_deref()),
                output::or_dash(t.feature.as_deref()),
            ]
        })
        .collect();
    output::table(&["ID", "Title", "Status", "Priority", "Assignee", "Feature"], &rows);
    Ok(())
}

pub fn task_create(
    client: &Client,
    title: String,
    description: Option<String>,
    feature: Option<String>,
    priority: Option<&str>,
) -> anyhow::Result<()> {
    let priority = priority.map(str::parse::<Priority>).transpose()?;
    let task = client.create_task(NewTask {
        title,
        description,
        feature,
        priority,
    })?;
    output::success(format!("Created task {}: {}", task.id, task.title));
    Ok(())
}

pub fn task_show(client: &Client, id: &str) -> anyhow::Result<()> {
    let task = client.task(id)?;
    let lease = client.state()?.task_locks.get(id).cloned();

    output::header(&format!("{}: {}", task.id, task.title));
    println!("Status:      {}", task.status);
    println!("Priority:    {}", task.priority);
    println!("Assignee:    {}", output::or_dash(task.assignee.as_deref()));
    println!("Feature:     {}", output::or_dash(task.feature.as_deref()));
    println!("Created:     {}", output::timestamp(task.created_at));
    println!("Updated:     {}", output::timestamp(task.updated_at));
    if let Some(completed_at) = task.completed_at {
        println!("Completed:   {}", output::timestamp(completed_at));
    }
    match lease {
        Some(lease) if !lease.is_expired(client.now()) => println!(
            "Lock:        {} until {}",
            lease.holder,
            output::timestamp(lease.expires_at)
        ),
        Some(lease) => println!("Lock:        {} (expired)", lease.holder),
        None => println!("Lock:        -"),
    }
    if !task.description.is_empty() {
        println!();
        println!("{}", task.description);
    }
    Ok(())
}

pub fn task_set_status(client: &Client, id: &str, status: &str) -> anyhow::Result<()> {
    let status: TaskStatus = status.parse()?;
    let task = client.set_task_status(id, status)?;
    output::success(format!("Task {} is now {}", task.id, task.status));
    Ok(())
}

pub fn task_claim(client: &Client, id: &str, role: Option<&str>) -> anyhow::Result<()> {
    let lease = client.claim(id, role)?;
    output::success(format!(
        "Claimed task {} as {} until {}",
        lease.task_id,
        lease.holder,
        output::timestamp(lease.expires_at)
    ));
    Ok(())
}

pub fn task_release(client: &Client, id: &str, role: Option<&str>) -> anyhow::Result<()> {
    client.release(id, role)?;
    output::success(format!("Released task {}", id));
    Ok(())
}

pub fn task_unlock(client: &Client, id: &str) -> anyhow::Result<()> {
    let lease = client.force_unlock(id)?;
    output::success(format!("Force unlocked task {} (was held by {})", id, lease.holder));
    Ok(())
}

pub fn task_locks(client: &Client, live_only: bool) -> anyhow::Result<()> {
    let now = client.now();
    let leases: Vec<_> = client
        .list_active()?
        .into_iter()
        .filter(|lease| !live_only || !lease.is_expired(now))
        .collect();

    if leases.is_empty() {
        output::info("No active locks.");
        return Ok(());
    }

    output::header("Active Task Locks");
    let rows: Vec<Vec<String>> = leases
        .iter()
        .map(|l| {
            vec![
                l.task_id.clone(),
                l.holder.clone(),
                output::timestamp(l.acquired_at),
                output::timestamp(l.expires_at),
                if l.is_expired(now) { "expired" } else { "live" }.to_string(),
            ]
        })
        .collect();
    output::table(&["Task", "Agent", "Claimed At", "Expires At", "State"], &rows);
    Ok(())
}

pub fn task_prune(client: &Client) -> anyhow::Result<()> {
    let pruned = client.prune_expired()?;
    if pruned.is_empty() {
        output::info("No expired locks.");
    } else {
        for lease in &pruned {
            output::success(format!("Pruned expired lock on {} ({})", lease.task_id, lease.holder));
        }
    }
    Ok(())
}

// ─── Features ───────────────────────────────────────────────────────────────

pub fn feature_list(client: &Client, enabled_only: bool) -> anyhow::Result<()> {
    let features = client.features()?;
    if enabled_only {
        output::header("Enabled Features");
        for (feature, _) in features.iter().filter(|(_, enabled)| *enabled) {
            println!("  - {}", feature);
        }
    } else {
        output::header("All Features");
        let rows: Vec<Vec<String>> = features
            .iter()
            .map(|(feature, enabled)| {
                vec![
                    feature.to_string(),
                    if *enabled { "Enabled" } else { "Disabled" }.to_string(),
                ]
            })
            .collect();
        output::table(&["Feature", "Status"], &rows);
    }
    Ok(())
}

pub fn feature_enable(client: &Client, id: &str) -> anyhow::Result<()> {
    client.enable_feature(id)?;
    output::success(format!("Feature '{}' enabled", id));
    Ok(())
}

pub fn feature_disable(client: &Client, id: &str) -> anyhow::Result<()> {
    client.disable_feature(id)?;
    output::success(format!("Feature '{}' disabled", id));
    Ok(())
}

pub fn feature_info(project_dir: &Path, id: &str) -> anyhow::Result<()> {
    let manifest = docs::feature_manifest(project_dir, id)?;
    output::header(&format!("Feature: {}", id));
    println!("{}", manifest);
    Ok(())
}

// ─── Bible ──────────────────────────────────────────────────────────────────

pub fn bible_status(project_dir: &Path) -> anyhow::Result<()> {
    let sections = docs::bible_status(project_dir)?;
    output::header("Bible Documentation Status");
    for section in sections {
        println!("  {}: {}/{} files", section.name, section.filled, section.files);
    }
    Ok(())
}

pub fn bible_check(project_dir: &Path) -> anyhow::Result<()> {
    let missing = docs::bible_check(project_dir)?;
    output::header("Bible Consistency Check");
    if missing.is_empty() {
        output::success("All required sections present");
    } else {
        for section in missing {
            output::warn(format!("Missing section: {}", section));
        }
    }
    Ok(())
}

// ─── Decisions ──────────────────────────────────────────────────────────────

pub fn decision_list(client: &Client) -> anyhow::Result<()> {
    let decisions = client.decisions()?;
    if decisions.is_empty() {
        output::info("No decisions recorded.");
        return Ok(());
    }

    output::header("Project Decisions");
    for d in decisions {
        println!("\n[{}] {}", d.id, d.title);
        println!("  {}", d.description);
        println!("  Rationale: {}", d.rationale);
    }
    Ok(())
}

pub fn decision_add(client: &Client, input: NewDecision) -> anyhow::Result<()> {
    let decision = client.add_decision(input)?;
    output::success(format!("Added decision {}", decision.id));
    Ok(())
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

//! Output formatting for the `jira` CLI.
//!
//! Every printer writes either pretty JSON or colored, width-wrapped text.
//! Text printers take any `Write` so they can be tested against a buffer.

use std::env;
use std::io::{self, Write};

use colored::Colorize;
use serde::Serialize;

use crate::domain::{Issue, Project, SearchResult, Transition, User};

const DEFAULT_TERMINAL_WIDTH: usize = 80;
const MAX_CONTENT_WIDTH: usize = 100;

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Settings for text output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Width used for wrapping long text.
    pub max_width: usize,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Read from the environment and the terminal.
    ///
    /// `NO_COLOR` (any value) disables colors; `JIRA_COLOR=0|false` as well.
    pub fn from_env() -> Self {
        let use_colors = env::var_os("NO_COLOR").is_none()
            && env::var("JIRA_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            max_width: terminal_width().min(MAX_CONTENT_WIDTH),
            use_colors,
        }
    }

    /// Plain output of the given width.
    #[must_use]
    pub fn plain(max_width: usize) -> Self {
        Self {
            max_width,
            use_colors: false,
        }
    }

    fn key(&self, key: &str) -> String {
        if self.use_colors {
            key.cyan().bold().to_string()
        } else {
            key.to_string()
        }
    }

    fn label(&self, label: &str) -> String {
        if self.use_colors {
            label.dimmed().to_string()
        } else {
            label.to_string()
        }
    }

    fn status(&self, status: &str) -> String {
        if !self.use_colors {
            return status.to_string();
        }
        let lower = status.to_ascii_lowercase();
        if ["done", "closed", "resolved"].iter().any(|s| lower == *s) {
            status.green().to_string()
        } else if lower.contains("progress") || lower.contains("review") {
            status.yellow().to_string()
        } else if lower.contains("block") {
            status.red().to_string()
        } else {
            status.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.use_colors {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }
}

fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| usize::from(w.0))
        .unwrap_or(DEFAULT_TERMINAL_WIDTH)
}

/// Print any value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(handle, "{json}")
}

/// Print `value` as JSON, or with `text` for text mode.
pub fn emit<T, F>(value: &T, mode: OutputMode, text: F) -> io::Result<()>
where
    T: Serialize,
    F: FnOnce(&mut io::StdoutLock<'_>, &T, &OutputConfig) -> io::Result<()>,
{
    match mode {
        OutputMode::Json => print_json(value),
        OutputMode::Text => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            text(&mut handle, value, &OutputConfig::from_env())
        }
    }
}

/// Write the current user.
pub fn write_user<W: Write>(w: &mut W, user: &User, config: &OutputConfig) -> io::Result<()> {
    writeln!(w, "{}", config.heading(user.label()))?;
    if let Some(email) = &user.email_address {
        writeln!(w, "  {} {email}", config.label("Email:"))?;
    }
    if let Some(id) = &user.account_id {
        writeln!(w, "  {} {id}", config.label("Account:"))?;
    }
    if let Some(tz) = &user.time_zone {
        writeln!(w, "  {} {tz}", config.label("Time zone:"))?;
    }
    Ok(())
}

/// Write a page of search results, one issue per line.
pub fn write_search<W: Write>(w: &mut W, result: &SearchResult, config: &OutputConfig) -> io::Result<()> {
    if result.issues.is_empty() {
        return writeln!(w, "No issues found.");
    }

    let shown_to = result.start_at + result.issues.len() as u64;
    writeln!(
        w,
        "Showing {}-{shown_to} of {} issue(s):",
        result.start_at + 1,
        result.total
    )?;
    writeln!(w)?;

    let key_width = result.issues.iter().map(|i| i.key.len()).max().unwrap_or(0);
    for issue in &result.issues {
        let status = issue.status.as_deref().unwrap_or("-");
        let prefix_width = key_width + status.chars().count() + 6;
        let summary = issue.summary.as_deref().unwrap_or("");
        let lines = wrap_text(summary, config.max_width.saturating_sub(prefix_width).max(20));

        let mut lines = lines.into_iter();
        writeln!(
            w,
            "{}{}  [{}]  {}",
            config.key(&issue.key),
            " ".repeat(key_width - issue.key.len()),
            config.status(status),
            lines.next().unwrap_or_default()
        )?;
        for line in lines {
            writeln!(w, "{}{line}", " ".repeat(prefix_width))?;
        }
    }
    Ok(())
}

/// Write one issue in detail.
pub fn write_issue<W: Write>(w: &mut W, issue: &Issue, config: &OutputConfig) -> io::Result<()> {
    writeln!(
        w,
        "{} {}",
        config.key(&issue.key),
        issue.summary.as_deref().unwrap_or("")
    )?;

    let fields = [
        ("Status:", issue.status.clone()),
        ("Type:", issue.issue_type.clone()),
        ("Priority:", issue.priority.clone()),
        ("Assignee:", issue.assignee.as_ref().map(|u| u.label().to_string())),
        ("Reporter:", issue.reporter.as_ref().map(|u| u.label().to_string())),
        ("Resolution:", issue.resolution.clone()),
        ("Parent:", issue.parent.as_ref().map(|p| p.key.clone())),
        ("Updated:", issue.updated.clone()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            let value = if label == "Status:" {
                config.status(&value)
            } else {
                value
            };
            writeln!(w, "  {} {value}", config.label(&format!("{label:<12}")))?;
        }
    }
    if !issue.labels.is_empty() {
        writeln!(w, "  {} {}", config.label(&format!("{:<12}", "Labels:")), issue.labels.join(", "))?;
    }
    if !issue.components.is_empty() {
        writeln!(
            w,
            "  {} {}",
            config.label(&format!("{:<12}", "Components:")),
            issue.components.join(", ")
        )?;
    }
    writeln!(w, "  {} {}", config.label(&format!("{:<12}", "URL:")), issue.url)?;

    if let Some(description) = issue.description.as_deref().filter(|d| !d.trim().is_empty()) {
        writeln!(w)?;
        writeln!(w, "{}:", config.heading("Description"))?;
        for line in wrap_text(description, config.max_width.saturating_sub(2)) {
            writeln!(w, "  {line}")?;
        }
    }

    if !issue.links.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}:", config.heading("Links"))?;
        for link in &issue.links {
            writeln!(
                w,
                "  {} {}{}",
                link.relationship,
                config.key(&link.issue.key),
                link.issue
                    .summary
                    .as_deref()
                    .map(|s| format!(" {s}"))
                    .unwrap_or_default()
            )?;
        }
    }

    if !issue.subtasks.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}:", config.heading("Subtasks"))?;
        for subtask in &issue.subtasks {
            writeln!(
                w,
                "  {} {}",
                config.key(&subtask.key),
                subtask.summary.as_deref().unwrap_or("")
            )?;
        }
    }
    Ok(())
}

/// Write available transitions.
pub fn write_transitions<W: Write>(
    w: &mut W,
    transitions: &[Transition],
    config: &OutputConfig,
) -> io::Result<()> {
    if transitions.is_empty() {
        return writeln!(w, "No transitions available.");
    }
    let id_width = transitions.iter().map(|t| t.id.len()).max().unwrap_or(0);
    for transition in transitions {
        let target = transition
            .to_status
            .as_deref()
            .map(|s| format!(" -> {}", config.status(s)))
            .unwrap_or_default();
        let required = if transition.required_fields.is_empty() {
            String::new()
        } else {
            config.label(&format!(" (requires {})", transition.required_fields.join(", ")))
        };
        writeln!(
            w,
            "{:>id_width$}  {}{target}{required}",
            transition.id, transition.name
        )?;
    }
    Ok(())
}

/// Write visible projects.
pub fn write_projects<W: Write>(w: &mut W, projects: &[Project], config: &OutputConfig) -> io::Result<()> {
    if projects.is_empty() {
        return writeln!(w, "No projects found.");
    }
    let key_width = projects.iter().map(|p| p.key.len()).max().unwrap_or(0);
    for project in projects {
        writeln!(
            w,
            "{}{}  {}",
            config.key(&project.key),
            " ".repeat(key_width - project.key.len()),
            project.name
        )?;
    }
    Ok(())
}

fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    text.lines()
        .flat_map(|line| {
            if line.trim().is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, max_width)
                    .into_iter()
                    .map(std::borrow::Cow::into_owned)
                    .collect()
            }
        })
        .collect()
}

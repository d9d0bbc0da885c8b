//! Interactive investigation shell
//!
//! Searches run in the background so several can be in flight at once;
//! notifications are printed as they arrive.

use crate::into_sentinel_error;
use sentinel_applications::{
    ApplicationError, InvestigationEvent, InvestigationManager, InvestigationSnapshot,
    SearchDispatch, SearchOutcome,
};
use sentinel_core::{log_operation_start, log_operation_success, SentinelResult};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::debug;

/// A query named either by its 1-based position or by its text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryRef {
    Index(usize),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Start(String),
    Search(QueryRef),
    SearchAll,
    Suggest,
    Summary,
    Show,
    Findings,
    Help,
    Quit,
    Unknown(String),
}

impl ShellCommand {
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let (head, rest) = match input.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (input, ""),
        };

        let command = match (head.to_lowercase().as_str(), rest) {
            ("start" | "new", subject) if !subject.is_empty() => {
                ShellCommand::Start(subject.to_string())
            }
            ("search" | "s", target) if !target.is_empty() => {
                ShellCommand::Search(match target.parse::<usize>() {
                    Ok(index) => QueryRef::Index(index),
                    Err(_) => QueryRef::Text(target.to_string()),
                })
            }
            ("all", "") => ShellCommand::SearchAll,
            ("suggest", "") => ShellCommand::Suggest,
            ("summary" | "summarize", "") => ShellCommand::Summary,
            ("show" | "status", "") => ShellCommand::Show,
            ("findings", "") => ShellCommand::Findings,
            ("help" | "h", "") => ShellCommand::Help,
            ("quit" | "exit" | "q", "") => ShellCommand::Quit,
            _ => ShellCommand::Unknown(input.to_string()),
        };
        Some(command)
    }
}

pub struct InvestigationShell {
    investigations: InvestigationManager,
}

impl InvestigationShell {
    pub fn new(investigations: InvestigationManager) -> Self {
        Self { investigations }
    }

    pub async fn run(self) -> SentinelResult<()> {
        log_operation_start!("investigation_shell");

        println!("Recon Sentinel shell");
        println!("Type 'help' for commands, 'quit' to exit\n");

        let printer = self.spawn_notification_printer();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("sentinel> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let Some(command) = ShellCommand::parse(&line) else {
                continue;
            };
            if command == ShellCommand::Quit {
                break;
            }

            if let Err(e) = self.execute(command).await {
                println!("{}", e);
            }
        }

        printer.abort();
        log_operation_success!("investigation_shell");
        Ok(())
    }

    fn spawn_notification_printer(&self) -> JoinHandle<()> {
        let mut events = self.investigations.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(InvestigationEvent::Notification(notification)) => {
                        let marker = if notification.is_error() { "!" } else { "*" };
                        println!(
                            "\n{} {}: {}",
                            marker, notification.title, notification.description
                        );
                    }
                    Ok(InvestigationEvent::StateChanged(_)) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Notification printer lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    async fn execute(&self, command: ShellCommand) -> SentinelResult<()> {
        match command {
            ShellCommand::Start(subject) => {
                let outcome = self
                    .investigations
                    .start_investigation(&subject)
                    .await
                    .map_err(|e| into_sentinel_error(e, "start_investigation"))?;
                for (i, query) in outcome.queries.iter().enumerate() {
                    println!("  {}. {}", i + 1, query);
                }
            }
            ShellCommand::Search(target) => {
                let snapshot = self.investigations.snapshot().await;
                let Some(query) = resolve_query(&snapshot, &target) else {
                    println!("No such query. Use 'show' to list queries.");
                    return Ok(());
                };
                self.search_in_background(query).await?;
            }
            ShellCommand::SearchAll => {
                let snapshot = self.investigations.snapshot().await;
                let unsearched = snapshot
                    .queries
                    .iter()
                    .filter(|q| !snapshot.is_completed(q) && !snapshot.pending_queries.contains(*q))
                    .cloned()
                    .collect::<Vec<_>>();
                if unsearched.is_empty() {
                    println!("Nothing left to search.");
                }
                for query in unsearched {
                    self.search_in_background(query).await?;
                }
            }
            ShellCommand::Suggest => match self.investigations.request_suggestions().await {
                Ok(outcome) => {
                    for query in &outcome.added {
                        println!("  + {}", query);
                    }
                }
                Err(e) => print_refusal(e, "request_suggestions")?,
            },
            ShellCommand::Summary => match self.investigations.request_summary().await {
                Ok(summary) => println!("{}", summary),
                Err(e) => print_refusal(e, "request_summary")?,
            },
            ShellCommand::Show => print_status(&self.investigations.snapshot().await),
            ShellCommand::Findings => {
                let snapshot = self.investigations.snapshot().await;
                if snapshot.findings.is_empty() {
                    println!("No findings yet.");
                }
                for finding in &snapshot.findings {
                    println!("[{}] {}", finding.finding_type, finding.title);
                    println!("    {}", finding.content);
                }
            }
            ShellCommand::Help => print_help(),
            ShellCommand::Unknown(input) => {
                println!("Unknown command: {}. Type 'help' for commands.", input);
            }
            ShellCommand::Quit => {}
        }
        Ok(())
    }

    async fn search_in_background(&self, query: String) -> SentinelResult<()> {
        let dispatch = self
            .investigations
            .spawn_search(&query)
            .await
            .map_err(|e| into_sentinel_error(e, "run_search"))?;

        match dispatch {
            SearchDispatch::Started(handle) => {
                println!("Searching: {}", query);
                tokio::spawn(async move {
                    if let Ok(SearchOutcome::Completed { finding }) = handle.await {
                        println!("\n[{}] {}", finding.finding_type, finding.title);
                    }
                });
            }
            SearchDispatch::Skipped(SearchOutcome::AlreadyCompleted) => {
                println!("Already searched: {}", query);
            }
            SearchDispatch::Skipped(SearchOutcome::AlreadyPending) => {
                println!("Already searching: {}", query);
            }
            SearchDispatch::Skipped(_) => {}
        }
        Ok(())
    }
}

fn resolve_query(snapshot: &InvestigationSnapshot, target: &QueryRef) -> Option<String> {
    match target {
        QueryRef::Index(index) => index
            .checked_sub(1)
            .and_then(|i| snapshot.queries.get(i))
            .cloned(),
        QueryRef::Text(text) => snapshot.queries.iter().find(|q| *q == text).cloned(),
    }
}

/// Guard refusals are expected in the shell; anything else is an error
fn print_refusal(err: ApplicationError, operation: &str) -> SentinelResult<()> {
    match err {
        ApplicationError::InsufficientFindings {
            required,
            available,
            ..
        } => {
            println!(
                "Need at least {} findings, have {}. Run more searches first.",
                required, available
            );
            Ok(())
        }
        ApplicationError::Superseded { .. } => {
            println!("The investigation changed while waiting; result dropped.");
            Ok(())
        }
        other => Err(into_sentinel_error(other, operation)),
    }
}

fn print_status(snapshot: &InvestigationSnapshot) {
    let Some(subject) = &snapshot.subject else {
        println!("No active investigation. Use 'start <subject>'.");
        return;
    };

    println!("Subject: {} ({})", subject, snapshot.loading_phase.as_str());
    for (i, query) in snapshot.queries.iter().enumerate() {
        let mark = if snapshot.is_completed(query) {
            "x"
        } else if snapshot.pending_queries.contains(query) {
            "~"
        } else {
            " "
        };
        println!("  [{}] {}. {}", mark, i + 1, query);
    }
    println!("Findings: {}", snapshot.findings.len());
    if let Some(summary) = &snapshot.summary {
        println!("\nSummary:\n{}", summary);
    }
}

fn print_help() {
    println!("Commands:");
    println!("  start <subject>     Start a new investigation");
    println!("  search <n|query>    Run one query in the background");
    println!("  all                 Run every query not yet searched");
    println!("  suggest             Ask for new queries (needs 2 findings)");
    println!("  summary             Summarize the profile (needs 3 findings)");
    println!("  show                Show queries and progress");
    println!("  findings            List findings, newest first");
    println!("  quit                Leave the shell");
}

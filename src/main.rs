use std::io::{self, Write as _};

use anyhow::Result;
use crossterm::style::Stylize;

use wardshell::config::Config;
use wardshell::context::History;
use wardshell::exec::ExecutionEngine;
use wardshell::monitor::SystemMonitor;
use wardshell::security::RiskClassifier;
use wardshell::suggest::Suggester;
use wardshell::utils;

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = utils::init_logging("wardshell");

    let config = Config::load(&utils::home_file(".wardshell.toml"))?;
    let classifier = RiskClassifier::new(config.safety.clone());
    let engine = ExecutionEngine::new(&config.execution);
    let suggester = Suggester::new(config.suggest.clone());
    let mut monitor = SystemMonitor::new(config.monitor.clone());
    let mut history = History::load(
        utils::home_file(&config.shell.history_file),
        config.shell.max_history,
    )?;

    println!("{}", format!("{} - a safety-first shell", config.shell.name).bold());
    println!("Type 'help' for commands, 'exit' to leave.");

    let prompt = format!("{} ", config.shell.prompt);
    loop {
        print!("{}", prompt.clone().green());
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            // EOF
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "exit" | "quit" => break,
            "help" => print_help(),
            "status" => print_status(&config, &engine, &history),
            "metrics" => print_metrics(&mut monitor),
            "history" => {
                for cmd in history.recent(20) {
                    println!("{cmd}");
                }
            }
            _ => {
                if let Some(query) = input.strip_prefix("r ") {
                    suggest_and_run(query, &suggester, &classifier, &engine, &mut history)
                        .await?;
                } else {
                    run_command(input, &classifier, &engine, &mut history).await?;
                }
            }
        }
    }

    history.save()?;
    println!("Goodbye!");
    Ok(())
}

/// Classify, confirm if needed, execute, and print the outcome. Every
/// command goes through here, including accepted suggestions.
async fn run_command(
    command: &str,
    classifier: &RiskClassifier,
    engine: &ExecutionEngine,
    history: &mut History,
) -> Result<()> {
    history.push(command);

    let verdict = classifier.evaluate(command);
    if !verdict.allowed {
        for warning in &verdict.warnings {
            println!("{}", warning.clone().red());
        }
        println!("{}", format!("blocked: {}", verdict.reason).red().bold());
        return Ok(());
    }
    if !verdict.warnings.is_empty() {
        for warning in &verdict.warnings {
            println!("{}", warning.clone().yellow());
        }
        if !confirm("proceed? [y/N] ")? {
            println!("cancelled");
            return Ok(());
        }
    }

    let result = engine.execute(command).await;
    if !result.output.is_empty() {
        print!("{}", result.output);
        if !result.output.ends_with('\n') {
            println!();
        }
    }
    if !result.error.is_empty() {
        print!("{}", result.error.clone().red());
        if !result.error.ends_with('\n') {
            println!();
        }
    }
    if !result.success {
        println!("{}", format!("(exit code {})", result.exit_code).dark_grey());
    }
    Ok(())
}

async fn suggest_and_run(
    query: &str,
    suggester: &Suggester,
    classifier: &RiskClassifier,
    engine: &ExecutionEngine,
    history: &mut History,
) -> Result<()> {
    let Some(suggestion) = suggester.suggest(query).await else {
        println!("no suggestion for that, sorry");
        return Ok(());
    };
    println!(
        "{} {}",
        "suggested:".cyan(),
        suggestion.command.clone().bold()
    );
    println!(
        "  {} (confidence {:.0}%)",
        suggestion.explanation,
        suggestion.confidence * 100.0
    );
    if confirm("run it? [y/N] ")? {
        run_command(&suggestion.command, classifier, engine, history).await?;
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn print_help() {
    println!("built-in commands:");
    println!("  help       show this help");
    println!("  status     shell status (safety, backend, session counters)");
    println!("  metrics    system resource usage");
    println!("  history    recent commands");
    println!("  r <text>   suggest a command for a plain-English request");
    println!("  exit, quit leave the shell");
    println!("anything else is classified for risk and then executed.");
}

fn print_status(config: &Config, engine: &ExecutionEngine, history: &History) {
    let safety = if config.safety.enabled { "on" } else { "off" };
    println!("safety checks: {safety}");
    println!("default backend: {:?}", config.execution.backend);
    match engine.posix_available() {
        Some(true) => println!("posix backend: available"),
        Some(false) => println!("posix backend: unavailable"),
        None => println!("posix backend: not probed yet"),
    }
    println!("commands this session: {}", engine.log_len());
    println!("history entries: {}", history.len());
}

fn print_metrics(monitor: &mut SystemMonitor) {
    let snapshot = monitor.snapshot();
    println!("cpu: {:.1}%", snapshot.cpu_percent);
    println!(
        "memory: {:.1}% ({} / {} MB)",
        snapshot.memory_percent,
        snapshot.memory_used / 1_048_576,
        snapshot.memory_total / 1_048_576
    );
    println!("disk: {:.1}%", snapshot.disk_percent);
    println!("processes: {}", snapshot.process_count);
    for alert in &snapshot.alerts {
        println!("{}", alert.clone().yellow());
    }
}

use std::io::{self, Write};

use crate::bench::{BackgroundTask, BenchmarkRunner, RunMessage};
use crate::config::HarnessConfig;
use crate::models::{BenchmarkRun, RunOutcome};
use crate::{ParbenchError, Result};

/// Prompt the user for simple configuration overrides.
pub fn ask_config(mut config: HarnessConfig) -> Result<HarnessConfig> {
    print!("Emails to generate (default {}): ", config.email_count);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    if let Ok(v) = input.trim().parse::<usize>() {
        config.email_count = v;
    }

    input.clear();
    print!("Filter input tokens (default {}): ", config.filter_token_count);
    io::stdout().flush()?;
    io::stdin().read_line(&mut input)?;
    if let Ok(v) = input.trim().parse::<usize>() {
        config.filter_token_count = v;
    }

    input.clear();
    let threads = config
        .worker_threads
        .map(|n| n.to_string())
        .unwrap_or_else(|| "auto".to_string());
    print!("Worker threads (default {}): ", threads);
    io::stdout().flush()?;
    io::stdin().read_line(&mut input)?;
    if let Ok(v) = input.trim().parse::<usize>() {
        config.worker_threads = Some(v);
    }

    config.validate()?;
    Ok(config)
}

/// Run the benchmark in the background and stream progress to a bar.
/// Ctrl-C cancels the run.
pub async fn run_benchmark(config: HarnessConfig) -> Result<BenchmarkRun> {
    let runner = BenchmarkRunner::from_config(&config)?;
    let (task, mut rx) = BackgroundTask::spawn_with_channel(runner);

    let pb = indicatif::ProgressBar::new(100);
    pb.set_style(
        indicatif::ProgressStyle::with_template("{spinner} [{bar:40}] {pos}% {msg}")
            .map_err(|e| ParbenchError::Config(format!("Invalid progress template: {}", e)))?,
    );
    pb.set_message("circle areas");

    let mut outcome = None;
    loop {
        tokio::select! {
            msg = rx.recv() => match msg {
                Some(RunMessage::Progress(percent)) => {
                    pb.set_position(percent as u64);
                    pb.set_message(match percent {
                        0..=25 => "email generation",
                        26..=50 => "magnitude filter",
                        _ => "finishing",
                    });
                }
                Some(RunMessage::Complete(result)) => {
                    outcome = Some(result);
                    break;
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                pb.set_message("cancelling");
                task.cancel();
            }
        }
    }
    pb.finish_and_clear();

    // The task result is authoritative if the channel closed early
    let outcome = match outcome {
        Some(outcome) => {
            task.join().await?;
            outcome
        }
        None => task.join().await?,
    };

    match outcome {
        RunOutcome::Succeeded(run) => Ok(run),
        RunOutcome::Failed(msg) => Err(ParbenchError::RunAborted(msg)),
        RunOutcome::Cancelled => Err(ParbenchError::Cancelled),
    }
}

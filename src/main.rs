// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use the_railyard::codec::{JsonRecordSerializer, RecordSerializer};
use the_railyard::config::{load_and_validate_config, RuntimeBuilder};
use the_railyard::observability::init_logging;
use the_railyard::scope::{CloseableScope, ShutdownGuard};

const RECORD_FLAG: &str = "--record";

/// Summary of one run, printed as a base64 JSON record with `--record`
#[derive(Serialize)]
struct RunRecord<'a> {
    config: &'a str,
    terminal: &'static str,
    rails: usize,
    history: Vec<i64>,
    elapsed_ms: u128,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging("warn").map_err(|e| anyhow::anyhow!("failed to initialise logging: {}", e))?;

    let args: Vec<String> = env::args().collect();
    let emit_record = args.iter().any(|arg| arg == RECORD_FLAG);
    let config_files: Vec<String> = args
        .iter()
        .skip(1)
        .filter(|arg| arg.as_str() != RECORD_FLAG)
        .cloned()
        .collect();

    if config_files.is_empty() {
        eprintln!("Usage: {} [--record] <config.yaml> [config2.yaml ...]", args[0]);
        eprintln!("Example: {} configs/odd-squares.yaml configs/failing-stage.yaml", args[0]);
        std::process::exit(1);
    }

    println!("🚂 Railyard Pipeline Runner");
    println!("═══════════════════════════");
    println!("Config files: {:?}", config_files);

    let succeeded = Arc::new(AtomicUsize::new(0));
    let guard = ShutdownGuard::new();
    {
        let succeeded = succeeded.clone();
        let total = config_files.len();
        guard.register("summary", move || {
            println!(
                "\n🏁 {} of {} pipelines completed",
                succeeded.load(Ordering::SeqCst),
                total
            );
        });
    }

    let scope = CloseableScope::new();
    for (i, config_file) in config_files.iter().enumerate() {
        if i > 0 {
            println!("\n{}", "─".repeat(80));
        }

        let task = scope.spawn(run_single_config(config_file.clone(), emit_record))?;
        tokio::select! {
            outcome = task => match outcome? {
                Some(Ok(())) => {
                    succeeded.fetch_add(1, Ordering::SeqCst);
                }
                Some(Err(e)) => eprintln!("❌ Failed to execute {}: {:#}", config_file, e),
                None => eprintln!("⏹️  {} was cancelled", config_file),
            },
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\n⏹️  Interrupted, cancelling remaining pipelines");
                scope.close_and_join().await;
                break;
            }
        }
    }

    scope.close_and_join().await;
    guard.shutdown();
    Ok(())
}

async fn run_single_config(config_file: String, emit_record: bool) -> anyhow::Result<()> {
    let start_time = Instant::now();

    let config = load_and_validate_config(&config_file)?;
    let runtime = RuntimeBuilder::from_config(&config)?;

    println!("📋 Configuration: {}", config_file);
    println!("🛤️  Rails: {}", runtime.rails());
    println!("🔧 Stages: {:?}", runtime.chain().names());
    println!("🎯 Terminal: {}", runtime.terminal().as_str());

    let execution_start = Instant::now();
    let outcome = runtime.run().await?;
    let execution_time = execution_start.elapsed();

    println!("\n📊 Result:");
    for line in outcome.to_string().lines() {
        println!("   {}", line);
    }
    println!("⏱️  Execution Time: {:?}", execution_time);

    let history = runtime.history().snapshot().await;
    println!(
        "🕘 Last {} outputs (capacity {}): {:?}",
        history.len(),
        runtime.history().capacity().await,
        history
    );

    if emit_record {
        let record = RunRecord {
            config: &config_file,
            terminal: runtime.terminal().as_str(),
            rails: runtime.rails(),
            history,
            elapsed_ms: execution_time.as_millis(),
        };
        println!("🧾 Record: {}", JsonRecordSerializer.serialize_to_text(&record)?);
    }

    println!("\n⏱️  Total Time (including config load): {:?}", start_time.elapsed());
    Ok(())
}

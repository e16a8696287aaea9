//! memstress - console runner for the stress engine
//!
//! Drives the engine step loop against the process heap, optionally
//! sleeping between steps, and renders the terminal corruption report
//! with addresses and an evidence hex window. Can emit a JSON run report
//! for archiving.

use clap::Parser;
use memstress_core::{
    AllocStats, CorruptionReport, CorruptionSummary, CountingAllocator, StepOutcome, StressConfig,
    StressEngine, SystemAllocator,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "memstress",
    version,
    about = "Heap/RAM integrity stress tester"
)]
struct Args {
    /// Number of slots in the allocation table
    #[arg(long, default_value_t = 1024)]
    slots: usize,

    /// Exclusive upper bound on allocation sizes in bytes
    #[arg(long, default_value_t = 1024)]
    max_alloc: usize,

    /// Seed for the deterministic selection stream
    #[arg(long, default_value_t = 1)]
    seed: u32,

    /// Stop after this many completed iterations (default: run until corruption)
    #[arg(long)]
    iterations: Option<u64>,

    /// Sleep between steps, in microseconds (reduces CPU/bus contention)
    #[arg(long, default_value_t = 0)]
    delay_us: u64,

    /// Skip the immediate write-verify pass after each fill
    #[arg(long)]
    no_write_verify: bool,

    /// Record per-step events and print them at the end (bounded runs only)
    #[arg(long)]
    trace: bool,

    /// Print a progress line every N iterations (0 disables)
    #[arg(long, default_value_t = 1_000_000)]
    progress_every: u64,

    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

/// Archived outcome of one stress run.
#[derive(Debug, Serialize)]
struct RunReport {
    run_id: String,
    config: StressConfig,
    iterations: u64,
    alloc_stats: AllocStats,
    corruption: Option<CorruptionSummary>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.trace && args.iterations.is_none() {
        eprintln!("memstress: --trace requires --iterations (the event log is unbounded)");
        return ExitCode::from(2);
    }

    let config = StressConfig {
        slot_count: args.slots,
        max_alloc_size: args.max_alloc,
        seed: args.seed,
        verify_on_write: !args.no_write_verify,
        record_events: args.trace,
    };

    let allocator = CountingAllocator::new(SystemAllocator);
    let stats = allocator.stats_handle();

    let mut engine = match StressEngine::new(config.clone(), Box::new(allocator)) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("memstress: {}", err);
            return ExitCode::from(2);
        }
    };

    println!(
        "memstress: testing ({} slots, sizes < {} bytes, seed {:#x})",
        config.slot_count, config.max_alloc_size, config.seed
    );

    let delay = Duration::from_micros(args.delay_us);
    let mut last_reported = 0u64;

    loop {
        if let Some(limit) = args.iterations {
            if engine.iterations() >= limit {
                break;
            }
        }

        if engine.step() == StepOutcome::Stop {
            break;
        }

        let done = engine.iterations();
        if args.progress_every > 0
            && done > 0
            && done % args.progress_every == 0
            && done != last_reported
        {
            last_reported = done;
            println!(
                "memstress: {} iterations, {} live buffers ({} bytes), peak {} bytes",
                done,
                engine.slot_table().occupied_count(),
                engine.slot_table().live_bytes(),
                stats.borrow().peak_live_bytes
            );
        }

        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    if args.trace {
        for event in engine.event_log().events() {
            println!(
                "  [{:>8}] {:<18} slot={} size={}",
                event.iteration(),
                event.event_type(),
                event.slot(),
                event.size()
            );
        }
    }

    let exit = match engine.corruption() {
        Some(report) => {
            print_corruption(report);
            ExitCode::from(1)
        }
        None => {
            println!(
                "memstress: test passed, {} iterations, peak {} live bytes",
                engine.iterations(),
                stats.borrow().peak_live_bytes
            );
            ExitCode::SUCCESS
        }
    };

    if let Some(path) = &args.report {
        let report = RunReport {
            run_id: uuid::Uuid::new_v4().to_string(),
            config,
            iterations: engine.iterations(),
            alloc_stats: stats.borrow().clone(),
            corruption: engine.corruption().map(|r| r.summary()),
        };
        let json = match serde_json::to_string_pretty(&report) {
            Ok(json) => json,
            Err(err) => {
                eprintln!("memstress: failed to encode report: {}", err);
                return ExitCode::from(2);
            }
        };
        if let Err(err) = std::fs::write(path, json) {
            eprintln!("memstress: failed to write {}: {}", path.display(), err);
            return ExitCode::from(2);
        }
        println!("memstress: report written to {}", path.display());
    }

    exit
}

/// Render the terminal corruption report.
fn print_corruption(report: &CorruptionReport) {
    println!("memstress: test FAILED ({} error)", report.phase().as_str());
    println!("  slot       = {}", report.slot());
    println!("  size       = {} bytes", report.size());
    println!(
        "  offset     = {} (addr = {:#x})",
        report.offset(),
        report.fault_address()
    );
    println!("  iteration  = {}", report.iteration());
    println!("  read value = {:#04x}", report.actual());
    println!("  real value = {:#04x}", report.expected());

    let radius = 8;
    let start = report.offset().saturating_sub(radius);
    let window = report.evidence_window(radius);
    print!("  evidence   =");
    for (i, byte) in window.iter().enumerate() {
        if start + i == report.offset() {
            print!(" [{:02x}]", byte);
        } else {
            print!(" {:02x}", byte);
        }
    }
    println!();
}

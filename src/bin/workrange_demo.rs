//! workrange-demo: compare the shared-cursor scheduler with a single thread
//! and with static partitioning on sleep-based workloads.
//!
//! ```bash
//! cargo run --release --features cli --bin workrange-demo -- uniform --items 80 --ms 50
//! cargo run --release --features cli --bin workrange-demo -- nonuniform --threads 8 --report
//! cargo run --release --features cli --bin workrange-demo -- producer --generate-ms 1,10,100
//! ```

use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use workrange::harness::{
    run_generated, run_partitioned, run_sequential, timed, SleepTable, Timing, UniformSleep,
    DEFAULT_SEED,
};
use workrange::{
    LinePrinter, RunObserver, RunReport, Scheduler, SchedulerConfig, WorkContract, ENV_THREADS,
};

// ── CLI ─────────────────────────────────────────────────────────────

/// Dynamic work-distribution demo over sleep workloads.
#[derive(Parser, Debug)]
#[command(name = "workrange-demo", version, about)]
struct Cli {
    #[command(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Common {
    /// Worker threads (0 = hardware parallelism).
    #[arg(long, global = true, env = ENV_THREADS, default_value_t = 0)]
    threads: usize,

    /// Print per-worker claim counts after each scheduler run.
    #[arg(long, global = true)]
    report: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Every item sleeps the same time.
    Uniform {
        /// Number of work items.
        #[arg(long, default_value_t = 80)]
        items: usize,
        /// Milliseconds slept per item.
        #[arg(long, default_value_t = 50)]
        ms: u64,
    },
    /// Items sleep a seeded pseudo-random time in [0, 100) ms.
    Nonuniform {
        /// Number of work items.
        #[arg(long, default_value_t = 80)]
        items: usize,
        /// Seed for the sleep table.
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    },
    /// A producer on the main thread generates items while workers drain.
    Producer {
        /// Number of work items.
        #[arg(long, default_value_t = 40)]
        items: usize,
        /// Seed for the sleep table.
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
        /// Milliseconds to generate each item; one run per value.
        #[arg(long, value_delimiter = ',', default_values_t = [1u64, 10, 100])]
        generate_ms: Vec<u64>,
    },
}

// ── reporting ───────────────────────────────────────────────────────

fn print_timing(label: &str, t: &Timing) {
    println!("---  {label}  ---");
    println!("Wall Time = {:.6}", t.wall.as_secs_f64());
    println!("CPU Time  = {:.6}", t.cpu.as_secs_f64());
    println!();
}

fn print_report(report: &RunReport) {
    println!(
        "claims: total={} min={} max={} imbalance={:.2}",
        report.total_claims,
        report.min_claims(),
        report.max_claims(),
        report.imbalance()
    );
}

fn scheduler_config(common: &Common) -> SchedulerConfig {
    let cfg = SchedulerConfig::from_env().threads(common.threads);
    if common.report {
        let printer: Arc<dyn RunObserver> = Arc::new(LinePrinter::new(std::io::stdout()));
        cfg.observer(printer)
    } else {
        cfg
    }
}

fn run_scheduler<W: WorkContract + 'static>(
    work: Arc<W>,
    limit: usize,
    common: &Common,
) -> anyhow::Result<(RunReport, Timing)> {
    let mut sched = Scheduler::new(work, limit, scheduler_config(common))?;
    let (report, timing) = timed(|| sched.run());
    Ok((report?, timing))
}

// ── subcommands ─────────────────────────────────────────────────────

fn uniform(common: &Common, items: usize, ms: u64) -> anyhow::Result<()> {
    let work = Arc::new(UniformSleep::new(Duration::from_millis(ms)));

    let (report, t) = run_scheduler(Arc::clone(&work), items, common)?;
    print_timing("Time using scheduler", &t);
    if common.report {
        print_report(&report);
    }

    let ((), single) = timed(|| run_sequential(work.as_ref(), items));
    print_timing("Time using single CPU core", &single);

    info!(speedup = t.speedup_over(&single), "uniform complete");
    Ok(())
}

fn nonuniform(common: &Common, items: usize, seed: u64) -> anyhow::Result<()> {
    let table = Arc::new(SleepTable::seeded(items, seed));
    println!(
        "{items} non-uniform sleeps as work (sum {:.3}s, longest {:.3}s)",
        table.total().as_secs_f64(),
        table.longest().as_secs_f64()
    );

    let (report, t) = run_scheduler(Arc::clone(&table), items, common)?;
    print_timing("Time using scheduler", &t);
    if common.report {
        print_report(&report);
    }

    let ((), single) = timed(|| run_sequential(table.as_ref(), items));
    print_timing("Time using single CPU core", &single);

    let threads = report.worker_count();
    let (counts, part) = timed(|| run_partitioned(table.as_ref(), items, threads));
    let counts = counts?;
    print_timing(&format!("Time using {threads} threads"), &part);
    if common.report {
        for (i, n) in counts.iter().enumerate() {
            println!("partition {i} processed: {n}");
        }
    }

    info!(
        scheduler_speedup = t.speedup_over(&single),
        partitioned_speedup = part.speedup_over(&single),
        "nonuniform complete"
    );
    Ok(())
}

fn producer(common: &Common, items: usize, seed: u64, generate_ms: &[u64]) -> anyhow::Result<()> {
    let table = Arc::new(SleepTable::seeded(items, seed));

    let (report, t) = run_scheduler(Arc::clone(&table), items, common)?;
    print_timing("standard scheduler (zero overhead)", &t);
    if common.report {
        print_report(&report);
    }

    for &ms in generate_ms {
        let cfg = scheduler_config(common);
        let (report, t) = timed(|| {
            run_generated(Arc::clone(&table), items, Duration::from_millis(ms), cfg)
        });
        let report = report?;
        print_timing(&format!("{ms} millisecond per workload to generate"), &t);
        if common.report {
            print_report(&report);
        }
    }
    Ok(())
}

// ── main ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!(threads = cli.common.threads, "workrange-demo starting");

    match cli.command {
        Command::Uniform { items, ms } => uniform(&cli.common, items, ms),
        Command::Nonuniform { items, seed } => nonuniform(&cli.common, items, seed),
        Command::Producer {
            items,
            seed,
            generate_ms,
        } => producer(&cli.common, items, seed, &generate_ms),
    }
}

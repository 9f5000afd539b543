//! Benchmark runner for the matmul and matvec kernels.

use std::process;

use clap::{Parser, Subcommand};
use log::{error, warn};

use matbench::harness::DEFAULT_SEED;
use matbench::simd::active_lane;
use matbench::{
    BenchConfig, BenchError, BenchResult, KernelRegistry, MatmulShape, MatvecShape, MatvecVariant,
    Result, bench_matmul, bench_matvec,
};

/// Measure kernel throughput and check results against the naive kernels
#[derive(Parser)]
#[command(name = "matbench", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Benchmark one matmul variant (e.g. naive-ijk, tiled-kij-16)
    Matmul {
        variant: String,
        #[arg(short = 'n', long, default_value_t = 256)]
        rows: usize,
        #[arg(short = 'm', long, default_value_t = 256)]
        cols: usize,
        #[arg(short = 'k', long, default_value_t = 256)]
        inner: usize,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Benchmark one matvec kernel, selected by number and parameter:
    /// 0 peak FMA, 1 naive, 2 blocked, 3 simd
    Matvec {
        function: u32,
        #[arg(default_value_t = 1)]
        param: usize,
        #[arg(short = 'n', long, default_value_t = 8192)]
        rows: usize,
        #[arg(short = 'k', long, default_value_t = 8192)]
        inner: usize,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Benchmark every registered matmul variant on square sizes
    Sweep {
        #[arg(long, value_delimiter = ',', default_values_t = [256, 512, 1024])]
        sizes: Vec<usize>,
        #[command(flatten)]
        run: RunArgs,
    },
    /// List registered kernel variants
    List,
}

#[derive(clap::Args)]
struct RunArgs {
    #[arg(long, default_value_t = 1)]
    warmup: usize,
    #[arg(long, default_value_t = 10)]
    repeats: usize,
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Relative error tolerance for the correctness check
    #[arg(long, default_value_t = 1e-2)]
    tolerance: f64,
    /// Print a CSV line instead of text
    #[arg(long)]
    csv: bool,
}

impl RunArgs {
    fn config(&self) -> BenchConfig {
        BenchConfig::default()
            .with_warmup(self.warmup)
            .with_repeats(self.repeats)
            .with_seed(self.seed)
            .with_tolerance(self.tolerance)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let registry = KernelRegistry::with_defaults();

    if let Err(err) = run(cli.command, &registry) {
        error!("{err}");
        process::exit(1);
    }
}

fn run(command: Commands, registry: &KernelRegistry) -> Result<()> {
    match command {
        Commands::Matmul {
            variant,
            rows,
            cols,
            inner,
            run,
        } => {
            let kernel = registry.matmul(variant.parse()?)?;
            let shape = MatmulShape::new(rows, cols, inner);
            let result = bench_matmul(kernel, shape, &run.config())?;
            if run.csv {
                println!("{}", BenchResult::csv_header());
                println!("{}", result.to_csv_row());
            } else {
                println!("N = {rows}, M = {cols}, K = {inner}");
                print_result(&result, None);
            }
        }
        Commands::Matvec {
            function,
            param,
            rows,
            inner,
            run,
        } => {
            let variant = MatvecVariant::from_function(function, param)?;
            let kernel = registry.matvec(variant)?;
            let result = bench_matvec(kernel, MatvecShape::new(rows, inner), &run.config())?;
            if run.csv {
                println!("{}", matvec_csv_row(function, param, &result));
            } else {
                println!("lane: {}, rows = {rows}, K = {inner}", active_lane());
                print_result(&result, None);
            }
        }
        Commands::Sweep { sizes, run } => sweep(registry, &sizes, &run.config())?,
        Commands::List => {
            println!("matmul:");
            for v in registry.matmul_variants() {
                println!("  {v}");
            }
            println!("matvec (function param):");
            for v in registry.matvec_variants() {
                println!("  {v:<12} {} {}", v.function(), v.param());
            }
        }
    }
    Ok(())
}

/// `function,param,ms,flop,flops,correct`, echoing the selector as given.
fn matvec_csv_row(function: u32, param: usize, result: &BenchResult) -> String {
    format!(
        "{},{},{:.4},{},{:.4e},{}",
        function,
        param,
        result.elapsed_time_ms,
        result.total_flops,
        result.throughput_flops_per_sec,
        u8::from(result.correct)
    )
}

fn sweep(registry: &KernelRegistry, sizes: &[usize], config: &BenchConfig) -> Result<()> {
    println!("=== Matrix Multiplication Benchmark ===\n");

    let mut all_results = Vec::new();
    for &size in sizes {
        println!("Matrix: {size}×{size}");
        println!("{}", "-".repeat(64));

        let mut results = Vec::new();
        for variant in registry.matmul_variants() {
            let kernel = registry.matmul(variant)?;
            match bench_matmul(kernel, MatmulShape::square(size), config) {
                Ok(result) => results.push(result),
                Err(err @ BenchError::UnsupportedTileSize { .. }) => warn!("{variant}: {err}"),
                Err(err) => return Err(err),
            }
        }

        // naive-ijk sorts first and accepts every size
        let Some(baseline) = results.first().map(|r| r.mean_call_ms) else {
            continue;
        };
        for (i, result) in results.iter().enumerate() {
            print!("{}. ", i + 1);
            print_result(result, Some(baseline));
        }
        println!();

        all_results.push((size, results));
    }

    print_summary_table(&all_results);
    Ok(())
}

fn print_result(result: &BenchResult, baseline_ms: Option<f64>) {
    let check = match (result.verified, result.correct) {
        (false, _) => "unchecked",
        (true, true) => "ok",
        (true, false) => "MISMATCH",
    };
    print!(
        "{:16} {:10.3} ms/call  {:8.2} GFLOPS  {:9}",
        result.label,
        result.mean_call_ms,
        result.gflops(),
        check
    );
    match baseline_ms {
        Some(base) => println!("  ({:.1}×)", base / result.mean_call_ms),
        None => println!(),
    }
}

fn print_summary_table(all_results: &[(usize, Vec<BenchResult>)]) {
    let Some((_, first)) = all_results.first() else {
        return;
    };

    println!("\n{}", "=".repeat(90));
    println!("SUMMARY (GFLOPS)");
    println!("{}", "=".repeat(90));

    print!("\n{:<18}", "Method");
    for (size, _) in all_results {
        print!(" {:>14}", format!("{size}×{size}"));
    }
    println!(" {:>12}", "Speedup");
    println!("{}", "-".repeat(90));

    for method in first {
        print!("{:<18}", method.label);
        let mut speedups = Vec::new();
        for (_, results) in all_results {
            match results.iter().find(|r| r.label == method.label) {
                Some(result) => {
                    print!(" {:>11.2} GF", result.gflops());
                    speedups.push(results[0].mean_call_ms / result.mean_call_ms);
                }
                None => print!(" {:>14}", "-"),
            }
        }
        let avg_speedup = speedups.iter().sum::<f64>() / speedups.len().max(1) as f64;
        println!(" {avg_speedup:>11.1}×");
    }

    println!("{}", "=".repeat(90));
    println!("\nSpeedup relative to naive-ijk. Higher is better.\n");
}

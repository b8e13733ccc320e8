use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use num_complex::Complex64;
use purify_backend_cpu::CpuBackend;
use purify_core::{
    continuous::{ContinuousOperator, SymmetricOperator},
    io::OperatorConfig,
    operator::{MeasurementOperator, Sample, adjoint_mismatch},
    spectral_norm::{PowerIterationOptions, PowerIterationResult, estimate_spectral_norm},
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Parser, Debug)]
#[command(
    name = "purify-ops",
    about = "Build an interferometric measurement operator and bound its norm"
)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: PathBuf,
    /// Use the conjugate-symmetric variant for real images
    #[arg(long)]
    symmetric: bool,
    /// Also report the relative adjoint mismatch on random vectors
    #[arg(long)]
    check_adjoint: bool,
    /// Write the tabulated gridding kernel to this file
    #[arg(long)]
    dump_kernel: Option<PathBuf>,
    /// Print the resolved configuration (with defaults filled in) and exit
    #[arg(long)]
    print_config: bool,
    /// Suppress progress logs (stderr)
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let default_filter = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if !cli.quiet {
        eprintln!("[cli] loading config {}", cli.config.display());
    }
    let config = OperatorConfig::from_path(&cli.config)?;
    if cli.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let setup = config.build()?;
    let params = *setup.gridding.params();
    log::info!(
        "image {}x{} oversampled to {}x{}, {} visibilities, kernel support {}",
        params.nx1,
        params.ny1,
        params.nx2(),
        params.ny2(),
        params.nmeas,
        setup.kernel.support()
    );

    if let Some(path) = &cli.dump_kernel {
        let mut writer = BufWriter::new(File::create(path)?);
        setup.kernel.dump(&mut writer)?;
        writer.flush()?;
        if !cli.quiet {
            eprintln!(
                "[cli] wrote {} kernel entries to {}",
                setup.kernel.values().len(),
                path.display()
            );
        }
    }

    let op = ContinuousOperator::new(CpuBackend::new(), Arc::new(setup.gridding));
    let report = if cli.symmetric {
        run(SymmetricOperator::new(op), &setup.power, cli.check_adjoint)?
    } else {
        run(op, &setup.power, cli.check_adjoint)?
    };

    println!("image_size    = {} x {}", params.nx1, params.ny1);
    println!("grid_size     = {} x {}", params.nx2(), params.ny2());
    println!("visibilities  = {}", report.output_len);
    println!("norm_bound    = {:.6e}", report.norm.bound);
    println!("singular_max  = {:.6e}", report.norm.singular_value());
    println!("iterations    = {}", report.norm.iterations);
    println!("converged     = {}", report.norm.converged);
    if let Some(mismatch) = report.adjoint_mismatch {
        println!("adjoint_error = {mismatch:.3e}");
    }
    Ok(())
}

struct Report {
    output_len: usize,
    norm: PowerIterationResult,
    adjoint_mismatch: Option<f64>,
}

fn run<A>(
    mut op: A,
    power: &PowerIterationOptions,
    check_adjoint: bool,
) -> purify_core::Result<Report>
where
    A: MeasurementOperator<Input = Complex64>,
{
    let norm = estimate_spectral_norm(&mut op, power)?;
    let adjoint_mismatch = if check_adjoint {
        // real images, so the check is also meaningful for the symmetric variant
        let mut rng = ChaCha8Rng::seed_from_u64(power.seed.wrapping_add(1));
        let x: Vec<Complex64> = (0..op.input_len())
            .map(|_| Complex64::new(f64::standard_normal(&mut rng), 0.0))
            .collect();
        let y: Vec<Complex64> = (0..op.output_len())
            .map(|_| Complex64::standard_normal(&mut rng))
            .collect();
        let mismatch = adjoint_mismatch(&mut op, &x, &y)?;
        log::info!("adjoint relative mismatch {mismatch:.3e}");
        Some(mismatch)
    } else {
        None
    };
    Ok(Report {
        output_len: op.output_len(),
        norm,
        adjoint_mismatch,
    })
}

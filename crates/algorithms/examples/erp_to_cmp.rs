//! ERP-to-cubemap demo: full viewport-adaptive conversion pipeline
//!
//! Generates a synthetic 64x128 equirectangular (ERP) panorama, converts it
//! to a cubemap (CMP) layout with the frequency-selective mesh resampler,
//! converts it back, and reports the roundtrip PSNR together with the
//! per-run warning counters.
//!
//! Run:
//!   cargo run --release -p spheresample-algorithms --example erp_to_cmp

use indicatif::{ProgressBar, ProgressStyle};
use spheresample_algorithms::fsmr::{Fsmr, FsmrParams};
use spheresample_algorithms::var::{cmp_size, ResampleOutput, VarParams, ViewportAdaptiveResampler};
use spheresample_core::{Cubemap, Equirectangular, Image, Projection};

const ERP_ROWS: usize = 64;
const ERP_COLS: usize = 128;
const BLOCK_SIZE: usize = 8;

fn main() {
    let input = build_panorama();
    println!("Input ERP: {}x{}", ERP_COLS, ERP_ROWS);

    let (cmp_rows, cmp_cols) = cmp_size((ERP_ROWS, ERP_COLS), BLOCK_SIZE);
    println!(
        "Cubemap layout: {}x{} (face size {})",
        cmp_cols,
        cmp_rows,
        cmp_rows / 2
    );

    let erp = Equirectangular::new(ERP_ROWS, ERP_COLS);
    let cmp = Cubemap::new(cmp_rows, cmp_cols);

    let fsmr = Fsmr::new(FsmrParams {
        max_iterations: 300,
        ..Default::default()
    })
    .expect("invalid FSMR parameters");
    let params = VarParams {
        block_size: BLOCK_SIZE,
        ..Default::default()
    };

    println!("\nERP -> CMP");
    let forward = run(&input, &erp, (cmp_rows, cmp_cols), &cmp, &fsmr, params);

    println!("\nCMP -> ERP");
    let back = run(
        &forward.image,
        &cmp,
        (ERP_ROWS, ERP_COLS),
        &erp,
        &fsmr,
        params,
    );

    println!("\nRoundtrip PSNR: {:.2} dB", psnr(&input, &back.image));
}

fn run(
    image: &Image<f64>,
    src_projection: &dyn Projection,
    tar_size: (usize, usize),
    tar_projection: &dyn Projection,
    fsmr: &Fsmr,
    params: VarParams,
) -> ResampleOutput {
    let resampler =
        ViewportAdaptiveResampler::new(image.shape(), src_projection, tar_size, tar_projection, params)
            .expect("cannot build resampler");

    let bar = progress_bar();
    let out = resampler
        .resample_with_progress(image, fsmr, &|done, total| {
            bar.set_length(total as u64);
            bar.set_position(done as u64);
        })
        .expect("resample failed");
    bar.finish_and_clear();

    println!(
        "  {} blocks, {} with insufficient support, {} unmapped pixels",
        out.report.blocks, out.report.insufficient_samples, out.report.unmapped_pixels
    );
    out
}

/// Smooth panorama with a horizon gradient and two "suns".
fn build_panorama() -> Image<f64> {
    let mut image = Image::new(ERP_ROWS, ERP_COLS);
    for r in 0..ERP_ROWS {
        for c in 0..ERP_COLS {
            let theta = (r as f64 + 0.5) / ERP_ROWS as f64 * std::f64::consts::PI;
            let phi = (c as f64 + 0.5) / ERP_COLS as f64 * 2.0 * std::f64::consts::PI;
            let sky = 0.5 + 0.4 * theta.cos();
            let sun_a = 0.3 * (-((theta - 0.9).powi(2) + (phi - 1.2).powi(2)) * 8.0).exp();
            let sun_b = 0.2 * (-((theta - 1.8).powi(2) + (phi - 4.5).powi(2)) * 6.0).exp();
            image.set(r, c, sky + sun_a + sun_b).unwrap();
        }
    }
    image
}

fn psnr(reference: &Image<f64>, candidate: &Image<f64>) -> f64 {
    let mut sum_sq = 0.0;
    let mut count = 0usize;
    for r in 0..reference.rows() {
        for c in 0..reference.cols() {
            let a = reference.get(r, c).unwrap();
            let b = candidate.get(r, c).unwrap();
            if b.is_finite() {
                sum_sq += (a - b) * (a - b);
                count += 1;
            }
        }
    }
    10.0 * (1.0 / (sum_sq / count as f64)).log10()
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("  [{bar:40.cyan/blue}] {pos}/{len} blocks")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

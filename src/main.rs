//! Minimal demo binary: draws one field with a fixed scenario and prints
//! summary statistics. Argument parsing is intentionally bare — a real CLI
//! front end is out of scope for this crate.

use dyadic_gauss::{draw_gauss_2d, DrawRequest, Flavour, Variant};

fn main() {
    env_logger::init();

    let seed: u32 = std::env::args().nth(1).and_then(|s| s.parse().ok()).unwrap_or(12345);

    let request = DrawRequest {
        nx: 129,
        ny: 129,
        xsize: 128.0,
        ysize: 128.0,
        variant: Variant::Gaussian,
        seed,
        r1: 16.0,
        r2: 16.0,
        angle_deg: 0.0,
        power: 1.0,
        flavour: Flavour::Detailed,
        debug: false,
    };

    match draw_gauss_2d(&request) {
        Ok(Some(outcome)) => {
            let n = outcome.values.len() as f64;
            let mean = outcome.values.iter().map(|&v| v as f64).sum::<f64>() / n;
            let var = outcome.values.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / n;
            println!(
                "drew {}x{} field: mean={:.4} stdev={:.4}",
                outcome.nx,
                outcome.ny,
                mean,
                var.sqrt()
            );
            if let Some(warning) = outcome.warning {
                eprintln!("{warning}");
            }
        }
        Ok(None) => println!("unrecognised variant, no grid drawn"),
        Err(err) => eprintln!("draw failed: {err}"),
    }
}

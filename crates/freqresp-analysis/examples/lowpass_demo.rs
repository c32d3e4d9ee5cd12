//! Frequency response demo: identify a noisy lowpass filter from white noise.
//!
//! Run with: cargo run -p freqresp-analysis --example lowpass_demo
//! Set RUST_LOG=freqresp_analysis=debug to see the pipeline trace.

use freqresp_analysis::{
    Detrend, FrequencyResponseEstimator, SampleSequence, ScalingMode, SegmentationConfig, Window,
};
use std::f64::consts::PI;
use tracing_subscriber::EnvFilter;

/// RBJ lowpass biquad.
struct Lowpass {
    b: [f64; 3],
    a: [f64; 2],
    x: [f64; 2],
    y: [f64; 2],
}

impl Lowpass {
    fn new(cutoff: f64, q: f64, sample_rate: f64) -> Self {
        let w0 = 2.0 * PI * cutoff / sample_rate;
        let alpha = w0.sin() / (2.0 * q);
        let cos = w0.cos();
        let a0 = 1.0 + alpha;
        Self {
            b: [
                (1.0 - cos) / 2.0 / a0,
                (1.0 - cos) / a0,
                (1.0 - cos) / 2.0 / a0,
            ],
            a: [-2.0 * cos / a0, (1.0 - alpha) / a0],
            x: [0.0; 2],
            y: [0.0; 2],
        }
    }

    fn process(&mut self, input: f64) -> f64 {
        let out = self.b[0] * input + self.b[1] * self.x[0] + self.b[2] * self.x[1]
            - self.a[0] * self.y[0]
            - self.a[1] * self.y[1];
        self.x = [input, self.x[0]];
        self.y = [out, self.y[0]];
        out
    }
}

/// Uniform white noise in [-1, 1).
fn noise(len: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 11) as f64 / (1u64 << 52) as f64 - 1.0
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let sample_rate = 1000.0;
    let cutoff = 100.0;
    let len = 10_000;

    // --- Stimulus and measured response ---
    println!("=== Identifying a {cutoff} Hz lowpass from white noise ===\n");

    let stimulus = noise(len, 0x9E37_79B9_7F4A_7C15);
    let mut filter = Lowpass::new(cutoff, std::f64::consts::FRAC_1_SQRT_2, sample_rate);
    let measurement_noise = noise(len, 0xD1B5_4A32_D192_ED03);
    let measured: Vec<f64> = stimulus
        .iter()
        .zip(&measurement_noise)
        .map(|(&x, &n)| filter.process(x) + 0.05 * n)
        .collect();

    let reference = SampleSequence::new(&stimulus, sample_rate)?;
    let response = SampleSequence::new(&measured, sample_rate)?;
    println!(
        "Input: {} samples ({:.1} s at {} Hz)",
        reference.len(),
        reference.duration(),
        sample_rate
    );

    // --- Estimate ---
    let config = SegmentationConfig::new(1000)
        .with_window(Window::Hann)
        .with_detrend(Detrend::Constant)
        .with_scaling(ScalingMode::Density);
    let estimator = FrequencyResponseEstimator::new(config);
    let fr = estimator.estimate_sequences(&reference, &response)?;

    println!(
        "Segments: {}, bins: {}, window: {}, overlap: {}\n",
        fr.segment_count,
        fr.len(),
        config.window,
        config.resolved_overlap()
    );

    let magnitude_db = fr.magnitude_db();
    let phase_deg = fr.phase_deg();

    println!(
        "{:>8} {:>10} {:>10} {:>10}",
        "Freq", "Gain (dB)", "Phase", "Coherence"
    );
    println!("{:->8} {:->10} {:->10} {:->10}", "", "", "", "");
    for k in (0..fr.len()).step_by(25) {
        if !fr.valid[k] {
            println!("{:>8.1} {:>10} {:>10} {:>10}", fr.frequencies[k], "-", "-", "-");
            continue;
        }
        println!(
            "{:>8.1} {:>10.2} {:>10.1} {:>10.3}",
            fr.frequencies[k], magnitude_db[k], phase_deg[k], fr.coherence[k]
        );
    }

    // --- Summary ---
    println!("\n=== Summary ===\n");
    println!("Gain at 10 Hz:   {:.3}", fr.magnitude_at(10.0));
    println!("Phase at cutoff: {:.1} deg", fr.phase_at(cutoff).to_degrees());
    match fr.cutoff_frequency(0.0) {
        Some(f) => println!("-3 dB point:     {f:.1} Hz"),
        None => println!("-3 dB point:     not reached"),
    }
    let band = fr.coherent_band(0.9);
    if let (Some(&lo), Some(&hi)) = (band.first(), band.last()) {
        println!(
            "Coherence > 0.9: {:.0} Hz to {:.0} Hz",
            fr.frequencies[lo], fr.frequencies[hi]
        );
    }

    Ok(())
}

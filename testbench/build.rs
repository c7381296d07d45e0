use std::f64::consts::PI;
use std::{env, fs, path::PathBuf};

use polyphase::fixed::unity;

#[allow(dead_code)]
#[path = "src/window.rs"]
mod window;

/// Windowed-sinc lowpass, `cutoff` in cycles per sample.
fn lowpass(cutoff: f64, len: usize) -> Vec<f64> {
    let centre = (len - 1) as f64 / 2.0;
    window::window(&window::BLACKMAN, len)
        .into_iter()
        .enumerate()
        .map(|(i, w)| {
            let x = 2.0 * cutoff * (i as f64 - centre);
            let sinc = if x == 0.0 { 1.0 } else { (PI * x).sin() / (PI * x) };
            2.0 * cutoff * sinc * w
        })
        .collect()
}

fn emit_table(s: &mut String, name: &str, coeffs: &[i16]) {
    s.push_str(&format!("pub const {name}: [i16; {}] = [\n", coeffs.len()));
    for row in coeffs.chunks(8) {
        s.push_str("    ");
        for c in row {
            s.push_str(&format!("{c},"));
        }
        s.push('\n');
    }
    s.push_str("];\n");
}

fn main() {
    const UPSAMPLE: usize = 2;
    const UP_TAPS_PER_PHASE: usize = 32;
    const UP_TAPS: usize = UPSAMPLE * UP_TAPS_PER_PHASE;

    const DOWNSAMPLE: usize = 3;
    const DOWN_TAPS_PER_PHASE: usize = 1;
    const DOWN_TAPS: usize = DOWNSAMPLE * DOWN_TAPS_PER_PHASE;

    // interpolated rate for a 9 MHz input; keep the passband under the
    // 3 MHz Nyquist of the 6 MHz output
    const FS_MID_HZ: f64 = 18_000_000.0;
    const FC_HZ: f64 = 2_500_000.0;

    // 1) design float prototype at the interpolated rate
    let mut h = lowpass(FC_HZ / FS_MID_HZ, UP_TAPS);

    // 2) scale so every phase lands on unity once the stage shifts out its gain
    let sum: f64 = h.iter().sum();
    let target = (UPSAMPLE as i32 * unity(UPSAMPLE)) as f64;
    for v in &mut h { *v *= target / sum; }

    // 3) quantize to Q3.12, already laid out as tap * PHASES + phase
    let mut up = [0i16; UP_TAPS];
    for i in 0..UP_TAPS {
        up[i] = h[i].round().clamp(-32768.0, 32767.0) as i16;
    }

    // 4) the decimator only picks samples, the interpolator already band-limited them
    let mut down = [0i16; DOWN_TAPS];
    down[0] = unity(DOWNSAMPLE) as i16;

    // 5) emit Rust source
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let dest = out_dir.join("coeffs.rs");

    let mut s = String::new();
    s.push_str(&format!(
        "pub const UPSAMPLE: usize = {UPSAMPLE};\n\
         pub const UP_TAPS_PER_PHASE: usize = {UP_TAPS_PER_PHASE};\n\
         pub const DOWNSAMPLE: usize = {DOWNSAMPLE};\n\
         pub const DOWN_TAPS_PER_PHASE: usize = {DOWN_TAPS_PER_PHASE};\n"
    ));
    emit_table(&mut s, "UP_COEFFS", &up);
    emit_table(&mut s, "DOWN_COEFFS", &down);

    fs::write(&dest, s).unwrap();

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/window.rs");
}

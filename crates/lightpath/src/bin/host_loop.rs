//! # LIGHTPATH Host Loop
//!
//! Runs an engine headless at the nominal frame rate and prints what the
//! probe sees. Useful for sizing a shape before wiring real LEDs.
//!
//! ```bash
//! # Default 300-pixel line, 600 frames
//! ./host_loop
//!
//! # A configured object for 2000 frames
//! ./host_loop lightpath.toml 2000
//! ```

use lightpath::{EmitCommand, Engine, EngineConfig};
use lightpath::shared::FRAME_MS;

const DEFAULT_FRAMES: u64 = 600;

fn main() {
    println!("═══════════════════════════════════════════════════════════════════");
    println!("                    LIGHTPATH HOST LOOP v0.1.0");
    println!("═══════════════════════════════════════════════════════════════════");
    println!();

    let args: Vec<String> = std::env::args().collect();

    let config = match args.get(1) {
        Some(path) => match EngineConfig::from_toml_file(path) {
            Ok(config) => {
                println!("  Config:   {path} ✓");
                config
            }
            Err(e) => {
                eprintln!("  ✗ FATAL: {e}");
                std::process::exit(1);
            }
        },
        None => {
            println!("  Config:   built-in defaults");
            EngineConfig {
                auto_emit: true,
                ..EngineConfig::default()
            }
        }
    };

    let frames = match args.get(2).map(|arg| arg.parse::<u64>()) {
        Some(Ok(frames)) => frames,
        Some(Err(e)) => {
            eprintln!("  ✗ FATAL: invalid frame count: {e}");
            std::process::exit(1);
        }
        None => DEFAULT_FRAMES,
    };

    let engine = Engine::new(&config);
    println!("  Object:   {:?}", config.object);
    println!("  Pixels:   {}", engine.pixel_count());
    println!("  Auto:     {}", engine.auto_emit_enabled());
    println!("  Frames:   {frames}");
    println!();

    // Seed one list so a run without auto-emission still shows traffic.
    if let Err(e) = engine.emit(&EmitCommand::new(0, 1.0)) {
        println!("  ⚠ initial emit rejected: {e}");
    }

    let mut lit_frames = 0_u64;
    for frame in 1..=frames {
        engine.update(frame * FRAME_MS);
        if engine.frame_bytes().iter().any(|&byte| byte != 0) {
            lit_frames += 1;
        }
        if frame % u64::from(lightpath::PROBE_WINDOW) == 0 {
            if let Some(report) = engine.probe() {
                println!(
                    "  [{:>6}] {:>6.1} fps, {:.3} emits/frame, {} lists",
                    frame,
                    report.fps,
                    report.emits_per_frame,
                    engine.with_state(|state| state.active_lists())
                );
            }
        }
    }

    println!();
    println!("  Lit frames: {lit_frames}/{frames}");
    println!("═══════════════════════════════════════════════════════════════════");
}

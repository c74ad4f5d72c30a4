//! Demo command - record a simulated host and verify the replay loop
//!
//! The simulated host is a flat state buffer. Each frame takes a pseudo-random
//! pad input and perturbs a few bytes of the buffer, so any input that replays
//! out of order or against the wrong baseline shows up as a checksum mismatch.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use bytemuck::{Pod, Zeroable};
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use relive_core::{LoopConfig, Session, SlotId};

/// Arguments for the demo command
#[derive(Args)]
pub struct DemoArgs {
    /// Frames to record
    #[arg(long, default_value_t = 300)]
    pub frames: u32,

    /// Playback passes to run and verify
    #[arg(long, default_value_t = 3)]
    pub loops: u32,

    /// Host state size in bytes
    #[arg(long, default_value_t = 4 * 1024 * 1024)]
    pub state_size: usize,

    /// Slot to record into (defaults to session.default_slot)
    #[arg(long)]
    pub slot: Option<u32>,

    /// Seed for the input generator
    #[arg(long, default_value_t = 0x5EED)]
    pub seed: u64,

    /// Loop directory (overrides store.directory)
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

/// One frame of simulated pad input
#[repr(C)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, Pod, Zeroable)]
pub struct DemoInput {
    pub buttons: u32,
    pub stick_x: i16,
    pub stick_y: i16,
}

/// Deterministic stand-in for a real host program
pub struct SimHost {
    pub state: Vec<u8>,
}

impl SimHost {
    pub fn new(len: usize, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut state = vec![0u8; len];
        rng.fill(state.as_mut_slice());
        Self { state }
    }

    /// Advance one frame
    pub fn update(&mut self, input: &DemoInput) {
        let len = self.state.len();
        let mut cursor = (input.buttons as usize).wrapping_mul(0x9E37_79B1) % len;
        for k in 0..16u32 {
            let delta = (input.stick_x as u8).rotate_left(k) ^ (input.stick_y as u8);
            self.state[cursor] = self.state[cursor].wrapping_add(delta | 1);
            cursor = (cursor + 65_537) % len;
        }
    }

    pub fn checksum(&self) -> u64 {
        xxhash_rust::xxh3::xxh3_64(&self.state)
    }
}

fn random_input(rng: &mut Pcg32) -> DemoInput {
    DemoInput {
        buttons: rng.random(),
        stick_x: rng.random(),
        stick_y: rng.random(),
    }
}

/// Outcome of a verified demo run
#[derive(Debug)]
pub struct DemoReport {
    pub slot: SlotId,
    pub frames: u32,
    pub loops: u32,
    pub start_checksum: u64,
    pub end_checksum: u64,
}

/// Execute the demo command
pub fn execute(args: DemoArgs, config: LoopConfig) -> Result<()> {
    println!("=== Relive Demo ===");
    let report = run(&args, config)?;

    println!();
    println!("Loop verified:");
    println!("  Slot: {}", report.slot);
    println!("  Frames per loop: {}", report.frames);
    println!("  Passes: {}", report.loops);
    println!("  Baseline checksum: {:016x}", report.start_checksum);
    println!("  End checksum: {:016x}", report.end_checksum);
    Ok(())
}

/// Record, replay and verify; fails on the first divergent pass
pub fn run(args: &DemoArgs, mut config: LoopConfig) -> Result<DemoReport> {
    if args.frames == 0 {
        bail!("--frames must be at least 1");
    }
    if args.state_size == 0 {
        bail!("--state-size must be at least 1");
    }
    if let Some(dir) = &args.dir {
        config.store.directory = dir.clone();
    }
    let slot = SlotId(args.slot.unwrap_or(config.session.default_slot));

    let mut session = Session::<DemoInput>::from_config(&config, args.state_size)
        .context("Failed to set up session")?;
    if session.store().valid_count() < session.store().slot_count() {
        tracing::warn!(
            valid = session.store().valid_count(),
            slots = session.store().slot_count(),
            "Some snapshot slots failed to initialize"
        );
    }

    let mut host = SimHost::new(args.state_size, args.seed);
    let mut rng = Pcg32::seed_from_u64(args.seed ^ 0xA5A5_A5A5);
    let start_checksum = host.checksum();

    println!("  Directory: {}", config.store.directory.display());
    println!("  State size: {} bytes", args.state_size);
    println!("  Recording {} frames into slot {slot}...", args.frames);

    let started = Instant::now();
    session
        .begin_recording(slot, &host.state)
        .with_context(|| format!("Failed to start recording into slot {slot}"))?;
    for _ in 0..args.frames {
        let input = random_input(&mut rng);
        session.record_frame(&input).context("Failed to record frame")?;
        host.update(&input);
    }
    session.end_recording();
    let end_checksum = host.checksum();
    tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "Recorded");

    let started = Instant::now();
    session
        .begin_playback(slot, &mut host.state)
        .with_context(|| format!("Failed to start playback of slot {slot}"))?;
    tracing::info!(
        elapsed_us = started.elapsed().as_micros() as u64,
        "Baseline restored"
    );
    if host.checksum() != start_checksum {
        bail!("Restored state does not match the recording baseline");
    }

    let mut input = DemoInput::default();
    for pass in 1..=args.loops {
        for _ in 0..args.frames {
            session
                .playback_frame(&mut host.state, &mut input)
                .context("Playback failed")?;
            host.update(&input);
        }
        let got = host.checksum();
        if got != end_checksum {
            bail!("Pass {pass} diverged: expected {end_checksum:016x}, got {got:016x}");
        }
        println!("  Pass {pass}: ok ({got:016x})");
    }
    session.end_playback();

    Ok(DemoReport {
        slot,
        frames: args.frames,
        loops: args.loops,
        start_checksum,
        end_checksum,
    })
}

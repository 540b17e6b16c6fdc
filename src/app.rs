use std::error::Error;

use glam::Vec2;
use instant::Instant;

use enderwalk::sim::SimPage;
use enderwalk::{Controller, Tuning};

/// Target display rate of the simulated host (seconds per tick).
const TICK_RATE: f64 = 1.0 / 60.0;
/// Max accumulated time before we clamp (prevents spiral of death).
const MAX_ACCUMULATOR: f64 = 0.25;
/// Simulated run length when `ENDERWALK_MINUTES` is unset.
const DEFAULT_MINUTES: f64 = 10.0;
/// How often to log throughput (wall-clock seconds).
const STATS_LOG_INTERVAL: f64 = 2.0;
/// Initial viewport of the synthetic page.
const VIEWPORT: Vec2 = Vec2::new(1280.0, 800.0);
/// Viewport after the one simulated window resize.
const RESIZED_VIEWPORT: Vec2 = Vec2::new(960.0, 720.0);
/// Natural size of the base sprite frame.
const SPRITE_NATURAL: (u32, u32) = (32, 50);
/// How long the simulated tab stays in the background (ms).
const BACKGROUND_SPAN: f64 = 15_000.0;

// ---------------------------------------------------------------------------
// Tick timing
// ---------------------------------------------------------------------------

struct TickStats {
    tick_count: u64,
    last_log_time: Instant,
    tick_time_sum: f64,
    tick_time_max: f64,
    ticks_since_log: u32,
}

impl TickStats {
    fn new() -> Self {
        Self {
            tick_count: 0,
            last_log_time: Instant::now(),
            tick_time_sum: 0.0,
            tick_time_max: 0.0,
            ticks_since_log: 0,
        }
    }

    fn record_tick(&mut self, cost: f64, sim_ms: f64) {
        self.tick_count += 1;
        self.ticks_since_log += 1;
        self.tick_time_sum += cost;
        self.tick_time_max = self.tick_time_max.max(cost);

        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        if elapsed >= STATS_LOG_INTERVAL {
            let avg_us = (self.tick_time_sum / self.ticks_since_log as f64) * 1e6;
            log::info!(
                "sim t={:.0}s | ticks/s: {:.0} | avg: {:.1}us | max: {:.1}us | total ticks: {}",
                sim_ms / 1000.0,
                self.ticks_since_log as f64 / elapsed,
                avg_us,
                self.tick_time_max * 1e6,
                self.tick_count,
            );
            self.last_log_time = Instant::now();
            self.tick_time_sum = 0.0;
            self.tick_time_max = 0.0;
            self.ticks_since_log = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// Session counters
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Tally {
    appearances: u32,
    grabs: u32,
    drops: u32,
    teleports: u32,
    mood_flips: u32,
    was_active: bool,
    was_carrying: bool,
    was_teleporting: bool,
    last_mood: Option<enderwalk::character::Mood>,
}

impl Tally {
    fn observe(&mut self, ctl: &Controller<SimPage>) {
        let s = ctl.state();
        if s.active && !self.was_active {
            self.appearances += 1;
        }
        let carrying = s.carrying.is_some();
        if carrying && !self.was_carrying {
            self.grabs += 1;
        }
        if !carrying && self.was_carrying {
            self.drops += 1;
        }
        if s.teleporting && !self.was_teleporting {
            self.teleports += 1;
        }
        if self.last_mood.is_some_and(|m| m != s.mood) {
            self.mood_flips += 1;
        }
        self.was_active = s.active;
        self.was_carrying = carrying;
        self.was_teleporting = s.teleporting;
        self.last_mood = Some(s.mood);
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

fn load_tuning() -> Result<Tuning, Box<dyn Error>> {
    match std::env::var("ENDERWALK_TUNING") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)?;
            let tuning = Tuning::from_json(&json)?;
            log::info!("Loaded tuning overrides from {path}");
            Ok(tuning)
        }
        Err(_) => Ok(Tuning::default()),
    }
}

fn env_or<T: std::str::FromStr>(key: &str, fallback: T) -> Result<T, Box<dyn Error>>
where
    T::Err: Error + 'static,
{
    match std::env::var(key) {
        Ok(raw) => Ok(raw.trim().parse::<T>()?),
        Err(_) => Ok(fallback),
    }
}

/// Synthetic pointer: a slow Lissajous sweep over the viewport.
fn pointer_at(t_ms: f64, viewport: Vec2) -> Vec2 {
    let t = (t_ms / 1000.0) as f32;
    let x = 0.5 + 0.42 * (t * 0.31).sin();
    let y = 0.5 + 0.38 * (t * 0.47 + 1.3).sin();
    Vec2::new(x * viewport.x, y * viewport.y)
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let tuning = load_tuning()?;
    let seed = env_or("ENDERWALK_SEED", fastrand::u64(..))?;
    let minutes: f64 = env_or("ENDERWALK_MINUTES", DEFAULT_MINUTES)?;
    if minutes.is_nan() || minutes <= 0.0 {
        return Err(format!("ENDERWALK_MINUTES must be positive, got {minutes}").into());
    }
    log::info!("Seed {seed}, simulating {minutes} minutes");

    let mut rng = fastrand::Rng::with_seed(seed);
    let page = SimPage::article(VIEWPORT, &mut rng);
    let mut ctl = Controller::new(page, tuning, VIEWPORT, rng.fork(), 0.0);
    ctl.on_sprite_loaded(Some(SPRITE_NATURAL));

    let end = minutes * 60_000.0;
    let background_at = end * 0.4;
    let resize_at = end * 0.6;
    let mut backgrounded = false;
    let mut resized = false;
    let mut viewport = VIEWPORT;

    let mut stats = TickStats::new();
    let mut tally = Tally::default();
    let mut now_ms = 0.0;
    let mut accumulator = 0.0;

    while now_ms < end {
        // Host frames arrive with some jitter; the accumulator turns them
        // into fixed ticks.
        let frame_dt = TICK_RATE * (0.8 + 0.5 * rng.f64());
        accumulator = (accumulator + frame_dt).min(MAX_ACCUMULATOR);

        while accumulator >= TICK_RATE {
            now_ms += TICK_RATE * 1000.0;
            accumulator -= TICK_RATE;

            // 1. Host events
            if !backgrounded && now_ms >= background_at {
                log::info!("Tab hidden");
                ctl.on_visibility_change(true, now_ms);
                backgrounded = true;
            }
            if backgrounded && ctl.state().page_hidden && now_ms >= background_at + BACKGROUND_SPAN {
                log::info!("Tab visible again");
                ctl.on_visibility_change(false, now_ms);
            }
            if !resized && now_ms >= resize_at {
                viewport = RESIZED_VIEWPORT;
                log::info!("Viewport resized to {}x{}", viewport.x, viewport.y);
                ctl.on_resize(viewport);
                resized = true;
            }
            ctl.on_pointer_move(pointer_at(now_ms, viewport));

            // 2. Timers and one frame
            let started = Instant::now();
            ctl.advance(now_ms);
            stats.record_tick(started.elapsed().as_secs_f64(), now_ms);

            // 3. Bookkeeping
            tally.observe(&ctl);
        }
    }

    ctl.teardown();

    let sprite = &ctl.page().sprite;
    log::info!(
        "Done after {} ticks: {} appearances, {} grabs, {} drops, {} teleports, {} mood flips, {} frame swaps",
        stats.tick_count,
        tally.appearances,
        tally.grabs,
        tally.drops,
        tally.teleports,
        tally.mood_flips,
        sprite.frame_draws,
    );
    log::info!(
        "Final: pos=({:.0}, {:.0}) hidden={} outstanding claims={} placeholders={}",
        sprite.position.x,
        sprite.position.y,
        sprite.hidden,
        ctl.claims().len(),
        ctl.page().placeholder_count(),
    );
    Ok(())
}

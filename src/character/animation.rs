use super::Mood;

/// Animation category driving frame selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationMode {
    Idle,
    Walk,
    Grab,
    Hunt,
    Spawn,
}

impl AnimationMode {
    pub const ALL: [AnimationMode; 5] = [
        Self::Idle,
        Self::Walk,
        Self::Grab,
        Self::Hunt,
        Self::Spawn,
    ];

    /// Milliseconds between frame advances.
    pub fn interval_ms(self) -> f64 {
        match self {
            Self::Idle => 220.0,
            Self::Walk => BASE_FRAME_INTERVAL,
            Self::Grab => 120.0,
            Self::Hunt => 100.0,
            Self::Spawn => 90.0,
        }
    }
}

const BASE_FRAME_INTERVAL: f64 = 110.0;

const SPAWN_FRAMES: &[&str] = &["spawn1.png", "spawn2.png"];

/// Ordered frame files for a mood and mode. Never empty.
pub fn frames(mood: Mood, mode: AnimationMode) -> &'static [&'static str] {
    match (mood, mode) {
        (Mood::Calm, AnimationMode::Walk) => &["walk1.png", "walk2-idle.png", "walk3.png"],
        (Mood::Calm, AnimationMode::Idle) => &["walk2-idle.png"],
        (Mood::Calm, AnimationMode::Grab) => {
            &["walk-grab1.png", "walk-grab2-idle.png", "walk-grab3.png"]
        }
        (Mood::Calm, AnimationMode::Hunt) => {
            &["walk-hunt1.png", "walkhunt2-idle.png", "walkhunt3.png"]
        }
        (Mood::Angry, AnimationMode::Walk) => {
            &["walk-angry1.png", "walk-angry2-idle.png", "walk-angry3.png"]
        }
        (Mood::Angry, AnimationMode::Idle) => &["walk-angry2-idle.png"],
        (Mood::Angry, AnimationMode::Grab) => &[
            "walk-angry-grab.png",
            "walk-angry2-grab-idle.png",
            "walk-angry3-grab.png",
        ],
        (Mood::Angry, AnimationMode::Hunt) => &[
            "walk-angry-hunt1.png",
            "walk-angry-hunt2-idle.png",
            "walk-angry-hunt3.png",
        ],
        (_, AnimationMode::Spawn) => SPAWN_FRAMES,
    }
}

/// Inputs to [`select_mode`], gathered from the state record.
#[derive(Debug, Clone, Copy)]
pub struct ModeInputs {
    pub transitioning: bool,
    pub active: bool,
    pub carrying: bool,
    pub hunting: bool,
    pub distance_to_target: Option<f32>,
    pub idle_distance: f32,
}

/// Pick the animation mode. First match wins.
pub fn select_mode(inputs: ModeInputs) -> AnimationMode {
    if inputs.transitioning {
        return AnimationMode::Spawn;
    }
    if !inputs.active {
        return AnimationMode::Idle;
    }
    if inputs.carrying {
        return AnimationMode::Grab;
    }
    if inputs.hunting {
        return AnimationMode::Hunt;
    }
    match inputs.distance_to_target {
        Some(d) if d >= inputs.idle_distance => AnimationMode::Walk,
        _ => AnimationMode::Idle,
    }
}

/// Frame cursor for the current `(mood, mode)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    pub mode: AnimationMode,
    /// Mood the frame list was resolved for.
    pub mood: Mood,
    pub frames: &'static [&'static str],
    pub index: usize,
    /// `None` until the first tick after a (re)resolve.
    pub last_advance: Option<f64>,
    pub interval: f64,
}

impl AnimationState {
    /// Fresh cursor at frame 0 with the advance timer reset.
    pub fn resolve(mood: Mood, mode: AnimationMode) -> Self {
        Self {
            mode,
            mood,
            frames: frames(mood, mode),
            index: 0,
            last_advance: None,
            interval: mode.interval_ms(),
        }
    }

    /// Stale relative to the wanted mode or the current mood.
    pub fn needs_resolve(&self, mood: Mood, mode: AnimationMode) -> bool {
        self.mode != mode || self.mood != mood
    }

    pub fn current_frame(&self) -> &'static str {
        self.frames[self.index % self.frames.len()]
    }

    /// Step the cursor if the interval elapsed. Returns true when the index moved.
    pub fn advance(&mut self, now: f64) -> bool {
        if self.frames.is_empty() {
            return false;
        }
        let last = *self.last_advance.get_or_insert(now);
        if now - last < self.interval {
            return false;
        }
        self.index = (self.index + 1) % self.frames.len();
        self.last_advance = Some(now);
        true
    }

    /// Time a full play-through takes, plus `extra` milliseconds.
    pub fn cycle_duration(&self, extra: f64) -> f64 {
        self.frames.len().max(1) as f64 * self.interval + extra
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> ModeInputs {
        ModeInputs {
            transitioning: false,
            active: true,
            carrying: false,
            hunting: false,
            distance_to_target: Some(50.0),
            idle_distance: 4.0,
        }
    }

    #[test]
    fn table_is_exhaustive_and_non_empty() {
        for mood in [Mood::Calm, Mood::Angry] {
            for mode in AnimationMode::ALL {
                assert!(!frames(mood, mode).is_empty(), "{mood:?}/{mode:?}");
            }
        }
        assert_eq!(frames(Mood::Calm, AnimationMode::Spawn), frames(Mood::Angry, AnimationMode::Spawn));
    }

    #[test]
    fn mode_priority() {
        assert_eq!(select_mode(ModeInputs { transitioning: true, active: false, ..inputs() }), AnimationMode::Spawn);
        assert_eq!(select_mode(ModeInputs { active: false, carrying: true, ..inputs() }), AnimationMode::Idle);
        assert_eq!(select_mode(ModeInputs { carrying: true, hunting: true, ..inputs() }), AnimationMode::Grab);
        assert_eq!(select_mode(ModeInputs { hunting: true, ..inputs() }), AnimationMode::Hunt);
        assert_eq!(select_mode(ModeInputs { distance_to_target: None, ..inputs() }), AnimationMode::Idle);
        assert_eq!(select_mode(ModeInputs { distance_to_target: Some(3.9), ..inputs() }), AnimationMode::Idle);
        assert_eq!(select_mode(inputs()), AnimationMode::Walk);
    }

    #[test]
    fn advance_wraps_and_respects_interval() {
        let mut anim = AnimationState::resolve(Mood::Calm, AnimationMode::Walk);
        assert!(!anim.advance(1000.0));
        assert!(!anim.advance(1050.0));
        assert!(anim.advance(1110.0));
        assert_eq!(anim.index, 1);
        assert!(anim.advance(1220.0));
        assert!(anim.advance(1330.0));
        assert_eq!(anim.index, 0);
        assert!(anim.index < anim.frames.len());
    }

    #[test]
    fn resolve_resets_cursor() {
        let mut anim = AnimationState::resolve(Mood::Calm, AnimationMode::Walk);
        anim.advance(0.0);
        anim.advance(500.0);
        assert_eq!(anim.index, 1);
        assert!(anim.needs_resolve(Mood::Angry, AnimationMode::Walk));
        let anim = AnimationState::resolve(Mood::Angry, AnimationMode::Walk);
        assert_eq!(anim.index, 0);
        assert_eq!(anim.last_advance, None);
    }

    #[test]
    fn spawn_cycle_duration() {
        let anim = AnimationState::resolve(Mood::Calm, AnimationMode::Spawn);
        assert_eq!(anim.cycle_duration(120.0), 2.0 * 90.0 + 120.0);
    }
}

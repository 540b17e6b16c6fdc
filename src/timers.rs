/// Logical single-shot timers owned by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TimerKind {
    NextAction = 0,
    MoodShift = 1,
    HuntEnd = 2,
    SpawnAnimation = 3,
    AppearanceCycle = 4,
    AppearanceEnd = 5,
    CarryDrop = 6,
}

impl TimerKind {
    pub const ALL: [TimerKind; 7] = [
        Self::NextAction,
        Self::MoodShift,
        Self::HuntEnd,
        Self::SpawnAnimation,
        Self::AppearanceCycle,
        Self::AppearanceEnd,
        Self::CarryDrop,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::NextAction => "next-action",
            Self::MoodShift => "mood-shift",
            Self::HuntEnd => "hunt-end",
            Self::SpawnAnimation => "spawn",
            Self::AppearanceCycle => "appearance-cycle",
            Self::AppearanceEnd => "appearance-end",
            Self::CarryDrop => "carry-drop",
        }
    }
}

/// One deadline slot per timer kind, so at most one instance of each can be
/// outstanding. Arming a kind replaces (cancels) its previous deadline.
#[derive(Debug, Clone, Default)]
pub struct Timers {
    deadlines: [Option<f64>; 7],
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` to fire at `at` (absolute milliseconds).
    pub fn arm(&mut self, kind: TimerKind, at: f64) {
        self.deadlines[kind as usize] = Some(at);
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.deadlines[kind as usize] = None;
    }

    pub fn cancel_all(&mut self) {
        self.deadlines = [None; 7];
    }

    pub fn deadline(&self, kind: TimerKind) -> Option<f64> {
        self.deadlines[kind as usize]
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.deadline(kind).is_some()
    }

    /// Earliest outstanding deadline.
    pub fn next_deadline(&self) -> Option<f64> {
        self.deadlines.iter().flatten().copied().reduce(f64::min)
    }

    /// Remove and return the earliest timer due at or before `now`.
    /// Ties go to the lower kind index.
    pub fn pop_due(&mut self, now: f64) -> Option<(TimerKind, f64)> {
        let mut best: Option<(TimerKind, f64)> = None;
        for kind in TimerKind::ALL {
            let Some(at) = self.deadline(kind) else {
                continue;
            };
            if at > now {
                continue;
            }
            if best.map_or(true, |(_, b)| at < b) {
                best = Some((kind, at));
            }
        }
        if let Some((kind, _)) = best {
            self.cancel(kind);
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rearm_replaces_previous_instance() {
        let mut timers = Timers::new();
        timers.arm(TimerKind::HuntEnd, 100.0);
        timers.arm(TimerKind::HuntEnd, 500.0);
        assert_eq!(timers.pop_due(200.0), None);
        assert_eq!(timers.pop_due(500.0), Some((TimerKind::HuntEnd, 500.0)));
        assert!(!timers.is_armed(TimerKind::HuntEnd));
    }

    #[test]
    fn pops_in_deadline_order() {
        let mut timers = Timers::new();
        timers.arm(TimerKind::CarryDrop, 30.0);
        timers.arm(TimerKind::NextAction, 20.0);
        timers.arm(TimerKind::MoodShift, 10.0);
        timers.arm(TimerKind::AppearanceCycle, 999.0);
        let order: Vec<_> = std::iter::from_fn(|| timers.pop_due(100.0)).map(|(k, _)| k).collect();
        assert_eq!(order, vec![TimerKind::MoodShift, TimerKind::NextAction, TimerKind::CarryDrop]);
        assert_eq!(timers.next_deadline(), Some(999.0));
    }

    #[test]
    fn cancel_all_clears_everything() {
        let mut timers = Timers::new();
        for (i, kind) in TimerKind::ALL.into_iter().enumerate() {
            timers.arm(kind, i as f64);
        }
        timers.cancel_all();
        assert_eq!(timers.next_deadline(), None);
    }
}

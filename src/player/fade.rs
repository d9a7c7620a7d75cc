/// A time-bounded linear volume transition driven by periodic ticks.
///
/// The per-tick step is `(to - from) / (duration_secs × tick_rate)`, so the
/// ramp reaches its target after `duration_secs` worth of ticks regardless
/// of direction.
#[derive(Debug, Clone)]
pub struct FadeRamp {
    level: f32,
    target: f32,
    step: f32,
}

impl FadeRamp {
    pub fn new(from: f32, to: f32, duration_secs: f32, tick_rate: u32) -> Self {
        let ticks = (duration_secs * tick_rate.max(1) as f32).max(1.0);
        Self {
            level: from,
            target: to,
            step: (to - from) / ticks,
        }
    }

    /// Advance one tick and return the new level, clamped at the target.
    pub fn advance(&mut self) -> f32 {
        self.level += self.step;
        let overshot = if self.step >= 0.0 {
            self.level >= self.target
        } else {
            self.level <= self.target
        };
        if overshot {
            self.level = self.target;
        }
        self.level
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn complete(&self) -> bool {
        self.level == self.target
    }
}

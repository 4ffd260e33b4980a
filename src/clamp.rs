/// Maps a raw controller output onto a fan duty cycle.
///
/// Below `min` the fan is switched off entirely, since it would stall or
/// whine at such low duty cycles. Above `max` it runs fully on. Between the
/// two bounds the value passes through unchanged, so the output jumps from
/// 0 straight to `min` at the lower bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DutyCycleClamp {
    min: f32,
    max: f32,
}

impl DutyCycleClamp {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn apply(&self, raw: f32) -> f32 {
        if raw < self.min {
            0.0
        } else if raw > self.max {
            1.0
        } else {
            raw
        }
    }
}

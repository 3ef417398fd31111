/// Shared, GUI-editable numeric value
///
/// The pass that owns a parameter and the GUI that edits it hold clones of
/// the same cell. Writes are clamped to the parameter's range.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, Clone)]
pub struct Parameter {
    bits: Arc<AtomicU32>,
    min: f32,
    max: f32,
    step: f32,
}

impl Parameter {
    /// Create a parameter; `value` is clamped into `[min, max]`
    pub fn new(value: f32, min: f32, max: f32, step: f32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            bits: Arc::new(AtomicU32::new(value.clamp(min, max).to_bits())),
            min,
            max,
            step,
        }
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// Store a new value and return what was actually stored.
    /// NaN is ignored.
    pub fn set(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.get();
        }
        let clamped = value.clamp(self.min, self.max);
        self.bits.store(clamped.to_bits(), Ordering::Relaxed);
        clamped
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// True when both handles edit the same cell
    pub fn shares_cell_with(&self, other: &Parameter) -> bool {
        Arc::ptr_eq(&self.bits, &other.bits)
    }
}

//! Playback-related domain models

use crate::types::Validator;
use serde::{Deserialize, Serialize};

/// Playback rate multiplier (0.5x - 3.0x)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaybackRate(f32);

impl PlaybackRate {
    pub const MIN: f32 = 0.5;
    pub const MAX: f32 = 3.0;

    /// Creates a new playback rate
    pub fn new(rate: f32) -> Result<Self, String> {
        if !(Self::MIN..=Self::MAX).contains(&rate) {
            Err(format!(
                "Rate must be between {} and {}",
                Self::MIN,
                Self::MAX
            ))
        } else {
            Ok(Self(rate))
        }
    }

    /// Returns the rate value
    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Default for PlaybackRate {
    fn default() -> Self {
        Self(1.0)
    }
}

impl Validator for PlaybackRate {
    fn validate(&self) -> Result<(), Vec<String>> {
        Self::new(self.0).map(|_| ()).map_err(|e| vec![e])
    }
}

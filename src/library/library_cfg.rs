use std::convert::TryFrom;

use serde::{Deserialize, Serialize};

use super::{
    definitions::{DEFAULT_DUPLICATE_THRESHOLD, DEFAULT_FRAME_INTERVAL, DEFAULT_SHARPNESS_THRESHOLD},
    errors::ConfigError,
};

/// Fixed clockwise rotation applied to every accepted frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    pub fn degrees(self) -> u32 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Clockwise180 => 180,
            Rotation::Clockwise270 => 270,
        }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Rotation::None
    }
}

impl TryFrom<u32> for Rotation {
    type Error = ConfigError;

    fn try_from(degrees: u32) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Clockwise90),
            180 => Ok(Rotation::Clockwise180),
            270 => Ok(Rotation::Clockwise270),
            other => Err(ConfigError::Rotation(other)),
        }
    }
}

/// Read-only settings shared by every video pipeline in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    sharpness_threshold: u32,
    duplicate_threshold: f64,
    frame_interval: u32,
    rotation: Rotation,
    dry_run: bool,
    verbose: bool,
}

impl FilterConfig {
    pub fn new(
        sharpness_threshold: u32,
        duplicate_threshold: f64,
        frame_interval: u32,
        rotation: Rotation,
        dry_run: bool,
        verbose: bool,
    ) -> Result<Self, ConfigError> {
        if frame_interval == 0 {
            return Err(ConfigError::Interval(frame_interval));
        }

        //NaN fails this check too.
        if !(0.0..=1.0).contains(&duplicate_threshold) {
            return Err(ConfigError::DuplicateThreshold(duplicate_threshold));
        }

        Ok(Self {
            sharpness_threshold,
            duplicate_threshold,
            frame_interval,
            rotation,
            dry_run,
            verbose,
        })
    }

    pub fn sharpness_threshold(&self) -> u32 {
        self.sharpness_threshold
    }

    pub fn duplicate_threshold(&self) -> f64 {
        self.duplicate_threshold
    }

    pub fn frame_interval(&self) -> u32 {
        self.frame_interval
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            sharpness_threshold: DEFAULT_SHARPNESS_THRESHOLD,
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            rotation: Rotation::None,
            dry_run: false,
            verbose: false,
        }
    }
}

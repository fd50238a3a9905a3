//! Repetition detection from tilt samples.
//!
//! [`RepDetector`] folds a stream of [`TiltSample`]s into discrete
//! [`RepEvent`]s. Two asymmetric thresholds form a hysteresis band: the
//! body is considered down once the tilt rises above `squat_angle_deg`,
//! and a repetition completes once it falls back below
//! `return_angle_deg`. While the tilt sits between the thresholds
//! nothing changes, so sensor noise near either threshold cannot flap
//! the state.
//!
//! A completion inside `min_rep_interval` of the previous counted rep is
//! reported as rejected rather than counted, and does not move the
//! debounce anchor. The detector performs no I/O and never panics on
//! malformed input; non-finite angles are rejected sample by sample
//! with the rest of the state untouched.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default tilt angle (degrees) marking the bottom of a rep.
pub const DEFAULT_SQUAT_ANGLE_DEG: f64 = 45.0;

/// Default tilt angle (degrees) below which the body is upright again.
pub const DEFAULT_RETURN_ANGLE_DEG: f64 = 10.0;

/// Default minimum time between two counted reps, in milliseconds.
pub const DEFAULT_MIN_REP_INTERVAL_MS: i64 = 1_000;

/// Errors from an invalid [`DetectorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The squat threshold does not sit strictly above the return threshold.
    #[error(
        "squat threshold must be greater than return threshold \
         ({squat_angle_deg}° <= {return_angle_deg}°)"
    )]
    ThresholdOrder {
        squat_angle_deg: f64,
        return_angle_deg: f64,
    },
    /// A threshold is NaN, infinite, or negative.
    #[error("threshold angles must be finite and non-negative, got {0}°")]
    InvalidThreshold(f64),
    /// The debounce interval is negative.
    #[error("minimum rep interval must not be negative, got {0}ms")]
    NegativeInterval(i64),
}

/// Tuning for the repetition detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    /// Absolute tilt angle (degrees) above which the body is down.
    pub squat_angle_deg: f64,
    /// Absolute tilt angle (degrees) below which the body is upright again.
    pub return_angle_deg: f64,
    /// Minimum time between two counted reps.
    pub min_rep_interval: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            squat_angle_deg: DEFAULT_SQUAT_ANGLE_DEG,
            return_angle_deg: DEFAULT_RETURN_ANGLE_DEG,
            min_rep_interval: Duration::milliseconds(DEFAULT_MIN_REP_INTERVAL_MS),
        }
    }
}

impl DetectorConfig {
    /// Checks the thresholds and debounce interval for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for angle in [self.squat_angle_deg, self.return_angle_deg] {
            if !angle.is_finite() || angle < 0.0 {
                return Err(ConfigError::InvalidThreshold(angle));
            }
        }
        if self.squat_angle_deg <= self.return_angle_deg {
            return Err(ConfigError::ThresholdOrder {
                squat_angle_deg: self.squat_angle_deg,
                return_angle_deg: self.return_angle_deg,
            });
        }
        if self.min_rep_interval < Duration::zero() {
            return Err(ConfigError::NegativeInterval(
                self.min_rep_interval.num_milliseconds(),
            ));
        }
        Ok(())
    }
}

/// A single tilt reading from the device.
///
/// Only the magnitude of the angle matters for detection; the sign is
/// discarded so the device can be held facing either way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TiltSample {
    pub timestamp: DateTime<Utc>,
    pub angle_deg: f64,
}

/// Why a completed movement was not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The previous counted rep was too recent.
    TooFast,
    /// The sample carried a NaN or infinite angle.
    InvalidSample,
}

/// What a [`RepEvent`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepEventKind {
    /// A full down-up movement, counted.
    Completed,
    /// A movement or sample that was observed but not counted.
    Rejected(RejectReason),
}

/// A discrete event emitted by the detector, at most one per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: RepEventKind,
}

/// Counters accumulated over one monitoring session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionTally {
    /// Samples processed, valid or not.
    pub samples: u64,
    /// Repetitions counted.
    pub completed: u32,
    /// Completions rejected by the debounce guard.
    pub rejected_too_fast: u32,
    /// Samples rejected for a non-finite angle.
    pub rejected_invalid: u32,
}

/// Body position tracked across samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Standing,
    Squatting,
}

/// Stateful detector folding tilt samples into repetition events.
///
/// Samples must arrive in timestamp order on a single logical thread;
/// the detector holds no locks and never blocks.
#[derive(Debug)]
pub struct RepDetector {
    config: DetectorConfig,
    position: Position,
    last_rep_at: Option<DateTime<Utc>>,
    last_angle_deg: f64,
    tally: SessionTally,
}

impl Default for RepDetector {
    fn default() -> Self {
        Self {
            config: DetectorConfig::default(),
            position: Position::Standing,
            last_rep_at: None,
            last_angle_deg: 0.0,
            tally: SessionTally::default(),
        }
    }
}

impl RepDetector {
    /// Creates a detector with the given configuration.
    pub fn new(config: DetectorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Replaces the configuration without disturbing the session state.
    pub fn set_config(&mut self, config: DetectorConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// The active configuration.
    pub const fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Whether the body is currently in the down position.
    pub fn is_squatting(&self) -> bool {
        self.position == Position::Squatting
    }

    /// The absolute tilt of the last valid sample, in degrees.
    pub const fn current_angle(&self) -> f64 {
        self.last_angle_deg
    }

    /// Counters for the session so far.
    pub const fn tally(&self) -> SessionTally {
        self.tally
    }

    /// Folds one sample into the detector, returning the event it
    /// produced, if any.
    ///
    /// Most samples produce no event: entering the down position and
    /// movement inside the hysteresis band are silent. An event is
    /// emitted when a rep completes, when the debounce guard rejects a
    /// completion, or when the sample itself is unusable.
    pub fn process(&mut self, sample: TiltSample) -> Option<RepEvent> {
        self.tally.samples += 1;

        if !sample.angle_deg.is_finite() {
            self.tally.rejected_invalid += 1;
            tracing::debug!(
                timestamp = %sample.timestamp,
                angle_deg = sample.angle_deg,
                "rejecting non-finite tilt sample"
            );
            return Some(RepEvent {
                timestamp: sample.timestamp,
                kind: RepEventKind::Rejected(RejectReason::InvalidSample),
            });
        }

        let tilt = sample.angle_deg.abs();
        self.last_angle_deg = tilt;

        match self.position {
            Position::Standing => {
                // Strictly above: a tilt exactly at the threshold stays standing.
                if tilt > self.config.squat_angle_deg {
                    self.position = Position::Squatting;
                }
                None
            }
            Position::Squatting => {
                // Strictly below: a tilt exactly at the threshold stays down.
                if tilt >= self.config.return_angle_deg {
                    return None;
                }
                self.position = Position::Standing;

                let allowed = self.last_rep_at.is_none_or(|last| {
                    sample.timestamp.signed_duration_since(last) >= self.config.min_rep_interval
                });
                if allowed {
                    self.last_rep_at = Some(sample.timestamp);
                    self.tally.completed += 1;
                    Some(RepEvent {
                        timestamp: sample.timestamp,
                        kind: RepEventKind::Completed,
                    })
                } else {
                    // The anchor stays on the counted rep so a burst of
                    // fast movements cannot postpone the next valid one.
                    self.tally.rejected_too_fast += 1;
                    tracing::debug!(
                        timestamp = %sample.timestamp,
                        "rep completed too soon after the previous one, not counting"
                    );
                    Some(RepEvent {
                        timestamp: sample.timestamp,
                        kind: RepEventKind::Rejected(RejectReason::TooFast),
                    })
                }
            }
        }
    }

    /// Returns the detector to its initial state.
    ///
    /// Clears the position, the debounce anchor, and the session tally.
    /// Counts already committed to storage are not affected.
    pub fn reset(&mut self) {
        self.position = Position::Standing;
        self.last_rep_at = None;
        self.last_angle_deg = 0.0;
        self.tally = SessionTally::default();
    }
}

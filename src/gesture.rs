//! Hand landmarks to a single "openness" factor, plus the tracking session
//! that keeps a status and retries model loading.
//!
//! Landmark indices follow the common 21-point hand topology (wrist at 0,
//! thumb tip at 4, index base at 5, index tip at 8).

use std::thread;
use std::time::Duration;

use glam::Vec3;
use instant::Instant;
use smallvec::SmallVec;

use crate::constants::*;
use crate::error::GestureError;
use crate::signal::{publish_cell, Subscriber};

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_TIP: usize = 8;
pub const HAND_LANDMARK_COUNT: usize = 21;

/// One detected hand. Stored inline for the usual 21 points.
pub type HandLandmarks = SmallVec<[Vec3; HAND_LANDMARK_COUNT]>;

/// Factor reported whenever there is no usable hand.
pub const OPEN_HAND: f32 = 1.0;

/// Maps a pinch between thumb and index finger onto `[0, 1]`.
#[derive(Clone, Copy, Debug)]
pub struct GestureMapper {
    pub range_min: f32,
    pub range_max: f32,
    pub palm_floor: f32,
}

impl Default for GestureMapper {
    fn default() -> Self {
        Self {
            range_min: PINCH_RANGE_MIN,
            range_max: PINCH_RANGE_MAX,
            palm_floor: PALM_REFERENCE_FLOOR,
        }
    }
}

impl GestureMapper {
    /// 1.0 without a hand (or with too few landmarks), otherwise the pinch
    /// distance normalized by palm size and remapped from the empirical range.
    pub fn map(&self, hand: Option<&[Vec3]>) -> f32 {
        let Some(points) = hand else {
            return OPEN_HAND;
        };
        if points.len() <= INDEX_TIP {
            return OPEN_HAND;
        }
        let pinch = points[THUMB_TIP].distance(points[INDEX_TIP]);
        let palm = points[WRIST]
            .distance(points[INDEX_MCP])
            .max(self.palm_floor);
        let span = (self.range_max - self.range_min).max(f32::EPSILON);
        let factor = ((pinch / palm - self.range_min) / span).clamp(0.0, 1.0);
        if factor.is_finite() {
            factor
        } else {
            OPEN_HAND
        }
    }
}

/// Tracking status shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GestureStatus {
    Initializing,
    HandDetected,
    WaitingForHand,
    Error(GestureError),
}

impl GestureStatus {
    pub fn label(&self) -> &'static str {
        match self {
            GestureStatus::Initializing => "initializing",
            GestureStatus::HandDetected => "hand-detected",
            GestureStatus::WaitingForHand => "waiting-for-hand",
            GestureStatus::Error(_) => "error",
        }
    }
}

/// Result of polling a landmark source once.
#[derive(Clone, Debug)]
pub enum LandmarkPoll {
    /// No new camera frame has been processed since the last poll.
    Pending,
    NoHand,
    Hand(HandLandmarks),
}

/// A camera plus pose model. Implementations must not block for long in
/// `poll`; returning `Pending` is always acceptable.
pub trait LandmarkSource: Send + 'static {
    /// Bring the model up. `ModelUnavailable` is retried, anything else is final.
    fn load(&mut self) -> Result<(), GestureError>;
    fn poll(&mut self) -> Result<LandmarkPoll, GestureError>;
}

type FactorCallback = Box<dyn FnMut(f32) + Send>;
type StatusCallback = Box<dyn FnMut(&GestureStatus) + Send>;

/// Drives a [`LandmarkSource`]: loads the model (retrying on a fixed delay),
/// polls frames, maps them to a factor and reports status changes.
pub struct GestureTracker<S: LandmarkSource> {
    source: S,
    mapper: GestureMapper,
    status: GestureStatus,
    factor: f32,
    model_ready: bool,
    next_attempt: Option<Instant>,
    retry_delay: Duration,
    on_update: Vec<FactorCallback>,
    on_status: Vec<StatusCallback>,
}

impl<S: LandmarkSource> GestureTracker<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            mapper: GestureMapper::default(),
            status: GestureStatus::Initializing,
            factor: OPEN_HAND,
            model_ready: false,
            next_attempt: None,
            retry_delay: Duration::from_millis(MODEL_RETRY_DELAY_MS),
            on_update: Vec::new(),
            on_status: Vec::new(),
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Called with each new factor estimate, at most once per processed frame.
    pub fn on_gesture_update(&mut self, cb: impl FnMut(f32) + Send + 'static) {
        self.on_update.push(Box::new(cb));
    }

    pub fn on_status_change(&mut self, cb: impl FnMut(&GestureStatus) + Send + 'static) {
        self.on_status.push(Box::new(cb));
    }

    pub fn status(&self) -> &GestureStatus {
        &self.status
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Advance the session by one step.
    pub fn tick(&mut self, now: Instant) {
        if matches!(self.status, GestureStatus::Error(_)) {
            return;
        }
        if !self.model_ready {
            if self.next_attempt.is_some_and(|t| now < t) {
                return;
            }
            match self.source.load() {
                Ok(()) => {
                    log::info!("hand model loaded");
                    self.model_ready = true;
                    self.next_attempt = None;
                    self.set_status(GestureStatus::WaitingForHand);
                }
                Err(e) => self.handle_error(e, now),
            }
            return;
        }
        match self.source.poll() {
            Ok(LandmarkPoll::Pending) => {}
            Ok(LandmarkPoll::NoHand) => {
                self.set_status(GestureStatus::WaitingForHand);
                self.emit(OPEN_HAND);
            }
            Ok(LandmarkPoll::Hand(points)) => {
                self.set_status(GestureStatus::HandDetected);
                let f = self.mapper.map(Some(points.as_slice()));
                self.emit(f);
            }
            Err(e) => self.handle_error(e, now),
        }
    }

    fn handle_error(&mut self, e: GestureError, now: Instant) {
        if e.is_retryable() {
            log::debug!("{e}, retrying in {:?}", self.retry_delay);
            self.model_ready = false;
            self.next_attempt = Some(now + self.retry_delay);
            self.set_status(GestureStatus::Initializing);
        } else {
            log::warn!("hand tracking disabled: {e}");
            self.set_status(GestureStatus::Error(e));
        }
        if self.factor != OPEN_HAND {
            self.emit(OPEN_HAND);
        }
    }

    fn emit(&mut self, factor: f32) {
        self.factor = factor;
        for cb in &mut self.on_update {
            cb(factor);
        }
    }

    fn set_status(&mut self, status: GestureStatus) {
        if self.status == status {
            return;
        }
        log::info!("gesture status: {} -> {}", self.status.label(), status.label());
        self.status = status;
        for cb in &mut self.on_status {
            cb(&self.status);
        }
    }
}

/// Reading ends of a tracker running on its own thread.
pub struct GestureFeed {
    pub factor: Subscriber<f32>,
    pub status: Subscriber<GestureStatus>,
}

/// Run `tracker` on a background thread, ticking every `interval`, and return
/// cells carrying its latest factor and status. The thread exits once both
/// cells have been dropped.
pub fn spawn_tracker<S: LandmarkSource>(
    mut tracker: GestureTracker<S>,
    interval: Duration,
) -> std::io::Result<GestureFeed> {
    let (factor_tx, factor_rx) = publish_cell(OPEN_HAND);
    let (status_tx, status_rx) = publish_cell(GestureStatus::Initializing);
    thread::Builder::new()
        .name("gesture-tracker".into())
        .spawn(move || {
            let mut last_status = tracker.status().clone();
            let mut last_factor = tracker.factor();
            loop {
                if factor_tx.is_orphaned() && status_tx.is_orphaned() {
                    break;
                }
                tracker.tick(Instant::now());
                if tracker.factor() != last_factor {
                    last_factor = tracker.factor();
                    factor_tx.publish(last_factor);
                }
                if *tracker.status() != last_status {
                    last_status = tracker.status().clone();
                    status_tx.publish(last_status.clone());
                }
                thread::sleep(interval);
            }
            log::debug!("gesture tracker stopped");
        })?;
    Ok(GestureFeed {
        factor: factor_rx,
        status: status_rx,
    })
}

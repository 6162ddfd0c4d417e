//! Mouse-driven stand-in for a hand tracker.
//!
//! The cursor position is published from the event loop; a [`MouseHand`]
//! running on the tracker thread turns it into a synthetic set of 21 hand
//! landmarks. Moving the cursor towards the top of the window opens the
//! pinch, towards the bottom closes it. Leaving the window means "no hand".

use std::time::Duration;

use glam::Vec3;
use particle_morph::gesture::{
    spawn_tracker, GestureFeed, HandLandmarks, HAND_LANDMARK_COUNT, INDEX_MCP, INDEX_TIP,
    THUMB_TIP, WRIST,
};
use particle_morph::signal::{publish_cell, Publisher, Subscriber};
use particle_morph::{GestureError, GestureTracker, LandmarkPoll, LandmarkSource};
use smallvec::smallvec;

const PALM: f32 = 0.2;
/// Pinch-to-palm ratio at the top and bottom of the window.
const RATIO_OPEN: f32 = 1.4;
const RATIO_CLOSED: f32 = 0.0;

const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Cursor in normalised window coordinates (`0..1`, y down).
pub type CursorCell = Publisher<Option<[f32; 2]>>;

pub struct MouseHand {
    cursor: Subscriber<Option<[f32; 2]>>,
}

impl MouseHand {
    pub fn landmarks(cursor: [f32; 2]) -> HandLandmarks {
        let [x, y] = cursor;
        let ratio = RATIO_OPEN + (RATIO_CLOSED - RATIO_OPEN) * y.clamp(0.0, 1.0);
        let pinch = PALM * ratio;
        let mcp = Vec3::new(x, y, 0.0);
        let mut points: HandLandmarks = smallvec![mcp; HAND_LANDMARK_COUNT];
        points[WRIST] = mcp + Vec3::new(0.0, PALM, 0.0);
        points[INDEX_MCP] = mcp;
        points[THUMB_TIP] = mcp + Vec3::new(-pinch * 0.5, -0.1, 0.0);
        points[INDEX_TIP] = mcp + Vec3::new(pinch * 0.5, -0.1, 0.0);
        points
    }
}

impl LandmarkSource for MouseHand {
    fn load(&mut self) -> Result<(), GestureError> {
        Ok(())
    }

    fn poll(&mut self) -> Result<LandmarkPoll, GestureError> {
        let (cursor, fresh) = self.cursor.latest();
        if !fresh {
            return Ok(LandmarkPoll::Pending);
        }
        Ok(match *cursor {
            Some(c) => LandmarkPoll::Hand(Self::landmarks(c)),
            None => LandmarkPoll::NoHand,
        })
    }
}

/// Start the simulated tracker. Returns the cursor cell to feed from window
/// events and the tracker's output cells.
pub fn start_mouse_tracker() -> std::io::Result<(CursorCell, GestureFeed)> {
    let (cursor_tx, cursor_rx) = publish_cell(None);
    let tracker = GestureTracker::new(MouseHand { cursor: cursor_rx });
    let feed = spawn_tracker(tracker, POLL_INTERVAL)?;
    log::info!("hand tracking simulated from the mouse cursor");
    Ok((cursor_tx, feed))
}

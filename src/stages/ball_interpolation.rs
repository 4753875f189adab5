//! Fills ball detection gaps so every frame has exactly one ball.

use nalgebra::Vector2;
use tracing::{info, warn};

use crate::ledger::{BALL_ID, ObjectClass, Rect, Track, TrackLedger};
use crate::stages::{CameraTrajectory, PerspectiveTransformer};

/// Fill a gappy box series.
///
/// Interior gaps are linearly interpolated between the nearest observations on either
/// side; leading gaps copy the first observation and trailing gaps copy the last.
/// Returns `None` when nothing was observed at all.
pub fn interpolate_boxes(series: &[Option<Rect>]) -> Option<Vec<Rect>> {
    let known: Vec<(usize, Rect)> = series
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.map(|r| (i, r)))
        .collect();
    let (&(first_idx, first), &(_, last)) = (known.first()?, known.last()?);

    let mut filled = Vec::with_capacity(series.len());
    filled.extend(std::iter::repeat_n(first, first_idx));

    for pair in known.windows(2) {
        let (start_idx, start) = pair[0];
        let (end_idx, end) = pair[1];
        let span = (end_idx - start_idx) as f32;
        for i in start_idx..end_idx {
            filled.push(start.lerp(&end, (i - start_idx) as f32 / span));
        }
    }

    filled.extend(std::iter::repeat_n(last, series.len() - filled.len()));
    Some(filled)
}

/// Replace the ledger's ball tracks with a gap-free series under [`BALL_ID`].
///
/// Frames that already had a ball keep its track state. Filled frames get a fresh
/// track at the interpolated box, compensated with the frame's camera offset and
/// projected onto the pitch like every observed track. A ledger with no ball at all is
/// left untouched.
pub fn interpolate_ball(
    ledger: &mut TrackLedger,
    trajectory: &CameraTrajectory,
    transformer: &PerspectiveTransformer,
) {
    let series: Vec<Option<Rect>> = ledger
        .frames()
        .iter()
        .map(|frame| frame.ball().map(|t| t.bbox))
        .collect();
    let observed = series.iter().filter(|b| b.is_some()).count();

    let Some(filled) = interpolate_boxes(&series) else {
        if !ledger.is_empty() {
            warn!(frames = ledger.len(), "ball never detected; nothing to interpolate");
        }
        return;
    };

    for (index, (frame, bbox)) in ledger.frames_mut().iter_mut().zip(filled).enumerate() {
        let existing = frame.ball().filter(|t| t.bbox == bbox).cloned();
        let track = existing.unwrap_or_else(|| {
            let mut track = Track::new(ObjectClass::Ball, bbox);
            let offset = trajectory.offset(index).unwrap_or_else(Vector2::zeros);
            let adjusted = track.position - offset;
            track.position_adjusted = Some(adjusted);
            track.position_transformed = transformer.project(adjusted);
            track
        });
        frame.ball.clear();
        frame.ball.insert(BALL_ID, track);
    }
    info!(frames = ledger.len(), observed, "ball trajectory interpolated");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PerspectiveConfig;
    use crate::ledger::FrameDetections;
    use nalgebra::Point2;

    fn ball(x: f32) -> Rect {
        Rect::from_xywh(x, x / 2.0, 4.0, 4.0)
    }

    #[test]
    fn test_interior_gap_is_linear() {
        let mut series = vec![None; 11];
        series[0] = Some(ball(0.0));
        series[10] = Some(ball(100.0));

        let filled = interpolate_boxes(&series).unwrap();
        assert_eq!(filled.len(), 11);
        for (i, rect) in filled.iter().enumerate() {
            let expected = ball(i as f32 * 10.0);
            for (a, b) in rect.to_tlbr().iter().zip(expected.to_tlbr()) {
                assert!((a - b).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_edges_hold_boundary_values() {
        let series = vec![None, None, Some(ball(10.0)), None, Some(ball(30.0)), None];
        let filled = interpolate_boxes(&series).unwrap();
        assert_eq!(filled[0], ball(10.0));
        assert_eq!(filled[1], ball(10.0));
        assert_eq!(filled[3], ball(20.0));
        assert_eq!(filled[5], ball(30.0));
    }

    #[test]
    fn test_no_observation() {
        assert!(interpolate_boxes(&[None, None]).is_none());
        assert_eq!(interpolate_boxes(&[]), None);
    }

    /// Pixels map one-to-one onto a 200x100 meter field.
    fn identity_transformer() -> PerspectiveTransformer {
        PerspectiveTransformer::new(&PerspectiveConfig {
            pixel_corners: [[0.0, 100.0], [0.0, 0.0], [200.0, 0.0], [200.0, 100.0]],
            court_length: 200.0,
            court_width: 100.0,
        })
        .unwrap()
    }

    #[test]
    fn test_ledger_gets_one_ball_per_frame() {
        let mut frames = vec![FrameDetections::default(); 4];
        frames[1].ball.insert(7, ball(10.0));
        let mut ledger = TrackLedger::from_detections(&frames);

        interpolate_ball(&mut ledger, &CameraTrajectory::stationary(4), &identity_transformer());
        for frame in ledger.frames() {
            assert_eq!(frame.ball.len(), 1);
            assert_eq!(frame.ball[&BALL_ID].bbox, ball(10.0));
        }
    }

    #[test]
    fn test_filled_ball_gets_pitch_position() {
        let mut frames = vec![FrameDetections::default(); 3];
        frames[0].ball.insert(BALL_ID, Rect::from_xywh(40.0, 50.0, 4.0, 4.0));
        frames[2].ball.insert(BALL_ID, Rect::from_xywh(80.0, 50.0, 4.0, 4.0));
        let mut ledger = TrackLedger::from_detections(&frames);
        let trajectory = CameraTrajectory::from_displacements(vec![
            Vector2::zeros(),
            Vector2::new(10.0, 0.0),
            Vector2::zeros(),
        ]);

        interpolate_ball(&mut ledger, &trajectory, &identity_transformer());

        let filled = ledger.track(1, ObjectClass::Ball, BALL_ID).unwrap();
        assert_eq!(filled.position, Point2::new(60.0, 50.0));
        assert_eq!(filled.position_adjusted, Some(Point2::new(50.0, 50.0)));
        let pitch = filled.position_transformed.unwrap();
        assert!((pitch.x - 50.0).abs() < 1e-3 && (pitch.y - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_filled_ball_off_pitch_has_no_pitch_position() {
        let mut frames = vec![FrameDetections::default(); 2];
        frames[0].ball.insert(BALL_ID, Rect::from_xywh(150.0, 50.0, 4.0, 4.0));
        let mut ledger = TrackLedger::from_detections(&frames);
        // Camera pans so far that the held ball falls left of the calibrated area.
        let trajectory = CameraTrajectory::from_displacements(vec![
            Vector2::zeros(),
            Vector2::new(300.0, 0.0),
        ]);

        interpolate_ball(&mut ledger, &trajectory, &identity_transformer());

        let filled = ledger.track(1, ObjectClass::Ball, BALL_ID).unwrap();
        assert_eq!(filled.position_adjusted, Some(Point2::new(-150.0, 50.0)));
        assert!(filled.position_transformed.is_none());
    }
}

//! Jersey-color team classification with a sticky per-identity cache.

use std::collections::HashMap;

use ndarray::Array2;
use tracing::{debug, info, warn};

use crate::config::TeamConfig;
use crate::error::{Error, Result};
use crate::ledger::{FrameTracks, ObjectClass, ObjectId, Rect, Rgb, Team, TrackLedger};
use crate::vision::{FrameImage, crop_pixels, two_means};

/// Per-run team classifier.
///
/// Owns the two team color centroids (fixed after [`calibrate`](Self::calibrate)) and
/// the identity-to-team cache. An identity keeps its first assigned team for the rest
/// of the run; create a new classifier for every video.
#[derive(Debug, Clone)]
pub struct TeamClassifier {
    config: TeamConfig,
    colors: Option<[Rgb; 2]>,
    assignments: HashMap<(ObjectClass, ObjectId), Team>,
}

impl TeamClassifier {
    pub fn new(config: TeamConfig) -> Self {
        Self {
            config,
            colors: None,
            assignments: HashMap::new(),
        }
    }

    fn classes(&self) -> &'static [ObjectClass] {
        if self.config.classify_referees {
            &[ObjectClass::Player, ObjectClass::Referee]
        } else {
            &[ObjectClass::Player]
        }
    }

    /// Dominant jersey color of the person in `bbox`.
    ///
    /// The upper half of the box is split into two color clusters; the smaller one is
    /// the shirt, the larger one is the pitch showing around it.
    pub fn jersey_color(&self, frame: &FrameImage, bbox: &Rect) -> Option<Rgb> {
        let pixels = crop_pixels(frame, &bbox.upper_half());
        let clusters = two_means(&pixels, self.config.kmeans_iterations)?;
        let jersey = clusters.centroids.row(clusters.minority());
        Some(Rgb::from_slice(jersey.as_slice()?))
    }

    /// Derive the two team colors from the players of the first frame.
    ///
    /// Once calibrated, later calls return the existing colors unchanged.
    pub fn calibrate(&mut self, frame: &FrameImage, tracks: &FrameTracks) -> Result<[Rgb; 2]> {
        if let Some(colors) = self.colors {
            return Ok(colors);
        }

        let mut samples: Vec<f32> = Vec::new();
        let mut skipped = 0usize;
        for &class in self.classes() {
            for track in tracks.class(class).values() {
                match self.jersey_color(frame, &track.bbox) {
                    Some(c) => samples.extend([c.r, c.g, c.b]),
                    None => skipped += 1,
                }
            }
        }
        if skipped > 0 {
            warn!(skipped, "players without usable jersey pixels in calibration frame");
        }

        let count = samples.len() / 3;
        if count < 2 {
            return Err(Error::team_calibration(format!(
                "need at least two player colors, found {count}"
            )));
        }
        let samples = Array2::from_shape_vec((count, 3), samples)
            .map_err(|e| Error::team_calibration(e.to_string()))?;
        let clusters = two_means(&samples, self.config.kmeans_iterations)
            .ok_or_else(|| Error::team_calibration("empty color set"))?;

        let color = |k: usize| {
            Rgb::new(
                clusters.centroids[[k, 0]],
                clusters.centroids[[k, 1]],
                clusters.centroids[[k, 2]],
            )
        };
        let colors = [color(0), color(1)];
        info!(players = count, team1 = ?colors[0], team2 = ?colors[1], "team colors calibrated");

        self.colors = Some(colors);
        Ok(colors)
    }

    pub fn team_colors(&self) -> Option<[Rgb; 2]> {
        self.colors
    }

    pub fn color_of(&self, team: Team) -> Option<Rgb> {
        self.colors.map(|c| match team {
            Team::One => c[0],
            Team::Two => c[1],
        })
    }

    /// Previously assigned team of an identity, if any.
    pub fn cached(&self, class: ObjectClass, id: ObjectId) -> Option<Team> {
        self.assignments.get(&(class, id)).copied()
    }

    /// Team of identity `id`, classifying and caching it on first sight.
    ///
    /// Returns `None` before calibration, for the ball, and when the box has no pixels
    /// inside the frame (nothing is cached in that case).
    pub fn team_for(
        &mut self,
        frame: &FrameImage,
        class: ObjectClass,
        id: ObjectId,
        bbox: &Rect,
    ) -> Option<Team> {
        if let Some(team) = self.cached(class, id) {
            return Some(team);
        }
        if !self.classes().contains(&class) {
            return None;
        }
        let colors = self.colors?;
        let jersey = self.jersey_color(frame, bbox)?;

        let nearest = usize::from(jersey.distance(&colors[1]) < jersey.distance(&colors[0]));
        let team = Team::from_cluster(nearest);
        debug!(?class, id, %team, "identity assigned");
        self.assignments.insert((class, id), team);
        Some(team)
    }

    /// Calibrate on frame 0, then set `team` and `team_color` on every eligible track.
    pub fn classify_ledger(
        &mut self,
        frames: &[FrameImage],
        ledger: &mut TrackLedger,
    ) -> Result<()> {
        if frames.len() != ledger.len() {
            return Err(Error::FrameCountMismatch {
                frames: frames.len(),
                ledger: ledger.len(),
            });
        }
        let (Some(first_image), Some(first_tracks)) = (frames.first(), ledger.frame(0)) else {
            return Ok(());
        };
        self.calibrate(first_image, first_tracks)?;

        for (image, frame) in frames.iter().zip(ledger.frames_mut()) {
            for &class in self.classes() {
                for (&id, track) in frame.class_mut(class).iter_mut() {
                    if let Some(team) = self.team_for(image, class, id, &track.bbox) {
                        track.team = Some(team);
                        track.team_color = self.color_of(team);
                    }
                }
            }
        }
        info!(identities = self.assignments.len(), "teams assigned");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::FrameDetections;
    use ndarray::Array3;

    const GRASS: [u8; 3] = [30, 140, 40];
    const RED: [u8; 3] = [220, 20, 20];
    const BLUE: [u8; 3] = [20, 30, 210];

    fn paint(frame: &mut FrameImage, x: usize, y: usize, w: usize, h: usize, rgb: [u8; 3]) {
        for yy in y..y + h {
            for xx in x..x + w {
                for c in 0..3 {
                    frame[[yy, xx, c]] = rgb[c];
                }
            }
        }
    }

    /// Player boxes are 20x40; the jersey is a 10x10 patch in the upper half.
    fn scene(players: &[(ObjectId, usize, [u8; 3])]) -> (FrameImage, FrameDetections) {
        let mut frame = Array3::from_shape_fn((100, 200, 3), |(_, _, c)| GRASS[c]);
        let mut det = FrameDetections::default();
        for &(id, x, color) in players {
            paint(&mut frame, x + 5, 25, 10, 10, color);
            det.players
                .insert(id, Rect::from_tlbr(x as f32, 20.0, x as f32 + 20.0, 60.0));
        }
        (frame, det)
    }

    #[test]
    fn test_jersey_color_is_minority_cluster() {
        let (frame, _) = scene(&[(1, 10, RED)]);
        let classifier = TeamClassifier::new(TeamConfig::default());
        let color = classifier
            .jersey_color(&frame, &Rect::from_tlbr(10.0, 20.0, 30.0, 60.0))
            .unwrap();
        assert_eq!(color.to_u8(), RED);
    }

    #[test]
    fn test_calibrate_and_classify() {
        let (frame, det) = scene(&[(1, 10, RED), (2, 50, BLUE), (3, 90, RED), (4, 130, BLUE)]);
        let tracks = FrameTracks::from_detections(&det);
        let mut classifier = TeamClassifier::new(TeamConfig::default());
        let colors = classifier.calibrate(&frame, &tracks).unwrap();
        assert_eq!(colors[0].to_u8(), RED);
        assert_eq!(colors[1].to_u8(), BLUE);

        let bbox = |x: f32| Rect::from_tlbr(x, 20.0, x + 20.0, 60.0);
        let player = ObjectClass::Player;
        assert_eq!(classifier.team_for(&frame, player, 1, &bbox(10.0)), Some(Team::One));
        assert_eq!(classifier.team_for(&frame, player, 2, &bbox(50.0)), Some(Team::Two));
    }

    #[test]
    fn test_assignment_is_sticky() {
        let (frame, det) = scene(&[(1, 10, RED), (2, 50, BLUE)]);
        let tracks = FrameTracks::from_detections(&det);
        let mut classifier = TeamClassifier::new(TeamConfig::default());
        classifier.calibrate(&frame, &tracks).unwrap();

        let on_red = Rect::from_tlbr(10.0, 20.0, 30.0, 60.0);
        let first = classifier.team_for(&frame, ObjectClass::Player, 1, &on_red);
        // Same identity now standing on a blue jersey: cached team wins.
        let on_blue = Rect::from_tlbr(50.0, 20.0, 70.0, 60.0);
        let second = classifier.team_for(&frame, ObjectClass::Player, 1, &on_blue);
        assert_eq!(first, Some(Team::One));
        assert_eq!(first, second);
    }

    #[test]
    fn test_referees_excluded_by_default() {
        let (frame, det) = scene(&[(1, 10, RED), (2, 50, BLUE)]);
        let mut classifier = TeamClassifier::new(TeamConfig::default());
        classifier.calibrate(&frame, &FrameTracks::from_detections(&det)).unwrap();
        let bbox = Rect::from_tlbr(10.0, 20.0, 30.0, 60.0);
        assert_eq!(classifier.team_for(&frame, ObjectClass::Referee, 9, &bbox), None);
        assert_eq!(classifier.team_for(&frame, ObjectClass::Ball, 1, &bbox), None);

        let mut with_refs = TeamClassifier::new(TeamConfig {
            classify_referees: true,
            ..TeamConfig::default()
        });
        with_refs.calibrate(&frame, &FrameTracks::from_detections(&det)).unwrap();
        assert_eq!(with_refs.team_for(&frame, ObjectClass::Referee, 9, &bbox), Some(Team::One));
    }

    #[test]
    fn test_calibration_needs_two_players() {
        let (frame, det) = scene(&[(1, 10, RED)]);
        let mut classifier = TeamClassifier::new(TeamConfig::default());
        let err = classifier
            .calibrate(&frame, &FrameTracks::from_detections(&det))
            .unwrap_err();
        assert!(matches!(err, Error::TeamCalibration(_)));
        assert!(classifier.team_colors().is_none());
    }

    #[test]
    fn test_classify_ledger_sets_team_and_color() {
        let (frame, det) = scene(&[(1, 10, RED), (2, 50, BLUE)]);
        let mut ledger = TrackLedger::from_detections(&[det.clone(), det]);
        let frames = vec![frame.clone(), frame];
        let mut classifier = TeamClassifier::new(TeamConfig::default());
        classifier.classify_ledger(&frames, &mut ledger).unwrap();

        for frame in ledger.frames() {
            assert_eq!(frame.players[&1].team, Some(Team::One));
            assert_eq!(frame.players[&2].team, Some(Team::Two));
            assert_eq!(frame.players[&2].team_color.map(|c| c.to_u8()), Some(BLUE));
        }
        assert!(classifier.classify_ledger(&frames[..1], &mut ledger).is_err());
    }
}

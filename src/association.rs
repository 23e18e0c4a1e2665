use nalgebra as na;

use crate::bbox::BBox;
use crate::config::TrackerConfig;
use crate::detection::Detection;

/// Predicted geometry of one live track entering an assignment pass.
#[derive(Debug, Clone, Copy)]
pub struct TrackView {
    pub bbox: BBox,
}

impl TrackView {
    #[inline]
    pub fn centroid(&self) -> na::Point2<f32> {
        self.bbox.centroid()
    }
}

/// Accepted (track, detection) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub track_idx: usize,
    pub detection_idx: usize,
    pub distance: f32,
}

// Ephemeral candidate pair; lives only inside one associate() call.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    track_idx: usize,
    detection_idx: usize,
    distance: f32,
}

/// Per-frame assignment of detections to tracks.
///
/// Postconditions: each track appears in at most one match, and so does
/// each detection. Implementations may differ in optimality, not in the
/// contract.
pub trait Associator {
    fn associate(&self, tracks: &[TrackView], detections: &[Detection]) -> Vec<Match>;
}

/// Greedy nearest-candidate matching on centroid distance.
///
/// All O(T×D) pairs are sorted ascending by distance and accepted
/// first-come. Not globally optimal, but per-camera object counts are
/// small and the gates loose enough that a minimum-cost solver would
/// rarely change the outcome.
#[derive(Debug, Clone)]
pub struct GreedyAssociator {
    max_distance: f32,
    min_iou: f32,
}

impl GreedyAssociator {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            max_distance: config.max_association_distance,
            min_iou: config.min_iou,
        }
    }
}

impl Associator for GreedyAssociator {
    fn associate(&self, tracks: &[TrackView], detections: &[Detection]) -> Vec<Match> {
        let mut candidates = Vec::with_capacity(tracks.len() * detections.len());

        for (track_idx, track) in tracks.iter().enumerate() {
            let centroid = track.centroid();
            for (detection_idx, detection) in detections.iter().enumerate() {
                candidates.push(Candidate {
                    track_idx,
                    detection_idx,
                    distance: na::distance(&centroid, &detection.centroid()),
                });
            }
        }

        // Stable sort keeps track-then-detection enumeration order on ties.
        candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let mut track_used = vec![false; tracks.len()];
        let mut detection_used = vec![false; detections.len()];
        let mut matches = Vec::new();

        for cand in candidates {
            if cand.distance > self.max_distance {
                break;
            }
            if track_used[cand.track_idx] || detection_used[cand.detection_idx] {
                continue;
            }

            // The distance override keeps fast-moving small objects
            // associated even when their boxes no longer overlap.
            let iou = tracks[cand.track_idx]
                .bbox
                .iou(&detections[cand.detection_idx].bbox);
            if iou < self.min_iou && cand.distance > self.max_distance / 2.0 {
                continue;
            }

            track_used[cand.track_idx] = true;
            detection_used[cand.detection_idx] = true;
            matches.push(Match {
                track_idx: cand.track_idx,
                detection_idx: cand.detection_idx,
                distance: cand.distance,
            });
        }

        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(x: f32, y: f32, w: f32, h: f32) -> TrackView {
        TrackView {
            bbox: BBox::ltwh(x, y, w, h),
        }
    }

    fn det(x: f32, y: f32, w: f32, h: f32) -> Detection {
        Detection {
            camera_id: "CAM-1".into(),
            class: 0,
            label: "person".into(),
            confidence: 0.8,
            bbox: BBox::ltwh(x, y, w, h),
            timestamp_ms: 1_000,
        }
    }

    fn associator() -> GreedyAssociator {
        GreedyAssociator::new(&TrackerConfig::default())
    }

    #[test]
    fn nearest_detection_wins() {
        let tracks = [view(45.0, 45.0, 10.0, 10.0)];
        let detections = [det(300.0, 300.0, 10.0, 10.0), det(47.0, 47.0, 10.0, 10.0)];

        let matches = associator().associate(&tracks, &detections);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].track_idx, 0);
        assert_eq!(matches[0].detection_idx, 1);
    }

    #[test]
    fn each_side_consumed_at_most_once() {
        let tracks = [view(0.0, 0.0, 10.0, 10.0), view(2.0, 0.0, 10.0, 10.0)];
        let detections = [det(1.0, 0.0, 10.0, 10.0)];

        let matches = associator().associate(&tracks, &detections);
        assert_eq!(matches.len(), 1);

        let tracks = [view(0.0, 0.0, 10.0, 10.0)];
        let detections = [det(1.0, 0.0, 10.0, 10.0), det(2.0, 0.0, 10.0, 10.0)];

        let matches = associator().associate(&tracks, &detections);
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn ties_resolve_in_enumeration_order() {
        // Both detections sit at the same distance from the track.
        let tracks = [view(0.0, 0.0, 10.0, 10.0)];
        let detections = [det(4.0, 0.0, 10.0, 10.0), det(-4.0, 0.0, 10.0, 10.0)];

        let matches = associator().associate(&tracks, &detections);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].detection_idx, 0);
    }

    #[test]
    fn beyond_max_distance_is_rejected() {
        let tracks = [view(0.0, 0.0, 10.0, 10.0)];
        let detections = [det(200.0, 0.0, 10.0, 10.0)];

        assert!(associator().associate(&tracks, &detections).is_empty());
    }

    #[test]
    fn distance_override_accepts_non_overlapping_boxes() {
        // 60 px apart: zero IoU, but within max_distance / 2.
        let tracks = [view(0.0, 0.0, 10.0, 10.0)];
        let detections = [det(60.0, 0.0, 10.0, 10.0)];

        let matches = associator().associate(&tracks, &detections);
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn distant_non_overlapping_boxes_need_iou() {
        // 100 px apart: inside max_distance but past the override, IoU 0.
        let tracks = [view(0.0, 0.0, 10.0, 10.0)];
        let detections = [det(100.0, 0.0, 10.0, 10.0)];

        assert!(associator().associate(&tracks, &detections).is_empty());
    }

    #[test]
    fn overlapping_boxes_accepted_past_override_distance() {
        // Big boxes 100 px apart still overlap heavily.
        let tracks = [view(0.0, 0.0, 300.0, 300.0)];
        let detections = [det(100.0, 0.0, 300.0, 300.0)];

        let matches = associator().associate(&tracks, &detections);
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn empty_inputs_produce_no_matches() {
        assert!(associator().associate(&[], &[]).is_empty());
        assert!(associator()
            .associate(&[view(0.0, 0.0, 1.0, 1.0)], &[])
            .is_empty());
    }
}

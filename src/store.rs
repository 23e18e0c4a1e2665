use tracing::debug;

use crate::association::{Associator, GreedyAssociator};
use crate::config::TrackerConfig;
use crate::detection::Detection;
use crate::filter::VelocityFilter;
use crate::track::{Snapshot, Track};

/// All live tracks for one camera, plus its id counter.
///
/// Owned behind the per-camera lock in the registry; every method here
/// assumes exclusive access and does no synchronization of its own.
pub struct CameraTracks {
    camera_id: String,
    tracks: Vec<Track>,
    next_id: u64,
    config: TrackerConfig,
    associator: GreedyAssociator,
}

impl CameraTracks {
    pub fn new(camera_id: impl Into<String>, config: TrackerConfig) -> Self {
        let associator = GreedyAssociator::new(&config);
        Self {
            camera_id: camera_id.into(),
            tracks: Vec::new(),
            next_id: 1,
            config,
            associator,
        }
    }

    #[inline]
    pub fn camera_id(&self) -> &str {
        &self.camera_id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Run one full tracking step for a frame's detections and return the
    /// post-frame snapshot of every surviving track.
    ///
    /// The order is fixed: predict all tracks forward, associate, apply
    /// matched detections, open new tracks for the rest, then evict tracks
    /// whose update gap exceeded the TTL. Ids of evicted tracks are never
    /// reissued.
    pub fn process_frame(&mut self, detections: &[Detection], now_ms: i64) -> Vec<Snapshot> {
        for track in &mut self.tracks {
            track.predict(now_ms);
        }

        let views: Vec<_> = self.tracks.iter().map(Track::view).collect();
        let matches = self.associator.associate(&views, detections);

        let mut detection_matched = vec![false; detections.len()];
        for m in &matches {
            // A match against a track that already outlived its TTL would
            // resurrect an id the caller has seen evicted. Leave the
            // detection unmatched instead so it opens a fresh track.
            if self.tracks[m.track_idx].is_stale(now_ms, self.config.ttl_ms) {
                continue;
            }
            self.tracks[m.track_idx].apply(&detections[m.detection_idx], now_ms);
            detection_matched[m.detection_idx] = true;
        }

        for (idx, detection) in detections.iter().enumerate() {
            if detection_matched[idx] {
                continue;
            }
            let id = self.next_id;
            self.next_id += 1;

            let filter =
                VelocityFilter::new(self.config.process_noise, self.config.measurement_noise);
            let mut track = Track::new(id, Box::new(filter));
            track.apply(detection, now_ms);

            debug!(
                camera = %self.camera_id,
                track = id,
                label = %detection.label,
                "opened track"
            );
            self.tracks.push(track);
        }

        let ttl = self.config.ttl_ms;
        let before = self.tracks.len();
        self.tracks.retain(|t| !t.is_stale(now_ms, ttl));
        if self.tracks.len() < before {
            debug!(
                camera = %self.camera_id,
                evicted = before - self.tracks.len(),
                "evicted stale tracks"
            );
        }

        self.tracks.iter().map(Track::snapshot).collect()
    }

    /// Snapshot of tracks still within their TTL, without advancing state.
    pub fn active_tracks(&self, now_ms: i64) -> Vec<Snapshot> {
        self.tracks
            .iter()
            .filter(|t| !t.is_stale(now_ms, self.config.ttl_ms))
            .map(Track::snapshot)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use approx::assert_relative_eq;

    fn det(x: f32, y: f32, ts: i64) -> Detection {
        Detection {
            camera_id: "CAM-1".into(),
            class: 0,
            label: "person".into(),
            confidence: 0.9,
            bbox: BBox::ltwh(x, y, 30.0, 60.0),
            timestamp_ms: ts,
        }
    }

    fn store() -> CameraTracks {
        CameraTracks::new("CAM-1", TrackerConfig::default())
    }

    #[test]
    fn first_detection_opens_one_track_with_zero_velocity() {
        let mut s = store();
        let snaps = s.process_frame(&[det(100.0, 50.0, 1_000)], 1_000);

        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].id, 1);
        assert_eq!(snaps[0].bbox, BBox::ltwh(100.0, 50.0, 30.0, 60.0));
        assert_relative_eq!(snaps[0].vx, 0.0);
        assert_relative_eq!(snaps[0].vy, 0.0);
    }

    #[test]
    fn nearby_detection_keeps_the_same_id() {
        let mut s = store();
        s.process_frame(&[det(100.0, 50.0, 1_000)], 1_000);
        let snaps = s.process_frame(&[det(105.0, 50.0, 1_033)], 1_033);

        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].id, 1);
        assert!(snaps[0].vx > 0.0);
    }

    #[test]
    fn distant_detection_opens_a_second_track() {
        let mut s = store();
        s.process_frame(&[det(100.0, 50.0, 1_000)], 1_000);
        let snaps = s.process_frame(&[det(100.0, 50.0, 1_033), det(600.0, 400.0, 1_033)], 1_033);

        assert_eq!(snaps.len(), 2);
        let ids: Vec<_> = snaps.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn ids_are_unique_within_a_frame() {
        let mut s = store();
        let snaps = s.process_frame(
            &[det(0.0, 0.0, 1_000), det(500.0, 0.0, 1_000), det(0.0, 500.0, 1_000)],
            1_000,
        );

        let mut ids: Vec<_> = snaps.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn stale_track_is_evicted_and_its_id_never_reused() {
        let mut s = store();
        s.process_frame(&[det(100.0, 50.0, 1_000)], 1_000);

        // Past the 2s TTL with no matching detection.
        let snaps = s.process_frame(&[], 3_500);
        assert!(snaps.is_empty());

        // Same spot again: new identity, not id 1.
        let snaps = s.process_frame(&[det(100.0, 50.0, 3_600)], 3_600);
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].id, 2);
    }

    #[test]
    fn empty_frame_ages_tracks_without_evicting_fresh_ones() {
        let mut s = store();
        s.process_frame(&[det(100.0, 50.0, 1_000)], 1_000);

        let snaps = s.process_frame(&[], 1_500);
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].id, 1);
    }

    #[test]
    fn active_tracks_filters_stale_without_mutating() {
        let mut s = store();
        s.process_frame(&[det(100.0, 50.0, 1_000)], 1_000);

        assert_eq!(s.active_tracks(1_500).len(), 1);
        assert!(s.active_tracks(10_000).is_empty());
        // The read-only query must not have evicted anything.
        assert_eq!(s.len(), 1);
    }
}

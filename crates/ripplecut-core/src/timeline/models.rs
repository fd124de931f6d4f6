//! Timeline Model Definitions
//!
//! Defines Timeline, Track, Clip and related types. The timeline is the
//! single editing document: plain owned containers with explicit mutation
//! methods, no observers embedded in the data types.

use serde::{Deserialize, Serialize};

use crate::filters::Filter;
use crate::{ClipId, Color, CoreError, CoreResult, MarkerId, Ratio, TimeRange, TimeSec, TrackId};

/// Tolerance used when comparing edit points for adjacency.
pub const TIME_EPSILON: TimeSec = 1e-9;

// =============================================================================
// Marker
// =============================================================================

/// Timeline marker
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: MarkerId,
    pub time_sec: TimeSec,
    pub name: String,
    /// Chapter markers are exported as chapter points by interchange tools.
    pub is_chapter: bool,
    pub color: Color,
}

impl Marker {
    pub fn new(time_sec: TimeSec, name: &str) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            time_sec,
            name: name.to_string(),
            is_chapter: false,
            color: Color::rgb(1.0, 0.8, 0.0), // Yellow
        }
    }

    pub fn chapter(time_sec: TimeSec, name: &str) -> Self {
        Self {
            is_chapter: true,
            ..Self::new(time_sec, name)
        }
    }
}

// =============================================================================
// Clip Range and Placement
// =============================================================================

/// Clip trim window within the source media
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRange {
    /// Start time within source (seconds)
    pub source_in_sec: TimeSec,
    /// End time within source (seconds)
    pub source_out_sec: TimeSec,
}

impl SourceRange {
    pub fn new(source_in: TimeSec, source_out: TimeSec) -> Self {
        Self {
            source_in_sec: source_in,
            source_out_sec: source_out,
        }
    }

    /// Returns the duration of the window
    pub fn duration(&self) -> TimeSec {
        self.source_out_sec - self.source_in_sec
    }
}

impl Default for SourceRange {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Clip placement on the timeline
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipPlace {
    /// Start time on timeline (seconds)
    pub timeline_in_sec: TimeSec,
    /// Duration on timeline (seconds) - may differ from source due to speed
    pub duration_sec: TimeSec,
}

impl ClipPlace {
    pub fn new(timeline_in: TimeSec, duration: TimeSec) -> Self {
        Self {
            timeline_in_sec: timeline_in,
            duration_sec: duration,
        }
    }

    /// Returns the end time on timeline
    pub fn timeline_out_sec(&self) -> TimeSec {
        self.timeline_in_sec + self.duration_sec
    }

    /// Checks if this placement overlaps with another
    pub fn overlaps(&self, other: &ClipPlace) -> bool {
        self.timeline_in_sec < other.timeline_out_sec()
            && self.timeline_out_sec() > other.timeline_in_sec
    }

    /// Checks if a time point is within this placement
    pub fn contains(&self, time_sec: TimeSec) -> bool {
        time_sec >= self.timeline_in_sec && time_sec <= self.timeline_out_sec()
    }
}

impl Default for ClipPlace {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

// =============================================================================
// Clip
// =============================================================================

/// Clip (a placed, trimmed reference to a media source on a track)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: ClipId,
    pub name: String,
    /// Opaque reference to external media; empty for generated content
    /// such as text titles.
    pub source_path: String,
    /// Trim window within the source
    pub range: SourceRange,
    /// Placement on the timeline
    pub place: ClipPlace,
    /// Total available source length; 0 for generated content, meaning
    /// unconstrained.
    pub source_duration_sec: TimeSec,
    /// Playback speed (1.0 = normal)
    pub speed: f64,
    /// Consumed only by the export planner.
    pub preserve_pitch: bool,
    /// Linear gain (1.0 = unity)
    pub volume: f32,
    /// Synthetic zero-motion clip produced by freeze-frame insertion.
    pub is_freeze_frame: bool,
    /// Source offset held when `is_freeze_frame` is set.
    pub freeze_at_sec: TimeSec,
    /// Ordered filter pipeline; order is render order.
    pub filters: Vec<Filter>,
}

impl Clip {
    /// Creates a new clip referencing a media source
    pub fn new(name: &str, source_path: &str) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            name: name.to_string(),
            source_path: source_path.to_string(),
            range: SourceRange::default(),
            place: ClipPlace::default(),
            source_duration_sec: 0.0,
            speed: 1.0,
            preserve_pitch: false,
            volume: 1.0,
            is_freeze_frame: false,
            freeze_at_sec: 0.0,
            filters: vec![],
        }
    }

    /// Creates a clip for generated content (text titles, mattes)
    pub fn generated(name: &str) -> Self {
        Self::new(name, "")
    }

    /// Sets the source trim window and derives the timeline duration from it
    pub fn with_source_range(mut self, source_in: TimeSec, source_out: TimeSec) -> Self {
        self.range = SourceRange::new(source_in, source_out);
        self.place.duration_sec = self.range.duration() / self.speed;
        self
    }

    /// Sets the probe-resolved total source duration
    pub fn with_source_duration(mut self, source_duration: TimeSec) -> Self {
        self.source_duration_sec = source_duration;
        self
    }

    /// Places the clip at a specific timeline position
    pub fn place_at(mut self, timeline_in: TimeSec) -> Self {
        self.place.timeline_in_sec = timeline_in;
        self
    }

    /// Returns the timeline end position
    pub fn timeline_out_sec(&self) -> TimeSec {
        self.place.timeline_out_sec()
    }

    /// Checks if this clip contains the given timeline position
    pub fn contains_time(&self, time_sec: TimeSec) -> bool {
        self.place.contains(time_sec)
    }

    /// Converts a timeline time to source time
    pub fn timeline_to_source(&self, timeline_sec: TimeSec) -> TimeSec {
        let offset = timeline_sec - self.place.timeline_in_sec;
        self.range.source_in_sec + (offset * self.speed)
    }

    /// The timeline duration implied by the trim window and speed.
    ///
    /// Edit operations keep `place.duration_sec` equal to this value, with
    /// the exception of freeze-frame clips whose duration is the hold
    /// duration.
    pub fn expected_duration(&self) -> TimeSec {
        self.range.duration() / self.speed
    }

    /// Deep clones this clip's filter pipeline with fresh filter IDs,
    /// preserving order. Used by copy/paste.
    pub fn cloned_filters(&self) -> Vec<Filter> {
        self.filters.iter().map(|f| f.deep_clone()).collect()
    }

    /// Validates the clip invariants
    pub fn validate(&self) -> CoreResult<()> {
        if !self.place.timeline_in_sec.is_finite() || self.place.timeline_in_sec < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Clip {}: timeline position must be finite and non-negative",
                self.id
            )));
        }
        if !self.place.duration_sec.is_finite() || self.place.duration_sec <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Clip {}: duration must be finite and > 0",
                self.id
            )));
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Clip {}: speed must be finite and > 0",
                self.id
            )));
        }
        if self.range.source_in_sec < 0.0 || self.range.source_in_sec >= self.range.source_out_sec
        {
            return Err(CoreError::InvalidTimeRange(
                self.range.source_in_sec,
                self.range.source_out_sec,
            ));
        }
        if self.source_duration_sec > 0.0
            && self.range.source_out_sec > self.source_duration_sec + TIME_EPSILON
        {
            return Err(CoreError::InsufficientSource {
                clip_id: self.id.clone(),
                needed_sec: self.range.source_out_sec,
                available_sec: self.source_duration_sec,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Track
// =============================================================================

/// Track type/kind enumeration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackKind {
    Video,
    Audio,
    Overlay,
}

/// Blend mode for video tracks
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Add,
}

/// Track (an ordered, non-overlapping sequence of clips of one kind)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    pub kind: TrackKind,
    pub name: String,
    /// Clips ordered by timeline start
    pub clips: Vec<Clip>,
    pub blend_mode: BlendMode,
    pub hidden: bool,
    pub muted: bool,
    pub locked: bool,
    /// Track opacity (0.0 - 1.0)
    pub opacity: f32,
}

impl Track {
    /// Creates a new track with the given name and kind
    pub fn new(name: &str, kind: TrackKind) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            kind,
            name: name.to_string(),
            clips: vec![],
            blend_mode: BlendMode::Normal,
            hidden: false,
            muted: false,
            locked: false,
            opacity: 1.0,
        }
    }

    /// Creates a new video track
    pub fn new_video(name: &str) -> Self {
        Self::new(name, TrackKind::Video)
    }

    /// Creates a new audio track
    pub fn new_audio(name: &str) -> Self {
        Self::new(name, TrackKind::Audio)
    }

    /// Creates a new overlay track
    pub fn new_overlay(name: &str) -> Self {
        Self::new(name, TrackKind::Overlay)
    }

    /// Returns true if this is a video track
    pub fn is_video(&self) -> bool {
        matches!(self.kind, TrackKind::Video | TrackKind::Overlay)
    }

    /// Returns true if this is an audio track
    pub fn is_audio(&self) -> bool {
        matches!(self.kind, TrackKind::Audio)
    }

    /// Sorts clips by timeline start with a deterministic tiebreak on ID
    pub fn sort_clips(&mut self) {
        self.clips.sort_by(|a, b| {
            a.place
                .timeline_in_sec
                .total_cmp(&b.place.timeline_in_sec)
                .then_with(|| a.id.cmp(&b.id))
        });
    }

    /// Inserts a clip keeping timeline order
    pub fn insert_clip_sorted(&mut self, clip: Clip) {
        let idx = self
            .clips
            .binary_search_by(|existing| {
                existing
                    .place
                    .timeline_in_sec
                    .total_cmp(&clip.place.timeline_in_sec)
            })
            .unwrap_or_else(|i| i);
        self.clips.insert(idx, clip);
        // binary_search_by doesn't guarantee stable ordering when keys are
        // equal; overlaps are never allowed but ordering stays deterministic.
        self.sort_clips();
    }

    /// Removes a clip by ID, returning it
    pub fn remove_clip(&mut self, clip_id: &str) -> Option<Clip> {
        self.clips
            .iter()
            .position(|c| c.id == clip_id)
            .map(|pos| self.clips.remove(pos))
    }

    /// Gets a clip by ID
    pub fn get_clip(&self, clip_id: &str) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == clip_id)
    }

    /// Gets a mutable clip by ID
    pub fn get_clip_mut(&mut self, clip_id: &str) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == clip_id)
    }

    /// Returns the index of a clip in timeline order
    pub fn clip_index(&self, clip_id: &str) -> Option<usize> {
        self.clips.iter().position(|c| c.id == clip_id)
    }

    /// Finds the first clip whose placement overlaps `candidate`,
    /// optionally ignoring one clip ID.
    pub fn find_overlap(&self, candidate: &ClipPlace, ignore_clip_id: Option<&str>) -> Option<&Clip> {
        self.clips.iter().find(|existing| {
            if ignore_clip_id.is_some_and(|id| id == existing.id) {
                return false;
            }
            existing.place.overlaps(candidate)
        })
    }

    /// Fails with `ClipOverlap` if `candidate` overlaps any clip on the track
    pub fn validate_no_overlap(
        &self,
        candidate: &ClipPlace,
        ignore_clip_id: Option<&str>,
    ) -> CoreResult<()> {
        if let Some(conflict) = self.find_overlap(candidate, ignore_clip_id) {
            return Err(CoreError::ClipOverlap {
                track_id: self.id.clone(),
                existing_clip_id: conflict.id.clone(),
                new_start: candidate.timeline_in_sec,
                new_end: candidate.timeline_out_sec(),
            });
        }
        Ok(())
    }

    /// Returns true if the clip at `right_idx` starts exactly where the clip
    /// at `left_idx` ends.
    pub fn are_adjacent(&self, left_idx: usize, right_idx: usize) -> bool {
        match (self.clips.get(left_idx), self.clips.get(right_idx)) {
            (Some(left), Some(right)) => {
                (right.place.timeline_in_sec - left.place.timeline_out_sec()).abs() < TIME_EPSILON
            }
            _ => false,
        }
    }

    /// Returns the end time of the last clip, or 0 for an empty track
    pub fn duration(&self) -> TimeSec {
        self.clips
            .iter()
            .map(|c| c.place.timeline_out_sec())
            .fold(0.0, f64::max)
    }
}

// =============================================================================
// Timeline
// =============================================================================

/// Timeline (the editing document: an ordered collection of tracks plus
/// global state)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub id: String,
    pub name: String,
    pub tracks: Vec<Track>,
    /// Frame rate
    pub fps: Ratio,
    /// Derived: max clip end across all tracks. Recalculated after every
    /// structural mutation.
    pub duration_sec: TimeSec,
    /// Loop/selection region
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_region: Option<TimeRange>,
    pub markers: Vec<Marker>,
    pub created_at: String,
    pub modified_at: String,
}

impl Timeline {
    /// Creates a new empty timeline
    pub fn new(name: &str, fps: Ratio) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: ulid::Ulid::new().to_string(),
            name: name.to_string(),
            tracks: vec![],
            fps,
            duration_sec: 0.0,
            loop_region: None,
            markers: vec![],
            created_at: now.clone(),
            modified_at: now,
        }
    }

    /// Updates the modification timestamp
    pub fn touch(&mut self) {
        self.modified_at = chrono::Utc::now().to_rfc3339();
    }

    /// Adds a track to the timeline
    pub fn add_track(&mut self, track: Track) {
        self.tracks.push(track);
        self.recalculate_duration();
        self.touch();
    }

    /// Removes a track by ID, returning it
    pub fn remove_track(&mut self, track_id: &str) -> Option<Track> {
        let removed = self
            .tracks
            .iter()
            .position(|t| t.id == track_id)
            .map(|pos| self.tracks.remove(pos));
        if removed.is_some() {
            self.recalculate_duration();
            self.touch();
        }
        removed
    }

    /// Gets a track by ID
    pub fn get_track(&self, track_id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == track_id)
    }

    /// Gets a mutable track by ID
    pub fn get_track_mut(&mut self, track_id: &str) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == track_id)
    }

    /// Locates a clip anywhere on the timeline as (track index, clip index)
    pub fn find_clip_location(&self, clip_id: &str) -> Option<(usize, usize)> {
        self.tracks.iter().enumerate().find_map(|(t_idx, track)| {
            track.clip_index(clip_id).map(|c_idx| (t_idx, c_idx))
        })
    }

    /// Gets a clip anywhere on the timeline
    pub fn find_clip(&self, clip_id: &str) -> Option<(&Track, &Clip)> {
        let (t_idx, c_idx) = self.find_clip_location(clip_id)?;
        let track = &self.tracks[t_idx];
        Some((track, &track.clips[c_idx]))
    }

    /// Recalculates the derived duration. O(total clips).
    pub fn recalculate_duration(&mut self) {
        self.duration_sec = self.tracks.iter().map(Track::duration).fold(0.0, f64::max);
    }

    /// Adds a marker, keeping markers sorted by time
    pub fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
        self.markers
            .sort_by(|a, b| a.time_sec.total_cmp(&b.time_sec).then_with(|| a.id.cmp(&b.id)));
        self.touch();
    }

    /// Removes a marker by ID, returning it
    pub fn remove_marker(&mut self, marker_id: &str) -> Option<Marker> {
        let removed = self
            .markers
            .iter()
            .position(|m| m.id == marker_id)
            .map(|pos| self.markers.remove(pos));
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    /// Duration of a single frame at the timeline frame rate
    pub fn frame_duration_sec(&self) -> TimeSec {
        let fps = self.fps.as_f64();
        if fps <= 0.0 {
            return 0.0;
        }
        1.0 / fps
    }
}

// =============================================================================
// Tests
// =============================================================================

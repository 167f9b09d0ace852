use crate::model::timeline::{TempoMarker, TimedNoteEvent, Timeline};
use anyhow::anyhow;

/// Seconds per beat used when a sequence never had its tempo set (120bpm).
pub const DEFAULT_SECONDS_PER_BEAT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackId(usize);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub events: Vec<TimedNoteEvent>,
}

/// What the sound engine actually plays: one tempo plus any number of note tracks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequence {
    tempo: Option<TempoMarker>,
    tracks: Vec<Track>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replays a timeline into a fresh sequence with a single track.
    pub fn from_timeline(timeline: &Timeline) -> Self {
        let mut sequence = Self::new();
        let tempo = timeline.tempo();
        sequence.set_tempo(tempo.seconds_per_beat, tempo.at_beat);

        let track = sequence.attach_track();
        for note in timeline.notes() {
            sequence.tracks[track.0].events.push(*note);
        }

        sequence
    }

    pub fn attach_track(&mut self) -> TrackId {
        self.tracks.push(Track::default());
        TrackId(self.tracks.len() - 1)
    }

    pub fn set_tempo(&mut self, seconds_per_beat: f64, at_beat: f64) {
        self.tempo = Some(TempoMarker {
            at_beat,
            seconds_per_beat,
        });
    }

    pub fn add_note_event(&mut self, track: TrackId, event: TimedNoteEvent) -> anyhow::Result<()> {
        let Some(track) = self.tracks.get_mut(track.0) else {
            return Err(anyhow!("No track {} in this sequence..!", track.0));
        };
        track.events.push(event);

        Ok(())
    }

    pub fn seconds_per_beat(&self) -> f64 {
        self.tempo
            .map(|t| t.seconds_per_beat)
            .unwrap_or(DEFAULT_SECONDS_PER_BEAT)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.events.len()).sum()
    }
}

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TimedNoteEvent {
    pub pitch: u8,
    pub start_beat: f64,
    pub duration_beats: f64,
    pub velocity: u8,
    /// 0 means "no particular release velocity".
    pub release_velocity: u8,
    pub channel: u8,
}

impl TimedNoteEvent {
    pub fn end_beat(&self) -> f64 {
        self.start_beat + self.duration_beats
    }
}

/// Tempo expressed the way the sound engine wants it: seconds per beat.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TempoMarker {
    pub at_beat: f64,
    pub seconds_per_beat: f64,
}

impl TempoMarker {
    pub fn from_bpm(tempo_bpm: f64, at_beat: f64) -> Self {
        Self {
            at_beat,
            seconds_per_beat: 60.0 / tempo_bpm,
        }
    }

    pub fn bpm(&self) -> f64 {
        60.0 / self.seconds_per_beat
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum TimelineEvent {
    Tempo(TempoMarker),
    Note(TimedNoteEvent),
}

/// An ordered list of timeline events whose first entry is always the tempo marker.
///
/// Only the timeline builder constructs these (it is `Serialize` only),
/// so the marker-first and non-decreasing `start_beat` orderings hold for every instance.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Timeline {
    pub(crate) events: Vec<TimelineEvent>,
}

impl Timeline {
    pub(crate) fn with_tempo(tempo: TempoMarker, note_capacity: usize) -> Self {
        let mut events = Vec::with_capacity(note_capacity + 1);
        events.push(TimelineEvent::Tempo(tempo));

        Self { events }
    }

    pub(crate) fn push_note(&mut self, note: TimedNoteEvent) {
        self.events.push(TimelineEvent::Note(note));
    }

    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    pub fn tempo(&self) -> TempoMarker {
        match self.events.first() {
            Some(TimelineEvent::Tempo(marker)) => *marker,
            // `with_tempo` always puts the marker first
            _ => TempoMarker::from_bpm(120.0, 0.0),
        }
    }

    pub fn notes(&self) -> impl Iterator<Item = &TimedNoteEvent> {
        self.events.iter().filter_map(|ev| match ev {
            TimelineEvent::Note(note) => Some(note),
            TimelineEvent::Tempo(_) => None,
        })
    }

    /// Tempo marker included.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn end_beat(&self) -> f64 {
        self.notes().map(|n| n.end_beat()).fold(0.0, f64::max)
    }
}

use crate::model::chord::Chord;
use crate::model::timeline::{TempoMarker, TimedNoteEvent, Timeline};
use log::debug;
use thiserror::Error;

pub const DEFAULT_VELOCITY: u8 = 64;
pub const DEFAULT_RELEASE_VELOCITY: u8 = 0;
pub const DEFAULT_CHANNEL: u8 = 0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimelineError {
    /// Tempo must be a finite number of beats per minute greater than zero.
    #[error("Invalid tempo: {0} bpm (must be finite and greater than 0)")]
    InvalidTempo(f64),

    #[error("Unknown chord: '{0}'")]
    UnknownChord(String),
}

/// How far apart consecutive chords are placed, and how long each one sounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChordSpacing {
    /// `1 / tempo_bpm` beats per chord, so faster tempos shrink the chord in beats
    /// on top of shrinking the beat itself.
    #[default]
    Reciprocal,

    /// Each chord lasts exactly one beat regardless of tempo.
    OneBeat,
}

impl ChordSpacing {
    pub fn beats_per_chord(self, tempo_bpm: f64) -> f64 {
        match self {
            ChordSpacing::Reciprocal => 1.0 / tempo_bpm,
            ChordSpacing::OneBeat => 1.0,
        }
    }
}

/// Build a timeline with [`ChordSpacing::Reciprocal`] spacing.
pub fn build(chords: &[Chord], tempo_bpm: f64) -> Result<Timeline, TimelineError> {
    build_with_spacing(chords, tempo_bpm, ChordSpacing::default())
}

/// Lay the chords out one after another, every note of a chord sharing the chord's start beat.
///
/// The result holds one tempo marker at beat 0 followed by one note event per chord note,
/// in the order the chords (and their notes) were given.
pub fn build_with_spacing(
    chords: &[Chord],
    tempo_bpm: f64,
    spacing: ChordSpacing,
) -> Result<Timeline, TimelineError> {
    if !tempo_bpm.is_finite() || tempo_bpm <= 0.0 {
        return Err(TimelineError::InvalidTempo(tempo_bpm));
    }

    let beats_per_chord = spacing.beats_per_chord(tempo_bpm);
    let note_count = chords.iter().map(|c| c.notes.len()).sum();
    let mut timeline = Timeline::with_tempo(TempoMarker::from_bpm(tempo_bpm, 0.0), note_count);

    for (i, chord) in chords.iter().enumerate() {
        // multiply instead of accumulating so chord N lands exactly on N * spacing
        let start_beat = i as f64 * beats_per_chord;

        for &pitch in chord.notes.iter() {
            timeline.push_note(TimedNoteEvent {
                pitch,
                start_beat,
                duration_beats: beats_per_chord,
                velocity: DEFAULT_VELOCITY,
                release_velocity: DEFAULT_RELEASE_VELOCITY,
                channel: DEFAULT_CHANNEL,
            });
        }
    }

    debug!(
        "Built timeline for {} chord(s) at {} bpm: {} event(s), {:.5} beats per chord..!",
        chords.len(),
        tempo_bpm,
        timeline.len(),
        beats_per_chord
    );

    Ok(timeline)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::timeline::TimelineEvent;

    const EPSILON: f64 = 1e-12;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() <= EPSILON
    }

    fn progression() -> Vec<Chord> {
        ["C", "Emin", "F", "G"].into_iter().map(Chord::new).collect()
    }

    #[test]
    fn four_chord_progression() {
        env_logger::try_init().unwrap_or(());

        let timeline = build(&progression(), 120.0).unwrap();
        assert_eq!(timeline.len(), 13);
        assert_eq!(timeline.notes().count(), 12);

        let f_notes: Vec<&TimedNoteEvent> = timeline
            .notes()
            .filter(|n| approx_eq(n.start_beat, 2.0 / 120.0))
            .collect();
        assert_eq!(
            f_notes.iter().map(|n| n.pitch).collect::<Vec<_>>(),
            vec![65, 69, 72]
        );
    }

    #[test]
    fn tempo_marker_leads_the_timeline() {
        for bpm in [60.0, 97.5, 120.0, 200.0] {
            let timeline = build(&progression(), bpm).unwrap();

            match timeline.events()[0] {
                TimelineEvent::Tempo(marker) => {
                    assert_eq!(marker.at_beat, 0.0);
                    assert!(approx_eq(marker.seconds_per_beat, 60.0 / bpm));
                }
                other => panic!("Expected a tempo marker first, got {:?}", other),
            }

            assert_eq!(
                timeline
                    .events()
                    .iter()
                    .filter(|e| matches!(e, TimelineEvent::Tempo(_)))
                    .count(),
                1
            );
        }
    }

    #[test]
    fn notes_follow_chord_index() {
        let bpm = 90.0;
        let chords = progression();
        let timeline = build(&chords, bpm).unwrap();
        let notes: Vec<&TimedNoteEvent> = timeline.notes().collect();

        let mut idx = 0;
        for (i, chord) in chords.iter().enumerate() {
            for &pitch in chord.notes.iter() {
                let note = notes[idx];
                assert_eq!(note.pitch, pitch);
                assert!(approx_eq(note.start_beat, i as f64 / bpm));
                assert!(approx_eq(note.duration_beats, 1.0 / bpm));
                assert_eq!(note.velocity, DEFAULT_VELOCITY);
                assert_eq!(note.release_velocity, 0);
                assert_eq!(note.channel, 0);
                idx += 1;
            }
        }
    }

    #[test]
    fn start_beats_never_decrease() {
        let timeline = build(&progression(), 150.0).unwrap();
        let starts: Vec<f64> = timeline.notes().map(|n| n.start_beat).collect();

        assert!(starts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn event_count_is_one_plus_note_count() {
        let chords = vec![
            Chord::new("Amin"),
            Chord {
                name: String::from("dyad"),
                notes: vec![48, 55],
            },
            Chord {
                name: String::from("seventh"),
                notes: vec![55, 59, 62, 65],
            },
        ];

        let timeline = build(&chords, 100.0).unwrap();
        assert_eq!(timeline.len(), 1 + 3 + 2 + 4);
    }

    #[test]
    fn identical_inputs_build_identical_timelines() {
        let a = build(&progression(), 133.0).unwrap();
        let b = build(&progression(), 133.0).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn no_chords_only_tempo() {
        let timeline = build(&[], 120.0).unwrap();

        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.notes().count(), 0);
        assert!(approx_eq(timeline.tempo().bpm(), 120.0));
        assert_eq!(timeline.end_beat(), 0.0);
    }

    #[test]
    fn rejects_degenerate_tempo() {
        for bpm in [0.0, -0.0, -120.0, f64::NAN, f64::INFINITY] {
            let result = build(&progression(), bpm);
            assert!(
                matches!(result, Err(TimelineError::InvalidTempo(_))),
                "tempo {} should be rejected",
                bpm
            );
        }
    }

    #[test]
    fn one_beat_spacing() {
        let timeline = build_with_spacing(&progression(), 120.0, ChordSpacing::OneBeat).unwrap();
        let starts: Vec<f64> = timeline.notes().map(|n| n.start_beat).collect();

        assert_eq!(
            starts,
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 3.0, 3.0, 3.0]
        );
        assert!(timeline.notes().all(|n| n.duration_beats == 1.0));
        assert_eq!(timeline.end_beat(), 4.0);
    }
}

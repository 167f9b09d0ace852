use crate::timeline_builder::TimelineError;
use serde::{Deserialize, Serialize};

/// C major, handed out whenever a chord name isn't in the table.
pub const DEFAULT_TRIAD: &[u8] = &[60, 64, 67];

// Keys are matched exactly (case-sensitive). Voicing order is root, third, fifth.
const CHORD_TABLE: &[(&str, &[u8])] = &[
    ("C", &[60, 64, 67]),
    ("Cmaj", &[60, 64, 67]),
    ("D", &[62, 66, 69]),
    ("Dmaj", &[62, 66, 69]),
    ("Emin", &[64, 67, 71]),
    ("F", &[65, 69, 72]),
    ("Fmaj", &[65, 69, 72]),
    ("G", &[67, 71, 74]),
    ("Gmaj", &[67, 71, 74]),
    ("Amin", &[69, 72, 76]),
    ("Bdim", &[71, 74, 77]),
];

/// Result of looking a name up without falling back to the default triad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordLookup {
    Found(&'static [u8]),
    NotFound,
}

impl ChordLookup {
    pub fn or_default(self) -> &'static [u8] {
        match self {
            ChordLookup::Found(notes) => notes,
            ChordLookup::NotFound => DEFAULT_TRIAD,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ChordLookup::Found(_))
    }
}

/// Find the voicing for `name`, telling the caller whether it actually exists.
pub fn find(name: &str) -> ChordLookup {
    CHORD_TABLE
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, notes)| ChordLookup::Found(*notes))
        .unwrap_or(ChordLookup::NotFound)
}

/// Return the notes for `name`, or [`DEFAULT_TRIAD`] if the name is unknown. Never fails.
pub fn lookup(name: &str) -> &'static [u8] {
    find(name).or_default()
}

/// Every chord name the table knows about, in table order.
pub fn chord_names() -> impl Iterator<Item = &'static str> {
    CHORD_TABLE.iter().map(|(name, _)| *name)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    pub name: String,
    pub notes: Vec<u8>,
}

impl Chord {
    /// Unknown names silently resolve to the default triad.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let notes = lookup(&name).to_vec();

        Self { name, notes }
    }

    pub fn try_new(name: impl Into<String>) -> Result<Self, TimelineError> {
        let name = name.into();

        match find(&name) {
            ChordLookup::Found(notes) => Ok(Self {
                notes: notes.to_vec(),
                name,
            }),
            ChordLookup::NotFound => Err(TimelineError::UnknownChord(name)),
        }
    }
}

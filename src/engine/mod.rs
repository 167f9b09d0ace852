use anyhow::bail;

mod log_engine;
mod midi_stream;
pub mod sequence;

pub use log_engine::LogEngine;
pub use midi_stream::MidiStreamEngine;
pub use sequence::{Sequence, Track, TrackId};

/// Highest valid MIDI channel (0-based).
pub const MAX_CHANNEL: u8 = 15;

/// A single channel-voice message, already resolved to wall-clock order by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteMessage {
    On { channel: u8, pitch: u8, velocity: u8 },
    Off { channel: u8, pitch: u8, velocity: u8 },
}

pub trait SoundEngine: Send + Sync {
    fn note_on(&self, channel: u8, pitch: u8, velocity: u8) -> anyhow::Result<()>;

    fn note_off(&self, channel: u8, pitch: u8, velocity: u8) -> anyhow::Result<()>;

    /// Silence everything this engine may have left sounding.
    fn all_notes_off(&self) -> anyhow::Result<()>;

    fn send(&self, message: &NoteMessage) -> anyhow::Result<()> {
        let (NoteMessage::On {
            channel,
            pitch,
            velocity,
        }
        | NoteMessage::Off {
            channel,
            pitch,
            velocity,
        }) = *message;

        if channel > MAX_CHANNEL {
            bail!("MIDI channel {} is out of range..!", channel);
        }
        if pitch > 127 {
            bail!("MIDI pitch {} is out of range..!", pitch);
        }
        if velocity > 127 {
            bail!("MIDI velocity {} is out of range..!", velocity);
        }

        match *message {
            NoteMessage::On {
                channel,
                pitch,
                velocity,
            } => self.note_on(channel, pitch, velocity),
            NoteMessage::Off {
                channel,
                pitch,
                velocity,
            } => self.note_off(channel, pitch, velocity),
        }
    }
}

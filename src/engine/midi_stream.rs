use crate::engine::{MAX_CHANNEL, SoundEngine};
use anyhow::{Result, anyhow, bail};
use log::debug;
use midly::MidiMessage;
use midly::live::LiveEvent;
use midly::num::{u4, u7};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

const CC_ALL_NOTES_OFF: u8 = 123;

/// Writes raw MIDI channel messages to any byte sink.
///
/// On Linux a raw MIDI device node such as `/dev/snd/midiC1D0` makes this a real
/// hardware (or softsynth) output; writing to a plain file captures the stream instead.
#[derive(Debug)]
pub struct MidiStreamEngine<W: Write + Send> {
    sink: Mutex<W>,
    used_channels: Mutex<u16>,
}

impl MidiStreamEngine<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .open(path.as_ref())
            .map_err(|e| {
                anyhow!(
                    "Failed to open MIDI output {}: {}",
                    path.as_ref().display(),
                    e
                )
            })?;

        debug!("Opened MIDI output {}..!", path.as_ref().display());
        Ok(Self::new(file))
    }
}

impl<W: Write + Send> MidiStreamEngine<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink: Mutex::new(sink),
            used_channels: Mutex::new(0),
        }
    }

    pub fn into_inner(self) -> Result<W> {
        self.sink
            .into_inner()
            .map_err(|_| anyhow!("MIDI sink lock was poisoned..!"))
    }

    fn write_event(&self, channel: u8, message: MidiMessage) -> Result<()> {
        let event = LiveEvent::Midi {
            channel: u4::new(channel),
            message,
        };

        let mut buf = Vec::with_capacity(3);
        event
            .write_std(&mut buf)
            .map_err(|e| anyhow!("Failed to encode MIDI event: {}", e))?;

        let Ok(mut sink) = self.sink.lock() else {
            return Err(anyhow!("Failed to lock the MIDI sink..!"));
        };
        sink.write_all(&buf)?;
        sink.flush()?;

        Ok(())
    }

    fn mark_channel(&self, channel: u8) -> Result<()> {
        if channel > MAX_CHANNEL {
            bail!("MIDI channel {} is out of range..!", channel);
        }

        if let Ok(mut used) = self.used_channels.lock() {
            *used |= 1 << channel;
        }

        Ok(())
    }
}

impl<W: Write + Send> SoundEngine for MidiStreamEngine<W> {
    fn note_on(&self, channel: u8, pitch: u8, velocity: u8) -> Result<()> {
        self.mark_channel(channel)?;
        self.write_event(
            channel,
            MidiMessage::NoteOn {
                key: u7::new(pitch),
                vel: u7::new(velocity),
            },
        )
    }

    fn note_off(&self, channel: u8, pitch: u8, velocity: u8) -> Result<()> {
        if channel > MAX_CHANNEL {
            bail!("MIDI channel {} is out of range..!", channel);
        }

        self.write_event(
            channel,
            MidiMessage::NoteOff {
                key: u7::new(pitch),
                vel: u7::new(velocity),
            },
        )
    }

    fn all_notes_off(&self) -> Result<()> {
        let used = {
            let Ok(mut lock) = self.used_channels.lock() else {
                return Err(anyhow!("Failed to lock used channels..!"));
            };
            std::mem::take(&mut *lock)
        };

        for channel in (0..=MAX_CHANNEL).filter(|ch| used & (1 << ch) != 0) {
            self.write_event(
                channel,
                MidiMessage::Controller {
                    controller: u7::new(CC_ALL_NOTES_OFF),
                    value: u7::new(0),
                },
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::engine::NoteMessage;

    #[test]
    fn encodes_note_on_and_off() {
        let engine = MidiStreamEngine::new(Vec::new());

        engine.note_on(0, 60, 64).unwrap();
        engine.note_off(0, 60, 0).unwrap();
        engine.note_on(9, 38, 100).unwrap();

        let bytes = engine.into_inner().unwrap();
        assert_eq!(
            bytes,
            vec![0x90, 60, 64, 0x80, 60, 0, 0x99, 38, 100]
        );
    }

    #[test]
    fn all_notes_off_covers_used_channels_once() {
        let engine = MidiStreamEngine::new(Vec::new());

        engine.note_on(0, 64, 64).unwrap();
        engine.note_on(2, 67, 64).unwrap();
        engine.note_on(0, 71, 64).unwrap();
        engine.all_notes_off().unwrap();
        // nothing left sounding, so the second call is a no-op
        engine.all_notes_off().unwrap();

        let bytes = engine.into_inner().unwrap();
        assert_eq!(&bytes[9..], &[0xB0, 123, 0, 0xB2, 123, 0]);
    }

    #[test]
    fn send_rejects_out_of_range_messages() {
        let engine = MidiStreamEngine::new(Vec::new());

        assert!(
            engine
                .send(&NoteMessage::On {
                    channel: 16,
                    pitch: 60,
                    velocity: 64
                })
                .is_err()
        );
        assert!(
            engine
                .send(&NoteMessage::Off {
                    channel: 0,
                    pitch: 128,
                    velocity: 0
                })
                .is_err()
        );
        assert!(
            engine
                .send(&NoteMessage::On {
                    channel: 0,
                    pitch: 60,
                    velocity: 200
                })
                .is_err()
        );
        assert!(
            engine
                .send(&NoteMessage::Off {
                    channel: 0,
                    pitch: 60,
                    velocity: 128
                })
                .is_err()
        );
        assert!(engine.into_inner().unwrap().is_empty());
    }

    #[test]
    fn direct_calls_reject_bad_channels() {
        let engine = MidiStreamEngine::new(Vec::new());

        assert!(engine.note_on(16, 60, 64).is_err());
        assert!(engine.note_off(200, 60, 0).is_err());
        engine.all_notes_off().unwrap();

        assert!(engine.into_inner().unwrap().is_empty());
    }
}

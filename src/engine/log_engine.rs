use crate::engine::SoundEngine;
use anyhow::Result;
use log::info;

/// Prints note messages instead of sounding them. Used when no MIDI output is given.
#[derive(Debug, Clone, Default)]
pub struct LogEngine;

impl LogEngine {
    pub fn new() -> Self {
        Self
    }
}

impl SoundEngine for LogEngine {
    fn note_on(&self, channel: u8, pitch: u8, velocity: u8) -> Result<()> {
        info!("note on  | ch {:>2} | pitch {:>3} | vel {:>3}", channel, pitch, velocity);
        Ok(())
    }

    fn note_off(&self, channel: u8, pitch: u8, velocity: u8) -> Result<()> {
        info!("note off | ch {:>2} | pitch {:>3} | vel {:>3}", channel, pitch, velocity);
        Ok(())
    }

    fn all_notes_off(&self) -> Result<()> {
        info!("all notes off");
        Ok(())
    }
}

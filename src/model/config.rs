use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "chord_player",
    about = "Play a handful of named chords as MIDI!"
)]
pub struct Args {
    /// Chord names to play, one per slot. Unknown names fall back to C major unless `--strict`.
    #[arg(default_values_t = ["C", "Emin", "F", "G"].map(String::from))]
    pub chords: Vec<String>,

    /// Tempo in beats per minute, clamped to 60..=200.
    #[arg(short, long, default_value_t = 120.0)]
    pub tempo: f64,

    /// How long each chord lasts: 'beat' (one beat per chord) or 'reciprocal' (1/tempo beats).
    #[arg(short, long, default_value = "beat")]
    pub spacing: String,

    /// Raw MIDI output to write to, e.g. /dev/snd/midiC1D0. Notes are only logged without one.
    #[arg(short, long)]
    pub device: Option<PathBuf>,

    /// Fail on unknown chord names instead of substituting C major.
    #[arg(long, default_value_t = false)]
    pub strict: bool,

    /// Dry run (print the timeline and exit).
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Print every chord name the player knows and exit.
    #[arg(short, long, default_value_t = false)]
    pub list_chords: bool,

    /// Prints extra information to the terminal.
    #[arg(short, long)]
    pub verbose: bool,
}

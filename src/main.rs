use anyhow::Result;
use chord_player::{
    Args, Chord, LogEngine, MidiStreamEngine, Player, Sequence, SoundEngine, build_with_spacing,
    chord_names, clamp_tempo, lookup, parse_spacing,
};
use clap::Parser;
use log::{debug, info, warn};
use std::sync::Arc;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list_chords {
        for name in chord_names() {
            info!("{:>6} -> {:?}", name, lookup(name));
        }
        return Ok(());
    }

    let chords = args
        .chords
        .iter()
        .map(|name| {
            if args.strict {
                Chord::try_new(name.as_str())
            } else {
                Ok(Chord::new(name.as_str()))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let tempo = clamp_tempo(args.tempo);
    let spacing = parse_spacing(&args.spacing);
    let timeline = build_with_spacing(&chords, tempo, spacing)?;

    debug!(
        "Built a timeline of {} event(s) for {} chord(s) using {:?} spacing..!",
        timeline.len(),
        chords.len(),
        spacing
    );

    if args.dry_run {
        let tempo = timeline.tempo();
        info!(
            "Tempo: {:.1} bpm ({:.4}s per beat)",
            tempo.bpm(),
            tempo.seconds_per_beat
        );
        for (i, ev) in timeline.notes().enumerate() {
            info!(
                "Event {}: pitch={} start_beat={:.5} dur_beats={:.5} vel={} ch={}",
                i, ev.pitch, ev.start_beat, ev.duration_beats, ev.velocity, ev.channel
            );
        }
        return Ok(());
    }

    let sequence = Sequence::from_timeline(&timeline);

    match args.device.as_ref() {
        Some(path) => {
            info!("Sending MIDI to '{}'..!", path.display());
            run(MidiStreamEngine::open(path)?, sequence, args.verbose)
        }
        None => {
            info!("No MIDI output given, logging notes instead..!");
            run(LogEngine::new(), sequence, args.verbose)
        }
    }
}

fn run<E: SoundEngine + 'static>(engine: E, sequence: Sequence, verbose: bool) -> Result<()> {
    let player = Arc::new(Player::new(engine, verbose));
    let player_for_handler = Arc::clone(&player);

    ctrlc::set_handler(move || {
        warn!("Ctrl-C received, stopping playback..!");
        let _ = player_for_handler.stop();
    })?;

    player.play(sequence, true)?;
    info!("Playback finished, exiting..!");

    Ok(())
}

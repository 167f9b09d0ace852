use crate::engine::{NoteMessage, Sequence, SoundEngine};
use anyhow::bail;
use log::{debug, info, warn};
use spin_sleep::{SpinSleeper, SpinStrategy};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

enum ControlMsg {
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledMessage {
    pub time_s: f64,
    pub message: NoteMessage,
}

/// Flatten a sequence into wall-clock note-on/note-off messages.
///
/// Offs sort before ons at the same instant so a repeated pitch gets re-struck instead of
/// cut short. Simultaneous ons keep the order they were added in.
pub fn schedule_sequence(sequence: &Sequence) -> Vec<ScheduledMessage> {
    let seconds_per_beat = sequence.seconds_per_beat();
    let mut messages: Vec<ScheduledMessage> = Vec::with_capacity(sequence.note_count() * 2);

    for track in sequence.tracks() {
        for ev in track.events.iter() {
            messages.push(ScheduledMessage {
                time_s: ev.start_beat * seconds_per_beat,
                message: NoteMessage::On {
                    channel: ev.channel,
                    pitch: ev.pitch,
                    velocity: ev.velocity,
                },
            });
            messages.push(ScheduledMessage {
                time_s: ev.end_beat() * seconds_per_beat,
                message: NoteMessage::Off {
                    channel: ev.channel,
                    pitch: ev.pitch,
                    velocity: ev.release_velocity,
                },
            });
        }
    }

    messages.sort_by(|a, b| {
        a.time_s.total_cmp(&b.time_s).then_with(|| {
            let is_on = |m: &ScheduledMessage| matches!(m.message, NoteMessage::On { .. }) as u8;
            is_on(a).cmp(&is_on(b))
        })
    });

    messages
}

#[derive(Debug)]
pub struct Player<E: SoundEngine> {
    verbose: bool,
    engine: Arc<E>,
    // id of the session currently rendering, 0 while idle
    active_session: Arc<AtomicU64>,
    next_session: AtomicU64,
    control_tx: Mutex<Option<Sender<ControlMsg>>>,
    worker_handle: Mutex<Option<JoinHandle<()>>>,
}

/// Hands the player back to idle when the worker exits, unless a newer session took over.
struct SessionGuard {
    id: u64,
    active_session: Arc<AtomicU64>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let _ = self
            .active_session
            .compare_exchange(self.id, 0, Ordering::AcqRel, Ordering::Acquire);
    }
}

impl<E: SoundEngine + 'static> Player<E> {
    pub fn new(engine: E, verbose: bool) -> Self {
        Self {
            verbose,
            engine: Arc::new(engine),
            active_session: Arc::new(AtomicU64::new(0)),
            next_session: AtomicU64::new(1),
            control_tx: Mutex::new(None),
            worker_handle: Mutex::new(None),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn state(&self) -> PlaybackState {
        if self.active_session.load(Ordering::Acquire) == 0 {
            PlaybackState::Idle
        } else {
            PlaybackState::Playing
        }
    }

    /// Start rendering `sequence`, replacing whatever session was running before.
    ///
    /// With `join` the call blocks until the sequence has finished playing. The player
    /// reports [`PlaybackState::Playing`] for the whole session either way.
    pub fn play(&self, sequence: Sequence, join: bool) -> anyhow::Result<()> {
        let schedule = schedule_sequence(&sequence);

        if schedule.is_empty() {
            bail!("Nothing to play, the sequence has no note events..!")
        }

        if self.state() == PlaybackState::Playing {
            info!("Stopping the previous playback session first..!");
            self.stop()?;
        } else {
            self.reap_finished()?;
        }

        let engine = Arc::clone(&self.engine);
        let (tx, rx) = mpsc::channel::<ControlMsg>();

        {
            let Ok(mut ctl) = self.control_tx.lock() else {
                bail!("Failed to lock control_tx..!")
            };

            *ctl = Some(tx);
        }

        info!(
            "Playing {} note event(s) at {:.1} bpm..!",
            sequence.note_count(),
            60.0 / sequence.seconds_per_beat()
        );

        let id = self.next_session.fetch_add(1, Ordering::AcqRel);
        self.active_session.store(id, Ordering::Release);
        let guard = SessionGuard {
            id,
            active_session: Arc::clone(&self.active_session),
        };

        let verbose = self.verbose;
        let handle = thread::spawn(move || {
            let _guard = guard;
            render(engine.as_ref(), schedule, rx, verbose)
        });

        if join {
            if handle.join().is_err() {
                bail!("Playback thread panicked..!")
            }

            // another caller may already have started a newer session
            if self.state() == PlaybackState::Idle {
                self.reap_finished()?;
            }
        } else {
            let Ok(mut wh) = self.worker_handle.lock() else {
                bail!("Failed to lock worker handle..!")
            };

            *wh = Some(handle);
        }

        Ok(())
    }

    pub fn stop(&self) -> anyhow::Result<()> {
        if self.state() == PlaybackState::Idle {
            self.reap_finished()?;
            bail!("No worker is running playback..!")
        }

        let tx = {
            let Ok(mut lock) = self.control_tx.lock() else {
                bail!("Failed to lock control_tx..!")
            };
            lock.take()
        };

        if let Some(tx) = tx {
            // the worker may finish on its own in the meantime, in which case nobody is listening
            let _ = tx.send(ControlMsg::Stop);
        } else {
            bail!("No worker is running playback..!")
        }

        let Ok(mut lock) = self.worker_handle.lock() else {
            bail!("Failed to lock worker_handle..!")
        };

        if let Some(handle) = lock.take() {
            let _ = handle.join();
            debug!("Playback thread joined..!");
        }
        info!("Stopped playback thread..!");

        Ok(())
    }

    /// Drop the control channel and handle left behind by a session that ended on its own.
    fn reap_finished(&self) -> anyhow::Result<()> {
        {
            let Ok(mut ctl) = self.control_tx.lock() else {
                bail!("Failed to lock control_tx..!")
            };
            ctl.take();
        }

        let Ok(mut wh) = self.worker_handle.lock() else {
            bail!("Failed to lock worker_handle..!")
        };

        if let Some(handle) = wh.take() {
            let _ = handle.join();
            debug!("Reaped finished playback thread..!");
        }

        Ok(())
    }
}

fn render<E: SoundEngine>(
    engine: &E,
    schedule: Vec<ScheduledMessage>,
    ctrl_rx: Receiver<ControlMsg>,
    verbose: bool,
) {
    const MAX_SLEEP_CHUNK_S: f64 = 0.050;

    let sleeper = SpinSleeper::new(100_000).with_spin_strategy(SpinStrategy::YieldThread);
    let start = Instant::now();

    let stopped = |engine: &E| {
        if let Err(why) = engine.all_notes_off() {
            warn!("Failed to silence engine: {:?}", why);
        }
    };

    for scheduled in schedule.into_iter() {
        let target = start + Duration::from_secs_f64(scheduled.time_s.max(0.0));

        loop {
            if let Ok(ControlMsg::Stop) = ctrl_rx.try_recv() {
                stopped(engine);
                warn!(
                    "Playback stopped via control message after {:.3} seconds..!",
                    start.elapsed().as_secs_f64()
                );
                return;
            }

            let now = Instant::now();
            if now >= target {
                break;
            }

            let remaining = (target - now).as_secs_f64();
            sleeper.sleep(Duration::from_secs_f64(remaining.min(MAX_SLEEP_CHUNK_S)));
        }

        if verbose {
            let emitted_at_ms = start.elapsed().as_secs_f64() * 1000.0;
            info!(
                "{:?} | at {:>10.3}ms | scheduled for: {:>10.3}ms",
                scheduled.message,
                emitted_at_ms,
                scheduled.time_s * 1000.0
            );
        }

        if let Err(why) = engine.send(&scheduled.message) {
            warn!("Engine error for {:?} | why: {:?}", scheduled.message, why);
        }
    }

    info!("Playback thread finished all events..!");
}

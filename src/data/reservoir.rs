use super::TimeUniformSample;
use crate::{clock::Clock, error::Result};
use crossbeam_channel::{bounded, select, tick, Sender};
use log::{debug, warn};
use parking_lot::Mutex;
use std::{
    sync::{Arc, Weak},
    thread::{self, JoinHandle},
    time::Duration,
};

/// Default interval between two eviction sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5);

struct Sweeper {
    shutdown_tx: Sender<()>,
    handle: JoinHandle<()>,
}

struct Inner {
    interval: Duration,
    clock: Clock,
    samples: Mutex<Vec<Weak<TimeUniformSample>>>,
    sweeper: Mutex<Option<Sweeper>>,
}

impl Inner {
    fn sweep(&self) -> usize {
        // Take a snapshot of the live samples so construction elsewhere never waits on eviction.
        let live: Vec<Arc<TimeUniformSample>> = {
            let mut samples = self.samples.lock();
            samples.retain(|weak| weak.strong_count() > 0);
            samples.iter().filter_map(Weak::upgrade).collect()
        };

        for sample in &live {
            sample.evict_expired();
        }

        debug!("evicted expired values from {} time-uniform samples", live.len());
        live.len()
    }
}

/// Owner of the periodic eviction sweep over time-uniform samples.
///
/// Samples are tracked weakly: a sample that is no longer referenced anywhere else simply drops out
/// of the sweep.  The sweeper thread is started lazily, the first time a sample is created through
/// the manager, and runs until [`ReservoirManager::stop`] is called or the last handle to the
/// manager is dropped.
#[derive(Clone)]
pub struct ReservoirManager {
    inner: Arc<Inner>,
}

impl ReservoirManager {
    /// Creates a manager sweeping every [`DEFAULT_SWEEP_INTERVAL`].
    pub fn new() -> ReservoirManager { ReservoirManager::with_interval(DEFAULT_SWEEP_INTERVAL) }

    pub fn with_interval(interval: Duration) -> ReservoirManager {
        ReservoirManager::with_clock(interval, Clock::new())
    }

    /// Creates a manager whose samples read time from `clock`.
    pub fn with_clock(interval: Duration, clock: Clock) -> ReservoirManager {
        ReservoirManager {
            inner: Arc::new(Inner {
                interval,
                clock,
                samples: Mutex::new(Vec::new()),
                sweeper: Mutex::new(None),
            }),
        }
    }

    pub fn interval(&self) -> Duration { self.inner.interval }

    /// Creates a time-uniform sample, registers it, and makes sure the sweeper is running.
    ///
    /// The sample is usable even if the sweeper cannot be started; it then only evicts on update.
    pub fn time_uniform_sample(&self, lifetime: Duration, capacity: usize) -> Arc<TimeUniformSample> {
        let sample = Arc::new(TimeUniformSample::with_clock(
            lifetime,
            capacity,
            self.inner.clock.clone(),
        ));
        self.register(&sample);
        if let Err(e) = self.start() {
            warn!("reservoir sweeper not running: {}", e);
        }
        sample
    }

    /// Adds an existing sample to the sweep.
    pub fn register(&self, sample: &Arc<TimeUniformSample>) {
        self.inner.samples.lock().push(Arc::downgrade(sample));
    }

    /// Number of registered samples that are still alive.
    pub fn len(&self) -> usize {
        self.inner
            .samples
            .lock()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Runs one eviction pass over every live sample, returning how many were swept.
    pub fn sweep(&self) -> usize { self.inner.sweep() }

    pub fn is_running(&self) -> bool { self.inner.sweeper.lock().is_some() }

    /// Starts the periodic sweep if it is not already running.
    pub fn start(&self) -> Result<()> {
        let mut sweeper = self.inner.sweeper.lock();
        if sweeper.is_some() {
            return Ok(());
        }

        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);
        let ticker = tick(self.inner.interval);
        let inner = Arc::downgrade(&self.inner);

        let handle = thread::Builder::new()
            .name("reservoir-sweeper".to_owned())
            .spawn(move || loop {
                select! {
                    recv(ticker) -> _ => match inner.upgrade() {
                        Some(inner) => {
                            inner.sweep();
                        },
                        None => break,
                    },
                    recv(shutdown_rx) -> _ => break,
                }
            })?;

        *sweeper = Some(Sweeper { shutdown_tx, handle });
        Ok(())
    }

    /// Stops the periodic sweep and waits for the sweeper thread to exit.
    pub fn stop(&self) {
        let sweeper = self.inner.sweeper.lock().take();
        if let Some(sweeper) = sweeper {
            drop(sweeper.shutdown_tx);
            if sweeper.handle.thread().id() != thread::current().id() {
                let _ = sweeper.handle.join();
            }
        }
    }
}

impl Default for ReservoirManager {
    fn default() -> ReservoirManager { ReservoirManager::new() }
}

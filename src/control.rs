use crate::error::{Error, Result};
use crossbeam_channel::{bounded, Sender};
use log::debug;
use std::thread::JoinHandle;

/// Requests handled by a running export loop.
pub enum ControlMessage {
    /// Flush the registry immediately and send back the outcome.
    Flush(Sender<Result<()>>),
    /// Stop the loop.
    Shutdown,
}

/// Handle to an export loop running on its own thread.
///
/// Dropping the controller shuts the loop down and waits for it to exit.
pub struct Controller {
    control_tx: Sender<ControlMessage>,
    handle: Option<JoinHandle<()>>,
}

impl Controller {
    pub(crate) fn new(control_tx: Sender<ControlMessage>, handle: Option<JoinHandle<()>>) -> Controller {
        Controller { control_tx, handle }
    }

    /// Flushes the registry now, outside of the regular interval, and waits for the result.
    pub fn flush_now(&self) -> Result<()> {
        let (tx, rx) = bounded(1);
        self.control_tx
            .send(ControlMessage::Flush(tx))
            .map_err(|_| Error::ExporterStopped)?;

        rx.recv().map_err(|_| Error::ExporterStopped)?
    }

    /// Stops the loop and waits for its thread to finish.
    pub fn shutdown(mut self) -> Result<()> { self.stop() }

    fn stop(&mut self) -> Result<()> {
        let sent = self.control_tx.send(ControlMessage::Shutdown).is_ok();
        let joined = match self.handle.take() {
            Some(handle) => handle.join().is_ok(),
            None => true,
        };

        debug!("export loop stopped");
        if sent && joined {
            Ok(())
        } else {
            Err(Error::ExporterStopped)
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ControlMessage, Controller};
    use crate::error::Error;
    use crossbeam_channel::unbounded;
    use std::thread;

    #[test]
    fn test_stopped_loop_rejects_requests() {
        let (control_tx, control_rx) = unbounded();
        drop(control_rx);
        let controller = Controller::new(control_tx, None);

        match controller.flush_now() {
            Err(Error::ExporterStopped) => {},
            _ => panic!("expected a stopped exporter"),
        }
        match controller.shutdown() {
            Err(Error::ExporterStopped) => {},
            _ => panic!("expected a stopped exporter"),
        }
    }

    #[test]
    fn test_flush_request_round_trip() {
        let (control_tx, control_rx) = unbounded();
        let handle = thread::spawn(move || {
            while let Ok(msg) = control_rx.recv() {
                match msg {
                    ControlMessage::Flush(tx) => {
                        let _ = tx.send(Ok(()));
                    },
                    ControlMessage::Shutdown => break,
                }
            }
        });

        let controller = Controller::new(control_tx, Some(handle));
        assert!(controller.flush_now().is_ok());
        assert!(controller.shutdown().is_ok());
    }

    #[test]
    fn test_dropped_request_is_reported() {
        let (control_tx, control_rx) = unbounded();
        let handle = thread::spawn(move || {
            if let Ok(ControlMessage::Flush(tx)) = control_rx.recv() {
                drop(tx);
            }
        });

        let controller = Controller::new(control_tx, Some(handle));
        match controller.flush_now() {
            Err(Error::ExporterStopped) => {},
            _ => panic!("expected a stopped exporter"),
        }
    }
}

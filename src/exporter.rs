use crate::{
    configuration::{Destination, ReporterConfig},
    control::{ControlMessage, Controller},
    encoder::PointEncoder,
    error::Result,
    helper::unix_timestamp,
    key::MetricId,
    registry::{Metric, Registry},
    transport::{report_points, ProxyConnection, Reporter},
};
use crossbeam_channel::{select, tick, unbounded, Receiver};
use log::{debug, error};
use std::{net::SocketAddr, sync::Arc, thread};

/// Periodically flushes a registry to Wavefront.
///
/// Points go either to a proxy, over a fresh TCP connection per flush and stamped with the flush
/// time, or to a direct-ingestion [`Reporter`] in batches without timestamps.
pub struct Exporter {
    config: ReporterConfig,
    registry: Arc<Registry>,
    encoder: PointEncoder,
}

impl Exporter {
    pub fn new(config: ReporterConfig, registry: Arc<Registry>) -> Exporter {
        let encoder = PointEncoder::new(&config);
        Exporter {
            config,
            registry,
            encoder,
        }
    }

    /// Gets a builder to configure an `Exporter` instance with.
    pub fn builder() -> ReporterConfig { ReporterConfig::default() }

    pub fn registry(&self) -> &Arc<Registry> { &self.registry }

    /// Flushes every registered metric once.
    ///
    /// Fails without any I/O when no destination is configured.  In direct mode every batch is
    /// attempted and the last failure is returned.
    pub fn flush(&self) -> Result<()> {
        let entries = self.registry.entries();
        debug!("flushing {} metrics", entries.len());

        match self.config.destination()? {
            Destination::Proxy(addr) => self.flush_to_proxy(addr, &entries),
            Destination::Direct(reporter) => self.flush_to_direct(reporter.as_ref(), &entries),
        }
    }

    /// Sends a single metric right away, without registering it.
    pub fn submit<I, K, V>(&self, name: &str, metric: &Metric, tags: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let entry = [(MetricId::new(name, tags), metric.clone())];

        match self.config.destination()? {
            Destination::Proxy(addr) => self.flush_to_proxy(addr, &entry),
            Destination::Direct(reporter) => self.flush_to_direct(reporter.as_ref(), &entry),
        }
    }

    fn flush_to_proxy(&self, addr: SocketAddr, entries: &[(MetricId, Metric)]) -> Result<()> {
        let now = unix_timestamp();
        let mut connection = ProxyConnection::connect(addr)?;
        for (id, metric) in entries {
            let lines = self.encoder.encode(id, metric, Some(now));
            connection.write_metric(&lines)?;
        }
        Ok(())
    }

    fn flush_to_direct(&self, reporter: &dyn Reporter, entries: &[(MetricId, Metric)]) -> Result<()> {
        let batch_size = self.config.batch_size;
        let mut points = Vec::new();
        let mut last_error = None;

        for (id, metric) in entries {
            points.extend(self.encoder.encode(id, metric, None));
            while points.len() >= batch_size {
                let batch: Vec<String> = points.drain(..batch_size).collect();
                if let Err(e) = report_points(reporter, &batch) {
                    last_error = Some(e);
                }
            }
        }

        if !points.is_empty() {
            if let Err(e) = report_points(reporter, &points) {
                last_error = Some(e);
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Runs the export loop until a shutdown request arrives or every controller is gone.
    ///
    /// The registry is flushed on every tick of the flush interval.  Failed periodic flushes are
    /// logged and the loop carries on.
    pub fn run(&self, control_rx: Receiver<ControlMessage>) {
        let flush_rx = tick(self.config.flush_interval);
        loop {
            select! {
                recv(flush_rx) -> _ => {
                    if let Err(e) = self.flush() {
                        error!("error flushing metrics to wavefront: {}", e);
                    }
                },
                recv(control_rx) -> msg => match msg {
                    Ok(ControlMessage::Flush(tx)) => {
                        let _ = tx.send(self.flush());
                    },
                    Ok(ControlMessage::Shutdown) | Err(_) => break,
                },
            }
        }
    }

    /// Runs the export loop on a dedicated thread.
    pub fn spawn(self) -> Result<Controller> {
        let (control_tx, control_rx) = unbounded();
        let handle = thread::Builder::new()
            .name("wavefront-exporter".to_owned())
            .spawn(move || self.run(control_rx))?;

        Ok(Controller::new(control_tx, Some(handle)))
    }
}

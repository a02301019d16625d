use crate::error::{Error, Result};
use std::{
    io::{BufWriter, Write},
    net::{SocketAddr, TcpStream},
};

/// Format identifier of the line protocol written by this crate.
pub const WAVEFRONT_FORMAT: &str = "graphite_v2";

/// A direct-ingestion client.
///
/// Implementations deliver one newline-separated batch of points per call and return the HTTP
/// status code of the response.  Retries, pooling and authentication are up to the implementation.
pub trait Reporter: Send + Sync {
    fn report(&self, format: &str, payload: &str) -> Result<u16>;
}

/// Sends a batch of lines through `reporter`, treating any status of 300 or above as a failure.
pub(crate) fn report_points(reporter: &dyn Reporter, points: &[String]) -> Result<()> {
    let payload = points.join("\n");
    let status = reporter.report(WAVEFRONT_FORMAT, &payload)?;
    if status >= 300 {
        return Err(Error::Report { status });
    }
    Ok(())
}

/// A buffered connection to a Wavefront proxy, held for the duration of one flush.
pub struct ProxyConnection {
    writer: BufWriter<TcpStream>,
}

impl ProxyConnection {
    pub fn connect(addr: SocketAddr) -> Result<ProxyConnection> {
        let stream = TcpStream::connect(addr)?;
        Ok(ProxyConnection {
            writer: BufWriter::new(stream),
        })
    }

    /// Writes the lines of one metric and pushes them onto the wire.
    pub fn write_metric(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            self.writer.write_all(line.as_bytes())?;
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

//! GNSS receive buffer.
//!
//! [`GnssBuffer`] keeps the most recent `capacity` bytes received from the
//! GNSS channel.  When new data would overflow it the oldest bytes are
//! dropped by advancing the head index; nothing is shifted.

use log::{debug, error, trace, warn};

use super::Modem;
use crate::app::ports::{AtPort, Clock, PowerControl, SerialPort};

/// Bounded byte ring with oldest-first eviction.
#[derive(Debug, Clone)]
pub struct GnssBuffer {
    buf: Vec<u8>,
    head: usize,
    len: usize,
}

impl GnssBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity],
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Unused room.
    pub fn room(&self) -> usize {
        self.capacity() - self.len
    }

    /// Buffered bytes, oldest first, as at most two slices.
    pub fn as_slices(&self) -> (&[u8], &[u8]) {
        let end = self.head + self.len;
        if end <= self.capacity() {
            (&self.buf[self.head..end], &[])
        } else {
            (&self.buf[self.head..], &self.buf[..end - self.capacity()])
        }
    }

    /// Rotate the storage so the buffered bytes are one slice.
    pub fn make_contiguous(&mut self) -> &[u8] {
        self.buf.rotate_left(self.head);
        self.head = 0;
        &self.buf[..self.len]
    }

    /// Drop up to `n` of the oldest bytes.  Returns how many were dropped.
    pub fn consume(&mut self, n: usize) -> usize {
        let n = n.min(self.len);
        self.len -= n;
        self.head = if self.len == 0 {
            0
        } else {
            (self.head + n) % self.capacity()
        };
        n
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let (a, b) = self.as_slices();
        let mut out = Vec::with_capacity(self.len);
        out.extend_from_slice(a);
        out.extend_from_slice(b);
        out
    }

    /// Append up to `want` bytes read from `port`.  The caller guarantees
    /// `want <= room()`.  Returns the bytes appended and the read error
    /// that stopped the transfer, if any.
    fn fill_from<S: SerialPort + ?Sized>(&mut self, port: &mut S, want: usize) -> (usize, Option<S::Error>) {
        debug_assert!(want <= self.room());
        let cap = self.capacity();
        let mut received = 0;
        while received < want {
            let tail = (self.head + self.len) % cap;
            let contiguous = if tail >= self.head { cap - tail } else { self.head - tail };
            let chunk = contiguous.min(want - received);
            match port.read(&mut self.buf[tail..tail + chunk]) {
                Ok(n) => {
                    let n = n.min(chunk);
                    self.len += n;
                    received += n;
                    if n < chunk {
                        break;
                    }
                }
                Err(e) => return (received, Some(e)),
            }
        }
        (received, None)
    }
}

impl<A, P, C, D, G> Modem<A, P, C, D, G>
where
    A: AtPort,
    P: PowerControl,
    C: Clock,
    D: SerialPort,
    G: SerialPort,
{
    /// Move pending GNSS bytes into `buffer`, evicting the oldest bytes
    /// on overflow.  Stops after the first pass that had to evict.
    /// Returns the number of bytes received by this call.
    pub fn drain_gnss_rx(&mut self, buffer: &mut GnssBuffer) -> usize {
        let Some(gnss) = self.gnss.as_mut() else {
            return 0;
        };
        let capacity = buffer.capacity();
        if capacity == 0 {
            return 0;
        }

        trace!("Trying to drain GNSS data");
        let mut total = 0;
        loop {
            let available = gnss.available();
            if available == 0 {
                break;
            }
            let want = available.min(capacity);

            let mut full = false;
            if want > buffer.room() {
                let shift = want - buffer.room();
                warn!(
                    "GNSS buffer full with {} bytes. Dropping oldest {} bytes.",
                    buffer.len(),
                    shift
                );
                buffer.consume(shift);
                full = true;
            }

            let before = buffer.len();
            let (received, failure) = buffer.fill_from(gnss, want);
            total += received;
            if let Some(e) = failure {
                error!("GNSS read failed after {received} of {want} bytes: {e:?}");
                break;
            }
            if received != want {
                error!("GNSS port said {want} bytes available, but received {received}");
            }
            debug!("GNSS Rx - size changed from {} to {} bytes", before, buffer.len());

            if full || received == 0 {
                break;
            }
        }
        trace!("Done draining GNSS {total}");
        total
    }
}

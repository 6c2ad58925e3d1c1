//! Bounded in-memory pipe between the producer thread and the consumer.
//!
//! The producer writes byte chunks into a [`ConduitWriter`]; the consumer
//! reads them back in order from a [`ConduitReader`]. At most `capacity`
//! chunks are in flight: a full conduit blocks the writer, an empty one
//! blocks the reader.
//!
//! Dropping the reader closes the conduit. The writer's next write, including
//! one already blocked on a full conduit, fails with
//! [`io::ErrorKind::BrokenPipe`]. Dropping the writer ends the stream: the
//! reader drains what is left, then sees end of input.

use std::io::{self, Read, Write};
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};

/// Chunks buffered before the writer blocks.
pub const DEFAULT_CAPACITY: usize = 64;

/// Create a conduit holding at most `capacity` chunks.
#[must_use]
pub fn conduit(capacity: usize) -> (ConduitWriter, ConduitReader) {
    let (sender, receiver) = sync_channel(capacity);
    (
        ConduitWriter { sender },
        ConduitReader {
            receiver,
            chunk: Vec::new(),
            offset: 0,
        },
    )
}

/// The producer's end.
#[derive(Debug)]
pub struct ConduitWriter {
    sender: SyncSender<Vec<u8>>,
}

impl Write for ConduitWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.sender
            .send(buf.to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "conduit reader closed"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// The consumer's end.
#[derive(Debug)]
pub struct ConduitReader {
    receiver: Receiver<Vec<u8>>,
    chunk: Vec<u8>,
    offset: usize,
}

impl Read for ConduitReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.offset == self.chunk.len() {
            match self.receiver.recv() {
                Ok(chunk) => {
                    self.chunk = chunk;
                    self.offset = 0;
                }
                // Writer dropped and everything drained.
                Err(_) => return Ok(0),
            }
        }
        let available = &self.chunk[self.offset..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.offset += n;
        Ok(n)
    }
}

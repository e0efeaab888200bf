//! Scripted stream double for transport testing.
//!
//! # Why a scripted stream?
//!
//! The session logic cares about byte-level behaviour that is awkward to
//! provoke on a real socket: a response arriving split across reads, a
//! stream that hits end-of-file mid-payload, a server that answers with
//! garbage status bytes. `ScriptedStream` plays back an exact read-side
//! script while recording every write, so tests can assert both directions
//! deterministically.
//!
//! # Usage in tests
//!
//! ```ignore
//! let stream = ScriptedStream::new(vec![
//!     ScriptItem::Data(vec![0]),  // status OK
//!     ScriptItem::Eof,            // next read fails mid-payload
//! ]);
//! let written = stream.written();
//! let mut conn = Connection::new(stream);
//! // ... drive the code under test, then inspect *written.lock().unwrap()
//! ```
//!
//! An [`ScriptItem::Eof`] entry makes exactly one read return zero bytes
//! (which `read_exact` surfaces as `UnexpectedEof`); subsequent reads resume
//! with the rest of the script. An exhausted script reads as end-of-file.

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// One step of the read-side script.
#[derive(Debug, Clone)]
pub enum ScriptItem {
    /// Bytes the next read(s) will deliver.
    Data(Vec<u8>),
    /// One read returning zero bytes (end-of-file for that read).
    Eof,
}

/// In-memory stream that serves reads from a script and records writes.
pub struct ScriptedStream {
    script: VecDeque<ScriptItem>,
    written: Arc<Mutex<Vec<u8>>>,
}

impl ScriptedStream {
    pub fn new(script: Vec<ScriptItem>) -> Self {
        Self {
            script: script.into(),
            written: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle to the write capture, valid after the stream is moved into a
    /// `Connection`.
    pub fn written(&self) -> Arc<Mutex<Vec<u8>>> {
        Arc::clone(&self.written)
    }
}

impl AsyncRead for ScriptedStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.script.front_mut() {
            None => Poll::Ready(Ok(())), // exhausted script reads as EOF
            Some(ScriptItem::Eof) => {
                self.script.pop_front();
                Poll::Ready(Ok(()))
            }
            Some(ScriptItem::Data(data)) => {
                let n = data.len().min(buf.remaining());
                buf.put_slice(&data[..n]);
                data.drain(..n);
                if data.is_empty() {
                    self.script.pop_front();
                }
                Poll::Ready(Ok(()))
            }
        }
    }
}

impl AsyncWrite for ScriptedStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.written.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_reads_deliver_scripted_data_in_order() {
        let mut stream = ScriptedStream::new(vec![
            ScriptItem::Data(vec![1, 2]),
            ScriptItem::Data(vec![3]),
        ]);
        let mut buf = [0u8; 3];
        stream.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, [1, 2, 3]);
    }

    #[tokio::test]
    async fn test_eof_item_fails_one_read_then_resumes() {
        let mut stream = ScriptedStream::new(vec![
            ScriptItem::Eof,
            ScriptItem::Data(vec![7]),
        ]);

        let mut buf = [0u8; 1];
        let err = stream.read_exact(&mut buf).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

        stream.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, [7]);
    }

    #[tokio::test]
    async fn test_exhausted_script_reads_as_eof() {
        let mut stream = ScriptedStream::new(vec![]);
        let mut buf = [0u8; 1];
        let err = stream.read_exact(&mut buf).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn test_writes_are_recorded() {
        let mut stream = ScriptedStream::new(vec![]);
        let written = stream.written();
        stream.write_all(&[9, 8, 7]).await.unwrap();
        assert_eq!(*written.lock().unwrap(), vec![9, 8, 7]);
    }
}

//! Lazy access to a bulk-operation result file.
//!
//! Result files are newline-delimited JSON and can be arbitrarily large,
//! so the download is consumed as a stream: either raw bytes or one
//! decoded line at a time. A download is finite and not restartable; a
//! fresh orchestrator run is needed to produce another one.

use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use thiserror::Error;

/// Error raised while consuming a result stream.
#[derive(Debug, Error)]
pub enum ResultStreamError {
    /// The connection failed mid-download.
    #[error("network error while streaming result: {0}")]
    Network(#[from] reqwest::Error),

    /// A line in the result file was not valid UTF-8.
    #[error("result line was not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// Handle on a completed bulk operation's result file.
///
/// Produced by the orchestrator after the operation settles in `COMPLETED`
/// with a result URL. Nothing has been read from the body yet; pick a
/// consumption mode to start pulling bytes.
#[derive(Debug)]
pub struct BulkResultDownload {
    response: reqwest::Response,
}

impl BulkResultDownload {
    pub(crate) const fn new(response: reqwest::Response) -> Self {
        Self { response }
    }

    /// Returns the HTTP status of the download response.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.response.status().as_u16()
    }

    /// Consumes the download as a raw byte stream.
    #[must_use]
    pub fn into_byte_stream(self) -> impl Stream<Item = Result<Bytes, reqwest::Error>> + Send {
        self.response.bytes_stream()
    }

    /// Consumes the download as a stream of JSONL lines.
    ///
    /// Each line is one JSON record of unbounded length; the final line
    /// may lack its trailing newline.
    #[must_use]
    pub fn into_lines(self) -> JsonlLines {
        JsonlLines::from_stream(self.response.bytes_stream())
    }
}

/// Incremental line reader over a streamed JSONL body.
///
/// Buffers network chunks and hands back one line per call, suspending
/// until enough bytes have arrived to complete a line.
pub struct JsonlLines {
    stream: ByteStream,
    buf: BytesMut,
    exhausted: bool,
}

impl JsonlLines {
    pub(crate) fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
    {
        Self {
            stream: Box::pin(stream),
            buf: BytesMut::new(),
            exhausted: false,
        }
    }

    /// Returns the next line of the result, without its newline.
    ///
    /// Returns `Ok(None)` once the stream is exhausted. A final line
    /// without a trailing newline is still returned.
    ///
    /// # Errors
    ///
    /// Returns [`ResultStreamError`] when the connection drops mid-stream
    /// or a line is not valid UTF-8.
    pub async fn next_line(&mut self) -> Result<Option<String>, ResultStreamError> {
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let mut line = self.buf.split_to(pos + 1);
                line.truncate(line.len() - 1);
                if line.last() == Some(&b'\r') {
                    line.truncate(line.len() - 1);
                }
                return Ok(Some(String::from_utf8(line.to_vec())?));
            }

            if self.exhausted {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                // Final line without a trailing delimiter
                let line = self.buf.split_to(self.buf.len());
                return Ok(Some(String::from_utf8(line.to_vec())?));
            }

            match self.stream.next().await {
                Some(Ok(chunk)) => self.buf.extend_from_slice(&chunk),
                Some(Err(e)) => return Err(e.into()),
                None => self.exhausted = true,
            }
        }
    }
}

impl std::fmt::Debug for JsonlLines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonlLines")
            .field("buffered", &self.buf.len())
            .field("exhausted", &self.exhausted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines_from_chunks(chunks: Vec<&'static [u8]>) -> JsonlLines {
        let stream = futures::stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok::<_, reqwest::Error>(Bytes::from_static(c))),
        );
        JsonlLines::from_stream(stream)
    }

    #[tokio::test]
    async fn test_reads_one_record_per_line() {
        let mut lines = lines_from_chunks(vec![b"{\"id\":1}\n{\"id\":2}\n"]);

        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("{\"id\":1}"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("{\"id\":2}"));
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_line_split_across_chunks() {
        let mut lines = lines_from_chunks(vec![b"{\"id\":", b"1}\n{\"id", b"\":2}\n"]);

        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("{\"id\":1}"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("{\"id\":2}"));
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_final_line_without_newline() {
        let mut lines = lines_from_chunks(vec![b"{\"id\":1}\n{\"id\":2}"]);

        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("{\"id\":1}"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("{\"id\":2}"));
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_body_yields_no_lines() {
        let mut lines = lines_from_chunks(vec![]);
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_crlf_line_endings_are_stripped() {
        let mut lines = lines_from_chunks(vec![b"{\"id\":1}\r\n"]);
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("{\"id\":1}"));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_an_error() {
        let mut lines = lines_from_chunks(vec![b"\xff\xfe\n"]);
        assert!(matches!(
            lines.next_line().await,
            Err(ResultStreamError::InvalidUtf8(_))
        ));
    }
}

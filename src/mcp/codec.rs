//! NDJSON framing for the stdio JSON-RPC channel.
//!
//! [`McpCodec`] wraps [`tokio_util::codec::LinesCodec`] with a maximum line
//! length so an unterminated or oversized message cannot exhaust memory.
//! [`LineFramer`] drives the codec over any [`AsyncRead`], exposing a single
//! pull operation: the next line, or end of stream.
//!
//! Framing rules:
//!
//! - Lines are split on `\n`; the delimiter (and a trailing `\r`) is removed.
//! - A line may span any number of underlying reads.
//! - At end of stream a non-empty remainder is emitted as a final line; a
//!   stream ending exactly on `\n` yields nothing extra.
//! - An over-long or non-UTF-8 line is reported as [`AppError::Framing`] for
//!   that line only; framing resumes after its newline.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};

use crate::{AppError, Result};

/// Maximum inbound line length: 1 MiB.
pub const MAX_LINE_BYTES: usize = 1_048_576;

/// Newline-delimited UTF-8 codec with a [`MAX_LINE_BYTES`] limit.
#[derive(Debug)]
pub struct McpCodec(LinesCodec);

impl McpCodec {
    /// Create a new `McpCodec` with the default [`MAX_LINE_BYTES`] limit.
    #[must_use]
    pub fn new() -> Self {
        Self(LinesCodec::new_with_max_length(MAX_LINE_BYTES))
    }
}

impl Default for McpCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for McpCodec {
    type Item = String;
    type Error = AppError;

    /// Split one `\n`-terminated line off the front of `src`.
    ///
    /// Returns `Ok(None)` while `src` holds no complete line.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        self.0.decode(src).map_err(map_codec_error)
    }

    /// Decode the final, possibly unterminated, line at end of stream.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        self.0.decode_eof(src).map_err(map_codec_error)
    }
}

impl Encoder<String> for McpCodec {
    type Error = AppError;

    /// Encode `item` as a `\n`-terminated line into `dst`.
    fn encode(&mut self, item: String, dst: &mut BytesMut) -> Result<()> {
        self.0.encode(item, dst).map_err(map_codec_error)
    }
}

/// Pull-based line reader over an async byte stream.
///
/// Holds the partial-line buffer between reads. The sequence is finite and
/// consumed once: after [`LineFramer::next_line`] returns `None` it keeps
/// returning `None`.
#[derive(Debug)]
pub struct LineFramer<R> {
    reader: R,
    codec: McpCodec,
    buffer: BytesMut,
    eof: bool,
}

impl<R: AsyncRead + Unpin> LineFramer<R> {
    /// Frame lines read from `reader`.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            codec: McpCodec::new(),
            buffer: BytesMut::with_capacity(8 * 1024),
            eof: false,
        }
    }

    /// Pull the next line.
    ///
    /// - `Some(Ok(line))`: a complete line without its delimiter.
    /// - `Some(Err(AppError::Framing(_)))`: this line was unusable; keep pulling.
    /// - `Some(Err(AppError::Io(_)))`: the stream failed; no further lines follow.
    /// - `None`: end of stream.
    pub async fn next_line(&mut self) -> Option<Result<String>> {
        loop {
            if self.eof {
                return self.codec.decode_eof(&mut self.buffer).transpose();
            }

            match self.codec.decode(&mut self.buffer) {
                Ok(Some(line)) => return Some(Ok(line)),
                Ok(None) => {}
                Err(err) => return Some(Err(err)),
            }

            match self.reader.read_buf(&mut self.buffer).await {
                Ok(0) => self.eof = true,
                Ok(_) => {}
                Err(err) => {
                    self.eof = true;
                    self.buffer.clear();
                    return Some(Err(AppError::Io(format!("stdin read failed: {err}"))));
                }
            }
        }
    }
}

// ── Error mapping ─────────────────────────────────────────────────────────────

/// Classify a codec failure as per-line (framing) or fatal (I/O).
fn map_codec_error(e: LinesCodecError) -> AppError {
    match e {
        LinesCodecError::MaxLineLengthExceeded => {
            AppError::Framing(format!("line too long: exceeded {MAX_LINE_BYTES} bytes"))
        }
        // LinesCodec reports a non-UTF-8 line as InvalidData after consuming it.
        LinesCodecError::Io(io_err) if io_err.kind() == std::io::ErrorKind::InvalidData => {
            AppError::Framing(format!("invalid utf-8: {io_err}"))
        }
        LinesCodecError::Io(io_err) => AppError::Io(io_err.to_string()),
    }
}

//! Record streams
//!
//! [`RecordWriter`] and [`RecordReader`] pair a [`Codec`] with a byte stream
//! and own the [`Session`] for it, so callers deal in records only.
//! Whether the session is stateless comes from
//! [`CodecConfig::stateless`](crate::CodecConfig::stateless).
//!
//! Each record travels as one frame: its encoded length in prefix-length
//! form, then the encoded record. A frame longer than
//! [`CodecConfig::max_length`](crate::CodecConfig::max_length) is rejected
//! before it is read.
//!
//! ```text
//! len(n) record[n]  len(n) record[n]  ...
//! ```

use crate::codec::{Codec, DecodeOutcome};
use crate::dictionary::Session;
use crate::error::{ProtocolError, Result};
use crate::length::{read_length_or_eof, write_length};
use bundlekit_core::Record;
use std::io::{self, Read, Write};
use tracing::{debug, warn};

fn session_for(codec: &Codec) -> Session {
    if codec.config().stateless {
        Session::stateless()
    } else {
        Session::new()
    }
}

/// Writes length-framed records to a byte sink
pub struct RecordWriter<W> {
    codec: Codec,
    out: W,
    session: Session,
    frame: Vec<u8>,
    written: u64,
}

impl<W: Write> RecordWriter<W> {
    /// Writer over `out` with a fresh session
    pub fn new(codec: Codec, out: W) -> Self {
        let session = session_for(&codec);
        RecordWriter {
            codec,
            out,
            session,
            frame: Vec::new(),
            written: 0,
        }
    }

    /// Encode one record as a frame
    ///
    /// On failure the session is reset, so the next successful write starts
    /// with BUNDLE_INIT.
    pub fn write(&mut self, record: &dyn Record) -> io::Result<()> {
        if let Err(e) = self.write_frame(record) {
            warn!("failed to write record {}: {}", self.written, e);
            self.session.reset();
            return Err(e);
        }
        self.written += 1;
        Ok(())
    }

    fn write_frame(&mut self, record: &dyn Record) -> io::Result<()> {
        self.frame.clear();
        self.codec
            .encode_record(record, &mut self.frame, &mut self.session)?;
        write_length(&mut self.out, self.frame.len() as u64)?;
        self.out.write_all(&self.frame)
    }

    /// Forget the session; the next record is sent with BUNDLE_INIT
    ///
    /// Use when the sink behind `out` changed (reconnect, failover) and the
    /// peer cannot know what was registered before.
    pub fn reset(&mut self) {
        debug!("writer reset after {} records", self.written);
        self.session.reset();
    }

    /// Flush the underlying sink
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Records written so far
    pub fn records_written(&self) -> u64 {
        self.written
    }

    /// Current session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Borrow the sink
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Unwrap the sink
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Reads length-framed records from a byte source
///
/// Each record is a fresh sibling of the template passed to
/// [`RecordReader::new`], so decoded records share the template's format.
pub struct RecordReader<R> {
    codec: Codec,
    input: R,
    session: Session,
    template: Box<dyn Record>,
    frame: Vec<u8>,
    read: u64,
    failed: bool,
}

impl<R: Read> RecordReader<R> {
    /// Reader over `input` producing siblings of `template`
    pub fn new(codec: Codec, input: R, template: &dyn Record) -> Self {
        let session = session_for(&codec);
        RecordReader {
            codec,
            input,
            session,
            template: template.create_sibling(),
            frame: Vec::new(),
            read: 0,
            failed: false,
        }
    }

    /// Next record, or `None` at a clean end of stream
    pub fn read(&mut self) -> Result<Option<Box<dyn Record>>> {
        let mut record = self.template.create_sibling();
        match self.read_into(record.as_mut())? {
            DecodeOutcome::Record => Ok(Some(record)),
            DecodeOutcome::EndOfStream => Ok(None),
        }
    }

    /// Decode the next frame into `record`
    ///
    /// End of stream is only clean between frames; input ending inside a
    /// frame is [`ProtocolError::Truncated`].
    pub fn read_into(&mut self, record: &mut dyn Record) -> Result<DecodeOutcome> {
        match self.read_frame(record) {
            Ok(DecodeOutcome::Record) => {
                self.read += 1;
                Ok(DecodeOutcome::Record)
            }
            Ok(DecodeOutcome::EndOfStream) => {
                debug!("end of stream after {} records", self.read);
                Ok(DecodeOutcome::EndOfStream)
            }
            Err(e) => {
                warn!("failed to decode record {}: {}", self.read, e);
                self.failed = true;
                Err(e)
            }
        }
    }

    fn read_frame(&mut self, record: &mut dyn Record) -> Result<DecodeOutcome> {
        let Some(len) = read_length_or_eof(&mut self.input)? else {
            return Ok(DecodeOutcome::EndOfStream);
        };
        let len = self.codec.config().check_length(len)?;
        self.frame.resize(len, 0);
        self.input.read_exact(&mut self.frame)?;
        self.codec
            .decode_frame(&self.frame, record, &mut self.session)?;
        Ok(DecodeOutcome::Record)
    }

    /// Records read so far
    pub fn records_read(&self) -> u64 {
        self.read
    }

    /// Current session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Unwrap the source
    pub fn into_inner(self) -> R {
        self.input
    }
}

/// Yields records until end of stream or the first error
impl<R: Read> Iterator for RecordReader<R> {
    type Item = std::result::Result<Box<dyn Record>, ProtocolError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.read().transpose()
    }
}

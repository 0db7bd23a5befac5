//! Panel wire format: every pixel as two bytes, high byte first.

use crate::device::FrameSink;
use crate::image::FrameView;
use crate::pixel::Rgb565;
use crate::util::{CamFilterError, CamFilterResult};
use std::io::Write;

/// Streams blitted pixels to any byte writer (SPI bus, file, socket).
///
/// Region offsets are not encoded; setting the panel's address window is
/// the transport's job.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
    bytes_written: u64,
}

impl<W: Write> WriterSink<W> {
    /// Wraps `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            bytes_written: 0,
        }
    }

    /// Total bytes sent so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn send(&mut self, pixels: &[Rgb565]) -> CamFilterResult<()> {
        let io_err = |err: std::io::Error| CamFilterError::Io {
            reason: err.to_string(),
        };
        for px in pixels {
            self.writer.write_all(&px.to_be_bytes()).map_err(io_err)?;
        }
        self.writer.flush().map_err(io_err)?;
        self.bytes_written += 2 * pixels.len() as u64;
        Ok(())
    }
}

impl<W: Write> FrameSink for WriterSink<W> {
    fn display_full_frame(&mut self, frame: FrameView<'_>) -> CamFilterResult<()> {
        self.send(frame.as_slice())
    }

    fn display_region(&mut self, pixels: &[Rgb565], _start_offset: usize) -> CamFilterResult<()> {
        self.send(pixels)
    }
}

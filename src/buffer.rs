use std::io::{self, Read};

/// A window of unconsumed bytes over a buffer that is refilled from a reader.
///
/// The buffer starts small and doubles, up to a maximum, whenever the
/// unconsumed window already spans the whole buffer.
#[derive(Debug)]
pub(crate) struct BufferWindow {
    pub buf: Vec<u8>,

    // start of window into buffer
    pub start: usize,

    // end of window into buffer
    pub end: usize,

    // number of consumed bytes from prior reads
    pub prior_reads: usize,

    max_len: usize,
}

#[derive(Debug)]
pub(crate) enum BufferError {
    Io(io::Error),
    BufferFull,
}

impl BufferWindow {
    #[inline]
    pub fn window(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.prior_reads + self.start
    }

    /// Like `BufRead::fill_buf` except that unconsumed bytes are first moved
    /// to the start of the buffer so the reader can append after them.
    /// Returns the number of bytes read, zero meaning the reader is exhausted.
    pub fn fill_buf(&mut self, mut reader: impl Read) -> Result<usize, BufferError> {
        let carry_over = self.end - self.start;
        if self.start != 0 {
            self.buf.copy_within(self.start..self.end, 0);
            self.prior_reads += self.start;
            self.start = 0;
            self.end = carry_over;
        }

        if self.end == self.buf.len() {
            if self.buf.len() >= self.max_len {
                return Err(BufferError::BufferFull);
            }

            let grown = (self.buf.len() * 2).clamp(1, self.max_len);
            self.buf.resize(grown, 0);
        }

        loop {
            match reader.read(&mut self.buf[self.end..]) {
                Ok(read) => {
                    self.end += read;
                    return Ok(read);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(BufferError::Io(e)),
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct BufferWindowBuilder {
    buffer_len: usize,
    max_len: usize,
}

impl Default for BufferWindowBuilder {
    fn default() -> Self {
        Self {
            buffer_len: 32 * 1024,
            max_len: 1024 * 1024,
        }
    }
}

impl BufferWindowBuilder {
    #[inline]
    pub fn buffer_len(mut self, val: usize) -> BufferWindowBuilder {
        self.buffer_len = val;
        self
    }

    #[inline]
    pub fn max_len(mut self, val: usize) -> BufferWindowBuilder {
        self.max_len = val;
        self
    }

    pub fn build(self) -> BufferWindow {
        let buffer_len = self.buffer_len.max(1);
        BufferWindow {
            buf: vec![0; buffer_len],
            start: 0,
            end: 0,
            prior_reads: 0,
            max_len: self.max_len.max(buffer_len),
        }
    }
}

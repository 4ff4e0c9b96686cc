use std::io::{self, Read, Seek};

pub struct LittleEndianReader<R> {
    inner: R,
}

impl<R: Read + Seek> LittleEndianReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn read_u32(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    pub fn read_u32_vec(&mut self, n: usize) -> io::Result<Vec<u32>> {
        let mut result = Vec::with_capacity(n);
        for _ in 0..n {
            result.push(self.read_u32()?);
        }
        Ok(result)
    }

    /// Reads a `u32` length prefix and rejects values above `max_len`.
    pub fn read_len(&mut self, max_len: usize, what: &str) -> io::Result<usize> {
        let len = self.read_u32()? as usize;
        if len > max_len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{what} length {len} exceeds limit {max_len}"),
            ));
        }
        Ok(len)
    }

    pub fn read_to_end(&mut self) -> io::Result<Vec<u8>> {
        let mut rest = Vec::new();
        self.inner.read_to_end(&mut rest)?;
        Ok(rest)
    }

    pub fn position(&mut self) -> io::Result<u64> {
        self.inner.stream_position()
    }
}

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Stderr, Stdout, Write};

use crate::errors::Result;

pub struct Writer {
    buffer: WriteBuffer,
    err: WriteBuffer,
}

impl Writer {
    pub fn new(buffer: WriteBuffer, err: WriteBuffer) -> Self {
        Self { buffer, err }
    }

    pub fn write_err(&mut self, message: String) -> std::io::Result<()> {
        writeln!(self.err, "{message}")
    }

    pub fn into_string(self) -> Result<String> {
        self.buffer.into_string()
    }

    /// Output with ANSI color codes removed.
    pub fn stripped(self) -> Result<String> {
        self.buffer.stripped()
    }

    pub fn err_to_stripped(self) -> Result<String> {
        self.err.stripped()
    }
}

impl Write for Writer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.buffer.flush()
    }
}

pub enum WriteBuffer {
    Stdout(Stdout),
    Stderr(Stderr),
    Vec(Vec<u8>),
    File(File),
}

impl WriteBuffer {
    fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            WriteBuffer::Vec(vec) => Ok(vec),
            WriteBuffer::File(mut file) => {
                let mut data = vec![];
                file.seek(SeekFrom::Start(0))?;
                file.read_to_end(&mut data)?;
                Ok(data)
            }
            WriteBuffer::Stdout(..) | WriteBuffer::Stderr(..) => Ok(vec![]),
        }
    }

    fn into_string(self) -> Result<String> {
        utf8(self.into_bytes()?)
    }

    fn stripped(self) -> Result<String> {
        utf8(strip_ansi_escapes::strip(self.into_bytes()?)?)
    }
}

fn utf8(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e).into())
}

impl Write for WriteBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            WriteBuffer::Stdout(stdout) => stdout.write(buf),
            WriteBuffer::Stderr(stderr) => stderr.write(buf),
            WriteBuffer::Vec(vec) => vec.write(buf),
            WriteBuffer::File(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            WriteBuffer::Stdout(stdout) => stdout.flush(),
            WriteBuffer::Stderr(stderr) => stderr.flush(),
            WriteBuffer::Vec(vec) => vec.flush(),
            WriteBuffer::File(file) => file.flush(),
        }
    }
}

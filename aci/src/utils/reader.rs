use std::fs::File;
use std::io::{Cursor, Read, Stdin};

/// Source of instruction text when no `--rules` file is given.
pub struct Reader {
    source: ReadBuffer,
}

impl Reader {
    pub fn new(source: ReadBuffer) -> Self {
        Self { source }
    }

    /// In-memory source, used for piping literal text.
    pub fn from_text(text: &str) -> Self {
        Self::new(ReadBuffer::Cursor(Cursor::new(text.as_bytes().to_vec())))
    }

    pub fn read_all(&mut self) -> std::io::Result<String> {
        let mut content = String::new();
        self.read_to_string(&mut content)?;
        Ok(content)
    }
}

impl Read for Reader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.source {
            ReadBuffer::Stdin(stdin) => stdin.read(buf),
            ReadBuffer::Cursor(cursor) => cursor.read(buf),
            ReadBuffer::File(file) => file.read(buf),
        }
    }
}

pub enum ReadBuffer {
    Stdin(Stdin),
    Cursor(Cursor<Vec<u8>>),
    File(File),
}

use std::fs::File;

use bstr::BStr;

enum SourceBufferKind<'a> {
    File { buffer: mmap_rs::Mmap },
    Memory { bytes: &'a [u8] },
}

// Keeps source and a file name in the same object, so they provide the same lifetimes.
pub struct SourceBuffer<'a> {
    kind: SourceBufferKind<'a>,
    file_name: String,
}

impl<'a> SourceBuffer<'a> {
    /// Maps the input file into memory. The contents are treated as raw bytes;
    /// the lexer is responsible for flagging anything it cannot make sense of.
    pub fn new_from_file(file_path: &std::path::Path) -> Result<SourceBuffer<'_>, mmap_rs::Error> {
        let file = File::open(file_path)?;
        let len = File::metadata(&file)?.len();
        let file_name = file_path.to_string_lossy().into_owned();
        if len == 0 {
            // Zero-length mappings are rejected by the OS.
            return Ok(SourceBuffer { kind: SourceBufferKind::Memory { bytes: &[] }, file_name });
        }
        let buffer = unsafe {
            mmap_rs::MmapOptions::new(len as usize)?.with_file(file, 0).map()?
        };
        Ok(SourceBuffer { kind: SourceBufferKind::File { buffer }, file_name })
    }

    pub fn new_from_string(string: &'a str, name: &str) -> Result<SourceBuffer<'a>, mmap_rs::Error> {
        Self::new_from_bytes(string.as_bytes(), name)
    }

    pub fn new_from_bytes(bytes: &'a [u8], name: &str) -> Result<SourceBuffer<'a>, mmap_rs::Error> {
        let file_name = String::from(name);
        Ok(SourceBuffer { kind: SourceBufferKind::Memory { bytes }, file_name })
    }

    pub fn code(&self) -> &BStr {
        match &self.kind {
            SourceBufferKind::File { buffer } => BStr::new(buffer.as_slice()),
            SourceBufferKind::Memory { bytes } => BStr::new(bytes),
        }
    }

    pub fn file_name(&self) -> &str {
        self.file_name.as_str()
    }
}

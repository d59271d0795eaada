use bstr::{BStr, BString};

use crate::toolchain::diagnostics::diagnostic_emitter::DiagnosticLocation;

/// Maps byte offsets in a source buffer to (file, line, column) locations.
///
/// Built once per file by scanning the buffer for newline positions. Lookups are total over
/// `0..=len`: offsets past the end of the buffer clamp to the last position, so diagnostics
/// raised at end of input still resolve.
pub struct FileLocations {
    file_name: String,

    /// Byte offset of the first byte of each line. The first entry is always 0.
    line_starts: Vec<u32>,

    len: u32,
}

impl FileLocations {
    pub fn create(code: &BStr, file_name: &str) -> FileLocations {
        let mut line_starts = vec![0u32];
        for (i, b) in code.iter().enumerate() {
            if *b == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        FileLocations {
            file_name: String::from(file_name),
            line_starts,
            len: code.len() as u32,
        }
    }

    pub fn file_name(&self) -> &str {
        self.file_name.as_str()
    }

    /// Returns the 1-based (line, column) pair for a byte offset.
    pub fn location_of(&self, offset: u32) -> (u32, u32) {
        let offset = offset.min(self.len);
        let line = self.line_starts.partition_point(|start| *start <= offset);
        let column = offset - self.line_starts[line - 1] + 1;
        (line as u32, column)
    }

    /// Returns the text of the 1-based `line`, without its terminator.
    pub fn line_text<'s>(&self, code: &'s BStr, line: u32) -> &'s BStr {
        if line == 0 || line as usize > self.line_starts.len() {
            return BStr::new(&[]);
        }
        let start = self.line_starts[line as usize - 1] as usize;
        let end = match self.line_starts.get(line as usize) {
            Some(next) => *next as usize - 1,
            None => self.len as usize,
        };
        let bytes: &[u8] = code.as_ref();
        let mut text: &[u8] = &bytes[start..end];
        if let [head @ .., b'\r'] = text {
            text = head;
        }
        BStr::new(text)
    }

    /// Assembles the full diagnostic location for a byte offset.
    pub fn diagnostic_location(&self, code: &BStr, offset: u32) -> DiagnosticLocation {
        let (line_number, column_number) = self.location_of(offset);
        DiagnosticLocation {
            file_name: self.file_name.clone(),
            line_number,
            column_number,
            line: BString::from(self.line_text(code, line_number)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locs(code: &str) -> FileLocations {
        FileLocations::create(BStr::new(code.as_bytes()), "test.star")
    }

    #[test]
    fn empty_buffer() {
        let l = locs("");
        assert_eq!(l.location_of(0), (1, 1));
        assert_eq!(l.location_of(100), (1, 1));
    }

    #[test]
    fn single_line() {
        let l = locs("abc");
        assert_eq!(l.location_of(0), (1, 1));
        assert_eq!(l.location_of(2), (1, 3));
        assert_eq!(l.location_of(3), (1, 4));
    }

    #[test]
    fn line_boundaries() {
        let l = locs("a\nbc\n");
        assert_eq!(l.location_of(0), (1, 1));
        assert_eq!(l.location_of(1), (1, 2)); // the newline itself
        assert_eq!(l.location_of(2), (2, 1));
        assert_eq!(l.location_of(4), (2, 3));
        assert_eq!(l.location_of(5), (3, 1)); // one past the final newline
    }

    #[test]
    fn line_text_strips_terminators() {
        let code = BStr::new(b"one\r\ntwo\nthree");
        let l = FileLocations::create(code, "test.star");
        assert_eq!(l.line_text(code, 1), "one");
        assert_eq!(l.line_text(code, 2), "two");
        assert_eq!(l.line_text(code, 3), "three");
        assert_eq!(l.line_text(code, 4), "");
    }
}

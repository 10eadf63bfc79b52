//! Source files, sites and line lookup.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Index of a file within one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub u32);

/// A byte range inside one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Site {
    pub file: FileId,
    pub start: u32,
    pub end: u32,
}

impl Site {
    pub fn new(file: FileId, start: u32, end: u32) -> Self {
        Self { file, start, end }
    }

    /// Whether `other` lies entirely within this site.
    pub fn contains(&self, other: &Site) -> bool {
        self.file == other.file && self.start <= other.start && other.end <= self.end
    }

    /// Whether the byte offset lies within this site.
    pub fn covers(&self, file: FileId, offset: u32) -> bool {
        self.file == file && self.start <= offset && offset < self.end
    }
}

/// Line start table for offset to line/column conversion.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        Self { line_starts }
    }

    /// 1-based line and column of a byte offset.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let col = offset - self.line_starts[line];
        (line as u32 + 1, col + 1)
    }

    /// Byte offset of a 1-based line and column, if the line exists.
    pub fn offset(&self, line: u32, col: u32) -> Option<u32> {
        let start = *self.line_starts.get(line.checked_sub(1)? as usize)?;
        Some(start + col.saturating_sub(1))
    }
}

/// One input file of a compilation.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: FileId,
    pub name: CompactString,
    pub text: String,
    pub lines: LineIndex,
}

/// The file table of one compilation.
#[derive(Debug, Clone, Default)]
pub struct SourceFiles {
    files: Vec<SourceFile>,
}

impl SourceFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file and return its id.
    pub fn add(&mut self, name: impl Into<CompactString>, text: impl Into<String>) -> FileId {
        let id = FileId(self.files.len() as u32);
        let text = text.into();
        let lines = LineIndex::new(&text);
        self.files.push(SourceFile {
            id,
            name: name.into(),
            text,
            lines,
        });
        id
    }

    pub fn get(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.0 as usize)
    }

    pub fn name(&self, id: FileId) -> &str {
        self.get(id).map(|f| f.name.as_str()).unwrap_or("<unknown>")
    }

    pub fn find(&self, name: &str) -> Option<FileId> {
        self.files.iter().find(|f| f.name == name).map(|f| f.id)
    }

    /// Text covered by a site.
    pub fn slice(&self, site: &Site) -> &str {
        self.get(site.file)
            .and_then(|f| f.text.get(site.start as usize..site.end as usize))
            .unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

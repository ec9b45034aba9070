//! Pending lines awaiting a flush.

/// Ordered lines plus their total byte length.
#[derive(Debug, Default)]
pub struct LineBuffer {
    lines: Vec<String>,
    bytes: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line. Empty lines are ignored.
    pub fn push(&mut self, line: String) {
        if line.is_empty() {
            return;
        }
        self.bytes += line.len();
        self.lines.push(line);
    }

    pub fn len_bytes(&self) -> usize {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes == 0
    }

    /// Remove and return every pending line, oldest first.
    pub fn take(&mut self) -> Vec<String> {
        self.bytes = 0;
        std::mem::take(&mut self.lines)
    }
}

/// All lines joined for a single write.
pub fn concat(lines: &[String]) -> String {
    let total = lines.iter().map(String::len).sum();
    let mut out = String::with_capacity(total);
    for line in lines {
        out.push_str(line);
    }
    out
}

/// Keep track of a position within a str, updating on successful operations.
#[derive(Debug, Clone)]
pub struct Position<'a> {
    pub input: &'a str,
    pub idx: usize,
}

impl<'a> Position<'a> {
    pub fn new(input: &'a str) -> Self {
        Position { input, idx: 0 }
    }

    /// Input that has not been consumed yet.
    pub fn rest(&self) -> &'a str {
        &self.input[self.idx..]
    }

    pub fn at_end(&self) -> bool {
        self.idx >= self.input.len()
    }

    /// Move the index forward `n` bytes, stopping at the end of input.
    pub fn advance(&mut self, n: usize) {
        self.idx = (self.idx + n).min(self.input.len());
    }

    /// Consume a single character.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.rest().chars().next()?;
        self.idx += c.len_utf8();
        Some(c)
    }
}

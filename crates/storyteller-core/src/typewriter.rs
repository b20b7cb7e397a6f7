/// Character-by-character reveal of a fixed string.
///
/// Each call to [`Typewriter::step`] reveals one more character. The
/// revealed text is always a prefix of the full text, and a text of N
/// characters is complete after N steps. There is no way to rewind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Typewriter {
    text: String,
    /// Byte offset of the end of the revealed prefix
    cursor: usize,
    steps: usize,
}

impl Typewriter {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cursor: 0,
            steps: 0,
        }
    }

    /// A typewriter that has already revealed everything.
    pub fn revealed(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        let steps = text.chars().count();
        Self { text, cursor, steps }
    }

    /// Reveal the next character. Returns `false` once nothing is left.
    pub fn step(&mut self) -> bool {
        match self.text[self.cursor..].chars().next() {
            Some(c) => {
                self.cursor += c.len_utf8();
                self.steps += 1;
                true
            }
            None => false,
        }
    }

    pub fn shown(&self) -> &str {
        &self.text[..self.cursor]
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_done(&self) -> bool {
        self.cursor == self.text.len()
    }

    pub fn steps(&self) -> usize {
        self.steps
    }
}

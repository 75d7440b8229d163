//! Query text buffer.
//!
//! The buffer holds raw bytes so that text arriving from collaborators (paste, history, initial
//! text) is never rejected. Cursor motion works on UTF-8 boundaries: a byte is a continuation
//! byte iff its two high bits are `10`, and every other byte starts a codepoint. Malformed input
//! therefore degrades to byte-wise motion instead of failing.

use std::borrow::Cow;

use thiserror::Error;

/// `BUFSIZ - 1`: the largest query the buffer accepts.
pub const DEFAULT_CAPACITY: usize = 8191;
pub const DEFAULT_WORD_DELIMITERS: &str = " ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("inserting {requested} bytes into {len} would exceed the buffer capacity of {capacity}")]
    CapacityExceeded {
        requested: usize,
        len: usize,
        capacity: usize,
    },
}

#[inline]
fn is_continuation(byte: u8) -> bool {
    byte & 0xc0 == 0x80
}

#[derive(Debug, Clone)]
pub struct TextBuffer {
    bytes: Vec<u8>,
    cursor: usize,
    capacity: usize,
    delimiters: Vec<u8>,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_WORD_DELIMITERS)
    }
}

impl TextBuffer {
    pub fn new(capacity: usize, word_delimiters: &str) -> Self {
        Self {
            bytes: Vec::new(),
            cursor: 0,
            capacity,
            delimiters: word_delimiters.as_bytes().to_vec(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lossy UTF-8 view of the buffer.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn at_end(&self) -> bool {
        self.cursor >= self.bytes.len()
    }

    /// Inserts the first `count` bytes of `text` at the cursor, or removes `-count` bytes before
    /// the cursor when `count` is negative. The cursor ends at `cursor + count`.
    pub fn apply(&mut self, text: &[u8], count: isize) -> Result<(), BufferError> {
        if count >= 0 {
            let count = (count as usize).min(text.len());
            if self.bytes.len() + count > self.capacity {
                return Err(BufferError::CapacityExceeded {
                    requested: count,
                    len: self.bytes.len(),
                    capacity: self.capacity,
                });
            }
            let tail = self.bytes.split_off(self.cursor);
            self.bytes.extend_from_slice(&text[..count]);
            self.bytes.extend_from_slice(&tail);
            self.cursor += count;
        } else {
            let start = self.cursor.saturating_sub(count.unsigned_abs());
            self.bytes.drain(start..self.cursor);
            self.cursor = start;
        }
        Ok(())
    }

    pub fn insert(&mut self, text: &[u8]) -> Result<(), BufferError> {
        self.apply(text, text.len() as isize)
    }

    pub fn insert_str(&mut self, text: &str) -> Result<(), BufferError> {
        self.insert(text.as_bytes())
    }

    /// Inserts pasted bytes up to, not including, the first line break.
    pub fn insert_first_line(&mut self, text: &[u8]) -> Result<(), BufferError> {
        let end = text
            .iter()
            .position(|byte| *byte == b'\n')
            .unwrap_or(text.len());
        self.insert(&text[..end])
    }

    /// Replaces the whole content and parks the cursor at the end. Content beyond capacity is cut
    /// at the last codepoint boundary that fits.
    pub fn set_text(&mut self, text: &[u8]) {
        let mut end = text.len().min(self.capacity);
        while end > 0 && end < text.len() && is_continuation(text[end]) {
            end -= 1;
        }
        self.bytes.clear();
        self.bytes.extend_from_slice(&text[..end]);
        self.cursor = self.bytes.len();
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
        self.cursor = 0;
    }

    /// Offset of the next codepoint boundary from the cursor, clamped to the buffer ends.
    pub fn next_boundary(&self, direction: Direction) -> usize {
        self.boundary_from(self.cursor, direction)
    }

    fn boundary_from(&self, from: usize, direction: Direction) -> usize {
        match direction {
            Direction::Forward => {
                if from >= self.bytes.len() {
                    return self.bytes.len();
                }
                let mut offset = from + 1;
                while offset < self.bytes.len() && is_continuation(self.bytes[offset]) {
                    offset += 1;
                }
                offset
            }
            Direction::Backward => {
                if from == 0 {
                    return 0;
                }
                let mut offset = from - 1;
                while offset > 0 && is_continuation(self.bytes[offset]) {
                    offset -= 1;
                }
                offset
            }
        }
    }

    fn is_delimiter(&self, byte: u8) -> bool {
        self.delimiters.contains(&byte)
    }

    fn byte_before_cursor(&self) -> Option<u8> {
        if self.cursor == 0 {
            return None;
        }
        self.bytes.get(self.next_boundary(Direction::Backward)).copied()
    }

    /// Moves one codepoint. Returns whether the cursor moved.
    pub fn move_cursor(&mut self, direction: Direction) -> bool {
        let target = self.next_boundary(direction);
        let moved = target != self.cursor;
        self.cursor = target;
        moved
    }

    pub fn move_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.bytes.len();
    }

    /// Skips delimiters, then non-delimiters, landing on a word edge: the start of the previous
    /// word when moving backward, the end of the next word when moving forward.
    pub fn move_word(&mut self, direction: Direction) {
        match direction {
            Direction::Backward => {
                while self
                    .byte_before_cursor()
                    .is_some_and(|byte| self.is_delimiter(byte))
                {
                    self.cursor = self.next_boundary(Direction::Backward);
                }
                while self
                    .byte_before_cursor()
                    .is_some_and(|byte| !self.is_delimiter(byte))
                {
                    self.cursor = self.next_boundary(Direction::Backward);
                }
            }
            Direction::Forward => {
                while self
                    .bytes
                    .get(self.cursor)
                    .is_some_and(|byte| self.is_delimiter(*byte))
                {
                    self.cursor = self.next_boundary(Direction::Forward);
                }
                while self
                    .bytes
                    .get(self.cursor)
                    .is_some_and(|byte| !self.is_delimiter(*byte))
                {
                    self.cursor = self.next_boundary(Direction::Forward);
                }
            }
        }
    }

    /// Deletes the codepoint before the cursor. Returns whether anything was removed.
    pub fn delete_backward(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let start = self.next_boundary(Direction::Backward);
        self.remove_back_to(start)
    }

    /// Deletes the codepoint under the cursor.
    pub fn delete_forward(&mut self) -> bool {
        if self.at_end() {
            return false;
        }
        self.cursor = self.next_boundary(Direction::Forward);
        self.delete_backward()
    }

    /// Deletes back to the start of the previous word, the same span `move_word` would cross.
    pub fn delete_word_backward(&mut self) -> bool {
        let end = self.cursor;
        self.move_word(Direction::Backward);
        let start = self.cursor;
        self.cursor = end;
        self.remove_back_to(start)
    }

    pub fn delete_to_start(&mut self) -> bool {
        self.remove_back_to(0)
    }

    fn remove_back_to(&mut self, start: usize) -> bool {
        if start >= self.cursor {
            return false;
        }
        let count = (self.cursor - start) as isize;
        // Negative counts never fail the capacity check.
        self.apply(&[], -count).is_ok()
    }
}

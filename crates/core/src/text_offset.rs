//! Line model shared by the editor and the cursor store.
//!
//! Editors hold `\n`-separated lines and drop one trailing line break.
//! [`LineFormat`] remembers how a note ended its lines so edited text is
//! written back with the same breaks, and converts caret positions.
//!
//! Stored cursors are character offsets into the note as it is on disk;
//! a `\r\n` break counts as two characters.

/// Number of characters in `text`; the offset of the end-of-text caret
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Line terminator style of a loaded note
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineFormat {
    crlf: bool,
    trailing_newline: bool,
}

impl LineFormat {
    pub fn detect(text: &str) -> Self {
        Self {
            crlf: text.contains("\r\n"),
            trailing_newline: text.ends_with('\n'),
        }
    }

    fn ending(&self) -> &'static str {
        if self.crlf {
            "\r\n"
        } else {
            "\n"
        }
    }

    fn ending_len(&self) -> usize {
        self.ending().len()
    }

    /// Text to hand to an editor that only understands `\n`
    pub fn editor_text(text: &str) -> String {
        text.replace("\r\n", "\n")
    }

    /// Rebuild note text from editor lines
    pub fn join<S: AsRef<str>>(&self, lines: &[S]) -> String {
        let mut text = lines
            .iter()
            .map(AsRef::<str>::as_ref)
            .collect::<Vec<_>>()
            .join(self.ending());
        if self.trailing_newline {
            text.push_str(self.ending());
        }
        text
    }

    /// Note offset of an editor (line, byte column) position, clamped to the text
    pub fn offset_from_position<S: AsRef<str>>(
        &self,
        lines: &[S],
        line: usize,
        byte_column: usize,
    ) -> usize {
        let mut offset = 0;
        for (index, content) in lines.iter().map(AsRef::<str>::as_ref).enumerate() {
            if index == line {
                let mut column = byte_column.min(content.len());
                while !content.is_char_boundary(column) {
                    column -= 1;
                }
                return offset + char_len(&content[..column]);
            }
            offset += char_len(content) + self.ending_len();
        }
        char_len(&self.join(lines))
    }

    /// Editor (line, character column) of a note offset, clamped to the text.
    /// An offset inside a `\r\n` break lands at the end of its line.
    pub fn position_from_offset<S: AsRef<str>>(&self, lines: &[S], offset: usize) -> (usize, usize) {
        let last = lines.len().saturating_sub(1);
        let mut remaining = offset;
        for (index, content) in lines.iter().map(AsRef::<str>::as_ref).enumerate() {
            let len = char_len(content);
            if remaining <= len || index == last {
                return (index, remaining.min(len));
            }
            if remaining < len + self.ending_len() {
                return (index, len);
            }
            remaining -= len + self.ending_len();
        }
        (0, 0)
    }

    /// Single-character moves from the document start to `position`
    pub fn editor_steps<S: AsRef<str>>(lines: &[S], (line, column): (usize, usize)) -> usize {
        lines
            .iter()
            .take(line)
            .map(|content| char_len(content.as_ref()) + 1)
            .sum::<usize>()
            + column
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lines as the editor holds them: `\n` breaks, last break dropped
    fn lines(text: &str) -> Vec<String> {
        let editor = LineFormat::editor_text(text);
        let trimmed = editor.strip_suffix('\n').unwrap_or(&editor);
        trimmed.split('\n').map(str::to_string).collect()
    }

    #[test]
    fn test_offset_counts_newlines() {
        let text = "ab\ncd\n\nef";
        let format = LineFormat::detect(text);
        let lines = lines(text);
        assert_eq!(format.offset_from_position(&lines, 0, 0), 0);
        assert_eq!(format.offset_from_position(&lines, 1, 1), 4);
        assert_eq!(format.offset_from_position(&lines, 2, 0), 6);
        assert_eq!(format.offset_from_position(&lines, 3, 2), 9);
    }

    #[test]
    fn test_offset_uses_characters_not_bytes() {
        let text = "héllo\nwörld";
        let format = LineFormat::detect(text);
        let lines = lines(text);
        // byte column 3 is after "hé"
        assert_eq!(format.offset_from_position(&lines, 0, 3), 2);
        // byte column 2 falls inside "é"; rounds down to the boundary
        assert_eq!(format.offset_from_position(&lines, 0, 2), 1);
        assert_eq!(format.offset_from_position(&lines, 1, 3), 8);
    }

    #[test]
    fn test_out_of_range_positions_clamp() {
        let text = "abc\nde";
        let format = LineFormat::detect(text);
        let lines = lines(text);
        assert_eq!(format.offset_from_position(&lines, 0, 99), 3);
        assert_eq!(format.offset_from_position(&lines, 9, 0), 6);
    }

    #[test]
    fn test_crlf_breaks_count_two_characters() {
        let text = "ab\r\ncd";
        let format = LineFormat::detect(text);
        let lines = lines(text);
        assert_eq!(format.offset_from_position(&lines, 1, 1), 5);
        assert_eq!(format.position_from_offset(&lines, 5), (1, 1));
        assert_eq!(format.position_from_offset(&lines, 4), (1, 0));
        // Between \r and \n
        assert_eq!(format.position_from_offset(&lines, 3), (0, 2));
        assert_eq!(format.position_from_offset(&lines, 99), (1, 2));
    }

    #[test]
    fn test_join_restores_breaks() {
        for text in ["abc\n", "a\r\nb", "a\n\nb\n\n", "a\r\nb\r\n", "", "plain"] {
            let format = LineFormat::detect(text);
            assert_eq!(format.join(&lines(text)), text, "{:?}", text);
        }
    }

    #[test]
    fn test_editor_steps_count_one_per_break() {
        let lines = ["ab", "", "cd"];
        assert_eq!(LineFormat::editor_steps(&lines, (0, 1)), 1);
        assert_eq!(LineFormat::editor_steps(&lines, (2, 0)), 4);
        assert_eq!(LineFormat::editor_steps(&lines, (2, 2)), 6);
    }
}

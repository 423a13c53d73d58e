//! Line and block comments

use super::Lexer;

impl Lexer {
    /// Skips `// ...` up to, but not including, the terminating newline so the
    /// newline can still end the statement.
    pub(super) fn skip_line_comment(&mut self) {
        while let Some(ch) = self.current_char {
            if ch == '\n' {
                break;
            }
            self.read_char();
        }
    }

    /// Skips `/* ... */`. Returns whether the comment spanned a newline, or
    /// `None` when input ended before the closing `*/`.
    pub(super) fn skip_block_comment(&mut self) -> Option<bool> {
        self.read_char(); // consume '/'
        self.read_char(); // consume '*'
        let mut saw_newline = false;

        loop {
            match (self.current_char, self.peek_char()) {
                (Some('*'), Some('/')) => {
                    self.read_char();
                    self.read_char();
                    return Some(saw_newline);
                }
                (Some(ch), _) => {
                    saw_newline |= ch == '\n';
                    self.read_char();
                }
                (None, _) => return None,
            }
        }
    }
}

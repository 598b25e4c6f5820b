//! Splits a raw completion buffer into [`ParsedInput`]: the words completed
//! so far plus the in-progress partial word, if any.

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedInput {
    pub completed_words: Vec<String>,
    pub partial_word: Option<String>,
    pub has_trailing_space: bool,
    pub cursor_index: usize,
}

/// Tokenizes on whitespace, preserving a quoted run (`"..."` or `'...'`) as
/// a single word. Does not unescape backslashes; this is completion input,
/// not a shell parser. Only the portion of `buffer` up to `cursor_index`
/// (a byte offset, clamped to the nearest char boundary) is considered, so
/// completing mid-word uses the prefix up to the cursor as `partial_word`
/// and ignores whatever follows it.
pub fn tokenize(buffer: &str, cursor_index: usize) -> ParsedInput {
    let mut cursor_index = cursor_index.min(buffer.len());
    while cursor_index > 0 && !buffer.is_char_boundary(cursor_index) {
        cursor_index -= 1;
    }
    let prefix = &buffer[..cursor_index];

    let has_trailing_space = prefix.ends_with(char::is_whitespace);
    let words = split_words(prefix);

    if has_trailing_space || words.is_empty() {
        ParsedInput {
            completed_words: words,
            partial_word: None,
            has_trailing_space,
            cursor_index,
        }
    } else {
        let mut words = words;
        let partial = words.pop();
        ParsedInput {
            completed_words: words,
            partial_word: partial,
            has_trailing_space: false,
            cursor_index,
        }
    }
}

/// Tokenizes the whole buffer, as if the cursor were at its end.
pub fn tokenize_all(buffer: &str) -> ParsedInput {
    tokenize(buffer, buffer.len())
}

fn split_words(buffer: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quotes: Option<char> = None;
    let mut chars = buffer.chars().peekable();

    while let Some(c) = chars.next() {
        match in_quotes {
            Some(q) if c == q => in_quotes = None,
            Some(_) => current.push(c),
            None => {
                if c == '"' || c == '\'' {
                    in_quotes = Some(c);
                } else if c.is_whitespace() {
                    if !current.is_empty() {
                        words.push(std::mem::take(&mut current));
                    }
                } else {
                    current.push(c);
                }
            }
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

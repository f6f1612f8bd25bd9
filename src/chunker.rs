//! Message chunking
//!
//! Splits long reply text into pieces that fit the transport's per-message
//! limit. Splitting prefers line boundaries, falls back to word boundaries
//! for oversized lines, and hard-splits single words that are longer than a
//! whole chunk.

/// Splits `text` into chunks of at most `max_size` characters.
///
/// Lines are packed greedily: a line joins the current chunk unless that
/// would push it past the limit, in which case the chunk is flushed. The
/// function is pure and never fails; empty input yields no chunks. Joining
/// the chunks of a text whose lines all fit reproduces the original text.
pub fn split_into_chunks(text: &str, max_size: usize) -> Vec<String> {
    let max_size = max_size.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for line in text.split('\n') {
        let line_len = line.chars().count();

        // +1 accounts for the newline that would join the line on
        if current_len + line_len + 1 > max_size {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }

            if line_len > max_size {
                split_long_line(line, max_size, &mut chunks);
            } else {
                current.push_str(line);
                current_len = line_len;
            }
        } else {
            if !current.is_empty() {
                current.push('\n');
                current_len += 1;
            }
            current.push_str(line);
            current_len += line_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Splits a single oversized line at word boundaries with the same greedy
/// fill rule, hard-splitting words that exceed a whole chunk on their own.
fn split_long_line(line: &str, max_size: usize, chunks: &mut Vec<String>) {
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in line.split(' ') {
        let word_len = word.chars().count();

        if current_len + word_len + 1 > max_size {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }

            if word_len > max_size {
                split_word(word, max_size, chunks);
            } else {
                current.push_str(word);
                current_len = word_len;
            }
        } else {
            if !current.is_empty() {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(word);
            current_len += word_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
}

/// Hard-splits a word into fixed-size pieces at character boundaries.
fn split_word(word: &str, max_size: usize, chunks: &mut Vec<String>) {
    let mut piece = String::new();
    let mut piece_len = 0usize;

    for ch in word.chars() {
        if piece_len == max_size {
            chunks.push(std::mem::take(&mut piece));
            piece_len = 0;
        }
        piece.push(ch);
        piece_len += 1;
    }

    if !piece.is_empty() {
        chunks.push(piece);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = split_into_chunks("hello\nworld", 100);
        assert_eq!(chunks, vec!["hello\nworld".to_string()]);
    }

    #[test]
    fn test_empty_text_no_chunks() {
        assert!(split_into_chunks("", 100).is_empty());
    }

    #[test]
    fn test_splits_at_line_boundaries() {
        let text = "aaaa\nbbbb\ncccc";
        let chunks = split_into_chunks(text, 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb".to_string(), "cccc".to_string()]);
    }

    #[test]
    fn test_every_chunk_within_limit() {
        let text = "one two three four five six seven eight nine ten\n\
                    a somewhat longer second line with more words in it\n\
                    short";
        for max in [5, 8, 13, 20, 64] {
            for chunk in split_into_chunks(text, max) {
                assert!(
                    chunk.chars().count() <= max,
                    "chunk {:?} exceeds {}",
                    chunk,
                    max
                );
            }
        }
    }

    #[test]
    fn test_rejoining_reconstructs_lines() {
        let text = "first line\nsecond line\nthird line\nfourth line";
        let chunks = split_into_chunks(text, 25);
        assert_eq!(chunks.join("\n"), text);
    }

    #[test]
    fn test_long_line_splits_at_words() {
        let chunks = split_into_chunks("alpha beta gamma delta", 11);
        assert_eq!(
            chunks,
            vec!["alpha beta".to_string(), "gamma delta".to_string()]
        );
    }

    #[test]
    fn test_long_word_hard_split() {
        let chunks = split_into_chunks("abcdefghij", 4);
        assert_eq!(
            chunks,
            vec!["abcd".to_string(), "efgh".to_string(), "ij".to_string()]
        );
    }

    #[test]
    fn test_multibyte_characters_split_on_boundaries() {
        let text = "ääääää";
        let chunks = split_into_chunks(text, 4);
        assert_eq!(chunks, vec!["ääää".to_string(), "ää".to_string()]);
    }

    #[test]
    fn test_blank_lines_preserved_in_rejoin() {
        let text = "top\n\nbottom";
        let chunks = split_into_chunks(text, 50);
        assert_eq!(chunks.join("\n"), text);
    }
}

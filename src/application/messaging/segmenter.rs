//! Text segmenter - splits long text into platform-safe chunks
//!
//! Chat platforms cap outbound messages (2,000 characters on the platforms
//! this bot targets), so anything longer has to go out as an ordered run of
//! chunks. `segment` is pure and deterministic: concatenating its output in
//! order reproduces the input exactly.

/// Split `text` into ordered chunks of at most `max_len` characters.
///
/// Splits never land inside a multibyte character. When the window contains
/// whitespace the split happens after the last whitespace character so words
/// survive intact; otherwise the split is a hard cut at the limit. Empty
/// input yields zero chunks.
pub fn segment(text: &str, max_len: usize) -> Vec<String> {
    debug_assert!(max_len > 0, "chunk limit must be positive");

    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let mut chars = 0usize;
        let mut hard_end = rest.len();
        let mut ws_end = None;

        for (i, ch) in rest.char_indices() {
            if chars == max_len {
                hard_end = i;
                break;
            }
            chars += 1;
            if ch.is_whitespace() {
                ws_end = Some(i + ch.len_utf8());
            }
        }

        if hard_end == rest.len() {
            // Remainder fits in one chunk
            chunks.push(rest.to_string());
            break;
        }

        let split = ws_end.unwrap_or(hard_end);
        let (chunk, tail) = rest.split_at(split);
        chunks.push(chunk.to_string());
        rest = tail;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(segment("", 2000).is_empty());
        assert!(segment("", 1).is_empty());
    }

    #[test]
    fn input_at_limit_is_one_chunk() {
        let text = "x".repeat(2000);
        let chunks = segment(&text, 2000);
        assert_eq!(chunks, vec![text]);
    }

    #[test]
    fn hard_split_without_whitespace() {
        let text = "a".repeat(4001);
        let chunks = segment(&text, 2000);
        assert_eq!(
            chunks.iter().map(String::len).collect::<Vec<_>>(),
            vec![2000, 2000, 1]
        );
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn concatenation_reproduces_input() {
        let text = "the quick brown fox jumps over the lazy dog ".repeat(100);
        for limit in [1, 7, 40, 2000] {
            let chunks = segment(&text, limit);
            assert_eq!(chunks.concat(), text, "limit {}", limit);
            assert!(chunks.iter().all(|c| c.chars().count() <= limit));
        }
    }

    #[test]
    fn prefers_whitespace_boundaries() {
        let chunks = segment("hello world again", 12);
        assert_eq!(chunks, vec!["hello world ", "again"]);
    }

    #[test]
    fn never_splits_inside_multibyte_chars() {
        let text = "é".repeat(10);
        let chunks = segment(&text, 3);
        assert_eq!(chunks.concat(), text);
        assert!(chunks.iter().all(|c| c.chars().count() <= 3));
    }
}

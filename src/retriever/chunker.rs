//! Splitting documents into overlapping passages.

/// Target passage length, in characters.
pub const CHUNK_SIZE: usize = 500;

/// Characters shared between consecutive passages.
pub const CHUNK_OVERLAP: usize = 50;

/// Splits `text` into passages of at most `size` characters.
///
/// Consecutive passages share up to `overlap` characters, starting on a word boundary
/// when one exists. Inside each window the split
/// prefers a paragraph break, then a line break, then a space, falling back to a hard
/// cut. Passages are trimmed and blank ones dropped.
///
/// # Examples
///
/// ```
/// use ecoroute::retriever::chunk_text;
///
/// let chunks = chunk_text("short note", 500, 50);
/// assert_eq!(chunks, vec!["short note"]);
/// ```
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let size = size.max(1);
    let overlap = overlap.min(size - 1);
    let chars: Vec<char> = text.chars().collect();

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = (start + size).min(chars.len());
        if end < chars.len() {
            end = find_break(&chars, start + overlap + 1, end).unwrap_or(end);
        }

        let chunk: String = chars[start..end].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }

        if end >= chars.len() {
            break;
        }
        start = align_to_word(&chars, end - overlap, end);
    }

    chunks
}

/// Moves an overlap start forward to the next word start before `end`, if any.
fn align_to_word(chars: &[char], start: usize, end: usize) -> usize {
    if start == 0 || chars[start - 1].is_whitespace() {
        return start;
    }

    (start + 1..end)
        .find(|&j| chars[j - 1].is_whitespace())
        .unwrap_or(start)
}

/// Finds the last separator boundary in `min..=end`, trying separators in priority order.
fn find_break(chars: &[char], min: usize, end: usize) -> Option<usize> {
    const SEPARATORS: [&[char]; 3] = [&['\n', '\n'], &['\n'], &[' ']];

    if min > end {
        return None;
    }

    SEPARATORS.iter().find_map(|sep| {
        (min..=end)
            .rev()
            .find(|&i| i >= sep.len() && chars[i - sep.len()..i] == **sep)
    })
}

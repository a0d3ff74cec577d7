pub struct MessageFormatter;

impl MessageFormatter {
    pub fn count_chars(text: &str) -> usize {
        text.chars().count()
    }

    /// splits a reply into chunks of at most `max_length` characters, preferring line breaks
    pub fn split_message_into_chunks(text: &str, max_length: usize) -> Vec<String> {
        let max_length = max_length.max(1);
        if Self::count_chars(text) <= max_length {
            return vec![text.to_string()];
        }

        let mut chunks = Vec::new();
        let mut current_chunk = String::new();
        let mut current_len = 0;

        for line in text.lines() {
            let line_len = Self::count_chars(line) + 1;

            if current_len + line_len > max_length && !current_chunk.is_empty() {
                chunks.push(current_chunk.trim_end().to_string());
                current_chunk.clear();
                current_len = 0;
            }

            // a single line longer than the limit is cut at character boundaries
            if line_len > max_length {
                let chars: Vec<char> = line.chars().collect();
                for piece in chars.chunks(max_length) {
                    chunks.push(piece.iter().collect());
                }
                continue;
            }

            current_chunk.push_str(line);
            current_chunk.push('\n');
            current_len += line_len;
        }

        if !current_chunk.trim().is_empty() {
            chunks.push(current_chunk.trim_end().to_string());
        }

        chunks.retain(|c| !c.is_empty());
        chunks
    }
}

/// Words that carry no signal about which files a task touches.
const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "also", "because", "been", "before", "being", "below",
    "between", "both", "could", "does", "doesn", "doing", "done", "each", "every", "from",
    "have", "having", "here", "into", "just", "like", "make", "more", "most", "much", "must",
    "need", "needs", "only", "other", "over", "please", "really", "same", "should", "some",
    "something", "still", "such", "than", "that", "their", "them", "then", "there", "these",
    "they", "thing", "things", "this", "those", "through", "under", "until", "very", "want",
    "wants", "were", "what", "when", "where", "which", "while", "will", "with", "within",
    "without", "would", "your", "sure", "stuff", "whatever", "somehow", "currently",
];

/// Lower-cased keywords longer than three characters, stop words removed,
/// first occurrence order kept.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for word in text.split(|c: char| !(c.is_alphanumeric() || c == '_')) {
        let word = word.to_lowercase();
        if word.chars().count() <= 3 {
            continue;
        }
        if STOP_WORDS.contains(&word.as_str()) {
            continue;
        }
        if word.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if !keywords.contains(&word) {
            keywords.push(word);
        }
    }
    keywords
}

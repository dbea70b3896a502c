use std::cmp::Ordering;

/// Order topic names the way a reader expects: case and common Latin
/// diacritics are ignored first, the raw string breaks ties.
#[must_use]
pub fn compare_topics(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Sort and deduplicate topic names in place.
pub fn sort_topics(topics: &mut Vec<String>) {
    topics.sort_by(|a, b| compare_topics(a, b));
    topics.dedup();
}

fn collation_key(topic: &str) -> String {
    topic.chars().flat_map(char::to_lowercase).map(fold).collect()
}

fn fold(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

use serde_json::Value;

pub fn pretty_excerpt(value: &Value, max_chars: usize) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());

    match pretty.char_indices().nth(max_chars) {
        Some((cut, _)) => pretty[..cut].to_string(),
        None => pretty,
    }
}

/// Truncate a string to at most `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Compact like count, e.g. `987`, `12.3k`, `4.1M`
pub fn format_likes(likes: u64) -> String {
  match likes {
    0..=999 => likes.to_string(),
    1_000..=999_999 => format!("{:.1}k", likes as f64 / 1_000.0),
    _ => format!("{:.1}M", likes as f64 / 1_000_000.0),
  }
}

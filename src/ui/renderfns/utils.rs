use ratatui::prelude::Color;

/// Truncate a string to `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Display color for a task status
pub fn status_color(status: &str) -> Color {
  match status.to_lowercase().replace(['_', '-'], " ").as_str() {
    "done" | "completed" | "closed" => Color::Green,
    "in progress" | "doing" | "review" => Color::Yellow,
    "blocked" | "overdue" => Color::Red,
    _ => Color::White,
  }
}

use crate::resources::Resource;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use serde_json::Value;

/// Every column of one record, read from its serialized form.
pub struct RecordDetailView {
  title: String,
  fields: Vec<(String, String)>,
  scroll: u16,
}

fn display_value(value: &Value) -> String {
  match value {
    Value::Null => "-".to_string(),
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

impl RecordDetailView {
  pub fn new<R: Resource>(label: &str, record: &R) -> Self {
    let fields = match serde_json::to_value(record) {
      Ok(Value::Object(map)) => map
        .iter()
        .map(|(name, value)| (name.clone(), display_value(value)))
        .collect(),
      Ok(other) => vec![("value".to_string(), display_value(&other))],
      Err(e) => {
        tracing::warn!(error = %e, "failed to serialize record for display");
        Vec::new()
      }
    };

    Self {
      title: format!("{} {}", label, record.key()),
      fields,
      scroll: 0,
    }
  }
}

impl View for RecordDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.scroll = self.scroll.saturating_add(1);
        ViewAction::None
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.scroll = self.scroll.saturating_sub(1);
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(format!(" {} ", self.title))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let width = self
      .fields
      .iter()
      .map(|(name, _)| name.len())
      .max()
      .unwrap_or(0);
    let lines: Vec<Line> = self
      .fields
      .iter()
      .map(|(name, value)| {
        Line::from(vec![
          Span::styled(
            format!("{:<width$}  ", name, width = width),
            Style::default().fg(Color::DarkGray),
          ),
          Span::raw(value.as_str()),
        ])
      })
      .collect();

    let paragraph = Paragraph::new(lines)
      .block(block)
      .wrap(Wrap { trim: false })
      .scroll((self.scroll, 0));
    frame.render_widget(paragraph, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.title.clone()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("j/k", "scroll").with_priority(20),
      ShortcutInfo::new("q", "back").with_priority(30),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::remote::types::Tag;
  use crate::testing::render_to_string;

  #[test]
  fn test_shows_every_field() {
    let tag = Tag {
      tag_id: "g1".to_string(),
      name: "urgent".to_string(),
    };
    let mut view = RecordDetailView::new("Tags", &tag);
    assert_eq!(view.breadcrumb_label(), "Tags g1");

    let screen = render_to_string(&mut view, 60, 6);
    assert!(screen.contains("tag_id  g1"));
    assert!(screen.contains("name    urgent"));
  }
}

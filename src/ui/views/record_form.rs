use crate::query::{Mutation, MutationState};
use crate::resources::{parse_new_record, FieldKind, Resource};
use crate::ui::components::{InputResult, TextInput};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::workspace::Workspace;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Add-record form: one input per insert column.
pub struct RecordFormView<R: Resource> {
  inputs: Vec<TextInput>,
  focused: usize,
  mutation: Mutation<R::New, Vec<R>>,
  /// Conversion or remote error of the last submit
  error: Option<String>,
}

impl<R: Resource> RecordFormView<R> {
  pub fn new(ws: Workspace) -> Self {
    let mutation = Mutation::new(move |record: R::New| {
      let ws = ws.clone();
      async move { ws.add::<R>(&record).await.map_err(|e| e.to_string()) }
    });

    Self {
      inputs: R::FIELDS.iter().map(|_| TextInput::new()).collect(),
      focused: 0,
      mutation,
      error: None,
    }
  }

  fn submit(&mut self) {
    let values: Vec<String> = self.inputs.iter().map(|i| i.value().to_string()).collect();

    // Typed conversion happens before any request
    match parse_new_record::<R>(&values) {
      Ok(record) => {
        self.error = None;
        self.mutation.mutate(record);
      }
      Err(e) => self.error = Some(e.to_string()),
    }
  }

  fn focus(&mut self, delta: isize) {
    let len = self.inputs.len() as isize;
    if len > 0 {
      self.focused = (self.focused as isize + delta).rem_euclid(len) as usize;
    }
  }
}

fn kind_hint(kind: FieldKind) -> &'static str {
  match kind {
    FieldKind::Text => "",
    FieldKind::Integer => " (number)",
    FieldKind::Boolean => " (true/false)",
  }
}

impl<R: Resource> View for RecordFormView<R> {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
      self.submit();
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Esc => return ViewAction::Pop,
      KeyCode::Tab | KeyCode::Down | KeyCode::Enter => self.focus(1),
      KeyCode::BackTab | KeyCode::Up => self.focus(-1),
      _ => {
        if self.mutation.is_pending() {
          return ViewAction::None;
        }
        if let Some(input) = self.inputs.get_mut(self.focused) {
          if input.handle_key(key) == InputResult::Consumed {
            self.error = None;
          }
        }
      }
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let title = if self.mutation.is_pending() {
      format!(" Add to {} (saving...) ", R::INFO.table)
    } else {
      format!(" Add to {} ", R::INFO.table)
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let label_width = R::FIELDS
      .iter()
      .map(|f| f.name.len() + kind_hint(f.kind).len() + 1)
      .max()
      .unwrap_or(0);

    let mut lines: Vec<Line> = R::FIELDS
      .iter()
      .zip(&self.inputs)
      .enumerate()
      .map(|(i, (field, input))| {
        let focused = i == self.focused;
        let label = format!(
          "{}{}{}",
          field.name,
          if field.required { "*" } else { "" },
          kind_hint(field.kind)
        );
        let label_style = if focused {
          Style::default().fg(Color::Cyan).bold()
        } else {
          Style::default().fg(Color::DarkGray)
        };

        let mut spans = vec![
          Span::styled(if focused { "> " } else { "  " }, label_style),
          Span::styled(
            format!("{:<width$} ", label, width = label_width),
            label_style,
          ),
          Span::raw(input.value().to_string()),
        ];
        if focused {
          spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
        }
        Line::from(spans)
      })
      .collect();

    lines.push(Line::raw(""));
    if let Some(error) = &self.error {
      lines.push(Line::styled(
        format!("Error: {}", error),
        Style::default().fg(Color::Red),
      ));
    } else {
      lines.push(Line::styled(
        "* required   Ctrl-S save   Esc cancel",
        Style::default().fg(Color::DarkGray),
      ));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
  }

  fn breadcrumb_label(&self) -> String {
    format!("Add {}", R::INFO.label)
  }

  fn tick(&mut self) -> ViewAction {
    if !self.mutation.poll() {
      return ViewAction::None;
    }

    match self.mutation.state() {
      MutationState::Success(_) => ViewAction::Pop,
      MutationState::Error(e) => {
        tracing::warn!(table = R::INFO.table, error = %e, "insert failed");
        self.error = Some(e.clone());
        ViewAction::None
      }
      _ => ViewAction::None,
    }
  }

  fn captures_input(&self) -> bool {
    true
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("Tab", "next field").with_priority(10),
      ShortcutInfo::new("Ctrl-S", "save").with_priority(20),
      ShortcutInfo::new("Esc", "cancel").with_priority(30),
    ]
  }
}

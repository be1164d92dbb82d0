use crate::query::{Mutation, MutationState};
use crate::remote::StoredObject;
use crate::ui::components::{InputResult, TextInput};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::upload::{collect_selection, upload_png_files};
use crate::workspace::Workspace;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

const SUCCESS: &str = "Files uploaded successfully!";
const FAILURE: &str = "Error uploading files.";

/// Where the upload view is, derived from its mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UploadState {
  Idle,
  Uploading,
  Success,
  Error,
}

/// Pick local PNG files (paths or directories) and push them to storage.
pub struct UploadView {
  bucket: String,
  input: TextInput,
  mutation: Mutation<String, Vec<StoredObject>>,
}

impl UploadView {
  pub fn new(ws: Workspace) -> Self {
    let bucket = ws.bucket().to_string();
    let mutation = Mutation::new(move |selection: String| {
      let ws = ws.clone();
      async move {
        let files = collect_selection(&selection).map_err(|e| e.to_string())?;
        upload_png_files(&ws, files).await.map_err(|e| {
          tracing::error!(error = %e, "upload failed");
          e.to_string()
        })
      }
    });

    Self {
      bucket,
      input: TextInput::new(),
      mutation,
    }
  }

  fn state(&self) -> UploadState {
    match self.mutation.state() {
      MutationState::Idle => UploadState::Idle,
      MutationState::Pending => UploadState::Uploading,
      MutationState::Success(_) => UploadState::Success,
      MutationState::Error(_) => UploadState::Error,
    }
  }

  fn state_line(&self) -> Line<'static> {
    match self.state() {
      UploadState::Idle => Line::styled(
        "Enter uploads the selection. Directories add their *.png files.",
        Style::default().fg(Color::DarkGray),
      ),
      UploadState::Uploading => Line::styled("Uploading...", Style::default().fg(Color::Yellow)),
      UploadState::Success => Line::styled(SUCCESS, Style::default().fg(Color::Green)),
      UploadState::Error => Line::styled(FAILURE, Style::default().fg(Color::Red)),
    }
  }
}

impl View for UploadView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.state() == UploadState::Uploading {
      return match key.code {
        KeyCode::Esc => ViewAction::Pop,
        _ => ViewAction::None,
      };
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(selection) => {
        self.mutation.mutate(selection);
      }
      InputResult::Cancelled => return ViewAction::Pop,
      InputResult::Consumed => {
        // Editing the selection starts a new attempt
        if self.state() != UploadState::Idle {
          self.mutation.reset();
        }
      }
      InputResult::NotHandled => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(format!(" Upload PNG files to {} ", self.bucket))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let mut lines = vec![
      Line::from(vec![
        Span::styled("Files: ", Style::default().fg(Color::DarkGray)),
        Span::raw(self.input.value().to_string()),
        Span::styled("_", Style::default().fg(Color::Yellow)),
      ]),
      Line::raw(""),
      self.state_line(),
    ];

    if let MutationState::Success(stored) = self.mutation.state() {
      lines.extend(stored.iter().map(|object| {
        Line::styled(
          format!("  {}", object.key),
          Style::default().fg(Color::DarkGray),
        )
      }));
    }

    let paragraph = Paragraph::new(lines)
      .block(block)
      .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Upload".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    self.mutation.poll();
    ViewAction::None
  }

  fn captures_input(&self) -> bool {
    true
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("Enter", "upload").with_priority(10),
      ShortcutInfo::new("Esc", "back").with_priority(30),
    ]
  }
}

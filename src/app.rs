use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::renderfns::{draw_footer, draw_header, extract_domain};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::open_view;
use crate::workspace::Workspace;
use color_eyre::{eyre::eyre, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;

const TICK_RATE: Duration = Duration::from_millis(250);

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,
  command_input: CommandInput,
  workspace: Workspace,
  /// Header title: configured title or backend host
  title: String,
  /// Unknown command feedback, cleared on the next key
  message: Option<String>,
  should_quit: bool,
}

impl App {
  pub fn new(config: &Config, workspace: Workspace, initial_view: &str) -> Result<Self> {
    let root = open_view(initial_view, &workspace)
      .ok_or_else(|| eyre!("Unknown view: {}", initial_view))?;

    let title = match &config.title {
      Some(title) => title.clone(),
      None => config
        .project_url()
        .map(|url| extract_domain(url.as_str()).to_string())
        .unwrap_or_else(|_| "workspace".to_string()),
    };

    Ok(Self {
      view_stack: vec![root],
      command_input: CommandInput::new(),
      workspace,
      title,
      message: None,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.event_loop(&mut terminal).await;

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
    let mut events = EventHandler::new(TICK_RATE);

    while !self.should_quit {
      terminal.draw(|frame| self.draw(frame))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) => self.tick(),
        Some(Event::Resize) => {}
        None => break,
      }
    }

    Ok(())
  }

  fn current_view(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  fn tick(&mut self) {
    let action = match self.current_view() {
      Some(view) => view.tick(),
      None => ViewAction::None,
    };
    self.apply(action);
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }
    self.message = None;

    let captures_input = self
      .view_stack
      .last()
      .is_some_and(|view| view.captures_input());

    if !captures_input || self.command_input.is_active() {
      match self.command_input.handle_key(key) {
        KeyResult::Event(CommandEvent::Submitted(cmd)) => {
          self.execute_command(&cmd);
          return;
        }
        KeyResult::Handled | KeyResult::Event(CommandEvent::Cancelled) => return,
        KeyResult::NotHandled => {}
      }
    }

    let action = match self.current_view() {
      Some(view) => view.handle_key(key),
      None => ViewAction::None,
    };
    self.apply(action);
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
          if let Some(view) = self.current_view() {
            view.resume();
          }
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  fn execute_command(&mut self, cmd: &str) {
    if cmd == "quit" {
      self.should_quit = true;
      return;
    }

    match open_view(cmd, &self.workspace) {
      Some(view) => {
        tracing::debug!(view = cmd, "switching root view");
        self.view_stack.clear();
        self.view_stack.push(view);
      }
      None => self.message = Some(format!("Unknown command: {}", cmd)),
    }
  }

  fn breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|view| view.breadcrumb_label())
      .collect()
  }

  fn draw(&mut self, frame: &mut Frame) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Header
        Constraint::Min(1),    // Current view
        Constraint::Length(1), // Footer
      ])
      .split(frame.area());

    let shortcuts = self
      .view_stack
      .last()
      .map(|view| view.shortcuts())
      .unwrap_or_default();
    draw_header(
      frame,
      chunks[0],
      &self.title,
      self.workspace.session_user(),
      &shortcuts,
    );

    let breadcrumb = self.breadcrumb();
    let status = self
      .message
      .clone()
      .or_else(|| self.view_stack.last().and_then(|view| view.status()));

    if let Some(view) = self.view_stack.last_mut() {
      view.render(frame, chunks[1]);
    }
    draw_footer(frame, chunks[2], &breadcrumb, status.as_deref());

    self.command_input.render_overlay(frame, chunks[1]);
  }
}

use crate::query::{Query, QueryState};
use crate::resources::Resource;
use crate::ui::components::{KeyResult, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{status_color, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::{RecordDetailView, RecordFormView};
use crate::workspace::Workspace;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Every row of one table, with refresh, add and detail.
pub struct ResourceListView<R: Resource> {
  ws: Workspace,
  query: Query<Vec<R>>,
  list_state: ListState,
  search: SearchInput,
}

impl<R: Resource> ResourceListView<R> {
  pub fn new(ws: Workspace) -> Self {
    let ws_for_query = ws.clone();
    let mut query = Query::new(move || {
      let ws = ws_for_query.clone();
      async move { ws.list::<R>().await.map_err(|e| e.to_string()) }
    });

    query.fetch();

    Self {
      ws,
      query,
      list_state: ListState::default(),
      search: SearchInput::new(),
    }
  }

  /// Rows passing the `/` filter
  fn visible(&self) -> Vec<&R> {
    self
      .query
      .data()
      .map(|rows| {
        rows
          .iter()
          .filter(|row| {
            self.search.matches(&row.title())
              || self.search.matches(&row.key())
              || row.badge().is_some_and(|b| self.search.matches(b))
          })
          .collect()
      })
      .unwrap_or_default()
  }

  fn selected(&self) -> Option<&R> {
    let idx = self.list_state.selected()?;
    self.visible().get(idx).copied()
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let label = R::INFO.label;
    let visible = self.visible();
    let total = self.query.data().map(Vec::len).unwrap_or(0);

    let title = match self.query.state() {
      QueryState::Loading | QueryState::Idle => format!(" {} (loading...) ", label),
      QueryState::Error(e) => format!(" {} (error: {}) ", label, truncate(e, 40)),
      QueryState::Success(_) if visible.len() != total => {
        format!(" {} ({}/{}) ", label, visible.len(), total)
      }
      QueryState::Success(_) => format!(" {} ({}) ", label, total),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if visible.is_empty() {
      let content = match self.query.state() {
        QueryState::Loading | QueryState::Idle => format!("Loading {}...", R::INFO.table),
        QueryState::Error(e) => format!("Error: {}\n\nPress 'r' to retry.", e),
        _ if total > 0 => "Nothing matches the filter.".to_string(),
        _ => format!("No {} found. Press 'a' to add one.", R::INFO.table),
      };
      let style = if self.query.is_error() {
        Style::default().fg(Color::Red)
      } else {
        Style::default().fg(Color::DarkGray)
      };
      frame.render_widget(Paragraph::new(content).block(block).style(style), area);
      return;
    }

    let items: Vec<ListItem> = visible
      .iter()
      .map(|row| {
        let mut spans = vec![
          Span::styled(
            format!("{:<14}", truncate(&row.key(), 14)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
        ];
        if let Some(badge) = row.badge() {
          spans.push(Span::styled(
            format!("{:<14}", truncate(badge, 14)),
            Style::default().fg(status_color(badge)),
          ));
          spans.push(Span::raw(" "));
        }
        spans.push(Span::raw(truncate(&row.title(), 60)));
        ListItem::new(Line::from(spans))
      })
      .collect();
    let len = items.len();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    ensure_valid_selection(&mut self.list_state, len);
    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl<R: Resource> View for ResourceListView<R> {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.search.handle_key(key) {
      KeyResult::Handled | KeyResult::Event(_) => {
        self.list_state.select(Some(0));
        return ViewAction::None;
      }
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('r') => {
        if let Err(e) = self.ws.invalidate::<R>() {
          tracing::warn!(table = R::INFO.table, error = %e, "failed to invalidate collection");
        }
        self.query.refetch();
      }
      KeyCode::Char('a') => {
        return ViewAction::Push(Box::new(RecordFormView::<R>::new(self.ws.clone())));
      }
      KeyCode::Enter => {
        if let Some(row) = self.selected() {
          return ViewAction::Push(Box::new(RecordDetailView::new(R::INFO.label, row)));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    self.search.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    R::INFO.label.to_string()
  }

  fn tick(&mut self) -> ViewAction {
    self.query.poll();
    ViewAction::None
  }

  fn resume(&mut self) {
    // Served from cache unless a write invalidated it
    self.query.refetch();
  }

  fn captures_input(&self) -> bool {
    self.search.is_active()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("/", "filter").with_priority(20),
      ShortcutInfo::new("a", "add").with_priority(40),
      ShortcutInfo::new("r", "refresh").with_priority(50),
      ShortcutInfo::new("q", "back").with_priority(30),
    ]
  }
}

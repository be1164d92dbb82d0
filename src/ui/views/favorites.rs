use crate::favorites::{fetch_favorites, invalidate_favorites, remove_favorite, Favorite};
use crate::query::{Mutation, MutationState, Query, QueryState};
use crate::remote::types::User;
use crate::resources::Resource;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::truncate;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::workspace::Workspace;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

const LOGIN_REQUIRED: &str = "You need to be logged in to view your favorites.";
const NO_FAVORITES: &str = "No favorite providers found.";
const NO_USERS: &str = "No users found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
  Favorites,
  Users,
}

/// Queries that only exist with a signed-in user.
struct SessionQueries {
  ws: Workspace,
  user_id: String,
  favorites: Query<Vec<Favorite>>,
  users: Query<Vec<User>>,
  removal: Mutation<String, ()>,
}

impl SessionQueries {
  /// Bypass the cache: drop both cached reads, then fetch again.
  fn reload(&mut self) {
    let invalidated = invalidate_favorites(&self.ws, &self.user_id)
      .and_then(|_| self.ws.invalidate::<User>());
    if let Err(e) = invalidated {
      tracing::warn!(error = %e, "failed to invalidate favorites page");
    }
    self.favorites.refetch();
    self.users.refetch();
  }
}

/// The signed-in user's favorite providers plus a "Browse Users" section.
pub struct FavoritesView {
  queries: Option<SessionQueries>,
  focus: Focus,
  favorites_state: ListState,
  users_state: ListState,
  status: Option<String>,
}

impl FavoritesView {
  pub fn new(ws: Workspace) -> Self {
    // Without a session nothing is read
    let queries = ws.session_user().map(str::to_string).map(|user_id| {
      let ws_fav = ws.clone();
      let uid_fav = user_id.clone();
      let mut favorites = Query::new(move || {
        let ws = ws_fav.clone();
        let user_id = uid_fav.clone();
        async move {
          fetch_favorites(&ws, &user_id)
            .await
            .map_err(|e| e.to_string())
        }
      });

      let ws_users = ws.clone();
      let mut users = Query::new(move || {
        let ws = ws_users.clone();
        async move { ws.list::<User>().await.map_err(|e| e.to_string()) }
      });

      let ws_remove = ws.clone();
      let uid_remove = user_id.clone();
      let removal = Mutation::new(move |provider_id: String| {
        let ws = ws_remove.clone();
        let user_id = uid_remove.clone();
        async move {
          remove_favorite(&ws, &user_id, &provider_id)
            .await
            .map_err(|e| e.to_string())
        }
      });

      favorites.fetch();
      users.fetch();

      SessionQueries {
        ws: ws.clone(),
        user_id,
        favorites,
        users,
        removal,
      }
    });

    Self {
      queries,
      focus: Focus::Favorites,
      favorites_state: ListState::default(),
      users_state: ListState::default(),
      status: None,
    }
  }

  fn remove_selected(&mut self) {
    let Some(queries) = &mut self.queries else {
      return;
    };
    let Some(favorite) = self
      .favorites_state
      .selected()
      .and_then(|idx| queries.favorites.data()?.get(idx))
    else {
      return;
    };

    let name = favorite.name().to_string();
    if queries.removal.mutate(favorite.provider_id.clone()) {
      self.status = Some(format!("Removing {}...", name));
    }
  }

  fn section_block(title: String, focused: bool) -> Block<'static> {
    let color = if focused { Color::Cyan } else { Color::Blue };
    Block::default()
      .title(title)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(color))
  }

  fn render_favorites(
    favorites: &Query<Vec<Favorite>>,
    focused: bool,
    state: &mut ListState,
    frame: &mut Frame,
    area: Rect,
  ) {
    let rows = favorites.data().map(Vec::as_slice).unwrap_or(&[]);
    let title = match favorites.state() {
      QueryState::Success(_) => format!(" Favorites ({}) ", rows.len()),
      _ => " Favorites ".to_string(),
    };
    let block = Self::section_block(title, focused);

    let message = match favorites.state() {
      QueryState::Idle | QueryState::Loading => Some("Loading favorites...".to_string()),
      QueryState::Error(e) => Some(format!("Error: {}", e)),
      QueryState::Success(rows) if rows.is_empty() => Some(NO_FAVORITES.to_string()),
      QueryState::Success(_) => None,
    };
    if let Some(message) = message {
      let style = if favorites.is_error() {
        Style::default().fg(Color::Red)
      } else {
        Style::default().fg(Color::DarkGray)
      };
      frame.render_widget(Paragraph::new(message).block(block).style(style), area);
      return;
    }

    let items: Vec<ListItem> = rows
      .iter()
      .map(|favorite| {
        ListItem::new(Line::from(vec![
          Span::styled(
            format!("{:<30}", truncate(favorite.name(), 30)),
            Style::default().bold(),
          ),
          Span::styled(
            format!("{:<20}", truncate(favorite.category().unwrap_or("-"), 20)),
            Style::default().fg(Color::Yellow),
          ),
          Span::styled("[d] remove", Style::default().fg(Color::Red)),
        ]))
      })
      .collect();

    ensure_valid_selection(state, items.len());
    let list = List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::DarkGray))
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, state);
  }

  fn render_users(
    users: &Query<Vec<User>>,
    focused: bool,
    state: &mut ListState,
    frame: &mut Frame,
    area: Rect,
  ) {
    let rows = users.data().map(Vec::as_slice).unwrap_or(&[]);
    let title = match users.state() {
      QueryState::Success(_) => format!(" Browse Users ({}) ", rows.len()),
      _ => " Browse Users ".to_string(),
    };
    let block = Self::section_block(title, focused);

    let message = match users.state() {
      QueryState::Idle | QueryState::Loading => Some("Loading users...".to_string()),
      QueryState::Error(e) => Some(format!("Error: {}", e)),
      QueryState::Success(rows) if rows.is_empty() => Some(NO_USERS.to_string()),
      QueryState::Success(_) => None,
    };
    if let Some(message) = message {
      frame.render_widget(
        Paragraph::new(message)
          .block(block)
          .style(Style::default().fg(Color::DarkGray)),
        area,
      );
      return;
    }

    let items: Vec<ListItem> = rows
      .iter()
      .map(|user| {
        ListItem::new(Line::from(vec![
          Span::styled(
            format!("{:<24}", truncate(&user.title(), 24)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(user.email.clone()),
        ]))
      })
      .collect();

    ensure_valid_selection(state, items.len());
    let list = List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::DarkGray))
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, state);
  }
}

impl View for FavoritesView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    let state = match self.focus {
      Focus::Favorites => &mut self.favorites_state,
      Focus::Users => &mut self.users_state,
    };

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => state.select_previous(),
      KeyCode::Tab | KeyCode::BackTab => {
        self.focus = match self.focus {
          Focus::Favorites => Focus::Users,
          Focus::Users => Focus::Favorites,
        };
      }
      KeyCode::Char('d') | KeyCode::Delete if self.focus == Focus::Favorites => {
        self.remove_selected();
      }
      KeyCode::Char('r') => {
        if let Some(queries) = &mut self.queries {
          queries.reload();
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let Some(queries) = &self.queries else {
      let block = Self::section_block(" Favorites ".to_string(), true);
      frame.render_widget(
        Paragraph::new(LOGIN_REQUIRED)
          .block(block)
          .style(Style::default().fg(Color::Yellow)),
        area,
      );
      return;
    };

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
      .split(area);

    Self::render_favorites(
      &queries.favorites,
      self.focus == Focus::Favorites,
      &mut self.favorites_state,
      frame,
      chunks[0],
    );
    Self::render_users(
      &queries.users,
      self.focus == Focus::Users,
      &mut self.users_state,
      frame,
      chunks[1],
    );
  }

  fn breadcrumb_label(&self) -> String {
    "Favorites".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    let Some(queries) = &mut self.queries else {
      return ViewAction::None;
    };

    queries.favorites.poll();
    queries.users.poll();

    if queries.removal.poll() {
      match queries.removal.state() {
        MutationState::Success(()) => {
          self.status = Some("Favorite removed".to_string());
          queries.favorites.refetch();
        }
        MutationState::Error(e) => {
          // List stays as it was
          tracing::error!(error = %e, "failed to remove favorite");
          self.status = Some(format!("Failed to remove favorite: {}", e));
        }
        _ => {}
      }
    }
    ViewAction::None
  }

  fn resume(&mut self) {
    if let Some(queries) = &mut self.queries {
      queries.favorites.refetch();
      queries.users.refetch();
    }
  }

  fn status(&self) -> Option<String> {
    self.status.clone()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("Tab", "switch list").with_priority(20),
      ShortcutInfo::new("d", "remove").with_priority(40),
      ShortcutInfo::new("r", "refresh").with_priority(50),
      ShortcutInfo::new("q", "back").with_priority(30),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{render_to_string, settle, MemoryStore};
  use crossterm::event::KeyModifiers;
  use serde_json::json;
  use std::sync::Arc;
  use std::time::Duration;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn workspace(store: Arc<MemoryStore>, user: Option<&str>) -> Workspace {
    Workspace::with_remote(store, Duration::from_secs(300))
      .with_session(user.map(str::to_string))
  }

  fn seed_users(store: &MemoryStore) {
    store.seed(
      "users",
      vec![json!({"id": 1, "username": "ada", "email": "ada@example.com", "password_hash": "x"})],
    );
  }

  fn seed_acme(store: &MemoryStore) {
    store.seed(
      "favorites",
      vec![json!({
        "user_id": "u1",
        "provider_id": "p1",
        "providers": {
          "id": "p1",
          "name": "Acme",
          "category": "cleaning",
          "imageUrl": "https://img/acme.png"
        }
      })],
    );
  }

  #[tokio::test]
  async fn test_signed_out_reads_nothing() {
    let store = Arc::new(MemoryStore::new());
    let mut view = FavoritesView::new(workspace(store.clone(), None));
    settle(&mut view).await;

    let screen = render_to_string(&mut view, 80, 20);
    assert!(screen.contains(LOGIN_REQUIRED));
    assert_eq!(store.select_count("favorites"), 0);
    assert_eq!(store.select_count("users"), 0);
  }

  #[tokio::test]
  async fn test_no_favorites_still_lists_users() {
    let store = Arc::new(MemoryStore::new());
    seed_users(&store);
    let mut view = FavoritesView::new(workspace(store, Some("u1")));
    settle(&mut view).await;

    let screen = render_to_string(&mut view, 80, 20);
    assert!(screen.contains(NO_FAVORITES));
    assert!(screen.contains("Browse Users (1)"));
    assert!(screen.contains("ada@example.com"));
  }

  #[tokio::test]
  async fn test_no_users() {
    let store = Arc::new(MemoryStore::new());
    seed_acme(&store);
    let mut view = FavoritesView::new(workspace(store, Some("u1")));
    settle(&mut view).await;

    assert!(render_to_string(&mut view, 80, 20).contains(NO_USERS));
  }

  #[tokio::test]
  async fn test_one_favorite_card_and_removal() {
    let store = Arc::new(MemoryStore::new());
    seed_acme(&store);
    seed_users(&store);
    let mut view = FavoritesView::new(workspace(store.clone(), Some("u1")));
    settle(&mut view).await;

    let screen = render_to_string(&mut view, 80, 20);
    assert!(screen.contains("Favorites (1)"));
    assert!(screen.contains("Acme"));
    assert!(screen.contains("cleaning"));
    assert!(screen.contains("[d] remove"));

    view.handle_key(key(KeyCode::Char('d')));
    settle(&mut view).await;

    assert_eq!(store.deletes().len(), 1);
    let screen = render_to_string(&mut view, 80, 20);
    assert!(screen.contains(NO_FAVORITES));
    assert_eq!(view.status().as_deref(), Some("Favorite removed"));
  }

  #[tokio::test]
  async fn test_refresh_bypasses_cache() {
    let store = Arc::new(MemoryStore::new());
    let mut view = FavoritesView::new(workspace(store.clone(), Some("u1")));
    settle(&mut view).await;
    assert!(render_to_string(&mut view, 80, 20).contains(NO_FAVORITES));

    // Written elsewhere while the page is open
    seed_acme(&store);
    seed_users(&store);
    view.handle_key(key(KeyCode::Char('r')));
    settle(&mut view).await;

    let screen = render_to_string(&mut view, 80, 20);
    assert!(screen.contains("Acme"));
    assert!(screen.contains("ada@example.com"));
    assert_eq!(store.select_count("favorites"), 2);
    assert_eq!(store.select_count("users"), 2);
  }

  #[tokio::test]
  async fn test_rejected_removal_leaves_list() {
    let store = Arc::new(MemoryStore::new());
    seed_acme(&store);
    store.fail_deletes("favorites", "permission denied for table favorites");
    let mut view = FavoritesView::new(workspace(store.clone(), Some("u1")));
    settle(&mut view).await;
    render_to_string(&mut view, 80, 20);

    view.handle_key(key(KeyCode::Char('d')));
    settle(&mut view).await;

    let screen = render_to_string(&mut view, 80, 20);
    assert!(screen.contains("Acme"));
    assert!(screen.contains("Favorites (1)"));
    assert_eq!(store.select_count("favorites"), 1);
    assert_eq!(
      view.status().as_deref(),
      Some("Failed to remove favorite: permission denied for table favorites")
    );
  }
}

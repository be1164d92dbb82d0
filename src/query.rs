//! Async reads and writes driven from the UI tick.
//!
//! `Query<T>` wraps a read (loading/success/error), `Mutation<I, T>` wraps a
//! write taking an input. Both spawn onto the tokio runtime and hand their
//! result back through a channel that the owning view polls on each tick.
//!
//! # Example
//!
//! ```ignore
//! let ws = workspace.clone();
//! let mut query = Query::new(move || {
//!     let ws = ws.clone();
//!     async move { ws.list::<Task>().await.map_err(|e| e.to_string()) }
//! });
//!
//! query.fetch();
//!
//! // In the view's tick
//! if query.poll() {
//!     // State changed, next render picks it up
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Query has not been started
  Idle,
  /// Query is currently fetching data
  Loading,
  /// Query completed successfully
  Success(T),
  /// Query failed with the remote error's message
  Error(String),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn is_error(&self) -> bool {
    matches!(self, QueryState::Error(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }
}

/// A boxed future that returns a Result<T, String>
type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;

/// A factory function that creates futures for fetching data
type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<T> + Send + Sync>;

/// Async read with state management.
///
/// Staleness is the cache's concern: a view simply refetches when it wants
/// fresh data and the workspace decides whether that hits the network.
pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
}

impl<T: Send + 'static> Query<T> {
  /// Create a new query with the given fetcher function.
  ///
  /// The fetcher is called each time `fetch()` or `refetch()` is invoked.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || Box::pin(fetcher())),
      receiver: None,
    }
  }

  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  pub fn is_error(&self) -> bool {
    self.state.is_error()
  }

  /// Start fetching data if not already loading.
  pub fn fetch(&mut self) {
    if self.state.is_loading() {
      return;
    }
    self.start_fetch();
  }

  /// Force a refetch, dropping any pending result.
  pub fn refetch(&mut self) {
    self.receiver = None;
    self.start_fetch();
  }

  /// Poll for results from a pending fetch.
  ///
  /// Returns `true` if the state changed.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.state = QueryState::Success(data);
        self.receiver = None;
        true
      }
      Ok(Err(error)) => {
        self.state = QueryState::Error(error);
        self.receiver = None;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        self.state = QueryState::Error("Query was cancelled".to_string());
        self.receiver = None;
        true
      }
    }
  }

  fn start_fetch(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = QueryState::Loading;

    let future = (self.fetcher)();
    tokio::spawn(async move {
      let result = future.await;
      // Receiver is gone when the fetch was superseded
      let _ = tx.send(result);
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .finish_non_exhaustive()
  }
}

/// The state of a mutation
#[derive(Debug, Clone, PartialEq)]
pub enum MutationState<T> {
  Idle,
  Pending,
  Success(T),
  Error(String),
}

type MutateFn<I, T> = Box<dyn Fn(I) -> BoxFuture<T> + Send + Sync>;

/// Async write with state management.
///
/// A mutation runs at most once at a time; `mutate` while pending is ignored.
pub struct Mutation<I, T> {
  state: MutationState<T>,
  mutate_fn: MutateFn<I, T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
}

impl<I: Send + 'static, T: Send + 'static> Mutation<I, T> {
  pub fn new<F, Fut>(mutate_fn: F) -> Self
  where
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      state: MutationState::Idle,
      mutate_fn: Box::new(move |input| Box::pin(mutate_fn(input))),
      receiver: None,
    }
  }

  pub fn state(&self) -> &MutationState<T> {
    &self.state
  }

  pub fn is_pending(&self) -> bool {
    matches!(self.state, MutationState::Pending)
  }

  /// Start the write. Returns `false` if one is already in flight.
  pub fn mutate(&mut self, input: I) -> bool {
    if self.is_pending() {
      return false;
    }

    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = MutationState::Pending;

    let future = (self.mutate_fn)(input);
    tokio::spawn(async move {
      let _ = tx.send(future.await);
    });
    true
  }

  /// Poll for the result of a pending write. Returns `true` if the state changed.
  pub fn poll(&mut self) -> bool {
    let Some(receiver) = &mut self.receiver else {
      return false;
    };

    let next = match receiver.try_recv() {
      Ok(Ok(data)) => MutationState::Success(data),
      Ok(Err(error)) => MutationState::Error(error),
      Err(mpsc::error::TryRecvError::Empty) => return false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        MutationState::Error("Mutation was cancelled".to_string())
      }
    };

    self.state = next;
    self.receiver = None;
    true
  }

  /// Back to idle, forgetting the last outcome.
  pub fn reset(&mut self) {
    self.receiver = None;
    self.state = MutationState::Idle;
  }
}

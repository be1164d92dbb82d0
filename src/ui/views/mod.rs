mod favorites;
mod record_detail;
mod record_form;
mod resource_list;
mod upload;

pub use favorites::FavoritesView;
pub use record_detail::RecordDetailView;
pub use record_form::RecordFormView;
pub use resource_list::ResourceListView;
pub use upload::UploadView;

use crate::commands;
use crate::resources::{self, Resource, ResourceVisitor};
use crate::ui::view::View;
use crate::workspace::Workspace;

struct OpenList(Workspace);

impl ResourceVisitor for OpenList {
  type Output = Box<dyn View>;

  fn visit<R: Resource>(self) -> Self::Output {
    Box::new(ResourceListView::<R>::new(self.0))
  }
}

/// Build the root view for a command name or alias.
pub fn open_view(name: &str, ws: &Workspace) -> Option<Box<dyn View>> {
  let name = name.trim().to_lowercase();
  let command = commands::all_commands()
    .into_iter()
    .find(|cmd| cmd.name == name || cmd.aliases.contains(&name.as_str()))?;

  match command.name {
    "favorites" => Some(Box::new(FavoritesView::new(ws.clone()))),
    "upload" => Some(Box::new(UploadView::new(ws.clone()))),
    table => resources::dispatch(table, OpenList(ws.clone())),
  }
}

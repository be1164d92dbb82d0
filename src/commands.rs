//! Available commands and autocomplete logic

use crate::resources::RESOURCES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// Commands that are not one of the resource tables
const BUILTIN_COMMANDS: &[Command] = &[
  Command {
    name: "favorites",
    aliases: &["fav", "favs"],
    description: "Your favorite providers",
  },
  Command {
    name: "upload",
    aliases: &["up", "png"],
    description: "Upload PNG files",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit deskbase",
  },
];

/// All available commands: one per resource table, then the built-ins
pub fn all_commands() -> Vec<Command> {
  RESOURCES
    .iter()
    .map(|info| Command {
      name: info.table,
      aliases: info.aliases,
      description: info.description,
    })
    .chain(BUILTIN_COMMANDS.iter().copied())
    .collect()
}

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<Command> {
  let input_lower = input.trim().to_lowercase();
  let commands = all_commands();

  if input_lower.is_empty() {
    return commands;
  }

  let mut matches: Vec<(Command, u32)> = Vec::new();

  for cmd in commands {
    let priority = if cmd.name == input_lower {
      0
    } else if cmd.aliases.contains(&input_lower.as_str()) {
      1
    } else if cmd.name.starts_with(&input_lower) {
      2
    } else if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      3
    } else if cmd.name.contains(&input_lower) {
      4
    } else if cmd.aliases.iter().any(|a| a.contains(&input_lower)) {
      5
    } else {
      continue;
    };
    matches.push((cmd, priority));
  }

  // Stable sort keeps registration order within a priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), RESOURCES.len() + BUILTIN_COMMANDS.len());
    assert_eq!(suggestions[0].name, "groups");
  }

  #[test]
  fn test_exact_match() {
    let suggestions = get_suggestions("tasks");
    assert_eq!(suggestions[0].name, "tasks");
  }

  #[test]
  fn test_alias_match() {
    assert_eq!(get_suggestions("t")[0].name, "tasks");
    assert_eq!(get_suggestions("cat")[0].name, "categories");
    assert_eq!(get_suggestions("fav")[0].name, "favorites");
    assert_eq!(get_suggestions("q")[0].name, "quit");
  }

  #[test]
  fn test_prefix_match() {
    let suggestions = get_suggestions("sess");
    assert_eq!(suggestions[0].name, "sessions");
  }

  #[test]
  fn test_fuzzy_match() {
    let suggestions = get_suggestions("ofil");
    assert_eq!(suggestions[0].name, "profiles");
  }

  #[test]
  fn test_no_match() {
    assert!(get_suggestions("zzz").is_empty());
  }
}

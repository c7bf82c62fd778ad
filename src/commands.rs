/// Available commands and autocomplete logic
#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "releases",
    aliases: &["r", "rel"],
    description: "Browse product releases",
  },
  Command {
    name: "iterations",
    aliases: &["i", "iter", "sprints"],
    description: "Browse iterations",
  },
  Command {
    name: "standup",
    aliases: &["s", "notes"],
    description: "Today's standup notes",
  },
  Command {
    name: "daysoff",
    aliases: &["d", "pto"],
    description: "Upcoming days off",
  },
  Command {
    name: "refresh",
    aliases: &["reload"],
    description: "Drop all cached tracker data and refetch",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit sm9s",
  },
];

/// How well a command matches typed input. Lower is better; None is no match.
fn match_rank(cmd: &Command, input: &str) -> Option<u32> {
  if cmd.name == input {
    return Some(0);
  }
  if cmd.aliases.contains(&input) {
    return Some(1);
  }
  if cmd.name.starts_with(input) {
    return Some(2);
  }
  if cmd.aliases.iter().any(|a| a.starts_with(input)) {
    return Some(3);
  }
  if cmd.name.contains(input) {
    return Some(4);
  }
  if cmd.aliases.iter().any(|a| a.contains(input)) {
    return Some(5);
  }
  None
}

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input = input.to_lowercase();

  if input.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = COMMANDS
    .iter()
    .filter_map(|cmd| match_rank(cmd, &input).map(|rank| (cmd, rank)))
    .collect();

  // Stable sort keeps table order within the same rank
  matches.sort_by_key(|(_, rank)| *rank);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match() {
    let suggestions = get_suggestions("releases");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "releases");
  }

  #[test]
  fn test_alias_match() {
    let suggestions = get_suggestions("i");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "iterations");
  }

  #[test]
  fn test_prefix_match() {
    let suggestions = get_suggestions("rel");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "releases");
  }

  #[test]
  fn test_fuzzy_match() {
    let suggestions = get_suggestions("fres");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "refresh");
  }

  #[test]
  fn test_no_match() {
    assert!(get_suggestions("xyz").is_empty());
  }
}

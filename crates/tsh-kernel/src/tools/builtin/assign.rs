//! `NAME=VALUE` environment assignments.
//!
//! Not a registered tool: the dispatcher peels assignment words off the
//! front of a command line before looking anything up.

/// Split `NAME=VALUE` when `NAME` is a valid identifier.
pub fn parse_assignment(word: &str) -> Option<(&str, &str)> {
    let (name, value) = word.split_once('=')?;
    is_valid_name(name).then_some((name, value))
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Set `name` in the shell's environment, inherited by later children.
pub fn apply_assignment(name: &str, value: &str) {
    tracing::debug!(name, "environment assignment");
    // SAFETY: the shell mutates its environment only from the single shell
    // thread, between launches; no other thread reads it concurrently.
    unsafe { std::env::set_var(name, value) };
}

/// Apply every leading assignment word and return how many were consumed.
pub fn apply_leading_assignments(words: &[String]) -> usize {
    let mut consumed = 0;
    for word in words {
        let Some((name, value)) = parse_assignment(word) else {
            break;
        };
        apply_assignment(name, value);
        consumed += 1;
    }
    consumed
}

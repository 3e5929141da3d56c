//! Shared pieces of the validation overlay.
//!
//! Every entity exposes two checks: `is_valid`, which stops at the first
//! problem, and `collect_errors`, which visits the whole subtree and appends
//! one message per problem. Messages end with `within {parent}` where the
//! parent identifier is built by the caller, e.g. `memory map cpu_map`.

use std::collections::BTreeSet;

use crate::parameter::{Choice, Parameter};

/// Component level data that validation resolves names against.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationContext<'a> {
    /// Choices that parameters may reference through `spirit:choiceRef`.
    pub choices: &'a [Choice],
    /// Remap state names declared by the component.
    pub remap_states: &'a [String],
}

impl<'a> ValidationContext<'a> {
    pub fn new(choices: &'a [Choice], remap_states: &'a [String]) -> Self {
        Self {
            choices,
            remap_states,
        }
    }

    pub fn has_remap_state(&self, name: &str) -> bool {
        self.remap_states.iter().any(|state| state == name)
    }
}

/// Distinct names of a collection.
pub fn name_set<'a>(names: impl IntoIterator<Item = &'a str>) -> BTreeSet<&'a str> {
    names.into_iter().collect()
}

/// Whether `candidate` is already taken in `names`.
pub fn is_name_taken(names: &BTreeSet<&str>, candidate: &str) -> bool {
    names.contains(candidate)
}

/// Names that occur more than once, each reported once in order of its
/// second occurrence.
pub fn duplicate_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = BTreeSet::new();
    let mut duplicates = Vec::new();
    for name in names {
        if !is_name_taken(&seen, name) {
            seen.insert(name);
        } else if !duplicates.contains(&name) {
            duplicates.push(name);
        }
    }
    duplicates
}

pub fn all_unique<'a>(names: impl IntoIterator<Item = &'a str>) -> bool {
    let names: Vec<&str> = names.into_iter().collect();
    name_set(names.iter().copied()).len() == names.len()
}

pub fn parameters_valid(parameters: &[Parameter], ctx: ValidationContext<'_>) -> bool {
    parameters
        .iter()
        .all(|parameter| parameter.is_valid(ctx.choices))
}

/// Append the messages of every parameter, returning whether all were valid.
pub fn collect_parameter_errors(
    parameters: &[Parameter],
    ctx: ValidationContext<'_>,
    errors: &mut Vec<String>,
    parent: &str,
) -> bool {
    let mut valid = true;
    for parameter in parameters {
        let found = parameter.find_errors(ctx.choices, parent);
        if !found.is_empty() {
            valid = false;
            errors.extend(found);
        }
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_reported_once() {
        let names = ["a", "b", "a", "c", "a", "b"];
        assert_eq!(duplicate_names(names), vec!["a", "b"]);
        assert!(!all_unique(names));
        assert!(all_unique(["x", "y"]));
    }

    #[test]
    fn name_set_lookup_has_no_side_effects() {
        let set = name_set(["ctrl", "status"]);
        assert!(is_name_taken(&set, "ctrl"));
        assert!(!is_name_taken(&set, "data"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn parameter_errors_are_prefixed_with_parent() {
        let states = vec!["active".to_string()];
        let ctx = ValidationContext::new(&[], &states);
        assert!(ctx.has_remap_state("active"));

        let parameters = vec![Parameter::new("ok", "1"), Parameter::new("empty", "")];
        assert!(!parameters_valid(&parameters, ctx));
        let mut errors = Vec::new();
        assert!(!collect_parameter_errors(&parameters, ctx, &mut errors, "bank b0"));
        assert_eq!(
            errors,
            vec!["No value specified for parameter empty within bank b0".to_string()]
        );
    }
}

//! Pure template rendering
//!
//! Templates are static text with `{name}` substitution slots. Rendering
//! binds every slot from the variable store and fails on the first slot with
//! no binding; it never mutates the store and is deterministic for identical
//! inputs.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::store::VariableStore;

static SLOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("slot regex is valid"));

/// A template slot had no binding in the variable store.
///
/// Indicates a registry/ordering bug or a caller that skipped a prerequisite
/// stage; not retryable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("no binding for template variable '{name}'")]
    UnboundVariable { name: String },
}

/// Render `template` against `store`.
///
/// # Errors
///
/// Returns [`TemplateError::UnboundVariable`] naming the first slot that has
/// no store entry.
pub fn render(template: &str, store: &VariableStore) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut cursor = 0;

    for slot in SLOT.find_iter(template) {
        let name = &template[slot.start() + 1..slot.end() - 1];
        let value = store
            .get(name)
            .ok_or_else(|| TemplateError::UnboundVariable {
                name: name.to_string(),
            })?;

        out.push_str(&template[cursor..slot.start()]);
        out.push_str(value);
        cursor = slot.end();
    }

    out.push_str(&template[cursor..]);
    Ok(out)
}

/// The slot names appearing in `template`, in order of first appearance.
#[must_use]
pub fn slots(template: &str) -> Vec<&str> {
    SLOT.find_iter(template)
        .map(|slot| &template[slot.start() + 1..slot.end() - 1])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> VariableStore {
        let mut store = VariableStore::new();
        store.set("business_requirement", "add two integers");
        store.set("generated_code", "def add(a, b): return a + b");
        store
    }

    #[test]
    fn renders_bound_slots() {
        let rendered = render("Requirement: {business_requirement}", &store()).unwrap();
        assert_eq!(rendered, "Requirement: add two integers");
    }

    #[test]
    fn renders_repeated_and_adjacent_slots() {
        let rendered = render(
            "{business_requirement}/{business_requirement}{generated_code}",
            &store(),
        )
        .unwrap();
        assert_eq!(
            rendered,
            "add two integers/add two integersdef add(a, b): return a + b"
        );
    }

    #[test]
    fn unbound_slot_fails_naming_the_variable() {
        let err = render("Review: {code_review}", &store()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnboundVariable {
                name: "code_review".to_string()
            }
        );
    }

    #[test]
    fn rendering_is_idempotent_for_an_unchanged_store() {
        let store = store();
        let template = "Requirement: {business_requirement}\nCode: {generated_code}";
        let first = render(template, &store).unwrap();
        let second = render(template, &store).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn text_without_slots_passes_through() {
        let rendered = render("no substitutions here", &store()).unwrap();
        assert_eq!(rendered, "no substitutions here");
    }

    #[test]
    fn slots_lists_names_in_order() {
        let template = "{business_requirement} then {generated_code} then {code_review}";
        assert_eq!(
            slots(template),
            vec!["business_requirement", "generated_code", "code_review"]
        );
    }
}

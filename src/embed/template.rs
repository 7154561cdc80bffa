//! Template types for typed variable injection.

use std::marker::PhantomData;

/// Trait for template variable sets
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Template with typed variable injection
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.content)
    }
}

/// Fill `{{key}}` placeholders in a single pass.
///
/// Substituted values are appended verbatim and never rescanned, so a value
/// that itself contains `{{...}}` is left alone. Unknown keys are kept as-is.
pub fn fill(content: &str, vars: &[(&str, &str)]) -> String {
    let extra: usize = vars.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(content.len() + extra);
    let mut rest = content;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = after[..end].trim();
        match vars.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_replaces_known_keys() {
        let out = fill("<p>{{a}} and {{ b }}</p>", &[("a", "x"), ("b", "y")]);
        assert_eq!(out, "<p>x and y</p>");
    }

    #[test]
    fn test_fill_keeps_unknown_keys() {
        assert_eq!(fill("{{missing}}!", &[]), "{{missing}}!");
    }

    #[test]
    fn test_fill_does_not_rescan_values() {
        let out = fill("{{body}}|{{title}}", &[("body", "{{title}}"), ("title", "T")]);
        assert_eq!(out, "{{title}}|T");
    }

    #[test]
    fn test_fill_unterminated_placeholder() {
        assert_eq!(fill("a {{b", &[("b", "x")]), "a {{b");
    }
}

//! Markup sanitization using ammonia.
//!
//! The default ammonia profile already strips scripts, event handler
//! attributes and non-allowlisted URL schemes. On top of it we keep:
//! - task list checkboxes (`<input type="checkbox" disabled>`)
//! - the language class on code blocks

use ammonia::Builder;

fn builder() -> Builder<'static> {
    let mut builder = Builder::default();
    builder
        .add_tags(&["input"])
        .add_tag_attributes("input", &["type", "checked", "disabled"])
        .add_tag_attributes("code", &["class"]);
    builder
}

/// Strip active content, keeping structural markup.
pub fn clean(html: &str) -> String {
    builder().clean(html).to_string()
}

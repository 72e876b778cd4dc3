//! Parser options.

/// Parser options
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Whether is a void tag
    pub is_void_tag: fn(&str) -> bool,
    /// Whether a tag name denotes a component
    pub is_component: fn(&str) -> bool,
    /// Keep HTML comments in the tree
    pub comments: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            is_void_tag: tessera_carton::is_void_tag,
            is_component: is_component_tag,
            comments: true,
        }
    }
}

/// Capitalized names, dotted names and the dynamic `svelte:` elements.
pub fn is_component_tag(tag: &str) -> bool {
    tag.starts_with(|c: char| c.is_ascii_uppercase())
        || tag.contains('.')
        || matches!(tag, "svelte:component" | "svelte:self" | "svelte:element")
}

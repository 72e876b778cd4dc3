//! Expression extraction.
//!
//! Walks a parsed markup fragment depth-first and records the span of every
//! embedded script expression that the markup evaluates: interpolations,
//! attribute values, directive values and block conditions.

use tessera_relief::{
    AttributeNode, AttributeValue, AwaitBlockNode, ElementNode, ExpressionNode, PropNode, RootNode,
    TemplateNode,
};

/// Expression position relative to the parsed fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpressionSpan {
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset just past the last character
    pub end: usize,
    /// 1-based line of `start`
    pub line: usize,
}

impl ExpressionSpan {
    fn of(expression: &ExpressionNode) -> Self {
        Self {
            start: expression.start(),
            end: expression.end(),
            line: expression.line(),
        }
    }

    /// Shift into document coordinates.
    pub fn remap(self, start: usize, start_line: usize) -> Self {
        Self {
            start: self.start + start,
            end: self.end + start,
            line: self.line + start_line - 1,
        }
    }
}

/// Collect expression spans in document order.
pub fn collect_expressions(root: &RootNode<'_>) -> Vec<ExpressionSpan> {
    let mut collector = ExpressionCollector::default();
    collector.visit_children(&root.children);
    collector.spans
}

#[derive(Default)]
struct ExpressionCollector {
    spans: Vec<ExpressionSpan>,
}

impl ExpressionCollector {
    fn push(&mut self, expression: &ExpressionNode) {
        self.spans.push(ExpressionSpan::of(expression));
    }

    fn visit_children(&mut self, children: &[TemplateNode<'_>]) {
        for child in children {
            self.visit_node(child);
        }
    }

    fn visit_node(&mut self, node: &TemplateNode<'_>) {
        match node {
            TemplateNode::MustacheTag(tag) | TemplateNode::RawMustacheTag(tag) => {
                self.push(&tag.expression);
            }
            TemplateNode::Element(element) => self.visit_element(element),
            TemplateNode::If(block) => {
                self.push(&block.expression);
                self.visit_children(&block.children);
                if let Some(else_block) = &block.else_block {
                    self.visit_children(&else_block.children);
                }
            }
            TemplateNode::Each(block) => {
                self.push(&block.expression);
                self.visit_children(&block.children);
                if let Some(else_block) = &block.else_block {
                    self.visit_children(&else_block.children);
                }
            }
            TemplateNode::Key(block) => {
                self.push(&block.expression);
                self.visit_children(&block.children);
            }
            TemplateNode::Await(block) => self.visit_await(block),
            TemplateNode::Text(_)
            | TemplateNode::Comment(_)
            | TemplateNode::DebugTag(_)
            | TemplateNode::ConstTag(_) => {}
        }
    }

    fn visit_element(&mut self, element: &ElementNode<'_>) {
        for prop in element.props.iter() {
            match prop {
                PropNode::Attribute(attribute) => self.visit_attribute(attribute),
                PropNode::Directive(directive) => {
                    if let Some(expression) = &directive.expression {
                        self.push(expression);
                    }
                }
                PropNode::StyleDirective(_) | PropNode::Spread(_) => {}
            }
        }
        self.visit_children(&element.children);
    }

    fn visit_attribute(&mut self, attribute: &AttributeNode<'_>) {
        let Some(values) = &attribute.value else {
            return;
        };
        for value in values.iter() {
            if let AttributeValue::MustacheTag(tag) = value {
                self.push(&tag.expression);
            }
        }
    }

    fn visit_await(&mut self, block: &AwaitBlockNode<'_>) {
        self.push(&block.expression);
        for branch in [&block.pending, &block.then, &block.catch] {
            self.visit_children(&branch.children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_armature::parse;
    use tessera_carton::Bump;

    fn expressions(source: &str) -> Vec<&str> {
        let allocator = Bump::new();
        let root = parse(&allocator, source).unwrap();
        collect_expressions(&root)
            .into_iter()
            .map(|span| &source[span.start..span.end])
            .collect()
    }

    #[test]
    fn test_interpolations() {
        assert_eq!(expressions("<p>{'Foo'}</p>"), vec!["'Foo'"]);
        assert_eq!(expressions("{@html raw}{@debug a}{@const b = 1}"), vec!["raw"]);
    }

    #[test]
    fn test_attributes_before_children() {
        assert_eq!(
            expressions("<div id=\"a-{id}\" class:on={on} {...rest} {short}>{text}</div>"),
            vec!["id", "on", "text"]
        );
    }

    #[test]
    fn test_directives() {
        assert_eq!(
            expressions(
                "<Comp bind:value={v} on:click={go} use:act={p} transition:fade={t} let:item={i} bind:checked />"
            ),
            vec!["v", "go", "p", "t", "i"]
        );
    }

    #[test]
    fn test_blocks() {
        let source = "{#if a}{b}{:else if c}{d}{:else}{e}{/if}{#each xs as x (x.id)}{x}{:else}{f}{/each}{#key k}{g}{/key}";
        assert_eq!(
            expressions(source),
            vec!["a", "b", "c", "d", "e", "xs", "x", "f", "k", "g"]
        );
    }

    #[test]
    fn test_await_branches() {
        assert_eq!(
            expressions("{#await p}{w}{:then v}{v.x}{:catch e}{e.m}{/await}"),
            vec!["p", "w", "v.x", "e.m"]
        );
        assert_eq!(expressions("{#await p then v}{v}{/await}"), vec!["p", "v"]);
    }

    #[test]
    fn test_remap() {
        let span = ExpressionSpan {
            start: 4,
            end: 9,
            line: 2,
        };
        assert_eq!(
            span.remap(10, 3),
            ExpressionSpan {
                start: 14,
                end: 19,
                line: 4,
            }
        );
    }
}

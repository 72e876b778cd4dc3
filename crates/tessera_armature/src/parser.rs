//! Svelte template parser.
//!
//! A recursive-descent parser over [`Scanner`]. Each element or block parses
//! its children with [`Parser::parse_fragment`], which stops at the first
//! construct it cannot own (a closing tag, a block branch or closer, or a
//! sibling that implicitly ends the parent). The caller then inspects that
//! terminator to decide whether it closes the node, closes it implicitly, or
//! is an error.

use tessera_carton::{
    closing_tag_omitted, has_optional_end_tag, is_raw_text_tag, Box, Bump, FxHashSet, String,
    Vec,
};
use tessera_relief::{
    AttributeNode, AttributeValue, AwaitBlockNode, CommentNode, CompilerError, ConstTagNode,
    DebugTagNode, DirectiveKind, DirectiveNode, EachBlockNode, ElementNode, ElementType,
    ElseBlockNode, ErrorCode, ExpressionNode, IfBlockNode, KeyBlockNode, MustacheTagNode,
    ParserOptions, PropNode, RootNode, SourceLocation, SpreadNode, TemplateNode, TextNode,
};

use crate::scanner::{at_close_brace, char_codes::*, is_ident_char, is_whitespace, is_word_at, Scanner};

/// What the cursor is looking at when a child list ends
#[derive(Debug, Clone, Copy)]
enum Terminator<'s> {
    /// Ordinary content, or an opening tag that ends the parent implicitly
    Content,
    Eof,
    /// `</name>`
    CloseTag {
        name: &'s str,
        start: usize,
        /// Offset after `>` if the tag is closed
        end: Option<usize>,
        name_end: usize,
    },
    /// `{:keyword ...}`
    BlockBranch {
        keyword: &'s str,
        start: usize,
        body: usize,
    },
    /// `{/keyword}`
    BlockClose { start: usize, body: usize },
}

/// Await block branch being filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AwaitBranch {
    Pending,
    Then,
    Catch,
}

/// Svelte template parser
pub struct Parser<'a> {
    allocator: &'a Bump,
    scanner: Scanner<'a>,
    options: ParserOptions,
}

impl<'a> Parser<'a> {
    /// Create a new parser
    pub fn new(allocator: &'a Bump, source: &'a str) -> Self {
        Self::with_options(allocator, source, ParserOptions::default())
    }

    /// Create a new parser with options
    pub fn with_options(allocator: &'a Bump, source: &'a str, options: ParserOptions) -> Self {
        Self {
            allocator,
            scanner: Scanner::new(source),
            options,
        }
    }

    /// Parse the template
    pub fn parse(mut self) -> Result<RootNode<'a>, CompilerError> {
        let source = self.scanner.source();
        let mut root = RootNode::new(self.allocator, source);

        self.parse_fragment(&mut root.children, None)?;
        match self.peek_terminator() {
            Terminator::Eof => {}
            other => return Err(self.misplaced(other)),
        }

        root.loc = self.scanner.loc(0, source.len());
        Ok(root)
    }

    // ------------------------------------------------------------------
    // Fragments
    // ------------------------------------------------------------------

    fn parse_fragment(
        &mut self,
        children: &mut Vec<'a, TemplateNode<'a>>,
        parent_tag: Option<&str>,
    ) -> Result<(), CompilerError> {
        loop {
            if !matches!(self.peek_terminator(), Terminator::Content) {
                return Ok(());
            }

            if self.scanner.starts_with("<!--") {
                if let Some(comment) = self.parse_comment()? {
                    children.push(comment);
                }
                continue;
            }

            match self.scanner.peek() {
                Some(LT) => {
                    if let Some(parent) = parent_tag {
                        let next = self.peek_tag_name(self.scanner.index() + 1);
                        if closing_tag_omitted(parent, next) {
                            return Ok(());
                        }
                    }
                    children.push(self.parse_element()?);
                }
                Some(LEFT_BRACE) => children.push(self.parse_mustache()?),
                _ => children.push(self.parse_text()),
            }
        }
    }

    fn peek_terminator(&self) -> Terminator<'a> {
        let scanner = &self.scanner;
        let start = scanner.index();
        if scanner.is_eof() {
            return Terminator::Eof;
        }

        if scanner.starts_with("</") {
            let name = scanner.slice_while(start + 2, |c| !is_whitespace(c) && c != GT);
            let name_end = start + 2 + name.len();
            let after = scanner.skip_whitespace_from(name_end);
            let end = (scanner.byte_at(after) == Some(GT)).then_some(after + 1);
            return Terminator::CloseTag {
                name,
                start,
                end,
                name_end,
            };
        }

        if scanner.peek() == Some(LEFT_BRACE) {
            let sigil = scanner.skip_whitespace_from(start + 1);
            match scanner.byte_at(sigil) {
                Some(COLON) => {
                    let keyword = scanner.slice_while(sigil + 1, |c| c.is_ascii_alphabetic());
                    return Terminator::BlockBranch {
                        keyword,
                        start,
                        body: sigil + 1 + keyword.len(),
                    };
                }
                Some(SLASH) => {
                    return Terminator::BlockClose {
                        start,
                        body: sigil + 1,
                    }
                }
                _ => {}
            }
        }

        Terminator::Content
    }

    /// Error for a terminator that nothing open can accept.
    fn misplaced(&self, terminator: Terminator<'a>) -> CompilerError {
        match terminator {
            Terminator::Content | Terminator::Eof => {
                self.scanner.error(ErrorCode::UnexpectedEof, self.scanner.index())
            }
            Terminator::CloseTag { name, start, .. } => self.invalid_closing_tag(name, start),
            Terminator::BlockClose { start, .. } => {
                self.scanner.error(ErrorCode::UnexpectedBlockClose, start)
            }
            Terminator::BlockBranch { keyword, start, .. } => match keyword {
                "else" => self.scanner.error(ErrorCode::InvalidElsePlacement, start),
                "then" => self.scanner.error(ErrorCode::InvalidThenPlacement, start),
                "catch" => self.scanner.error(ErrorCode::InvalidCatchPlacement, start),
                _ => self.scanner.error_with(
                    ErrorCode::UnexpectedToken,
                    "Expected else, then or catch",
                    start,
                ),
            },
        }
    }

    fn invalid_closing_tag(&self, name: &str, start: usize) -> CompilerError {
        if (self.options.is_void_tag)(name) {
            self.scanner.error_with(
                ErrorCode::InvalidVoidContent,
                format!("</{name}> is a void element and cannot have children, or a closing tag"),
                start,
            )
        } else {
            self.scanner.error_with(
                ErrorCode::InvalidClosingTag,
                format!("</{name}> attempted to close an element that was not open"),
                start,
            )
        }
    }

    // ------------------------------------------------------------------
    // Text and comments
    // ------------------------------------------------------------------

    fn parse_text(&mut self) -> TemplateNode<'a> {
        let start = self.scanner.index();
        let content = self.scanner.read_text();
        let loc = self.scanner.loc(start, self.scanner.index());
        TemplateNode::Text(Box::new_in(TextNode::new(content, loc), self.allocator))
    }

    fn parse_comment(&mut self) -> Result<Option<TemplateNode<'a>>, CompilerError> {
        let start = self.scanner.index();
        self.scanner.advance(4);
        let content_start = self.scanner.index();
        let Some(content_end) = self.scanner.find("-->") else {
            return Err(self.scanner.error(ErrorCode::UnclosedComment, start));
        };
        self.scanner.set_index(content_end + 3);

        if !self.options.comments {
            return Ok(None);
        }
        let content = self.scanner.slice(content_start, content_end);
        let loc = self.scanner.loc(start, self.scanner.index());
        Ok(Some(TemplateNode::Comment(Box::new_in(
            CommentNode::new(content, loc),
            self.allocator,
        ))))
    }

    // ------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------

    fn peek_tag_name(&self, from: usize) -> &'a str {
        self.scanner
            .slice_while(from, |c| !is_whitespace(c) && c != SLASH && c != GT)
    }

    fn element_type(&self, tag: &str) -> ElementType {
        if (self.options.is_component)(tag) {
            ElementType::Component
        } else if tag == "slot" {
            ElementType::Slot
        } else if tag.starts_with("svelte:") {
            ElementType::Special
        } else {
            ElementType::Element
        }
    }

    fn parse_element(&mut self) -> Result<TemplateNode<'a>, CompilerError> {
        let start = self.scanner.index();
        self.scanner.advance(1);

        let name_start = self.scanner.index();
        let tag = self.peek_tag_name(name_start);
        if !is_valid_tag_name(tag) {
            return Err(self.scanner.error(ErrorCode::InvalidTagName, name_start));
        }
        self.scanner.advance(tag.len());

        let mut element = ElementNode::new(self.allocator, tag, SourceLocation::STUB);
        element.tag_type = self.element_type(tag);

        let mut unique_names = FxHashSet::default();
        loop {
            self.scanner.skip_whitespace();
            if self.scanner.is_eof() {
                return Err(self.scanner.error(ErrorCode::UnexpectedEof, self.scanner.index()));
            }
            if self.scanner.eat("/>") {
                element.is_self_closing = true;
                break;
            }
            if self.scanner.eat(">") {
                break;
            }
            let prop = self.parse_attribute(&mut unique_names)?;
            element.props.push(prop);
        }

        if element.is_self_closing || (self.options.is_void_tag)(tag) {
            element.loc = self.scanner.loc(start, self.scanner.index());
            return Ok(TemplateNode::Element(Box::new_in(element, self.allocator)));
        }

        let end = if is_raw_text_tag(tag) {
            self.parse_raw_text(&mut element, start)?
        } else {
            self.parse_fragment(&mut element.children, Some(tag))?;
            self.close_element(tag, element.tag_type, start)?
        };

        element.loc = self.scanner.loc(start, end);
        Ok(TemplateNode::Element(Box::new_in(element, self.allocator)))
    }

    /// `<script>` and `<style>` keep their content as a single text node.
    fn parse_raw_text(
        &mut self,
        element: &mut ElementNode<'a>,
        start: usize,
    ) -> Result<usize, CompilerError> {
        let content_start = self.scanner.index();
        let closing = format!("</{}", element.tag);
        let Some(content_end) = self.scanner.find(&closing) else {
            return Err(self.unclosed_element(&element.tag, start));
        };

        if content_end > content_start {
            let loc = self.scanner.loc(content_start, content_end);
            let text = TextNode::new(self.scanner.slice(content_start, content_end), loc);
            element
                .children
                .push(TemplateNode::Text(Box::new_in(text, self.allocator)));
        }

        self.scanner.set_index(content_end + closing.len());
        self.scanner.skip_whitespace();
        self.scanner.expect(">")?;
        Ok(self.scanner.index())
    }

    /// Decide how an element's child list ended and return the element's end.
    fn close_element(
        &mut self,
        tag: &str,
        tag_type: ElementType,
        start: usize,
    ) -> Result<usize, CompilerError> {
        match self.peek_terminator() {
            // a following sibling closed the element implicitly
            Terminator::Content => Ok(self.scanner.index()),
            Terminator::Eof => Err(self.unclosed_element(tag, start)),
            Terminator::CloseTag {
                name,
                start: close_start,
                end,
                name_end,
            } => {
                if (self.options.is_void_tag)(name) {
                    return Err(self.invalid_closing_tag(name, close_start));
                }
                if name == tag {
                    let Some(end) = end else {
                        return Err(self.expected_gt(name_end));
                    };
                    self.scanner.set_index(end);
                    Ok(end)
                } else if tag_type == ElementType::Element {
                    // an ancestor's closing tag ends every open plain element
                    Ok(close_start)
                } else {
                    Err(self.invalid_closing_tag(name, close_start))
                }
            }
            Terminator::BlockClose { start: close_start, .. } => {
                if has_optional_end_tag(tag) {
                    Ok(close_start)
                } else {
                    Err(self.scanner.error(ErrorCode::UnexpectedBlockClose, close_start))
                }
            }
            Terminator::BlockBranch {
                keyword,
                start: branch_start,
                ..
            } => Err(self.scanner.error_with(
                ErrorCode::UnexpectedToken,
                format!("Expected to close <{tag}> before seeing {{:{keyword}}} block"),
                branch_start,
            )),
        }
    }

    fn unclosed_element(&self, tag: &str, start: usize) -> CompilerError {
        self.scanner.error_with(
            ErrorCode::UnclosedElement,
            format!("<{tag}> was left open"),
            start,
        )
    }

    fn expected_gt(&self, index: usize) -> CompilerError {
        if index >= self.scanner.source().len() {
            self.scanner.error(ErrorCode::UnexpectedEof, index)
        } else {
            self.scanner
                .error_with(ErrorCode::UnexpectedToken, "Expected >", index)
        }
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    fn parse_attribute(
        &mut self,
        unique_names: &mut FxHashSet<String>,
    ) -> Result<PropNode<'a>, CompilerError> {
        let start = self.scanner.index();

        if self.scanner.eat("{") {
            self.scanner.skip_whitespace();
            if self.scanner.eat("...") {
                let expression = self.scanner.read_expression(&at_close_brace)?;
                self.scanner.expect("}")?;
                let loc = self.scanner.loc(start, self.scanner.index());
                return Ok(PropNode::Spread(Box::new_in(
                    SpreadNode { expression, loc },
                    self.allocator,
                )));
            }

            let expression = self.scanner.read_expression(&at_close_brace)?;
            self.scanner.expect("}")?;
            let name = expression.content.clone();
            self.check_unique(unique_names, &name, start)?;

            let mut attribute = AttributeNode::new(name, expression.loc.clone());
            let mut value = Vec::new_in(self.allocator);
            value.push(AttributeValue::Shorthand(expression));
            attribute.value = Some(value);
            attribute.loc = self.scanner.loc(start, self.scanner.index());
            return Ok(PropNode::Attribute(Box::new_in(attribute, self.allocator)));
        }

        let name = self.scanner.read_while(|c| {
            !is_whitespace(c) && !matches!(c, EQ | SLASH | GT | DOUBLE_QUOTE | SINGLE_QUOTE)
        });
        if name.is_empty() {
            return Err(self.scanner.error(ErrorCode::UnexpectedToken, start));
        }
        let name_loc = self.scanner.loc(start, self.scanner.index());

        let directive = name
            .split_once(':')
            .and_then(|(prefix, rest)| DirectiveKind::from_prefix(prefix).map(|kind| (kind, rest)));
        let is_event = matches!(
            directive,
            Some((DirectiveKind::EventHandler | DirectiveKind::Action, _))
        );
        if !is_event {
            self.check_unique(unique_names, name, start)?;
        }

        let before_value = self.scanner.index();
        self.scanner.skip_whitespace();
        let mut value_start = self.scanner.index();
        let value = if self.scanner.eat("=") {
            self.scanner.skip_whitespace();
            value_start = self.scanner.index();
            Some(self.parse_attribute_value()?)
        } else {
            self.scanner.set_index(before_value);
            None
        };
        let loc = self.scanner.loc(start, self.scanner.index());

        if let Some((kind, rest)) = directive {
            let (directive_name, modifiers) = rest.split_once('|').unwrap_or((rest, ""));
            let mut node = DirectiveNode::new(self.allocator, kind, directive_name, loc);
            for modifier in modifiers.split('|').filter(|m| !m.is_empty()) {
                node.modifiers.push(String::from(modifier));
            }
            node.expression = match value {
                Some(parts) => Some(self.directive_expression(parts, value_start)?),
                None => None,
            };
            return Ok(PropNode::Directive(Box::new_in(node, self.allocator)));
        }

        let mut attribute = AttributeNode::new(name, name_loc);
        attribute.value = value;
        attribute.loc = loc;

        if let Some(property) = name.strip_prefix("style:") {
            attribute.name = String::from(property.split('|').next().unwrap_or(property));
            return Ok(PropNode::StyleDirective(Box::new_in(attribute, self.allocator)));
        }
        Ok(PropNode::Attribute(Box::new_in(attribute, self.allocator)))
    }

    fn check_unique(
        &self,
        unique_names: &mut FxHashSet<String>,
        name: &str,
        start: usize,
    ) -> Result<(), CompilerError> {
        if unique_names.insert(String::from(name)) {
            Ok(())
        } else {
            Err(self.scanner.error(ErrorCode::DuplicateAttribute, start))
        }
    }

    /// A directive value must be exactly one `{expression}`.
    fn directive_expression(
        &self,
        mut parts: Vec<'a, AttributeValue>,
        value_start: usize,
    ) -> Result<ExpressionNode, CompilerError> {
        if parts.len() == 1 {
            if let Some(AttributeValue::MustacheTag(tag)) = parts.pop() {
                return Ok(tag.expression);
            }
        }
        Err(self
            .scanner
            .error(ErrorCode::InvalidDirectiveValue, value_start))
    }

    fn parse_attribute_value(&mut self) -> Result<Vec<'a, AttributeValue>, CompilerError> {
        let quote = match self.scanner.peek() {
            Some(q @ (DOUBLE_QUOTE | SINGLE_QUOTE)) => {
                self.scanner.advance(1);
                Some(q)
            }
            Some(GT) | None => {
                return Err(self.scanner.error_with(
                    ErrorCode::UnexpectedToken,
                    "Expected value for the attribute",
                    self.scanner.index(),
                ))
            }
            Some(_) => None,
        };

        let mut parts = Vec::new_in(self.allocator);
        let mut text_start = self.scanner.index();
        loop {
            let Some(c) = self.scanner.peek() else {
                let code = if quote.is_some() {
                    ErrorCode::UnclosedAttributeValue
                } else {
                    ErrorCode::UnexpectedEof
                };
                return Err(self.scanner.error(code, self.scanner.index()));
            };

            let done = match quote {
                Some(q) => c == q,
                None => {
                    is_whitespace(c)
                        || matches!(c, DOUBLE_QUOTE | SINGLE_QUOTE | EQ | LT | GT | GRAVE_ACCENT)
                        || self.scanner.starts_with("/>")
                }
            };
            if done || c == LEFT_BRACE {
                let here = self.scanner.index();
                if here > text_start {
                    let text = TextNode::new(
                        self.scanner.slice(text_start, here),
                        self.scanner.loc(text_start, here),
                    );
                    parts.push(AttributeValue::Text(text));
                }
            }
            if done {
                if quote.is_some() {
                    self.scanner.advance(1);
                }
                return Ok(parts);
            }

            if c == LEFT_BRACE {
                let start = self.scanner.index();
                self.scanner.advance(1);
                let expression = self.scanner.read_expression(&at_close_brace)?;
                self.scanner.expect("}")?;
                let loc = self.scanner.loc(start, self.scanner.index());
                parts.push(AttributeValue::MustacheTag(MustacheTagNode { expression, loc }));
                text_start = self.scanner.index();
            } else {
                self.scanner.advance(1);
            }
        }
    }

    // ------------------------------------------------------------------
    // Mustaches
    // ------------------------------------------------------------------

    fn parse_mustache(&mut self) -> Result<TemplateNode<'a>, CompilerError> {
        let start = self.scanner.index();
        self.scanner.advance(1);
        self.scanner.skip_whitespace();

        if self.scanner.eat("#") {
            return self.parse_block(start);
        }
        if self.scanner.eat("@") {
            return self.parse_tag(start);
        }

        let expression = self.scanner.read_expression(&at_close_brace)?;
        self.scanner.expect("}")?;
        let loc = self.scanner.loc(start, self.scanner.index());
        Ok(TemplateNode::MustacheTag(Box::new_in(
            MustacheTagNode { expression, loc },
            self.allocator,
        )))
    }

    fn expect_close_brace(&mut self) -> Result<(), CompilerError> {
        self.scanner.skip_whitespace();
        self.scanner.expect("}")
    }

    /// `{@html}`, `{@debug}` and `{@const}`
    fn parse_tag(&mut self, start: usize) -> Result<TemplateNode<'a>, CompilerError> {
        let keyword_start = self.scanner.index();
        let keyword = self.scanner.read_while(|c| c.is_ascii_alphabetic());

        match keyword {
            "html" => {
                self.scanner.require_whitespace()?;
                let expression = self.scanner.read_expression(&at_close_brace)?;
                self.expect_close_brace()?;
                let loc = self.scanner.loc(start, self.scanner.index());
                Ok(TemplateNode::RawMustacheTag(Box::new_in(
                    MustacheTagNode { expression, loc },
                    self.allocator,
                )))
            }
            "debug" => {
                let mut identifiers = Vec::new_in(self.allocator);
                loop {
                    self.scanner.skip_whitespace();
                    if self.scanner.eat("}") {
                        break;
                    }
                    let identifier = self
                        .scanner
                        .read_pattern(&|b, i| b[i] == COMMA || b[i] == RIGHT_BRACE)?;
                    identifiers.push(identifier);
                    self.scanner.eat(",");
                }
                let loc = self.scanner.loc(start, self.scanner.index());
                Ok(TemplateNode::DebugTag(Box::new_in(
                    DebugTagNode { identifiers, loc },
                    self.allocator,
                )))
            }
            "const" => {
                self.scanner.require_whitespace()?;
                let expression = self.scanner.read_expression(&at_close_brace)?;
                self.expect_close_brace()?;
                let loc = self.scanner.loc(start, self.scanner.index());
                Ok(TemplateNode::ConstTag(Box::new_in(
                    ConstTagNode { expression, loc },
                    self.allocator,
                )))
            }
            _ => Err(self.scanner.error(ErrorCode::ExpectedTag, keyword_start)),
        }
    }

    // ------------------------------------------------------------------
    // Blocks
    // ------------------------------------------------------------------

    fn parse_block(&mut self, start: usize) -> Result<TemplateNode<'a>, CompilerError> {
        let keyword_start = self.scanner.index();
        let keyword = self.scanner.read_while(|c| c.is_ascii_alphabetic());

        Ok(match keyword {
            "if" => {
                let node = self.parse_if(start, false)?;
                TemplateNode::If(Box::new_in(node, self.allocator))
            }
            "each" => {
                let node = self.parse_each(start)?;
                TemplateNode::Each(Box::new_in(node, self.allocator))
            }
            "await" => {
                let node = self.parse_await(start)?;
                TemplateNode::Await(Box::new_in(node, self.allocator))
            }
            "key" => {
                let node = self.parse_key(start)?;
                TemplateNode::Key(Box::new_in(node, self.allocator))
            }
            _ => return Err(self.scanner.error(ErrorCode::ExpectedBlockType, keyword_start)),
        })
    }

    /// Consume `{/keyword}` and return the offset after it.
    fn close_block(&mut self, expected: &str, block_start: usize) -> Result<usize, CompilerError> {
        match self.peek_terminator() {
            Terminator::BlockClose { body, .. } => {
                self.scanner.set_index(body);
                self.scanner.skip_whitespace();
                let keyword_start = self.scanner.index();
                if !self.scanner.eat_word(expected) {
                    return Err(self.scanner.error_with(
                        ErrorCode::UnexpectedToken,
                        format!("Expected {expected}"),
                        keyword_start,
                    ));
                }
                self.expect_close_brace()?;
                Ok(self.scanner.index())
            }
            Terminator::Eof => Err(self.scanner.error(ErrorCode::UnclosedBlock, block_start)),
            other => Err(self.misplaced(other)),
        }
    }

    /// `{#if}` or, with `elseif`, the `if` part of `{:else if}`.
    fn parse_if(&mut self, start: usize, elseif: bool) -> Result<IfBlockNode<'a>, CompilerError> {
        self.scanner.require_whitespace()?;
        let expression = self.scanner.read_expression(&at_close_brace)?;
        self.expect_close_brace()?;

        let mut node = IfBlockNode::new(self.allocator, expression, SourceLocation::STUB);
        node.elseif = elseif;
        self.parse_fragment(&mut node.children, None)?;

        let end = match self.peek_terminator() {
            Terminator::BlockBranch {
                keyword: "else",
                start: else_start,
                body,
            } => {
                self.scanner.set_index(body);
                let spaced = self.scanner.skip_whitespace();
                let mut else_block = ElseBlockNode::new(self.allocator, SourceLocation::STUB);

                let end = if spaced && self.scanner.eat_word("if") {
                    // the nested block owns the rest of the chain and its `{/if}`
                    let nested = self.parse_if(else_start, true)?;
                    let end = nested.loc.end.offset as usize;
                    else_block
                        .children
                        .push(TemplateNode::If(Box::new_in(nested, self.allocator)));
                    end
                } else {
                    self.expect_close_brace()?;
                    self.parse_fragment(&mut else_block.children, None)?;
                    self.close_block("if", start)?
                };

                else_block.loc = self.scanner.loc(else_start, end);
                node.else_block = Some(Box::new_in(else_block, self.allocator));
                end
            }
            Terminator::BlockClose { .. } => self.close_block("if", start)?,
            Terminator::Eof => return Err(self.scanner.error(ErrorCode::UnclosedBlock, start)),
            other => return Err(self.misplaced(other)),
        };

        node.loc = self.scanner.loc(start, end);
        Ok(node)
    }

    /// `{#each expression as context, index (key)}`
    fn parse_each(&mut self, start: usize) -> Result<EachBlockNode<'a>, CompilerError> {
        self.scanner.require_whitespace()?;
        let expression = self
            .scanner
            .read_expression(&|b, i| at_close_brace(b, i) || is_word_at(b, i, b"as"))?;
        if !self.scanner.eat_word("as") {
            return Err(self.scanner.error(ErrorCode::ExpectedEachAs, self.scanner.index()));
        }
        self.scanner.require_whitespace()?;

        let context = self
            .scanner
            .read_pattern(&|b, i| matches!(b[i], RIGHT_BRACE | COMMA | LEFT_PAREN))?;

        let mut index = None;
        if self.scanner.eat(",") {
            self.scanner.skip_whitespace();
            let index_start = self.scanner.index();
            let name = self.scanner.read_while(is_ident_char);
            if name.is_empty() {
                return Err(self.scanner.error(ErrorCode::UnexpectedToken, index_start));
            }
            index = Some(String::from(name));
            self.scanner.skip_whitespace();
        }

        let mut key = None;
        if self.scanner.eat("(") {
            key = Some(self.scanner.read_expression(&|b, i| b[i] == RIGHT_PAREN)?);
            self.scanner.expect(")")?;
        }
        self.expect_close_brace()?;

        let mut node = EachBlockNode {
            expression,
            context,
            index,
            key,
            children: Vec::new_in(self.allocator),
            else_block: None,
            loc: SourceLocation::STUB,
        };
        self.parse_fragment(&mut node.children, None)?;

        let end = match self.peek_terminator() {
            Terminator::BlockBranch {
                keyword: "else",
                start: else_start,
                body,
            } => {
                self.scanner.set_index(body);
                if self.scanner.skip_whitespace() && self.scanner.eat_word("if") {
                    return Err(self
                        .scanner
                        .error(ErrorCode::InvalidElseIfPlacement, else_start));
                }
                self.expect_close_brace()?;

                let mut else_block = ElseBlockNode::new(self.allocator, SourceLocation::STUB);
                self.parse_fragment(&mut else_block.children, None)?;
                let end = self.close_block("each", start)?;
                else_block.loc = self.scanner.loc(else_start, end);
                node.else_block = Some(Box::new_in(else_block, self.allocator));
                end
            }
            Terminator::BlockClose { .. } => self.close_block("each", start)?,
            Terminator::Eof => return Err(self.scanner.error(ErrorCode::UnclosedBlock, start)),
            other => return Err(self.misplaced(other)),
        };

        node.loc = self.scanner.loc(start, end);
        Ok(node)
    }

    fn parse_key(&mut self, start: usize) -> Result<KeyBlockNode<'a>, CompilerError> {
        self.scanner.require_whitespace()?;
        let expression = self.scanner.read_expression(&at_close_brace)?;
        self.expect_close_brace()?;

        let mut children = Vec::new_in(self.allocator);
        self.parse_fragment(&mut children, None)?;
        let end = self.close_block("key", start)?;

        Ok(KeyBlockNode {
            expression,
            children,
            loc: self.scanner.loc(start, end),
        })
    }

    /// `{#await}` with `{:then}` / `{:catch}` sections or the inline
    /// `{#await p then v}` / `{#await p catch e}` forms.
    fn parse_await(&mut self, start: usize) -> Result<AwaitBlockNode<'a>, CompilerError> {
        self.scanner.require_whitespace()?;
        let expression = self.scanner.read_expression(&|b, i| {
            at_close_brace(b, i) || is_word_at(b, i, b"then") || is_word_at(b, i, b"catch")
        })?;

        let mut node = AwaitBlockNode::new(self.allocator, expression, SourceLocation::STUB);
        let mut branch = AwaitBranch::Pending;
        if self.scanner.eat_word("then") {
            node.value = self.read_binding()?;
            branch = AwaitBranch::Then;
        } else if self.scanner.eat_word("catch") {
            node.error = self.read_binding()?;
            branch = AwaitBranch::Catch;
        }
        self.expect_close_brace()?;

        loop {
            let target = match branch {
                AwaitBranch::Pending => &mut node.pending,
                AwaitBranch::Then => &mut node.then,
                AwaitBranch::Catch => &mut node.catch,
            };
            target.skip = false;
            self.parse_fragment(&mut target.children, None)?;

            match self.peek_terminator() {
                Terminator::BlockBranch {
                    keyword: "then",
                    body,
                    ..
                } if branch == AwaitBranch::Pending => {
                    self.scanner.set_index(body);
                    node.value = self.read_binding()?;
                    self.expect_close_brace()?;
                    branch = AwaitBranch::Then;
                }
                Terminator::BlockBranch {
                    keyword: "catch",
                    body,
                    ..
                } if branch != AwaitBranch::Catch => {
                    self.scanner.set_index(body);
                    node.error = self.read_binding()?;
                    self.expect_close_brace()?;
                    branch = AwaitBranch::Catch;
                }
                Terminator::BlockClose { .. } => {
                    let end = self.close_block("await", start)?;
                    node.loc = self.scanner.loc(start, end);
                    return Ok(node);
                }
                Terminator::Eof => {
                    return Err(self.scanner.error(ErrorCode::UnclosedBlock, start))
                }
                other => return Err(self.misplaced(other)),
            }
        }
    }

    /// Optional `then`/`catch` binding pattern.
    fn read_binding(&mut self) -> Result<Option<ExpressionNode>, CompilerError> {
        self.scanner.skip_whitespace();
        if self.scanner.peek() == Some(RIGHT_BRACE) {
            return Ok(None);
        }
        self.scanner.read_pattern(&at_close_brace).map(Some)
    }
}

/// Letters first, then letters, digits, `-`, `:`, `.` or `_`.
fn is_valid_tag_name(tag: &str) -> bool {
    let mut bytes = tag.bytes();
    bytes.next().is_some_and(|c| c.is_ascii_alphabetic())
        && bytes.all(|c| c.is_ascii_alphanumeric() || matches!(c, b'-' | b':' | b'.' | b'_'))
}

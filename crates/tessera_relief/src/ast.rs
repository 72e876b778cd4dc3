//! Svelte template AST node types.
//!
//! This module defines the AST produced by the strict template parser.
//! All AST nodes are allocated in a bumpalo arena that lives for one parse.
//! Every expression keeps its own location relative to the parsed text, which
//! is what the fragment divider remaps into document coordinates.

use serde::{Deserialize, Serialize};
use tessera_carton::{Box, Bump, String, Vec};

/// Node type discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Root = 0,
    Element = 1,
    Text = 2,
    Comment = 3,
    MustacheTag = 4,
    RawMustacheTag = 5,
    DebugTag = 6,
    ConstTag = 7,
    Attribute = 8,
    Spread = 9,
    Directive = 10,
    StyleDirective = 11,
    IfBlock = 12,
    ElseBlock = 13,
    EachBlock = 14,
    KeyBlock = 15,
    AwaitBlock = 16,
}

/// Element type discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum ElementType {
    #[default]
    Element = 0,
    /// Capitalized or dotted tags, `svelte:component`, `svelte:self`, `svelte:element`
    Component = 1,
    Slot = 2,
    /// Other `svelte:*` meta elements (`svelte:head`, `svelte:window`, ...)
    Special = 3,
}

/// Source position in the template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Position {
    /// Byte offset from start of the parsed text
    pub offset: u32,
    /// 1-indexed line number
    pub line: u32,
    /// 1-indexed column number
    pub column: u32,
}

impl Position {
    pub const fn new(offset: u32, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

/// Source location span [start, end)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
    pub source: String,
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::STUB
    }
}

impl SourceLocation {
    /// Stub location for nodes whose extent is not known yet
    pub const STUB: Self = Self {
        start: Position {
            offset: 0,
            line: 1,
            column: 1,
        },
        end: Position {
            offset: 0,
            line: 1,
            column: 1,
        },
        source: String::const_new(""),
    };

    pub fn new(start: Position, end: Position, source: impl Into<String>) -> Self {
        Self {
            start,
            end,
            source: source.into(),
        }
    }

    /// Byte range covered by this location.
    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start.offset as usize..self.end.offset as usize
    }
}

/// Root AST node
#[derive(Debug)]
pub struct RootNode<'a> {
    pub children: Vec<'a, TemplateNode<'a>>,
    pub source: String,
    pub loc: SourceLocation,
}

impl<'a> RootNode<'a> {
    pub fn new(allocator: &'a Bump, source: impl Into<String>) -> Self {
        Self {
            children: Vec::new_in(allocator),
            source: source.into(),
            loc: SourceLocation::STUB,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Root
    }
}

// ============================================================================
// Template Nodes
// ============================================================================

/// All template child node types
#[derive(Debug)]
pub enum TemplateNode<'a> {
    Element(Box<'a, ElementNode<'a>>),
    Text(Box<'a, TextNode>),
    Comment(Box<'a, CommentNode>),
    /// `{expression}`
    MustacheTag(Box<'a, MustacheTagNode>),
    /// `{@html expression}`
    RawMustacheTag(Box<'a, MustacheTagNode>),
    /// `{@debug a, b}`
    DebugTag(Box<'a, DebugTagNode<'a>>),
    /// `{@const a = b}`
    ConstTag(Box<'a, ConstTagNode>),
    If(Box<'a, IfBlockNode<'a>>),
    Each(Box<'a, EachBlockNode<'a>>),
    Key(Box<'a, KeyBlockNode<'a>>),
    Await(Box<'a, AwaitBlockNode<'a>>),
}

impl<'a> TemplateNode<'a> {
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Element(_) => NodeType::Element,
            Self::Text(_) => NodeType::Text,
            Self::Comment(_) => NodeType::Comment,
            Self::MustacheTag(_) => NodeType::MustacheTag,
            Self::RawMustacheTag(_) => NodeType::RawMustacheTag,
            Self::DebugTag(_) => NodeType::DebugTag,
            Self::ConstTag(_) => NodeType::ConstTag,
            Self::If(_) => NodeType::IfBlock,
            Self::Each(_) => NodeType::EachBlock,
            Self::Key(_) => NodeType::KeyBlock,
            Self::Await(_) => NodeType::AwaitBlock,
        }
    }

    pub fn loc(&self) -> &SourceLocation {
        match self {
            Self::Element(n) => &n.loc,
            Self::Text(n) => &n.loc,
            Self::Comment(n) => &n.loc,
            Self::MustacheTag(n) | Self::RawMustacheTag(n) => &n.loc,
            Self::DebugTag(n) => &n.loc,
            Self::ConstTag(n) => &n.loc,
            Self::If(n) => &n.loc,
            Self::Each(n) => &n.loc,
            Self::Key(n) => &n.loc,
            Self::Await(n) => &n.loc,
        }
    }
}

/// Element node
#[derive(Debug)]
pub struct ElementNode<'a> {
    pub tag: String,
    pub tag_type: ElementType,
    pub props: Vec<'a, PropNode<'a>>,
    pub children: Vec<'a, TemplateNode<'a>>,
    pub is_self_closing: bool,
    pub loc: SourceLocation,
}

impl<'a> ElementNode<'a> {
    pub fn new(allocator: &'a Bump, tag: impl Into<String>, loc: SourceLocation) -> Self {
        Self {
            tag: tag.into(),
            tag_type: ElementType::Element,
            props: Vec::new_in(allocator),
            children: Vec::new_in(allocator),
            is_self_closing: false,
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Element
    }

    pub fn is_component(&self) -> bool {
        self.tag_type == ElementType::Component
    }
}

/// Prop node (attribute, directive or spread)
#[derive(Debug)]
pub enum PropNode<'a> {
    Attribute(Box<'a, AttributeNode<'a>>),
    Directive(Box<'a, DirectiveNode<'a>>),
    /// `style:property="value"`, shaped like an attribute
    StyleDirective(Box<'a, AttributeNode<'a>>),
    /// `{...props}`
    Spread(Box<'a, SpreadNode>),
}

impl<'a> PropNode<'a> {
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Attribute(_) => NodeType::Attribute,
            Self::Directive(_) => NodeType::Directive,
            Self::StyleDirective(_) => NodeType::StyleDirective,
            Self::Spread(_) => NodeType::Spread,
        }
    }

    pub fn loc(&self) -> &SourceLocation {
        match self {
            Self::Attribute(n) | Self::StyleDirective(n) => &n.loc,
            Self::Directive(n) => &n.loc,
            Self::Spread(n) => &n.loc,
        }
    }
}

/// Attribute node
#[derive(Debug)]
pub struct AttributeNode<'a> {
    pub name: String,
    pub name_loc: SourceLocation,
    /// `None` for a boolean attribute such as `disabled`
    pub value: Option<Vec<'a, AttributeValue>>,
    pub loc: SourceLocation,
}

impl<'a> AttributeNode<'a> {
    pub fn new(name: impl Into<String>, name_loc: SourceLocation) -> Self {
        Self {
            name: name.into(),
            loc: name_loc.clone(),
            name_loc,
            value: None,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Attribute
    }
}

/// One segment of an attribute value
#[derive(Debug)]
pub enum AttributeValue {
    Text(TextNode),
    MustacheTag(MustacheTagNode),
    /// `{name}` written in place of `name={name}`
    Shorthand(ExpressionNode),
}

/// Directive kind, from the prefix before `:`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectiveKind {
    /// `bind:`
    Binding,
    /// `on:`
    EventHandler,
    /// `class:`
    Class,
    /// `use:`
    Action,
    /// `transition:`, `in:` and `out:`
    Transition { intro: bool, outro: bool },
    /// `animate:`
    Animation,
    /// `let:`
    Let,
}

impl DirectiveKind {
    /// Resolve a directive prefix such as `bind` or `in`.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Some(match prefix {
            "bind" => Self::Binding,
            "on" => Self::EventHandler,
            "class" => Self::Class,
            "use" => Self::Action,
            "transition" => Self::Transition {
                intro: true,
                outro: true,
            },
            "in" => Self::Transition {
                intro: true,
                outro: false,
            },
            "out" => Self::Transition {
                intro: false,
                outro: true,
            },
            "animate" => Self::Animation,
            "let" => Self::Let,
            _ => return None,
        })
    }
}

/// Directive node (`bind:value={x}`, `on:click|once={handler}`, ...)
#[derive(Debug)]
pub struct DirectiveNode<'a> {
    pub kind: DirectiveKind,
    /// Name after the prefix (e.g., "click" in `on:click`)
    pub name: String,
    /// Modifiers after `|` (e.g., ["preventDefault"])
    pub modifiers: Vec<'a, String>,
    /// Bound expression, `None` for shorthand forms such as `bind:value`
    pub expression: Option<ExpressionNode>,
    pub loc: SourceLocation,
}

impl<'a> DirectiveNode<'a> {
    pub fn new(
        allocator: &'a Bump,
        kind: DirectiveKind,
        name: impl Into<String>,
        loc: SourceLocation,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            modifiers: Vec::new_in(allocator),
            expression: None,
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Directive
    }
}

/// Spread attribute node
#[derive(Debug)]
pub struct SpreadNode {
    pub expression: ExpressionNode,
    pub loc: SourceLocation,
}

/// Text node
#[derive(Debug)]
pub struct TextNode {
    pub content: String,
    pub loc: SourceLocation,
}

impl TextNode {
    pub fn new(content: impl Into<String>, loc: SourceLocation) -> Self {
        Self {
            content: content.into(),
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Text
    }
}

/// Comment node
#[derive(Debug)]
pub struct CommentNode {
    pub content: String,
    pub loc: SourceLocation,
}

impl CommentNode {
    pub fn new(content: impl Into<String>, loc: SourceLocation) -> Self {
        Self {
            content: content.into(),
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Comment
    }
}

/// Mustache tag node (`{expr}` or `{@html expr}`)
#[derive(Debug)]
pub struct MustacheTagNode {
    pub expression: ExpressionNode,
    pub loc: SourceLocation,
}

/// `{@debug ...}` node
#[derive(Debug)]
pub struct DebugTagNode<'a> {
    pub identifiers: Vec<'a, ExpressionNode>,
    pub loc: SourceLocation,
}

/// `{@const ...}` node
#[derive(Debug)]
pub struct ConstTagNode {
    /// The whole `name = value` declaration
    pub expression: ExpressionNode,
    pub loc: SourceLocation,
}

// ============================================================================
// Expression Nodes
// ============================================================================

/// An embedded script expression, located in the parsed text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionNode {
    pub content: String,
    pub loc: SourceLocation,
}

impl ExpressionNode {
    pub fn new(content: impl Into<String>, loc: SourceLocation) -> Self {
        Self {
            content: content.into(),
            loc,
        }
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.loc.start.offset as usize
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.loc.end.offset as usize
    }

    /// 1-based line of the first character
    #[inline]
    pub fn line(&self) -> usize {
        self.loc.start.line as usize
    }
}

// ============================================================================
// Control Blocks
// ============================================================================

/// `{:else}` branch of an if/each block
#[derive(Debug)]
pub struct ElseBlockNode<'a> {
    pub children: Vec<'a, TemplateNode<'a>>,
    pub loc: SourceLocation,
}

impl<'a> ElseBlockNode<'a> {
    pub fn new(allocator: &'a Bump, loc: SourceLocation) -> Self {
        Self {
            children: Vec::new_in(allocator),
            loc,
        }
    }
}

/// `{#if}` block. An `{:else if}` is an `elseif` block as the only child of
/// its parent's else branch.
#[derive(Debug)]
pub struct IfBlockNode<'a> {
    pub expression: ExpressionNode,
    pub children: Vec<'a, TemplateNode<'a>>,
    pub else_block: Option<Box<'a, ElseBlockNode<'a>>>,
    pub elseif: bool,
    pub loc: SourceLocation,
}

impl<'a> IfBlockNode<'a> {
    pub fn new(allocator: &'a Bump, expression: ExpressionNode, loc: SourceLocation) -> Self {
        Self {
            expression,
            children: Vec::new_in(allocator),
            else_block: None,
            elseif: false,
            loc,
        }
    }
}

/// `{#each expression as context, index (key)}` block
#[derive(Debug)]
pub struct EachBlockNode<'a> {
    pub expression: ExpressionNode,
    pub context: ExpressionNode,
    pub index: Option<String>,
    pub key: Option<ExpressionNode>,
    pub children: Vec<'a, TemplateNode<'a>>,
    pub else_block: Option<Box<'a, ElseBlockNode<'a>>>,
    pub loc: SourceLocation,
}

/// `{#key}` block
#[derive(Debug)]
pub struct KeyBlockNode<'a> {
    pub expression: ExpressionNode,
    pub children: Vec<'a, TemplateNode<'a>>,
    pub loc: SourceLocation,
}

/// One branch of an await block
#[derive(Debug)]
pub struct AwaitBranchNode<'a> {
    pub children: Vec<'a, TemplateNode<'a>>,
    /// True when the branch was not written at all
    pub skip: bool,
}

impl<'a> AwaitBranchNode<'a> {
    pub fn new(allocator: &'a Bump, skip: bool) -> Self {
        Self {
            children: Vec::new_in(allocator),
            skip,
        }
    }
}

/// `{#await}` block
#[derive(Debug)]
pub struct AwaitBlockNode<'a> {
    pub expression: ExpressionNode,
    /// Binding of the resolved value (`then value`)
    pub value: Option<ExpressionNode>,
    /// Binding of the rejection (`catch error`)
    pub error: Option<ExpressionNode>,
    pub pending: AwaitBranchNode<'a>,
    pub then: AwaitBranchNode<'a>,
    pub catch: AwaitBranchNode<'a>,
    pub loc: SourceLocation,
}

impl<'a> AwaitBlockNode<'a> {
    pub fn new(allocator: &'a Bump, expression: ExpressionNode, loc: SourceLocation) -> Self {
        Self {
            expression,
            value: None,
            error: None,
            pending: AwaitBranchNode::new(allocator, true),
            then: AwaitBranchNode::new(allocator, true),
            catch: AwaitBranchNode::new(allocator, true),
            loc,
        }
    }
}

//! Selector parsing and matching
//!
//! Supports the subset of CSS selectors the linter needs to query the tree
//! and to describe required ancestors:
//!
//! - Type selectors and the universal selector: `li`, `*`
//! - Class and ID selectors: `.item`, `#main`
//! - Attribute selectors: `[href]`, `[type="text"]`
//! - `:first-child` and `:last-child`
//! - Combinators: descendant (whitespace), `>`, `+`, `~`
//! - Comma-separated alternatives
//!
//! Query results are always in document (depth-first) order, whatever the
//! order of the alternatives in the selector string.

use std::collections::HashSet;
use std::iter::Peekable;
use std::str::{CharIndices, FromStr};

use thiserror::Error;

use crate::{DomTree, ElementData, NodeId};

/// Error raised for selectors outside the supported grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The selector (or one of its alternatives) is empty.
    #[error("Selector \"{0}\" is empty")]
    Empty(String),

    /// A character that cannot appear at this point.
    #[error("Unexpected \"{found}\" at position {position} in selector \"{selector}\"")]
    Unexpected {
        /// The full selector.
        selector: String,
        /// Offending character.
        found: char,
        /// Byte position of the character.
        position: usize,
    },

    /// A combinator with nothing on its right-hand side.
    #[error("Selector \"{0}\" ends with a combinator")]
    DanglingCombinator(String),

    /// `[name` without the closing bracket.
    #[error("Unterminated attribute selector in \"{0}\"")]
    UnterminatedAttribute(String),

    /// `~=`, `^=`, `$=`, `*=`, `|=`.
    #[error("Attribute selector operator {0} is not implemented yet")]
    UnsupportedOperator(String),

    /// A pseudo-class other than `:first-child` / `:last-child`.
    #[error("Pseudo-class \":{0}\" is not supported")]
    UnsupportedPseudoClass(String),
}

/// Relationship between a step and the step (or scope) before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `A B`: B is an arbitrary descendant of A.
    Descendant,
    /// `A > B`: B is a direct child of A.
    Child,
    /// `A + B`: B immediately follows A.
    NextSibling,
    /// `A ~ B`: B follows A, not necessarily immediately.
    SubsequentSibling,
}

/// Attribute qualifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSelector {
    /// `[name]`
    Exists(String),
    /// `[name="value"]`, exact and case-sensitive on the value.
    Equals(String, String),
}

/// Structural pseudo-class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoClass {
    /// No preceding element sibling.
    FirstChild,
    /// No following element sibling.
    LastChild,
}

/// A single condition on an element, beyond its tag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// `.name`, checked against the normalized class list.
    Class(String),
    /// `#name`
    Id(String),
    /// `[...]`
    Attribute(AttributeSelector),
    /// `:name`
    PseudoClass(PseudoClass),
}

/// Optional tag plus qualifiers: `li.item[data-x]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    /// Tag name; `None` matches any element (`*` or a bare qualifier).
    pub tag: Option<String>,
    /// Qualifiers, all of which must hold.
    pub qualifiers: Vec<SimpleSelector>,
}

/// One step of a complex selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Relationship to the previous step; for the first step, to the scope.
    pub combinator: Combinator,
    /// What the element reached by the combinator must look like.
    pub compound: CompoundSelector,
}

/// A chain of steps: `ul > li + li`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// Steps, left to right.
    pub steps: Vec<Step>,
}

/// A parsed selector: one or more comma-separated alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// Alternatives, in the order written.
    pub alternatives: Vec<ComplexSelector>,
}

const fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

const fn is_combinator(c: char) -> bool {
    matches!(c, '>' | '+' | '~')
}

type Chars<'a> = Peekable<CharIndices<'a>>;

fn skip_whitespace(chars: &mut Chars<'_>) -> bool {
    let mut skipped = false;
    while chars.next_if(|&(_, c)| c.is_ascii_whitespace()).is_some() {
        skipped = true;
    }
    skipped
}

fn read_ident(chars: &mut Chars<'_>) -> String {
    let mut ident = String::new();
    while let Some((_, c)) = chars.next_if(|&(_, c)| is_ident_char(c)) {
        ident.push(c);
    }
    ident
}

/// Parser state for a single alternative.
struct Parser<'a> {
    raw: &'a str,
    chars: Chars<'a>,
}

impl<'a> Parser<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            raw,
            chars: raw.char_indices().peekable(),
        }
    }

    fn unexpected(&self, position: usize, found: char) -> SelectorError {
        SelectorError::Unexpected {
            selector: self.raw.to_string(),
            found,
            position,
        }
    }

    fn parse_complex(mut self) -> Result<ComplexSelector, SelectorError> {
        let mut steps = Vec::new();
        let mut pending: Option<Combinator> = None;

        loop {
            let _ = skip_whitespace(&mut self.chars);
            let Some(&(position, c)) = self.chars.peek() else {
                break;
            };

            if is_combinator(c) {
                if pending.is_some() {
                    return Err(self.unexpected(position, c));
                }
                let _ = self.chars.next();
                pending = Some(match c {
                    '>' => Combinator::Child,
                    '+' => Combinator::NextSibling,
                    _ => Combinator::SubsequentSibling,
                });
                continue;
            }

            // Whitespace between two compounds is the descendant combinator.
            let combinator = pending.take().unwrap_or(Combinator::Descendant);
            let compound = self.parse_compound()?;
            steps.push(Step { combinator, compound });
        }

        if pending.is_some() {
            return Err(SelectorError::DanglingCombinator(self.raw.to_string()));
        }
        if steps.is_empty() {
            return Err(SelectorError::Empty(self.raw.to_string()));
        }
        Ok(ComplexSelector { steps })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut compound = CompoundSelector {
            tag: None,
            qualifiers: Vec::new(),
        };
        let mut consumed = false;

        if self.chars.next_if(|&(_, c)| c == '*').is_some() {
            consumed = true;
        } else {
            let tag = read_ident(&mut self.chars);
            if !tag.is_empty() {
                compound.tag = Some(tag);
                consumed = true;
            }
        }

        while let Some(&(position, c)) = self.chars.peek() {
            if c.is_ascii_whitespace() || is_combinator(c) {
                break;
            }
            let _ = self.chars.next();
            let qualifier = match c {
                '.' => SimpleSelector::Class(self.expect_ident(position, c)?),
                '#' => SimpleSelector::Id(self.expect_ident(position, c)?),
                '[' => SimpleSelector::Attribute(self.parse_attribute()?),
                ':' => {
                    let name = self.expect_ident(position, c)?;
                    match name.as_str() {
                        "first-child" => SimpleSelector::PseudoClass(PseudoClass::FirstChild),
                        "last-child" => SimpleSelector::PseudoClass(PseudoClass::LastChild),
                        _ => return Err(SelectorError::UnsupportedPseudoClass(name)),
                    }
                }
                _ => return Err(self.unexpected(position, c)),
            };
            compound.qualifiers.push(qualifier);
            consumed = true;
        }

        if !consumed {
            let (position, c) = self.chars.peek().copied().unwrap_or((self.raw.len(), ' '));
            return Err(self.unexpected(position, c));
        }
        Ok(compound)
    }

    fn expect_ident(&mut self, position: usize, sigil: char) -> Result<String, SelectorError> {
        let ident = read_ident(&mut self.chars);
        if ident.is_empty() {
            return Err(self.unexpected(position, sigil));
        }
        Ok(ident)
    }

    /// Parse the inside of `[...]`, the opening bracket already consumed.
    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        let _ = skip_whitespace(&mut self.chars);
        let mut name = String::new();
        while let Some((_, c)) = self.chars.next_if(|&(_, c)| is_ident_char(c) || c == ':') {
            name.push(c);
        }
        let _ = skip_whitespace(&mut self.chars);

        let Some((position, c)) = self.chars.next() else {
            return Err(SelectorError::UnterminatedAttribute(self.raw.to_string()));
        };
        if name.is_empty() {
            return Err(self.unexpected(position, c));
        }

        let selector = match c {
            ']' => return Ok(AttributeSelector::Exists(name)),
            '=' => {
                let _ = skip_whitespace(&mut self.chars);
                let value = self.parse_attribute_value()?;
                AttributeSelector::Equals(name, value)
            }
            '~' | '^' | '$' | '*' | '|' if self.chars.next_if(|&(_, next)| next == '=').is_some() => {
                return Err(SelectorError::UnsupportedOperator(format!("{c}=")));
            }
            _ => return Err(self.unexpected(position, c)),
        };

        let _ = skip_whitespace(&mut self.chars);
        match self.chars.next() {
            Some((_, ']')) => Ok(selector),
            Some((position, c)) => Err(self.unexpected(position, c)),
            None => Err(SelectorError::UnterminatedAttribute(self.raw.to_string())),
        }
    }

    fn parse_attribute_value(&mut self) -> Result<String, SelectorError> {
        match self.chars.peek().copied() {
            Some((_, quote @ ('"' | '\''))) => {
                let _ = self.chars.next();
                let mut value = String::new();
                for (_, c) in self.chars.by_ref() {
                    if c == quote {
                        return Ok(value);
                    }
                    value.push(c);
                }
                Err(SelectorError::UnterminatedAttribute(self.raw.to_string()))
            }
            Some((position, c)) => {
                let value = read_ident(&mut self.chars);
                if value.is_empty() {
                    return Err(self.unexpected(position, c));
                }
                Ok(value)
            }
            None => Err(SelectorError::UnterminatedAttribute(self.raw.to_string())),
        }
    }
}

/// Split on commas that are not inside brackets or quotes.
fn split_alternatives(raw: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in raw.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&raw[start..]);
    parts
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let alternatives = split_alternatives(raw)
            .into_iter()
            .map(|part| {
                let part = part.trim();
                if part.is_empty() {
                    return Err(SelectorError::Empty(raw.to_string()));
                }
                Parser::new(part).parse_complex()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { alternatives })
    }
}

impl Selector {
    /// Parse a selector string.
    pub fn parse(raw: &str) -> Result<Self, SelectorError> {
        raw.parse()
    }

    /// Every element below `scope` matched by any alternative, in document order.
    #[must_use]
    pub fn match_nodes(&self, tree: &DomTree, scope: NodeId) -> Vec<NodeId> {
        let matched: HashSet<NodeId> = self
            .alternatives
            .iter()
            .flat_map(|alternative| alternative.match_from(tree, scope))
            .collect();
        if matched.is_empty() {
            return Vec::new();
        }
        tree.descendants(scope).filter(|id| matched.contains(id)).collect()
    }

    /// Whether `node` is matched by this selector, relative to the document root.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.alternatives.iter().any(|alternative| {
            alternative
                .steps
                .len()
                .checked_sub(1)
                .is_some_and(|last| alternative.matches_at(tree, node, last, NodeId::ROOT))
        })
    }
}

impl ComplexSelector {
    /// Evaluate step by step, keeping the set of elements reached so far.
    fn match_from(&self, tree: &DomTree, scope: NodeId) -> Vec<NodeId> {
        let mut context = vec![scope];
        for step in &self.steps {
            let mut seen = HashSet::new();
            let mut next = Vec::new();
            for &node in &context {
                for candidate in candidates(tree, node, step.combinator) {
                    if seen.insert(candidate) && step.compound.matches(tree, candidate) {
                        next.push(candidate);
                    }
                }
            }
            if next.is_empty() {
                return next;
            }
            context = next;
        }
        context
    }

    /// Match right to left: `node` against step `index`, then backtrack
    /// through the combinators towards `scope`.
    fn matches_at(&self, tree: &DomTree, node: NodeId, index: usize, scope: NodeId) -> bool {
        let step = &self.steps[index];
        if !step.compound.matches(tree, node) {
            return false;
        }

        if index == 0 {
            return match step.combinator {
                Combinator::Descendant => node != scope && tree.is_descendant_of(node, scope),
                Combinator::Child => tree.parent(node) == Some(scope),
                Combinator::NextSibling | Combinator::SubsequentSibling => false,
            };
        }

        let previous = index - 1;
        match step.combinator {
            Combinator::Descendant => tree
                .ancestors(node)
                .take_while(|&ancestor| ancestor != scope)
                .any(|ancestor| self.matches_at(tree, ancestor, previous, scope)),
            Combinator::Child => tree
                .parent(node)
                .is_some_and(|parent| parent != scope && self.matches_at(tree, parent, previous, scope)),
            Combinator::NextSibling => tree
                .prev_element_sibling(node)
                .is_some_and(|sibling| self.matches_at(tree, sibling, previous, scope)),
            Combinator::SubsequentSibling => tree
                .preceding_siblings(node)
                .filter(|&sibling| tree.as_element(sibling).is_some())
                .any(|sibling| self.matches_at(tree, sibling, previous, scope)),
        }
    }
}

/// Elements reachable from `node` through `combinator`.
fn candidates(tree: &DomTree, node: NodeId, combinator: Combinator) -> Vec<NodeId> {
    match combinator {
        Combinator::Descendant => tree.descendants(node).collect(),
        Combinator::Child => tree.child_elements(node).collect(),
        Combinator::NextSibling => tree.next_element_sibling(node).into_iter().collect(),
        Combinator::SubsequentSibling => tree
            .following_siblings(node)
            .filter(|&sibling| tree.as_element(sibling).is_some())
            .collect(),
    }
}

impl CompoundSelector {
    /// Whether the element at `id` satisfies the tag and every qualifier.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        let Some(element) = tree.as_element(id) else {
            return false;
        };
        if let Some(tag) = &self.tag
            && !element.is(tag)
        {
            return false;
        }
        self.qualifiers
            .iter()
            .all(|qualifier| qualifier.matches(tree, id, element))
    }
}

impl SimpleSelector {
    fn matches(&self, tree: &DomTree, id: NodeId, element: &ElementData) -> bool {
        match self {
            Self::Class(class) => element.classes().contains(&class.as_str()),
            Self::Id(expected) => element.id() == Some(expected.as_str()),
            Self::Attribute(AttributeSelector::Exists(key)) => element.has_attribute(key),
            Self::Attribute(AttributeSelector::Equals(key, value)) => element
                .attributes(key)
                .any(|attr| attr.value_str() == Some(value.as_str())),
            Self::PseudoClass(PseudoClass::FirstChild) => tree.prev_element_sibling(id).is_none(),
            Self::PseudoClass(PseudoClass::LastChild) => tree.next_element_sibling(id).is_none(),
        }
    }
}

impl DomTree {
    /// All elements below `scope` matching `selector`, in document order.
    pub fn query_selector_all(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        Ok(Selector::parse(selector)?.match_nodes(self, scope))
    }

    /// First element below `scope` matching `selector`.
    pub fn query_selector(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        Ok(self.query_selector_all(scope, selector)?.first().copied())
    }

    /// Whether `node` matches `selector`.
    pub fn matches(&self, node: NodeId, selector: &str) -> Result<bool, SelectorError> {
        Ok(Selector::parse(selector)?.matches(self, node))
    }

    /// `node` itself or its nearest ancestor (below the root) matching `selector`.
    pub fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        let selector = Selector::parse(selector)?;
        Ok(std::iter::once(node)
            .chain(self.ancestors(node))
            .take_while(|&id| id != NodeId::ROOT)
            .find(|&id| selector.matches(self, id)))
    }
}

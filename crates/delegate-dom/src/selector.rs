//! CSS Selectors
//!
//! Parsing and right-to-left matching for the selector subset used by
//! delegated listeners: type, universal, `#id`, `.class`, `[attr]`,
//! `[attr=value]`, descendant and child combinators, selector lists.

use crate::{DomTree, NodeId};

/// Selector parsing error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,

    #[error("Unexpected character '{ch}' at offset {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("Unexpected end of selector")]
    UnexpectedEnd,
}

/// A parsed selector list (`a, b > c`)
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    text: String,
    selectors: Vec<ComplexSelector>,
}

/// Compound selectors joined by combinators
#[derive(Debug, Clone, PartialEq)]
struct ComplexSelector {
    compounds: Vec<Compound>,
    /// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
}

#[derive(Debug, Clone, PartialEq)]
struct AttrSelector {
    name: String,
    value: Option<String>,
}

impl SelectorList {
    /// Parse a selector list
    pub fn parse(text: &str) -> Result<Self, SelectorError> {
        let mut parser = Parser {
            chars: text.chars().collect(),
            pos: 0,
        };
        let selectors = parser.parse_list()?;
        Ok(Self {
            text: text.to_string(),
            selectors,
        })
    }

    /// Source text as given to `parse`
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Check whether `node` matches any selector in the list
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(tree, node))
    }
}

impl std::fmt::Display for SelectorList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl std::str::FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl ComplexSelector {
    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let last = self.compounds.len() - 1;
        self.compounds[last].matches(tree, node) && self.matches_left_of(tree, node, last)
    }

    /// `node` already matched `compounds[idx]`; check everything to its left
    fn matches_left_of(&self, tree: &DomTree, node: NodeId, idx: usize) -> bool {
        if idx == 0 {
            return true;
        }
        let wanted = &self.compounds[idx - 1];
        match self.combinators[idx - 1] {
            Combinator::Child => tree.parent_element(node).is_some_and(|parent| {
                wanted.matches(tree, parent) && self.matches_left_of(tree, parent, idx - 1)
            }),
            Combinator::Descendant => {
                let mut cursor = tree.parent_element(node);
                while let Some(ancestor) = cursor {
                    if wanted.matches(tree, ancestor) && self.matches_left_of(tree, ancestor, idx - 1) {
                        return true;
                    }
                    cursor = tree.parent_element(ancestor);
                }
                false
            }
        }
    }
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }

    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some(element) = tree.get(node).and_then(|n| n.as_element()) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if element.tag_name != *tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| element.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|attr| match (element.get_attr(&attr.name), &attr.value) {
            (Some(_), None) => true,
            (Some(actual), Some(expected)) => actual == expected,
            (None, _) => false,
        })
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(ch) => SelectorError::UnexpectedChar { ch, pos: self.pos },
            None => SelectorError::UnexpectedEnd,
        }
    }

    /// Skip whitespace, reporting whether any was consumed
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn expect(&mut self, ch: char) -> Result<(), SelectorError> {
        if self.peek() == Some(ch) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn parse_list(&mut self) -> Result<Vec<ComplexSelector>, SelectorError> {
        self.skip_ws();
        if self.peek().is_none() {
            return Err(SelectorError::Empty);
        }

        let mut list = Vec::new();
        loop {
            self.skip_ws();
            list.push(self.parse_complex()?);
            self.skip_ws();
            match self.peek() {
                None => break,
                Some(',') => self.pos += 1,
                Some(_) => return Err(self.unexpected()),
            }
        }
        Ok(list)
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    Combinator::Child
                }
                Some(_) if had_ws => Combinator::Descendant,
                Some(_) => return Err(self.unexpected()),
            };
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }
        Ok(ComplexSelector { compounds, combinators })
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let mut universal = false;

        if self.peek() == Some('*') {
            self.pos += 1;
            universal = true;
        } else if self.peek().is_some_and(is_ident_char) {
            compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.parse_ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.parse_ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.parse_attr()?);
                }
                _ => break,
            }
        }

        if compound.is_empty() && !universal {
            return Err(self.unexpected());
        }
        Ok(compound)
    }

    fn parse_attr(&mut self) -> Result<AttrSelector, SelectorError> {
        self.skip_ws();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_ws();
        let value = if self.peek() == Some('=') {
            self.pos += 1;
            self.skip_ws();
            let value = match self.peek() {
                Some(quote @ ('"' | '\'')) => self.parse_quoted(quote)?,
                _ => self.parse_ident()?,
            };
            self.skip_ws();
            Some(value)
        } else {
            None
        };
        self.expect(']')?;
        Ok(AttrSelector { name, value })
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String, SelectorError> {
        self.pos += 1;
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch == quote {
                let value = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                return Ok(value);
            }
            self.pos += 1;
        }
        Err(SelectorError::UnexpectedEnd)
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.unexpected());
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let list = tree.create_element("ul");
        tree.set_attribute(list, "id", "menu").unwrap();
        let item = tree.create_element("li");
        tree.set_attribute(item, "class", "item active").unwrap();
        tree.set_attribute(item, "data-role", "tab").unwrap();
        let link = tree.create_element("a");
        tree.append_child(tree.root(), list).unwrap();
        tree.append_child(list, item).unwrap();
        tree.append_child(item, link).unwrap();
        (tree, list, item, link)
    }

    fn sel(text: &str) -> SelectorList {
        SelectorList::parse(text).unwrap()
    }

    #[test]
    fn test_simple_selectors() {
        let (tree, list, item, link) = sample();
        assert!(sel("ul").matches(&tree, list));
        assert!(sel("UL").matches(&tree, list));
        assert!(sel("#menu").matches(&tree, list));
        assert!(sel(".item").matches(&tree, item));
        assert!(sel("li.item.active").matches(&tree, item));
        assert!(!sel("li.item.missing").matches(&tree, item));
        assert!(sel("*").matches(&tree, link));
        assert!(!sel("*").matches(&tree, NodeId::ROOT));
    }

    #[test]
    fn test_attribute_selectors() {
        let (tree, _, item, _) = sample();
        assert!(sel("[data-role]").matches(&tree, item));
        assert!(sel("[data-role=tab]").matches(&tree, item));
        assert!(sel("li[data-role=\"tab\"]").matches(&tree, item));
        assert!(sel("[ data-role = 'tab' ]").matches(&tree, item));
        assert!(!sel("[data-role=panel]").matches(&tree, item));
    }

    #[test]
    fn test_combinators() {
        let (tree, _, item, link) = sample();
        assert!(sel("#menu a").matches(&tree, link));
        assert!(sel("ul > li > a").matches(&tree, link));
        assert!(sel("ul>li").matches(&tree, item));
        assert!(!sel("ul > a").matches(&tree, link));
        assert!(sel("ol a, .item > a").matches(&tree, link));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(SelectorList::parse(""), Err(SelectorError::Empty));
        assert_eq!(SelectorList::parse("   "), Err(SelectorError::Empty));
        assert!(matches!(
            SelectorList::parse("div,"),
            Err(SelectorError::UnexpectedEnd)
        ));
        assert!(matches!(
            SelectorList::parse(".a!"),
            Err(SelectorError::UnexpectedChar { ch: '!', .. })
        ));
        assert!(SelectorList::parse("[x=\"open").is_err());
        assert!(SelectorList::parse("a >").is_err());
    }

    #[test]
    fn test_display_keeps_source() {
        let list: SelectorList = " .item > a ".parse().unwrap();
        assert_eq!(list.to_string(), " .item > a ");
    }
}

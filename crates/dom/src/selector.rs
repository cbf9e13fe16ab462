use thiserror::Error;
use wireform_primitives::ElementId;

use crate::document::Tree;

/// Selector parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
	#[error("unexpected `{found}` at offset {offset} in `{selector}`")]
	Unexpected { selector: String, found: char, offset: usize },

	#[error("unexpected end of selector `{0}`")]
	UnexpectedEnd(String),

	#[error("unsupported pseudo-class `:{0}`")]
	UnsupportedPseudo(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
	Descendant,
	Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatch {
	name: String,
	value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
	tag: Option<String>,
	id: Option<String>,
	classes: Vec<String>,
	attrs: Vec<AttrMatch>,
	has: Vec<SelectorList>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Part {
	/// Relation to the part before this one; ignored for the first part.
	combinator: Combinator,
	compound: Compound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex(Vec<Part>);

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(Vec<Complex>);

impl SelectorList {
	pub fn parse(input: &str) -> Result<Self, SelectorError> {
		let mut parser = Parser {
			source: input,
			chars: input.chars().collect(),
			pos: 0,
		};
		parser.list(false)
	}

	pub(crate) fn matches(&self, tree: &Tree, element: ElementId) -> bool {
		self.0.iter().any(|complex| matches_parts(&complex.0, tree, element))
	}
}

fn matches_parts(parts: &[Part], tree: &Tree, element: ElementId) -> bool {
	let Some((last, rest)) = parts.split_last() else {
		return false;
	};
	if !last.compound.matches(tree, element) {
		return false;
	}
	if rest.is_empty() {
		return true;
	}
	match last.combinator {
		Combinator::Child => tree.parent(element).is_some_and(|parent| matches_parts(rest, tree, parent)),
		Combinator::Descendant => {
			let mut cursor = tree.parent(element);
			while let Some(ancestor) = cursor {
				if matches_parts(rest, tree, ancestor) {
					return true;
				}
				cursor = tree.parent(ancestor);
			}
			false
		}
	}
}

impl Compound {
	fn matches(&self, tree: &Tree, element: ElementId) -> bool {
		let Some(node) = tree.node(element) else {
			return false;
		};
		if self.tag.as_ref().is_some_and(|tag| *tag != node.tag) {
			return false;
		}
		if self.id.as_ref().is_some_and(|id| node.attr("id") != Some(id.as_str())) {
			return false;
		}
		if !self.classes.iter().all(|class| node.has_class(class)) {
			return false;
		}
		let attrs_match = self.attrs.iter().all(|attr| match (&attr.value, node.attr(&attr.name)) {
			(_, None) => false,
			(None, Some(_)) => true,
			(Some(expected), Some(actual)) => expected == actual,
		});
		if !attrs_match {
			return false;
		}
		self.has.iter().all(|list| tree.descendants(element).into_iter().any(|d| list.matches(tree, d)))
	}
}

fn is_ident_char(ch: char) -> bool {
	ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

fn starts_compound(ch: char) -> bool {
	is_ident_char(ch) || matches!(ch, '*' | '#' | '.' | '[' | ':')
}

struct Parser<'a> {
	source: &'a str,
	chars: Vec<char>,
	pos: usize,
}

impl Parser<'_> {
	fn peek(&self) -> Option<char> {
		self.chars.get(self.pos).copied()
	}

	/// Skips whitespace, returning whether any was skipped.
	fn skip_ws(&mut self) -> bool {
		let start = self.pos;
		while self.peek().is_some_and(char::is_whitespace) {
			self.pos += 1;
		}
		self.pos > start
	}

	fn error(&self) -> SelectorError {
		match self.peek() {
			Some(found) => SelectorError::Unexpected {
				selector: self.source.to_string(),
				found,
				offset: self.pos,
			},
			None => SelectorError::UnexpectedEnd(self.source.to_string()),
		}
	}

	fn expect(&mut self, expected: char) -> Result<(), SelectorError> {
		if self.peek() == Some(expected) {
			self.pos += 1;
			Ok(())
		} else {
			Err(self.error())
		}
	}

	fn list(&mut self, nested: bool) -> Result<SelectorList, SelectorError> {
		let mut complexes = Vec::new();
		loop {
			self.skip_ws();
			complexes.push(self.complex()?);
			self.skip_ws();
			match self.peek() {
				Some(',') => {
					self.pos += 1;
				}
				Some(')') if nested => break,
				None if !nested => break,
				_ => return Err(self.error()),
			}
		}
		Ok(SelectorList(complexes))
	}

	fn complex(&mut self) -> Result<Complex, SelectorError> {
		let mut parts = vec![Part {
			combinator: Combinator::Descendant,
			compound: self.compound()?,
		}];
		loop {
			let had_ws = self.skip_ws();
			match self.peek() {
				Some('>') => {
					self.pos += 1;
					self.skip_ws();
					parts.push(Part {
						combinator: Combinator::Child,
						compound: self.compound()?,
					});
				}
				Some(ch) if had_ws && starts_compound(ch) => parts.push(Part {
					combinator: Combinator::Descendant,
					compound: self.compound()?,
				}),
				_ => break,
			}
		}
		Ok(Complex(parts))
	}

	fn compound(&mut self) -> Result<Compound, SelectorError> {
		let mut compound = Compound::default();
		let mut any = false;
		match self.peek() {
			Some('*') => {
				self.pos += 1;
				any = true;
			}
			Some(ch) if is_ident_char(ch) => {
				compound.tag = Some(self.ident()?.to_ascii_lowercase());
				any = true;
			}
			_ => {}
		}
		loop {
			match self.peek() {
				Some('#') => {
					self.pos += 1;
					compound.id = Some(self.ident()?);
				}
				Some('.') => {
					self.pos += 1;
					compound.classes.push(self.ident()?);
				}
				Some('[') => compound.attrs.push(self.attr()?),
				Some(':') => {
					self.pos += 1;
					let name = self.ident()?;
					if name != "has" {
						return Err(SelectorError::UnsupportedPseudo(name));
					}
					self.expect('(')?;
					compound.has.push(self.list(true)?);
					self.expect(')')?;
				}
				_ => break,
			}
			any = true;
		}
		if any { Ok(compound) } else { Err(self.error()) }
	}

	fn ident(&mut self) -> Result<String, SelectorError> {
		let start = self.pos;
		while self.peek().is_some_and(is_ident_char) {
			self.pos += 1;
		}
		if self.pos == start {
			return Err(self.error());
		}
		Ok(self.chars[start..self.pos].iter().collect())
	}

	fn attr(&mut self) -> Result<AttrMatch, SelectorError> {
		self.expect('[')?;
		self.skip_ws();
		let name = self.ident()?;
		self.skip_ws();
		let value = if self.peek() == Some('=') {
			self.pos += 1;
			self.skip_ws();
			Some(match self.peek() {
				Some(quote @ ('"' | '\'')) => {
					self.pos += 1;
					let start = self.pos;
					while self.peek().is_some_and(|ch| ch != quote) {
						self.pos += 1;
					}
					let value: String = self.chars[start..self.pos].iter().collect();
					self.expect(quote)?;
					value
				}
				_ => self.ident()?,
			})
		} else {
			None
		};
		self.skip_ws();
		self.expect(']')?;
		Ok(AttrMatch { name, value })
	}
}

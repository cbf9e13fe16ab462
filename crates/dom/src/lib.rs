//! In-memory document model.
//!
//! [`Document`] is a small element tree (tags, attributes, attached data) with
//! a selector subset and the declarative attribute conventions of the
//! revalidation layer. It implements [`wireform_primitives::FormHost`], so a
//! scheduler can run headless against it, and it is the fixture the
//! scheduler's own tests are written against.
//!
//! Supported selectors: type (`input`), universal (`*`), `#id`, `.class`,
//! `[attr]`, `[attr=value]`, `:has(<list>)`, descendant and child (`>`)
//! combinators, and comma-separated lists.

mod attrs;
mod document;
mod error;
mod host;
mod selector;

pub use document::Document;
pub use error::{DomError, Result};
pub use selector::{SelectorError, SelectorList};

//! Element metadata for the tagwise linter.
//!
//! Every element name maps to a [`MetaElement`] descriptor: which content
//! categories it belongs to, whether it is void or foreign, what it may
//! contain and which attribute values it accepts. Descriptors are loaded from
//! JSON through a [`MetaTableBuilder`], resolved once by
//! [`MetaTableBuilder::init`] and then shared read-only as a [`MetaTable`].
//!
//! # Scope
//!
//! - Schema validation of element metadata
//! - `inherit` between entries and the `*` wildcard default
//! - Content categories as literals or [`PropertyExpression`]s
//! - Permitted-content entries ([`PermittedEntry`])
//! - A bundled `html5` table

pub mod category;
pub mod element;
pub mod error;
pub mod expression;
pub mod permitted;
pub mod table;

pub use category::Category;
pub use element::{AttributeRule, Deprecation, MetaData, MetaElement, Transparent};
pub use error::MetaError;
pub use expression::{ExpressionTarget, MatchOperator, PropertyExpression, PropertyValue, RawProperty};
pub use permitted::{PermittedEntry, Qualifier};
pub use table::{MetaTable, MetaTableBuilder};

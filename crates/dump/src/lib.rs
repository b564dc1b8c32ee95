//! # Docmeta Dump Parser
//!
//! Converts the repository server's line-oriented object/type dump text into
//! ordered, categorized [`docmeta_model::AttributeRecord`] lists.
//!
//! The format is loosely specified: each attribute line looks like
//! `name[idx] [TYPE]: value` with both bracket groups optional and `=`
//! accepted in place of `:`. Decoration lines, separators (`---`) and
//! anything that does not match are tolerated and skipped. Repeated
//! occurrences of `name[0]`, `name[1]`, ... merge into a single repeating
//! record preserving input order.
//!
//! Type-definition dumps additionally carry a `start_pos` marker: the ordinal
//! position (counted over non-reserved-prefix attributes) at which the flat
//! attribute list transitions from inherited standard attributes to the
//! type's own custom fields. Object-instance dumps never run that positional
//! pass; the two categorization policies are observably different in the
//! source system and are kept separate here.

mod line;
mod parser;

pub use line::{match_attribute_line, AttributeLine, BracketToken};
pub use parser::{parse_dump, DumpContext, DumpKind, ParsedDump};

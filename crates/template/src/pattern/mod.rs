//! The path-pattern language and its compiler.
//!
//! A template is split three ways, from loosest to tightest binding:
//!
//! | Separator | Splits into               | Example                               |
//! |-----------|---------------------------|---------------------------------------|
//! | ` \| `    | whole-path alternatives   | `%village/%city \| %country/%county`  |
//! | `/`       | path components           | `%country/%city`                      |
//! | `\|`      | fallback candidates       | `%city\|%county\|"Somewhere"`         |
//!
//! A candidate is a sequence of atoms: strftime directives (`%Y`), metadata
//! fields (`%city`, `%camera_make`, `%title`) and literal text. Literal text is
//! anything else, including `-`, and the contents of quotes in either the
//! `%"text"` or the bare `"text"` form. Quoted text is opaque: separators inside
//! quotes are not interpreted.
//!
//! Named sub-templates from the same configuration section are substituted
//! (one pass, no recursion) before compiling, either as `${name}` or `%name`.

mod atom;
mod compile;
mod expand;

pub use self::atom::{Atom, Field};
use crate::error::Result;
use std::collections::BTreeMap;
use std::str::FromStr;

/// A compiled template.
///
/// Holds no metadata-dependent state, so one compiled pattern can be shared
/// (see [`PatternCache`](crate::PatternCache)) and resolved against any number
/// of [`Metadata`](crate::Metadata) records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    pub(crate) alternatives: Vec<Alternative>,
}

/// One complete path, tried as a unit against the alternatives that follow it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Alternative {
    pub(crate) components: Vec<Component>,
}

/// A single path component with its fallback candidates in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Component {
    pub(crate) candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Candidate {
    pub(crate) atoms: Vec<Atom>,
}

impl Pattern {
    /// Expands `templates` into `template` and compiles the result.
    ///
    /// # Errors
    /// Returns [`ErrorKind::UnbalancedQuote`](crate::error::ErrorKind::UnbalancedQuote)
    /// when a quoted literal is never closed. Unknown directives and unknown
    /// field names are accepted.
    pub fn compile(template: &str, templates: &BTreeMap<String, String>) -> Result<Self> {
        compile::compile(&expand(template, templates))
    }

    /// Returns `true` when every alternative is a single path component.
    pub fn is_single_component(&self) -> bool {
        self.alternatives.iter().all(|alternative| alternative.components.len() <= 1)
    }

    /// Iterates over every atom, in template order.
    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.alternatives
            .iter()
            .flat_map(|a| &a.components)
            .flat_map(|c| &c.candidates)
            .flat_map(|c| &c.atoms)
    }
}
impl FromStr for Pattern {
    type Err = crate::error::Error;

    /// Compiles a template that declares no sub-templates.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        compile::compile(s)
    }
}

/// Sub-template substitution, exposed so that the cache can key on the text
/// that is actually compiled.
pub(crate) fn expand(template: &str, templates: &BTreeMap<String, String>) -> String {
    expand::expand(template, templates)
}

/// Compiles text that has already been through [`expand`].
pub(crate) fn compile_expanded(expanded: &str) -> Result<Pattern> {
    compile::compile(expanded)
}

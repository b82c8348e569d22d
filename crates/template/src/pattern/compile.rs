use super::atom::{Atom, Field, directive_len, field_name};
use super::{Alternative, Candidate, Component, Pattern};
use crate::error::{ErrorKind, Result};
use chrono::format::{Item, StrftimeItems};
use std::mem::take;

enum Token {
    Atom(Atom),
    /// `/`: next path component.
    Slash,
    /// `|`: next fallback candidate within the component.
    Bar,
    /// ` | `: next whole-path alternative.
    Alternative,
}

/// Compiles an already-expanded template into a [`Pattern`].
pub(super) fn compile(template: &str) -> Result<Pattern> {
    Ok(assemble(lex(template)?))
}

fn lex(template: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut i = 0;
    while let Some(found) = template[i..].find(['"', '%', '/', '|']) {
        let at = i + found;
        literal.push_str(&template[i..at]);
        i = match template.as_bytes()[at] {
            b'/' => {
                flush(&mut literal, &mut tokens);
                tokens.push(Token::Slash);
                at + 1
            },
            b'|' => {
                flush(&mut literal, &mut tokens);
                let spaced = template[..at].ends_with(char::is_whitespace)
                    && template[at + 1..].starts_with(char::is_whitespace);
                tokens.push(if spaced { Token::Alternative } else { Token::Bar });
                at + 1
            },
            b'"' => quoted(template, at, &mut literal)?,
            // '%'
            _ => {
                let rest = &template[at + 1..];
                if rest.starts_with('"') {
                    quoted(template, at + 1, &mut literal)?
                } else if let Some(name) = field_name(rest) {
                    flush(&mut literal, &mut tokens);
                    tokens.push(Token::Atom(Atom::Field(Field::from_name(name))));
                    at + 1 + name.len()
                } else {
                    let end = at + 1 + directive_len(rest);
                    let directive = &template[at..end];
                    if is_valid_directive(directive) {
                        flush(&mut literal, &mut tokens);
                        tokens.push(Token::Atom(Atom::Time(directive.to_string())));
                    } else {
                        tracing::debug!(directive, "Unrecognized time directive; keeping it as literal text");
                        literal.push_str(directive);
                    }
                    end
                }
            },
        };
    }
    literal.push_str(&template[i..]);
    flush(&mut literal, &mut tokens);
    Ok(tokens)
}

/// Appends the contents of the quoted literal opening at `open` to `literal`,
/// returning the byte index just past the closing quote.
fn quoted(template: &str, open: usize, literal: &mut String) -> Result<usize> {
    let Some(len) = template[open + 1..].find('"') else {
        exn::bail!(ErrorKind::UnbalancedQuote(open));
    };
    literal.push_str(&template[open + 1..open + 1 + len]);
    Ok(open + len + 2)
}

fn flush(literal: &mut String, tokens: &mut Vec<Token>) {
    if !literal.is_empty() {
        tokens.push(Token::Atom(Atom::Literal(take(literal))));
    }
}

fn is_valid_directive(directive: &str) -> bool {
    directive.len() > 1 && !StrftimeItems::new(directive).any(|item| matches!(item, Item::Error))
}

fn assemble(tokens: Vec<Token>) -> Pattern {
    let mut alternatives = Vec::new();
    let mut components = Vec::new();
    let mut candidates = Vec::new();
    let mut atoms = Vec::new();
    for token in tokens {
        match token {
            Token::Atom(atom) => atoms.push(atom),
            Token::Bar => candidates.push(Candidate { atoms: take(&mut atoms) }),
            Token::Slash => {
                candidates.push(Candidate { atoms: take(&mut atoms) });
                components.push(Component { candidates: take(&mut candidates) });
            },
            Token::Alternative => {
                candidates.push(Candidate { atoms: take(&mut atoms) });
                components.push(Component { candidates: take(&mut candidates) });
                alternatives.push(Alternative { components: take(&mut components) });
            },
        }
    }
    candidates.push(Candidate { atoms });
    components.push(Component { candidates });
    alternatives.push(Alternative { components });
    Pattern { alternatives }
}

//! XSD regular-expression -> Rust `regex` translator.
//!
//! XSD regexes share most of their syntax with PCRE-style engines (grouping,
//! alternation, quantifiers, character classes, ranges) but differ in a few
//! places this module bridges:
//!
//! - XSD multi-char escapes (`\s \S \d \D \w \W \i \I \c \C`) have no direct
//!   equivalent in `regex`'s Unicode mode and must be expanded.
//! - XSD supports character-class *subtraction* (`[A-[B]]`), which `regex`
//!   does not support natively.
//! - Whole patterns are implicitly anchored (XSD `pattern` facets match the
//!   entire value, not a substring).
//!
//! Translation always works on `char`-indexed slices (not byte offsets) so
//! multi-byte XSD input (rare, but legal in `\p{...}` property names) is
//! handled correctly.

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegexpTranslateError {
    #[error("unterminated character class starting at position {0}")]
    UnterminatedClass(usize),
    #[error("unterminated group starting at position {0}")]
    UnterminatedGroup(usize),
    #[error("unterminated Unicode property escape at position {0}")]
    UnterminatedProperty(usize),
    #[error("dangling escape at end of pattern")]
    DanglingEscape,
    #[error("translated pattern failed to compile: {0}")]
    CompileFailed(#[from] regex::Error),
}

/// The result of translating one XSD regular expression.
#[derive(Debug, Clone)]
pub struct TranslatedRegex {
    /// The translated, anchored Rust-regex source (useful for debugging and
    /// for the literal-seed tests in the design document).
    pub source: String,
    /// Set whenever the translation required a Unicode category escape
    /// (`\p{...}`) or an XML name-class escape (`\w \W \i \I \c \C`), all of
    /// which require a Unicode-aware matcher.
    pub needs_unicode: bool,
    pub compiled: Regex,
}

pub fn translate(pattern: &str) -> Result<TranslatedRegex, RegexpTranslateError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut needs_unicode = false;
    let (body, end) = translate_sequence(&chars, 0, &mut needs_unicode)?;
    if end != chars.len() {
        return Err(RegexpTranslateError::UnterminatedGroup(end));
    }
    let source = format!("^{}$", body);
    let compiled = Regex::new(&source)?;
    Ok(TranslatedRegex {
        source,
        needs_unicode,
        compiled,
    })
}

/// Translate a run of the pattern up to (but not including) an unmatched
/// `)`, or to the end of input. Returns the translated text and the index
/// just past what was consumed.
fn translate_sequence(
    chars: &[char],
    mut i: usize,
    needs_unicode: &mut bool,
) -> Result<(String, usize), RegexpTranslateError> {
    let mut out = String::new();
    while i < chars.len() {
        match chars[i] {
            ')' => break,
            '(' => {
                let start = i;
                i += 1;
                let prefix = if i < chars.len() && chars[i] == '?' {
                    // Copy a recognized (?:, (?=, (?!, (?<=, (?<! prefix verbatim.
                    let rest: String = chars[i..].iter().collect();
                    let known = ["?:", "?=", "?!", "?<=", "?<!"];
                    match known.iter().find(|p| rest.starts_with(**p)) {
                        Some(p) => {
                            i += p.chars().count();
                            p.to_string()
                        }
                        None => {
                            // Unrecognized (?...) construct: pass '?' through and
                            // let the inner group be treated as non-capturing.
                            "?:".to_string()
                        }
                    }
                } else {
                    "?:".to_string()
                };
                let (inner, next) = translate_sequence(chars, i, needs_unicode)?;
                if next >= chars.len() || chars[next] != ')' {
                    return Err(RegexpTranslateError::UnterminatedGroup(start));
                }
                out.push('(');
                out.push_str(&prefix);
                out.push_str(&inner);
                out.push(')');
                i = next + 1;
            }
            '[' => {
                let (rendered, next, class_needs_unicode) = parse_class(chars, i)?;
                *needs_unicode |= class_needs_unicode;
                out.push_str(&rendered);
                i = next;
            }
            '\\' => {
                i += 1;
                if i >= chars.len() {
                    return Err(RegexpTranslateError::DanglingEscape);
                }
                match multi_char_escape(chars, i)? {
                    Some((atom, next, unicode)) => {
                        *needs_unicode |= unicode;
                        out.push_str(&atom);
                        i = next;
                    }
                    None => {
                        out.push('\\');
                        out.push(chars[i]);
                        i += 1;
                    }
                }
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    Ok((out, i))
}

/// A single XSD multi-char escape, classified by whether it denotes a
/// *positive* character set (can be spliced as-is into a surrounding class)
/// or a *negative* one (can only appear as a standalone negated atom, never
/// embedded in another class, since bracket expressions cannot nest
/// negation).
enum Escape {
    Positive {
        /// Content usable inside `[...]` (no outer brackets).
        splice: String,
        /// Full standalone atom, used outside any class.
        atom: String,
        unicode: bool,
    },
    Negative {
        /// The positive counterpart's splice content, used to build the
        /// union-of-bases lookahead when this escape appears nested inside
        /// another negated class.
        positive_splice: String,
        /// Full standalone atom (a negated bracket), used outside any class
        /// or as the sole member of a positive class's alternation rewrite.
        atom: String,
        unicode: bool,
    },
}

const WHITESPACE: &str = " \\t\\n\\r";
// Simplified XML NameStartChar / NameChar ranges (XML 1.0 5th ed, Unicode
// BMP portion only). `:` is included in NameStartChar per the XML grammar.
const NAME_START: &str = "A-Za-z_:\\u{C0}-\\u{D6}\\u{D8}-\\u{F6}\\u{F8}-\\u{2FF}\\u{370}-\\u{37D}\\u{37F}-\\u{1FFF}\\u{200C}-\\u{200D}\\u{2070}-\\u{218F}\\u{2C00}-\\u{2FEF}\\u{3001}-\\u{D7FF}\\u{F900}-\\u{FDCF}\\u{FDF0}-\\u{FFFD}";
const NAME_CHAR_EXTRA: &str = "\\-.0-9\\u{B7}\\u{0300}-\\u{036F}\\u{203F}-\\u{2040}";

fn escape_for(code: char) -> Option<Escape> {
    match code {
        's' => Some(Escape::Positive {
            splice: WHITESPACE.to_string(),
            atom: format!("[{}]", WHITESPACE),
            unicode: false,
        }),
        'S' => Some(Escape::Negative {
            positive_splice: WHITESPACE.to_string(),
            atom: format!("[^{}]", WHITESPACE),
            unicode: false,
        }),
        'd' => Some(Escape::Positive {
            splice: "\\p{Nd}".to_string(),
            atom: "\\p{Nd}".to_string(),
            unicode: true,
        }),
        'D' => Some(Escape::Negative {
            positive_splice: "\\p{Nd}".to_string(),
            atom: "\\P{Nd}".to_string(),
            unicode: true,
        }),
        'w' => {
            let splice = format!("{}{}", NAME_START, NAME_CHAR_EXTRA);
            Some(Escape::Positive {
                atom: format!("[{}]", splice),
                splice,
                unicode: true,
            })
        }
        'W' => {
            let positive_splice = format!("{}{}", NAME_START, NAME_CHAR_EXTRA);
            Some(Escape::Negative {
                atom: format!("[^{}]", positive_splice),
                positive_splice,
                unicode: true,
            })
        }
        'i' => Some(Escape::Positive {
            atom: format!("[{}]", NAME_START),
            splice: NAME_START.to_string(),
            unicode: true,
        }),
        'I' => Some(Escape::Negative {
            atom: format!("[^{}]", NAME_START),
            positive_splice: NAME_START.to_string(),
            unicode: true,
        }),
        'c' => {
            let splice = format!("{}{}", NAME_START, NAME_CHAR_EXTRA);
            Some(Escape::Positive {
                atom: format!("[{}]", splice),
                splice,
                unicode: true,
            })
        }
        'C' => {
            let positive_splice = format!("{}{}", NAME_START, NAME_CHAR_EXTRA);
            Some(Escape::Negative {
                atom: format!("[^{}]", positive_splice),
                positive_splice,
                unicode: true,
            })
        }
        _ => None,
    }
}

/// Parses `\p{...}` / `\P{...}` / one of the letter-coded multi-char
/// escapes, starting at `chars[i]` (the character right after the
/// backslash). Returns `None` if `chars[i]` is not a recognized multi-char
/// escape letter at all (the caller then treats it as an ordinary escape).
fn multi_char_escape(
    chars: &[char],
    i: usize,
) -> Result<Option<(String, usize, bool)>, RegexpTranslateError> {
    match chars[i] {
        'p' | 'P' => {
            let negated = chars[i] == 'P';
            let start = i;
            if i + 1 >= chars.len() || chars[i + 1] != '{' {
                return Err(RegexpTranslateError::UnterminatedProperty(start));
            }
            let mut j = i + 2;
            while j < chars.len() && chars[j] != '}' {
                j += 1;
            }
            if j >= chars.len() {
                return Err(RegexpTranslateError::UnterminatedProperty(start));
            }
            let name: String = chars[i + 2..j].iter().collect();
            let atom = format!("\\{}{{{}}}", if negated { 'P' } else { 'p' }, name);
            Ok(Some((atom, j + 1, true)))
        }
        c @ ('s' | 'S' | 'd' | 'D' | 'w' | 'W' | 'i' | 'I' | 'c' | 'C') => {
            match escape_for(c).expect("letter classified above") {
                Escape::Positive { atom, unicode, .. } => Ok(Some((atom, i + 1, unicode))),
                Escape::Negative { atom, unicode, .. } => Ok(Some((atom, i + 1, unicode))),
            }
        }
        _ => Ok(None),
    }
}

/// An item inside a user-written `[...]` class.
enum ClassItem {
    Char(char),
    Range(char, char),
    Pos(Escape),
    Neg(Escape),
}

fn render_char_for_class(c: char) -> String {
    match c {
        '\\' | ']' | '^' | '-' => format!("\\{}", c),
        other => other.to_string(),
    }
}

fn parse_class(
    chars: &[char],
    start: usize,
) -> Result<(String, usize, bool), RegexpTranslateError> {
    debug_assert_eq!(chars[start], '[');
    let mut i = start + 1;
    let mut negated = false;
    if i < chars.len() && chars[i] == '^' {
        negated = true;
        i += 1;
    }

    let mut items = Vec::new();
    let mut subtraction: Option<(String, bool)> = None;
    let mut needs_unicode = false;

    loop {
        if i >= chars.len() {
            return Err(RegexpTranslateError::UnterminatedClass(start));
        }
        if chars[i] == ']' {
            i += 1;
            break;
        }
        // Subtraction: "-[" not at the very first position (an initial '-'
        // is a literal hyphen per XSD/regex convention).
        if chars[i] == '-' && i + 1 < chars.len() && chars[i + 1] == '[' && !items.is_empty() {
            let (sub_rendered, next, sub_unicode) = parse_class(chars, i + 1)?;
            needs_unicode |= sub_unicode;
            subtraction = Some((sub_rendered, sub_unicode));
            i = next;
            if i >= chars.len() || chars[i] != ']' {
                return Err(RegexpTranslateError::UnterminatedClass(start));
            }
            i += 1;
            break;
        }
        if chars[i] == '\\' {
            i += 1;
            if i >= chars.len() {
                return Err(RegexpTranslateError::DanglingEscape);
            }
            if let Some(esc) = escape_for(chars[i]) {
                let unicode = matches!(&esc, Escape::Positive { unicode, .. } | Escape::Negative { unicode, .. } if *unicode);
                needs_unicode |= unicode;
                let is_negative = matches!(esc, Escape::Negative { .. });
                i += 1;
                if is_negative {
                    items.push(ClassItem::Neg(esc));
                } else {
                    items.push(ClassItem::Pos(esc));
                }
                continue;
            }
            if chars[i] == 'p' || chars[i] == 'P' {
                let (atom, next, _) = multi_char_escape(chars, i)?
                    .expect("p/P always recognized by multi_char_escape");
                i = next;
                let negated_prop = atom.starts_with("\\P");
                needs_unicode = true;
                if negated_prop {
                    items.push(ClassItem::Neg(Escape::Negative {
                        positive_splice: format!("\\p{}", &atom[2..]),
                        atom,
                        unicode: true,
                    }));
                } else {
                    items.push(ClassItem::Pos(Escape::Positive {
                        splice: atom.clone(),
                        atom,
                        unicode: true,
                    }));
                }
                continue;
            }
            // Ordinary escaped literal, e.g. \] \\ \-
            let literal = chars[i];
            i += 1;
            maybe_push_range(chars, &mut i, &mut items, literal)?;
            continue;
        }
        let literal = chars[i];
        i += 1;
        maybe_push_range(chars, &mut i, &mut items, literal)?;
    }

    let rendered = render_class(negated, items, subtraction, start)?;
    Ok((rendered, i, needs_unicode))
}

/// After consuming a literal character, check whether it starts a `X-Y`
/// range (and is not immediately followed by `-[`, which is subtraction).
fn maybe_push_range(
    chars: &[char],
    i: &mut usize,
    items: &mut Vec<ClassItem>,
    first: char,
) -> Result<(), RegexpTranslateError> {
    if *i < chars.len()
        && chars[*i] == '-'
        && *i + 1 < chars.len()
        && chars[*i + 1] != '['
        && chars[*i + 1] != ']'
    {
        let to = chars[*i + 1];
        *i += 2;
        items.push(ClassItem::Range(first, to));
    } else {
        items.push(ClassItem::Char(first));
    }
    Ok(())
}

fn render_class(
    negated: bool,
    items: Vec<ClassItem>,
    subtraction: Option<(String, bool)>,
    start: usize,
) -> Result<String, RegexpTranslateError> {
    let mut splice = String::new();
    let mut negatives: Vec<String> = Vec::new();
    let mut negative_bases: Vec<String> = Vec::new();
    for item in &items {
        match item {
            ClassItem::Char(c) => splice.push_str(&render_char_for_class(*c)),
            ClassItem::Range(a, b) => {
                splice.push_str(&render_char_for_class(*a));
                splice.push('-');
                splice.push_str(&render_char_for_class(*b));
            }
            ClassItem::Pos(Escape::Positive { splice: s, .. }) => splice.push_str(s),
            ClassItem::Neg(Escape::Negative {
                atom,
                positive_splice,
                ..
            }) => {
                negatives.push(atom.clone());
                negative_bases.push(positive_splice.clone());
            }
            _ => unreachable!("ClassItem::Pos always wraps Escape::Positive and vice versa"),
        }
    }

    if let Some((sub_rendered, _)) = subtraction {
        if negated || !negatives.is_empty() {
            return Err(RegexpTranslateError::UnterminatedClass(start));
        }
        return Ok(format!("(?:(?!{})[{}])", sub_rendered, splice));
    }

    if negated {
        if negatives.is_empty() {
            return Ok(format!("[^{}]", splice));
        }
        let union = negative_bases.join("|");
        if splice.is_empty() {
            return Ok(format!("(?:(?={}).)", union));
        }
        return Ok(format!("(?:(?={})[^{}])", union, splice));
    }

    if negatives.is_empty() {
        return Ok(format!("[{}]", splice));
    }
    if splice.is_empty() {
        return Ok(format!("(?:{})", negatives.join("|")));
    }
    Ok(format!("(?:{}|[{}])", negatives.join("|"), splice))
}

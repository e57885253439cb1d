//! LIKE pattern prefix extraction.
//!
//! `_` and `%` are wildcards; a backslash makes the following character
//! literal. Only the literal run before the first wildcard is usable.

const WILDCARD_ONE: char = '_';
const WILDCARD_ANY: char = '%';
const ESCAPE: char = '\\';

///
/// LikeShape
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum LikeShape {
    /// No wildcard at all; the pattern is an equality.
    Exact,
    /// The only wildcard is a single trailing `%`.
    PrefixOnly,
    /// Anything after the prefix still has to be evaluated.
    NeedsResidual,
}

///
/// LikePrefix
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct LikePrefix {
    pub(crate) prefix: String,
    pub(crate) shape: LikeShape,
}

pub(crate) fn parse_like(pattern: &str) -> LikePrefix {
    let mut prefix = String::new();
    let mut chars = pattern.chars();

    while let Some(ch) = chars.next() {
        match ch {
            ESCAPE => match chars.next() {
                Some(escaped) => prefix.push(escaped),
                None => prefix.push(ESCAPE),
            },
            WILDCARD_ANY if chars.as_str().is_empty() => {
                return LikePrefix {
                    prefix,
                    shape: LikeShape::PrefixOnly,
                };
            }
            WILDCARD_ONE | WILDCARD_ANY => {
                return LikePrefix {
                    prefix,
                    shape: LikeShape::NeedsResidual,
                };
            }
            other => prefix.push(other),
        }
    }

    LikePrefix {
        prefix,
        shape: LikeShape::Exact,
    }
}

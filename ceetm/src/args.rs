//! Keyword/value collection shared by the qdisc and class parsers.
//!
//! Parsing is done in two passes. [`Arguments::collect`] walks the command line once and only
//! checks its shape (known keywords, one value each, no repeats). The typed parsers then
//! validate the collected pairs as a whole, so the order keywords appear in never matters.

use ceetm_wire::CeetmType;

use crate::error::{Keyword, ParseError};

/// The keyword/value pairs of one option list, in command-line order.
#[derive(Debug, Clone)]
pub(crate) struct Arguments<'a> {
    pairs: Vec<(Keyword, &'a str)>,
}

impl<'a> Arguments<'a> {
    /// Collect `keyword value` pairs out of `args`, accepting only `accepted` keywords.
    pub(crate) fn collect<S: AsRef<str>>(
        args: &'a [S],
        accepted: &[Keyword],
    ) -> Result<Self, ParseError> {
        let mut pairs: Vec<(Keyword, &'a str)> = Vec::with_capacity(args.len() / 2);
        let mut iter = args.iter().map(|arg| -> &'a str { arg.as_ref() });

        while let Some(arg) = iter.next() {
            if arg == "help" {
                return Err(ParseError::Help);
            }

            let keyword = accepted
                .iter()
                .copied()
                .find(|keyword| keyword.as_str() == arg)
                .ok_or_else(|| ParseError::UnknownOption(arg.to_string()))?;

            if pairs.iter().any(|(seen, _)| *seen == keyword) {
                return Err(ParseError::Duplicate(keyword));
            }

            let value = iter.next().ok_or(ParseError::Incomplete(keyword))?;
            pairs.push((keyword, value));
        }

        Ok(Self { pairs })
    }

    /// The value given for `keyword`, if any.
    pub(crate) fn get(&self, keyword: Keyword) -> Option<&'a str> {
        self.pairs.iter().find(|(k, _)| *k == keyword).map(|(_, value)| *value)
    }

    pub(crate) fn contains(&self, keyword: Keyword) -> bool {
        self.get(keyword).is_some()
    }

    /// Fails on the first keyword (in command-line order) that `allowed` doesn't cover.
    ///
    /// `owner` names the objects the offending keyword does belong to, for the error message.
    pub(crate) fn reject_foreign(
        &self,
        allowed: &[Keyword],
        owner: impl Fn(Keyword) -> &'static str,
    ) -> Result<(), ParseError> {
        match self.pairs.iter().find(|(keyword, _)| !allowed.contains(keyword)) {
            Some((option, _)) => {
                Err(ParseError::Mismatch { option: *option, owner: owner(*option) })
            }
            None => Ok(()),
        }
    }
}

/// Match a type argument against `accepted`, allowing unambiguous prefixes like tc's
/// `matches()` (e.g. `r` for `root`).
pub(crate) fn parse_type(value: &str, accepted: &[CeetmType]) -> Result<CeetmType, ParseError> {
    if value.is_empty() {
        return Err(ParseError::IllegalType(value.to_string()));
    }

    accepted
        .iter()
        .copied()
        .find(|kind| kind.as_str().starts_with(value))
        .ok_or_else(|| ParseError::IllegalType(value.to_string()))
}

/// Parse a base-10 u16 option value.
pub(crate) fn parse_u16(option: Keyword, value: &str) -> Result<u16, ParseError> {
    value.parse().map_err(|_| illegal(option, value))
}

/// Parse a `0`/`1` flag.
pub(crate) fn parse_flag(option: Keyword, value: &str) -> Result<bool, ParseError> {
    match parse_u16(option, value)? {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(illegal(option, value)),
    }
}

/// Parse a rate with tc's unit grammar, see [`crate::rate::parse_rate`].
pub(crate) fn parse_rate(option: Keyword, value: &str) -> Result<u32, ParseError> {
    crate::rate::parse_rate(value).map_err(|err| {
        tracing::debug!(%err, %option, "rejecting rate");
        illegal(option, value)
    })
}

fn illegal(option: Keyword, value: &str) -> ParseError {
    ParseError::IllegalValue { option, value: value.to_string() }
}

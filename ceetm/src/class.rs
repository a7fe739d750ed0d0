//! CEETM class options.
//!
//! Classes live under a CEETM qdisc of the matching type. A root class is a channel, either
//! shaped by its own dual-rate shaper or unshaped and scheduled through a weight table. A
//! prio class is a class queue that may contribute to the channel's CR/ER shaping, and a wbfs
//! class is a weighted class queue.

use ceetm_wire::{CeetmType, TcCeetmCopt, CEETM_MAX_WBFS_VALUE};

use crate::args::{parse_flag, parse_rate, parse_type, parse_u16, Arguments};
use crate::error::{Keyword, Object, ParseError};

/// Usage text for class options.
pub const USAGE: &str = "\
Usage: ... class add ... ceetm type root (tbl T | rate R [ceil C])
       ... class add ... ceetm type prio [cr {0|1}] [er {0|1}]
       ... class add ... ceetm type wbfs weight W

Class types:
root - create a channel, shaped (rate) or unshaped (tbl)
prio - configure a class queue of a prio class group
wbfs - configure a class queue of a wbfs class group

Options:
R - the CR of the channel's dual-rate shaper
C - the ER of the channel's dual-rate shaper (defaults to 0)
T - the weight table index of an unshaped channel
cr, er - whether the class queue contributes to CR/ER shaping (default 1 once either is set)
W - the class weight, on a log scale from 1 to 248
";

const KEYWORDS: &[Keyword] = &[
    Keyword::Type,
    Keyword::Rate,
    Keyword::Ceil,
    Keyword::Tbl,
    Keyword::Cr,
    Keyword::Er,
    Keyword::Weight,
];

/// Validated options for a CEETM class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassOptions {
    /// A channel.
    Root(RootClass),
    /// A class queue of a prio group, shaped when `shaping` is set.
    Prio {
        /// CR/ER contribution, `None` for an unshaped class queue.
        shaping: Option<PrioShaping>,
    },
    /// A class queue of a wbfs group.
    Wbfs {
        /// Weight, 1 to 248.
        weight: u16,
    },
}

/// A root class is configured by exactly one of a shaper or a weight table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootClass {
    /// Shaped channel, rates in bytes per second.
    Shaped {
        /// Committed rate.
        rate: u32,
        /// Excess rate.
        ceil: u32,
    },
    /// Unshaped channel scheduled through weight table `tbl`.
    Table {
        /// Weight table index.
        tbl: u16,
    },
}

/// CR/ER contribution of a shaped prio class queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrioShaping {
    /// Contribute to committed rate shaping.
    pub cr: bool,
    /// Contribute to excess rate shaping.
    pub er: bool,
}

impl ClassOptions {
    /// Parse a class option list such as `type root rate 100mbit ceil 200mbit`.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, ParseError> {
        let args = Arguments::collect(args, KEYWORDS)?;

        let kind = args.get(Keyword::Type).ok_or(ParseError::MissingType(Object::Class))?;
        let kind = parse_type(kind, &[CeetmType::Root, CeetmType::Prio, CeetmType::Wbfs])?;

        let options = match kind {
            CeetmType::Root => Self::parse_root(&args)?,
            CeetmType::Prio => Self::parse_prio(&args)?,
            CeetmType::Wbfs => Self::parse_wbfs(&args)?,
        };

        tracing::debug!(?options, "parsed ceetm class options");

        Ok(options)
    }

    fn parse_root(args: &Arguments<'_>) -> Result<Self, ParseError> {
        args.reject_foreign(&[Keyword::Type, Keyword::Rate, Keyword::Ceil, Keyword::Tbl], owner)?;

        match (args.get(Keyword::Rate), args.get(Keyword::Tbl)) {
            (Some(_), Some(_)) => Err(ParseError::TblAndRate),
            (None, None) => Err(ParseError::TblOrRate),
            (None, Some(tbl)) => {
                if args.contains(Keyword::Ceil) {
                    return Err(ParseError::Missing {
                        option: Keyword::Rate,
                        context: "shaped root classes",
                    });
                }

                Ok(Self::Root(RootClass::Table { tbl: parse_u16(Keyword::Tbl, tbl)? }))
            }
            (Some(rate), None) => {
                let rate = parse_rate(Keyword::Rate, rate)?;
                let ceil =
                    args.get(Keyword::Ceil).map(|v| parse_rate(Keyword::Ceil, v)).transpose()?;

                Ok(Self::Root(RootClass::Shaped { rate, ceil: ceil.unwrap_or_default() }))
            }
        }
    }

    fn parse_prio(args: &Arguments<'_>) -> Result<Self, ParseError> {
        args.reject_foreign(&[Keyword::Type, Keyword::Cr, Keyword::Er], owner)?;

        let cr = args.get(Keyword::Cr).map(|v| parse_flag(Keyword::Cr, v)).transpose()?;
        let er = args.get(Keyword::Er).map(|v| parse_flag(Keyword::Er, v)).transpose()?;

        let shaping = match (cr, er) {
            (None, None) => None,
            (cr, er) => Some(PrioShaping { cr: cr.unwrap_or(true), er: er.unwrap_or(true) }),
        };

        Ok(Self::Prio { shaping })
    }

    fn parse_wbfs(args: &Arguments<'_>) -> Result<Self, ParseError> {
        args.reject_foreign(&[Keyword::Type, Keyword::Weight], owner)?;

        let value = args
            .get(Keyword::Weight)
            .ok_or(ParseError::Missing { option: Keyword::Weight, context: "wbfs classes" })?;

        let weight = parse_u16(Keyword::Weight, value)?;
        if !(1..=CEETM_MAX_WBFS_VALUE).contains(&weight) {
            return Err(ParseError::OutOfRange {
                option: Keyword::Weight,
                expected: "between 1 and 248",
                context: "wbfs classes",
            });
        }

        Ok(Self::Wbfs { weight })
    }

    /// The class type.
    pub const fn ceetm_type(&self) -> CeetmType {
        match self {
            Self::Root(_) => CeetmType::Root,
            Self::Prio { .. } => CeetmType::Prio,
            Self::Wbfs { .. } => CeetmType::Wbfs,
        }
    }

    /// Returns `true` for a rated root class or a prio class with CR/ER flags.
    pub const fn is_shaped(&self) -> bool {
        matches!(self, Self::Root(RootClass::Shaped { .. }) | Self::Prio { shaping: Some(_) })
    }

    /// The kernel record for these options.
    pub fn to_copt(&self) -> TcCeetmCopt {
        let mut copt = TcCeetmCopt {
            kind: self.ceetm_type() as u32,
            shaped: self.is_shaped().into(),
            ..Default::default()
        };

        match *self {
            Self::Root(RootClass::Shaped { rate, ceil }) => {
                copt.rate = rate;
                copt.ceil = ceil;
            }
            Self::Root(RootClass::Table { tbl }) => copt.tbl = tbl,
            Self::Prio { shaping: Some(PrioShaping { cr, er }) } => {
                copt.cr = cr.into();
                copt.er = er.into();
            }
            Self::Prio { shaping: None } => {}
            Self::Wbfs { weight } => copt.weight = weight,
        }

        copt
    }
}

/// The class kinds a keyword belongs to.
const fn owner(keyword: Keyword) -> &'static str {
    match keyword {
        Keyword::Cr | Keyword::Er => "prio classes",
        Keyword::Weight => "wbfs classes",
        _ => "root classes",
    }
}

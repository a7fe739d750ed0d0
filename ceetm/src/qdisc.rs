//! CEETM qdisc options.
//!
//! A CEETM qdisc is one of three kinds:
//!
//! - `root`: binds an LNI to a port. Optionally shaped by a dual-rate shaper (`rate` is the
//!   committed rate, `ceil` the excess rate, `overhead` the per-packet framing overhead).
//! - `prio`: a group of up to eight strict-priority class queues.
//! - `wbfs`: a group of four or eight weighted class queues, which may contribute to the
//!   channel's committed (`cr`) and excess (`er`) rate shaping.

use ceetm_wire::{
    CeetmType, TcCeetmQopt, CEETM_MAX_PRIO_QCOUNT, CEETM_MAX_WBFS_QCOUNT, CEETM_MIN_WBFS_QCOUNT,
};

use crate::args::{parse_flag, parse_rate, parse_type, parse_u16, Arguments};
use crate::error::{Keyword, Object, ParseError};

/// Usage text for qdisc options.
pub const USAGE: &str = "\
Usage: ... qdisc add ... ceetm type root [rate R [ceil C] [overhead O]]
       ... qdisc add ... ceetm type prio qcount Q
       ... qdisc add ... ceetm type wbfs qcount {4|8} [cr {0|1}] [er {0|1}]

Qdisc types:
root - link a CEETM LNI to a port
prio - create a priority class group of Q class queues (1 to 8)
wbfs - create a four or eight class Weighted Bandwidth Fair Scheduler

Options:
R - the CR of the LNI's dual-rate shaper (required for shaping scenarios)
C - the ER of the LNI's dual-rate shaper (defaults to 0)
O - per-packet size overhead used in rate computations (defaults to 0, recommended value
    is 24 i.e. 12 bytes IFG + 8 bytes Preamble + 4 bytes FCS)
cr, er - whether the class group contributes to CR/ER shaping (default 0)

mpu is not supported by CEETM and is rejected.
";

const KEYWORDS: &[Keyword] = &[
    Keyword::Type,
    Keyword::Qcount,
    Keyword::Rate,
    Keyword::Ceil,
    Keyword::Overhead,
    Keyword::Cr,
    Keyword::Er,
];

/// Validated options for a CEETM qdisc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QdiscOptions {
    /// An LNI, shaped when `shaping` is set.
    Root {
        /// The LNI shaper, `None` for an unshaped LNI.
        shaping: Option<RootShaping>,
    },
    /// A priority class group.
    Prio {
        /// Number of class queues, 1 to 8.
        qcount: u16,
    },
    /// A weighted class group.
    Wbfs {
        /// Number of class queues.
        qcount: WbfsQueues,
        /// Contribute to committed rate shaping.
        cr: bool,
        /// Contribute to excess rate shaping.
        er: bool,
    },
}

/// Dual-rate shaper configuration of a root qdisc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootShaping {
    /// Committed rate in bytes per second.
    pub rate: u32,
    /// Excess rate in bytes per second.
    pub ceil: u32,
    /// Per-packet overhead in bytes.
    pub overhead: u16,
}

/// The two class queue counts a wbfs group supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WbfsQueues {
    /// Four class queues.
    Four,
    /// Eight class queues.
    Eight,
}

impl WbfsQueues {
    /// Number of class queues.
    pub const fn count(self) -> u16 {
        match self {
            Self::Four => CEETM_MIN_WBFS_QCOUNT,
            Self::Eight => CEETM_MAX_WBFS_QCOUNT,
        }
    }
}

impl QdiscOptions {
    /// Parse a qdisc option list such as `type root rate 1000mbit ceil 1000mbit overhead 24`.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, ParseError> {
        let args = Arguments::collect(args, KEYWORDS)?;

        let kind = args.get(Keyword::Type).ok_or(ParseError::MissingType(Object::Qdisc))?;
        let kind = parse_type(kind, &[CeetmType::Root, CeetmType::Prio, CeetmType::Wbfs])?;

        let options = match kind {
            CeetmType::Root => Self::parse_root(&args)?,
            CeetmType::Prio => Self::parse_prio(&args)?,
            CeetmType::Wbfs => Self::parse_wbfs(&args)?,
        };

        tracing::debug!(?options, "parsed ceetm qdisc options");

        Ok(options)
    }

    fn parse_root(args: &Arguments<'_>) -> Result<Self, ParseError> {
        args.reject_foreign(
            &[Keyword::Type, Keyword::Rate, Keyword::Ceil, Keyword::Overhead],
            owner,
        )?;

        let ceil = args.get(Keyword::Ceil).map(|v| parse_rate(Keyword::Ceil, v)).transpose()?;
        let overhead =
            args.get(Keyword::Overhead).map(|v| parse_u16(Keyword::Overhead, v)).transpose()?;

        let Some(rate) = args.get(Keyword::Rate) else {
            if ceil.is_some() || overhead.is_some() {
                return Err(ParseError::Missing {
                    option: Keyword::Rate,
                    context: "a shaped root qdisc",
                });
            }

            return Ok(Self::Root { shaping: None });
        };

        let shaping = RootShaping {
            rate: parse_rate(Keyword::Rate, rate)?,
            ceil: ceil.unwrap_or_default(),
            overhead: overhead.unwrap_or_default(),
        };

        Ok(Self::Root { shaping: Some(shaping) })
    }

    fn parse_prio(args: &Arguments<'_>) -> Result<Self, ParseError> {
        args.reject_foreign(&[Keyword::Type, Keyword::Qcount], owner)?;

        let qcount = parse_qcount(args, "a prio qdisc")?;
        if qcount > CEETM_MAX_PRIO_QCOUNT {
            return Err(ParseError::OutOfRange {
                option: Keyword::Qcount,
                expected: "between 1 and 8",
                context: "prio qdiscs",
            });
        }

        Ok(Self::Prio { qcount })
    }

    fn parse_wbfs(args: &Arguments<'_>) -> Result<Self, ParseError> {
        args.reject_foreign(&[Keyword::Type, Keyword::Qcount, Keyword::Cr, Keyword::Er], owner)?;

        let qcount = match parse_qcount(args, "a wbfs qdisc")? {
            CEETM_MIN_WBFS_QCOUNT => WbfsQueues::Four,
            CEETM_MAX_WBFS_QCOUNT => WbfsQueues::Eight,
            _ => {
                return Err(ParseError::OutOfRange {
                    option: Keyword::Qcount,
                    expected: "either 4 or 8",
                    context: "wbfs qdiscs",
                })
            }
        };

        let cr = args.get(Keyword::Cr).map(|v| parse_flag(Keyword::Cr, v)).transpose()?;
        let er = args.get(Keyword::Er).map(|v| parse_flag(Keyword::Er, v)).transpose()?;

        Ok(Self::Wbfs { qcount, cr: cr.unwrap_or_default(), er: er.unwrap_or_default() })
    }

    /// The qdisc type.
    pub const fn ceetm_type(&self) -> CeetmType {
        match self {
            Self::Root { .. } => CeetmType::Root,
            Self::Prio { .. } => CeetmType::Prio,
            Self::Wbfs { .. } => CeetmType::Wbfs,
        }
    }

    /// Returns `true` for a root qdisc with a shaper.
    pub const fn is_shaped(&self) -> bool {
        matches!(self, Self::Root { shaping: Some(_) })
    }

    /// The kernel record for these options.
    pub fn to_qopt(&self) -> TcCeetmQopt {
        let mut qopt = TcCeetmQopt {
            kind: self.ceetm_type() as u32,
            shaped: self.is_shaped().into(),
            ..Default::default()
        };

        match *self {
            Self::Root { shaping: Some(shaping) } => {
                qopt.rate = shaping.rate;
                qopt.ceil = shaping.ceil;
                qopt.overhead = shaping.overhead;
            }
            Self::Root { shaping: None } => {}
            Self::Prio { qcount } => qopt.qcount = qcount,
            Self::Wbfs { qcount, cr, er } => {
                qopt.qcount = qcount.count();
                qopt.cr = cr.into();
                qopt.er = er.into();
            }
        }

        qopt
    }
}

/// `qcount` is mandatory for class groups and can't be zero.
fn parse_qcount(args: &Arguments<'_>, context: &'static str) -> Result<u16, ParseError> {
    let value =
        args.get(Keyword::Qcount).ok_or(ParseError::Missing { option: Keyword::Qcount, context })?;

    match parse_u16(Keyword::Qcount, value)? {
        0 => Err(ParseError::IllegalValue { option: Keyword::Qcount, value: value.to_string() }),
        qcount => Ok(qcount),
    }
}

/// The qdisc kinds a keyword belongs to.
const fn owner(keyword: Keyword) -> &'static str {
    match keyword {
        Keyword::Qcount => "prio and wbfs qdiscs",
        Keyword::Cr | Keyword::Er => "wbfs qdiscs",
        _ => "root qdiscs",
    }
}

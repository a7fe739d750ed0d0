use std::fmt;

/// The option keywords understood by the qdisc and class parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// `type`: root, prio or wbfs.
    Type,
    /// `qcount`: class queues of a prio or wbfs qdisc.
    Qcount,
    /// `rate`: committed rate.
    Rate,
    /// `ceil`: excess rate.
    Ceil,
    /// `overhead`: per-packet overhead of a root qdisc.
    Overhead,
    /// `cr`: committed rate shaping flag.
    Cr,
    /// `er`: excess rate shaping flag.
    Er,
    /// `tbl`: channel of an unshaped root class.
    Tbl,
    /// `weight`: wbfs class weight.
    Weight,
}

impl Keyword {
    /// The keyword as written on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Qcount => "qcount",
            Self::Rate => "rate",
            Self::Ceil => "ceil",
            Self::Overhead => "overhead",
            Self::Cr => "cr",
            Self::Er => "er",
            Self::Tbl => "tbl",
            Self::Weight => "weight",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The traffic-control object an option list configures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Object {
    /// A ceetm qdisc.
    Qdisc,
    /// A ceetm class.
    Class,
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Qdisc => f.write_str("qdisc"),
            Self::Class => f.write_str("class"),
        }
    }
}

/// Errors raised while parsing ceetm qdisc or class options.
///
/// Parsing either produces a complete option value or one of these; nothing is ever partially
/// applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// `help` was given; the caller should print the usage text.
    #[error("usage requested")]
    Help,
    /// A word that is not a known keyword.
    #[error("illegal argument \"{0}\"")]
    UnknownOption(String),
    /// A keyword was the last word, with no value after it.
    #[error("command line is not complete: {0} needs a value")]
    Incomplete(Keyword),
    /// A keyword was given twice.
    #[error("{0} already specified")]
    Duplicate(Keyword),
    /// No `type` was given.
    #[error("please specify the {0} type")]
    MissingType(Object),
    /// `type` is not one of root, prio or wbfs.
    #[error("illegal type argument \"{0}\"")]
    IllegalType(String),
    /// A keyword that only applies to another type.
    #[error("{option} belongs to {owner} only")]
    Mismatch {
        /// The misplaced keyword.
        option: Keyword,
        /// The types that accept it.
        owner: &'static str,
    },
    /// A value that doesn't parse as the keyword's type.
    #[error("illegal {option} argument \"{value}\"")]
    IllegalValue {
        /// The keyword.
        option: Keyword,
        /// The value as given.
        value: String,
    },
    /// A value that parses but is outside the accepted range.
    #[error("{option} must be {expected} for {context}")]
    OutOfRange {
        /// The keyword.
        option: Keyword,
        /// The accepted range.
        expected: &'static str,
        /// The kind of object being configured.
        context: &'static str,
    },
    /// A keyword required by the chosen type is absent.
    #[error("{option} is mandatory for {context}")]
    Missing {
        /// The keyword.
        option: Keyword,
        /// The kind of object being configured.
        context: &'static str,
    },
    /// A root class has neither `tbl` nor `rate`.
    #[error("either tbl or rate are mandatory for root classes")]
    TblOrRate,
    /// A root class has both `tbl` and `rate`.
    #[error("both tbl and rate can not be used for root classes")]
    TblAndRate,
}

//! Configuration of the CEETM queueing discipline over rtnetlink.
//!
//! CEETM (Customer Edge Egress Traffic Management) is a hardware scheduler exposed to Linux as
//! a classful qdisc. This crate is the user-space half of its tc support:
//!
//! - [`qdisc`] and [`class`] parse tc-style option lists into typed [`QdiscOptions`] and
//!   [`ClassOptions`], and encode them as the kernel's records.
//! - [`print`] and [`xstats`] render options and statistics reported by the kernel.
//! - [`request`] builds the rtnetlink messages, [`requests`] sends them.
//!
//! ## Example
//!
//! ```
//! use ceetm::{print::render_options, rate::RateUnits, request::encode_qdisc_options};
//! use ceetm::QdiscOptions;
//!
//! let args = ["type", "root", "rate", "1000mbit", "ceil", "1000mbit", "overhead", "24"];
//! let options = QdiscOptions::parse(&args).unwrap();
//!
//! let payload = encode_qdisc_options(&options);
//! assert_eq!(
//!     render_options(&payload, RateUnits::Si).unwrap(),
//!     "type root shaped rate 1000Mbit ceil 1000Mbit overhead 24",
//! );
//! ```
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod args;

pub mod class;
pub mod error;
pub mod handle;
pub mod print;
pub mod qdisc;
pub mod rate;
pub mod request;
pub mod requests;
pub mod wrappers;
pub mod xstats;

pub use class::ClassOptions;
pub use error::{Keyword, Object, ParseError};
pub use qdisc::QdiscOptions;

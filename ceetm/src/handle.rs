//! TC handle parsing and request addressing.
//!
//! TC handles are 32-bit values split into major:minor (16:16 bits), written in hex as
//! `maj:min`. Qdisc handles have a zero minor and are usually written `maj:`.

use std::fmt;

use rtnetlink::packet_route::tc::TcHandle;

/// Common fields shared by all qdisc/class requests.
///
/// This struct captures the basic addressing information needed to target
/// a specific qdisc or class in the traffic control hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QdiscRequestInner {
    /// The network interface index (from `if_nametoindex`).
    pub interface_index: i32,
    /// The parent handle (where this qdisc/class attaches).
    pub parent: TcHandle,
    /// This qdisc/class's own handle. Zero lets the kernel pick one for qdiscs.
    pub handle: TcHandle,
}

impl QdiscRequestInner {
    /// Create a new request for the given interface, defaulting to root parent.
    pub fn new(index: i32) -> Self {
        Self { interface_index: index, parent: TcHandle::ROOT, handle: TcHandle::default() }
    }

    /// Set the parent handle.
    pub fn with_parent(mut self, parent: TcHandle) -> Self {
        self.parent = parent;
        self
    }

    /// Set this qdisc/class's handle.
    pub fn with_handle(mut self, handle: TcHandle) -> Self {
        self.handle = handle;
        self
    }
}

/// A handle that isn't `root`, `none` or hex `maj:min`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid handle \"{0}\"")]
pub struct InvalidHandle(String);

/// Parse a handle the way tc does: `root`, `none`, `maj:`, `:min` or `maj:min`, in hex.
pub fn parse_handle(s: &str) -> Result<TcHandle, InvalidHandle> {
    match s {
        "root" => return Ok(TcHandle::ROOT),
        "none" => return Ok(TcHandle::default()),
        _ => {}
    }

    let invalid = || InvalidHandle(s.to_string());

    let (major, minor) = s.split_once(':').ok_or_else(invalid)?;
    let part = |digits: &str| -> Result<u16, InvalidHandle> {
        if digits.is_empty() {
            return Ok(0);
        }
        u16::from_str_radix(digits, 16).map_err(|_| invalid())
    };

    let (major, minor) = (part(major)?, part(minor)?);
    Ok(TcHandle::from(u32::from(major) << 16 | u32::from(minor)))
}

/// Format a handle the way tc prints it.
pub fn format_handle(handle: TcHandle) -> String {
    Handle(handle).to_string()
}

struct Handle(TcHandle);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.0.major, self.0.minor) {
            _ if self.0 == TcHandle::ROOT => f.write_str("root"),
            (0, 0) => f.write_str("none"),
            (0, minor) => write!(f, ":{minor:x}"),
            (major, 0) => write!(f, "{major:x}:"),
            (major, minor) => write!(f, "{major:x}:{minor:x}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tc_handles() {
        assert_eq!(parse_handle("root"), Ok(TcHandle::ROOT));
        assert_eq!(parse_handle("none"), Ok(TcHandle::default()));
        assert_eq!(parse_handle("1:"), Ok(TcHandle::from(0x0001_0000)));
        assert_eq!(parse_handle("1:a"), Ok(TcHandle::from(0x0001_000a)));
        assert_eq!(parse_handle("ffff:1"), Ok(TcHandle::from(0xffff_0001)));
        assert_eq!(parse_handle(":2"), Ok(TcHandle::from(0x0000_0002)));
    }

    #[test]
    fn rejects_bad_handles() {
        for bad in ["", "1", "x:1", "1:x", "10000:1", "1:2:3", "ROOT"] {
            assert_eq!(parse_handle(bad), Err(InvalidHandle(bad.to_string())), "{bad}");
        }
    }

    #[test]
    fn formats_like_tc() {
        assert_eq!(format_handle(TcHandle::ROOT), "root");
        assert_eq!(format_handle(TcHandle::default()), "none");
        assert_eq!(format_handle(TcHandle::from(0x0001_0000)), "1:");
        assert_eq!(format_handle(TcHandle::from(0x001a_000b)), "1a:b");
        assert_eq!(format_handle(TcHandle::from(0x0000_0003)), ":3");
    }

    #[test]
    fn request_inner_defaults_to_root_parent() {
        let inner = QdiscRequestInner::new(4).with_handle(TcHandle::from(0x0001_0000));
        assert_eq!(inner.interface_index, 4);
        assert_eq!(inner.parent, TcHandle::ROOT);
        assert_eq!(inner.handle, TcHandle::from(0x0001_0000));
    }
}

use std::{ffi::CString, num::NonZeroU32};

/// Resolve an interface name to its index, `None` if there is no such interface.
pub fn if_nametoindex(name: &str) -> Option<NonZeroU32> {
    // A name with an interior NUL can't name an interface.
    let name = CString::new(name).ok()?;
    nix::net::if_::if_nametoindex(name.as_c_str()).ok().and_then(NonZeroU32::new)
}

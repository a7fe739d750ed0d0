//! Helpers to make CEETM requests, given a [`rtnetlink::Handle`].

use ceetm_wire::{DecodeError, CEETM_KIND};
use futures::StreamExt as _;
use nix::libc::TCA_OPTIONS;
use rtnetlink::packet_core::{Emitable as _, NetlinkMessage, NetlinkPayload, Nla as _};
use rtnetlink::packet_route::{
    tc::{TcAttribute, TcHandle, TcMessage, TcOption, TcStats2, TcXstats},
    RouteNetlinkMessage,
};

use crate::print::render_options;
use crate::rate::RateUnits;
use crate::request::DumpRequest;
use crate::xstats::render_xstats;

/// Errors raised while talking to the kernel.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The netlink exchange failed, or the kernel rejected the request.
    #[error(transparent)]
    RtNetlink(#[from] rtnetlink::Error),
    /// No interface has the given name.
    #[error("cannot find device \"{0}\"")]
    DeviceNotFound(String),
}

/// Send a request and wait for the kernel's acknowledgement.
pub async fn execute(
    handle: &mut rtnetlink::Handle,
    request: NetlinkMessage<RouteNetlinkMessage>,
) -> Result<(), rtnetlink::Error> {
    let mut res = handle.request(request)?;
    while let Some(res) = res.next().await {
        if let NetlinkPayload::Error(e) = res.payload {
            tracing::debug!(?e, "ceetm request failed");
            return Err(rtnetlink::Error::NetlinkError(e));
        }
    }

    Ok(())
}

/// Dump the CEETM qdiscs or classes of an interface.
///
/// Objects of other kinds, or on other interfaces, are skipped.
pub async fn dump(
    handle: &mut rtnetlink::Handle,
    request: DumpRequest,
) -> Result<Vec<CeetmObject>, Error> {
    let mut objects = Vec::new();

    let mut res = handle.request(request.build())?;
    while let Some(res) = res.next().await {
        match res.payload {
            NetlinkPayload::InnerMessage(
                RouteNetlinkMessage::NewQueueDiscipline(msg)
                | RouteNetlinkMessage::NewTrafficClass(msg),
            ) => {
                if msg.header.index != request.interface_index {
                    continue;
                }

                if let Some(object) = CeetmObject::from_message(&msg) {
                    objects.push(object);
                }
            }
            NetlinkPayload::Error(e) => return Err(rtnetlink::Error::NetlinkError(e).into()),
            _ => {}
        }
    }

    tracing::debug!(count = objects.len(), object = %request.object, "dumped ceetm objects");

    Ok(objects)
}

/// A CEETM qdisc or class as reported by the kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CeetmObject {
    /// Index of the interface the object lives on.
    pub interface_index: i32,
    /// The object's own handle.
    pub handle: TcHandle,
    /// Handle of the parent qdisc or class.
    pub parent: TcHandle,
    /// Content of `TCA_OPTIONS`, i.e. the nested CEETM attributes without the outer header.
    pub options: Option<Vec<u8>>,
    /// Extended statistics, from `TCA_STATS2`/`TCA_STATS_APP` or `TCA_XSTATS`.
    pub xstats: Option<Vec<u8>>,
}

impl CeetmObject {
    /// Extract a CEETM object from a qdisc or class message, `None` for other kinds.
    pub fn from_message(msg: &TcMessage) -> Option<Self> {
        let is_ceetm = msg
            .attributes
            .iter()
            .any(|attr| matches!(attr, TcAttribute::Kind(kind) if kind == CEETM_KIND));
        if !is_ceetm {
            return None;
        }

        let mut object = Self {
            interface_index: msg.header.index,
            handle: msg.header.handle,
            parent: msg.header.parent,
            options: None,
            xstats: None,
        };

        for attr in &msg.attributes {
            match attr {
                TcAttribute::Options(opts) => object.options = Some(options_content(opts)),
                TcAttribute::Other(nla) if nla.kind() == TCA_OPTIONS => {
                    let mut buf = vec![0; nla.value_len()];
                    nla.emit_value(&mut buf);
                    object.options = Some(buf);
                }
                TcAttribute::Stats2(stats) => {
                    let app = stats.iter().find_map(|stat| match stat {
                        TcStats2::App(TcXstats::Other(app)) => Some(app.clone()),
                        _ => None,
                    });
                    // Prefer TCA_STATS_APP over the legacy TCA_XSTATS copy.
                    if app.is_some() {
                        object.xstats = app;
                    }
                }
                TcAttribute::Xstats(TcXstats::Other(xstats)) if object.xstats.is_none() => {
                    object.xstats = Some(xstats.clone());
                }
                _ => {}
            }
        }

        Some(object)
    }

    /// Render the options as tc prints them.
    pub fn render_options(&self, units: RateUnits) -> Result<String, DecodeError> {
        match &self.options {
            Some(options) => render_options(options, units),
            None => Ok(String::new()),
        }
    }

    /// Render the extended statistics, if the kernel reported any.
    pub fn render_xstats(&self) -> Result<Option<String>, DecodeError> {
        self.xstats.as_deref().map(render_xstats).transpose()
    }
}

/// Rebuild the content of `TCA_OPTIONS` from its parsed form.
///
/// For kinds netlink-packet-route doesn't know, the whole `TCA_OPTIONS` attribute comes back
/// as a single opaque entry of type `TCA_OPTIONS`; only its value is the nested content. Any
/// other entry is a nested attribute and is emitted with its header.
fn options_content(opts: &[TcOption]) -> Vec<u8> {
    let mut buf = Vec::new();

    for opt in opts {
        let start = buf.len();
        if opt.kind() == TCA_OPTIONS {
            buf.resize(start + opt.value_len(), 0);
            opt.emit_value(&mut buf[start..]);
        } else {
            buf.resize(start + opt.buffer_len(), 0);
            opt.emit(&mut buf[start..]);
        }
    }

    buf
}

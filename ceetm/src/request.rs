//! rtnetlink request builders for CEETM qdiscs and classes.

use ceetm_wire::{nla::build_nla, CEETM_KIND, TCA_CEETM_COPT, TCA_CEETM_QOPS};
use nix::libc::TCA_OPTIONS;
use rtnetlink::packet_core::{
    DefaultNla, NetlinkMessage, NLM_F_ACK, NLM_F_CREATE, NLM_F_DUMP, NLM_F_EXCL, NLM_F_REPLACE,
    NLM_F_REQUEST,
};
use rtnetlink::packet_route::{
    tc::{TcAttribute, TcMessage},
    RouteNetlinkMessage,
};

use crate::class::ClassOptions;
use crate::error::Object;
use crate::handle::QdiscRequestInner;
use crate::qdisc::QdiscOptions;

/// How a create request treats an existing object, like tc's `add`, `change` and `replace`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verb {
    /// Create, failing if the object exists.
    #[default]
    Add,
    /// Modify an existing object.
    Change,
    /// Create, or replace the object if it exists.
    Replace,
}

impl Verb {
    /// The netlink header flags for this verb.
    pub const fn flags(self) -> u16 {
        let flags = match self {
            Self::Add => NLM_F_CREATE | NLM_F_EXCL,
            Self::Change => 0,
            Self::Replace => NLM_F_CREATE | NLM_F_REPLACE,
        };

        flags | NLM_F_REQUEST | NLM_F_ACK
    }
}

/// Encode qdisc options as the content of `TCA_OPTIONS`.
pub fn encode_qdisc_options(options: &QdiscOptions) -> Vec<u8> {
    build_nla(TCA_CEETM_QOPS, &options.to_qopt().to_bytes())
}

/// Encode class options as the content of `TCA_OPTIONS`.
pub fn encode_class_options(options: &ClassOptions) -> Vec<u8> {
    build_nla(TCA_CEETM_COPT, &options.to_copt().to_bytes())
}

/// Wrap sub-attributes in a `TCA_OPTIONS` container.
fn build_nested_options(sub_attrs: Vec<u8>) -> DefaultNla {
    DefaultNla::new(TCA_OPTIONS, sub_attrs)
}

fn ceetm_message(inner: &QdiscRequestInner) -> TcMessage {
    let mut tc_message = TcMessage::with_index(inner.interface_index);
    tc_message.header.parent = inner.parent;
    tc_message.header.handle = inner.handle;

    tc_message.attributes.push(TcAttribute::Kind(CEETM_KIND.to_string()));

    tc_message
}

/// Builder for creating, changing or replacing a CEETM qdisc.
///
/// # Example
///
/// ```
/// use ceetm::handle::QdiscRequestInner;
/// use ceetm::request::{QdiscCeetmRequest, Verb};
/// use ceetm::QdiscOptions;
/// use rtnetlink::packet_route::tc::TcHandle;
///
/// let options = QdiscOptions::parse(&["type", "root", "rate", "1000mbit"]).unwrap();
/// let request = QdiscCeetmRequest::new(
///     QdiscRequestInner::new(2).with_handle(TcHandle::from(0x0001_0000)), // 1:
///     options,
/// )
/// .with_verb(Verb::Replace)
/// .build();
/// ```
#[derive(Debug, Clone)]
pub struct QdiscCeetmRequest {
    /// Device and handles.
    pub inner: QdiscRequestInner,
    /// Options to encode into `TCA_OPTIONS`.
    pub options: QdiscOptions,
    /// Create, change or replace.
    pub verb: Verb,
}

impl QdiscCeetmRequest {
    /// A request that adds the object, failing if it exists.
    pub fn new(inner: QdiscRequestInner, options: QdiscOptions) -> Self {
        Self { inner, options, verb: Verb::Add }
    }

    /// Set how an existing object is treated.
    pub fn with_verb(mut self, verb: Verb) -> Self {
        self.verb = verb;
        self
    }

    /// Build the `RTM_NEWQDISC` message.
    pub fn build(self) -> NetlinkMessage<RouteNetlinkMessage> {
        let mut tc_message = ceetm_message(&self.inner);
        let options = encode_qdisc_options(&self.options);
        tc_message.attributes.push(TcAttribute::Other(build_nested_options(options)));

        let mut nl_req = NetlinkMessage::from(RouteNetlinkMessage::NewQueueDiscipline(tc_message));
        nl_req.header.flags = self.verb.flags();

        tracing::debug!(?nl_req, verb = ?self.verb, "built ceetm qdisc request");

        nl_req
    }
}

/// Builder for creating, changing or replacing a CEETM class.
#[derive(Debug, Clone)]
pub struct CeetmClassRequest {
    /// Device and handles.
    pub inner: QdiscRequestInner,
    /// Options to encode into `TCA_OPTIONS`.
    pub options: ClassOptions,
    /// Create, change or replace.
    pub verb: Verb,
}

impl CeetmClassRequest {
    /// A request that adds the object, failing if it exists.
    pub fn new(inner: QdiscRequestInner, options: ClassOptions) -> Self {
        Self { inner, options, verb: Verb::Add }
    }

    /// Set how an existing object is treated.
    pub fn with_verb(mut self, verb: Verb) -> Self {
        self.verb = verb;
        self
    }

    /// Build the `RTM_NEWTCLASS` message.
    pub fn build(self) -> NetlinkMessage<RouteNetlinkMessage> {
        let mut tc_message = ceetm_message(&self.inner);
        let options = encode_class_options(&self.options);
        tc_message.attributes.push(TcAttribute::Other(build_nested_options(options)));

        let mut nl_req = NetlinkMessage::from(RouteNetlinkMessage::NewTrafficClass(tc_message));
        nl_req.header.flags = self.verb.flags();

        tracing::debug!(?nl_req, verb = ?self.verb, "built ceetm class request");

        nl_req
    }
}

/// Builder for deleting a CEETM qdisc.
#[derive(Debug, Clone)]
pub struct QdiscDeleteRequest {
    /// Device and handles of the qdisc.
    pub inner: QdiscRequestInner,
}

impl QdiscDeleteRequest {
    /// Delete the object addressed by `inner`.
    pub fn new(inner: QdiscRequestInner) -> Self {
        Self { inner }
    }

    /// Build the `RTM_DELQDISC` message.
    pub fn build(self) -> NetlinkMessage<RouteNetlinkMessage> {
        let tc_message = ceetm_message(&self.inner);

        let mut nl_req = NetlinkMessage::from(RouteNetlinkMessage::DelQueueDiscipline(tc_message));
        nl_req.header.flags = NLM_F_REQUEST | NLM_F_ACK;

        nl_req
    }
}

/// Builder for deleting a CEETM class.
#[derive(Debug, Clone)]
pub struct ClassDeleteRequest {
    /// Device and handles of the class.
    pub inner: QdiscRequestInner,
}

impl ClassDeleteRequest {
    /// Delete the object addressed by `inner`.
    pub fn new(inner: QdiscRequestInner) -> Self {
        Self { inner }
    }

    /// Build the `RTM_DELTCLASS` message.
    pub fn build(self) -> NetlinkMessage<RouteNetlinkMessage> {
        let tc_message = ceetm_message(&self.inner);

        let mut nl_req = NetlinkMessage::from(RouteNetlinkMessage::DelTrafficClass(tc_message));
        nl_req.header.flags = NLM_F_REQUEST | NLM_F_ACK;

        nl_req
    }
}

/// Builder for dumping the qdiscs or classes of an interface.
#[derive(Debug, Clone, Copy)]
pub struct DumpRequest {
    /// Interface to list.
    pub interface_index: i32,
    /// Whether qdiscs or classes are listed.
    pub object: Object,
}

impl DumpRequest {
    /// List qdiscs.
    pub fn qdiscs(interface_index: i32) -> Self {
        Self { interface_index, object: Object::Qdisc }
    }

    /// List classes.
    pub fn classes(interface_index: i32) -> Self {
        Self { interface_index, object: Object::Class }
    }

    /// Build the `RTM_GETQDISC` or `RTM_GETTCLASS` dump message.
    pub fn build(self) -> NetlinkMessage<RouteNetlinkMessage> {
        let tc_message = TcMessage::with_index(self.interface_index);

        let message = match self.object {
            Object::Qdisc => RouteNetlinkMessage::GetQueueDiscipline(tc_message),
            Object::Class => RouteNetlinkMessage::GetTrafficClass(tc_message),
        };

        let mut nl_req = NetlinkMessage::from(message);
        nl_req.header.flags = NLM_F_REQUEST | NLM_F_DUMP;

        nl_req
    }
}

#[cfg(test)]
mod tests {
    use rtnetlink::packet_core::{Nla, NetlinkPayload};
    use rtnetlink::packet_route::tc::TcHandle;

    use super::*;

    fn tc_message(nl_req: NetlinkMessage<RouteNetlinkMessage>) -> TcMessage {
        match nl_req.payload {
            NetlinkPayload::InnerMessage(
                RouteNetlinkMessage::NewQueueDiscipline(msg)
                | RouteNetlinkMessage::NewTrafficClass(msg)
                | RouteNetlinkMessage::DelQueueDiscipline(msg)
                | RouteNetlinkMessage::DelTrafficClass(msg)
                | RouteNetlinkMessage::GetQueueDiscipline(msg)
                | RouteNetlinkMessage::GetTrafficClass(msg),
            ) => msg,
            other => panic!("unexpected payload {other:?}"),
        }
    }

    fn options_payload(msg: &TcMessage) -> Vec<u8> {
        let nla = msg
            .attributes
            .iter()
            .find_map(|attr| match attr {
                TcAttribute::Other(nla) if nla.kind() == TCA_OPTIONS => Some(nla),
                _ => None,
            })
            .expect("TCA_OPTIONS attribute");

        let mut buf = vec![0; nla.value_len()];
        nla.emit_value(&mut buf);
        buf
    }

    #[test]
    fn verb_flags() {
        assert_eq!(Verb::Add.flags(), NLM_F_CREATE | NLM_F_EXCL | NLM_F_REQUEST | NLM_F_ACK);
        assert_eq!(Verb::Change.flags(), NLM_F_REQUEST | NLM_F_ACK);
        assert_eq!(Verb::Replace.flags(), NLM_F_CREATE | NLM_F_REPLACE | NLM_F_REQUEST | NLM_F_ACK);
    }

    #[test]
    fn qdisc_request() {
        let options = QdiscOptions::parse(&["type", "prio", "qcount", "8"]).unwrap();
        let inner = QdiscRequestInner::new(3)
            .with_parent(TcHandle::from(0x0001_0001))
            .with_handle(TcHandle::from(0x0002_0000));

        let nl_req = QdiscCeetmRequest::new(inner, options).with_verb(Verb::Replace).build();
        assert_eq!(nl_req.header.flags, Verb::Replace.flags());

        let msg = tc_message(nl_req);
        assert_eq!(msg.header.index, 3);
        assert_eq!(msg.header.parent, TcHandle::from(0x0001_0001));
        assert_eq!(msg.header.handle, TcHandle::from(0x0002_0000));
        assert!(msg.attributes.contains(&TcAttribute::Kind("ceetm".to_string())));

        let payload = options_payload(&msg);
        assert_eq!(payload, encode_qdisc_options(&options));
        assert_eq!(payload.len(), 4 + 32);
        assert_eq!(u16::from_ne_bytes([payload[2], payload[3]]), TCA_CEETM_QOPS);
    }

    #[test]
    fn class_request() {
        let options = ClassOptions::parse(&["type", "wbfs", "weight", "20"]).unwrap();
        let inner = QdiscRequestInner::new(3)
            .with_parent(TcHandle::from(0x0002_0000))
            .with_handle(TcHandle::from(0x0002_0001));

        let nl_req = CeetmClassRequest::new(inner, options).build();
        assert_eq!(nl_req.header.flags, Verb::Add.flags());

        let payload = options_payload(&tc_message(nl_req));
        assert_eq!(payload.len(), 4 + 24);
        assert_eq!(u16::from_ne_bytes([payload[2], payload[3]]), TCA_CEETM_COPT);
        // weight @ 18 in the record
        assert_eq!(u16::from_ne_bytes([payload[4 + 18], payload[4 + 19]]), 20);
    }

    #[test]
    fn delete_requests_carry_kind_only() {
        let inner = QdiscRequestInner::new(5).with_handle(TcHandle::from(0x0001_0000));

        let requests =
            [QdiscDeleteRequest::new(inner).build(), ClassDeleteRequest::new(inner).build()];
        for nl_req in requests {
            assert_eq!(nl_req.header.flags, NLM_F_REQUEST | NLM_F_ACK);
            let msg = tc_message(nl_req);
            assert_eq!(msg.attributes, vec![TcAttribute::Kind("ceetm".to_string())]);
        }
    }

    #[test]
    fn dump_requests() {
        let nl_req = DumpRequest::classes(7).build();
        assert_eq!(nl_req.header.flags, NLM_F_REQUEST | NLM_F_DUMP);
        assert!(matches!(
            nl_req.payload,
            NetlinkPayload::InnerMessage(RouteNetlinkMessage::GetTrafficClass(ref msg))
                if msg.header.index == 7
        ));

        let nl_req = DumpRequest::qdiscs(7).build();
        assert!(matches!(
            nl_req.payload,
            NetlinkPayload::InnerMessage(RouteNetlinkMessage::GetQueueDiscipline(_))
        ));
    }
}

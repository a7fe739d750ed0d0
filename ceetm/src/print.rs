//! Rendering of CEETM options reported by the kernel, in the form `tc` prints them.

use ceetm_wire::{
    nla::NestedAttributes, CeetmType, DecodeError, TcCeetmCopt, TcCeetmQopt, TCA_CEETM_COPT,
    TCA_CEETM_MAX, TCA_CEETM_QOPS,
};

use crate::rate::{format_rate, RateUnits};

/// Render the payload of a ceetm `TCA_OPTIONS` attribute.
///
/// Qdisc options are rendered before class options when both are present. A record shorter
/// than its kernel struct is skipped with a warning; a record with an unknown type renders
/// nothing.
pub fn render_options(options: &[u8], units: RateUnits) -> Result<String, DecodeError> {
    let tb = NestedAttributes::parse(options, TCA_CEETM_MAX)?;

    let qopt = tb.get(TCA_CEETM_QOPS).and_then(|payload| skip_short(TcCeetmQopt::decode(payload)));
    let copt = tb.get(TCA_CEETM_COPT).and_then(|payload| skip_short(TcCeetmCopt::decode(payload)));

    let qopt = qopt.map(|qopt| render_qopt(&qopt, units));
    let copt = copt.map(|copt| render_copt(&copt, units));
    let rendered = [qopt, copt]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    Ok(rendered.join(" "))
}

fn skip_short<T>(record: Result<T, DecodeError>) -> Option<T> {
    record.map_err(|err| tracing::warn!(%err, "CEETM: too short opt")).ok()
}

/// Render a qdisc record.
pub fn render_qopt(qopt: &TcCeetmQopt, units: RateUnits) -> String {
    let Some(kind) = qopt.ceetm_type() else {
        return String::new();
    };

    let mut out = vec![format!("type {kind}")];

    match kind {
        CeetmType::Root if qopt.is_shaped() => {
            out.push(format!("shaped rate {}", format_rate(qopt.rate, units)));
            out.push(format!("ceil {}", format_rate(qopt.ceil, units)));
            out.push(format!("overhead {}", qopt.overhead));
        }
        CeetmType::Root => out.push("unshaped".to_string()),
        CeetmType::Prio => {
            out.push(shaped(qopt.is_shaped()).to_string());
            out.push(format!("qcount {}", qopt.qcount));
        }
        CeetmType::Wbfs => {
            if qopt.is_shaped() {
                out.push(format!("shaped cr {} er {}", qopt.cr, qopt.er));
            } else {
                out.push("unshaped".to_string());
            }
            out.push(format!("qcount {}", qopt.qcount));
        }
    }

    out.join(" ")
}

/// Render a class record.
pub fn render_copt(copt: &TcCeetmCopt, units: RateUnits) -> String {
    let Some(kind) = copt.ceetm_type() else {
        return String::new();
    };

    let mut out = vec![format!("type {kind}")];

    match kind {
        CeetmType::Root if copt.is_shaped() => {
            out.push(format!("shaped rate {}", format_rate(copt.rate, units)));
            out.push(format!("ceil {}", format_rate(copt.ceil, units)));
        }
        CeetmType::Root => out.push(format!("unshaped tbl {}", copt.tbl)),
        CeetmType::Prio if copt.is_shaped() => {
            out.push(format!("shaped CR {} ER {}", copt.cr, copt.er));
        }
        CeetmType::Prio => out.push("unshaped".to_string()),
        CeetmType::Wbfs => out.push(format!("weight {}", copt.weight)),
    }

    out.join(" ")
}

const fn shaped(shaped: bool) -> &'static str {
    if shaped {
        "shaped"
    } else {
        "unshaped"
    }
}

#[cfg(test)]
mod tests {
    use ceetm_wire::nla::build_nla;

    use super::*;

    fn qopt_payload(qopt: &TcCeetmQopt) -> Vec<u8> {
        build_nla(TCA_CEETM_QOPS, &qopt.to_bytes())
    }

    fn copt_payload(copt: &TcCeetmCopt) -> Vec<u8> {
        build_nla(TCA_CEETM_COPT, &copt.to_bytes())
    }

    fn render(payload: &[u8]) -> String {
        render_options(payload, RateUnits::Si).unwrap()
    }

    #[test]
    fn qdisc_records() {
        let root = TcCeetmQopt {
            kind: 1,
            shaped: 1,
            rate: 125_000_000,
            ceil: 125_000_000,
            overhead: 24,
            ..Default::default()
        };
        assert_eq!(
            render(&qopt_payload(&root)),
            "type root shaped rate 1000Mbit ceil 1000Mbit overhead 24"
        );

        let root = TcCeetmQopt { kind: 1, ..Default::default() };
        assert_eq!(render(&qopt_payload(&root)), "type root unshaped");

        let prio = TcCeetmQopt { kind: 2, qcount: 8, ..Default::default() };
        assert_eq!(render(&qopt_payload(&prio)), "type prio unshaped qcount 8");

        let prio = TcCeetmQopt { kind: 2, shaped: 1, qcount: 3, ..Default::default() };
        assert_eq!(render(&qopt_payload(&prio)), "type prio shaped qcount 3");

        let wbfs =
            TcCeetmQopt { kind: 3, shaped: 1, qcount: 4, cr: 1, er: 0, ..Default::default() };
        assert_eq!(render(&qopt_payload(&wbfs)), "type wbfs shaped cr 1 er 0 qcount 4");

        let wbfs = TcCeetmQopt { kind: 3, qcount: 8, cr: 1, ..Default::default() };
        assert_eq!(render(&qopt_payload(&wbfs)), "type wbfs unshaped qcount 8");
    }

    #[test]
    fn class_records() {
        let root =
            TcCeetmCopt { kind: 1, shaped: 1, rate: 12_500_000, ceil: 0, ..Default::default() };
        assert_eq!(render(&copt_payload(&root)), "type root shaped rate 100000Kbit ceil 0bit");

        let root = TcCeetmCopt { kind: 1, tbl: 2, ..Default::default() };
        assert_eq!(render(&copt_payload(&root)), "type root unshaped tbl 2");

        let prio = TcCeetmCopt { kind: 2, shaped: 1, cr: 1, er: 0, ..Default::default() };
        assert_eq!(render(&copt_payload(&prio)), "type prio shaped CR 1 ER 0");

        let prio = TcCeetmCopt { kind: 2, ..Default::default() };
        assert_eq!(render(&copt_payload(&prio)), "type prio unshaped");

        let wbfs = TcCeetmCopt { kind: 3, weight: 17, ..Default::default() };
        assert_eq!(render(&copt_payload(&wbfs)), "type wbfs weight 17");
    }

    #[test]
    fn iec_units() {
        let root = TcCeetmQopt {
            kind: 1,
            shaped: 1,
            rate: 134_217_728,
            ceil: 131_072,
            ..Default::default()
        };
        assert_eq!(
            render_options(&qopt_payload(&root), RateUnits::Iec).unwrap(),
            "type root shaped rate 1024Mibit ceil 1024Kibit overhead 0"
        );
    }

    #[test]
    fn unknown_type_renders_nothing() {
        assert_eq!(render(&qopt_payload(&TcCeetmQopt { kind: 7, ..Default::default() })), "");
        assert_eq!(render(&copt_payload(&TcCeetmCopt::default())), "");
    }

    #[test]
    fn short_records_are_skipped() {
        let mut payload = build_nla(TCA_CEETM_QOPS, &[1, 0, 0, 0]);
        payload.extend(copt_payload(&TcCeetmCopt { kind: 3, weight: 5, ..Default::default() }));

        assert_eq!(render(&payload), "type wbfs weight 5");
    }

    #[test]
    fn last_duplicate_wins_and_unknown_kinds_are_ignored() {
        let mut payload = qopt_payload(&TcCeetmQopt { kind: 1, ..Default::default() });
        payload.extend(build_nla(9, &[0xff; 8]));
        payload.extend(qopt_payload(&TcCeetmQopt { kind: 2, qcount: 2, ..Default::default() }));

        assert_eq!(render(&payload), "type prio unshaped qcount 2");
    }

    #[test]
    fn empty_and_malformed_payloads() {
        assert_eq!(render(&[]), "");

        // Attribute claims 64 bytes but only 8 are there.
        let mut payload = build_nla(TCA_CEETM_QOPS, &[0; 4]);
        payload[0..2].copy_from_slice(&64u16.to_ne_bytes());
        assert!(matches!(
            render_options(&payload, RateUnits::Si),
            Err(DecodeError::MalformedAttribute { offset: 0 })
        ));
    }
}

use ceetm::{
    print::render_options, qdisc, rate::RateUnits, request::encode_qdisc_options, ParseError,
    QdiscOptions,
};

fn round_trip(line: &str) -> String {
    let _ = tracing_subscriber::fmt::try_init();

    let args = line.split_whitespace().collect::<Vec<_>>();
    let options = QdiscOptions::parse(&args).unwrap();
    render_options(&encode_qdisc_options(&options), RateUnits::Si).unwrap()
}

#[test]
fn documented_root_example() {
    assert_eq!(
        round_trip("type root rate 1000mbit ceil 1000mbit overhead 24"),
        "type root shaped rate 1000Mbit ceil 1000Mbit overhead 24"
    );
}

#[test]
fn round_trips() {
    let cases = [
        ("type root", "type root unshaped"),
        ("type root rate 100mbit", "type root shaped rate 100000Kbit ceil 0bit overhead 0"),
        (
            "overhead 24 rate 5gbit type root",
            "type root shaped rate 5000Mbit ceil 0bit overhead 24",
        ),
        ("type prio qcount 1", "type prio unshaped qcount 1"),
        ("type prio qcount 8", "type prio unshaped qcount 8"),
        ("type wbfs qcount 4", "type wbfs unshaped qcount 4"),
    ];

    for (line, printed) in cases {
        assert_eq!(round_trip(line), printed, "{line}");
    }
}

/// A wbfs group is never encoded as shaped, and cr/er are only printed for shaped groups, so
/// they travel to the kernel but don't show up in the rendering.
#[test]
fn wbfs_cr_er_are_encoded_but_not_printed() {
    let options = QdiscOptions::parse(&["type", "wbfs", "qcount", "8", "cr", "1", "er", "1"])
        .unwrap();

    let qopt = options.to_qopt();
    assert_eq!((qopt.shaped, qopt.qcount, qopt.cr, qopt.er), (0, 8, 1, 1));

    assert_eq!(round_trip("type wbfs qcount 8 cr 1 er 1"), "type wbfs unshaped qcount 8");
}

#[test]
fn mpu_is_rejected() {
    assert!(qdisc::USAGE.contains("mpu is not supported"));

    let args = ["type", "root", "rate", "1000mbit", "mpu", "64"];
    assert_eq!(QdiscOptions::parse(&args), Err(ParseError::UnknownOption("mpu".to_string())));
}

#[test]
fn iec_printing() {
    let options = QdiscOptions::parse(&["type", "root", "rate", "1gibit"]).unwrap();
    assert_eq!(
        render_options(&encode_qdisc_options(&options), RateUnits::Iec).unwrap(),
        "type root shaped rate 1024Mibit ceil 0bit overhead 0"
    );
}

#[test]
fn failures_produce_no_options() {
    let _ = tracing_subscriber::fmt::try_init();

    for line in [
        "type root ceil 1mbit",
        "type root overhead 24",
        "type prio qcount 9",
        "type wbfs qcount 6",
        "type prio",
        "qcount 8",
        "type prio qcount 8 qcount 4",
        "type prio qcount",
    ] {
        let args = line.split_whitespace().collect::<Vec<_>>();
        assert!(QdiscOptions::parse(&args).is_err(), "{line}");
    }

    assert_eq!(QdiscOptions::parse(&["type", "prio", "help"]), Err(ParseError::Help));
}

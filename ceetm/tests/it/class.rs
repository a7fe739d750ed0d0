use ceetm::{
    print::render_options, rate::RateUnits, request::encode_class_options, ClassOptions,
    ParseError,
};

fn round_trip(line: &str) -> String {
    let _ = tracing_subscriber::fmt::try_init();

    let args = line.split_whitespace().collect::<Vec<_>>();
    let options = ClassOptions::parse(&args).unwrap();
    render_options(&encode_class_options(&options), RateUnits::Si).unwrap()
}

#[test]
fn round_trips() {
    let cases = [
        ("type root rate 1000mbit ceil 1000mbit", "type root shaped rate 1000Mbit ceil 1000Mbit"),
        ("ceil 2mbit rate 1mbit type root", "type root shaped rate 1000Kbit ceil 2000Kbit"),
        ("type root tbl 1", "type root unshaped tbl 1"),
        ("type prio", "type prio unshaped"),
        ("type prio cr 1 er 1", "type prio shaped CR 1 ER 1"),
        ("type prio er 0", "type prio shaped CR 1 ER 0"),
        ("type wbfs weight 248", "type wbfs weight 248"),
    ];

    for (line, printed) in cases {
        assert_eq!(round_trip(line), printed, "{line}");
    }
}

#[test]
fn root_class_needs_one_of_tbl_and_rate() {
    assert_eq!(ClassOptions::parse(&["type", "root"]), Err(ParseError::TblOrRate));
    assert_eq!(
        ClassOptions::parse(&["type", "root", "tbl", "1", "rate", "1mbit"]),
        Err(ParseError::TblAndRate)
    );
}

#[test]
fn help_is_reported() {
    assert_eq!(ClassOptions::parse(&["help"]), Err(ParseError::Help));
}

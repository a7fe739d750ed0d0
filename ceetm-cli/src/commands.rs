use anyhow::Context as _;
use ceetm::handle::{format_handle, QdiscRequestInner};
use ceetm::print::render_options;
use ceetm::rate::RateUnits;
use ceetm::request::{
    encode_class_options, encode_qdisc_options, CeetmClassRequest, ClassDeleteRequest,
    DumpRequest, QdiscCeetmRequest, QdiscDeleteRequest, Verb,
};
use ceetm::requests::{self, CeetmObject};
use ceetm::wrappers::if_nametoindex;
use ceetm::{class, qdisc, ClassOptions, ParseError, QdiscOptions};
use rtnetlink::packet_route::tc::TcHandle;

use crate::cli::{ClassArgs, ClassCommand, Cli, Command, QdiscArgs, QdiscCommand, ShowArgs};

/// Global settings for one invocation.
#[derive(Debug, Clone, Copy)]
struct Context {
    units: RateUnits,
    dry_run: bool,
}

pub(crate) async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context {
        units: if cli.iec { RateUnits::Iec } else { RateUnits::Si },
        dry_run: cli.dry_run,
    };

    match cli.command {
        Command::Qdisc(cmd) => run_qdisc(ctx, cmd).await,
        Command::Class(cmd) => run_class(ctx, cmd).await,
    }
}

async fn run_qdisc(ctx: Context, cmd: QdiscCommand) -> anyhow::Result<()> {
    match cmd {
        QdiscCommand::Add(args) => add_qdisc(ctx, Verb::Add, args).await,
        QdiscCommand::Change(args) => add_qdisc(ctx, Verb::Change, args).await,
        QdiscCommand::Replace(args) => add_qdisc(ctx, Verb::Replace, args).await,
        QdiscCommand::Del(target) => {
            let inner = QdiscRequestInner::new(device_index(&target.dev)?)
                .with_parent(target.parent)
                .with_handle(target.handle.unwrap_or_default());

            if ctx.dry_run {
                println!("{:?}", QdiscDeleteRequest::new(inner).build());
                return Ok(());
            }

            let mut handle = connect()?;
            requests::execute(&mut handle, QdiscDeleteRequest::new(inner).build())
                .await
                .context("deleting qdisc")
        }
        QdiscCommand::Show(args) => {
            show(ctx, DumpRequest::qdiscs(device_index(&args.dev)?), &args).await
        }
    }
}

/// Parsed options, or the usage text when `help` was asked for.
#[derive(Debug, PartialEq)]
enum Parsed<T> {
    Options(T),
    Usage(&'static str),
}

fn parse_qdisc_options(args: &[String]) -> anyhow::Result<Parsed<QdiscOptions>> {
    match QdiscOptions::parse(args) {
        Ok(options) => Ok(Parsed::Options(options)),
        Err(ParseError::Help) => Ok(Parsed::Usage(qdisc::USAGE)),
        Err(err) => Err(err).context("parsing ceetm qdisc options"),
    }
}

fn parse_class_options(args: &[String]) -> anyhow::Result<Parsed<ClassOptions>> {
    match ClassOptions::parse(args) {
        Ok(options) => Ok(Parsed::Options(options)),
        Err(ParseError::Help) => Ok(Parsed::Usage(class::USAGE)),
        Err(err) => Err(err).context("parsing ceetm class options"),
    }
}

async fn add_qdisc(ctx: Context, verb: Verb, args: QdiscArgs) -> anyhow::Result<()> {
    let options = match parse_qdisc_options(&args.options)? {
        Parsed::Options(options) => options,
        Parsed::Usage(usage) => {
            eprint!("{usage}");
            return Ok(());
        }
    };

    if ctx.dry_run {
        println!("{}", dry_run_output(ctx.units, &encode_qdisc_options(&options))?);
        return Ok(());
    }

    let target = args.target;
    let inner = QdiscRequestInner::new(device_index(&target.dev)?)
        .with_parent(target.parent)
        .with_handle(target.handle.unwrap_or_default());

    let request = QdiscCeetmRequest::new(inner, options).with_verb(verb).build();

    let mut handle = connect()?;
    requests::execute(&mut handle, request).await.context("configuring qdisc")
}

async fn run_class(ctx: Context, cmd: ClassCommand) -> anyhow::Result<()> {
    match cmd {
        ClassCommand::Add(args) => add_class(ctx, Verb::Add, args).await,
        ClassCommand::Change(args) => add_class(ctx, Verb::Change, args).await,
        ClassCommand::Replace(args) => add_class(ctx, Verb::Replace, args).await,
        ClassCommand::Del(target) => {
            let inner = QdiscRequestInner::new(device_index(&target.dev)?)
                .with_parent(target.parent)
                .with_handle(target.classid);

            if ctx.dry_run {
                println!("{:?}", ClassDeleteRequest::new(inner).build());
                return Ok(());
            }

            let mut handle = connect()?;
            requests::execute(&mut handle, ClassDeleteRequest::new(inner).build())
                .await
                .context("deleting class")
        }
        ClassCommand::Show(args) => {
            show(ctx, DumpRequest::classes(device_index(&args.dev)?), &args).await
        }
    }
}

async fn add_class(ctx: Context, verb: Verb, args: ClassArgs) -> anyhow::Result<()> {
    let options = match parse_class_options(&args.options)? {
        Parsed::Options(options) => options,
        Parsed::Usage(usage) => {
            eprint!("{usage}");
            return Ok(());
        }
    };

    if ctx.dry_run {
        println!("{}", dry_run_output(ctx.units, &encode_class_options(&options))?);
        return Ok(());
    }

    let inner = QdiscRequestInner::new(device_index(&args.dev)?)
        .with_parent(args.parent)
        .with_handle(args.classid);

    let request = CeetmClassRequest::new(inner, options).with_verb(verb).build();

    let mut handle = connect()?;
    requests::execute(&mut handle, request).await.context("configuring class")
}

/// The encoded `TCA_OPTIONS` content, and what the kernel would report back for it.
fn dry_run_output(units: RateUnits, payload: &[u8]) -> anyhow::Result<String> {
    Ok(format!("options {}\n{}", hex::encode(payload), render_options(payload, units)?))
}

async fn show(ctx: Context, request: DumpRequest, args: &ShowArgs) -> anyhow::Result<()> {
    let mut handle = connect()?;
    let objects = requests::dump(&mut handle, request).await.context("listing ceetm objects")?;

    for object in objects {
        println!("{}", describe(ctx, request, &args.dev, &object)?);

        if args.stats {
            if let Some(line) = stats_line(&object)? {
                println!("{line}");
            }
        }
    }

    Ok(())
}

/// One line per object, in the shape of `tc qdisc show`.
fn describe(
    ctx: Context,
    request: DumpRequest,
    dev: &str,
    object: &CeetmObject,
) -> anyhow::Result<String> {
    let parent = if object.parent == TcHandle::ROOT {
        "root".to_string()
    } else {
        format!("parent {}", format_handle(object.parent))
    };

    let mut line = format!(
        "{} ceetm {} dev {dev} {parent}",
        request.object,
        format_handle(object.handle)
    );

    let options = object.render_options(ctx.units)?;
    if !options.is_empty() {
        line.push(' ');
        line.push_str(&options);
    }

    Ok(line)
}

fn stats_line(object: &CeetmObject) -> anyhow::Result<Option<String>> {
    Ok(object.render_xstats()?.map(|xstats| format!(" {xstats}")))
}

fn device_index(dev: &str) -> anyhow::Result<i32> {
    let index =
        if_nametoindex(dev).ok_or_else(|| requests::Error::DeviceNotFound(dev.to_string()))?;
    tracing::debug!(dev, index = index.get(), "resolved device");

    Ok(index.get() as i32)
}

fn connect() -> anyhow::Result<rtnetlink::Handle> {
    let (connection, handle, _) =
        rtnetlink::new_connection().context("opening rtnetlink socket")?;
    tokio::spawn(connection);
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use ceetm_wire::{TcCeetmXstats, CEETM_KIND};
    use rtnetlink::packet_core::{NetlinkMessage, NetlinkPayload};
    use rtnetlink::packet_route::tc::{TcAttribute, TcMessage, TcXstats};
    use rtnetlink::packet_route::RouteNetlinkMessage;

    use super::*;

    const SI: Context = Context { units: RateUnits::Si, dry_run: false };

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    /// Serialize a request and parse it back the way a dump reply is parsed.
    fn kernel_object(mut nl_req: NetlinkMessage<RouteNetlinkMessage>) -> CeetmObject {
        nl_req.finalize();
        let mut buf = vec![0; nl_req.buffer_len()];
        nl_req.serialize(&mut buf);

        let parsed = NetlinkMessage::<RouteNetlinkMessage>::deserialize(&buf).unwrap();
        let msg = match parsed.payload {
            NetlinkPayload::InnerMessage(
                RouteNetlinkMessage::NewQueueDiscipline(msg)
                | RouteNetlinkMessage::NewTrafficClass(msg),
            ) => msg,
            other => panic!("unexpected payload {other:?}"),
        };

        CeetmObject::from_message(&msg).unwrap()
    }

    #[test]
    fn describes_a_root_qdisc() {
        let Parsed::Options(options) =
            parse_qdisc_options(&args("type root rate 1000mbit ceil 1000mbit overhead 24"))
                .unwrap()
        else {
            panic!("expected options")
        };
        let inner = QdiscRequestInner::new(3).with_handle(TcHandle::from(0x0001_0000));
        let object = kernel_object(QdiscCeetmRequest::new(inner, options).build());

        assert_eq!(
            describe(SI, DumpRequest::qdiscs(3), "eth0", &object).unwrap(),
            "qdisc ceetm 1: dev eth0 root type root shaped rate 1000Mbit ceil 1000Mbit overhead 24"
        );
    }

    #[test]
    fn describes_a_class_under_its_parent() {
        let Parsed::Options(options) = parse_class_options(&args("type wbfs weight 20")).unwrap()
        else {
            panic!("expected options")
        };
        let inner = QdiscRequestInner::new(3)
            .with_parent(TcHandle::from(0x0002_0000))
            .with_handle(TcHandle::from(0x0002_0001));
        let object = kernel_object(CeetmClassRequest::new(inner, options).build());

        assert_eq!(
            describe(SI, DumpRequest::classes(3), "eth0", &object).unwrap(),
            "class ceetm 2:1 dev eth0 parent 2: type wbfs weight 20"
        );
    }

    #[test]
    fn help_yields_usage() {
        assert_eq!(parse_qdisc_options(&args("help")).unwrap(), Parsed::Usage(qdisc::USAGE));
        assert_eq!(parse_class_options(&args("help")).unwrap(), Parsed::Usage(class::USAGE));
        assert!(parse_qdisc_options(&args("type root mpu 64")).is_err());
    }

    #[test]
    fn dry_run_prints_hex_and_rendering() {
        let Parsed::Options(options) = parse_qdisc_options(&args("type prio qcount 2")).unwrap()
        else {
            panic!("expected options")
        };
        let payload = encode_qdisc_options(&options);

        let output = dry_run_output(RateUnits::Si, &payload).unwrap();
        let (hex_line, rendered) = output.split_once('\n').unwrap();
        assert_eq!(hex_line, format!("options {}", hex::encode(&payload)));
        assert_eq!(rendered, "type prio unshaped qcount 2");
    }

    #[test]
    fn stats_are_indented() {
        let stats = TcCeetmXstats { enqueue: 4, drop: 1, dequeue: 3, deq_bytes: 180 };
        let mut msg = TcMessage::with_index(3);
        msg.attributes.push(TcAttribute::Kind(CEETM_KIND.to_string()));
        msg.attributes.push(TcAttribute::Xstats(TcXstats::Other(stats.to_bytes())));
        let object = CeetmObject::from_message(&msg).unwrap();

        assert_eq!(
            stats_line(&object).unwrap().as_deref(),
            Some(" enqueue 4 drop 1 dequeue 3 dequeue_bytes 180")
        );

        let bare = CeetmObject { xstats: None, ..object };
        assert_eq!(stats_line(&bare).unwrap(), None);
    }
}

use ceetm::handle::parse_handle;
use clap::{Args, Parser, Subcommand};
use rtnetlink::packet_route::tc::TcHandle;

/// Configure CEETM qdiscs and classes.
#[derive(Debug, Parser)]
#[command(name = "tc-ceetm", version)]
pub(crate) struct Cli {
    /// Log built requests and parsed options.
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,

    /// Print rates in IEC units (Mibit, Kibit).
    #[arg(long, global = true)]
    pub(crate) iec: bool,

    /// Parse and encode only, print the encoded options and send nothing.
    #[arg(long, global = true)]
    pub(crate) dry_run: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Manage CEETM qdiscs.
    #[command(subcommand)]
    Qdisc(QdiscCommand),

    /// Manage CEETM classes.
    #[command(subcommand)]
    Class(ClassCommand),
}

#[derive(Debug, Subcommand)]
pub(crate) enum QdiscCommand {
    /// Create a qdisc, failing if it exists.
    Add(QdiscArgs),
    /// Change an existing qdisc.
    Change(QdiscArgs),
    /// Create or replace a qdisc.
    Replace(QdiscArgs),
    /// Delete a qdisc.
    Del(QdiscTarget),
    /// List the CEETM qdiscs of a device.
    Show(ShowArgs),
}

#[derive(Debug, Subcommand)]
pub(crate) enum ClassCommand {
    /// Create a class, failing if it exists.
    Add(ClassArgs),
    /// Change an existing class.
    Change(ClassArgs),
    /// Create or replace a class.
    Replace(ClassArgs),
    /// Delete a class.
    Del(ClassTarget),
    /// List the CEETM classes of a device.
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub(crate) struct QdiscTarget {
    /// Network device.
    #[arg(long)]
    pub(crate) dev: String,

    /// Parent handle.
    #[arg(long, value_parser = parse_handle, default_value = "root")]
    pub(crate) parent: TcHandle,

    /// Qdisc handle, e.g. `1:`. The kernel picks one when omitted.
    #[arg(long, value_parser = parse_handle)]
    pub(crate) handle: Option<TcHandle>,
}

#[derive(Debug, Args)]
pub(crate) struct QdiscArgs {
    #[command(flatten)]
    pub(crate) target: QdiscTarget,

    /// CEETM qdisc options, `help` for usage.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub(crate) options: Vec<String>,
}

#[derive(Debug, Args)]
pub(crate) struct ClassTarget {
    /// Network device.
    #[arg(long)]
    pub(crate) dev: String,

    /// Parent handle.
    #[arg(long, value_parser = parse_handle, default_value = "root")]
    pub(crate) parent: TcHandle,

    /// Class id, e.g. `1:1`.
    #[arg(long, value_parser = parse_handle)]
    pub(crate) classid: TcHandle,
}

#[derive(Debug, Args)]
pub(crate) struct ClassArgs {
    /// Network device.
    #[arg(long)]
    pub(crate) dev: String,

    /// Parent qdisc or class.
    #[arg(long, value_parser = parse_handle)]
    pub(crate) parent: TcHandle,

    /// Class id, e.g. `1:1`.
    #[arg(long, value_parser = parse_handle)]
    pub(crate) classid: TcHandle,

    /// CEETM class options, `help` for usage.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub(crate) options: Vec<String>,
}

#[derive(Debug, Args)]
pub(crate) struct ShowArgs {
    /// Network device.
    #[arg(long)]
    pub(crate) dev: String,

    /// Also print extended statistics.
    #[arg(short, long)]
    pub(crate) stats: bool,
}

mod class;
mod qdisc;

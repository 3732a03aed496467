use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "rejviz")]
#[command(about = "virt-builder and virt-install wrappers with NIC configuration")]
pub struct Cli {
    /// Optional TOML config file (tool paths, libvirt URI, scratch dir, NIC separators).
    #[arg(long, env = "REJVIZ_CONFIG")]
    pub config: Option<PathBuf>,
    /// Log debug details of the NIC processing.
    #[arg(short, long)]
    pub verbose: bool,
    /// Print the rewritten command line instead of running it.
    #[arg(long)]
    pub dry_run: bool,
    /// Output format for --dry-run.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Run virt-builder, turning `--nic name=eth0;ipaddr=...` into generated ifcfg uploads.
    ///
    /// `--help` after the subcommand goes to virt-builder; use `rejviz help builder` for this text.
    #[command(disable_help_flag = true)]
    Builder(WrappedArgs),
    /// Run virt-install, turning `--nic-mappings` / `--auto-nic-mappings` into `--network` flags.
    ///
    /// `--help` after the subcommand goes to virt-install; use `rejviz help install` for this text.
    #[command(disable_help_flag = true)]
    Install(WrappedArgs),
}

#[derive(clap::Args, Debug)]
pub struct WrappedArgs {
    /// Arguments for the wrapped tool; anything not handled here is passed through.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

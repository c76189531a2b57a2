use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::Result;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::time::OffsetTime;

use crate::args::{ArrayTypeOption, ParallelArgs, RegionArgs, StoreArgs};
use crate::io::create_dir;
use crate::subcommands::{gather, list_regions, list_samples, scatter};

#[derive(Parser, Debug)]
#[command(author, version, about, styles=get_styles())]
pub struct Arguments {
    #[command(subcommand)]
    pub cmd: SubCommand,
}

#[derive(Args, Debug, Clone)]
pub struct LogAndVerbosity {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, default_value_t = 3)]
    pub verbosity: u8,

    /// A file path to save logs to
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,

    /// Silence all warning and info messages
    #[arg(long)]
    pub silent: bool,
}

#[derive(Subcommand, Debug)]
pub enum SubCommand {
    /// Split a VCF into regions and extract each region to .npy arrays with GNU parallel
    Scatter {
        /// Input VCF/BCF file
        #[arg(value_hint = clap::ValueHint::FilePath)]
        vcf: PathBuf,

        #[command(flatten)]
        region_args: RegionArgs,

        /// Directory for the per-region array files and the job manifest
        #[arg(short = 'o', long, default_value = "./", value_hint = clap::ValueHint::DirPath)]
        output_dir: PathBuf,

        /// Array types to extract, defaults to all
        #[arg(short = 'a', long, value_enum, value_delimiter = ',')]
        array_types: Vec<ArrayTypeOption>,

        /// Extraction command with {vcf}, {region}, {contig}, {start}, {stop}, {array_type}, {output} and {output_dir} fields
        #[arg(long, default_value = vcfh5_core::job::DEFAULT_TEMPLATE)]
        template: String,

        /// Extra arguments appended to every extraction command
        #[arg(long, allow_hyphen_values = true, num_args = 1.., value_terminator = ";")]
        extra_args: Vec<String>,

        #[command(flatten)]
        parallel_args: ParallelArgs,

        /// Do not run jobs whose output file already exists
        #[arg(long)]
        skip_existing: bool,

        /// Print the commands instead of running them
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        log_and_verbosity: LogAndVerbosity,
    },

    /// Concatenate per-region .npy arrays into HDF5 datasets
    Gather {
        /// Directory with the per-region array files
        #[arg(short = 'i', long, value_hint = clap::ValueHint::DirPath)]
        input_dir: PathBuf,

        /// The VCF the arrays were extracted from, sample names are stored from its header
        #[arg(long, value_hint = clap::ValueHint::FilePath)]
        vcf: Option<PathBuf>,

        /// File name prefix of the array files, defaults to the VCF file name
        #[arg(long)]
        prefix: Option<String>,

        /// Output HDF5 file
        #[arg(short = 'o', long, value_hint = clap::ValueHint::FilePath)]
        output: PathBuf,

        /// HDF5 group to write the datasets under
        #[arg(short = 'g', long, default_value = "/")]
        group: String,

        /// Array types to load, defaults to all
        #[arg(short = 'a', long, value_enum, value_delimiter = ',')]
        array_types: Vec<ArrayTypeOption>,

        #[command(flatten)]
        store_args: StoreArgs,

        /// Truncate the HDF5 file instead of appending to it
        #[arg(long)]
        overwrite: bool,

        /// Skip array files listed in the manifest that do not exist
        #[arg(long)]
        allow_missing: bool,

        /// Number of threads
        #[arg(short = 't', long, default_value_t = 8)]
        threads: usize,

        #[command(flatten)]
        log_and_verbosity: LogAndVerbosity,
    },

    /// List the regions a VCF would be split into
    Regions {
        /// Input VCF/BCF file
        #[arg(value_hint = clap::ValueHint::FilePath)]
        vcf: PathBuf,

        #[command(flatten)]
        region_args: RegionArgs,

        #[command(flatten)]
        log_and_verbosity: LogAndVerbosity,
    },

    /// List the sample names of a VCF
    Samples {
        /// Input VCF/BCF file
        #[arg(value_hint = clap::ValueHint::FilePath)]
        vcf: PathBuf,

        #[command(flatten)]
        log_and_verbosity: LogAndVerbosity,
    },
}

impl SubCommand {
    pub fn threads(&self) -> usize {
        match self {
            SubCommand::Gather { threads, .. } => *threads,
            _ => 1,
        }
    }

    #[rustfmt::skip]
    pub fn log_and_verbosity(&self) -> (u8, &Option<PathBuf>, bool) {
        match self {
            SubCommand::Scatter { log_and_verbosity, .. }
            | SubCommand::Gather { log_and_verbosity, .. }
            | SubCommand::Regions { log_and_verbosity, .. }
            | SubCommand::Samples { log_and_verbosity, .. }
            => (log_and_verbosity.verbosity, &log_and_verbosity.log_file, log_and_verbosity.silent),
        }
    }

    #[rustfmt::skip]
    pub fn output(&self) -> Option<PathBuf> {
        match self {
            SubCommand::Scatter { dry_run: true, .. } => None,
            SubCommand::Scatter { output_dir, .. } => Some(output_dir.clone()),
            SubCommand::Gather { output, .. } => output.parent().map(PathBuf::from),
            SubCommand::Regions { .. }
            | SubCommand::Samples { .. } => None,
        }
    }
}

pub fn run_args(args: Arguments) -> Result<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(args.cmd.threads())
        .build_global()?;

    let (verbosity, log_file, is_silent) = args.cmd.log_and_verbosity();

    let (level, wrtr, _guard) = init_tracing(verbosity, log_file, is_silent)?;

    let timer = time::format_description::parse("[hour]:[minute]:[second].[subsecond digits:3]")?;
    let time_offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    let timer = OffsetTime::new(time_offset, timer);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(wrtr)
        .with_timer(timer)
        .init();

    if let Some(output) = args.cmd.output() {
        if !output.as_os_str().is_empty() {
            create_dir(&output)?;
        }
    }

    run_cmd(args.cmd)?;

    Ok(())
}

#[rustfmt::skip]
pub fn run_cmd(cmd: SubCommand) -> Result<()> {
    match cmd {
        SubCommand::Scatter {
            vcf, region_args, output_dir, array_types, template, extra_args, parallel_args, skip_existing, dry_run, ..
        } => scatter::run(scatter::ScatterArgs {
                vcf, region_args, output_dir, array_types, template, extra_args, parallel_args, skip_existing, dry_run,
            })?,

        SubCommand::Gather {
            input_dir, vcf, prefix, output, group, array_types, store_args, overwrite, allow_missing, ..
        } => gather::run(gather::GatherArgs {
                input_dir, vcf, prefix, output, group, array_types, store_args, overwrite, allow_missing,
            })?,

        SubCommand::Regions { vcf, region_args, .. } => list_regions::run(vcf, region_args)?,
        SubCommand::Samples { vcf, .. } => list_samples::run(vcf)?,
    };
    Ok(())
}

pub fn init_tracing(
    verbosity: u8,
    log_file: &Option<PathBuf>,
    is_silent: bool,
) -> Result<(Level, NonBlocking, WorkerGuard)> {
    let level = if is_silent {
        Level::ERROR
    } else {
        match verbosity {
            0 | 1 => Level::ERROR,
            2 => Level::WARN,
            3 => Level::INFO,
            4 => Level::DEBUG,
            5..=u8::MAX => Level::TRACE,
        }
    };

    // Write logs to stderr or file
    let (wrtr, _guard) = match log_file {
        Some(path) => {
            let file = std::fs::File::options()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)?;
            tracing_appender::non_blocking(file)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    Ok((level, wrtr, _guard))
}

pub fn get_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .usage(
            anstyle::Style::new()
                .bold()
                .underline()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
        )
        .header(
            anstyle::Style::new()
                .bold()
                .underline()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
        )
        .literal(
            anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
        )
        .invalid(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
        )
        .error(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
        )
        .valid(
            anstyle::Style::new()
                .bold()
                .underline()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
        )
        .placeholder(
            anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))),
        )
}

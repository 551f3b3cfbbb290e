use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use locsync_cli::bilingual::{ExportArgs, run_export_command, run_import_command};
use locsync_cli::keys::{run_flatten_command, run_sort_command, run_unflatten_command};
use locsync::WriteOptions;
use locsync_cli::{CliConfig, ConvertOptions, run_convert_command};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to ./locsync.toml when present)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log more (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    commands: Commands,
}

// `--sort` / `--no-sort`; the last one given wins over `sort_keys` in the config.
#[derive(ClapArgs, Debug, Default)]
struct SortSwitch {
    /// Write keys in ascending order
    #[arg(long, overrides_with = "no_sort")]
    sort: bool,
    /// Keep the input key order even when the config sorts
    #[arg(long, overrides_with = "sort")]
    no_sort: bool,
}

impl SortSwitch {
    fn value(&self) -> Option<bool> {
        switch(self.sort, self.no_sort)
    }
}

#[derive(ClapArgs, Debug, Default)]
struct WriteSwitches {
    /// Keep sentence-like keys whole when nesting
    #[arg(long, overrides_with = "no_preserve_literal_dots")]
    preserve_literal_dots: bool,
    /// Split every key on dots even when the config preserves them
    #[arg(long, overrides_with = "preserve_literal_dots")]
    no_preserve_literal_dots: bool,
    #[command(flatten)]
    sort: SortSwitch,
}

fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert translation files between formats.
    Convert {
        /// Input files or glob patterns
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<String>,
        /// Output file, or directory when converting several files
        #[arg(short, long)]
        output: String,
        /// Input format (inferred from the extension by default)
        #[arg(long)]
        input_format: Option<String>,
        /// Output format (inferred from the extension by default)
        #[arg(long)]
        output_format: Option<String>,
        #[command(flatten)]
        switches: WriteSwitches,
    },

    /// Turn a nested file into flat dotted keys.
    Flatten {
        #[arg(short, long)]
        input: String,
        /// Output file (flat JSON on stdout by default)
        #[arg(short, long)]
        output: Option<String>,
        #[arg(long)]
        input_format: Option<String>,
        #[command(flatten)]
        sort: SortSwitch,
    },

    /// Rebuild a nested file from flat dotted keys.
    Unflatten {
        #[arg(short, long)]
        input: String,
        /// Output file (nested JSON on stdout by default)
        #[arg(short, long)]
        output: Option<String>,
        #[arg(long)]
        input_format: Option<String>,
        #[arg(long)]
        output_format: Option<String>,
        #[command(flatten)]
        switches: WriteSwitches,
    },

    /// Write a bilingual CSV sheet, folding mismatched plural families.
    Export {
        #[arg(long)]
        reference: String,
        #[arg(long)]
        target: String,
        #[arg(short, long)]
        output: String,
        /// Reference language (config or file name by default)
        #[arg(long)]
        reference_lang: Option<String>,
        /// Target language (config or file name by default)
        #[arg(long)]
        target_lang: Option<String>,
    },

    /// Read a bilingual CSV sheet back into translation files.
    Import {
        #[arg(short, long)]
        input: String,
        #[arg(long)]
        reference_out: Option<String>,
        #[arg(long)]
        target_out: String,
        #[command(flatten)]
        switches: WriteSwitches,
    },

    /// Sort the keys of a translation file.
    Sort {
        #[arg(short, long)]
        input: String,
        /// Output file (stdout by default)
        #[arg(short, long)]
        output: Option<String>,
        #[arg(long)]
        input_format: Option<String>,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn write_options(config: &CliConfig, switches: &WriteSwitches) -> WriteOptions {
    config.write_options(
        switch(switches.preserve_literal_dots, switches.no_preserve_literal_dots),
        switches.sort.value(),
    )
}

fn run(args: Args) -> Result<(), String> {
    let config = CliConfig::load(args.config.as_deref())?;

    match args.commands {
        Commands::Convert {
            input,
            output,
            input_format,
            output_format,
            switches,
        } => {
            let options = ConvertOptions {
                input_format,
                output_format: config.output_format(output_format.as_deref())?,
                write: write_options(&config, &switches),
            };
            run_convert_command(input, output, options)
        }
        Commands::Flatten {
            input,
            output,
            input_format,
            sort,
        } => run_flatten_command(
            &input,
            input_format.as_deref(),
            output.as_deref(),
            &config.write_options(None, sort.value()),
        ),
        Commands::Unflatten {
            input,
            output,
            input_format,
            output_format,
            switches,
        } => run_unflatten_command(
            &input,
            input_format.as_deref(),
            output.as_deref(),
            config.output_format(output_format.as_deref())?.as_ref(),
            &write_options(&config, &switches),
        ),
        Commands::Export {
            reference,
            target,
            output,
            reference_lang,
            target_lang,
        } => run_export_command(
            ExportArgs {
                reference: &reference,
                target: &target,
                output: &output,
                reference_language: reference_lang.as_deref(),
                target_language: target_lang.as_deref(),
            },
            &config,
        ),
        Commands::Import {
            input,
            reference_out,
            target_out,
            switches,
        } => run_import_command(
            &input,
            reference_out.as_deref(),
            &target_out,
            &write_options(&config, &switches),
        ),
        Commands::Sort {
            input,
            output,
            input_format,
        } => run_sort_command(&input, input_format.as_deref(), output.as_deref()),
    }
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

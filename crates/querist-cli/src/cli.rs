use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    /// Database to open, overriding the configured path
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub db: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a SQL script
    #[command(arg_required_else_help = true)]
    Exec {
        /// Script file, or `-` to read from stdin
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        file: String,

        /// Keep `--` comments in the script
        #[arg(required = false, long)]
        no_clean: bool,

        /// Run the script inside a single transaction
        #[arg(required = false, short, long)]
        transact: bool,
    },

    /// Print every row returned by a query
    #[command(arg_required_else_help = true)]
    #[clap(name = "all", visible_alias = "q")]
    All {
        /// Query to run
        #[arg(required = true)]
        sql: String,
    },

    /// Print the first row returned by a query
    #[command(arg_required_else_help = true)]
    Get {
        /// Query to run
        #[arg(required = true)]
        sql: String,
    },

    /// Run a statement and report the changes it made
    #[command(arg_required_else_help = true)]
    Run {
        /// Statement to run
        #[arg(required = true)]
        sql: String,
    },

    /// Count the rows of a table
    #[command(arg_required_else_help = true)]
    Count {
        /// Table to count
        #[arg(required = true)]
        table: String,
    },

    /// Print the resolved connection settings
    Env,

    /// Generate default config
    #[clap(name = "defconfig")]
    DefConfig,
}

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

    /// Connection profile to use
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate default config
    #[clap(name = "defconfig")]
    DefConfig,

    /// List the tables of the database
    #[clap(name = "tables", visible_alias = "ls")]
    Tables,

    /// Show the columns of a table
    #[command(arg_required_else_help = true)]
    Columns {
        /// Table to describe
        table: String,

        /// Show the backend's native type names
        #[arg(required = false, long)]
        raw: bool,
    },

    /// Select rows from a table
    #[command(arg_required_else_help = true)]
    Select {
        /// Table to read
        table: String,

        /// Columns to return (default all)
        #[arg(required = false, long, short = 'C', value_delimiter = ',')]
        columns: Vec<String>,

        /// Filter as `column operator value`, e.g. `Name = Ben`
        #[arg(required = false, long, short)]
        filter: Vec<String>,

        /// Join filters with OR instead of AND
        #[arg(required = false, long)]
        or: bool,

        /// Column to order by
        #[arg(required = false, long, short)]
        order: Option<String>,

        /// Order descending
        #[arg(required = false, long, requires = "order")]
        desc: bool,

        /// Maximum number of rows
        #[arg(required = false, long, short)]
        limit: Option<u64>,

        /// Print the statement instead of running it
        #[arg(required = false, long)]
        sql: bool,
    },

    /// Count rows of a table
    #[command(arg_required_else_help = true)]
    Count {
        /// Table to count
        table: String,

        /// Filter as `column operator value`
        #[arg(required = false, long, short)]
        filter: Vec<String>,

        /// Join filters with OR instead of AND
        #[arg(required = false, long)]
        or: bool,
    },

    /// Run a statement and print the rows it returns
    #[command(arg_required_else_help = true)]
    Query {
        /// SQL text
        sql: String,
    },

    /// Run a statement and print the affected row count
    #[command(arg_required_else_help = true)]
    Exec {
        /// SQL text
        sql: String,
    },

    /// Check whether a table, or the database itself, exists
    Exists {
        /// Table to look for
        table: Option<String>,
    },

    /// Create the configured database
    #[clap(name = "create-db")]
    CreateDb,

    /// Drop the configured database
    #[clap(name = "drop-db")]
    DropDb,

    /// Print a time based unique id
    Uid {
        /// Number of characters
        #[arg(required = false, long, short = 'n', default_value_t = 20)]
        length: usize,
    },

    /// Print a random UUID
    Uuid,
}

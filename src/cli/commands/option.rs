use clap::{ArgGroup, Args, Subcommand};

#[derive(Args)]
pub struct OptionCommands {
    #[command(subcommand)]
    pub command: OptionSubcommands,
}

#[derive(Subcommand)]
pub enum OptionSubcommands {
    /// List the options of the scope, one page at a time
    List {
        /// Page to show; out of range pages show the last one
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Options shown per page
        #[arg(long, default_value_t = 25)]
        per_page: u32,
        /// Comma-separated order fields, prefix with '-' for descending (e.g. '-updated_at,key')
        #[arg(short, long, default_value = "pk")]
        order: String,
    },
    /// Show the value of an option
    Get {
        /// Option key
        key: String,
    },
    /// Add a new option; fails if the key already exists
    Add(ValueArgs),
    /// Update an option, adding it if it does not exist
    Update(ValueArgs),
    /// Delete an option
    Delete {
        /// Option key
        key: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("mode").args(["json", "eval", "execute"])))]
pub struct ValueArgs {
    /// Option key
    pub key: String,

    /// Value, or the program to run with --execute
    pub value: String,

    /// Arguments passed to the program with --execute
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Parse the value as strict JSON
    #[arg(long)]
    pub json: bool,

    /// Evaluate the value as a literal (JSON plus True/False/None and 'single quotes')
    #[arg(long)]
    pub eval: bool,

    /// Run the value as a program and store its output
    #[arg(long)]
    pub execute: bool,

    /// Do not load this option with the autoload set (only applies when it is created)
    #[arg(long)]
    pub no_autoload: bool,
}

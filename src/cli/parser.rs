use clap::{Parser, Subcommand};

/// Command-line interface definition for repairtimer
#[derive(Parser)]
#[command(
    name = "repairtimer",
    version = env!("CARGO_PKG_VERSION"),
    about = "Work timer for repair tickets: one active timer per operator, committed as time entries",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Override the local timer state file
    #[arg(global = true, long = "state")]
    pub state: Option<String>,

    /// Act as this operator instead of the configured one
    #[arg(global = true, long = "operator")]
    pub operator: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(long = "editor", help = "Specify the editor to use")]
        editor: Option<String>,
    },

    /// Register or update a ticket
    Ticket {
        #[command(subcommand)]
        action: TicketAction,
    },

    /// Register or update an operator
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Start (or resume) the timer on a ticket
    Start {
        ticket: String,

        #[arg(long = "number", help = "Ticket number shown in status")]
        number: Option<String>,

        #[arg(long = "customer", help = "Customer name shown in status")]
        customer: Option<String>,

        #[arg(
            long = "force",
            help = "Start even if the ticket is flagged as running (privileged)"
        )]
        force: bool,
    },

    /// Pause the active timer
    Pause,

    /// Resume the paused timer
    Resume,

    /// Stop the active timer and log the time with work notes
    Stop {
        #[arg(long = "notes", short = 'n', help = "Description of the work performed")]
        notes: Option<String>,
    },

    /// Show the active timer, reconciled with the server flag
    Status { ticket: Option<String> },

    /// Rebuild the local timer from the server flag of a ticket
    Recover { ticket: String },

    /// Discard the local timer without touching the server
    ClearLocal,

    /// Force-clear a stuck server flag without logging time (privileged)
    ClearServer { ticket: String },

    /// List the time entries of a ticket
    Entries { ticket: String },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },
}

#[derive(Subcommand)]
pub enum TicketAction {
    Add {
        id: String,

        #[arg(long = "number")]
        number: Option<String>,

        #[arg(long = "customer")]
        customer: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    Add {
        name: String,

        #[arg(long = "privileged", help = "Allow forced clears and overrides")]
        privileged: bool,
    },
}

//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! Available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Enable debug output
//! - `--quiet` / `-q`: Minimal output; implies --no-interactive
//! - `--json`: Emit results as response envelopes
//! - `--runtime-path <PATH>`: Container runtime binary to invoke
//! - `--no-interactive`: Disable prompts

use clap::{Parser, Subcommand, ValueEnum};

use crate::model::Signal;

/// Stowage - a CLI companion and MCP server for the container runtime
#[derive(Parser, Debug)]
#[command(name = "stowage")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit results as JSON response envelopes
    #[arg(long, global = true)]
    pub json: bool,

    /// Container runtime binary to invoke (overrides config)
    #[arg(long, global = true, value_name = "PATH")]
    pub runtime_path: Option<String>,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Whether prompts may be shown.
    pub fn interactive(&self) -> bool {
        !(self.no_interactive || self.quiet)
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage containers
    #[command(subcommand)]
    Container(ContainerCommand),

    /// Manage images
    #[command(subcommand)]
    Image(ImageCommand),

    /// Manage the container system service
    #[command(subcommand)]
    System(SystemCommand),

    /// Manage registry sessions and defaults
    #[command(subcommand)]
    Registry(RegistryCommand),

    /// Manage the BuildKit builder
    #[command(subcommand)]
    Builder(BuilderCommand),

    /// Serve MCP tools to agents over stdio
    #[command(
        name = "mcp",
        long_about = "Serve MCP tools to agents over stdio.\n\n\
            Speaks JSON-RPC 2.0, one message per line: requests on stdin, \
            responses on stdout. Every container, image, system, registry, \
            and builder operation is exposed as a tool. Diagnostics go to \
            stderr so stdout stays clean for the protocol.",
        after_help = "\
EXAMPLE CLIENT CONFIGURATION:
    {
      \"mcpServers\": {
        \"stowage\": { \"command\": \"stowage\", \"args\": [\"mcp\"] }
      }
    }"
    )]
    Mcp,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Shells supported by the completion command.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Container subcommands.
#[derive(Subcommand, Debug)]
pub enum ContainerCommand {
    /// List all containers
    List,

    /// Show a container's full record
    Inspect {
        /// Container ID or name
        id: String,
    },

    /// Start a container
    Start {
        /// Container ID or name
        id: String,
    },

    /// Stop a container gracefully
    #[command(long_about = "Stop a container gracefully.\n\n\
        Sends the given signal (SIGTERM by default) and allows the container \
        --time seconds to exit before the runtime escalates.")]
    Stop {
        /// Container ID or name
        id: String,

        /// Signal to send (name or number)
        #[arg(long, default_value = "SIGTERM")]
        signal: Signal,

        /// Seconds to wait before escalation
        #[arg(long, default_value_t = 5)]
        time: u64,
    },

    /// Kill a container immediately
    Kill {
        /// Container ID or name
        id: String,

        /// Signal to send (name or number)
        #[arg(long, default_value = "SIGKILL")]
        signal: Signal,
    },

    /// Delete a container, stopping it first if running
    Delete {
        /// Container ID or name
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Fetch or follow a container's logs
    Logs {
        /// Container ID or name
        id: String,

        /// Stream new lines as they arrive
        #[arg(long, short = 'f')]
        follow: bool,

        /// Show only the last N lines
        #[arg(long, short = 'n', value_name = "N")]
        tail: Option<u64>,

        /// Show the boot log instead of the process log
        #[arg(long)]
        boot: bool,
    },

    /// Run a command inside a running container
    Exec {
        /// Container ID or name
        id: String,

        /// Working directory inside the container
        #[arg(long)]
        cwd: Option<String>,

        /// Environment variables (KEY=VALUE, repeatable)
        #[arg(long = "env", short = 'e', value_name = "KEY=VALUE")]
        env: Vec<String>,

        /// Keep stdin open
        #[arg(long, short = 'i')]
        interactive: bool,

        /// Allocate a pseudo-terminal
        #[arg(long, short = 't')]
        tty: bool,

        /// User to run as
        #[arg(long)]
        user: Option<String>,

        /// Command and arguments to run
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },

    /// Open a container's data directory in the file manager
    Reveal {
        /// Container ID or name
        id: String,
    },
}

/// Image subcommands.
#[derive(Subcommand, Debug)]
pub enum ImageCommand {
    /// List local images, aggregated per digest
    List,

    /// Pull an image from a registry
    Pull {
        /// Image reference (e.g. ubuntu:latest)
        reference: String,

        /// Platform to pull (e.g. linux/arm64)
        #[arg(long)]
        platform: Option<String>,

        /// Registry scheme (http or https)
        #[arg(long)]
        scheme: Option<String>,

        /// Disable progress updates
        #[arg(long)]
        disable_progress: bool,
    },

    /// Push an image to a registry
    Push {
        /// Image reference
        reference: String,

        /// Platform to push
        #[arg(long)]
        platform: Option<String>,

        /// Registry scheme (http or https)
        #[arg(long)]
        scheme: Option<String>,

        /// Disable progress updates
        #[arg(long)]
        disable_progress: bool,
    },

    /// Apply a new tag to an existing image
    Tag {
        /// Source reference
        source: String,

        /// Target reference
        target: String,
    },

    /// Delete images by reference, or all of them
    Delete {
        /// Image references
        references: Vec<String>,

        /// Delete all images
        #[arg(long, conflicts_with = "references")]
        all: bool,
    },

    /// Save an image to a tar archive
    Save {
        /// Image reference
        reference: String,

        /// Output path for the archive
        #[arg(long, short = 'o', value_name = "PATH")]
        output: String,

        /// Platform to save
        #[arg(long)]
        platform: Option<String>,
    },

    /// Load images from a tar archive
    Load {
        /// Archive to load
        #[arg(long, short = 'i', value_name = "PATH")]
        input: String,
    },

    /// Remove unreferenced images
    Prune,

    /// Show raw image metadata
    Inspect {
        /// Image references
        #[arg(required = true)]
        references: Vec<String>,
    },

    /// Build an image from a Dockerfile
    #[command(after_help = "\
EXAMPLES:
    # Build the current directory with a tag
    stowage image build -t myapp:dev .

    # Build a specific stage with build arguments
    stowage image build -t myapp:dev --target release --build-arg VERSION=1.2 .")]
    Build {
        /// Build context directory (defaults to .)
        context: Option<String>,

        /// Path to the Dockerfile
        #[arg(long, short = 'f', value_name = "PATH")]
        file: Option<String>,

        /// Tag for the built image
        #[arg(long, short = 't')]
        tag: Option<String>,

        /// Build arguments (KEY=VALUE, repeatable)
        #[arg(long = "build-arg", value_name = "KEY=VALUE")]
        build_args: Vec<String>,

        /// Labels for the image (KEY=VALUE, repeatable)
        #[arg(long = "label", value_name = "KEY=VALUE")]
        labels: Vec<String>,

        /// Do not use cached layers
        #[arg(long)]
        no_cache: bool,

        /// Target build stage
        #[arg(long)]
        target: Option<String>,

        /// CPUs for the build VM
        #[arg(long)]
        cpus: Option<String>,

        /// Memory for the build VM (e.g. 2048MB)
        #[arg(long)]
        memory: Option<String>,
    },
}

/// System subcommands.
#[derive(Subcommand, Debug)]
pub enum SystemCommand {
    /// Report whether the system service is running
    Status,

    /// Start the system service
    Start {
        /// Path to the runtime installation
        #[arg(long)]
        path: Option<String>,

        /// Install the kernel if needed
        #[arg(long, conflicts_with = "disable_kernel_install")]
        enable_kernel_install: bool,

        /// Never install the kernel
        #[arg(long)]
        disable_kernel_install: bool,
    },

    /// Stop the system service
    Stop {
        /// Launchd prefix of the services to stop
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Fetch or follow the system service's logs
    Logs {
        /// Time window to fetch (e.g. 5m, 1h)
        #[arg(long)]
        last: Option<String>,

        /// Stream new lines as they arrive
        #[arg(long, short = 'f')]
        follow: bool,
    },
}

/// Registry subcommands.
#[derive(Subcommand, Debug)]
pub enum RegistryCommand {
    /// Log in to a registry
    #[command(long_about = "Log in to a registry.\n\n\
        The password is read from the terminal with echo disabled, or from \
        stdin when --password-stdin is given. It is handed to the runtime \
        over stdin and never appears in an argument list. With --save the \
        credentials are also remembered in the local secret store.")]
    Login {
        /// Registry server (e.g. ghcr.io)
        server: String,

        /// Username
        #[arg(long, short = 'u')]
        username: Option<String>,

        /// Read the password from stdin
        #[arg(long)]
        password_stdin: bool,

        /// Registry scheme (http or https)
        #[arg(long)]
        scheme: Option<String>,

        /// Remember the credentials in the secret store
        #[arg(long)]
        save: bool,
    },

    /// Log out of a registry and forget stored credentials
    Logout {
        /// Registry server
        server: String,
    },

    /// Manage the default registry
    #[command(subcommand)]
    Default(RegistryDefaultCommand),
}

/// Default-registry subcommands.
#[derive(Subcommand, Debug)]
pub enum RegistryDefaultCommand {
    /// Set the default registry
    Set {
        /// Registry host
        host: String,

        /// Registry scheme (http or https)
        #[arg(long)]
        scheme: Option<String>,
    },

    /// Unset the default registry
    Unset,

    /// Show the default registry
    Inspect,
}

/// Builder subcommands.
#[derive(Subcommand, Debug)]
pub enum BuilderCommand {
    /// Start the builder
    Start {
        /// CPUs for the builder VM
        #[arg(long)]
        cpus: Option<String>,

        /// Memory for the builder VM (e.g. 2048MB)
        #[arg(long)]
        memory: Option<String>,
    },

    /// Stop the builder
    Stop,

    /// Show builder status
    Status,

    /// Delete the builder
    Delete {
        /// Delete even if the builder is running
        #[arg(long, short = 'f')]
        force: bool,
    },
}

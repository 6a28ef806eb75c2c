//! beanline CLI
//!
//! Command-line interface for a beanstalkd server.

use std::process::ExitCode;
use std::time::Duration;

use beanline::{Client, Config, Job, TransportMode, YamlValue};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

/// beanline CLI
#[derive(Parser, Debug)]
#[command(name = "beanline-cli")]
#[command(about = "CLI for beanstalkd work queues")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(short = 'H', long, default_value = "localhost")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "11300")]
    port: u16,

    /// Connect timeout in seconds
    #[arg(long, default_value = "60")]
    connect_timeout: u64,

    /// Read timeout in seconds (0 waits forever)
    #[arg(long, default_value = "0")]
    read_timeout: u64,

    /// Transport implementation
    #[arg(long, value_enum, default_value = "stream")]
    transport: Mode,

    /// Tube to use before running the command
    #[arg(short, long)]
    tube: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    Stream,
    Framed,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Put a job
    Put {
        /// Job body
        body: String,

        #[arg(long, default_value = "1024")]
        priority: u32,

        /// Delay in seconds
        #[arg(long, default_value = "0")]
        delay: u32,

        /// Time-to-run in seconds
        #[arg(long, default_value = "60")]
        ttr: u32,
    },

    /// Reserve a job, waiting at most `timeout` seconds
    Reserve {
        #[arg(long)]
        timeout: Option<u32>,
    },

    /// Delete a job
    Delete { id: u64 },

    /// Release a reserved job
    Release {
        id: u64,

        #[arg(long, default_value = "1024")]
        priority: u32,

        #[arg(long, default_value = "0")]
        delay: u32,
    },

    /// Bury a reserved job
    Bury {
        id: u64,

        #[arg(long, default_value = "1024")]
        priority: u32,
    },

    /// Show a job
    Peek { id: u64 },

    /// Kick up to `bound` buried or delayed jobs
    Kick { bound: u32 },

    /// Server, tube or job statistics
    Stats {
        #[arg(long, conflicts_with = "job")]
        of_tube: Option<String>,

        #[arg(long)]
        job: Option<u64>,
    },

    /// List existing tubes
    ListTubes,

    /// Pause a tube for `delay` seconds
    Pause { tube: String, delay: u32 },
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,beanline=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .host(&args.host)
        .port(args.port)
        .connect_timeout(Duration::from_secs(args.connect_timeout))
        .read_timeout(Some(Duration::from_secs(args.read_timeout)).filter(|t| !t.is_zero()))
        .mode(match args.transport {
            Mode::Stream => TransportMode::Stream,
            Mode::Framed => TransportMode::Framed,
        })
        .persistent(false)
        .build();

    match run(&config, args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{} ({:?})", e, e.kind());
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, args: Args) -> beanline::Result<()> {
    let mut client = Client::connect(config)?;

    if let Some(tube) = &args.tube {
        client.use_tube(tube)?;
        client.watch(tube)?;
    }

    match args.command {
        Commands::Put {
            body,
            priority,
            delay,
            ttr,
        } => {
            let put = client.put_with(body, priority, delay, ttr)?;
            println!("{} {}", put.status, put.id);
        }
        Commands::Reserve { timeout } => {
            let job = match timeout {
                Some(seconds) => client.reserve_with_timeout(seconds)?,
                None => client.reserve()?,
            };
            print_job(job.as_ref());
        }
        Commands::Delete { id } => println!("{}", found(client.delete(id)?)),
        Commands::Release {
            id,
            priority,
            delay,
        } => match client.release(id, priority, delay)? {
            Some(status) => println!("{}", status),
            None => println!("NOT_FOUND"),
        },
        Commands::Bury { id, priority } => println!("{}", found(client.bury(id, priority)?)),
        Commands::Peek { id } => print_job(client.peek(id)?.as_ref()),
        Commands::Kick { bound } => println!("KICKED {}", client.kick(bound)?),
        Commands::Stats { of_tube, job } => {
            let doc = match (of_tube, job) {
                (Some(tube), _) => client.stats_tube(&tube)?,
                (None, Some(id)) => client.stats_job(id)?,
                (None, None) => Some(client.stats()?),
            };
            match doc {
                Some(YamlValue::Mapping(map)) => {
                    for (key, value) in map {
                        println!("{}: {}", key, value);
                    }
                }
                Some(YamlValue::Sequence(items)) => items.iter().for_each(|i| println!("- {}", i)),
                None => println!("NOT_FOUND"),
            }
        }
        Commands::ListTubes => {
            for tube in client.list_tubes()? {
                println!("{}", tube);
            }
        }
        Commands::Pause { tube, delay } => {
            println!("{}", found(client.pause_tube(&tube, delay)?))
        }
    }

    if client.is_reconnected() {
        tracing::warn!("Connection was re-established during the command");
    }
    client.disconnect();
    Ok(())
}

fn found(ok: bool) -> &'static str {
    if ok {
        "OK"
    } else {
        "NOT_FOUND"
    }
}

fn print_job(job: Option<&Job>) {
    match job {
        Some(job) => println!("{} {}", job.id, String::from_utf8_lossy(&job.body)),
        None => println!("no job"),
    }
}

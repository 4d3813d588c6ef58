//! # Missive CLI
//!
//! Command-line interface for the message-relay print server.
//!
//! ## Usage
//!
//! ```bash
//! # Run the listener and the processing loop
//! missive serve --config missive.toml
//!
//! # Same, logging printer calls instead of printing
//! missive serve --dry-run
//!
//! # Submit a message
//! missive send --api-key change-me --sender Alice --text "<b>Hello</b>"
//!
//! # Show the actions a message renders to
//! missive preview --text "<center>Hi</center> http://example.com"
//!
//! # Inspect and manage the queue
//! missive queue status
//! missive queue pause
//!
//! # List available templates
//! missive templates
//! ```

use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use chrono::Local;
use tracing::{error, info};

use missive::{
    Message, MissiveConfig, MissiveError, QueueStore, SerialTransport,
    action,
    client::{self, Client},
    markup,
    printer::EscPosPrinter,
    server::{self, Submission},
    sink::{LogSink, PrinterSink},
    template::{self, TemplateRegistry},
    worker::Worker,
};

/// Missive - Message-relay receipt print server
#[derive(Parser, Debug)]
#[command(name = "missive")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ./missive.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Accept submissions and print queued messages
    Serve {
        /// Log printer calls instead of opening the device
        #[arg(long)]
        dry_run: bool,
    },

    /// Submit a message to a running server
    Send {
        /// Server host (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Server port (defaults to server.port)
        #[arg(long)]
        port: Option<u16>,

        #[arg(long)]
        api_key: Option<String>,

        #[arg(long)]
        sender: Option<String>,

        /// Message body, may contain markup
        #[arg(long)]
        text: Option<String>,

        /// Image file to attach
        #[arg(long, value_name = "FILE")]
        image: Option<PathBuf>,

        /// Template text used for this message only
        #[arg(long)]
        custom_template: Option<String>,

        /// Do not cut after this message
        #[arg(long)]
        no_cut: bool,
    },

    /// Render a message and show the resulting actions
    Preview {
        #[arg(long)]
        text: String,

        #[arg(long)]
        sender: Option<String>,

        /// Template name (defaults to worker.template)
        #[arg(long)]
        template: Option<String>,

        /// Also write the ESC/POS bytes to this file
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Inspect and manage the queue
    Queue {
        #[command(subcommand)]
        action: QueueAction,
    },

    /// List available templates and markup tags
    Templates,
}

#[derive(Subcommand, Debug)]
enum QueueAction {
    /// List queued messages, oldest first
    List,
    /// Delete every queued message and its image
    Clear,
    /// Stop printing (messages keep queueing)
    Pause,
    /// Resume printing
    Resume,
    /// Show the processing flag and queue length
    Status,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), MissiveError> {
    let cli = Cli::parse();
    let config = MissiveConfig::load(cli.config.as_deref())?;
    init_tracing(&config.logging.level);

    match cli.command {
        Commands::Serve { dry_run } => serve(config, dry_run),
        Commands::Send {
            host,
            port,
            api_key,
            sender,
            text,
            image,
            custom_template,
            no_cut,
        } => {
            let submission = Submission {
                api_key,
                sender,
                text,
                dt_sent: Some(Local::now().naive_local()),
                image: image.as_deref().map(client::encode_image_file).transpose()?,
                cut: Some(!no_cut),
                custom_template,
            };
            let client = Client::new(
                host.as_deref().unwrap_or(&config.server.host),
                port.unwrap_or(config.server.port),
            );

            let runtime = tokio::runtime::Runtime::new()?;
            let reply = runtime.block_on(client.send(&submission))?;
            println!("{}", reply);
            Ok(())
        }
        Commands::Preview {
            text,
            sender,
            template,
            output,
        } => preview(&config, text, sender, template, output.as_deref()),
        Commands::Queue { action } => queue(&config, action),
        Commands::Templates => {
            let registry = load_templates(&config)?;
            println!("Available templates:");
            for name in registry.names() {
                println!("  {}", name);
            }
            println!("Markup tags:");
            println!("  {}", markup::list_tags().join(" "));
            Ok(())
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("missive={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .init();
}

fn load_templates(config: &MissiveConfig) -> Result<TemplateRegistry, MissiveError> {
    match &config.worker.template_dir {
        Some(dir) => TemplateRegistry::with_dir(dir),
        None => Ok(TemplateRegistry::builtin()),
    }
}

fn open_printer(config: &MissiveConfig) -> Result<Box<dyn PrinterSink + Send>, MissiveError> {
    let transport = SerialTransport::open(&config.printer.device, config.printer.baud)?;
    let printer =
        EscPosPrinter::open(transport, config.printer_profile()?, config.printer.qr_size)?;
    info!(device = %config.printer.device, baud = config.printer.baud, "printer opened");
    Ok(Box::new(printer))
}

fn serve(config: MissiveConfig, dry_run: bool) -> Result<(), MissiveError> {
    let store = QueueStore::open(&config.storage.data_dir)?;
    let registry = load_templates(&config)?;
    let template = registry.get(&config.worker.template)?.to_string();

    let sink: Box<dyn PrinterSink + Send> = if dry_run {
        info!("dry run, printer output is logged only");
        Box::new(LogSink)
    } else {
        open_printer(&config)?
    };

    let mut worker = Worker::new(store.clone(), sink, template, config.render_options())
        .with_schedule(config.worker.schedule);
    let poll_interval = config.worker.poll_interval();

    let shutdown = Arc::new(AtomicBool::new(false));
    let worker_thread = {
        let shutdown = Arc::clone(&shutdown);
        thread::Builder::new()
            .name("missive-worker".to_string())
            .spawn(move || worker.run(&shutdown, poll_interval))?
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(async {
        let listener = server::bind(&config.server).await?;
        server::serve(listener, config.ingest_state(store), async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "cannot listen for ctrl-c");
            }
        })
        .await;
        Ok::<(), MissiveError>(())
    });

    shutdown.store(true, Ordering::Relaxed);
    if worker_thread.join().is_err() {
        error!("processing loop panicked");
    }
    result
}

fn preview(
    config: &MissiveConfig,
    text: String,
    sender: Option<String>,
    template: Option<String>,
    output: Option<&Path>,
) -> Result<(), MissiveError> {
    let registry = load_templates(config)?;
    let template = registry.get(template.as_deref().unwrap_or(&config.worker.template))?;

    let mut message = Message::new(text).with_received(Local::now().naive_local());
    message.sender = sender;
    let actions = template::message_actions(&mut message, template, &config.render_options());

    for action in &actions {
        println!("{:<12} {:?}", action.description, action.operation);
    }

    if let Some(path) = output {
        let file = File::create(path)?;
        let mut printer =
            EscPosPrinter::open(file, config.printer_profile()?, config.printer.qr_size)?;
        action::replay(&actions, &mut printer)?;
        println!("Wrote ESC/POS to {}", path.display());
    }
    Ok(())
}

fn queue(config: &MissiveConfig, action: QueueAction) -> Result<(), MissiveError> {
    let store = QueueStore::open(&config.storage.data_dir)?;

    match action {
        QueueAction::List => {
            let mut messages = store.all()?;
            messages.sort_by(|a, b| a.dt_received.cmp(&b.dt_received).then(a.id.cmp(&b.id)));
            for message in messages {
                let received = message
                    .dt_received
                    .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string());
                let preview: String = message.text.chars().take(40).collect();
                println!(
                    "{}  {}  {:<12}  {}",
                    message.id,
                    received,
                    message.sender_or_unknown(),
                    preview.replace('\n', " ")
                );
            }
        }
        QueueAction::Clear => {
            let mut removed = 0;
            for message in store.all()? {
                if store.delete(&message.id)? {
                    removed += 1;
                }
            }
            println!("Removed {} message(s)", removed);
        }
        QueueAction::Pause => {
            store.set_processing_enabled(false)?;
            println!("Processing paused");
        }
        QueueAction::Resume => {
            store.set_processing_enabled(true)?;
            println!("Processing resumed");
        }
        QueueAction::Status => {
            let state = if store.processing_enabled()? {
                "enabled"
            } else {
                "paused"
            };
            println!("Processing: {}", state);
            println!("Queued:     {}", store.len()?);
        }
    }
    Ok(())
}

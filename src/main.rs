use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use pgoutput_wire::capture::{read_capture_file, CaptureReader};
use pgoutput_wire::config::OutputFormat;
use pgoutput_wire::envelope::PrimaryKeepaliveMessage;
use pgoutput_wire::lsn::{format_lsn, pg_timestamp_to_datetime};
use pgoutput_wire::{Config, Event, PgOutputDecoder, ReplicationMessage};
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "pgoutput-dump")]
#[command(about = "Decode captured PostgreSQL logical replication frames", long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Enable JSON output for logs")]
    json_logs: bool,

    #[arg(short, long, help = "Verbose logging")]
    verbose: bool,

    #[arg(long, help = "Print the START_REPLICATION plugin options and exit")]
    print_options: bool,

    #[arg(value_name = "CAPTURE_FILE", required_unless_present = "print_options")]
    capture: Option<PathBuf>,
}

#[derive(Serialize)]
#[serde(tag = "frame", rename_all = "snake_case")]
enum FrameRecord<'a> {
    Keepalive {
        index: usize,
        server_wal_end: String,
        sent_at: Option<DateTime<Utc>>,
        reply_requested: bool,
    },
    XlogData {
        index: usize,
        wal_start: String,
        wal_end: String,
        sent_at: Option<DateTime<Utc>>,
        event: &'a Event,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(args.json_logs, args.verbose);

    let config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Config::from_file(path).map_err(|e| {
                error!("Failed to load configuration: {}", e);
                e
            })?
        }
        None => Config::default(),
    };
    info!(protocol = %config.protocol, "Configuration loaded");

    let decoder = PgOutputDecoder::new(config.protocol);

    if args.print_options {
        println!("{}", decoder.option_string());
        return Ok(());
    }

    let Some(capture_path) = args.capture else {
        anyhow::bail!("no capture file given");
    };
    let data = read_capture_file(&capture_path)
        .await
        .with_context(|| format!("reading capture file {:?}", capture_path))?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut decoded = 0usize;

    for (index, frame) in CaptureReader::new(&data).enumerate() {
        let message = frame
            .and_then(|frame| decoder.decode_frame(frame))
            .map_err(|e| {
                error!(frame = index, "Failed to decode frame: {}", e);
                e
            })
            .with_context(|| format!("frame {}", index))?;

        if let ReplicationMessage::Keepalive(_) = message {
            if !config.output.include_keepalives {
                debug!(frame = index, "Skipping keepalive");
                continue;
            }
        }

        write_record(&mut out, &config, index, &message)
            .with_context(|| format!("writing frame {}", index))?;
        decoded += 1;
    }

    out.flush()?;
    info!("Decoded {} frames from {:?}", decoded, capture_path);
    Ok(())
}

fn write_record(
    out: &mut impl Write,
    config: &Config,
    index: usize,
    message: &ReplicationMessage<'_>,
) -> pgoutput_wire::Result<()> {
    match config.output.format {
        OutputFormat::Text => match message {
            ReplicationMessage::Keepalive(keepalive) => writeln!(out, "{:>6} {}", index, keepalive)?,
            ReplicationMessage::Event { header, event } => writeln!(
                out,
                "{:>6} {} {}",
                index,
                format_lsn(header.message_wal_start),
                event
            )?,
        },
        OutputFormat::Json => {
            let record = to_record(index, message);
            if config.output.pretty {
                serde_json::to_writer_pretty(&mut *out, &record)?;
            } else {
                serde_json::to_writer(&mut *out, &record)?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

fn to_record<'a>(index: usize, message: &'a ReplicationMessage<'_>) -> FrameRecord<'a> {
    match message {
        ReplicationMessage::Keepalive(PrimaryKeepaliveMessage {
            server_wal_end,
            sent_at_unix_timestamp,
            reply_requested,
        }) => FrameRecord::Keepalive {
            index,
            server_wal_end: format_lsn(*server_wal_end),
            sent_at: pg_timestamp_to_datetime(*sent_at_unix_timestamp),
            reply_requested: *reply_requested,
        },
        ReplicationMessage::Event { header, event } => FrameRecord::XlogData {
            index,
            wal_start: format_lsn(header.message_wal_start),
            wal_end: format_lsn(header.server_wal_end),
            sent_at: pg_timestamp_to_datetime(header.sent_at_unix_timestamp),
            event,
        },
    }
}

fn init_logging(json: bool, verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("pgoutput_wire=trace,pgoutput_dump=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("pgoutput_wire=info,pgoutput_dump=info,warn"))
    };

    // stdout carries the decoded frames
    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

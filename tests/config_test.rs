mod common;

use common::{MessageBuilder, MockValue};
use pgoutput_wire::capture::{read_capture_file, write_capture_file, CaptureReader};
use pgoutput_wire::config::OutputFormat;
use pgoutput_wire::{Config, Error, PgOutputDecoder, ReplicationMessage, Streaming};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_config_file() {
    let file = write_config(
        r#"
[protocol]
binary = false
messages = true
streaming = "parallel"
two_phase = true

[output]
format = "text"
"#,
    );

    let config = Config::from_file(file.path()).unwrap();
    assert!(config.protocol.messages);
    assert!(config.protocol.two_phase);
    assert!(!config.protocol.origin);
    assert_eq!(config.protocol.streaming, Streaming::Parallel);
    assert_eq!(config.output.format, OutputFormat::Text);
    assert!(!config.output.pretty);
}

#[test]
fn test_empty_sections_use_defaults() {
    let file = write_config("[output]\npretty = true\n");
    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.protocol, Default::default());
    assert_eq!(config.output.format, OutputFormat::Json);
}

#[test]
fn test_invalid_config_is_rejected() {
    let file = write_config("[protocol]\nstreaming = \"sometimes\"\n");
    assert!(matches!(Config::from_file(file.path()), Err(Error::Config(_))));

    let file = write_config("[output]\nformat = \"text\"\npretty = true\n");
    assert!(matches!(Config::from_file(file.path()), Err(Error::Config(_))));

    assert!(Config::from_file("/nonexistent/pgoutput.toml").is_err());
}

#[test]
fn test_environment_override() {
    let file = write_config("[output]\ninclude_keepalives = true\n");

    std::env::set_var("PGOUTPUT_OUTPUT__INCLUDE_KEEPALIVES", "false");
    let result = Config::from_file(file.path());
    std::env::remove_var("PGOUTPUT_OUTPUT__INCLUDE_KEEPALIVES");

    assert!(!result.unwrap().output.include_keepalives);
}

#[tokio::test]
async fn test_capture_file_decodes_with_configured_options() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dump.toml");
    std::fs::write(&config_path, "[protocol]\nstreaming = \"on\"\n").unwrap();
    let capture_path = temp_dir.path().join("session.capture");

    let builder = MessageBuilder::new().with_streaming_xid(12);
    let frames = vec![
        builder.keepalive(false),
        builder.xlogdata(&builder.stream_start(12, true)),
        builder.xlogdata(&builder.insert_message(1, &[MockValue::Text("a")])),
        builder.xlogdata(&builder.stream_stop()),
    ];
    write_capture_file(&capture_path, &frames).await.unwrap();

    let config = Config::from_file(&config_path).unwrap();
    let decoder = PgOutputDecoder::new(config.protocol);
    let data = read_capture_file(&capture_path).await.unwrap();

    let mut keepalives = 0;
    let mut events = Vec::new();
    for frame in CaptureReader::new(&data) {
        match decoder.decode_frame(frame.unwrap()).unwrap() {
            ReplicationMessage::Keepalive(_) => keepalives += 1,
            ReplicationMessage::Event { event, .. } => events.push(event),
        }
    }

    assert_eq!(keepalives, 1);
    assert_eq!(events.len(), 3);
    assert_eq!(events[1].transaction_id(), Some(12));
}

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::thread;

use rhino_logger::context::ContextKey;
use rhino_logger::sink::MemorySink;
use rhino_logger::{Context, Field, Logger, LoggerBuilder, LoggerConfig, LoggerError, SinkPlan};
use serde_json::Value;

fn console_logger(builder: LoggerBuilder) -> (Logger, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let logger = builder.console_sink(sink.clone()).build().unwrap();
    (logger, sink)
}

fn file_records(path: &Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn exit_by_panic(code: i32) -> ! {
    panic!("exit requested with code {code}")
}

#[test]
fn development_console_record_carries_identity() {
    let (logger, sink) = console_logger(LoggerBuilder::development());
    logger.info("hello", &[Field::string("k", "v")]);

    let records = sink.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record["level"], "info");
    assert_eq!(record["message"], "hello");
    assert_eq!(record["k"], "v");
    assert_eq!(record["env"], "development");
    assert_eq!(record["service"], "rhino_logger");
    assert_eq!(record["version"], "v1.0.0");
    assert!(record["time"].is_string());
    assert!(record["caller"]
        .as_str()
        .unwrap()
        .starts_with("tests/scenarios.rs:"));
}

#[test]
fn record_keys_are_ordered() {
    let (logger, sink) = console_logger(LoggerBuilder::development());
    logger.info("ordered", &[Field::int("n", 1)]);

    let line = sink.lines().remove(0);
    let keys: Vec<String> = serde_json::from_str::<serde_json::Map<String, Value>>(&line)
        .unwrap()
        .keys()
        .cloned()
        .collect();
    assert_eq!(
        keys,
        ["level", "time", "caller", "message", "env", "service", "version", "n"]
    );
}

#[test]
fn production_plain_file_creates_directories_and_skips_console() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs").join("run.log");
    assert!(!path.parent().unwrap().exists());

    let (logger, console) = console_logger(
        LoggerBuilder::new()
            .env("production")
            .log_to_file(true)
            .rotate(false)
            .rotate_path(&path),
    );
    assert!(path.exists());
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
    assert_eq!(
        logger.sink_plan(),
        &SinkPlan::PlainFile { path: path.clone() }
    );

    logger.info("stored", &[]);
    logger.debug("below threshold", &[]);
    logger.sync().unwrap();

    let records = file_records(&path);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["message"], "stored");
    assert_eq!(records[0]["env"], "production");
    assert!(console.is_empty());
}

#[test]
fn development_rotation_writes_file_and_console() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.log");

    let (logger, console) = console_logger(
        LoggerBuilder::development()
            .log_to_file(true)
            .rotate(true)
            .rotate_path(&path),
    );
    logger.warn("x", &[]);

    let on_disk = file_records(&path);
    assert_eq!(on_disk.len(), 1);
    assert_eq!(on_disk[0]["message"], "x");
    assert_eq!(on_disk[0]["level"], "warn");

    let on_console = console.records();
    assert_eq!(on_console.len(), 1);
    assert_eq!(on_console[0]["message"], "x");
}

#[test]
fn development_file_without_rotation_stays_on_console() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.log");

    let (logger, console) = console_logger(
        LoggerBuilder::development()
            .log_to_file(true)
            .rotate(false)
            .rotate_path(&path),
    );
    logger.info("console only", &[]);

    assert_eq!(logger.sink_plan(), &SinkPlan::Console);
    assert!(!path.exists());
    assert_eq!(console.len(), 1);
}

#[test]
fn unknown_environment_fails_construction() {
    let err = LoggerBuilder::new().env("staging").build().unwrap_err();
    assert!(matches!(err, LoggerError::Config(_)));
    assert!(err.to_string().contains("staging"));
}

#[test]
fn request_id_only_context() {
    let (logger, sink) = console_logger(LoggerBuilder::new());
    let child = logger.with_context(&Context::new().with_request_id("r1"));
    child.info("scoped", &[]);

    let record = &sink.records()[0];
    assert_eq!(record["request_id"], "r1");
    assert!(record.get("user_id").is_none());
}

#[test]
fn non_string_context_value_is_omitted() {
    let (logger, sink) = console_logger(LoggerBuilder::new());
    let numeric: ContextKey<u64> = ContextKey::new("request_id");

    logger.info_ctx(&Context::new().with_value(&numeric, 42), "typed", &[]);
    logger.info_ctx(&Context::new(), "absent", &[]);

    let records = sink.records();
    let mut trimmed: Vec<Value> = records
        .into_iter()
        .map(|mut r| {
            r.as_object_mut().unwrap().remove("time");
            r.as_object_mut().unwrap().remove("message");
            r.as_object_mut().unwrap().remove("caller");
            r
        })
        .collect();
    assert!(trimmed[0].get("request_id").is_none());
    assert_eq!(trimmed.pop(), trimmed.pop());
}

#[test]
fn derivation_never_touches_parent() {
    let (logger, sink) = console_logger(LoggerBuilder::new());
    let _child = logger
        .with(&[Field::string("component", "db")])
        .with_context(&Context::new().with_user_id("u7"));

    logger.info("parent", &[]);

    let record = &sink.records()[0];
    assert!(record.get("component").is_none());
    assert!(record.get("user_id").is_none());
}

#[test]
fn context_extraction_is_idempotent() {
    let (logger, sink) = console_logger(LoggerBuilder::new());
    let ctx = Context::new().with_request_id("r1").with_user_id("u1");

    let first = logger.with_context(&ctx);
    let second = logger.with_context(&ctx);
    assert_eq!(first.fields(), second.fields());

    for handle in [&first, &second] {
        handle.info("same", &[]);
    }

    let mut records = sink.records();
    for record in &mut records {
        record.as_object_mut().unwrap().remove("time");
    }
    assert_eq!(records[0], records[1]);
}

#[test]
fn error_field_follows_error_argument() {
    let (logger, sink) = console_logger(LoggerBuilder::new());
    let cause = std::io::Error::new(std::io::ErrorKind::NotFound, "config missing");

    logger.error("with cause", Some(&cause), &[]);
    logger.error("without cause", None, &[]);

    let records = sink.records();
    assert_eq!(records[0]["error"], "config missing");
    assert!(records[0]["stacktrace"].is_string());
    assert!(records[1].get("error").is_none());
}

#[test]
fn production_durations_are_seconds() {
    let (logger, sink) = console_logger(LoggerBuilder::new().env("production"));
    logger.info(
        "timed",
        &[Field::duration("took", std::time::Duration::from_millis(1500))],
    );

    assert_eq!(sink.records()[0]["took"], 1.5);
}

#[test]
fn fatal_emits_then_exits() {
    let (logger, sink) = console_logger(LoggerBuilder::new().on_fatal(exit_by_panic));

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        logger.fatal("boom", &[Field::int("code", 7)]);
    }));

    assert!(outcome.is_err());
    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["level"], "fatal");
    assert_eq!(records[0]["message"], "boom");
    assert_eq!(records[0]["code"], 7);
    assert!(records[0]["stacktrace"].is_string());
}

#[test]
fn toml_configuration_builds_logger() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("svc.log");
    let config = LoggerConfig::from_toml_str(&format!(
        "env = \"production\"\nservice_name = \"billing\"\nversion_name = \"\"\nlog_to_file = true\nrotate = true\nrotate_path = {:?}\n",
        path.display().to_string()
    ))
    .unwrap();

    let logger = Logger::new(config).unwrap();
    logger.info("from toml", &[]);

    let records = file_records(&path);
    assert_eq!(records[0]["service"], "billing");
    assert!(records[0].get("version").is_none());
    assert!(matches!(logger.sink_plan(), SinkPlan::RotatingFile(_)));
}

#[test]
fn fatal_ctx_carries_context_fields() {
    let (logger, sink) = console_logger(LoggerBuilder::new().on_fatal(exit_by_panic));
    let ctx = Context::new().with_request_id("r-fatal").with_user_id("u-fatal");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        logger.fatal_ctx(&ctx, "unrecoverable", &[]);
    }));

    assert!(outcome.is_err());
    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["level"], "fatal");
    assert_eq!(records[0]["request_id"], "r-fatal");
    assert_eq!(records[0]["user_id"], "u-fatal");
}

#[test]
fn fields_named_like_fixed_keys_are_kept_apart() {
    let (logger, sink) = console_logger(LoggerBuilder::new());
    logger.info(
        "order placed",
        &[
            Field::string("message", "user payload"),
            Field::string("level", "custom"),
        ],
    );

    let record = &sink.records()[0];
    assert_eq!(record["level"], "info");
    assert_eq!(record["message"], "order placed");
    assert_eq!(record["fields.message"], "user payload");
    assert_eq!(record["fields.level"], "custom");
}

#[test]
fn concurrent_handles_write_whole_records() {
    const THREADS: u64 = 8;
    const PER_THREAD: u64 = 50;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.log");
    let logger = LoggerBuilder::new()
        .env("production")
        .log_to_file(true)
        .rotate(false)
        .rotate_path(&path)
        .build()
        .unwrap();

    let workers: Vec<_> = (0..THREADS)
        .map(|worker| {
            let handle = logger.with(&[Field::uint("worker", worker)]);
            thread::spawn(move || {
                for seq in 0..PER_THREAD {
                    handle.info(
                        "tick",
                        &[Field::uint("seq", seq), Field::string("pad", "x".repeat(256))],
                    );
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    logger.sync().unwrap();

    let records = file_records(&path);
    assert_eq!(records.len() as u64, THREADS * PER_THREAD);
    for worker in 0..THREADS {
        let seqs: Vec<u64> = records
            .iter()
            .filter(|r| r["worker"] == worker)
            .map(|r| r["seq"].as_u64().unwrap())
            .collect();
        assert_eq!(seqs, (0..PER_THREAD).collect::<Vec<_>>());
    }
}

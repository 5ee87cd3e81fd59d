use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use lgs_config::Level;
use lgs_runtime::{
    EngineBackend, Logger, delete_logger_in_file, from_file, from_file_and_override_with_tag_replacement,
    from_file_with_override, from_file_with_tag_replacement, from_str, registry, save_logger_to_file,
};

fn write(path: &Path, text: &str) {
    fs::write(path, text).unwrap();
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

// ---------------------------------------------------------------------------
// Building from files
// ---------------------------------------------------------------------------

#[test]
fn file_sink_with_parent_dir_receives_records() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("nested/deeper/app.log");
    let conf = dir.path().join("log.toml");
    write(
        &conf,
        &format!(
            r#"
[[sink]]
name = "file"
type = "basic_file_sink_mt"
filename = '{}'
create_parent_dir = true
truncate = true

[[pattern]]
name = "bare"
value = "%L %v"

[[logger]]
name = "it_file_sink"
sinks = ["file"]
pattern = "bare"
level = "debug"
"#,
            log.display()
        ),
    );

    from_file(&conf).unwrap();
    let logger = registry::get("it_file_sink").unwrap();
    assert_eq!(logger.level(), Level::Debug);
    logger.trace("dropped");
    logger.debug("kept");
    logger.flush();

    assert_eq!(read(&log), "D kept\n");
}

#[test]
fn dist_sink_shares_leaf_instances() {
    let dir = tempfile::tempdir().unwrap();
    let text = format!(
        r#"
[[sink]]
name = "fanout"
type = "dist_sink_mt"
sinks = ["one", "two"]

[[sink]]
name = "one"
type = "basic_file_sink_st"
filename = '{}'

[[sink]]
name = "two"
type = "basic_file_sink_st"
filename = '{}'
level = "err"

[[logger]]
name = "it_dist"
sinks = ["fanout", "one"]
pattern = "p"

[[pattern]]
name = "p"
value = "%v"
"#,
        dir.path().join("one.log").display(),
        dir.path().join("two.log").display()
    );

    let mut backend = EngineBackend::new();
    lgs_core::build_from_text(&text, &mut backend).unwrap();
    assert_eq!(backend.forward_names("fanout"), ["one", "two"]);

    let fanout = backend.sink("fanout").unwrap();
    let one = backend.sink("one").unwrap();
    assert!(Arc::ptr_eq(&fanout.forwards()[0], one));

    let logger = registry::get("it_dist").unwrap();
    assert!(Arc::ptr_eq(&logger.sinks()[1], one));
    logger.info("info line");
    logger.error("error line");
    logger.flush();

    // "one" is reached directly and through the fan-out
    assert_eq!(
        read(&dir.path().join("one.log")),
        "info line\ninfo line\nerror line\nerror line\n"
    );
    assert_eq!(read(&dir.path().join("two.log")), "error line\n");
}

#[test]
fn cycle_is_reported_not_followed() {
    let err = from_str(
        r#"
[[sink]]
name = "a"
type = "dist_sink_st"
sinks = ["b"]

[[sink]]
name = "b"
type = "dist_sink_st"
sinks = ["a"]

[[logger]]
name = "it_cycle"
sinks = ["a"]
"#,
    )
    .unwrap_err();
    assert_eq!(err.message(), "Sink reference cycle detected: a -> b -> a");
    assert!(registry::get("it_cycle").is_none());
}

#[test]
fn malformed_pattern_fails_the_logger() {
    let err = from_str(
        r#"
global_pattern = "%Q"

[[sink]]
name = "null"
type = "null_sink_st"

[[logger]]
name = "it_bad_pattern"
sinks = ["null"]
"#,
    )
    .unwrap_err();
    assert!(
        err.message().starts_with("Error setting pattern to logger 'it_bad_pattern'"),
        "{err}"
    );
    assert!(registry::get("it_bad_pattern").is_none());
}

#[test]
fn syslog_facility_out_of_range_fails_the_build() {
    let err = from_str(
        r#"
[[sink]]
name = "sys"
type = "syslog_sink_st"
syslog_facility = 2147483647

[[logger]]
name = "it_bad_facility"
sinks = ["sys"]
"#,
    )
    .unwrap_err();
    assert!(err.message().starts_with("Sink 'sys' error"), "{err}");
    assert!(err.message().contains("syslog_facility"), "{err}");
    assert!(registry::get("it_bad_facility").is_none());
}

#[test]
fn missing_and_invalid_files() {
    let dir = tempfile::tempdir().unwrap();
    let err = from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(err.message().starts_with("Unable to find configuration file"), "{err}");

    let bad = dir.path().join("bad.toml");
    write(&bad, "[[sink]\n");
    let err = from_file(&bad).unwrap_err();
    assert!(err.message().starts_with("Unable to parse file"), "{err}");
}

// ---------------------------------------------------------------------------
// Thread pools
// ---------------------------------------------------------------------------

#[test]
fn async_loggers_bind_named_and_global_pools() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("async.log");
    let first = format!(
        r#"
[global_thread_pool]
queue_size = 16
num_threads = 1

[[thread_pool]]
name = "tp"
queue_size = 64
num_threads = 2

[[sink]]
name = "file"
type = "basic_file_sink_mt"
filename = '{}'

[[logger]]
name = "it_async_named"
type = "async"
thread_pool = "tp"
overflow_policy = "overrun_oldest"
sinks = ["file"]
pattern = "p"

[[logger]]
name = "it_async_global_1"
type = "async"
sinks = ["file"]

[[pattern]]
name = "p"
value = "%v"
"#,
        log.display()
    );
    from_str(&first).unwrap();

    let named = registry::get("it_async_named").unwrap();
    let pool = named.thread_pool().unwrap();
    assert_eq!((pool.queue_size(), pool.num_threads()), (64, 2));
    assert_eq!(
        named.overflow_policy(),
        Some(lgs_core::OverflowPolicy::OverrunOldest)
    );

    let global_1 = registry::get("it_async_global_1").unwrap();
    assert_eq!(global_1.thread_pool().unwrap().queue_size(), 16);

    named.info("through the pool");
    named.flush();
    assert_eq!(read(&log), "through the pool\n");

    // a new global pool does not move loggers bound to the old one
    from_str(
        r#"
[global_thread_pool]
queue_size = 32
num_threads = 1

[[sink]]
name = "null"
type = "null_sink_st"

[[logger]]
name = "it_async_global_2"
type = "async"
sinks = ["null"]
"#,
    )
    .unwrap();
    let global_2 = registry::get("it_async_global_2").unwrap();
    assert_eq!(global_2.thread_pool().unwrap().queue_size(), 32);
    assert_eq!(global_1.thread_pool().unwrap().queue_size(), 16);
}

// ---------------------------------------------------------------------------
// Override and templating
// ---------------------------------------------------------------------------

const BASE: &str = r#"
[[sink]]
name = "null"
type = "null_sink_st"

[[logger]]
name = "{{ name }}"
sinks = ["null"]
level = "info"
"#;

#[test]
fn override_file_is_optional() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.toml");
    let overlay = dir.path().join("override.toml");
    write(&base, &BASE.replace("{{ name }}", "it_override"));

    assert!(!from_file_with_override(&base, &overlay).unwrap());
    assert_eq!(registry::get("it_override").unwrap().level(), Level::Info);

    write(
        &overlay,
        r#"
[[logger]]
name = "it_override"
level = "err"
"#,
    );
    assert!(from_file_with_override(&base, &overlay).unwrap());
    let logger = registry::get("it_override").unwrap();
    assert_eq!(logger.level(), Level::Err);
    // untouched fields come from the base entry
    assert_eq!(logger.sinks().len(), 1);
}

#[test]
fn tag_replacement_in_base_and_override() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.pre.toml");
    let overlay = dir.path().join("override.pre.toml");
    write(&base, BASE);

    let mut vars = HashMap::new();
    vars.insert("name".to_string(), "it_templated".to_string());
    from_file_with_tag_replacement(&base, &vars).unwrap();
    assert!(registry::get("it_templated").is_some());

    write(
        &overlay,
        r#"
[[logger]]
name = "{{name}}"
level = "{{ level }}"
"#,
    );
    vars.insert("name".to_string(), "it_templated_override".to_string());
    vars.insert("level".to_string(), "critical".to_string());
    assert!(from_file_and_override_with_tag_replacement(&base, &overlay, &vars).unwrap());
    assert_eq!(
        registry::get("it_templated_override").unwrap().level(),
        Level::Critical
    );
}

// ---------------------------------------------------------------------------
// Saving and deleting logger entries
// ---------------------------------------------------------------------------

#[test]
fn save_and_delete_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved.toml");

    let logger = Logger::new("console", Vec::new());
    logger.set_level(Level::Warn);
    save_logger_to_file(&logger, &path, false).unwrap();

    let doc: lgs_config::Table = read(&path).parse().unwrap();
    let entries = doc["logger"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"].as_str(), Some("console"));
    assert_eq!(entries[0]["level"].as_str(), Some("warn"));

    // existing entries keep their other fields
    write(
        &path,
        r#"
[[logger]]
name = "console"
sinks = ["console"]
pattern = "easy"
level = "trace"

[[logger]]
name = "other"
level = "info"
"#,
    );
    save_logger_to_file(&logger, &path, false).unwrap();
    let doc: lgs_config::Table = read(&path).parse().unwrap();
    let console = doc["logger"][0].as_table().unwrap();
    assert_eq!(console["level"].as_str(), Some("warn"));
    assert_eq!(console["pattern"].as_str(), Some("easy"));
    assert_eq!(doc["logger"].as_array().unwrap().len(), 2);

    assert!(!delete_logger_in_file("missing", &path).unwrap());
    assert!(delete_logger_in_file("other", &path).unwrap());
    assert!(delete_logger_in_file("console", &path).unwrap());
    let doc: lgs_config::Table = read(&path).parse().unwrap();
    assert!(!doc.contains_key("logger"));

    let err = delete_logger_in_file("console", &path).unwrap_err();
    assert!(err.message().contains("logger table array"), "{err}");
}

#[test]
fn save_with_overwrite_replaces_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("overwrite.toml");
    write(
        &path,
        r#"
global_pattern = "%v"

[[logger]]
name = "old"
level = "info"
"#,
    );

    let logger = Logger::new("fresh", Vec::new());
    save_logger_to_file(&logger, &path, true).unwrap();

    let doc: lgs_config::Table = read(&path).parse().unwrap();
    assert!(!doc.contains_key("global_pattern"));
    let entries = doc["logger"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"].as_str(), Some("fresh"));
    assert_eq!(entries[0]["level"].as_str(), Some("info"));
}

use std::collections::HashMap;

use lgs_config::doc::{Lookup, entry_name, lookup, sub_table, table_array};
use lgs_config::{SetupError, SetupResult, Table, names, setup_bail};

use crate::backend::{LogBackend, ThreadPoolSpec};

/// Apply `[global_thread_pool]` and build every `[[thread_pool]]`.
///
/// The global pool is handed to the backend once, before any named pool.
/// Returns the named pools by name.
pub fn setup_thread_pools<B: LogBackend>(
    doc: &Table,
    backend: &mut B,
) -> SetupResult<HashMap<String, B::Pool>> {
    if let Some(global) = sub_table(doc, names::GLOBAL_THREAD_POOL_TABLE)? {
        let spec = ThreadPoolSpec {
            name: None,
            queue_size: dimension(global, names::QUEUE_SIZE, names::GLOBAL_THREAD_POOL_TABLE)?,
            num_threads: dimension(global, names::NUM_THREADS, names::GLOBAL_THREAD_POOL_TABLE)?,
        };
        backend.set_global_thread_pool(&spec)?;
        lgs_info!(
            pool,
            queue_size = spec.queue_size,
            num_threads = spec.num_threads,
            "global thread pool replaced"
        );
    }

    let mut pools = HashMap::new();
    let Some(entries) = table_array(doc, names::THREAD_POOL_TABLE)? else {
        return Ok(pools);
    };

    for entry in entries {
        let Some(name) = entry_name(entry) else {
            setup_bail!("One of the thread pools does not have a '{}' field", names::NAME);
        };
        if pools.contains_key(name) {
            setup_bail!("Thread pool '{name}' declared more than once");
        }
        let owner = format!("thread pool '{name}'");
        let spec = ThreadPoolSpec {
            name: Some(name.to_string()),
            queue_size: dimension(entry, names::QUEUE_SIZE, &owner)?,
            num_threads: dimension(entry, names::NUM_THREADS, &owner)?,
        };
        let pool = backend.create_thread_pool(&spec)?;
        lgs_debug!(
            pool,
            pool = name,
            queue_size = spec.queue_size,
            num_threads = spec.num_threads,
            "thread pool created"
        );
        pools.insert(name.to_string(), pool);
    }
    Ok(pools)
}

/// A required, strictly positive pool dimension.
fn dimension(table: &Table, field: &str, owner: &str) -> SetupResult<usize> {
    match lookup::<usize>(table, field) {
        Lookup::Present(0) => Err(SetupError::new(format!(
            "'{field}' of {owner} must be greater than 0"
        ))),
        Lookup::Present(n) => Ok(n),
        Lookup::Absent => Err(SetupError::new(format!(
            "Missing '{field}' field of {owner}"
        ))),
        Lookup::Mismatch(detail) => Err(SetupError::new(format!(
            "Invalid value for '{field}' field of {owner}: {detail}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use lgs_config::parse_document;

    use super::*;
    use crate::testing::FakeBackend;

    fn setup(s: &str) -> (FakeBackend, SetupResult<usize>) {
        let mut backend = FakeBackend::new();
        let res = setup_thread_pools(&parse_document(s).unwrap(), &mut backend).map(|p| p.len());
        (backend, res)
    }

    #[test]
    fn no_pools_declared() {
        let (backend, res) = setup("");
        assert_eq!(res.unwrap(), 0);
        assert!(backend.global_pools.is_empty());
    }

    #[test]
    fn global_and_named() {
        let (backend, res) = setup(
            r#"
[global_thread_pool]
queue_size = 8192
num_threads = 1

[[thread_pool]]
name = "tp"
queue_size = 4096
num_threads = 2

[[thread_pool]]
name = "tp2"
queue_size = 1024
num_threads = 4
"#,
        );
        assert_eq!(res.unwrap(), 2);
        assert_eq!(
            backend.global_pools,
            [ThreadPoolSpec {
                name: None,
                queue_size: 8192,
                num_threads: 1
            }]
        );
        assert_eq!(backend.pools[1].name.as_deref(), Some("tp2"));
        assert_eq!(backend.pools[1].num_threads, 4);
    }

    #[test]
    fn missing_fields_name_pool_and_field() {
        let (_, res) = setup(
            r#"
[[thread_pool]]
name = "tp"
num_threads = 2
"#,
        );
        assert_eq!(
            res.unwrap_err().message(),
            "Missing 'queue_size' field of thread pool 'tp'"
        );

        let (_, res) = setup(
            r#"
[global_thread_pool]
queue_size = 16
"#,
        );
        assert_eq!(
            res.unwrap_err().message(),
            "Missing 'num_threads' field of global_thread_pool"
        );

        let (_, res) = setup(
            r#"
[[thread_pool]]
queue_size = 1
num_threads = 1
"#,
        );
        assert!(res.unwrap_err().message().contains("'name'"));
    }

    #[test]
    fn zero_and_negative_rejected() {
        let (_, res) = setup(
            r#"
[[thread_pool]]
name = "tp"
queue_size = 0
num_threads = 2
"#,
        );
        assert!(res.unwrap_err().message().contains("greater than 0"));

        let (_, res) = setup(
            r#"
[global_thread_pool]
queue_size = 16
num_threads = -3
"#,
        );
        assert!(res.unwrap_err().message().contains("Invalid value for 'num_threads'"));
    }

    #[test]
    fn duplicate_pool_names_rejected() {
        let (backend, res) = setup(
            r#"
[[thread_pool]]
name = "tp"
queue_size = 1
num_threads = 1

[[thread_pool]]
name = "tp"
queue_size = 2
num_threads = 2
"#,
        );
        assert!(res.unwrap_err().message().contains("declared more than once"));
        assert_eq!(backend.pools.len(), 1);
    }
}

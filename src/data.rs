//! Records shown by the demo: loaded from JSON or a built-in sample.

use std::fs;
use std::path::Path;

use color_eyre::eyre::eyre;
use tablebox::column::config::{ColumnConfig, SizeConfig, TransformRegistry};
use tablebox::table::key_value::{KEY_COLUMN, VAL_COLUMN};
use tablebox::{ColumnSpec, Columns, Record, SizePolicy, Table, TableOptions, Value, key_value_table};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    Records(Vec<Record>),
    /// Entries of a JSON object, shown as a key/value table.
    Mapping(Vec<(String, Value)>),
}

fn record_from_json(map: serde_json::Map<String, serde_json::Value>) -> Record {
    map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
}

/// Parse a JSON document: an array of objects, or an object.
pub fn parse(json: &str, kv: bool) -> color_eyre::Result<Dataset> {
    use serde_json::Value as Json;

    match serde_json::from_str::<Json>(json)? {
        Json::Object(map) if kv => Ok(Dataset::Mapping(
            map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
        )),
        Json::Object(map) => Ok(Dataset::Records(vec![record_from_json(map)])),
        Json::Array(_) if kv => Err(eyre!("--kv needs a JSON object, not an array")),
        Json::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Json::Object(map) => Ok(record_from_json(map)),
                other => Err(eyre!("expected an object per record, found `{other}`")),
            })
            .collect::<color_eyre::Result<_>>()
            .map(Dataset::Records),
        other => Err(eyre!("expected a JSON array or object, found `{other}`")),
    }
}

pub fn load(path: &Path, kv: bool) -> color_eyre::Result<Dataset> {
    let json = fs::read_to_string(path)?;
    let dataset = parse(&json, kv)?;
    debug!(path = %path.display(), "Loaded dataset");
    Ok(dataset)
}

/// A few services with links, used when no data file is given.
pub fn sample() -> Dataset {
    let service = |name: &str, port: i64, up: bool, url: &str| {
        Record::new()
            .with("name", name)
            .with("port", port)
            .with("up", up)
            .with("url", url)
            .with("title", format!("{name} docs"))
    };
    Dataset::Records(vec![
        service("postgres", 5432, true, "https://www.postgresql.org/docs/"),
        service("redis", 6379, true, "https://redis.io/docs/"),
        service("nginx", 443, false, "https://nginx.org/en/docs/"),
        service("grafana", 3000, true, "https://grafana.com/docs/"),
        service("prometheus", 9090, false, "https://prometheus.io/docs/"),
    ])
}

fn sample_columns() -> Vec<ColumnConfig> {
    vec![
        ColumnConfig {
            key: "name".into(),
            header: Some("Service".into()),
            size: Some(SizeConfig::Policy {
                kind: "weight".into(),
                amount: 2,
                boxed: false,
            }),
            ..ColumnConfig::default()
        },
        ColumnConfig {
            key: "port".into(),
            header: Some("Port".into()),
            color: Some(("yellow".into(), String::new())),
            size: Some(SizeConfig::Width(6)),
            ..ColumnConfig::default()
        },
        ColumnConfig {
            key: "up".into(),
            header: Some("Up".into()),
            format: Some("yes_no".into()),
            size: Some(SizeConfig::Width(4)),
            ..ColumnConfig::default()
        },
        ColumnConfig {
            key: "docs".into(),
            header: Some("Docs".into()),
            generate: Some("link".into()),
            size: Some(SizeConfig::Policy {
                kind: "weight".into(),
                amount: 3,
                boxed: false,
            }),
            ..ColumnConfig::default()
        },
    ]
}

/// Columns for `records`: from config if any, else one per field, sorted.
fn columns_for(
    records: &[Record],
    configs: &[ColumnConfig],
    registry: &TransformRegistry,
) -> color_eyre::Result<Columns> {
    if !configs.is_empty() {
        return Ok(registry.resolve_all(configs)?);
    }
    let mut keys: Vec<&str> = records.first().map(|r| r.keys().collect()).unwrap_or_default();
    keys.sort_unstable();
    Ok(Columns::new(keys.into_iter().map(ColumnSpec::new))?)
}

fn kv_column(
    key: &str,
    header: &str,
    configs: &[ColumnConfig],
    registry: &TransformRegistry,
) -> color_eyre::Result<ColumnSpec> {
    match configs.iter().find(|c| c.key == key) {
        Some(config) => Ok(registry.resolve(config)?),
        None => Ok(ColumnSpec::new(key).header(header)),
    }
}

pub fn build_table(
    dataset: Dataset,
    configs: &[ColumnConfig],
    options: TableOptions,
) -> color_eyre::Result<Table> {
    let registry = TransformRegistry::default();
    let table = match dataset {
        Dataset::Records(records) => {
            let columns = columns_for(&records, configs, &registry)?;
            Table::new(records, columns, options)?
        }
        Dataset::Mapping(entries) => {
            let key = kv_column(KEY_COLUMN, "Key", configs, &registry)?.size(SizePolicy::pack());
            let val = kv_column(VAL_COLUMN, "Value", configs, &registry)?;
            key_value_table(entries, key, val, options)?
        }
    };
    Ok(table)
}

/// The sample dataset with its own column layout unless config overrides it.
pub fn sample_table(configs: &[ColumnConfig], options: TableOptions) -> color_eyre::Result<Table> {
    if configs.is_empty() {
        build_table(sample(), &sample_columns(), options)
    } else {
        build_table(sample(), configs, options)
    }
}

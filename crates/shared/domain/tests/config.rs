use fhub_domain::config::{
    ApiConfig, LogRotation, LoggingConfig, MissingRatePolicy, ServerConfig, StoreConfig,
    WorkflowConfig,
};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 4583);
    assert!(server.ssl.is_none());

    let logging = LoggingConfig::default();
    assert_eq!(logging.name, "fhub");
    assert_eq!(logging.level, "info");
    assert_eq!(logging.rotation, LogRotation::Daily);
    assert!(logging.directory.is_none());

    let store = StoreConfig::default();
    assert_eq!(store.url, "mem://");
    assert_eq!((store.namespace.as_str(), store.database.as_str()), ("fhub", "main"));
    assert!(store.credentials.is_none());

    let workflow = WorkflowConfig::default();
    assert_eq!(workflow.missing_rate, MissingRatePolicy::Reject);
    assert_eq!(workflow.code_attempts, 16);
}

#[test]
fn api_config_deserializes() {
    let raw = json!({
        "server": { "address": "::", "port": 8080 },
        "logging": {
            "level": "debug",
            "directory": "/tmp/logs",
            "rotation": "hourly",
            "json": true
        },
        "store": {
            "url": "rocksdb:///var/lib/fhub",
            "credentials": { "username": "root", "password": "secret" }
        },
        "workflow": { "missing_rate": "zero_cost" }
    });

    let cfg: ApiConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.logging.level, "debug");
    assert_eq!(cfg.logging.rotation, LogRotation::Hourly);
    assert!(cfg.logging.json);
    assert_eq!(cfg.store.url, "rocksdb:///var/lib/fhub");
    assert_eq!(cfg.store.namespace, "fhub");
    assert_eq!(cfg.store.credentials.map(|c| c.username).as_deref(), Some("root"));
    assert_eq!(cfg.workflow.missing_rate, MissingRatePolicy::ZeroCost);
    assert_eq!(cfg.workflow.code_attempts, 16);
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let cfg: ApiConfig = serde_json::from_value(json!({})).expect("config deserialize");
    assert_eq!(cfg.server.port, 4583);
    assert!(cfg.logging.console);
    assert_eq!(cfg.workflow.missing_rate, MissingRatePolicy::Reject);
}

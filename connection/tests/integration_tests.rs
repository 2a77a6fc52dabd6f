//! Integration tests against a real MySQL server.
//!
//! Copy `tests/test-config.toml.example` to `tests/test-config.toml` and
//! fill in your server; without the file every test here is a no-op.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use connection::conn::connection::Connection;
use connection::conn::connection_options::ConnectionOptions;
use connection::conn::query_result::QueryResult;

#[derive(Debug, Deserialize)]
struct TestConfig {
    mysql: MysqlConfig,
}

#[derive(Debug, Deserialize)]
struct MysqlConfig {
    host: String,
    port: u16,
    username: String,
    password: String,
    #[serde(default = "default_database")]
    database: String,
}

fn default_database() -> String {
    "test".to_string()
}

fn load_test_config() -> Option<TestConfig> {
    for candidate in ["tests/test-config.toml", "connection/tests/test-config.toml"] {
        let config_path = Path::new(candidate);
        if !config_path.exists() {
            continue;
        }
        match fs::read_to_string(config_path) {
            Ok(content) => match toml::from_str::<TestConfig>(&content) {
                Ok(config) => return Some(config),
                Err(err) => {
                    println!("Failed to parse {}: {}", config_path.display(), err);
                    return None;
                }
            },
            Err(err) => {
                println!("Failed to read {}: {}", config_path.display(), err);
                return None;
            }
        }
    }
    None
}

fn connect(config: &TestConfig) -> Connection {
    let mut options = ConnectionOptions::default();
    options.hostname = config.mysql.host.clone();
    options.port = config.mysql.port;
    options.database = Some(config.mysql.database.clone());
    options.update_auth(
        config.mysql.username.clone(),
        config.mysql.password.clone(),
    );
    Connection::connect(options).expect("could not connect to the configured server")
}

#[test]
fn test_live_connect_and_ping() {
    let config = match load_test_config() {
        Some(config) => config,
        None => {
            println!("No test-config.toml; skipping live server test");
            return;
        }
    };

    let mut conn = connect(&config);
    assert!(!conn.is_closed());
    assert!(conn.ping().unwrap());
    assert!(!conn.server_version().is_empty());
    conn.close().unwrap();
    assert!(conn.is_closed());
}

#[test]
fn test_live_simple_select() {
    let config = match load_test_config() {
        Some(config) => config,
        None => {
            println!("No test-config.toml; skipping live server test");
            return;
        }
    };

    let mut conn = connect(&config);
    match conn.execute_query("SELECT 1 + 1").unwrap() {
        QueryResult::ResultSet(set) => {
            assert_eq!(set.rows.len(), 1);
            assert_eq!(set.rows[0].get(0).unwrap(), Some("2"));
        }
        QueryResult::Update(_) => panic!("expected a result set"),
    }
    conn.close().unwrap();
}

#[test]
fn test_live_server_variable() {
    let config = match load_test_config() {
        Some(config) => config,
        None => {
            println!("No test-config.toml; skipping live server test");
            return;
        }
    };

    let mut conn = connect(&config);
    let version = conn.get_server_variable("version").unwrap();
    assert!(!version.is_empty());
    conn.close().unwrap();
}

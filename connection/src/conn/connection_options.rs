use std::collections::HashMap;

/// Settings used to connect to a MySQL-compatible server.
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    /// Hostname to connect. Defaults to "localhost".
    pub hostname: String,

    /// Port number to connect. Defaults to 3306.
    pub port: u16,

    /// The user the connection authenticates as.
    pub username: String,

    /// The password of the user which is used to connect.
    pub password: String,

    /// Default database name sent in the handshake response, or created
    /// and selected after authentication under the `createDB` property.
    pub database: Option<String>,

    /// Server id announced in the binlog dump command. Defaults to 65535.
    pub server_id: u32,

    /// Free-form property map handed in by the host. Only the keys picked
    /// up by [`DriverConfig::from_properties`] have an effect.
    pub properties: HashMap<String, String>,
}

impl Default for ConnectionOptions {
    fn default() -> ConnectionOptions {
        ConnectionOptions {
            hostname: String::from("localhost"),
            port: 3306,
            username: String::new(),
            password: String::new(),
            database: None,
            server_id: 65535,
            properties: HashMap::new(),
        }
    }
}

impl ConnectionOptions {
    pub fn new(
        hostname: String,
        port: u16,
        database: Option<String>,
        username: Option<String>,
        password: Option<String>,
        properties: HashMap<String, String>,
    ) -> ConnectionOptions {
        ConnectionOptions {
            hostname,
            port,
            username: username.unwrap_or_default(),
            password: password.unwrap_or_default(),
            database: database.filter(|name| !name.is_empty()),
            server_id: 65535,
            properties,
        }
    }

    pub fn update_auth(&mut self, username: String, password: String) {
        self.username = username;
        self.password = password;
    }

    pub fn update_server_id(&mut self, server_id: u32) {
        self.server_id = server_id;
    }

    pub fn config(&self) -> DriverConfig {
        DriverConfig::from_properties(&self.properties)
    }
}

/// The recognized subset of the property map, folded into plain booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriverConfig {
    /// Create the database after authentication and USE it, instead of
    /// selecting it during the handshake.
    pub create_db: bool,

    /// Advertise blob streaming support upstream.
    pub enable_blob_streaming: bool,
}

impl DriverConfig {
    /// Keys and the value "true" match case-insensitively; unknown keys
    /// are accepted and ignored.
    pub fn from_properties(properties: &HashMap<String, String>) -> Self {
        let mut config = DriverConfig::default();
        for (key, value) in properties {
            match key.to_ascii_lowercase().as_str() {
                "createdb" => config.create_db = is_true(value),
                "enableblobstreaming" => config.enable_blob_streaming = is_true(value),
                _ => {}
            }
        }
        config
    }
}

fn is_true(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod test {
    use super::*;

    fn properties(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let options = ConnectionOptions::default();
        assert_eq!(options.hostname, "localhost");
        assert_eq!(options.port, 3306);
        assert_eq!(options.server_id, 65535);
        assert_eq!(options.config(), DriverConfig::default());
    }

    #[test]
    fn test_empty_database_is_none() {
        let options = ConnectionOptions::new(
            "localhost".to_string(),
            3306,
            Some(String::new()),
            None,
            None,
            HashMap::new(),
        );
        assert_eq!(options.database, None);
        assert_eq!(options.username, "");
        assert_eq!(options.password, "");
    }

    #[test]
    fn test_config_keys_case_insensitive() {
        let config = DriverConfig::from_properties(&properties(&[
            ("CREATEDB", "TRUE"),
            ("enableBlobStreaming", "true"),
        ]));
        assert!(config.create_db);
        assert!(config.enable_blob_streaming);
    }

    #[test]
    fn test_config_ignores_unknown_keys_and_values() {
        let config = DriverConfig::from_properties(&properties(&[
            ("createDB", "yes"),
            ("somethingElse", "true"),
        ]));
        assert!(!config.create_db);
        assert!(!config.enable_blob_streaming);
    }
}

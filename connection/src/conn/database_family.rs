/// Server family, recognized from the version string of the greeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseFamily {
    MySql,
    MariaDb,
    Unknown,
}

impl DatabaseFamily {
    pub fn from_version(version: &str) -> Self {
        if version.contains("MariaDB") {
            DatabaseFamily::MariaDb
        } else if version
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_digit())
        {
            DatabaseFamily::MySql
        } else {
            DatabaseFamily::Unknown
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_version() {
        assert_eq!(DatabaseFamily::from_version("5.5.0"), DatabaseFamily::MySql);
        assert_eq!(
            DatabaseFamily::from_version("8.0.36-log"),
            DatabaseFamily::MySql
        );
        assert_eq!(
            DatabaseFamily::from_version("10.11.6-MariaDB"),
            DatabaseFamily::MariaDb
        );
        assert_eq!(
            DatabaseFamily::from_version("unexpected"),
            DatabaseFamily::Unknown
        );
    }
}

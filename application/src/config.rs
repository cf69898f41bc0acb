//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use secrecy::SecretString;
use serde::Deserialize;
use service::domain::{
    form,
    ldap::{self, server},
    question,
};
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Log configuration.
    pub log: Log,

    /// LDAP catalog configuration.
    pub ldap: Ldap,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// LDAP catalog configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Ldap {
    /// Directory servers.
    pub servers: Vec<LdapServer>,

    /// Attribute mappings.
    pub attributes: Vec<LdapAttribute>,

    /// Questions answered from directory servers.
    pub questions: Vec<LdapQuestion>,
}

impl From<Ldap> for service::Config {
    fn from(value: Ldap) -> Self {
        let Ldap {
            servers,
            attributes,
            questions,
        } = value;

        Self {
            servers: servers
                .into_iter()
                .map(ldap::Server::from)
                .map(|s| (s.id, s))
                .collect(),
            attributes: attributes
                .into_iter()
                .map(|a| (a.id.into(), a.name))
                .collect(),
            questions: questions
                .into_iter()
                .map(question::Question::from)
                .map(|q| (q.id, q))
                .collect(),
        }
    }
}

/// Directory server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct LdapServer {
    /// ID of the server.
    pub id: u32,

    /// Human-readable name of the server.
    pub name: String,

    /// Host to connect to.
    #[default("localhost".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(389)]
    pub port: u16,

    /// Security of the connection.
    pub security: server::Security,

    /// DN every search is rooted at.
    pub base_dn: String,

    /// DN to bind as, if any.
    pub bind_dn: Option<String>,

    /// Password to bind with.
    pub bind_password: Option<SecretString>,

    /// Number of entries requested per paged search round-trip.
    pub page_size: u32,

    /// Indicator whether the server supports paged searches.
    pub can_support_pagesize: bool,

    /// Attribute holding user logins.
    #[default("uid".to_owned())]
    pub login_field: String,

    /// Additional filter restricting the users of the server.
    pub condition: Option<String>,

    /// Timeout of establishing a connection.
    #[default(time::Duration::from_secs(10))]
    #[serde(with = "humantime_serde")]
    pub connection_timeout: time::Duration,
}

impl From<LdapServer> for ldap::Server {
    fn from(value: LdapServer) -> Self {
        let LdapServer {
            id,
            name,
            host,
            port,
            security,
            base_dn,
            bind_dn,
            bind_password,
            page_size,
            can_support_pagesize,
            login_field,
            condition,
            connection_timeout,
        } = value;

        Self {
            id: id.into(),
            name,
            host,
            port,
            security,
            base_dn,
            bind: bind_dn.map(|dn| server::Bind {
                dn,
                password: bind_password
                    .unwrap_or_else(|| SecretString::from(String::new())),
            }),
            page_size,
            can_support_pagesize,
            login_field,
            condition: condition.filter(|c| !c.trim().is_empty()),
            connection_timeout,
        }
    }
}

/// Attribute mapping configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct LdapAttribute {
    /// ID of the mapping.
    pub id: u32,

    /// Attribute description, validated on load.
    pub name: ldap::Attribute,
}

/// LDAP question configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct LdapQuestion {
    /// ID of the question.
    pub id: u32,

    /// Name of the question.
    pub name: String,

    /// ID of the form the question belongs to.
    pub form_id: u32,

    /// Indicator whether the form is active.
    #[default(true)]
    pub form_active: bool,

    /// Question configuration, as stored by the forms host.
    pub config: question::LdapSelect,
}

impl From<LdapQuestion> for question::Question {
    fn from(value: LdapQuestion) -> Self {
        let LdapQuestion {
            id,
            name,
            form_id,
            form_active,
            config,
        } = value;

        Self {
            id: id.into(),
            name,
            form: form::Form {
                id: form_id.into(),
                is_active: form_active,
            },
            config,
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use config::{builder::DefaultState, ConfigBuilder, FileFormat};
    use secrecy::ExposeSecret as _;
    use service::domain::{
        ldap::{attribute, server, server::Security},
        question,
    };

    use super::Config;

    const TOML: &str = r#"
        [log]
        level = "DEBUG"

        [[ldap.servers]]
        id = 1
        name = "openldap"
        host = "openldap"
        base_dn = "dc=glpi,dc=org"
        bind_dn = "cn=Manager,dc=glpi,dc=org"
        bind_password = "insecure"
        page_size = 100
        can_support_pagesize = true
        security = "start_tls"
        connection_timeout = "5s"

        [[ldap.attributes]]
        id = 2
        name = "uid"

        [[ldap.questions]]
        id = 10
        form_id = 3
        config = { authldap_id = 1, ldap_filter = "(uid=*)", ldap_attribute_id = 2 }
    "#;

    fn load(toml: &str) -> Result<Config, config::ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn loads_ldap_catalog() {
        let config: service::Config = load(TOML).unwrap().ldap.into();

        let server = &config.servers[&server::Id::from(1)];
        assert_eq!(server.port, 389);
        assert_eq!(server.security, Security::StartTls);
        assert_eq!(server.login_field, "uid");
        assert_eq!(server.paging().map(|s| s.get()), Some(100));
        assert_eq!(server.connection_timeout.as_secs(), 5);
        let bind = server.bind.as_ref().unwrap();
        assert_eq!(bind.dn, "cn=Manager,dc=glpi,dc=org");
        assert_eq!(bind.password.expose_secret(), "insecure");

        assert_eq!(config.attributes[&attribute::Id::from(2)].as_ref(), "uid");

        let question = &config.questions[&question::Id::from(10)];
        assert!(question.form.is_active);
        assert_eq!(question.config.filter.as_ref(), "(uid=*)");
        assert_eq!(u32::from(question.config.server_id), 1);
    }

    #[test]
    fn rejects_malformed_attributes() {
        let toml = r#"
            [[ldap.attributes]]
            id = 2
            name = "u id"
        "#;

        assert!(load(toml).is_err());
    }

    #[test]
    fn defaults_to_empty_catalog() {
        let config = load("").unwrap();

        assert_eq!(config.server.port, 8080);
        assert!(config.ldap.servers.is_empty());
        assert!(config.ldap.questions.is_empty());
    }
}

//! Module dedicated to account definitions.
//!
//! An account definition is assembled from several groups of fields,
//! each coming from a different source and changing for different
//! reasons:
//!
//! - [`Infra`]: fields required by the account manager to work at
//!   all (id, name, type).
//! - [`Credentials`]: username, passwords and OAuth 2.0 material,
//!   churning when passwords or tokens are refreshed.
//! - [`AccountPrefs`]: preferences exposed to the user.
//! - [`TypeFields`]: fields statically derived from the
//!   [`AccountType`].
//! - [`EngineFields`]: the engine and its opaque data, determined
//!   by the validation (probing) step.
//! - [`ConnInfoFields`]: connection details that may change without
//!   altering the nature of the account.

use std::fmt;

use chrono::Utc;
use tracing::debug;

use super::AccountId;

/// The account type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "derive", derive(serde::Serialize, serde::Deserialize))]
pub enum AccountType {
    #[cfg_attr(feature = "derive", serde(rename = "imap+smtp"))]
    ImapSmtp,
    #[cfg_attr(feature = "derive", serde(rename = "pop3+smtp"))]
    Pop3Smtp,
    #[cfg_attr(feature = "derive", serde(rename = "activesync"))]
    ActiveSync,
}

impl AccountType {
    /// Return the fields that cannot change without re-creating the
    /// account.
    pub fn type_fields(&self) -> TypeFields {
        match self {
            Self::ImapSmtp => TypeFields {
                receive_type: Some(ServerType::Imap),
                send_type: Some(ServerType::Smtp),
            },
            Self::Pop3Smtp => TypeFields {
                receive_type: Some(ServerType::Pop3),
                send_type: Some(ServerType::Smtp),
            },
            // a single endpoint, described by the activesync conn info
            Self::ActiveSync => TypeFields::default(),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImapSmtp => write!(f, "imap+smtp"),
            Self::Pop3Smtp => write!(f, "pop3+smtp"),
            Self::ActiveSync => write!(f, "activesync"),
        }
    }
}

/// The type of a receiving or sending server.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ServerType {
    Imap,
    Pop3,
    Smtp,
}

/// The password.
///
/// Its `Debug` implementation is redacted so that passwords never end
/// up in logs.
#[derive(Clone, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Password(String);

impl Password {
    pub fn new(passwd: impl ToString) -> Self {
        Self(passwd.to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password(***)")
    }
}

/// The OAuth 2.0 credentials.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct OAuth2Credentials {
    pub auth_endpoint: String,
    pub token_endpoint: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub refresh_token: String,
    pub access_token: String,

    /// Expiration date of the access token, in milliseconds since
    /// the epoch.
    pub expire_time_ms: i64,
}

/// The account credentials.
///
/// This is the only part of an account definition that is expected
/// to be mutated in place, when passwords are updated or when OAuth
/// 2.0 tokens churn.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct Credentials {
    pub username: String,
    pub password: Option<Password>,
    pub outgoing_username: Option<String>,
    pub outgoing_password: Option<Password>,
    pub oauth2: Option<OAuth2Credentials>,
}

/// An identity the user can send messages as.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub address: String,
    pub reply_to: Option<String>,
    pub signature: Option<String>,
    pub signature_enabled: bool,
}

impl Identity {
    pub fn new(id: impl ToString, name: impl ToString, address: impl ToString) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            address: address.to_string(),
            ..Default::default()
        }
    }

    pub fn with_reply_to(mut self, reply_to: impl ToString) -> Self {
        self.reply_to = Some(reply_to.to_string());
        self
    }

    pub fn with_signature(mut self, signature: impl ToString) -> Self {
        self.signature = Some(signature.to_string());
        self.signature_enabled = true;
        self
    }
}

/// Fields provided by the general account creation logic.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct Infra {
    pub id: AccountId,
    pub name: String,
    #[cfg_attr(feature = "derive", serde(rename = "type"))]
    pub account_type: AccountType,
}

pub const DEFAULT_SYNC_INTERVAL_MS: u64 = 5 * 60 * 1000;

/// The account preferences, exposed in the settings.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case", default)
)]
pub struct AccountPrefs {
    /// Interval between two automatic synchronizations, in
    /// milliseconds. Zero disables automatic synchronization.
    pub sync_interval: u64,

    pub notify_on_new: bool,
    pub play_sound_on_send: bool,

    /// How far back to synchronize (activesync only), for example
    /// `"auto"` or `"1w"`.
    pub sync_range: Option<String>,
}

impl Default for AccountPrefs {
    fn default() -> Self {
        Self {
            sync_interval: DEFAULT_SYNC_INTERVAL_MS,
            notify_on_new: true,
            play_sound_on_send: true,
            sync_range: None,
        }
    }
}

/// Fields statically derived from the account type.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct TypeFields {
    pub receive_type: Option<ServerType>,
    pub send_type: Option<ServerType>,
}

/// Fields generated by the validation step.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct EngineFields {
    pub engine: String,

    /// Engine-specific payload, opaque to everything but the engine.
    pub engine_data: serde_json::Value,
}

/// The transport security of a connection.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Crypto {
    #[default]
    Ssl,
    StartTls,
    Plain,
}

/// The connection info of an IMAP, POP3 or SMTP server.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct ConnInfo {
    pub hostname: String,
    pub port: u16,
    pub crypto: Crypto,
}

impl ConnInfo {
    pub fn new(hostname: impl ToString, port: u16, crypto: Crypto) -> Self {
        Self {
            hostname: hostname.to_string(),
            port,
            crypto,
        }
    }
}

/// The connection info of an activesync server.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct ActiveSyncConnInfo {
    pub server: String,
    pub device_id: Option<String>,
    pub protocol_version: Option<String>,
}

/// The connection info fields.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum ConnInfoFields {
    Composite {
        receive_conn_info: ConnInfo,
        send_conn_info: ConnInfo,
    },
    ActiveSync {
        conn_info: ActiveSyncConnInfo,
    },
}

impl ConnInfoFields {
    pub fn receive_conn_info(&self) -> Option<&ConnInfo> {
        match self {
            Self::Composite {
                receive_conn_info, ..
            } => Some(receive_conn_info),
            Self::ActiveSync { .. } => None,
        }
    }

    pub fn send_conn_info(&self) -> Option<&ConnInfo> {
        match self {
            Self::Composite { send_conn_info, .. } => Some(send_conn_info),
            Self::ActiveSync { .. } => None,
        }
    }
}

/// The account definition.
///
/// The id is immutable once assigned. Everything else is owned by
/// the account manager, who mutates it in place and then tells the
/// toc about it.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct AccountDef {
    id: AccountId,
    pub name: String,
    #[cfg_attr(feature = "derive", serde(rename = "type"))]
    pub account_type: AccountType,

    /// Timestamp, in milliseconds, letting the user promote the
    /// account to default by bumping it. See [`AccountDef::make_default`].
    default_priority: i64,

    pub engine: String,
    pub engine_data: serde_json::Value,
    pub credentials: Credentials,
    pub identities: Vec<Identity>,

    #[cfg_attr(feature = "derive", serde(flatten))]
    pub prefs: AccountPrefs,
    #[cfg_attr(feature = "derive", serde(flatten))]
    pub type_fields: TypeFields,
    #[cfg_attr(feature = "derive", serde(flatten))]
    pub conn_info: ConnInfoFields,
}

impl AccountDef {
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn default_priority(&self) -> i64 {
        self.default_priority
    }

    /// Promote the account to default.
    ///
    /// The default priority becomes the current timestamp, or the
    /// previous priority plus one if the clock did not move forward.
    pub fn make_default(&mut self) {
        let now = Utc::now().timestamp_millis();
        self.default_priority = now.max(self.default_priority.saturating_add(1));
        debug!(
            "promoted account {} to default with priority {}",
            self.id,
            self.default_priority
        );
    }
}

/// The source pieces of an account definition.
#[derive(Clone, Debug)]
pub struct AccountDefParts {
    pub infra: Infra,
    pub credentials: Credentials,
    pub prefs: AccountPrefs,
    pub type_fields: TypeFields,
    pub engine_fields: EngineFields,
    pub conn_info_fields: ConnInfoFields,
    pub identities: Vec<Identity>,
}

/// Create an account definition out of its source pieces.
///
/// The default priority is stamped with the current timestamp.
pub fn make_account_def(parts: AccountDefParts) -> AccountDef {
    let AccountDefParts {
        infra,
        credentials,
        prefs,
        type_fields,
        engine_fields,
        conn_info_fields,
        identities,
    } = parts;

    AccountDef {
        id: infra.id,
        name: infra.name,
        account_type: infra.account_type,
        default_priority: Utc::now().timestamp_millis(),
        engine: engine_fields.engine,
        engine_data: engine_fields.engine_data,
        credentials,
        identities,
        prefs,
        type_fields,
        conn_info: conn_info_fields,
    }
}

//! Module dedicated to the account wire rep.
//!
//! The wire rep is the censored projection of an [`AccountDef`]
//! handed to the front-end: passwords never leave this crate.

use super::{
    def::{AccountType, ConnInfo, Identity, OAuth2Credentials, ServerType},
    AccountDef, AccountId,
};

/// The censored credentials.
///
/// OAuth 2.0 material is forwarded as is, passwords are not.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct CredentialsWireRep {
    pub username: String,
    pub outgoing_username: Option<String>,
    pub oauth2: Option<OAuth2Credentials>,
}

/// A receiving or sending server.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct ServerWireRep {
    #[cfg_attr(feature = "derive", serde(rename = "type"))]
    pub server_type: Option<ServerType>,
    pub conn_info: Option<ConnInfo>,

    /// Number of live connections. Connection pools are not tracked
    /// here, this is always zero.
    pub active_conns: usize,
}

/// The account wire rep.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct AccountWireRep {
    pub id: AccountId,
    pub name: String,
    #[cfg_attr(feature = "derive", serde(rename = "type"))]
    pub account_type: AccountType,
    pub engine: String,

    pub default_priority: i64,

    pub enabled: bool,
    pub problems: Vec<String>,

    pub sync_range: Option<String>,
    pub sync_interval: u64,
    pub notify_on_new: bool,
    pub play_sound_on_send: bool,

    pub identities: Vec<Identity>,

    pub credentials: CredentialsWireRep,

    /// The receiving server first, then the sending one.
    pub servers: [ServerWireRep; 2],
}

impl AccountDef {
    /// Project the account definition into its wire rep.
    pub fn to_wire_rep(&self) -> AccountWireRep {
        AccountWireRep {
            id: self.id().clone(),
            name: self.name.clone(),
            account_type: self.account_type,
            engine: self.engine.clone(),

            default_priority: self.default_priority(),

            // TODO: feed from the account problems overlay once it
            // reports per-account state
            enabled: true,
            problems: Vec::new(),

            sync_range: self.prefs.sync_range.clone(),
            sync_interval: self.prefs.sync_interval,
            notify_on_new: self.prefs.notify_on_new,
            play_sound_on_send: self.prefs.play_sound_on_send,

            identities: self.identities.clone(),

            credentials: CredentialsWireRep {
                username: self.credentials.username.clone(),
                outgoing_username: self.credentials.outgoing_username.clone(),
                oauth2: self.credentials.oauth2.clone(),
            },

            servers: [
                ServerWireRep {
                    server_type: self.type_fields.receive_type,
                    conn_info: self.conn_info.receive_conn_info().cloned(),
                    active_conns: 0,
                },
                ServerWireRep {
                    server_type: self.type_fields.send_type,
                    conn_info: self.conn_info.send_conn_info().cloned(),
                    active_conns: 0,
                },
            ],
        }
    }
}

impl From<&AccountDef> for AccountWireRep {
    fn from(def: &AccountDef) -> Self {
        def.to_wire_rep()
    }
}

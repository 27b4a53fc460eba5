//! Command descriptors, registry and resolver.

mod chat;
mod help;
mod news;
mod summary;
mod transcribe;

pub use chat::ChatHandler;
pub use help::HelpHandler;
pub use news::NewsHandler;
pub use summary::SummaryHandler;
pub use transcribe::TranscribeHandler;

use crate::error::AppResult;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;
use wa_client::{BotMessage, WaClient};

/// Well-known command ids.
pub mod ids {
    pub const RESUMO: &str = "resumo";
    pub const NEWS: &str = "ayubnews";
    pub const TRANSCRIBE: &str = "transcrever";
    pub const HELP: &str = "ajuda";
    pub const CONFIG: &str = "config";
    pub const CHAT: &str = "chat";
}

/// Where a command may be invoked from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Any chat.
    All,
    /// A specific user id.
    User(String),
    /// A specific group, by display name.
    Group(String),
    /// Direct messages from members of the named group.
    DmGroup(String),
}

/// Permission rule of a descriptor.
#[derive(Debug, Clone)]
pub struct Permission {
    pub allowed: Vec<Scope>,
    pub admin_only: bool,
}

impl Permission {
    pub fn everyone() -> Self {
        Self {
            allowed: vec![Scope::All],
            admin_only: false,
        }
    }

    pub fn admin() -> Self {
        Self {
            allowed: vec![Scope::All],
            admin_only: true,
        }
    }
}

/// When to delete the bot's reply, and after how long.
#[derive(Debug, Clone, Default)]
pub struct AutoDelete {
    pub on_error: bool,
    pub on_success: bool,
    pub timeout_ms: u64,
}

/// Per-descriptor user-facing error texts.
#[derive(Debug, Clone)]
pub struct ErrorMessages {
    pub not_allowed: String,
    pub failure: String,
}

/// Static registration record of one capability. Immutable after
/// registration.
#[derive(Debug, Clone)]
pub struct CommandDescriptor {
    pub id: &'static str,
    pub prefixes: Vec<String>,
    pub sticker_hashes: Vec<String>,
    pub handles_audio: bool,
    pub is_fallback: bool,
    pub permission: Permission,
    pub auto_delete: AutoDelete,
    pub errors: ErrorMessages,
}

impl CommandDescriptor {
    /// Shape check applied at registration time. A descriptor that fails
    /// here never reaches dispatch.
    fn validate(&self) -> Result<(), RegistryError> {
        let has_trigger = !self.prefixes.is_empty()
            || !self.sticker_hashes.is_empty()
            || self.handles_audio
            || self.is_fallback;
        if !has_trigger {
            return Err(RegistryError::NoTrigger(self.id));
        }
        if self.permission.allowed.is_empty() {
            return Err(RegistryError::NoPermission(self.id));
        }
        if self.errors.not_allowed.is_empty() || self.errors.failure.is_empty() {
            return Err(RegistryError::EmptyErrorMessages(self.id));
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("descriptor `{0}` has no trigger")]
    NoTrigger(&'static str),

    #[error("descriptor `{0}` has an empty permission scope list")]
    NoPermission(&'static str),

    #[error("descriptor `{0}` has empty error messages")]
    EmptyErrorMessages(&'static str),

    #[error("duplicate descriptor id `{0}`")]
    Duplicate(&'static str),
}

/// Tag tables: a fixed global set plus per-group entries, both mapping a
/// tag word to a descriptor id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagTable {
    #[serde(default)]
    pub global: HashMap<String, String>,
    #[serde(default)]
    pub per_group: HashMap<String, HashMap<String, String>>,
}

impl TagTable {
    /// Built-in global tags, available in every group.
    pub fn builtin() -> Self {
        let mut global = HashMap::new();
        global.insert("resumo".to_string(), ids::RESUMO.to_string());
        global.insert("news".to_string(), ids::NEWS.to_string());
        Self {
            global,
            per_group: HashMap::new(),
        }
    }

    /// Load per-group tags from a JSON file, merged over the built-ins.
    pub fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let loaded: TagTable = serde_json::from_slice(&bytes)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let mut table = Self::builtin();
        table.global.extend(loaded.global);
        table.per_group = loaded.per_group;
        Ok(table)
    }

    /// Resolve a tag for a specific group. Group entries shadow globals.
    pub fn lookup(&self, group: &str, tag: &str) -> Option<&str> {
        self.per_group
            .get(group)
            .and_then(|tags| tags.get(tag))
            .or_else(|| self.global.get(tag))
            .map(String::as_str)
    }
}

/// Read-only command table, built once at startup.
pub struct CommandRegistry {
    descriptors: Vec<Arc<CommandDescriptor>>,
    tags: TagTable,
    command_sigil: String,
    tag_sigil: String,
}

impl CommandRegistry {
    pub fn new(command_sigil: impl Into<String>, tag_sigil: impl Into<String>, tags: TagTable) -> Self {
        Self {
            descriptors: Vec::new(),
            tags,
            command_sigil: command_sigil.into(),
            tag_sigil: tag_sigil.into(),
        }
    }

    /// Register a descriptor. Malformed descriptors are rejected here,
    /// never at resolution time.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), RegistryError> {
        descriptor.validate()?;
        if self.descriptors.iter().any(|d| d.id == descriptor.id) {
            return Err(RegistryError::Duplicate(descriptor.id));
        }
        self.descriptors.push(Arc::new(descriptor));
        Ok(())
    }

    /// Register a batch, excluding (and logging) invalid descriptors.
    pub fn register_all(&mut self, descriptors: Vec<CommandDescriptor>) {
        for descriptor in descriptors {
            let id = descriptor.id;
            if let Err(e) = self.register(descriptor) {
                warn!("Excluding command `{}` from dispatch: {}", id, e);
            }
        }
    }

    pub fn by_id(&self, id: &str) -> Option<Arc<CommandDescriptor>> {
        self.descriptors.iter().find(|d| d.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// How a descriptor was structurally matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Sticker,
    Tag,
    Prefix,
    Fallback,
    Media,
}

/// Outcome of the permission pass over a structural match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOutcome {
    Allowed,
    NotAllowed,
}

/// A resolved command invocation.
#[derive(Debug, Clone)]
pub struct CommandMatch {
    pub descriptor: Arc<CommandDescriptor>,
    pub kind: MatchKind,
    pub permission: PermissionOutcome,
    /// Free-form remainder of the message after the trigger token.
    pub args: String,
}

/// Group-membership lookups, needed for `dm.<group>` permission scopes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Membership: Send + Sync {
    async fn is_member(&self, user: &str, group: &str) -> bool;
}

/// Membership backed by the gateway's group listing.
pub struct GatewayMembership {
    wa: Arc<WaClient>,
}

impl GatewayMembership {
    pub fn new(wa: Arc<WaClient>) -> Self {
        Self { wa }
    }
}

#[async_trait]
impl Membership for GatewayMembership {
    async fn is_member(&self, user: &str, group: &str) -> bool {
        match self.wa.is_member(user, group).await {
            Ok(member) => member,
            Err(e) => {
                warn!("Membership lookup failed for {} in {}: {}", user, group, e);
                false
            }
        }
    }
}

/// Selects at most one descriptor for an inbound message.
pub struct Resolver {
    registry: Arc<CommandRegistry>,
    membership: Arc<dyn Membership>,
    admin_id: Option<String>,
}

impl Resolver {
    pub fn new(
        registry: Arc<CommandRegistry>,
        membership: Arc<dyn Membership>,
        admin_id: Option<String>,
    ) -> Self {
        Self {
            registry,
            membership,
            admin_id,
        }
    }

    /// Resolve a message to a command, applying structural precedence and
    /// then the permission pass.
    pub async fn resolve(&self, message: &BotMessage) -> Option<CommandMatch> {
        let (descriptor, kind, args) = self.structural(message)?;
        let permission = self.check_permission(&descriptor, message).await;

        Some(CommandMatch {
            descriptor,
            kind,
            permission,
            args,
        })
    }

    /// Structural match. Precedence is the explicit ordered list below;
    /// first match wins.
    fn structural(
        &self,
        message: &BotMessage,
    ) -> Option<(Arc<CommandDescriptor>, MatchKind, String)> {
        // 1. Sticker content hash
        if let Some(hash) = &message.sticker_hash {
            if let Some(descriptor) = self
                .registry
                .descriptors
                .iter()
                .find(|d| d.sticker_hashes.iter().any(|h| h == hash))
            {
                return Some((descriptor.clone(), MatchKind::Sticker, String::new()));
            }
        }

        let text = message.text.trim();

        // 2. Tag, only in groups and only if the tag exists for that group
        if message.is_group {
            if let Some(rest) = text.strip_prefix(&self.registry.tag_sigil) {
                let mut tokens = rest.splitn(2, char::is_whitespace);
                let tag = tokens.next().unwrap_or_default().to_lowercase();
                let args = tokens.next().unwrap_or_default().trim().to_string();

                let group = message.group_name.as_deref().unwrap_or_default();
                if let Some(id) = self.registry.tags.lookup(group, &tag) {
                    if let Some(descriptor) = self.registry.by_id(id) {
                        return Some((descriptor, MatchKind::Tag, args));
                    }
                }
                return None;
            }
        }

        // 3. Explicit prefix / 4. fallback free-form
        if let Some(rest) = text.strip_prefix(&self.registry.command_sigil) {
            let mut tokens = rest.splitn(2, char::is_whitespace);
            let mut first = tokens.next().unwrap_or_default().to_lowercase();
            let mut args = tokens.next().unwrap_or_default().trim().to_string();

            // `ayub news` folds to `ayubnews` before the generic scan
            if first == "ayub" {
                let mut sub = args.splitn(2, char::is_whitespace);
                if sub.next().map(str::to_lowercase).as_deref() == Some("news") {
                    first = "ayubnews".into();
                    args = sub.next().unwrap_or_default().trim().to_string();
                }
            }

            if let Some(descriptor) = self
                .registry
                .descriptors
                .iter()
                .find(|d| d.prefixes.iter().any(|p| p.eq_ignore_ascii_case(&first)))
            {
                return Some((descriptor.clone(), MatchKind::Prefix, args));
            }

            // Unmatched sigil text goes to the generic completion command
            if let Some(descriptor) = self.registry.descriptors.iter().find(|d| d.is_fallback) {
                return Some((
                    descriptor.clone(),
                    MatchKind::Fallback,
                    rest.trim().to_string(),
                ));
            }

            return None;
        }

        // 5. Media kind, when no textual prefix applied
        if message.audio.is_some() {
            if let Some(descriptor) = self.registry.descriptors.iter().find(|d| d.handles_audio) {
                return Some((descriptor.clone(), MatchKind::Media, String::new()));
            }
        }

        None
    }

    /// Permission pass. An administrator bypasses every check.
    async fn check_permission(
        &self,
        descriptor: &CommandDescriptor,
        message: &BotMessage,
    ) -> PermissionOutcome {
        if self.admin_id.as_deref() == Some(message.source.as_str()) {
            return PermissionOutcome::Allowed;
        }

        if descriptor.permission.admin_only {
            return PermissionOutcome::NotAllowed;
        }

        for scope in &descriptor.permission.allowed {
            let allowed = match scope {
                Scope::All => true,
                Scope::User(id) => id == &message.source,
                Scope::Group(name) => message.group_name.as_deref() == Some(name.as_str()),
                Scope::DmGroup(name) => {
                    !message.is_group && self.membership.is_member(&message.source, name).await
                }
            };
            if allowed {
                return PermissionOutcome::Allowed;
            }
        }

        PermissionOutcome::NotAllowed
    }
}

/// Command handler: executes one resolved capability.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Descriptor id this handler serves.
    fn id(&self) -> &'static str;

    /// Execute the command. `args` is the free-form remainder after the
    /// trigger token.
    async fn execute(&self, message: &BotMessage, args: &str) -> AppResult<String>;
}

/// Default descriptor set of the bot.
pub fn default_descriptors(
    summary_sticker_hash: Option<&str>,
) -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor {
            id: ids::RESUMO,
            prefixes: vec!["resumo".into()],
            sticker_hashes: summary_sticker_hash.map(String::from).into_iter().collect(),
            handles_audio: false,
            is_fallback: false,
            permission: Permission::everyone(),
            auto_delete: AutoDelete {
                on_error: true,
                on_success: false,
                timeout_ms: 60_000,
            },
            errors: ErrorMessages {
                not_allowed: "Esse comando não está liberado aqui.".into(),
                failure: "Não consegui montar o resumo agora. Tenta de novo daqui a pouco.".into(),
            },
        },
        CommandDescriptor {
            id: ids::NEWS,
            prefixes: vec!["ayubnews".into()],
            sticker_hashes: vec![],
            handles_audio: false,
            is_fallback: false,
            permission: Permission::everyone(),
            auto_delete: AutoDelete::default(),
            errors: ErrorMessages {
                not_allowed: "Esse comando não está liberado aqui.".into(),
                failure: "Não consegui buscar as notícias agora.".into(),
            },
        },
        CommandDescriptor {
            id: ids::TRANSCRIBE,
            prefixes: vec!["transcrever".into()],
            sticker_hashes: vec![],
            handles_audio: true,
            is_fallback: false,
            permission: Permission::everyone(),
            auto_delete: AutoDelete {
                on_error: true,
                on_success: false,
                timeout_ms: 60_000,
            },
            errors: ErrorMessages {
                not_allowed: "Esse comando não está liberado aqui.".into(),
                failure: "Não consegui transcrever esse áudio.".into(),
            },
        },
        CommandDescriptor {
            id: ids::HELP,
            prefixes: vec!["ajuda".into(), "help".into()],
            sticker_hashes: vec![],
            handles_audio: false,
            is_fallback: false,
            permission: Permission::everyone(),
            auto_delete: AutoDelete::default(),
            errors: ErrorMessages {
                not_allowed: "Esse comando não está liberado aqui.".into(),
                failure: "Algo deu errado.".into(),
            },
        },
        CommandDescriptor {
            id: ids::CONFIG,
            prefixes: vec!["config".into()],
            sticker_hashes: vec![],
            handles_audio: false,
            is_fallback: false,
            permission: Permission::admin(),
            auto_delete: AutoDelete::default(),
            errors: ErrorMessages {
                not_allowed: "Só o administrador pode configurar os resumos.".into(),
                failure: "Não consegui abrir a configuração agora.".into(),
            },
        },
        CommandDescriptor {
            id: ids::CHAT,
            prefixes: vec![],
            sticker_hashes: vec![],
            handles_audio: false,
            is_fallback: true,
            permission: Permission::everyone(),
            auto_delete: AutoDelete::default(),
            errors: ErrorMessages {
                not_allowed: "Esse comando não está liberado aqui.".into(),
                failure: "Não consegui falar com o modelo agora. Tenta de novo.".into(),
            },
        },
    ]
}

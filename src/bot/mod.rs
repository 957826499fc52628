//! Chat-command front end for the topic board.
//!
//! Platform-agnostic: the lifecycle logic (authorization, link
//! normalization, mediation API calls, reply wording) lives here; gateway
//! wiring belongs to a [`CommandSource`] adapter. Every handled interaction
//! produces exactly one terminal reply, success or failure.

pub mod client;
pub mod commands;
pub mod roles;
pub mod webhook;

pub use client::{Actor, ApiClient, ApiClientError};
pub use roles::{AuthDecision, RoleOverrides, RoleResolver};
pub use webhook::WebhookNotifier;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{error, info};

use crate::config::Config;
use crate::links::{is_absolute_http_url, normalize_image_link, normalize_link};

/// A parsed command invocation.
#[derive(Debug, Clone)]
pub enum Command {
    Topic {
        title: String,
        link: String,
        image: String,
        description: Option<String>,
    },
    Remove {
        id: i64,
    },
    SetRole {
        role_id: String,
    },
}

/// A command interaction as delivered by a platform adapter.
///
/// The adapter has already acknowledged the interaction within the
/// platform's ack window; the reply returned by [`Bot::handle`] is the
/// single terminal edit.
#[derive(Debug, Clone)]
pub struct Interaction {
    pub command: Command,
    pub actor: Actor,
    /// Role ids the acting member holds.
    pub member_role_ids: Vec<String>,
    /// Whether the member has the platform's manage-guild permission.
    pub can_manage_guild: bool,
    /// Scope for per-guild role overrides, when the platform has guilds.
    pub guild_id: Option<String>,
}

/// The single terminal reply for an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub text: String,
    pub ephemeral: bool,
}

impl CommandReply {
    #[must_use]
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ephemeral: true,
        }
    }
}

/// Platform adapter contract.
///
/// The gateway glue turns platform events into [`Interaction`]s and
/// delivers each [`CommandReply`]. The deferred-ack / single-edit
/// discipline is the adapter's responsibility; the bot guarantees one
/// reply per interaction.
#[async_trait]
pub trait CommandSource: Send {
    /// Receive the next interaction, or `None` when the stream ends.
    async fn next_interaction(&mut self) -> Option<Interaction>;

    /// Deliver the terminal reply for the most recent interaction.
    async fn reply(&mut self, reply: CommandReply) -> Result<()>;
}

/// Drive a [`CommandSource`] to completion.
///
/// A failed delivery is logged and the loop continues; a single bad
/// interaction must never take the process down.
pub async fn run_dispatch<S: CommandSource>(bot: &Bot, source: &mut S) {
    while let Some(interaction) = source.next_interaction().await {
        let reply = bot.handle(interaction).await;
        if let Err(e) = source.reply(reply).await {
            error!("Failed to deliver command reply: {e:#}");
        }
    }
    info!("Command source closed, dispatch loop ending");
}

/// The command front end.
pub struct Bot {
    client: ApiClient,
    resolver: RoleResolver,
    required_role_ids: Vec<String>,
    notifier: WebhookNotifier,
}

impl Bot {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let client = ApiClient::new(
            &config.api_base_url,
            config.api_auth_token.clone(),
            config.request_timeout,
        );
        let resolver = RoleResolver::new(
            RoleOverrides::new(),
            config.default_allowed_role_id.clone(),
        );
        let notifier =
            WebhookNotifier::new(config.log_webhook_url.clone(), config.request_timeout);

        Self {
            client,
            resolver,
            required_role_ids: config.required_role_ids.clone(),
            notifier,
        }
    }

    /// Access the mediation API client (startup probes, adapters).
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.client
    }

    /// Access the audit notifier (startup notice).
    #[must_use]
    pub const fn notifier(&self) -> &WebhookNotifier {
        &self.notifier
    }

    /// Handle one interaction, always producing exactly one reply.
    pub async fn handle(&self, interaction: Interaction) -> CommandReply {
        match self.dispatch(interaction).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Command handler failed: {e:#}");
                CommandReply::ephemeral("Something went wrong. Try again later.")
            }
        }
    }

    async fn dispatch(&self, interaction: Interaction) -> Result<CommandReply> {
        // /setrole is gated by the platform permission, not the allowed
        // role, so it works before any role has been configured.
        if let Command::SetRole { ref role_id } = interaction.command {
            return Ok(self.handle_set_role(&interaction, role_id).await);
        }

        match self.authorize(&interaction).await {
            AuthDecision::Authorized => {}
            AuthDecision::NoRoleConfigured => {
                return Ok(CommandReply::ephemeral(
                    "No allowed role is configured yet. An admin can set one with /setrole.",
                ));
            }
            AuthDecision::MissingRole => {
                return Ok(CommandReply::ephemeral(
                    "You do not have permission to use this command.",
                ));
            }
        }

        match interaction.command {
            Command::Topic {
                ref title,
                ref link,
                ref image,
                ref description,
            } => Ok(self
                .handle_topic(
                    &interaction.actor,
                    title,
                    link,
                    image,
                    description.as_deref(),
                )
                .await),
            Command::Remove { id } => Ok(self.handle_remove(&interaction.actor, id).await),
            Command::SetRole { .. } => unreachable!("handled above"),
        }
    }

    async fn authorize(&self, interaction: &Interaction) -> AuthDecision {
        if !self.required_role_ids.is_empty() {
            return roles::authorize_static(&self.required_role_ids, &interaction.member_role_ids);
        }

        self.resolver
            .authorize(
                interaction.guild_id.as_deref(),
                &interaction.member_role_ids,
                &self.client,
            )
            .await
    }

    async fn handle_topic(
        &self,
        actor: &Actor,
        title: &str,
        link: &str,
        image: &str,
        description: Option<&str>,
    ) -> CommandReply {
        let url = normalize_link(link);
        if url.is_empty() || !is_absolute_http_url(&url) {
            return CommandReply::ephemeral("Your link must start with http:// or https://.");
        }

        let image_url = normalize_image_link(image);
        let description = description.unwrap_or("");

        match self
            .client
            .create_topic(title, &url, description, &image_url, actor)
            .await
        {
            Ok(topic_id) => {
                self.notifier
                    .notify_topic_created(topic_id, title, &url, &image_url, actor)
                    .await;
                CommandReply::ephemeral(format!("Topic created with ID {topic_id}."))
            }
            Err(ApiClientError::Rejected { ref error }) if error == "invalid_url" => {
                CommandReply::ephemeral("Your link must start with http:// or https://.")
            }
            Err(e) => {
                error!("topic.create failed: {e}");
                CommandReply::ephemeral("Creating the topic failed. Try again later.")
            }
        }
    }

    async fn handle_remove(&self, actor: &Actor, id: i64) -> CommandReply {
        match self.client.remove_topic(id, actor).await {
            Ok(removed) => {
                self.notifier.notify_topic_removed(id, removed, actor).await;
                if removed {
                    CommandReply::ephemeral(format!("Removed topic #{id}."))
                } else {
                    CommandReply::ephemeral(format!(
                        "Topic #{id} was not found (or was already removed)."
                    ))
                }
            }
            Err(e) => {
                error!(topic_id = id, "topic.remove failed: {e}");
                CommandReply::ephemeral("Removing the topic failed. Try again later.")
            }
        }
    }

    async fn handle_set_role(&self, interaction: &Interaction, role_id: &str) -> CommandReply {
        if !interaction.can_manage_guild {
            return CommandReply::ephemeral(
                "You need the Manage Server permission to change the allowed role.",
            );
        }

        // Apply the override first so the new role takes effect this
        // session even if persistence fails.
        self.resolver
            .set_override(interaction.guild_id.as_deref(), role_id);

        match self.client.set_role(role_id, &interaction.actor).await {
            Ok(()) => {
                self.notifier
                    .notify_role_set(role_id, true, &interaction.actor)
                    .await;
                CommandReply::ephemeral(format!("Allowed role updated to {role_id}."))
            }
            Err(e) => {
                error!(role_id = %role_id, "config.setRole failed: {e}");
                self.notifier
                    .notify_role_set(role_id, false, &interaction.actor)
                    .await;
                CommandReply::ephemeral(format!(
                    "Allowed role updated to {role_id} for this session only. \
                     Saving it failed, so it will reset when the bot restarts.",
                ))
            }
        }
    }
}

//! Integration tests for the bot command flows, with the mediation API
//! mocked out.

use serde_json::json;
use topic_board::bot::{
    run_dispatch, Actor, ApiClient, Bot, Command, CommandReply, CommandSource, Interaction,
};
use topic_board::bot::{RoleOverrides, RoleResolver};
use topic_board::config::Config;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(api_base_url: &str) -> Config {
    Config {
        api_base_url: api_base_url.to_string(),
        ..Config::for_testing()
    }
}

fn actor() -> Actor {
    Actor {
        user_id: "42".to_string(),
        tag: "a#1".to_string(),
    }
}

fn topic_interaction(link: &str, member_role_ids: &[&str]) -> Interaction {
    Interaction {
        command: Command::Topic {
            title: "Docs".to_string(),
            link: link.to_string(),
            image: "-".to_string(),
            description: None,
        },
        actor: actor(),
        member_role_ids: member_role_ids.iter().map(|s| (*s).to_string()).collect(),
        can_manage_guild: false,
        guild_id: Some("guild-1".to_string()),
    }
}

async fn mock_allowed_role(server: &MockServer, role: Option<&str>) {
    Mock::given(method("GET"))
        .and(path("/internal/config.get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "allowed_role_id": role })))
        .mount(server)
        .await;
}

// ========== Role resolution ==========

#[tokio::test]
async fn test_role_resolution_precedence() {
    let server = MockServer::start().await;
    mock_allowed_role(&server, Some("r2")).await;

    let client = ApiClient::new(&server.uri(), None, std::time::Duration::from_secs(5));

    // Override wins over both the API value and the fallback.
    let resolver = RoleResolver::new(RoleOverrides::new(), Some("r3".to_string()));
    resolver.set_override(None, "r1");
    assert_eq!(
        resolver.effective_role(None, &client).await.as_deref(),
        Some("r1")
    );

    // Without an override, the API value wins over the fallback.
    let resolver = RoleResolver::new(RoleOverrides::new(), Some("r3".to_string()));
    assert_eq!(
        resolver.effective_role(None, &client).await.as_deref(),
        Some("r2")
    );
}

#[tokio::test]
async fn test_role_resolution_falls_back_when_unfetchable() {
    // No mock mounted: config.get connects but 404s.
    let server = MockServer::start().await;
    let client = ApiClient::new(&server.uri(), None, std::time::Duration::from_secs(5));

    let resolver = RoleResolver::new(RoleOverrides::new(), Some("r3".to_string()));
    assert_eq!(
        resolver.effective_role(None, &client).await.as_deref(),
        Some("r3")
    );

    // No fallback either: unconfigured.
    let resolver = RoleResolver::new(RoleOverrides::new(), None);
    assert_eq!(resolver.effective_role(None, &client).await, None);
}

#[tokio::test]
async fn test_role_resolution_api_null_uses_fallback() {
    let server = MockServer::start().await;
    mock_allowed_role(&server, None).await;

    let client = ApiClient::new(&server.uri(), None, std::time::Duration::from_secs(5));
    let resolver = RoleResolver::new(RoleOverrides::new(), Some("r3".to_string()));
    assert_eq!(
        resolver.effective_role(None, &client).await.as_deref(),
        Some("r3")
    );
}

// ========== /topic ==========

#[tokio::test]
async fn test_topic_denied_when_unconfigured() {
    let server = MockServer::start().await;
    mock_allowed_role(&server, None).await;

    let bot = Bot::new(&test_config(&server.uri()));
    let reply = bot.handle(topic_interaction("https://example.com", &["mod"])).await;

    assert!(reply.text.contains("No allowed role is configured"));
    assert!(reply.ephemeral);
}

#[tokio::test]
async fn test_topic_denied_without_role() {
    let server = MockServer::start().await;
    mock_allowed_role(&server, Some("mod")).await;

    let bot = Bot::new(&test_config(&server.uri()));
    let reply = bot
        .handle(topic_interaction("https://example.com", &["member"]))
        .await;

    assert_eq!(
        reply,
        CommandReply::ephemeral("You do not have permission to use this command.")
    );
}

#[tokio::test]
async fn test_topic_normalizes_bare_domain() {
    let server = MockServer::start().await;
    mock_allowed_role(&server, Some("mod")).await;

    Mock::given(method("POST"))
        .and(path("/internal/topic.create"))
        .and(body_partial_json(json!({
            "title": "Docs",
            "url": "https://example.com/readme",
            "image_url": "-",
            "actor": { "userId": "42", "tag": "a#1" },
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "topicId": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let bot = Bot::new(&test_config(&server.uri()));
    let reply = bot
        .handle(topic_interaction("example.com/readme", &["mod"]))
        .await;

    assert_eq!(reply, CommandReply::ephemeral("Topic created with ID 1."));
}

#[tokio::test]
async fn test_topic_rejects_unusable_link_before_calling_api() {
    let server = MockServer::start().await;
    mock_allowed_role(&server, Some("mod")).await;
    // No topic.create mock: reaching the API would fail the test reply.

    let bot = Bot::new(&test_config(&server.uri()));
    let reply = bot.handle(topic_interaction("not a url", &["mod"])).await;

    assert!(reply.text.contains("http:// or https://"));
}

#[tokio::test]
async fn test_topic_api_failure_still_replies_once() {
    let server = MockServer::start().await;
    mock_allowed_role(&server, Some("mod")).await;

    Mock::given(method("POST"))
        .and(path("/internal/topic.create"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "ok": false, "error": "server_error" })),
        )
        .mount(&server)
        .await;

    let bot = Bot::new(&test_config(&server.uri()));
    let reply = bot
        .handle(topic_interaction("https://example.com", &["mod"]))
        .await;

    assert_eq!(
        reply,
        CommandReply::ephemeral("Creating the topic failed. Try again later.")
    );
}

// ========== /remove ==========

fn remove_interaction(id: i64) -> Interaction {
    Interaction {
        command: Command::Remove { id },
        actor: actor(),
        member_role_ids: vec!["mod".to_string()],
        can_manage_guild: false,
        guild_id: None,
    }
}

#[tokio::test]
async fn test_remove_reports_removed_and_not_found() {
    let server = MockServer::start().await;
    mock_allowed_role(&server, Some("mod")).await;

    Mock::given(method("POST"))
        .and(path("/internal/topic.remove"))
        .and(body_partial_json(json!({ "id": 5 })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "removed": true })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/internal/topic.remove"))
        .and(body_partial_json(json!({ "id": 6 })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "removed": false })),
        )
        .mount(&server)
        .await;

    let bot = Bot::new(&test_config(&server.uri()));

    let reply = bot.handle(remove_interaction(5)).await;
    assert_eq!(reply, CommandReply::ephemeral("Removed topic #5."));

    let reply = bot.handle(remove_interaction(6)).await;
    assert!(reply.text.contains("not found"));
}

// ========== /setrole ==========

fn setrole_interaction(role_id: &str, can_manage_guild: bool) -> Interaction {
    Interaction {
        command: Command::SetRole {
            role_id: role_id.to_string(),
        },
        actor: actor(),
        member_role_ids: vec![],
        can_manage_guild,
        guild_id: Some("guild-1".to_string()),
    }
}

#[tokio::test]
async fn test_setrole_requires_manage_guild() {
    let server = MockServer::start().await;

    let bot = Bot::new(&test_config(&server.uri()));
    let reply = bot.handle(setrole_interaction("mod", false)).await;

    assert!(reply.text.contains("Manage Server"));
    // Nothing was persisted.
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_setrole_durable_save() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/internal/config.setRole"))
        .and(body_partial_json(json!({ "roleId": "mod" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let bot = Bot::new(&test_config(&server.uri()));
    let reply = bot.handle(setrole_interaction("mod", true)).await;

    assert_eq!(reply, CommandReply::ephemeral("Allowed role updated to mod."));
}

#[tokio::test]
async fn test_setrole_persist_failure_reports_session_only() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/internal/config.setRole"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "ok": false })))
        .mount(&server)
        .await;
    mock_allowed_role(&server, None).await;

    let bot = Bot::new(&test_config(&server.uri()));
    let reply = bot.handle(setrole_interaction("mod", true)).await;

    // The wording must say the change is not durable.
    assert!(reply.text.contains("session only"));

    // The override still takes effect for gated commands this session,
    // even though the API has no role configured.
    Mock::given(method("POST"))
        .and(path("/internal/topic.create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "topicId": 1 })))
        .mount(&server)
        .await;

    let mut interaction = topic_interaction("https://example.com", &["mod"]);
    interaction.guild_id = Some("guild-1".to_string());
    let reply = bot.handle(interaction).await;
    assert_eq!(reply, CommandReply::ephemeral("Topic created with ID 1."));
}

// ========== Health probe ==========

#[tokio::test]
async fn test_health_probe() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    let bot = Bot::new(&test_config(&server.uri()));
    assert!(bot.api().health().await);
    assert!(!bot.notifier().is_enabled());
}

// ========== Dispatch loop ==========

/// A scripted adapter feeding a fixed set of interactions.
struct ScriptedSource {
    pending: std::collections::VecDeque<Interaction>,
    replies: Vec<CommandReply>,
}

#[async_trait::async_trait]
impl CommandSource for ScriptedSource {
    async fn next_interaction(&mut self) -> Option<Interaction> {
        self.pending.pop_front()
    }

    async fn reply(&mut self, reply: CommandReply) -> anyhow::Result<()> {
        self.replies.push(reply);
        Ok(())
    }
}

#[tokio::test]
async fn test_dispatch_loop_replies_once_per_interaction() {
    let server = MockServer::start().await;
    mock_allowed_role(&server, Some("mod")).await;

    Mock::given(method("POST"))
        .and(path("/internal/topic.create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "topicId": 1 })))
        .mount(&server)
        .await;

    let bot = Bot::new(&test_config(&server.uri()));
    let mut source = ScriptedSource {
        pending: vec![
            topic_interaction("https://example.com", &["mod"]),
            topic_interaction("https://example.com", &["nobody"]),
        ]
        .into(),
        replies: Vec::new(),
    };

    run_dispatch(&bot, &mut source).await;

    assert_eq!(source.replies.len(), 2);
    assert_eq!(source.replies[0].text, "Topic created with ID 1.");
    assert!(source.replies[1].text.contains("permission"));
}

// ========== Static role list scheme ==========

#[tokio::test]
async fn test_required_role_ids_bypass_api() {
    // No config.get mock: the static scheme must not consult the API.
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/internal/topic.create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "topicId": 7 })))
        .mount(&server)
        .await;

    let config = Config {
        required_role_ids: vec!["alpha".to_string(), "beta".to_string()],
        ..test_config(&server.uri())
    };
    let bot = Bot::new(&config);

    let reply = bot
        .handle(topic_interaction("https://example.com", &["beta"]))
        .await;
    assert_eq!(reply, CommandReply::ephemeral("Topic created with ID 7."));

    let reply = bot
        .handle(topic_interaction("https://example.com", &["gamma"]))
        .await;
    assert_eq!(
        reply,
        CommandReply::ephemeral("You do not have permission to use this command.")
    );
}

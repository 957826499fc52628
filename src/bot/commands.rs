//! Command catalog for platform adapters to register.
//!
//! The catalog is data, not behavior: a dispatch adapter turns each entry
//! into its platform's slash-command registration call.

/// Type of a command option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    String,
    Integer,
    Role,
}

/// A single command option.
#[derive(Debug, Clone)]
pub struct OptionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: OptionKind,
    pub required: bool,
}

/// A registerable command.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub options: Vec<OptionSpec>,
    /// Whether invoking requires the platform's manage-guild permission.
    pub requires_manage_guild: bool,
}

/// The full command catalog.
#[must_use]
pub fn catalog() -> Vec<CommandSpec> {
    vec![
        CommandSpec {
            name: "topic",
            description: "Share a new topic link",
            options: vec![
                OptionSpec {
                    name: "title",
                    description: "Topic title",
                    kind: OptionKind::String,
                    required: true,
                },
                OptionSpec {
                    name: "link",
                    description: "Link to share",
                    kind: OptionKind::String,
                    required: true,
                },
                OptionSpec {
                    name: "image",
                    description: "Image link, or - for none",
                    kind: OptionKind::String,
                    required: true,
                },
                OptionSpec {
                    name: "desc",
                    description: "Optional description",
                    kind: OptionKind::String,
                    required: false,
                },
            ],
            requires_manage_guild: false,
        },
        CommandSpec {
            name: "remove",
            description: "Remove a topic by ID",
            options: vec![OptionSpec {
                name: "id",
                description: "Topic ID",
                kind: OptionKind::Integer,
                required: true,
            }],
            requires_manage_guild: false,
        },
        CommandSpec {
            name: "setrole",
            description: "Set the role allowed to use the bot",
            options: vec![OptionSpec {
                name: "role",
                description: "Allowed role",
                kind: OptionKind::Role,
                required: true,
            }],
            requires_manage_guild: true,
        },
    ]
}

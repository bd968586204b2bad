//! Participant selection rules.
//!
//! Test data grants meeting roles with a compact syntax, one string per
//! role:
//!
//! ```text
//! moderators: "role:editingteacher,user:alice"
//! viewers:    "role:student"
//! ```
//!
//! Each comma-separated token is `role:<shortname>` or `user:<username>`.
//! [`ParticipantResolver`] resolves tokens through the [`Directory`] into
//! [`ParticipantRule`]s. Moderators are resolved before viewers, and when
//! any rule results a catch-all `{all, all, viewer}` rule is placed first.
//!
//! With no rules at all the list stays empty and no catch-all is added:
//! everyone may view by default, but once explicit roles are granted the
//! "everyone else" rule has to be spelled out as well.

use crate::collaborators::Directory;
use crate::errors::FixtureError;
use crate::models::InstanceFields;
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, warn};

/// Field holding the moderator selection string.
pub const MODERATORS_FIELD: &str = "moderators";

/// Field holding the viewer selection string.
pub const VIEWERS_FIELD: &str = "viewers";

/// What a rule selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionType {
    All,
    Role,
    User,
}

/// Meeting role granted by a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Moderator,
    Viewer,
}

/// Selected id; `All` only appears on the catch-all rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionId {
    All,
    Id(i64),
}

impl Serialize for SelectionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SelectionId::All => serializer.serialize_str("all"),
            SelectionId::Id(id) => serializer.serialize_str(&id.to_string()),
        }
    }
}

/// A resolved participant rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParticipantRule {
    #[serde(rename = "selectiontype")]
    pub selection_type: SelectionType,
    #[serde(rename = "selectionid")]
    pub selection_id: SelectionId,
    pub role: ParticipantRole,
}

impl ParticipantRule {
    /// The synthesized rule covering everyone not matched otherwise.
    pub fn catch_all() -> Self {
        Self {
            selection_type: SelectionType::All,
            selection_id: SelectionId::All,
            role: ParticipantRole::Viewer,
        }
    }
}

/// Resolves selection strings against a directory.
pub struct ParticipantResolver<'a> {
    directory: &'a dyn Directory,
}

impl<'a> ParticipantResolver<'a> {
    pub fn new(directory: &'a dyn Directory) -> Self {
        Self { directory }
    }

    /// Resolve one selection string into rules granting `role`.
    ///
    /// Tokens are trimmed; empty tokens are skipped.
    ///
    /// # Errors
    ///
    /// - `UnrecognizedSelectionType` for a token without `:` or with a type
    ///   other than `role`/`user`
    /// - `UnknownRole` for a role short name the directory lacks
    /// - `UnknownUser` (a not-found error) for an unknown username
    pub fn resolve_role_field(
        &self,
        field: &str,
        role: ParticipantRole,
    ) -> Result<Vec<ParticipantRule>, FixtureError> {
        let mut rules = Vec::new();

        for token in field.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (selection_type, name) = match token.split_once(':') {
                Some(("role", name)) => (SelectionType::Role, name),
                Some(("user", name)) => (SelectionType::User, name),
                _ => {
                    warn!(target: "bbb.fixtures.participants", token = %token, "Unrecognized selection type");
                    return Err(FixtureError::UnrecognizedSelectionType(token.to_string()));
                }
            };

            let id = match selection_type {
                SelectionType::Role => self
                    .directory
                    .find_role_id(name)?
                    .ok_or_else(|| FixtureError::UnknownRole(name.to_string()))?,
                _ => self
                    .directory
                    .find_user_id(name)?
                    .ok_or_else(|| FixtureError::UnknownUser(name.to_string()))?,
            };

            rules.push(ParticipantRule {
                selection_type,
                selection_id: SelectionId::Id(id),
                role,
            });
        }

        Ok(rules)
    }

    /// Resolve the `moderators` and `viewers` fields, removing them from
    /// `fields`.
    ///
    /// Returns the catch-all rule followed by moderator then viewer rules,
    /// or an empty list when neither field yields a rule.
    pub fn resolve_participants(
        &self,
        fields: &mut InstanceFields,
    ) -> Result<Vec<ParticipantRule>, FixtureError> {
        let mut rules = Vec::new();

        if let Some(value) = fields.shift_remove(MODERATORS_FIELD) {
            let field = selection_text(MODERATORS_FIELD, &value)?;
            rules.extend(self.resolve_role_field(&field, ParticipantRole::Moderator)?);
        }

        if let Some(value) = fields.shift_remove(VIEWERS_FIELD) {
            let field = selection_text(VIEWERS_FIELD, &value)?;
            rules.extend(self.resolve_role_field(&field, ParticipantRole::Viewer)?);
        }

        if !rules.is_empty() {
            rules.insert(0, ParticipantRule::catch_all());
        }

        debug!(target: "bbb.fixtures.participants", rules = rules.len(), "Participants resolved");
        Ok(rules)
    }
}

fn selection_text(name: &str, value: &Value) -> Result<String, FixtureError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok(String::new()),
        other => Err(FixtureError::Configuration(format!(
            "'{}' must be a selection string, got {}",
            name, other
        ))),
    }
}

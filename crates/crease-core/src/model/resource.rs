// ── League resource catalogue ──
//
// Every backend collection the admin manages, with its endpoint, the
// columns worth showing, and the fields a create/update payload must carry.

use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::CoreError;

/// A backend collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Resource {
    Teams,
    Tournaments,
    Players,
    Fixtures,
    Sponsors,
    Voting,
    Users,
}

impl Resource {
    /// Collection endpoint.
    pub fn path(self) -> &'static str {
        match self {
            Self::Teams => "/game/teams/",
            Self::Tournaments => "/game/tournament/",
            Self::Players => "/game/player/",
            Self::Fixtures => "/game/match/",
            Self::Sponsors => "/game/sponsor/",
            Self::Voting => "/game/voting/",
            Self::Users => "/user/",
        }
    }

    /// Item endpoint template with an `{id}` placeholder.
    pub fn item_path(self) -> String {
        crease_api::item_endpoint(self.path())
    }

    /// Singular, human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Teams => "Team",
            Self::Tournaments => "Tournament",
            Self::Players => "Player",
            Self::Fixtures => "Fixture",
            Self::Sponsors => "Sponsor",
            Self::Voting => "Poll",
            Self::Users => "User",
        }
    }

    /// Fields a create or update payload must carry.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Teams | Self::Tournaments | Self::Sponsors => &["name"],
            Self::Voting => &["question"],
            Self::Users => &["email"],
            Self::Players | Self::Fixtures => &[],
        }
    }

    /// Preferred table columns; anything else falls back to record keys.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Teams => &["id", "name", "abbreviation"],
            Self::Tournaments => &["id", "name", "start_date", "end_date"],
            Self::Players => &["id", "full_name", "role", "team"],
            Self::Fixtures => &["id", "team1", "team2", "date", "venue"],
            Self::Sponsors => &["id", "name", "website"],
            Self::Voting => &["id", "question", "is_active"],
            Self::Users => &["id", "full_name", "email", "role"],
        }
    }

    /// Reject a payload that is not an object or lacks a required field.
    /// Empty strings and `null` count as missing.
    pub fn validate(self, payload: &Value) -> Result<(), CoreError> {
        let Some(object) = payload.as_object() else {
            return Err(CoreError::ValidationFailed {
                message: format!("{} payload must be a JSON object", self.label()),
            });
        };

        for field in self.required_fields() {
            let present = match object.get(*field) {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.trim().is_empty(),
                Some(_) => true,
            };
            if !present {
                return Err(CoreError::ValidationFailed {
                    message: format!("{} {field} is required", self.label()),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use strum::IntoEnumIterator;

    #[test]
    fn parses_cli_names() {
        assert_eq!("teams".parse::<Resource>().unwrap(), Resource::Teams);
        assert_eq!("voting".parse::<Resource>().unwrap(), Resource::Voting);
        assert_eq!(Resource::Fixtures.to_string(), "fixtures");
    }

    #[test]
    fn every_collection_has_an_item_template() {
        for resource in Resource::iter() {
            assert!(resource.path().ends_with('/'));
            assert!(resource.item_path().ends_with("{id}/"));
        }
        assert_eq!(Resource::Teams.item_path(), "/game/teams/{id}/");
    }

    #[test]
    fn team_name_is_required() {
        let err = Resource::Teams.validate(&json!({"name": "  "})).unwrap_err();
        assert_eq!(
            err,
            CoreError::ValidationFailed {
                message: "Team name is required".into()
            }
        );
        Resource::Teams
            .validate(&json!({"name": "Lions", "abbreviation": "LIO"}))
            .unwrap();
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert!(Resource::Players.validate(&json!([1, 2])).is_err());
        Resource::Players.validate(&json!({})).unwrap();
    }
}

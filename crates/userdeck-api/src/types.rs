//! Wire types for the users/profiles REST API.
//!
//! Field names use camelCase via `#[serde(rename_all = "camelCase")]`.
//! Every response body passes through [`Envelope`] before reaching callers.

use serde::{Deserialize, Deserializer, Serialize};

// ── Envelope ─────────────────────────────────────────────────────────

/// Response wrapper tolerated on every endpoint.
///
/// The canonical shape is `{ "data": T }`. Update responses may arrive as
/// `{ "user": T }`, and some endpoints answer with the bare payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Data { data: T },
    User { user: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Data { data } | Self::User { user: data } | Self::Bare(data) => data,
        }
    }
}

// ── Users ────────────────────────────────────────────────────────────

/// A user record as returned by `GET /users` and friends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(deserialize_with = "non_empty_string")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub profile_id: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Body for `POST /users` -- every user field except the id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserBody {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    pub is_active: bool,
}

/// Body for `PATCH /users/{id}` -- only the fields being changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Body for `PATCH /users/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusBody {
    pub is_active: bool,
}

// ── Profiles ─────────────────────────────────────────────────────────

/// A profile (role) -- from `GET /profiles`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(deserialize_with = "non_empty_string")]
    pub id: String,
    pub name: String,
}

// ── Error body ───────────────────────────────────────────────────────

/// Error payload; `message` is a string or a list of validation messages.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub message: Option<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    pub(crate) fn into_text(self) -> String {
        match self {
            Self::One(message) => message,
            Self::Many(messages) => messages.join("; "),
        }
    }
}

fn default_active() -> bool {
    true
}

fn non_empty_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    if value.is_empty() {
        return Err(serde::de::Error::custom("identifier must not be empty"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    fn user_json() -> serde_json::Value {
        json!({
            "id": "u1",
            "firstName": "Ana",
            "lastName": "Silva",
            "email": "ana@example.com",
            "profileId": "p1",
            "isActive": true
        })
    }

    #[test]
    fn envelope_accepts_data_user_and_bare_shapes() {
        for body in [
            json!({ "data": user_json() }),
            json!({ "user": user_json() }),
            user_json(),
        ] {
            let user = serde_json::from_value::<Envelope<UserResponse>>(body)
                .unwrap()
                .into_inner();
            assert_eq!(user.id, "u1");
            assert_eq!(user.first_name, "Ana");
        }
    }

    #[test]
    fn envelope_unwraps_data_list_in_order() {
        let body = json!({ "data": [{ "id": "p2", "name": "user" }, { "id": "p1", "name": "admin" }] });
        let profiles = serde_json::from_value::<Envelope<Vec<ProfileResponse>>>(body)
            .unwrap()
            .into_inner();
        let ids: Vec<_> = profiles.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p2", "p1"]);
    }

    #[test]
    fn empty_identifier_is_rejected() {
        let mut body = user_json();
        body["id"] = json!("");
        assert!(serde_json::from_value::<UserResponse>(body).is_err());
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let body = json!({ "id": "u2", "firstName": "B", "lastName": "C", "email": "b@c.d" });
        let user: UserResponse = serde_json::from_value(body).unwrap();
        assert_eq!(user.profile_id, None);
        assert!(user.is_active);
    }

    #[test]
    fn update_body_serializes_only_changed_fields() {
        let body = UpdateUserBody {
            email: Some("new@example.com".into()),
            ..UpdateUserBody::default()
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "email": "new@example.com" })
        );
    }

    #[test]
    fn error_message_list_is_joined() {
        let err: ErrorResponse =
            serde_json::from_value(json!({ "message": ["email must be an email", "firstName should not be empty"] }))
                .unwrap();
        assert_eq!(
            err.message.unwrap().into_text(),
            "email must be an email; firstName should not be empty"
        );
    }
}

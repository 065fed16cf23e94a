//! Data types for the GrowthHub API.
//!
//! Wire shapes for the auth endpoints plus the persisted auth record. The
//! record serializes with camelCase keys to stay interchangeable with the
//! web client's copy of the same slot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bearer credential set returned by login and signup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds.
    pub expires_in: Option<i64>,
    pub token_type: Option<String>,
}

/// The signed-in account. The gateway treats it as opaque profile data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    /// Free-form profile attributes (e.g. `full_name`) set at signup.
    pub user_metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Tenant identity. Every scoped request carries its `id` in the
/// organization header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// The persisted auth record: who is signed in, with what credential, and
/// for which tenant.
///
/// Stored under a single named slot as `{"state": {...}}` with camelCase
/// keys. `current_organization` starts out `None` when the API did not
/// report one at login; the gateway resolves and fills it lazily.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRecord {
    pub user: Option<User>,
    pub session: Option<Session>,
    pub current_organization: Option<Organization>,
}

impl AuthRecord {
    /// Record produced by a successful login or signup.
    pub fn new(
        user: Option<User>,
        session: Option<Session>,
        current_organization: Option<Organization>,
    ) -> Self {
        Self {
            user,
            session,
            current_organization,
        }
    }

    /// Access token of the stored session, if any.
    pub fn access_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.access_token.as_str())
    }
}

/// Response body of `POST /auth/login` and `POST /auth/signup`.
///
/// The organization may come back `null` (e.g. membership rows were created
/// asynchronously); the first tenant-scoped request resolves it.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: Option<User>,
    pub session: Option<Session>,
    pub organization: Option<Organization>,
}

/// One membership row from `GET /auth/organizations`.
///
/// The API returns raw join rows: the organization itself is embedded
/// under the `organizations` key of each row.
#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationMembership {
    pub role: Option<String>,
    #[serde(rename = "organizations")]
    pub organization: Option<Organization>,
}

/// Envelope of `GET /auth/organizations`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationsResponse {
    #[serde(default)]
    pub organizations: Vec<OrganizationMembership>,
}

/// Response body of `GET /auth/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub user: User,
    #[serde(default)]
    pub organizations: Vec<OrganizationMembership>,
}

/// Payload for `POST /auth/signup`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub organization_name: String,
}

/// Acknowledgement body returned by the password-recovery endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_session() -> Session {
        Session {
            access_token: "tok-123".to_string(),
            refresh_token: Some("ref-456".to_string()),
            expires_in: Some(3600),
            token_type: Some("bearer".to_string()),
        }
    }

    #[test]
    fn test_auth_record_serializes_with_camel_case_keys() {
        let record = AuthRecord::new(
            None,
            Some(sample_session()),
            Some(Organization {
                id: "org-1".to_string(),
                name: "Acme".to_string(),
                created_at: None,
            }),
        );

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["currentOrganization"]["id"], "org-1");
        assert_eq!(value["session"]["access_token"], "tok-123");
        assert!(value["user"].is_null());
    }

    #[test]
    fn test_auth_record_round_trips() {
        let record = AuthRecord::new(None, Some(sample_session()), None);
        let raw = serde_json::to_string(&record).unwrap();
        let back: AuthRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.access_token(), Some("tok-123"));
    }

    #[test]
    fn test_membership_row_embeds_organization_under_join_key() {
        let row = json!({
            "user_id": "user-9",
            "organization_id": "org-1",
            "role": "owner",
            "organizations": { "id": "org-1", "name": "Acme" }
        });

        let membership: OrganizationMembership = serde_json::from_value(row).unwrap();
        assert_eq!(membership.role.as_deref(), Some("owner"));
        assert_eq!(membership.organization.unwrap().name, "Acme");
    }

    #[test]
    fn test_membership_row_tolerates_null_join() {
        let row = json!({ "role": "member", "organizations": null });
        let membership: OrganizationMembership = serde_json::from_value(row).unwrap();
        assert!(membership.organization.is_none());
    }

    #[test]
    fn test_auth_response_tolerates_missing_organization() {
        let body = json!({
            "user": { "id": "user-9", "email": "a@b.co" },
            "session": { "access_token": "tok-123" },
            "organization": null
        });

        let auth: AuthResponse = serde_json::from_value(body).unwrap();
        assert!(auth.organization.is_none());
        assert_eq!(auth.session.unwrap().access_token, "tok-123");
    }
}

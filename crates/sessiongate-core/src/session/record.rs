use serde::Serialize;
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Identifier of the signed-in user. The backend issues either numeric or
/// string ids; numbers are kept as the JSON number they were stored as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UserId {
    Number(Number),
    Text(String),
}

impl UserId {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(UserId::Number(n.clone())),
            Value::String(s) => Some(UserId::Text(s.clone())),
            _ => None,
        }
    }
}

/// Text that reads as a JSON number becomes a numeric id, anything else a
/// string id.
impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        match s.parse::<Number>() {
            Ok(n) => UserId::Number(n),
            Err(_) => UserId::Text(s.to_string()),
        }
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserId::Number(n) => write!(f, "{}", n),
            UserId::Text(s) => f.write_str(s),
        }
    }
}

/// The `user` object of a session record.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SessionUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Remaining identity fields (name, email, ...) passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionUser {
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    fn from_object(mut object: Map<String, Value>) -> Self {
        let id = object.remove("id").as_ref().and_then(UserId::from_value);
        let role = match object.remove("role") {
            Some(Value::String(role)) => Some(role),
            _ => None,
        };
        Self {
            id,
            role,
            extra: object,
        }
    }
}

/// A structurally validated session record.
///
/// Every field is optional: the record is written by the login flow with no
/// schema enforced at the storage layer, so a present record may still lack a
/// token or a user.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SessionRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
}

#[derive(Error, Debug)]
pub enum MalformedRecord {
    #[error("Session value is empty")]
    Empty,

    #[error("Session value is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Session value is JSON {0}, expected an object")]
    NotAnObject(&'static str),
}

impl SessionRecord {
    /// Parse the raw stored string.
    ///
    /// Fields with an unexpected type are dropped rather than failing the
    /// whole record: a numeric `token` becomes no token, a string `user`
    /// becomes no user.
    pub fn parse(raw: &str) -> Result<Self, MalformedRecord> {
        if raw.trim().is_empty() {
            return Err(MalformedRecord::Empty);
        }
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, MalformedRecord> {
        let mut object = match value {
            Value::Object(object) => object,
            other => return Err(MalformedRecord::NotAnObject(json_kind(&other))),
        };

        let token = match object.remove("token") {
            Some(Value::String(token)) => Some(token),
            _ => None,
        };
        let user = match object.remove("user") {
            Some(Value::Object(user)) => Some(SessionUser::from_object(user)),
            _ => None,
        };

        Ok(Self { token, user })
    }

    /// The bearer credential, if present and non-empty.
    pub fn bearer_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn user_role(&self) -> Option<&str> {
        self.user.as_ref().and_then(SessionUser::role)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Snapshot of the session store at one point in time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Absent,
    Present(SessionRecord),
}

impl SessionState {
    pub fn record(&self) -> Option<&SessionRecord> {
        match self {
            SessionState::Absent => None,
            SessionState::Present(record) => Some(record),
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, SessionState::Present(_))
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.record().and_then(SessionRecord::bearer_token)
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.record().and_then(|r| r.user.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_record() {
        let record = SessionRecord::parse(
            r#"{"token":"t1","user":{"id":7,"role":"user","name":"Ana"}}"#,
        )
        .expect("valid record");

        assert_eq!(record.bearer_token(), Some("t1"));
        let user = record.user.as_ref().expect("user present");
        assert_eq!(user.id, Some(UserId::Number(7.into())));
        assert_eq!(user.role(), Some("user"));
        assert_eq!(user.extra.get("name"), Some(&Value::from("Ana")));
    }

    #[test]
    fn test_parse_token_only() {
        let record = SessionRecord::parse(r#"{"token":"t1"}"#).expect("valid record");
        assert_eq!(record.bearer_token(), Some("t1"));
        assert!(record.user.is_none());
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(matches!(SessionRecord::parse(""), Err(MalformedRecord::Empty)));
        assert!(matches!(SessionRecord::parse("   "), Err(MalformedRecord::Empty)));
        assert!(matches!(
            SessionRecord::parse("not json"),
            Err(MalformedRecord::InvalidJson(_))
        ));
        assert!(matches!(
            SessionRecord::parse("null"),
            Err(MalformedRecord::NotAnObject("null"))
        ));
        assert!(matches!(
            SessionRecord::parse("[1,2]"),
            Err(MalformedRecord::NotAnObject("array"))
        ));
        assert!(matches!(
            SessionRecord::parse(r#""tok""#),
            Err(MalformedRecord::NotAnObject("string"))
        ));
    }

    #[test]
    fn test_parse_drops_mistyped_fields() {
        let record =
            SessionRecord::parse(r#"{"token":42,"user":"bob"}"#).expect("object is accepted");
        assert_eq!(record.token, None);
        assert_eq!(record.user, None);

        let record = SessionRecord::parse(r#"{"user":{"role":1,"id":true}}"#)
            .expect("object is accepted");
        let user = record.user.expect("user object kept");
        assert_eq!(user.role, None);
        assert_eq!(user.id, None);
    }

    #[test]
    fn test_numeric_ids_keep_their_representation() {
        for raw in [
            r#"{"user":{"id":1.0,"role":"user"}}"#,
            r#"{"user":{"id":9223372036854775808,"role":"user"}}"#,
            r#"{"user":{"id":-3,"role":"user"}}"#,
        ] {
            let record = SessionRecord::parse(raw).expect("valid record");
            assert!(matches!(
                record.user.as_ref().and_then(|u| u.id.as_ref()),
                Some(UserId::Number(_))
            ));
            assert_eq!(record.to_json().expect("serializes"), raw);
        }
    }

    #[test]
    fn test_user_id_from_text() {
        assert_eq!(UserId::from("42"), UserId::Number(42.into()));
        assert_eq!(UserId::from("u-42"), UserId::Text("u-42".to_string()));
        assert_eq!(UserId::from("18446744073709551615").to_string(), "18446744073709551615");
    }

    #[test]
    fn test_empty_token_is_not_a_bearer_token() {
        let record = SessionRecord::parse(r#"{"token":""}"#).expect("valid record");
        assert_eq!(record.token.as_deref(), Some(""));
        assert_eq!(record.bearer_token(), None);
    }

    #[test]
    fn test_to_json_omits_missing_fields() {
        let record = SessionRecord {
            token: Some("t1".to_string()),
            user: Some(SessionUser {
                id: Some(UserId::Text("u-1".to_string())),
                role: Some("admin".to_string()),
                extra: Map::new(),
            }),
        };
        let json = record.to_json().expect("serializes");
        assert_eq!(json, r#"{"token":"t1","user":{"id":"u-1","role":"admin"}}"#);
        assert_eq!(SessionRecord::parse(&json).expect("parses back"), record);

        assert_eq!(SessionRecord::default().to_json().expect("serializes"), "{}");
    }

    #[test]
    fn test_session_state_accessors() {
        assert_eq!(SessionState::Absent.bearer_token(), None);
        assert!(SessionState::Absent.user().is_none());
        assert!(!SessionState::default().is_present());

        let state = SessionState::Present(
            SessionRecord::parse(r#"{"token":"t1","user":{"role":"user"}}"#).expect("valid"),
        );
        assert!(state.is_present());
        assert_eq!(state.bearer_token(), Some("t1"));
        assert_eq!(state.user().and_then(SessionUser::role), Some("user"));
    }
}

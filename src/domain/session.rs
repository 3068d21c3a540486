use serde::{Deserialize, Serialize};

/// Identity of the logged-in user, as returned by the auth endpoints and
/// persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub username: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_reads_either_id_spelling() {
        let from_backend: Session = serde_json::from_str(
            r#"{"_id":"u1","username":"alice","email":"alice@example.com"}"#,
        )
        .unwrap();
        let plain: Session =
            serde_json::from_str(r#"{"id":"u1","username":"alice","email":"alice@example.com"}"#)
                .unwrap();
        assert_eq!(from_backend, plain);
        assert_eq!(serde_json::to_value(&plain).unwrap()["_id"], "u1");
    }
}

use serde::{Deserialize, Serialize};

/// Post categories offered by the board's submission form.
pub const CATEGORIES: &[&str] = &[
    "Community Service",
    "Environmental Initiatives",
    "Educational Programs",
    "Health and Wellness",
    "Animal Welfare",
    "Fundraising Events",
    "Youth Engagement",
    "Senior Support",
    "Emergency Response",
    "Cultural Exchange",
    "Donation Drives",
];

pub fn is_valid_category(category: &str) -> bool {
    CATEGORIES.contains(&category)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub contact: String,
    pub location: String,
    // Compared and echoed verbatim; the login contract has no hashing.
    pub password: String,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub timestamp: String,
    pub author: String,
    pub category: String,
    pub image: Option<String>,
    pub link: Option<String>,
    pub location: Option<String>,
    /// Counted from post_flags at query time.
    pub likes: i64,
    pub reports: i64,
    /// The author's current picture, joined by name.
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub text: String,
    pub author: String,
    pub timestamp: String,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
    pub name: String,
    pub nationality: String,
    pub email: String,
    pub phone: String,
    pub description: String,
    pub timestamp: String,
    pub author: String,
    pub post_title: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub contact: String,
    pub location: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Assembled from the multipart profile form; `profile_picture` is either a
/// freshly stored upload path or the reference the client re-sent.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: String,
    pub contact: String,
    pub location: String,
    pub password: String,
    pub profile_picture: Option<String>,
}

/// Assembled from the multipart post form.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: String,
    pub category: String,
    pub image: Option<String>,
    pub link: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFilter {
    pub author: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditPost {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub text: String,
    pub author: String,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub user_id: i64,
    pub post_id: i64,
    pub name: String,
    pub nationality: String,
    pub email: String,
    pub phone: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_list_matches_submission_form() {
        assert_eq!(CATEGORIES.len(), 11);
        assert!(is_valid_category("Environmental Initiatives"));
        assert!(is_valid_category("Donation Drives"));
    }

    #[test]
    fn unknown_categories_rejected() {
        assert!(!is_valid_category("Knitting Circle"));
        assert!(!is_valid_category("environmental initiatives"));
        assert!(!is_valid_category(""));
    }

    #[test]
    fn user_serializes_with_camel_case_picture() {
        let user = User {
            id: 1,
            name: "Alice".into(),
            username: "alice1".into(),
            contact: "alice@example.com".into(),
            location: "Yokohama".into(),
            password: "pw".into(),
            profile_picture: Some("/uploads/a.png".into()),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["profilePicture"], "/uploads/a.png");
        assert!(json.get("profile_picture").is_none());
    }

    #[test]
    fn application_payload_reads_camel_case_ids() {
        let payload: NewApplication = serde_json::from_str(
            r#"{
                "userId": 3,
                "postId": 7,
                "name": "Bea",
                "nationality": "PH",
                "email": "bea@example.com",
                "phone": "555-0101",
                "description": "Happy to help"
            }"#,
        )
        .unwrap();
        assert_eq!(payload.user_id, 3);
        assert_eq!(payload.post_id, 7);
    }
}

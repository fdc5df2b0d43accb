/// Database row types. These map directly to SQLite rows and stay
/// independent of the warbler-types wire models.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub created_at: String,
}

/// A user built by signup but not yet written. Uniqueness of `username` and
/// `email` is only checked when it is inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: String,
    pub email: String,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: i64,
    pub text: String,
    pub user_id: i64,
    pub author_username: String,
    pub author_image_url: String,
    pub created_at: String,
}

/// Live relationship counts for a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserStats {
    pub messages: i64,
    pub followers: i64,
    pub following: i64,
    pub likes: i64,
}

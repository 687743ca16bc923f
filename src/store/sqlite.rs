use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection};

use crate::clock::jst_timestamp;
use crate::db::models::{
    Application, Comment, Credentials, EditPost, NewApplication, NewComment, NewPost, NewUser,
    Post, PostFilter, ProfileUpdate, User,
};
use crate::error::{AppError, AppResult};
use crate::state::DbPool;
use crate::store::Store;

/// SQLite implementation
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(Clone, Copy)]
enum Flag {
    Liked,
    Reported,
}

impl Flag {
    fn column(self) -> &'static str {
        match self {
            Flag::Liked => "liked",
            Flag::Reported => "reported",
        }
    }

    fn initial_row(self) -> (i64, i64) {
        match self {
            Flag::Liked => (1, 0),
            Flag::Reported => (0, 1),
        }
    }
}

impl SqliteStore {
    /// Shared toggle algorithm: verify the post, upsert the flag row, count
    /// rows with the flag set. Runs as one immediate transaction so
    /// concurrent toggles serialize on the write lock.
    fn toggle(&self, post_id: i64, user_id: i64, flag: Flag) -> AppResult<i64> {
        let conn = self.pool.get()?;

        conn.execute("BEGIN IMMEDIATE", [])?;

        let result: AppResult<i64> = (|| {
            require_post(&conn, post_id)?;

            let column = flag.column();
            let (liked, reported) = flag.initial_row();
            conn.execute(
                &format!(
                    "INSERT INTO post_flags (user_id, post_id, liked, reported)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(user_id, post_id) DO UPDATE SET {column} = NOT {column}"
                ),
                params![user_id, post_id, liked, reported],
            )?;

            let count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM post_flags WHERE post_id = ?1 AND {column} = 1"),
                params![post_id],
                |row| row.get(0),
            )?;

            Ok(count)
        })();

        match result {
            Ok(count) => {
                conn.execute("COMMIT", [])?;
                Ok(count)
            }
            Err(e) => {
                conn.execute("ROLLBACK", [])?;
                Err(e)
            }
        }
    }
}

fn require_post(conn: &Connection, post_id: i64) -> AppResult<()> {
    conn.query_row(
        "SELECT id FROM posts WHERE id = ?1",
        params![post_id],
        |row| row.get::<_, i64>(0),
    )
    .map(|_| ())
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::NotFound("Post not found".to_string()),
        other => other.into(),
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn register(&self, user: NewUser) -> AppResult<i64> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO users (name, username, contact, location, password)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.name,
                user.username,
                user.contact,
                user.location,
                user.password
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    async fn login(&self, credentials: &Credentials) -> AppResult<Option<User>> {
        let conn = self.pool.get()?;

        let result = conn.query_row(
            "SELECT id, name, username, contact, location, password, profile_picture
             FROM users WHERE username = ?1 AND password = ?2",
            params![credentials.username, credentials.password],
            map_user,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn profile(&self, username: &str) -> AppResult<Option<User>> {
        let conn = self.pool.get()?;

        let result = conn.query_row(
            "SELECT id, name, username, contact, location, password, profile_picture
             FROM users WHERE username = ?1",
            params![username],
            map_user,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_profile(&self, username: &str, update: ProfileUpdate) -> AppResult<usize> {
        let conn = self.pool.get()?;

        let rows = conn.execute(
            "UPDATE users SET name = ?1, contact = ?2, location = ?3, password = ?4,
                              profile_picture = ?5
             WHERE username = ?6",
            params![
                update.name,
                update.contact,
                update.location,
                update.password,
                update.profile_picture,
                username
            ],
        )?;

        Ok(rows)
    }

    async fn create_post(&self, post: NewPost) -> AppResult<i64> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO posts (title, content, timestamp, author, category, image, link, location)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                post.title,
                post.content,
                jst_timestamp(),
                post.author,
                post.category,
                post.image,
                post.link,
                post.location
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    async fn list_posts(&self, filter: &PostFilter) -> AppResult<Vec<Post>> {
        let conn = self.pool.get()?;

        let mut sql = String::from(
            "SELECT p.id, p.title, p.content, p.timestamp, p.author, p.category,
                    p.image, p.link, p.location,
                    COALESCE((SELECT COUNT(*) FROM post_flags f
                              WHERE f.post_id = p.id AND f.liked = 1), 0) AS likes,
                    COALESCE((SELECT COUNT(*) FROM post_flags f
                              WHERE f.post_id = p.id AND f.reported = 1), 0) AS reports,
                    (SELECT u.profile_picture FROM users u
                     WHERE u.name = p.author LIMIT 1) AS profile_picture
             FROM posts p",
        );

        // Empty filter values count as absent, like the query params they
        // come from.
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<String> = Vec::new();
        if let Some(author) = filter.author.as_deref().filter(|a| !a.is_empty()) {
            clauses.push("p.author = ?");
            values.push(author.to_string());
        }
        if let Some(title) = filter.title.as_deref().filter(|t| !t.is_empty()) {
            // LIKE is case-insensitive for ASCII under SQLite's default collation
            clauses.push("p.title LIKE '%' || ? || '%'");
            values.push(title.to_string());
        }
        if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
            clauses.push("p.category = ?");
            values.push(category.to_string());
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY p.id DESC");

        let mut stmt = conn.prepare(&sql)?;
        let posts = stmt
            .query_map(params_from_iter(values), |row| {
                Ok(Post {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    content: row.get(2)?,
                    timestamp: row.get(3)?,
                    author: row.get(4)?,
                    category: row.get(5)?,
                    image: row.get(6)?,
                    link: row.get(7)?,
                    location: row.get(8)?,
                    likes: row.get(9)?,
                    reports: row.get(10)?,
                    profile_picture: row.get(11)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(posts)
    }

    async fn edit_post(&self, id: i64, edit: EditPost) -> AppResult<usize> {
        let conn = self.pool.get()?;

        let rows = conn.execute(
            "UPDATE posts SET title = ?1, content = ?2, timestamp = ?3 WHERE id = ?4",
            params![edit.title, edit.content, jst_timestamp(), id],
        )?;

        Ok(rows)
    }

    async fn delete_post(&self, id: i64) -> AppResult<usize> {
        let conn = self.pool.get()?;

        conn.execute("BEGIN IMMEDIATE", [])?;

        let result: AppResult<usize> = (|| {
            conn.execute("DELETE FROM comments WHERE post_id = ?1", params![id])?;
            conn.execute("DELETE FROM applications WHERE post_id = ?1", params![id])?;
            conn.execute("DELETE FROM post_flags WHERE post_id = ?1", params![id])?;
            let rows = conn.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
            Ok(rows)
        })();

        match result {
            Ok(rows) => {
                conn.execute("COMMIT", [])?;
                Ok(rows)
            }
            Err(e) => {
                conn.execute("ROLLBACK", [])?;
                Err(e)
            }
        }
    }

    async fn toggle_like(&self, post_id: i64, user_id: i64) -> AppResult<i64> {
        self.toggle(post_id, user_id, Flag::Liked)
    }

    async fn toggle_report(&self, post_id: i64, user_id: i64) -> AppResult<i64> {
        self.toggle(post_id, user_id, Flag::Reported)
    }

    async fn add_comment(&self, post_id: i64, comment: NewComment) -> AppResult<(i64, String)> {
        let conn = self.pool.get()?;

        require_post(&conn, post_id)?;

        let timestamp = jst_timestamp();
        conn.execute(
            "INSERT INTO comments (post_id, text, author, timestamp, profile_picture)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                post_id,
                comment.text,
                comment.author,
                timestamp,
                comment.profile_picture
            ],
        )?;

        Ok((conn.last_insert_rowid(), timestamp))
    }

    async fn comments_for_post(&self, post_id: i64) -> AppResult<Vec<Comment>> {
        let conn = self.pool.get()?;

        // The author's current picture shadows the snapshot taken at
        // comment time; no user row means no picture.
        let mut stmt = conn.prepare(
            "SELECT c.id, c.post_id, c.text, c.author, c.timestamp,
                    (SELECT u.profile_picture FROM users u
                     WHERE u.name = c.author LIMIT 1) AS profile_picture
             FROM comments c
             WHERE c.post_id = ?1
             ORDER BY c.id DESC",
        )?;

        let comments = stmt
            .query_map(params![post_id], |row| {
                Ok(Comment {
                    id: row.get(0)?,
                    post_id: row.get(1)?,
                    text: row.get(2)?,
                    author: row.get(3)?,
                    timestamp: row.get(4)?,
                    profile_picture: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comments)
    }

    async fn apply(&self, application: NewApplication) -> AppResult<(i64, String)> {
        let conn = self.pool.get()?;

        conn.execute("BEGIN IMMEDIATE", [])?;

        let result: AppResult<(i64, String)> = (|| {
            // Resolve the post's author inside the transaction so the
            // denormalized copy matches the post at apply time.
            let author: String = conn
                .query_row(
                    "SELECT author FROM posts WHERE id = ?1",
                    params![application.post_id],
                    |row| row.get(0),
                )
                .map_err(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => {
                        AppError::NotFound("Post not found".to_string())
                    }
                    other => other.into(),
                })?;

            let timestamp = jst_timestamp();
            conn.execute(
                "INSERT INTO applications
                     (user_id, post_id, name, nationality, email, phone, description,
                      timestamp, author)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    application.user_id,
                    application.post_id,
                    application.name,
                    application.nationality,
                    application.email,
                    application.phone,
                    application.description,
                    timestamp,
                    author
                ],
            )?;

            Ok((conn.last_insert_rowid(), timestamp))
        })();

        match result {
            Ok(created) => {
                conn.execute("COMMIT", [])?;
                Ok(created)
            }
            Err(e) => {
                conn.execute("ROLLBACK", [])?;
                Err(e)
            }
        }
    }

    async fn applications_for_author(&self, author: &str) -> AppResult<Vec<Application>> {
        let conn = self.pool.get()?;

        // Filter on the post's author; the stored copy on the application
        // is a snapshot from apply time.
        let mut stmt = conn.prepare(
            "SELECT a.id, a.user_id, a.post_id, a.name, a.nationality, a.email,
                    a.phone, a.description, a.timestamp, a.author, p.title AS post_title
             FROM applications a
             JOIN posts p ON p.id = a.post_id
             WHERE p.author = ?1
             ORDER BY a.timestamp DESC",
        )?;

        let applications = stmt
            .query_map(params![author], |row| {
                Ok(Application {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    post_id: row.get(2)?,
                    name: row.get(3)?,
                    nationality: row.get(4)?,
                    email: row.get(5)?,
                    phone: row.get(6)?,
                    description: row.get(7)?,
                    timestamp: row.get(8)?,
                    author: row.get(9)?,
                    post_title: row.get(10)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(applications)
    }
}

fn map_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        username: row.get(2)?,
        contact: row.get(3)?,
        location: row.get(4)?,
        password: row.get(5)?,
        profile_picture: row.get(6)?,
    })
}

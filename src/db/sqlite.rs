use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use log::{debug, info};
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqlitePool, SqlitePoolOptions},
    Row, Sqlite,
};
use uuid::Uuid;

use super::PollStore;
use crate::config::Config;
use crate::error::StoreError;
use crate::models::{
    CreatedPoll, Creator, NewParticipant, Participant, PollBallots,
    PollCreationRequest, PollOption, TimeFormat, UserPreferences, Vote, VoteType,
};

const START_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(config: &Config) -> Result<Self, StoreError> {
        Self::connect(&config.database_url, config.max_connections).await
    }

    pub async fn connect(db_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            info!("Creating database at {}", db_url);
            Sqlite::create_database(db_url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(db_url)
            .await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS polls (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                location TEXT,
                description TEXT,
                time_zone TEXT,
                view TEXT NOT NULL,
                creator_kind TEXT NOT NULL,
                creator_name TEXT NOT NULL,
                creator_email TEXT,
                creator_user_id TEXT,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS poll_options (
                id TEXT PRIMARY KEY,
                poll_id TEXT NOT NULL,
                start TEXT NOT NULL,
                duration INTEGER NOT NULL CHECK (duration >= 0),
                position INTEGER NOT NULL,
                UNIQUE (poll_id, start, duration),
                FOREIGN KEY (poll_id) REFERENCES polls(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS participants (
                id TEXT PRIMARY KEY,
                poll_id TEXT NOT NULL,
                name TEXT NOT NULL,
                color TEXT,
                user_id TEXT,
                position INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (poll_id) REFERENCES polls(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        // No row means no vote was cast, which is not the same as 'no'.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS votes (
                participant_id TEXT NOT NULL,
                option_id TEXT NOT NULL,
                poll_id TEXT NOT NULL,
                vote_type TEXT NOT NULL,
                PRIMARY KEY (participant_id, option_id),
                FOREIGN KEY (participant_id) REFERENCES participants(id) ON DELETE CASCADE,
                FOREIGN KEY (option_id) REFERENCES poll_options(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_preferences (
                user_id TEXT PRIMARY KEY,
                time_zone TEXT,
                week_start INTEGER,
                time_format TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn poll_options(&self, poll_id: &str) -> Result<Vec<PollOption>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, start, duration
            FROM poll_options
            WHERE poll_id = ?
            ORDER BY position
            "#,
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<PollOption, StoreError> {
                let start: String = row.try_get("start")?;
                let start = NaiveDateTime::parse_from_str(&start, START_FORMAT)
                    .map_err(|e| StoreError::Corrupt(format!("option start '{}': {}", start, e)))?;
                Ok(PollOption {
                    id: row.try_get("id")?,
                    start,
                    duration: row.try_get("duration")?,
                })
            })
            .collect()
    }

    async fn participant_votes(&self, poll_id: &str) -> Result<HashMap<String, Vec<Vote>>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT v.participant_id, v.option_id, v.vote_type
            FROM votes v
            JOIN poll_options o ON o.id = v.option_id
            WHERE v.poll_id = ?
            ORDER BY o.position
            "#,
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?;

        let mut votes: HashMap<String, Vec<Vote>> = HashMap::new();
        for row in rows {
            let participant_id: String = row.try_get("participant_id")?;
            let raw_type: String = row.try_get("vote_type")?;
            let vote_type = VoteType::parse(&raw_type)
                .ok_or_else(|| StoreError::Corrupt(format!("unknown vote type: {}", raw_type)))?;
            votes.entry(participant_id.clone()).or_default().push(Vote {
                participant_id,
                option_id: row.try_get("option_id")?,
                vote_type,
            });
        }
        Ok(votes)
    }
}

#[async_trait]
impl PollStore for Database {
    async fn create_poll(&self, request: &PollCreationRequest) -> Result<CreatedPoll, StoreError> {
        let poll_id = Uuid::new_v4().to_string();
        let (creator_kind, creator_name, creator_email, creator_user_id) = match &request.creator {
            Creator::Guest(contact) => ("guest", contact.name.as_str(), Some(contact.email.as_str()), None),
            Creator::User { id, name } => ("user", name.as_str(), None, Some(id.as_str())),
        };

        // Poll and options land together or not at all
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO polls (id, title, location, description, time_zone, view, creator_kind, creator_name, creator_email, creator_user_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&poll_id)
        .bind(&request.title)
        .bind(&request.location)
        .bind(&request.description)
        .bind(&request.time_zone)
        .bind(request.view.as_str())
        .bind(creator_kind)
        .bind(creator_name)
        .bind(creator_email)
        .bind(creator_user_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;

        for (i, option) in request.options.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO poll_options (id, poll_id, start, duration, position)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&poll_id)
            .bind(option.start.format(START_FORMAT).to_string())
            .bind(option.duration)
            .bind(i as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("Stored poll {} with {} options", poll_id, request.options.len());

        Ok(CreatedPoll { id: poll_id })
    }

    async fn fetch_ballots(&self, poll_id: &str) -> Result<PollBallots, StoreError> {
        let exists = sqlx::query("SELECT 1 FROM polls WHERE id = ?")
            .bind(poll_id)
            .fetch_optional(&self.pool)
            .await?
            .is_some();
        if !exists {
            return Err(StoreError::NotFound(format!("poll {}", poll_id)));
        }

        let options = self.poll_options(poll_id).await?;
        let mut votes = self.participant_votes(poll_id).await?;

        let rows = sqlx::query(
            r#"
            SELECT id, name, color, user_id
            FROM participants
            WHERE poll_id = ?
            ORDER BY position
            "#,
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?;

        let participants = rows
            .into_iter()
            .map(|row| -> Result<Participant, StoreError> {
                let id: String = row.try_get("id")?;
                Ok(Participant {
                    votes: votes.remove(&id).unwrap_or_default(),
                    id,
                    name: row.try_get("name")?,
                    color: row.try_get("color")?,
                    user_id: row.try_get("user_id")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PollBallots {
            poll_id: poll_id.to_string(),
            options,
            participants,
        })
    }

    async fn add_participant(
        &self,
        poll_id: &str,
        participant: &NewParticipant,
    ) -> Result<Participant, StoreError> {
        let participant_id = Uuid::new_v4().to_string();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO participants (id, poll_id, name, color, user_id, position, created_at)
            VALUES (?, ?, ?, ?, ?, (SELECT COUNT(*) FROM participants WHERE poll_id = ?), ?)
            "#,
        )
        .bind(&participant_id)
        .bind(poll_id)
        .bind(&participant.name)
        .bind(&participant.color)
        .bind(&participant.user_id)
        .bind(poll_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;

        for (option_id, vote_type) in &participant.votes {
            sqlx::query(
                r#"
                INSERT INTO votes (participant_id, option_id, poll_id, vote_type)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(&participant_id)
            .bind(option_id)
            .bind(poll_id)
            .bind(vote_type.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Participant {
            votes: participant
                .votes
                .iter()
                .map(|(option_id, vote_type)| Vote {
                    participant_id: participant_id.clone(),
                    option_id: option_id.clone(),
                    vote_type: *vote_type,
                })
                .collect(),
            id: participant_id,
            name: participant.name.clone(),
            color: participant.color.clone(),
            user_id: participant.user_id.clone(),
        })
    }

    async fn get_user_preferences(&self, user_id: &str) -> Result<Option<UserPreferences>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT time_zone, week_start, time_format
            FROM user_preferences
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let week_start: Option<i64> = row.try_get("week_start")?;
        let week_start = week_start
            .map(|day| u8::try_from(day).map_err(|_| StoreError::Corrupt(format!("week start {}", day))))
            .transpose()?;
        let time_format: Option<String> = row.try_get("time_format")?;
        let time_format = time_format
            .map(|raw| {
                TimeFormat::parse(&raw)
                    .ok_or_else(|| StoreError::Corrupt(format!("unknown time format: {}", raw)))
            })
            .transpose()?;

        Ok(Some(UserPreferences {
            time_zone: row.try_get("time_zone")?,
            week_start,
            time_format,
        }))
    }

    async fn upsert_user_preferences(
        &self,
        user_id: &str,
        preferences: &UserPreferences,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_preferences (user_id, time_zone, week_start, time_format)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id)
            DO UPDATE SET
                time_zone = COALESCE(excluded.time_zone, user_preferences.time_zone),
                week_start = COALESCE(excluded.week_start, user_preferences.week_start),
                time_format = COALESCE(excluded.time_format, user_preferences.time_format)
            "#,
        )
        .bind(user_id)
        .bind(&preferences.time_zone)
        .bind(preferences.week_start.map(i64::from))
        .bind(preferences.time_format.map(|format| format.as_str()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_user_preferences(&self, user_id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM user_preferences WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("preferences for {}", user_id)));
        }
        Ok(())
    }
}

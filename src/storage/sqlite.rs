//! SQLite persistence: ranked listing rows plus the seen-fingerprint log
//! that seeds deduplication on the next run.

use std::collections::HashSet;

use chrono::Utc;
use rusqlite::{Connection, params};
use tracing::info;

use crate::model::{Listing, StorageError};

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database and creates the schema if missing.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS listings (
                id TEXT PRIMARY KEY,
                status TEXT NOT NULL DEFAULT 'New',
                rating REAL NOT NULL,
                price TEXT NOT NULL,
                neighborhood TEXT NOT NULL,
                borough TEXT NOT NULL,
                listing_type TEXT NOT NULL,
                apartment_details TEXT NOT NULL,
                available_from TEXT NOT NULL,
                available_to TEXT NOT NULL,
                furnished TEXT NOT NULL,
                source TEXT NOT NULL,
                link TEXT NOT NULL,
                description TEXT NOT NULL,
                rating_breakdown TEXT NOT NULL,
                contact TEXT NOT NULL,
                scraped_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS seen (
                fingerprint TEXT PRIMARY KEY,
                source TEXT NOT NULL,
                first_seen TEXT NOT NULL
            );
            ",
        )?;

        Ok(Self { conn })
    }

    /// Ids of listings already stored (the output store's primary keys).
    pub fn existing_ids(&self) -> Result<HashSet<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT id FROM listings")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(ids)
    }

    /// Fingerprints recorded by prior runs.
    pub fn seen_fingerprints(&self) -> Result<HashSet<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT fingerprint FROM seen")?;
        let fps = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(fps)
    }

    /// Seed set for the deduplicator: seen log merged with stored ids.
    pub fn seed_fingerprints(&self) -> Result<HashSet<String>, StorageError> {
        let mut seed = self.seen_fingerprints()?;
        seed.extend(self.existing_ids()?);
        Ok(seed)
    }

    /// Appends new listings as display-ready rows and marks their
    /// fingerprints as seen, in one transaction. Listings whose id is
    /// already stored (or empty) are skipped. Returns the number added.
    pub fn append_listings(&mut self, listings: &[Listing]) -> Result<usize, StorageError> {
        let existing = self.existing_ids()?;
        let now = Utc::now().to_rfc3339();

        let tx = self.conn.transaction()?;
        let mut added = 0;
        for listing in listings {
            if listing.id.is_empty() || existing.contains(&listing.id) {
                continue;
            }
            let row = listing.sheet_row();
            tx.execute(
                "INSERT OR IGNORE INTO listings (
                    id, status, rating, price, neighborhood, borough,
                    listing_type, apartment_details, available_from,
                    available_to, furnished, source, link, description,
                    rating_breakdown, contact, scraped_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                params![
                    listing.id,
                    row[0],
                    listing.rating,
                    row[2],
                    row[3],
                    row[4],
                    row[5],
                    row[6],
                    row[7],
                    row[8],
                    row[9],
                    row[10],
                    row[11],
                    row[12],
                    row[13],
                    row[14],
                    row[15],
                ],
            )?;
            tx.execute(
                "INSERT OR IGNORE INTO seen (fingerprint, source, first_seen)
                 VALUES (?1, ?2, ?3)",
                params![listing.id, listing.source.to_string(), now],
            )?;
            added += 1;
        }
        tx.commit()?;

        info!("Added {added} new listings to storage");
        Ok(added)
    }

    /// Records fingerprints without storing rows (used when a run decides
    /// to suppress a listing but must not resurface it later).
    pub fn mark_seen_batch(&mut self, entries: &[(String, String)]) -> Result<(), StorageError> {
        if entries.is_empty() {
            return Ok(());
        }
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        for (fingerprint, source) in entries {
            tx.execute(
                "INSERT OR IGNORE INTO seen (fingerprint, source, first_seen)
                 VALUES (?1, ?2, ?3)",
                params![fingerprint, source, now],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

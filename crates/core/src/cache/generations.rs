//! Generation-partitioned entry storage.
//!
//! A generation is a named partition (`infovault-static-v1.0.0`, ...). Entries
//! are keyed by resource identity within a generation and are always written
//! whole: a single UPSERT per entry, or one transaction for a batch.

use super::connection::CacheDb;
use crate::Error;
use crate::http::{ResourceId, Response};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// An immutable snapshot of a prior response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub generation: String,
    pub key: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub stored_at: String,
}

impl StoredEntry {
    /// Replay the snapshot as a response.
    pub fn to_response(&self) -> Response {
        Response {
            url: self.url.clone(),
            status: self.status,
            headers: self.headers.clone(),
            body: Bytes::from(self.body.clone()),
        }
    }
}

/// Summary of one generation.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GenerationInfo {
    pub name: String,
    pub created_at: String,
    pub entry_count: u64,
    pub total_bytes: u64,
}

const SELECT_ENTRY: &str = "SELECT generation, key, method, url, status, headers_json, body, stored_at FROM entries";

fn read_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<(StoredEntry, String)> {
    let headers_json: String = row.get(5)?;
    let entry = StoredEntry {
        generation: row.get(0)?,
        key: row.get(1)?,
        method: row.get(2)?,
        url: row.get(3)?,
        status: row.get(4)?,
        headers: Vec::new(),
        body: row.get(6)?,
        stored_at: row.get(7)?,
    };
    Ok((entry, headers_json))
}

fn decode_headers((mut entry, headers_json): (StoredEntry, String)) -> Result<StoredEntry, Error> {
    entry.headers = serde_json::from_str(&headers_json)
        .map_err(|e| Error::CorruptEntry(format!("{} in {}: {e}", entry.url, entry.generation)))?;
    Ok(entry)
}

fn upsert_entry(
    conn: &rusqlite::Connection, generation: &str, id: &ResourceId, response: &Response, stored_at: &str,
) -> Result<(), Error> {
    let headers_json = serde_json::to_string(&response.headers)
        .map_err(|e| Error::InvalidInput(format!("unserializable headers: {e}")))?;

    conn.execute(
        "INSERT OR IGNORE INTO generations (name, created_at) VALUES (?1, ?2)",
        params![generation, stored_at],
    )?;
    conn.execute(
        "INSERT INTO entries (generation, key, method, url, status, headers_json, body, body_len, stored_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(generation, key) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            status = excluded.status,
            headers_json = excluded.headers_json,
            body = excluded.body,
            body_len = excluded.body_len,
            stored_at = excluded.stored_at",
        params![
            generation,
            id.key(),
            &id.method,
            &id.url,
            response.status,
            headers_json,
            response.body.as_ref(),
            response.body.len() as i64,
            stored_at,
        ],
    )?;
    Ok(())
}

impl CacheDb {
    /// Open a generation, creating it if it doesn't exist yet.
    pub async fn open_generation(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO generations (name, created_at) VALUES (?1, ?2)",
                    params![name, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Store a snapshot of `response` under `id`, replacing any prior entry.
    ///
    /// The generation is created implicitly on first write.
    pub async fn put(&self, generation: &str, id: &ResourceId, response: &Response) -> Result<(), Error> {
        let generation = generation.to_string();
        let id = id.clone();
        let response = response.clone();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                upsert_entry(&tx, &generation, &id, &response, &now)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Store a batch of entries in one transaction. Either all land or none do.
    ///
    /// Returns the number of entries written.
    pub async fn put_all(&self, generation: &str, entries: Vec<(ResourceId, Response)>) -> Result<usize, Error> {
        let generation = generation.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO generations (name, created_at) VALUES (?1, ?2)",
                    params![&generation, &now],
                )?;
                for (id, response) in &entries {
                    upsert_entry(&tx, &generation, id, response, &now)?;
                }
                tx.commit()?;
                Ok(entries.len())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up an identity within one generation.
    pub async fn get_entry(&self, generation: &str, id: &ResourceId) -> Result<Option<StoredEntry>, Error> {
        let generation = generation.to_string();
        let key = id.key();
        let found = self
            .conn
            .call(move |conn| -> Result<Option<(StoredEntry, String)>, Error> {
                let mut stmt = conn.prepare(&format!("{SELECT_ENTRY} WHERE generation = ?1 AND key = ?2"))?;
                match stmt.query_row(params![generation, key], read_entry) {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        found.map(decode_headers).transpose()
    }

    /// Look up an identity across every generation, oldest generation first.
    pub async fn match_any(&self, id: &ResourceId) -> Result<Option<StoredEntry>, Error> {
        let key = id.key();
        let found = self
            .conn
            .call(move |conn| -> Result<Option<(StoredEntry, String)>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT e.generation, e.key, e.method, e.url, e.status, e.headers_json, e.body, e.stored_at
                     FROM entries e JOIN generations g ON g.name = e.generation
                     WHERE e.key = ?1
                     ORDER BY g.created_at ASC, g.name ASC
                     LIMIT 1",
                )?;
                match stmt.query_row(params![key], read_entry) {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        found.map(decode_headers).transpose()
    }

    /// Enumerate generation names.
    pub async fn generation_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM generations ORDER BY created_at ASC, name ASC")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a generation and every entry in it.
    ///
    /// Returns false if the generation did not exist.
    pub async fn delete_generation(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM entries WHERE generation = ?1", params![&name])?;
                let deleted = tx.execute("DELETE FROM generations WHERE name = ?1", params![&name])?;
                tx.commit()?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries stored in a generation.
    pub async fn entry_count(&self, generation: &str) -> Result<u64, Error> {
        let generation = generation.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE generation = ?1",
                    params![generation],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Summaries for every generation.
    pub async fn list_generations(&self) -> Result<Vec<GenerationInfo>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<GenerationInfo>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT g.name, g.created_at, COUNT(e.key), COALESCE(SUM(e.body_len), 0)
                     FROM generations g LEFT JOIN entries e ON e.generation = g.name
                     GROUP BY g.name, g.created_at
                     ORDER BY g.created_at ASC, g.name ASC",
                )?;
                let infos = stmt
                    .query_map([], |row| {
                        Ok(GenerationInfo {
                            name: row.get(0)?,
                            created_at: row.get(1)?,
                            entry_count: row.get::<_, i64>(2)? as u64,
                            total_bytes: row.get::<_, i64>(3)? as u64,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(infos)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Request;
    use url::Url;

    fn request(path: &str) -> Request {
        let base = Url::parse("http://localhost:5173").unwrap();
        Request::parse("GET", path, &base).unwrap()
    }

    fn response(req: &Request, body: &'static str) -> Response {
        Response {
            url: req.url.to_string(),
            status: 200,
            headers: vec![("content-type".into(), "text/plain".into())],
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let req = request("/src/main.js");
        db.put("static-v1", &req.identity(), &response(&req, "console.log(1)"))
            .await
            .unwrap();

        let entry = db.get_entry("static-v1", &req.identity()).await.unwrap().unwrap();
        assert_eq!(entry.body, b"console.log(1)");
        assert_eq!(entry.status, 200);
        assert_eq!(entry.headers, vec![("content-type".to_string(), "text/plain".to_string())]);
        assert_eq!(entry.to_response(), response(&req, "console.log(1)"));
    }

    #[tokio::test]
    async fn test_get_scoped_to_generation() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let req = request("/api/data");
        db.put("dynamic-v1", &req.identity(), &response(&req, "{}")).await.unwrap();

        assert!(db.get_entry("static-v1", &req.identity()).await.unwrap().is_none());
        assert!(db.get_entry("dynamic-v1", &req.identity()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_put_overwrites_whole_entry() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let req = request("/api/data");
        db.put("dynamic-v1", &req.identity(), &response(&req, "old")).await.unwrap();

        let mut newer = response(&req, "new");
        newer.headers = vec![("etag".into(), "\"2\"".into())];
        db.put("dynamic-v1", &req.identity(), &newer).await.unwrap();

        let entry = db.get_entry("dynamic-v1", &req.identity()).await.unwrap().unwrap();
        assert_eq!(entry.body, b"new");
        assert_eq!(entry.headers, vec![("etag".to_string(), "\"2\"".to_string())]);
        assert_eq!(db.entry_count("dynamic-v1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_generation_created_on_first_write() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.generation_names().await.unwrap().is_empty());

        let req = request("/");
        db.put("static-v1", &req.identity(), &response(&req, "<html>")).await.unwrap();
        assert_eq!(db.generation_names().await.unwrap(), vec!["static-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_put_all_and_list() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let a = request("/");
        let b = request("/index.html");
        let written = db
            .put_all(
                "static-v1",
                vec![(a.identity(), response(&a, "root")), (b.identity(), response(&b, "index"))],
            )
            .await
            .unwrap();
        assert_eq!(written, 2);

        let infos = db.list_generations().await.unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].name, "static-v1");
        assert_eq!(infos[0].entry_count, 2);
        assert_eq!(infos[0].total_bytes, 9);
    }

    #[tokio::test]
    async fn test_delete_generation() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let req = request("/");
        db.put("static-v0", &req.identity(), &response(&req, "old")).await.unwrap();
        db.open_generation("static-v1").await.unwrap();

        assert!(db.delete_generation("static-v0").await.unwrap());
        assert!(!db.delete_generation("static-v0").await.unwrap());
        assert_eq!(db.generation_names().await.unwrap(), vec!["static-v1".to_string()]);
        assert!(db.match_any(&req.identity()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_generation_is_empty() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_generation("static-v1").await.unwrap();
        db.open_generation("static-v1").await.unwrap();

        assert_eq!(db.generation_names().await.unwrap().len(), 1);
        assert_eq!(db.entry_count("static-v1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_match_any_searches_all_generations() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let req = request("/icons/icon-72x72.png");
        db.put("dynamic-v1", &req.identity(), &response(&req, "png")).await.unwrap();

        let entry = db.match_any(&req.identity()).await.unwrap().unwrap();
        assert_eq!(entry.generation, "dynamic-v1");
    }
}

use crate::enhancements::EnhancementConfig;
use crate::error::{LinkpearlError, Result};
use crate::flags;
use crate::models::{CatalogRecord, Item, ItemSelection, ScrapedTooltip};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, params, params_from_iter};

pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

/// Outcome of a relationship-linking run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LinkReport {
    pub enhancements_linked: usize,
    pub conversions_linked: usize,
    pub names_missing: usize,
}

impl Database {
    pub fn new(path: &std::path::Path) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.pragma_update(None, "foreign_keys", "ON")?;
            Ok(())
        });
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(LinkpearlError::Pool)?;

        let db = Self { pool };
        db.run_migrations()?;
        Ok(db)
    }

    pub fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(LinkpearlError::Pool)
    }

    fn run_migrations(&self) -> Result<()> {
        let mut conn = self.connection()?;

        conn.pragma_update(None, "foreign_keys", "ON")?;

        let tx = conn.transaction()?;

        tx.execute_batch(
            r#"
            -- Item catalog schema
            CREATE TABLE IF NOT EXISTS items (
                item_id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                flags INTEGER NOT NULL DEFAULT 0,
                is_rare INTEGER NOT NULL DEFAULT 0,
                is_exclusive INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_items_name ON items(name);

            -- Scraped tooltip schema; line and effect sequences are JSON arrays
            CREATE TABLE IF NOT EXISTS item_wiki_tooltips (
                item_id INTEGER PRIMARY KEY,
                tooltip_lines TEXT NOT NULL,
                hidden_effects TEXT NOT NULL,
                wiki_description TEXT NOT NULL,
                wiki_url TEXT NOT NULL,
                last_scraped TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (item_id) REFERENCES items(item_id) ON DELETE CASCADE
            );

            -- Curated upgrade relationships
            CREATE TABLE IF NOT EXISTS item_enhancements (
                id INTEGER PRIMARY KEY,
                base_item_id INTEGER NOT NULL,
                enhanced_item_id INTEGER NOT NULL,
                level INTEGER NOT NULL,
                FOREIGN KEY (base_item_id) REFERENCES items(item_id) ON DELETE CASCADE,
                FOREIGN KEY (enhanced_item_id) REFERENCES items(item_id) ON DELETE CASCADE,
                UNIQUE(base_item_id, level)
            );

            CREATE TABLE IF NOT EXISTS item_conversions (
                id INTEGER PRIMARY KEY,
                item_id INTEGER NOT NULL,
                converts_to_item_id INTEGER NOT NULL,
                FOREIGN KEY (item_id) REFERENCES items(item_id) ON DELETE CASCADE,
                FOREIGN KEY (converts_to_item_id) REFERENCES items(item_id) ON DELETE CASCADE,
                UNIQUE(item_id, converts_to_item_id)
            );

            CREATE INDEX IF NOT EXISTS idx_item_enhancements_base ON item_enhancements(base_item_id);
            CREATE INDEX IF NOT EXISTS idx_item_conversions_target ON item_conversions(converts_to_item_id);
            "#,
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Insert or update catalog rows from an exported item dataset.
    /// Returns the number of rows written.
    pub fn insert_or_update_items(&self, records: &[CatalogRecord]) -> Result<usize> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;

        let mut written = 0;

        for record in records {
            tx.execute(
                "INSERT INTO items (item_id, name, flags)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(item_id) DO UPDATE SET
                    name = excluded.name,
                    flags = excluded.flags",
                params![record.item_id, record.name, record.flags],
            )?;
            written += 1;
        }

        tx.commit()?;
        Ok(written)
    }

    /// Catalog lookup: internal name to item id.
    pub fn item_id_by_name(&self, name: &str) -> Result<Option<i32>> {
        let conn = self.connection()?;
        let id = conn
            .query_row(
                "SELECT item_id FROM items WHERE name = ?",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Catalog lookup: item id to internal name.
    pub fn item_name_by_id(&self, item_id: i32) -> Result<Option<String>> {
        let conn = self.connection()?;
        let name = conn
            .query_row(
                "SELECT name FROM items WHERE item_id = ?",
                params![item_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name)
    }

    /// Items matching a scrape selection policy, ordered by name.
    pub fn select_items(&self, selection: &ItemSelection) -> Result<Vec<Item>> {
        let conn = self.connection()?;

        let map_row = |row: &rusqlite::Row| -> rusqlite::Result<Item> {
            Ok(Item {
                item_id: row.get(0)?,
                name: row.get(1)?,
                flags: row.get(2)?,
                is_rare: row.get(3)?,
                is_exclusive: row.get(4)?,
            })
        };

        let items = match selection {
            ItemSelection::MissingTooltips => {
                let mut stmt = conn.prepare(
                    "SELECT i.item_id, i.name, i.flags, i.is_rare, i.is_exclusive
                     FROM items i
                     LEFT JOIN item_wiki_tooltips t ON i.item_id = t.item_id
                     WHERE t.item_id IS NULL
                     ORDER BY i.name",
                )?;
                let rows = stmt.query_map([], map_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            ItemSelection::ConversionTargets => {
                let mut stmt = conn.prepare(
                    "SELECT DISTINCT i.item_id, i.name, i.flags, i.is_rare, i.is_exclusive
                     FROM items i
                     JOIN item_conversions c ON i.item_id = c.converts_to_item_id
                     ORDER BY i.name",
                )?;
                let rows = stmt.query_map([], map_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            ItemSelection::Named(names) => {
                if names.is_empty() {
                    return Ok(Vec::new());
                }
                let placeholders = vec!["?"; names.len()].join(", ");
                let sql = format!(
                    "SELECT i.item_id, i.name, i.flags, i.is_rare, i.is_exclusive
                     FROM items i
                     WHERE i.name IN ({})
                     ORDER BY i.name",
                    placeholders
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params_from_iter(names.iter()), map_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };

        Ok(items)
    }

    /// Create or fully replace the tooltip record for one item. Every column
    /// is overwritten and the scrape timestamp refreshed; there is no merge
    /// with a prior record.
    pub fn upsert_tooltip(
        &self,
        item_id: i32,
        tooltip_lines: &[String],
        hidden_effects: &[String],
        description: &str,
        source_url: &str,
    ) -> Result<()> {
        let conn = self.connection()?;

        let lines_json = serde_json::to_string(tooltip_lines)?;
        let effects_json = serde_json::to_string(hidden_effects)?;

        conn.execute(
            "INSERT INTO item_wiki_tooltips
                (item_id, tooltip_lines, hidden_effects, wiki_description, wiki_url)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(item_id) DO UPDATE SET
                tooltip_lines = excluded.tooltip_lines,
                hidden_effects = excluded.hidden_effects,
                wiki_description = excluded.wiki_description,
                wiki_url = excluded.wiki_url,
                last_scraped = CURRENT_TIMESTAMP",
            params![item_id, lines_json, effects_json, description, source_url],
        )?;

        Ok(())
    }

    /// Read back the stored tooltip record for an item.
    pub fn get_tooltip(&self, item_id: i32) -> Result<Option<ScrapedTooltip>> {
        let conn = self.connection()?;

        let row = conn
            .query_row(
                "SELECT tooltip_lines, hidden_effects, wiki_description, wiki_url, last_scraped
                 FROM item_wiki_tooltips
                 WHERE item_id = ?",
                params![item_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((lines_json, effects_json, description, source_url, scraped_at)) = row else {
            return Ok(None);
        };

        Ok(Some(ScrapedTooltip {
            item_id,
            tooltip_lines: serde_json::from_str(&lines_json)?,
            hidden_effects: serde_json::from_str(&effects_json)?,
            description,
            source_url,
            scraped_at,
        }))
    }

    /// Decode every item's flag mask into the is_rare / is_exclusive columns.
    /// Returns the number of rows updated.
    pub fn annotate_flag_columns(&self, quiet: u8) -> Result<usize> {
        let conn = self.connection()?;

        let updated = conn.execute(
            "UPDATE items SET
                is_rare = (flags & ?1) != 0,
                is_exclusive = (flags & ?2) != 0",
            params![flags::RARE, flags::EXCLUSIVE],
        )?;

        if quiet == 0 {
            tracing::info!("Annotated rarity columns on {} items", updated);
        }

        Ok(updated)
    }

    /// Write curated upgrade relationships, resolving internal names to ids.
    /// Unknown names are counted and logged, never fatal.
    pub fn link_enhancements(&self, config: &EnhancementConfig, quiet: u8) -> Result<LinkReport> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;

        let mut report = LinkReport::default();

        let lookup = |tx: &rusqlite::Transaction, name: &str| -> Result<Option<i32>> {
            let id = tx
                .query_row(
                    "SELECT item_id FROM items WHERE name = ?",
                    params![name],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(id)
        };

        for entry in &config.enhancements {
            let base_id = lookup(&tx, &entry.base)?;
            let enhanced_id = lookup(&tx, &entry.enhanced)?;

            match (base_id, enhanced_id) {
                (Some(base), Some(enhanced)) => {
                    tx.execute(
                        "INSERT INTO item_enhancements (base_item_id, enhanced_item_id, level)
                         VALUES (?1, ?2, ?3)
                         ON CONFLICT(base_item_id, level) DO UPDATE SET
                            enhanced_item_id = excluded.enhanced_item_id",
                        params![base, enhanced, entry.level],
                    )?;
                    report.enhancements_linked += 1;
                }
                _ => {
                    report.names_missing += 1;
                    if quiet < 2 {
                        tracing::warn!(
                            "Enhancement entry {} -> {} references an unknown item",
                            entry.base,
                            entry.enhanced
                        );
                    }
                }
            }
        }

        for entry in &config.conversions {
            let from_id = lookup(&tx, &entry.from)?;
            let to_id = lookup(&tx, &entry.to)?;

            match (from_id, to_id) {
                (Some(from), Some(to)) => {
                    tx.execute(
                        "INSERT OR IGNORE INTO item_conversions (item_id, converts_to_item_id)
                         VALUES (?1, ?2)",
                        params![from, to],
                    )?;
                    report.conversions_linked += 1;
                }
                _ => {
                    report.names_missing += 1;
                    if quiet < 2 {
                        tracing::warn!(
                            "Conversion entry {} -> {} references an unknown item",
                            entry.from,
                            entry.to
                        );
                    }
                }
            }
        }

        tx.commit()?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&dir.path().join("test.sqlite")).unwrap();
        (dir, db)
    }

    fn seed_items(db: &Database, names: &[(&str, i32)]) {
        let records: Vec<CatalogRecord> = names
            .iter()
            .enumerate()
            .map(|(index, (name, flags))| CatalogRecord {
                item_id: index as i32 + 1,
                name: name.to_string(),
                flags: *flags,
            })
            .collect();
        db.insert_or_update_items(&records).unwrap();
    }

    #[test]
    fn test_item_lookup_both_ways() {
        let (_dir, db) = test_db();
        seed_items(&db, &[("byakkos_haidate", 0), ("scarecrow_scythe", 0)]);

        assert_eq!(db.item_id_by_name("byakkos_haidate").unwrap(), Some(1));
        assert_eq!(
            db.item_name_by_id(2).unwrap(),
            Some("scarecrow_scythe".to_string())
        );
        assert_eq!(db.item_id_by_name("no_such_item").unwrap(), None);
        assert_eq!(db.item_name_by_id(99).unwrap(), None);
    }

    #[test]
    fn test_import_upserts_by_id() {
        let (_dir, db) = test_db();
        seed_items(&db, &[("old_name", 0)]);

        db.insert_or_update_items(&[CatalogRecord {
            item_id: 1,
            name: "new_name".to_string(),
            flags: 4,
        }])
        .unwrap();

        assert_eq!(db.item_id_by_name("old_name").unwrap(), None);
        assert_eq!(db.item_id_by_name("new_name").unwrap(), Some(1));
    }

    #[test]
    fn test_tooltip_round_trip() {
        let (_dir, db) = test_db();
        seed_items(&db, &[("byakkos_haidate", 0)]);

        let lines = vec!["[Legs]All Races".to_string(), "DEF:42 DEX+15".to_string()];
        let effects = vec!["Increases movement speed at night".to_string()];

        db.upsert_tooltip(
            1,
            &lines,
            &effects,
            "Haidate once worn by Byakko.",
            "https://example.test/wiki/Byakko%27s_Haidate",
        )
        .unwrap();

        let stored = db.get_tooltip(1).unwrap().unwrap();
        assert_eq!(stored.tooltip_lines, lines);
        assert_eq!(stored.hidden_effects, effects);
        assert_eq!(stored.description, "Haidate once worn by Byakko.");
        assert_eq!(
            stored.source_url,
            "https://example.test/wiki/Byakko%27s_Haidate"
        );
        assert!(!stored.scraped_at.is_empty());
    }

    #[test]
    fn test_upsert_replaces_whole_record() {
        let (_dir, db) = test_db();
        seed_items(&db, &[("zenith_crown", 0)]);

        db.upsert_tooltip(
            1,
            &["old line".to_string()],
            &["old effect".to_string()],
            "old description",
            "https://example.test/old",
        )
        .unwrap();

        db.upsert_tooltip(1, &["new line".to_string()], &[], "", "https://example.test/new")
            .unwrap();

        let stored = db.get_tooltip(1).unwrap().unwrap();
        assert_eq!(stored.tooltip_lines, vec!["new line"]);
        assert!(stored.hidden_effects.is_empty());
        assert_eq!(stored.description, "");
        assert_eq!(stored.source_url, "https://example.test/new");
    }

    #[test]
    fn test_missing_tooltip_reads_none() {
        let (_dir, db) = test_db();
        seed_items(&db, &[("zenith_crown", 0)]);
        assert!(db.get_tooltip(1).unwrap().is_none());
    }

    #[test]
    fn test_select_missing_tooltips() {
        let (_dir, db) = test_db();
        seed_items(&db, &[("alpha_ring", 0), ("beta_ring", 0)]);

        db.upsert_tooltip(1, &["line".to_string()], &[], "", "https://example.test")
            .unwrap();

        let items = db.select_items(&ItemSelection::MissingTooltips).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "beta_ring");
    }

    #[test]
    fn test_select_named() {
        let (_dir, db) = test_db();
        seed_items(&db, &[("alpha_ring", 0), ("beta_ring", 0), ("gamma_ring", 0)]);

        let items = db
            .select_items(&ItemSelection::Named(vec![
                "gamma_ring".to_string(),
                "alpha_ring".to_string(),
            ]))
            .unwrap();
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["alpha_ring", "gamma_ring"]);
    }

    #[test]
    fn test_select_named_empty_list() {
        let (_dir, db) = test_db();
        seed_items(&db, &[("alpha_ring", 0)]);
        let items = db.select_items(&ItemSelection::Named(Vec::new())).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_annotate_flag_columns() {
        let (_dir, db) = test_db();
        seed_items(
            &db,
            &[("optical_hat", 63572), ("timepiece", 61504), ("beehive_chip", 0)],
        );

        let updated = db.annotate_flag_columns(2).unwrap();
        assert_eq!(updated, 3);

        let items = db.select_items(&ItemSelection::MissingTooltips).unwrap();
        let optical = items.iter().find(|i| i.name == "optical_hat").unwrap();
        assert!(optical.is_rare);
        assert!(optical.is_exclusive);

        let timepiece = items.iter().find(|i| i.name == "timepiece").unwrap();
        assert!(!timepiece.is_rare);
        assert!(timepiece.is_exclusive);

        let chip = items.iter().find(|i| i.name == "beehive_chip").unwrap();
        assert!(!chip.is_rare);
        assert!(!chip.is_exclusive);
    }

    #[test]
    fn test_link_enhancements_and_select_targets() {
        let (_dir, db) = test_db();
        seed_items(
            &db,
            &[
                ("zenith_crown", 0),
                ("zenith_crown_+1", 0),
                ("crimson_cuisses", 0),
                ("blood_cuisses", 0),
            ],
        );

        let config = EnhancementConfig::from_str(
            r#"
[[enhancements]]
base = "zenith_crown"
enhanced = "zenith_crown_+1"
level = 1

[[conversions]]
from = "crimson_cuisses"
to = "blood_cuisses"

[[conversions]]
from = "crimson_cuisses"
to = "item_nobody_imported"
"#,
        )
        .unwrap();

        let report = db.link_enhancements(&config, 2).unwrap();
        assert_eq!(report.enhancements_linked, 1);
        assert_eq!(report.conversions_linked, 1);
        assert_eq!(report.names_missing, 1);

        let targets = db.select_items(&ItemSelection::ConversionTargets).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].name, "blood_cuisses");
    }

    #[test]
    fn test_relink_enhancement_overwrites_level() {
        let (_dir, db) = test_db();
        seed_items(&db, &[("crown", 0), ("crown_+1", 0), ("crown_hq", 0)]);

        let first = EnhancementConfig::from_str(
            "[[enhancements]]\nbase = \"crown\"\nenhanced = \"crown_+1\"\nlevel = 1\n",
        )
        .unwrap();
        db.link_enhancements(&first, 2).unwrap();

        let second = EnhancementConfig::from_str(
            "[[enhancements]]\nbase = \"crown\"\nenhanced = \"crown_hq\"\nlevel = 1\n",
        )
        .unwrap();
        let report = db.link_enhancements(&second, 2).unwrap();
        assert_eq!(report.enhancements_linked, 1);

        let conn = db.connection().unwrap();
        let enhanced: i32 = conn
            .query_row(
                "SELECT enhanced_item_id FROM item_enhancements WHERE base_item_id = 1 AND level = 1",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(enhanced, 3);
    }
}

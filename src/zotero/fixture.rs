//! Build small Zotero-shaped library databases on disk.
//!
//! Only the tables and columns the reader queries are created. Compiled into
//! the unit tests and pulled into `tests/` by path, so it depends on nothing
//! from this crate.

use anyhow::Result;
use rusqlite::{params, Connection};
use std::fs;
use std::path::{Path, PathBuf};

const DATABASE_FILE: &str = "zotero.sqlite";
const STORAGE_DIR: &str = "storage";

const SCHEMA: &str = "
    CREATE TABLE itemTypes (
        itemTypeID INTEGER PRIMARY KEY,
        typeName TEXT,
        templateItemTypeID INT,
        display INT DEFAULT 1
    );
    CREATE TABLE items (
        itemID INTEGER PRIMARY KEY,
        itemTypeID INT NOT NULL,
        dateAdded TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        libraryID INT NOT NULL DEFAULT 1,
        key TEXT NOT NULL
    );
    CREATE TABLE fields (fieldID INTEGER PRIMARY KEY, fieldName TEXT, fieldFormatID INT);
    CREATE TABLE itemDataValues (valueID INTEGER PRIMARY KEY, value UNIQUE);
    CREATE TABLE itemData (itemID INT, fieldID INT, valueID, PRIMARY KEY (itemID, fieldID));
    CREATE TABLE creators (
        creatorID INTEGER PRIMARY KEY,
        firstName TEXT,
        lastName TEXT,
        fieldMode INT
    );
    CREATE TABLE creatorTypes (creatorTypeID INTEGER PRIMARY KEY, creatorType TEXT);
    CREATE TABLE itemCreators (
        itemID INT NOT NULL,
        creatorID INT NOT NULL,
        creatorTypeID INT NOT NULL DEFAULT 1,
        orderIndex INT NOT NULL DEFAULT 0,
        PRIMARY KEY (itemID, orderIndex)
    );
    CREATE TABLE collections (
        collectionID INTEGER PRIMARY KEY,
        collectionName TEXT NOT NULL,
        parentCollectionID INT DEFAULT NULL,
        libraryID INT NOT NULL DEFAULT 1,
        key TEXT NOT NULL
    );
    CREATE TABLE collectionItems (
        collectionID INT NOT NULL,
        itemID INT NOT NULL,
        orderIndex INT NOT NULL DEFAULT 0,
        PRIMARY KEY (collectionID, itemID)
    );
    CREATE TABLE itemAttachments (
        itemID INTEGER PRIMARY KEY,
        parentItemID INT,
        linkMode INT,
        contentType TEXT,
        path TEXT
    );
    CREATE TABLE deletedItems (
        itemID INTEGER PRIMARY KEY,
        dateDeleted DEFAULT CURRENT_TIMESTAMP NOT NULL
    );
    CREATE TABLE deletedCollections (
        collectionID INTEGER PRIMARY KEY,
        dateDeleted DEFAULT CURRENT_TIMESTAMP NOT NULL
    );

    INSERT INTO itemTypes(itemTypeID, typeName) VALUES
        (1, 'note'), (2, 'journalArticle'), (3, 'attachment'), (4, 'book');
    INSERT INTO fields(fieldID, fieldName) VALUES (1, 'title'), (2, 'date');
    INSERT INTO creatorTypes(creatorTypeID, creatorType) VALUES (1, 'author'), (2, 'editor');
";

const JOURNAL_ARTICLE: i64 = 2;
const ATTACHMENT: i64 = 3;

const LINK_MODE_IMPORTED_FILE: i64 = 0;
const LINK_MODE_LINKED_FILE: i64 = 2;
const LINK_MODE_LINKED_URL: i64 = 3;

/// Metadata for a fixture item. Creators are `(first, last, creator type)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemSpec<'a> {
    pub title: Option<&'a str>,
    pub date: Option<&'a str>,
    pub creators: &'a [(&'a str, &'a str, &'a str)],
}

/// A Zotero data directory with `zotero.sqlite` and `storage/`.
pub struct LibraryFixture {
    data_dir: PathBuf,
    conn: Connection,
    next_item_id: i64,
    next_collection_id: i64,
    next_creator_id: i64,
}

impl LibraryFixture {
    pub fn create(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir.join(STORAGE_DIR))?;
        let conn = Connection::open(data_dir.join(DATABASE_FILE))?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            conn,
            next_item_id: 1,
            next_collection_id: 1,
            next_creator_id: 1,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn add_collection(&mut self, name: &str, parent: Option<i64>) -> Result<i64> {
        let id = self.next_collection_id;
        self.next_collection_id += 1;
        self.conn.execute(
            "INSERT INTO collections(collectionID, collectionName, parentCollectionID, key)
             VALUES (?1, ?2, ?3, ?4)",
            params![id, name, parent, format!("C{id:07}")],
        )?;
        Ok(id)
    }

    /// Add a journal article filed in `collection`.
    pub fn add_item(&mut self, collection: i64, spec: ItemSpec<'_>) -> Result<i64> {
        let id = self.insert_item(JOURNAL_ARTICLE)?;
        self.file_item(collection, id)?;

        if let Some(title) = spec.title {
            self.set_field(id, 1, title)?;
        }
        if let Some(date) = spec.date {
            self.set_field(id, 2, date)?;
        }
        for (order, (first, last, kind)) in spec.creators.iter().enumerate() {
            let creator_id = self.next_creator_id;
            self.next_creator_id += 1;
            self.conn.execute(
                "INSERT INTO creators(creatorID, firstName, lastName, fieldMode) VALUES (?1, ?2, ?3, 0)",
                params![creator_id, first, last],
            )?;
            let type_id: i64 = if *kind == "editor" { 2 } else { 1 };
            self.conn.execute(
                "INSERT INTO itemCreators(itemID, creatorID, creatorTypeID, orderIndex)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, creator_id, type_id, order as i64],
            )?;
        }
        Ok(id)
    }

    /// File an existing item in another collection as well.
    pub fn file_item(&mut self, collection: i64, item: i64) -> Result<()> {
        let order: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM collectionItems WHERE collectionID = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        self.conn.execute(
            "INSERT INTO collectionItems(collectionID, itemID, orderIndex) VALUES (?1, ?2, ?3)",
            params![collection, item, order],
        )?;
        Ok(())
    }

    /// Imported file: written to `storage/<key>/<file_name>`. Returns its path.
    pub fn add_stored_attachment(
        &mut self,
        parent: i64,
        file_name: &str,
        contents: &[u8],
    ) -> Result<PathBuf> {
        let id = self.insert_attachment(
            parent,
            LINK_MODE_IMPORTED_FILE,
            Some(&format!("storage:{file_name}")),
        )?;
        let dir = self.data_dir.join(STORAGE_DIR).join(item_key(id));
        fs::create_dir_all(&dir)?;
        let path = dir.join(file_name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Stored attachment whose file was never synced to this machine.
    pub fn add_missing_stored_attachment(&mut self, parent: i64, file_name: &str) -> Result<PathBuf> {
        let id = self.insert_attachment(
            parent,
            LINK_MODE_IMPORTED_FILE,
            Some(&format!("storage:{file_name}")),
        )?;
        Ok(self.data_dir.join(STORAGE_DIR).join(item_key(id)).join(file_name))
    }

    pub fn add_linked_attachment(&mut self, parent: i64, path: &Path) -> Result<i64> {
        let raw = path.to_string_lossy().into_owned();
        self.insert_attachment(parent, LINK_MODE_LINKED_FILE, Some(&raw))
    }

    pub fn add_base_dir_attachment(&mut self, parent: i64, relative: &str) -> Result<i64> {
        self.insert_attachment(parent, LINK_MODE_LINKED_FILE, Some(&format!("attachments:{relative}")))
    }

    pub fn add_link_only_attachment(&mut self, parent: i64) -> Result<i64> {
        self.insert_attachment(parent, LINK_MODE_LINKED_URL, None)
    }

    pub fn trash_item(&mut self, item: i64) -> Result<()> {
        self.conn.execute("INSERT INTO deletedItems(itemID) VALUES (?1)", params![item])?;
        Ok(())
    }

    pub fn trash_collection(&mut self, collection: i64) -> Result<()> {
        self.conn
            .execute("INSERT INTO deletedCollections(collectionID) VALUES (?1)", params![collection])?;
        Ok(())
    }

    fn insert_item(&mut self, type_id: i64) -> Result<i64> {
        let id = self.next_item_id;
        self.next_item_id += 1;
        self.conn.execute(
            "INSERT INTO items(itemID, itemTypeID, key) VALUES (?1, ?2, ?3)",
            params![id, type_id, item_key(id)],
        )?;
        Ok(id)
    }

    fn insert_attachment(&mut self, parent: i64, link_mode: i64, path: Option<&str>) -> Result<i64> {
        let id = self.insert_item(ATTACHMENT)?;
        let content_type = path.and_then(guess_content_type);
        self.conn.execute(
            "INSERT INTO itemAttachments(itemID, parentItemID, linkMode, contentType, path)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, parent, link_mode, content_type, path],
        )?;
        Ok(id)
    }

    fn set_field(&mut self, item: i64, field: i64, value: &str) -> Result<()> {
        self.conn
            .execute("INSERT OR IGNORE INTO itemDataValues(value) VALUES (?1)", params![value])?;
        let value_id: i64 = self.conn.query_row(
            "SELECT valueID FROM itemDataValues WHERE value = ?1",
            params![value],
            |row| row.get(0),
        )?;
        self.conn.execute(
            "INSERT INTO itemData(itemID, fieldID, valueID) VALUES (?1, ?2, ?3)",
            params![item, field, value_id],
        )?;
        Ok(())
    }
}

/// Deterministic eight-character key for an item id.
pub fn item_key(id: i64) -> String {
    format!("K{id:07}")
}

fn guess_content_type(path: &str) -> Option<&'static str> {
    let lower = path.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        Some("application/pdf")
    } else if lower.ends_with(".docx") {
        Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
    } else {
        None
    }
}

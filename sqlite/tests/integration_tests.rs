//! Integration tests for the entity-store-sqlite crate.

use chrono::{DateTime, TimeZone, Utc};
use entity_store_core::{Entity, EntitySchema, FieldSchema, SemanticType, ValidationError, Value, ValueError};
use entity_store_db::{JournalMode, StoreConfig};
use entity_store_sqlite::{Store, StoreError, UpsertOutcome};

// =============================================================================
// Fixtures
// =============================================================================

#[derive(Debug, Default, Clone, PartialEq)]
struct Score {
    id: i32,
    name: String,
    score: f64,
}

impl Entity for Score {
    const NAME: &'static str = "Score";

    fn schema() -> EntitySchema {
        EntitySchema::new(Self::NAME)
            .with_field(FieldSchema::new("id", SemanticType::Int).key())
            .with_field(FieldSchema::new("name", SemanticType::Text))
            .with_field(FieldSchema::new("score", SemanticType::Double))
    }

    fn value(&self, field: &str) -> Value {
        match field {
            "id" => self.id.into(),
            "name" => self.name.as_str().into(),
            "score" => self.score.into(),
            _ => Value::Null,
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), ValueError> {
        match field {
            "id" => self.id = value.try_into()?,
            "name" => self.name = value.try_into()?,
            "score" => self.score = value.try_into()?,
            _ => {}
        }
        Ok(())
    }
}

/// One field of every storable type.
#[derive(Debug, Default, Clone, PartialEq)]
struct Everything {
    id: u64,
    flag: bool,
    small: u8,
    int: i32,
    long: i64,
    text: String,
    comment: String,
    at: DateTime<Utc>,
    single: f32,
    double: f64,
    bytes: Vec<u8>,
    packed: String,
}

impl Entity for Everything {
    const NAME: &'static str = "Everything";

    fn schema() -> EntitySchema {
        EntitySchema::new(Self::NAME)
            .with_field(FieldSchema::new("id", SemanticType::ULong).key())
            .with_field(FieldSchema::new("flag", SemanticType::Bool))
            .with_field(FieldSchema::new("small", SemanticType::Byte))
            .with_field(FieldSchema::new("int", SemanticType::Int))
            .with_field(FieldSchema::new("long", SemanticType::Long))
            .with_field(FieldSchema::new("text", SemanticType::Text))
            .with_field(FieldSchema::new("comment", SemanticType::Comment))
            .with_field(FieldSchema::new("at", SemanticType::Timestamp).indexed())
            .with_field(FieldSchema::new("single", SemanticType::Float))
            .with_field(FieldSchema::new("double", SemanticType::Double))
            .with_field(FieldSchema::new("bytes", SemanticType::Bytes))
            .with_field(FieldSchema::new("packed", SemanticType::Text).blob())
    }

    fn value(&self, field: &str) -> Value {
        match field {
            "id" => self.id.into(),
            "flag" => self.flag.into(),
            "small" => self.small.into(),
            "int" => self.int.into(),
            "long" => self.long.into(),
            "text" => self.text.as_str().into(),
            "comment" => self.comment.as_str().into(),
            "at" => self.at.into(),
            "single" => self.single.into(),
            "double" => self.double.into(),
            "bytes" => self.bytes.as_slice().into(),
            "packed" => self.packed.as_str().into(),
            _ => Value::Null,
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), ValueError> {
        match field {
            "id" => self.id = value.try_into()?,
            "flag" => self.flag = value.try_into()?,
            "small" => self.small = value.try_into()?,
            "int" => self.int = value.try_into()?,
            "long" => self.long = value.try_into()?,
            "text" => self.text = value.try_into()?,
            "comment" => self.comment = value.try_into()?,
            "at" => self.at = value.try_into()?,
            "single" => self.single = value.try_into()?,
            "double" => self.double = value.try_into()?,
            "bytes" => self.bytes = value.try_into()?,
            "packed" => self.packed = value.try_into()?,
            _ => {}
        }
        Ok(())
    }
}

/// Persisted fields interleaved with ignored ones.
#[derive(Debug, Default, Clone, PartialEq)]
struct Profile {
    id: i64,
    cached_rank: i32,
    name: String,
    session: String,
    karma: i32,
}

impl Entity for Profile {
    const NAME: &'static str = "Profile";

    fn schema() -> EntitySchema {
        EntitySchema::new(Self::NAME)
            .with_field(FieldSchema::new("id", SemanticType::Long).key())
            .with_field(FieldSchema::new("cached_rank", SemanticType::Int).ignored())
            .with_field(FieldSchema::new("name", SemanticType::Text))
            .with_field(FieldSchema::new("session", SemanticType::Ignored))
            .with_field(FieldSchema::new("karma", SemanticType::Int))
    }

    fn value(&self, field: &str) -> Value {
        match field {
            "id" => self.id.into(),
            "cached_rank" => self.cached_rank.into(),
            "name" => self.name.as_str().into(),
            "session" => self.session.as_str().into(),
            "karma" => self.karma.into(),
            _ => Value::Null,
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), ValueError> {
        match field {
            "id" => self.id = value.try_into()?,
            "cached_rank" => self.cached_rank = value.try_into()?,
            "name" => self.name = value.try_into()?,
            "session" => self.session = value.try_into()?,
            "karma" => self.karma = value.try_into()?,
            _ => {}
        }
        Ok(())
    }
}

/// Composite key.
#[derive(Debug, Default, Clone, PartialEq)]
struct Membership {
    guild: u64,
    user: u64,
    role: String,
}

impl Entity for Membership {
    const NAME: &'static str = "Membership";

    fn schema() -> EntitySchema {
        EntitySchema::new(Self::NAME)
            .with_field(FieldSchema::new("guild", SemanticType::ULong).key())
            .with_field(FieldSchema::new("user", SemanticType::ULong).key())
            .with_field(FieldSchema::new("role", SemanticType::Text).not_null())
    }

    fn value(&self, field: &str) -> Value {
        match field {
            "guild" => self.guild.into(),
            "user" => self.user.into(),
            "role" => self.role.as_str().into(),
            _ => Value::Null,
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), ValueError> {
        match field {
            "guild" => self.guild = value.try_into()?,
            "user" => self.user = value.try_into()?,
            "role" => self.role = value.try_into()?,
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Keyless {
    a: i32,
}

impl Entity for Keyless {
    const NAME: &'static str = "Keyless";

    fn schema() -> EntitySchema {
        EntitySchema::new(Self::NAME).with_field(FieldSchema::new("a", SemanticType::Int))
    }

    fn value(&self, _field: &str) -> Value {
        self.a.into()
    }

    fn set_value(&mut self, _field: &str, value: Value) -> Result<(), ValueError> {
        self.a = value.try_into()?;
        Ok(())
    }
}

fn score(id: i32, name: &str, value: f64) -> Score {
    Score {
        id,
        name: name.to_string(),
        score: value,
    }
}

fn store_with<T: Entity>() -> Store {
    let mut store = Store::in_memory().unwrap();
    store.register::<T>().unwrap();
    store
}

fn table_count(store: &Store, kind: &str, name: &str) -> i64 {
    store
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = ?1 AND name = ?2",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap()
}

// =============================================================================
// Registration
// =============================================================================

#[test]
fn test_register_creates_table() {
    let store = store_with::<Score>();
    assert_eq!(table_count(&store, "table", "Score"), 1);
    assert!(store.registry().contains("Score"));
}

#[test]
fn test_register_without_key_fails() {
    let mut store = Store::in_memory().unwrap();
    let err = store.register::<Keyless>().unwrap_err();
    assert!(matches!(
        err,
        StoreError::InvalidSchema(ValidationError::MissingKey(name)) if name == "Keyless"
    ));
    assert_eq!(table_count(&store, "table", "Keyless"), 0);
}

#[test]
fn test_register_twice_is_rejected() {
    let mut store = store_with::<Score>();
    assert!(matches!(
        store.register::<Score>(),
        Err(StoreError::DuplicateEntity(_))
    ));
    // The first registration stays usable.
    assert_eq!(store.add(&score(1, "a", 1.0)), Some(UpsertOutcome::Inserted));
}

#[test]
fn test_register_creates_index_for_indexed_fields() {
    let store = store_with::<Everything>();
    assert_eq!(table_count(&store, "index", "idx_Everything"), 1);
}

#[test]
fn test_register_reuses_existing_table() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::with_path(dir.path().join("Database").join("BotDb.db"));

    {
        let mut store = Store::open(&config).unwrap();
        store.register::<Score>().unwrap();
        store.add(&score(1, "kept", 9.0));
    }

    let mut store = Store::open(&config).unwrap();
    store.register::<Score>().unwrap();
    assert_eq!(store.get_all::<Score>(), vec![score(1, "kept", 9.0)]);
}

// =============================================================================
// Upsert
// =============================================================================

#[test]
fn test_add_then_update_scenario() {
    let store = store_with::<Score>();

    assert_eq!(store.add(&score(1, "a", 1.5)), Some(UpsertOutcome::Inserted));
    assert_eq!(store.count::<Score>(), 1);

    assert_eq!(store.add(&score(1, "b", 2.5)), Some(UpsertOutcome::Updated));
    assert_eq!(store.count::<Score>(), 1);
    assert_eq!(store.get_all::<Score>(), vec![score(1, "b", 2.5)]);

    assert_eq!(store.delete(&score(1, "", 0.0)), 1);
    assert_eq!(store.count::<Score>(), 0);
}

#[test]
fn test_repeated_add_is_idempotent() {
    let store = store_with::<Score>();
    let record = score(5, "same", 3.25);
    for _ in 0..3 {
        store.add(&record);
    }
    assert_eq!(store.get_all::<Score>(), vec![record]);
}

#[test]
fn test_get_all_orders_by_key() {
    let store = store_with::<Score>();
    store.add(&score(20, "second", 2.0));
    store.add(&score(3, "first", 1.0));

    let all = store.get_all::<Score>();
    assert_eq!(all, vec![score(3, "first", 1.0), score(20, "second", 2.0)]);
    assert_eq!(store.count::<Score>(), all.len());
}

#[test]
fn test_delete_removes_only_that_key() {
    let store = store_with::<Score>();
    store.add(&score(1, "a", 1.0));
    store.add(&score(2, "b", 2.0));

    store.delete(&score(1, "ignored", 0.0));
    let all = store.get_all::<Score>();
    assert!(all.iter().all(|s| s.id != 1));
    assert_eq!(all.len(), store.count::<Score>());
}

#[test]
fn test_delete_missing_key_is_noop() {
    let store = store_with::<Score>();
    assert_eq!(store.delete(&score(99, "", 0.0)), 0);
    assert_eq!(store.try_delete(&score(99, "", 0.0)).unwrap(), 0);
}

#[test]
fn test_get_by_key() {
    let store = store_with::<Score>();
    store.add(&score(4, "four", 4.0));
    assert_eq!(store.get::<Score>(&[Value::Int(4)]), Some(score(4, "four", 4.0)));
    assert_eq!(store.get::<Score>(&[Value::Int(5)]), None);
    assert!(store.try_get::<Score>(&[Value::Int(5)]).unwrap().is_none());
}

// =============================================================================
// Composite keys
// =============================================================================

#[test]
fn test_composite_key_upsert_and_delete_by_keys() {
    let store = store_with::<Membership>();
    let m = |guild, user, role: &str| Membership {
        guild,
        user,
        role: role.to_string(),
    };

    store.add(&m(1, 10, "member"));
    store.add(&m(1, 11, "member"));
    store.add(&m(2, 10, "admin"));
    assert_eq!(store.add(&m(1, 10, "mod")), Some(UpsertOutcome::Updated));
    assert_eq!(store.count::<Membership>(), 3);

    let removed = store.delete_by_keys::<Membership>(&[Value::ULong(1), Value::ULong(10)]);
    assert_eq!(removed, 1);
    assert_eq!(
        store.get_all::<Membership>(),
        vec![m(1, 11, "member"), m(2, 10, "admin")]
    );
}

#[test]
fn test_delete_by_keys_checks_arity() {
    let store = store_with::<Membership>();
    let err = store
        .try_delete_by_keys::<Membership>(&[Value::ULong(1)])
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::KeyCountMismatch { expected: 2, actual: 1, .. }
    ));
    assert_eq!(store.delete_by_keys::<Membership>(&[Value::ULong(1)]), 0);
}

#[test]
fn test_huge_unsigned_keys() {
    let store = store_with::<Membership>();
    let record = Membership {
        guild: u64::MAX,
        user: 1 << 63,
        role: "owner".into(),
    };
    store.add(&record);
    assert_eq!(
        store.get::<Membership>(&[Value::ULong(u64::MAX), Value::ULong(1 << 63)]),
        Some(record)
    );
}

// =============================================================================
// Round-trip
// =============================================================================

#[test]
fn test_every_type_roundtrips() {
    let store = store_with::<Everything>();
    let record = Everything {
        id: u64::MAX - 1,
        flag: true,
        small: 255,
        int: i32::MIN,
        long: i64::MAX,
        text: "héllo".into(),
        comment: "x".repeat(4096),
        at: Utc.with_ymd_and_hms(2022, 4, 28, 18, 45, 1).unwrap()
            + chrono::Duration::nanoseconds(987_654_321),
        single: 0.1,
        double: -1.0e-300,
        bytes: vec![0, 1, 2, 254, 255],
        packed: "packed text".into(),
    };

    store.add(&record);
    assert_eq!(store.get_all::<Everything>(), vec![record]);
}

#[test]
fn test_null_columns_leave_defaults() {
    let store = store_with::<Everything>();
    let mut values = vec![Value::Null; store.descriptor("Everything").unwrap().columns().len()];
    values[0] = Value::ULong(7);
    store.try_upsert_values("Everything", &values).unwrap();

    let all = store.try_get_all::<Everything>().unwrap();
    assert_eq!(
        all,
        vec![Everything {
            id: 7,
            ..Everything::default()
        }]
    );
}

#[test]
fn test_blob_text_is_stored_in_blob_column() {
    let store = store_with::<Everything>();
    store.add(&Everything {
        id: 1,
        packed: "abc".into(),
        ..Everything::default()
    });
    let kind: String = store
        .connection()
        .query_row("SELECT typeof(packed) FROM Everything", [], |row| row.get(0))
        .unwrap();
    assert_eq!(kind, "blob");
}

#[test]
fn test_timestamps_beyond_four_digit_years() {
    let store = store_with::<Everything>();
    let far = Everything {
        id: 1,
        at: Utc.with_ymd_and_hms(10_000, 1, 1, 0, 0, 0).unwrap(),
        ..Everything::default()
    };
    let ancient = Everything {
        id: 2,
        at: Utc.with_ymd_and_hms(-5, 1, 1, 0, 0, 0).unwrap(),
        ..Everything::default()
    };
    assert_eq!(store.add(&far), Some(UpsertOutcome::Inserted));
    assert_eq!(store.add(&ancient), Some(UpsertOutcome::Inserted));

    let all = store.try_get_all::<Everything>().unwrap();
    assert_eq!(all, vec![far, ancient]);
    assert_eq!(store.count::<Everything>(), all.len());
}

#[test]
fn test_mismatched_values_are_refused() {
    let store = store_with::<Score>();
    store.add(&score(1, "kept", 1.0));

    let err = store
        .try_upsert_values("Score", &[Value::Int(2), Value::Double(3.5), Value::Null])
        .unwrap_err();
    assert!(matches!(err, StoreError::ConversionError { ref field, .. } if field == "name"));

    let err = store
        .try_upsert_values("Score", &[Value::Int(3), Value::from("x"), Value::from("3.5")])
        .unwrap_err();
    assert!(matches!(err, StoreError::ConversionError { ref field, .. } if field == "score"));

    let all = store.try_get_all::<Score>().unwrap();
    assert_eq!(all, vec![score(1, "kept", 1.0)]);
    assert_eq!(store.try_count::<Score>().unwrap(), all.len());
}

#[test]
fn test_mismatched_timestamp_keeps_table_readable() {
    let store = store_with::<Everything>();
    let mut values = vec![Value::Null; store.descriptor("Everything").unwrap().columns().len()];
    values[0] = Value::ULong(9);
    values[7] = Value::from("not a date");

    assert!(store.try_upsert_values("Everything", &values).is_err());
    assert_eq!(store.try_count_rows("Everything").unwrap(), 0);
    assert!(store.try_get_all::<Everything>().unwrap().is_empty());
}

#[test]
fn test_nan_is_refused() {
    let store = store_with::<Score>();
    let err = store.try_add(&score(1, "nan", f64::NAN)).unwrap_err();
    assert!(matches!(err, StoreError::ConversionError { ref field, .. } if field == "score"));
    assert_eq!(store.add(&score(1, "nan", f64::NAN)), None);
    assert_eq!(store.count::<Score>(), 0);
}

#[test]
fn test_failed_write_rolls_back_with_journal() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = StoreConfig::with_path(dir.path().join("bot.db"));
    config.journal_mode = JournalMode::Delete;
    let mut store = Store::open(&config).unwrap();
    store.register::<Membership>().unwrap();

    let err = store
        .try_upsert_values("Membership", &[Value::ULong(1), Value::ULong(2), Value::Null])
        .unwrap_err();
    assert!(matches!(err, StoreError::DatabaseError(_)));
    assert!(store.connection().is_autocommit());
    assert_eq!(store.count::<Membership>(), 0);
    assert!(store.try_get_all::<Membership>().unwrap().is_empty());
}

// =============================================================================
// Ignored fields
// =============================================================================

#[test]
fn test_ignored_fields_do_not_shift_columns() {
    let store = store_with::<Profile>();
    store.add(&Profile {
        id: 1,
        cached_rank: 42,
        name: "ada".into(),
        session: "secret".into(),
        karma: 17,
    });

    let all = store.get_all::<Profile>();
    assert_eq!(
        all,
        vec![Profile {
            id: 1,
            cached_rank: 0,
            name: "ada".into(),
            session: String::new(),
            karma: 17,
        }]
    );
}

#[test]
fn test_ignored_fields_have_no_columns() {
    let store = store_with::<Profile>();
    let mut stmt = store
        .connection()
        .prepare("SELECT name FROM pragma_table_info('Profile')")
        .unwrap();
    let columns: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(columns, vec!["id", "name", "karma"]);
}

// =============================================================================
// Failure handling
// =============================================================================

#[test]
fn test_runtime_failure_is_neutral() {
    let store = store_with::<Score>();
    store.add(&score(1, "a", 1.0));
    store
        .connection()
        .execute_batch("DROP TABLE \"Score\"")
        .unwrap();

    assert!(store.try_get_all::<Score>().is_err());
    assert!(store.get_all::<Score>().is_empty());
    assert_eq!(store.count::<Score>(), 0);
    assert_eq!(store.add(&score(2, "b", 2.0)), None);
    assert_eq!(store.delete(&score(1, "", 0.0)), 0);
}

#[test]
fn test_undecodable_row_fails_get_all() {
    let store = store_with::<Score>();
    store
        .connection()
        .execute(
            "INSERT INTO \"Score\" (id, name, score) VALUES (1, 'a', 'not a number')",
            [],
        )
        .unwrap();

    let err = store.try_get_all::<Score>().unwrap_err();
    assert!(matches!(err, StoreError::ConversionError { ref field, .. } if field == "score"));
    assert!(store.get_all::<Score>().is_empty());
}

#[test]
fn test_values_api_checks_row_width() {
    let store = store_with::<Score>();
    let err = store
        .try_upsert_values("Score", &[Value::Int(1)])
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::FieldCountMismatch { expected: 3, actual: 1, .. }
    ));
}

use common::model::EntityKind;
use food_wastage::import::{import_all, import_file, import_reader, ImportMode, ImportSources, RowRejection};
use food_wastage::validation::ValidationReason;
use food_wastage::{ImportError, SourceError, Storage};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PROVIDERS: &str = "Provider_ID,Name,Type,Address,City,Contact
1,Gonzales-Cochran,Supermarket,74347 Christopher Extensions,New Jessica,+1-600-220-0480
2,Nielsen Group,Grocery Store,91228 Hanson Stream,East Sheena,+1-925-283-8901
3,Chapman Ltd,Restaurant,561 Martinez Point,Lake Jesusview,001-517-295-2206
";

const RECEIVERS: &str = "Receiver_ID,Name,Type,City,Contact
1,Donald Gomez,Shelter,Port Carlburgh,(955)922-5295
2,Laurie Ramos,Individual,Lauriemouth,761.042.1570
";

const LISTINGS: &str = "Food_ID,Food_Name,Quantity,Expiry_Date,Provider_ID,Provider_Type,Location,Food_Type,Meal_Type
1,Bread,43,2025-03-17,1,Supermarket,New Jessica,Vegetarian,Breakfast
2,Soup,22,2025-03-24,2,Grocery Store,East Sheena,Vegan,Dinner
3,Fruits,0,2025-03-28,3,Restaurant,Lake Jesusview,Vegan,Snacks
";

const CLAIMS: &str = "Claim_ID,Food_ID,Receiver_ID,Status,Timestamp
1,1,1,Pending,2025-03-05 05:26:00
2,2,2,Completed,2025-03-11 10:24:00
3,3,1,Cancelled,2025-03-21 00:59:00
";

struct Fixture {
    dir: TempDir,
    storage: Storage,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open_initialized(dir.path().join("food_wastage.db")).unwrap();
        Self { dir, storage }
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn write_sources(&self) -> ImportSources {
        for kind in EntityKind::IMPORT_ORDER {
            let contents = match kind {
                EntityKind::Providers => PROVIDERS,
                EntityKind::Receivers => RECEIVERS,
                EntityKind::FoodListings => LISTINGS,
                EntityKind::Claims => CLAIMS,
            };
            self.write(kind.source_file_name(), contents);
        }
        ImportSources::from_dir(self.dir.path())
    }

    fn count(&self, kind: EntityKind) -> i64 {
        self.storage
            .table_counts()
            .unwrap()
            .into_iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, n)| n)
            .unwrap()
    }

    fn import(&mut self, kind: EntityKind, path: &Path) -> food_wastage::ImportReport {
        import_file(&mut self.storage, kind, path).unwrap()
    }
}

fn dump(storage: &Storage, table: &str) -> Vec<Vec<String>> {
    let conn = storage.connection();
    let mut stmt = conn
        .prepare(&format!("SELECT * FROM {table} ORDER BY 1"))
        .unwrap();
    let width = stmt.column_count();
    stmt.query_map([], |row| {
        (0..width)
            .map(|i| {
                row.get::<_, rusqlite::types::Value>(i)
                    .map(|v| format!("{v:?}"))
            })
            .collect::<rusqlite::Result<Vec<_>>>()
    })
    .unwrap()
    .collect::<rusqlite::Result<Vec<_>>>()
    .unwrap()
}

#[test]
fn importing_the_same_file_twice_changes_nothing() {
    let mut fx = Fixture::new();
    let path = fx.write("providers.csv", PROVIDERS);

    let first = fx.import(EntityKind::Providers, &path);
    assert_eq!(first.accepted_count, 3);
    let snapshot = dump(&fx.storage, "providers");

    let second = fx.import(EntityKind::Providers, &path);
    assert_eq!(second.accepted_count, 0);
    assert_eq!(second.skipped_count, 3);
    assert!(second.rejected_rows.is_empty());
    assert_eq!(dump(&fx.storage, "providers"), snapshot);
}

#[test]
fn listing_with_unknown_provider_never_reaches_storage() {
    let mut fx = Fixture::new();
    let providers = fx.write("providers.csv", PROVIDERS);
    fx.import(EntityKind::Providers, &providers);

    let listings = fx.write(
        "listings.csv",
        "Food_ID,Food_Name,Quantity,Expiry_Date,Provider_ID,Provider_Type,Location,Food_Type,Meal_Type
1,Bread,43,2025-03-17,1,Supermarket,New Jessica,Vegetarian,Breakfast
2,Soup,22,2025-03-24,99,Grocery Store,East Sheena,Vegan,Dinner
3,Rice,10,2025-03-25,2,Grocery Store,East Sheena,Vegan,Lunch
",
    );
    let report = fx.import(EntityKind::FoodListings, &listings);

    assert_eq!(report.accepted_count, 2);
    assert_eq!(report.rejected_row_numbers(), vec![2]);
    match &report.rejected_rows[0].reason {
        RowRejection::Invalid(err) => {
            assert_eq!(err.field, "Provider_ID");
            assert_eq!(
                err.reason,
                ValidationReason::UnknownReference {
                    entity: EntityKind::Providers,
                    id: 99
                }
            );
        }
        other => panic!("unexpected rejection {other:?}"),
    }
    assert!(!fx
        .storage
        .known_identifiers()
        .unwrap()
        .contains(EntityKind::FoodListings, 2));
}

#[test]
fn claims_before_listings_are_all_rejected() {
    let mut fx = Fixture::new();
    let providers = fx.write("providers.csv", PROVIDERS);
    let receivers = fx.write("receivers.csv", RECEIVERS);
    let listings = fx.write("listings.csv", LISTINGS);
    let claims = fx.write("claims.csv", CLAIMS);

    fx.import(EntityKind::Providers, &providers);
    fx.import(EntityKind::Receivers, &receivers);

    let early = fx.import(EntityKind::Claims, &claims);
    assert_eq!(early.accepted_count, 0);
    assert_eq!(early.rejected_count(), 3);
    assert!(early.rejected_rows.iter().all(|r| matches!(
        &r.reason,
        RowRejection::Invalid(e) if e.field == "Food_ID"
    )));

    fx.import(EntityKind::FoodListings, &listings);
    let in_order = fx.import(EntityKind::Claims, &claims);
    assert_eq!(in_order.accepted_count, 3);
    assert!(in_order.rejected_rows.is_empty());
}

#[test]
fn malformed_rows_are_reported_and_the_rest_is_kept() {
    let mut fx = Fixture::new();
    let providers = fx.write("providers.csv", PROVIDERS);
    fx.import(EntityKind::Providers, &providers);

    let mut csv = String::from(
        "Food_ID,Food_Name,Quantity,Expiry_Date,Provider_ID,Provider_Type,Location,Food_Type,Meal_Type\n",
    );
    for id in 1..=10 {
        let expiry = if id == 3 || id == 7 { "not-a-date" } else { "2025-03-17" };
        csv.push_str(&format!("{id},Item {id},5,{expiry},1,Supermarket,Town,Vegan,Lunch\n"));
    }
    let path = fx.write("listings.csv", &csv);
    let report = fx.import(EntityKind::FoodListings, &path);

    assert_eq!(report.accepted_count, 8);
    assert_eq!(report.rejected_row_numbers(), vec![3, 7]);
    for rejected in &report.rejected_rows {
        assert!(matches!(
            &rejected.reason,
            RowRejection::Invalid(e) if e.field == "Expiry_Date"
        ));
    }
    assert_eq!(fx.count(EntityKind::FoodListings), 8);
}

#[test]
fn quantity_sign_decides_acceptance() {
    let mut fx = Fixture::new();
    let providers = fx.write("providers.csv", PROVIDERS);
    fx.import(EntityKind::Providers, &providers);

    let path = fx.write(
        "listings.csv",
        "Food_ID,Food_Name,Quantity,Expiry_Date,Provider_ID,Provider_Type,Location,Food_Type,Meal_Type
1,Bread,-5,2025-03-17,1,Supermarket,Town,Vegan,Lunch
2,Soup,0,2025-03-17,1,Supermarket,Town,Vegan,Lunch
",
    );
    let report = fx.import(EntityKind::FoodListings, &path);
    assert_eq!(report.accepted_count, 1);
    assert_eq!(report.rejected_row_numbers(), vec![1]);
    assert!(matches!(
        &report.rejected_rows[0].reason,
        RowRejection::Invalid(e) if e.field == "Quantity"
            && e.reason == ValidationReason::NegativeQuantity { value: -5 }
    ));
}

#[test]
fn missing_header_column_fails_only_that_file() {
    let mut fx = Fixture::new();
    let path = fx.write("providers.csv", "Provider_ID,Name,City\n1,Cafe,Pune\n");

    match import_file(&mut fx.storage, EntityKind::Providers, &path) {
        Err(ImportError::Source(SourceError::MissingColumns { missing, .. })) => {
            assert_eq!(missing, vec!["Type", "Address", "Contact"]);
        }
        other => panic!("expected missing columns, got {other:?}"),
    }
    assert_eq!(fx.count(EntityKind::Providers), 0);

    let absent = fx.dir.path().join("nope.csv");
    assert!(matches!(
        import_file(&mut fx.storage, EntityKind::Receivers, &absent),
        Err(ImportError::Source(SourceError::Unreadable { .. }))
    ));
}

#[test]
fn duplicate_identifiers_inside_one_file_keep_the_first_row() {
    let mut fx = Fixture::new();
    let path = fx.write(
        "receivers.csv",
        "Receiver_ID,Name,Type,City,Contact\n1,First,NGO,Pune,1\n1,Second,NGO,Pune,2\n",
    );
    let report = fx.import(EntityKind::Receivers, &path);
    assert_eq!(report.accepted_count, 1);
    assert_eq!(report.skipped_count, 1);

    let name: String = fx
        .storage
        .connection()
        .query_row("SELECT Name FROM receivers WHERE Receiver_ID = 1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(name, "First");
}

#[test]
fn undecodable_record_is_rejected_without_stopping_the_file() {
    let mut fx = Fixture::new();
    let bytes: &[u8] =
        b"Receiver_ID,Name,Type,City,Contact\n1,Shelter,NGO,Pune,1\n2,\xff\xfe,NGO,Pune,2\n3,Hope,NGO,Pune,3\n";
    let report = import_reader(
        &mut fx.storage,
        EntityKind::Receivers,
        bytes,
        Path::new("upload.csv"),
    )
    .unwrap();

    assert_eq!(report.accepted_count, 2);
    assert_eq!(report.rejected_row_numbers(), vec![2]);
    assert!(matches!(report.rejected_rows[0].reason, RowRejection::Malformed(_)));
}

#[test]
fn full_run_follows_dependency_order() {
    let mut fx = Fixture::new();
    let sources = fx.write_sources();

    let outcomes = import_all(&mut fx.storage, &sources, ImportMode::InsertOrSkip).unwrap();
    let order: Vec<EntityKind> = outcomes.iter().map(|o| o.entity).collect();
    assert_eq!(order, EntityKind::IMPORT_ORDER.to_vec());
    for outcome in &outcomes {
        let report = outcome.result.as_ref().unwrap();
        assert!(report.rejected_rows.is_empty(), "{:?}", report.rejected_rows);
    }
    assert_eq!(fx.count(EntityKind::Claims), 3);

    let again = import_all(&mut fx.storage, &sources, ImportMode::InsertOrSkip).unwrap();
    assert!(again
        .iter()
        .all(|o| o.result.as_ref().unwrap().accepted_count == 0));
}

#[test]
fn broken_source_does_not_stop_the_run() {
    let mut fx = Fixture::new();
    let sources = fx.write_sources();
    fx.write(EntityKind::Receivers.source_file_name(), "Receiver_ID,Name\n1,Shelter\n");

    let outcomes = import_all(&mut fx.storage, &sources, ImportMode::InsertOrSkip).unwrap();
    assert!(outcomes[0].result.is_ok());
    assert!(matches!(
        outcomes[1].result,
        Err(ImportError::Source(SourceError::MissingColumns { .. }))
    ));
    assert_eq!(outcomes[2].result.as_ref().unwrap().accepted_count, 3);

    // Every claim points at a receiver that was never loaded.
    let claims = outcomes[3].result.as_ref().unwrap();
    assert_eq!(claims.accepted_count, 0);
    assert_eq!(claims.rejected_count(), 3);
}

#[test]
fn replace_mode_leaves_only_the_new_contents() {
    let mut fx = Fixture::new();
    let sources = fx.write_sources();
    import_all(&mut fx.storage, &sources, ImportMode::InsertOrSkip).unwrap();

    fx.write(
        EntityKind::Providers.source_file_name(),
        "Provider_ID,Name,Type,Address,City,Contact\n1,Renamed,Supermarket,Somewhere,Town,1\n",
    );
    fx.write(
        EntityKind::FoodListings.source_file_name(),
        "Food_ID,Food_Name,Quantity,Expiry_Date,Provider_ID,Provider_Type,Location,Food_Type,Meal_Type\n1,Bread,43,2025-03-17,1,Supermarket,Town,Vegetarian,Breakfast\n",
    );
    fx.write(
        EntityKind::Claims.source_file_name(),
        "Claim_ID,Food_ID,Receiver_ID,Status,Timestamp\n1,1,1,Pending,2025-03-05 05:26:00\n",
    );

    import_all(&mut fx.storage, &sources, ImportMode::Replace).unwrap();
    assert_eq!(fx.count(EntityKind::Providers), 1);
    assert_eq!(fx.count(EntityKind::FoodListings), 1);
    assert_eq!(fx.count(EntityKind::Claims), 1);
    let name: String = fx
        .storage
        .connection()
        .query_row("SELECT Name FROM providers WHERE Provider_ID = 1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(name, "Renamed");
}

#[test]
fn schema_initialization_twice_is_harmless() {
    let fx = Fixture::new();
    fx.storage.initialize_schema().unwrap();
    fx.storage.initialize_schema().unwrap();
    assert_eq!(fx.storage.table_counts().unwrap().len(), 4);
}

#[test]
fn row_refused_by_storage_is_reported_and_the_file_goes_on() {
    let mut fx = Fixture::new();
    fx.storage
        .connection()
        .execute_batch(
            "CREATE TRIGGER refuse_provider_two BEFORE INSERT ON providers
             WHEN NEW.Provider_ID = 2
             BEGIN SELECT RAISE(ABORT, 'provider 2 is blocked'); END;",
        )
        .unwrap();
    let path = fx.write("providers.csv", PROVIDERS);

    let report = fx.import(EntityKind::Providers, &path);

    assert_eq!(report.accepted_count, 2);
    assert_eq!(report.rejected_row_numbers(), vec![2]);
    match &report.rejected_rows[0].reason {
        RowRejection::WriteRejected(message) => assert!(message.contains("provider 2 is blocked")),
        other => panic!("expected a write rejection, got {other:?}"),
    }
    assert_eq!(fx.count(EntityKind::Providers), 2);
}

#[test]
fn storage_failure_rolls_back_the_whole_file() {
    let mut fx = Fixture::new();
    fx.storage
        .connection()
        .execute_batch(
            "CREATE TRIGGER audit_provider AFTER INSERT ON providers
             WHEN NEW.Provider_ID = 3
             BEGIN INSERT INTO provider_audit (Provider_ID) VALUES (NEW.Provider_ID); END;",
        )
        .unwrap();
    let path = fx.write("providers.csv", PROVIDERS);

    let err = import_file(&mut fx.storage, EntityKind::Providers, &path).unwrap_err();

    assert!(matches!(
        err,
        ImportError::Storage {
            entity: EntityKind::Providers,
            ..
        }
    ));
    assert_eq!(fx.count(EntityKind::Providers), 0);
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use dealgrid_app::{
    GridCommand, GridState, SortField, ViewCommand, ViewSlot, ViewState, ViewStore,
};
use dealgrid_db::{Store, VIEW_STATE_KEY, seed_deals, validate_db_path};
use dealgrid_testkit::{full_slot, temp_db_path, unreadable_slot};

#[test]
fn validate_db_path_rejects_uri_forms() {
    assert!(validate_db_path("file:test.db").is_err());
    assert!(validate_db_path("https://example.com/db.sqlite").is_err());
    assert!(validate_db_path("db.sqlite?mode=ro").is_err());
    assert!(validate_db_path("").is_err());
    assert!(validate_db_path(":memory:").is_ok());
    assert!(validate_db_path("/tmp/dealgrid.db").is_ok());
}

#[test]
fn bootstrap_creates_settings_table() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    store.bootstrap()?;

    assert_eq!(store.get_setting("missing")?, None);
    store.put_setting("theme", "dark")?;
    store.put_setting("theme", "light")?;
    assert_eq!(store.get_setting("theme")?.as_deref(), Some("light"));
    assert!(store.delete_setting("theme")?);
    assert!(!store.delete_setting("theme")?);
    Ok(())
}

#[test]
fn bootstrap_rejects_foreign_database() -> Result<()> {
    let store = Store::open_memory()?;
    store
        .raw_connection()
        .execute_batch("CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT);")?;

    let err = store
        .bootstrap()
        .expect_err("schema validation should fail");
    assert!(err.to_string().contains("missing required table `settings`"));
    Ok(())
}

#[test]
fn bootstrap_rejects_settings_missing_columns() -> Result<()> {
    let store = Store::open_memory()?;
    store
        .raw_connection()
        .execute_batch("CREATE TABLE settings (key TEXT PRIMARY KEY, value TEXT NOT NULL);")?;

    let err = store
        .bootstrap()
        .expect_err("schema validation should fail");
    let message = err.to_string();
    assert!(message.contains("table `settings` is missing required columns"));
    assert!(message.contains("updated_at"));
    Ok(())
}

#[test]
fn view_state_survives_reopen() -> Result<()> {
    let (_dir, path) = temp_db_path()?;

    {
        let store = Store::open(&path)?;
        store.bootstrap()?;
        let mut grid = GridState::new(seed_deals(), store);
        grid.dispatch(GridCommand::View(ViewCommand::ToggleHeaderSort(
            SortField::DealValue,
        )));
        grid.dispatch(GridCommand::View(ViewCommand::SetSearch("corp".to_owned())));
    }

    let store = Store::open(&path)?;
    store.bootstrap()?;
    let view = ViewStore::load(store);
    assert_eq!(view.state().filters.search, "corp");
    assert_eq!(view.state().sorting.len(), 1);
    Ok(())
}

#[test]
fn corrupted_blob_loads_defaults() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    store.put_setting(VIEW_STATE_KEY, "{\"columns\": [")?;

    let view = ViewStore::load(store);
    assert_eq!(view.state(), &ViewState::default());
    Ok(())
}

#[test]
fn reset_view_state_clears_the_slot() -> Result<()> {
    let mut store = Store::open_memory()?;
    store.bootstrap()?;
    store.write_view(&ViewState::default().to_json()?)?;
    assert!(store.read_view()?.is_some());

    assert!(store.reset_view_state()?);
    assert_eq!(store.read_view()?, None);
    store.clear_view()?;
    Ok(())
}

#[test]
fn seeded_grid_sorts_by_value_descending() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    let mut grid = GridState::new(seed_deals(), store);
    grid.dispatch(GridCommand::View(ViewCommand::ToggleHeaderSort(
        SortField::DealValue,
    )));
    grid.dispatch(GridCommand::View(ViewCommand::ToggleHeaderSort(
        SortField::DealValue,
    )));

    let values = grid
        .visible_rows()
        .iter()
        .map(|deal| deal.deal_value)
        .collect::<Vec<_>>();
    assert_eq!(values, vec![125_000, 95_000, 85_000, 65_000, 45_000]);
    assert_eq!(grid.totals().conversion_rate, 20.0);
    Ok(())
}

#[test]
fn unreadable_slot_starts_from_defaults() {
    let grid = GridState::new(seed_deals(), unreadable_slot());
    assert_eq!(grid.view(), &ViewState::default());
    assert_eq!(grid.visible_rows().len(), seed_deals().len());
}

#[test]
fn rejected_writes_keep_the_session_view() {
    let mut grid = GridState::new(seed_deals(), full_slot());
    grid.dispatch(GridCommand::View(ViewCommand::ToggleHeaderSort(
        SortField::DealValue,
    )));

    assert_eq!(grid.view().sorting.len(), 1);
    assert!(grid.view_store().slot().blob().is_none());
    assert_eq!(grid.view_store().slot().writes(), 0);
}

//! Load → filter → sort → page, through the public API only.

use medtable::logs::LOG_BROADCASTER;
use medtable::{
    apply, filter_options, ingest, load, paginate, IngestError, LoadStatus, Schema, Selection,
    Session, SortDirection, Source, ViewState,
};
use std::io::Write;

fn quiet() {
    LOG_BROADCASTER.set_echo(false);
}

fn ema() -> Schema {
    Schema::preset("ema").unwrap()
}

#[test]
fn test_semicolon_export_filter_and_sort() {
    quiet();
    let csv = "Name;Disease;Indication\nIbuprofen;Pain;Inflammation\nAspirin;Pain;Headache\nZolpidem;Insomnia;Sleep";
    let schema = ema();

    let dataset = ingest(csv, &schema).unwrap();
    assert_eq!(dataset.info().delimiter, ';');
    assert_eq!(dataset.len(), 3);

    let mut state = ViewState::default();
    state.set_filter("disease", Selection::Exactly("Pain".into()));
    state.set_sort("name", SortDirection::Ascending);

    let view = apply(&dataset, &schema, &state);
    let page = paginate(&view, state.page_index, state.page_size);

    let names: Vec<&str> = page.items.iter().map(|r| r.get("name")).collect();
    assert_eq!(names, vec!["Aspirin", "Ibuprofen"]);
    assert_eq!(page.total_count, 2);
    assert_eq!(page.total_pages, 1);
}

#[test]
fn test_minimal_semicolon_scenario() {
    quiet();
    let schema = Schema::from_json(
        r#"{
            "name": "minimal",
            "fields": [
                { "name": "name", "aliases": ["name"] },
                { "name": "disease", "aliases": ["disease"] }
            ],
            "searchable": ["name", "disease"],
            "filters": [{ "field": "disease" }]
        }"#,
    )
    .unwrap();

    let dataset = ingest("Name;Disease\nAspirin;Pain\nIbuprofen;Pain", &schema).unwrap();
    let options = filter_options(&dataset, &schema);
    assert_eq!(options.values("disease"), ["Pain".to_string()]);

    let mut state = ViewState::for_schema(&schema, &options);
    state.set_filter("disease", Selection::parse("Pain"));
    state.set_sort("name", SortDirection::Ascending);

    let view = apply(&dataset, &schema, &state);
    let names: Vec<&str> = view.iter().map(|r| r.get("name")).collect();
    assert_eq!(names, vec!["Aspirin", "Ibuprofen"]);
}

#[test]
fn test_missing_required_column_message() {
    quiet();
    let schema = ema();
    let err = ingest("Name;Indication\nAspirin;Pain", &schema).unwrap_err();

    match &err {
        IngestError::MissingColumns { missing, found } => {
            assert_eq!(missing, &vec!["disease".to_string()]);
            assert_eq!(found, &vec!["Name".to_string(), "Indication".to_string()]);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err
        .user_message(&schema.describe_expected())
        .starts_with("Fehlende Spalten."));
}

#[tokio::test]
async fn test_session_loads_file_with_default_filters() {
    quiet();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "\u{feff}Name,Tradename,Disease,Indication,Status,Category,URL\n\
         Aspirin,Aspirin Bayer,Pain,\"Pain; fever\",Authorised,Human,www.example.org/aspirin\n\
         Oldrug,,Pain,Pain,Withdrawn,Human,\n\
         Vetmed,,Pain,Pain,Authorised,Veterinary,\n"
    )
    .unwrap();

    let source = Source::Path(file.path().to_path_buf());
    let mut session = Session::new(ema());
    assert_eq!(session.load(&source).await, LoadStatus::Ready);

    let page = session.page();
    assert_eq!(page.total_count, 1);
    let record = page.items[0];
    assert_eq!(record.get("name"), "Aspirin");
    assert_eq!(record.clauses("indication"), vec!["Pain", "fever"]);
    assert_eq!(record.link("url").as_deref(), Some("https://www.example.org/aspirin"));

    session.state_mut().set_filter("status", Selection::Any);
    session.state_mut().set_filter("category", Selection::Any);
    assert_eq!(session.page().total_count, 3);
}

#[tokio::test]
async fn test_load_missing_file() {
    quiet();
    let dir = tempfile::tempdir().unwrap();
    let source = Source::Path(dir.path().join("absent.csv"));
    let err = load(&source, &ema()).await.unwrap_err();
    assert!(err
        .user_message(&ema().describe_expected())
        .starts_with("Fehler beim Laden/Parsen:"));
}

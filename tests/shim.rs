mod common;

use testresult::TestResult;

use retail_terminal::db::{
    current_sequence_value, open_in_memory, run_query_count, run_query_print, run_query_rows,
    run_update,
};

use common::seeded;

#[test]
fn print_writes_header_then_tab_separated_rows() -> TestResult {
    let conn = seeded()?;
    let mut out = Vec::new();

    let rows = run_query_print(
        &conn,
        "SELECT storeID, name, latitude FROM Store WHERE managerID = ?1 ORDER BY storeID",
        [2],
        &mut out,
    )?;

    assert_eq!(rows, 2);
    assert_eq!(
        String::from_utf8(out)?,
        "storeID\tname\tlatitude\n1\tCorner Market\t10.0\n2\tHillside Grocers\t10.0\n"
    );
    Ok(())
}

#[test]
fn print_of_an_empty_result_is_just_the_header() -> TestResult {
    let conn = seeded()?;
    let mut out = Vec::new();

    let rows = run_query_print(&conn, "SELECT orderNumber, unitsOrdered FROM Orders", [], &mut out)?;

    assert_eq!(rows, 0);
    assert_eq!(String::from_utf8(out)?, "orderNumber\tunitsOrdered\n");
    Ok(())
}

#[test]
fn rows_keep_column_order_and_render_null_as_empty() -> TestResult {
    let conn = seeded()?;
    let result = run_query_rows(&conn, "SELECT NULL AS nothing, 7 AS seven, 'x' AS letter", [])?;

    assert_eq!(result.columns, vec!["nothing", "seven", "letter"]);
    assert_eq!(result.rows, vec![vec!["".to_string(), "7".to_string(), "x".to_string()]]);
    Ok(())
}

#[test]
fn count_reports_matching_rows() -> TestResult {
    let conn = seeded()?;

    assert_eq!(run_query_count(&conn, "SELECT * FROM Store", [])?, 3);
    assert_eq!(
        run_query_count(&conn, "SELECT * FROM Users WHERE type = ?1", ["manager"])?,
        1
    );
    assert_eq!(run_query_count(&conn, "SELECT * FROM Orders", [])?, 0);
    Ok(())
}

#[test]
fn update_returns_the_number_of_changed_rows() -> TestResult {
    let conn = seeded()?;

    let changed = run_update(
        &conn,
        "UPDATE Product SET pricePerUnit = pricePerUnit + 1 WHERE productName = ?1",
        ["Milk"],
    )?;
    assert_eq!(changed, 3);

    let untouched = run_update(&conn, "DELETE FROM Orders", [])?;
    assert_eq!(untouched, 0);
    Ok(())
}

#[test]
fn sequence_value_tracks_the_last_insert() -> TestResult {
    let conn = open_in_memory()?;
    assert_eq!(current_sequence_value(&conn, "Users", "userID")?, None);

    for name in ["first", "second"] {
        run_update(
            &conn,
            "INSERT INTO Users (name, password, latitude, longitude, type)
             VALUES (?1, 'pw', 0, 0, 'customer')",
            [name],
        )?;
    }
    assert_eq!(current_sequence_value(&conn, "Users", "userID")?, Some(2));

    // Deleting does not rewind an AUTOINCREMENT sequence.
    run_update(&conn, "DELETE FROM Users", [])?;
    assert_eq!(current_sequence_value(&conn, "Users", "userID")?, Some(2));
    Ok(())
}

#[test]
fn bad_sql_is_an_error_not_a_panic() -> TestResult {
    let conn = seeded()?;
    assert!(run_query_rows(&conn, "SELECT * FROM NoSuchTable", []).is_err());
    assert!(run_update(&conn, "UPDATE NoSuchTable SET x = 1", []).is_err());
    Ok(())
}

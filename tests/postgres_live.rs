//! Runs against a real server only when `LEDGER_TEST_PG` holds a conninfo string,
//! e.g. `LEDGER_TEST_PG="host=localhost user=postgres dbname=postgres"`.
#![cfg(feature = "postgres")]

use std::time::Duration;

use ledger_sql::prelude::*;

fn live_session() -> Option<PgSession> {
    let Ok(conninfo) = std::env::var("LEDGER_TEST_PG") else {
        eprintln!("LEDGER_TEST_PG not set; skipping live PostgreSQL test");
        return None;
    };
    let config = ConnectionConfig::new(conninfo).with_session(
        SessionOptions::default()
            .with_reconnect_delay(Duration::from_millis(100))
            .with_max_reconnect_attempts(Some(20)),
    );
    Some(Session::connect(&config).unwrap())
}

#[test]
fn live_round_trip_and_failures() -> Result<(), LedgerDbError> {
    let Some(mut s) = live_session() else {
        return Ok(());
    };

    assert_eq!(execute!(s, "SELECT %s::INTEGER", "42")?, 1);
    assert_eq!(s.row_count(), 1);
    assert_eq!(s.value(0, 0), "42");

    execute!(s, "SELECT %d + 1 AS next, %l::BIGINT AS big, %f::FLOAT8 AS ratio, '50%%' AS pct", 41_i32, 1_i64 << 40, 0.5_f64)?;
    assert_eq!(s.column_name(0), "next");
    assert_eq!(s.value(0, 0), "42");
    assert_eq!(s.value(0, 1), "1099511627776");
    assert_eq!(s.value(0, 2), "0.5");
    assert_eq!(s.value(0, 3), "50%");

    let blob: &[u8] = &[0, 1, 2, 0, 255];
    execute!(s, "SELECT %B::BYTEA AS blob, length(%B::BYTEA) AS len", blob, blob)?;
    assert_eq!(s.value(0, 0), "\\x00010200ff");
    assert_eq!(s.value(0, 1), "5");

    execute!(s, "SELECT %s::TEXT AS missing", SqlArg::Text(None))?;
    assert!(s.is_null(0, 0));

    s.set_identity(Some("ledger-test"))?;
    execute!(s, "SELECT current_setting('ledger.identity')")?;
    assert_eq!(s.value(0, 0), "ledger-test");

    execute!(s, "CREATE TEMPORARY TABLE ledger_live (name TEXT PRIMARY KEY)")?;
    assert_eq!(execute!(s, "INSERT INTO ledger_live VALUES (%s), (%s)", "a", "b")?, 2);
    let err = execute!(s, "INSERT INTO ledger_live VALUES (%s)", "a").unwrap_err();
    assert!(matches!(err, LedgerDbError::ExecutionError(_)));
    assert_eq!(s.state(), ConnectionState::Connected);

    assert_eq!(execute!(s, "DELETE FROM ledger_live WHERE name <> %s", "zzz")?, 2);
    Ok(())
}

#[test]
fn live_values_read_as_the_server_prints_them() -> Result<(), LedgerDbError> {
    let Some(mut s) = live_session() else {
        return Ok(());
    };
    execute!(s, "SET TimeZone = 'Europe/Oslo'")?;
    execute!(s, "CREATE TYPE pg_temp.ledger_kind AS ENUM ('user', 'product')")?;

    let cases = [
        ("SELECT INTERVAL '24 hour'", "24:00:00"),
        ("SELECT 'product'::pg_temp.ledger_kind", "product"),
        ("SELECT 'a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11'::uuid", "a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11"),
        ("SELECT ARRAY[1, 2]", "{1,2}"),
        ("SELECT 'NaN'::numeric", "NaN"),
        ("SELECT 12345678901234567890123456789012345.50::numeric", "12345678901234567890123456789012345.50"),
        ("SELECT 1e20::float8", "1e+20"),
        ("SELECT '2026-10-16 12:00:00+00'::timestamptz", "2026-10-16 14:00:00+02"),
        ("SELECT DATE '2026-10-16'", "2026-10-16"),
        ("SELECT '{\"a\":1}'::jsonb", "{\"a\": 1}"),
    ];
    for (sql, expected) in cases {
        execute!(s, sql)?;
        assert_eq!(s.value(0, 0), expected, "{sql}");
    }

    execute!(s, "SELECT 12.50::money")?;
    assert!(s.value(0, 0).contains("12.50"), "{}", s.value(0, 0));

    execute!(s, "SELECT NULL::numeric AS a, 1.50::numeric AS b, 7 AS c")?;
    assert!(s.is_null(0, 0));
    assert_eq!(s.value(0, 1), "1.50");
    assert_eq!(s.value(0, 2), "7");
    Ok(())
}

#[test]
fn live_terminated_backend_is_replaced_transparently() -> Result<(), LedgerDbError> {
    let (Some(mut s), Some(mut admin)) = (live_session(), live_session()) else {
        return Ok(());
    };
    s.set_identity(Some("kiosk"))?;
    execute!(s, "SELECT pg_backend_pid()")?;
    let old_pid: i32 = s.value(0, 0).parse().unwrap();

    let err = execute!(s, "SELEC 1").unwrap_err();
    assert!(matches!(err, LedgerDbError::ExecutionError(ref m) if m.starts_with("42601")));
    assert_eq!(s.state(), ConnectionState::Connected);

    execute!(admin, "SELECT pg_terminate_backend(%d)", old_pid)?;
    assert_eq!(admin.value(0, 0), "t");
    std::thread::sleep(Duration::from_millis(200));

    assert_eq!(execute!(s, "SELECT current_setting(%s), pg_backend_pid()", "ledger.identity")?, 1);
    assert_eq!(s.state(), ConnectionState::Connected);
    assert_eq!(s.value(0, 0), "kiosk");
    assert_ne!(s.value(0, 1), old_pid.to_string());
    Ok(())
}

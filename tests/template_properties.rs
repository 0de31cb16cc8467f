use ledger_sql::template::{MAX_PLACEHOLDERS, Segment};
use ledger_sql::{PlaceholderKind, SqlArg, Template, TemplateError, compile};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const LETTERS: [&str; 7] = ["%s", "%d", "%u", "%zu", "%l", "%f", "%B"];
const LITERALS: [&str; 6] = [
    "SELECT ",
    " FROM accounts WHERE name = ",
    ", ",
    " AND amount > ",
    "'100%%'",
    "ø ",
];

fn arg_for(kind: PlaceholderKind, i: usize) -> SqlArg<'static> {
    match kind {
        PlaceholderKind::Text => SqlArg::Text(Some("x")),
        PlaceholderKind::Int => SqlArg::Int(-(i as i32)),
        PlaceholderKind::UInt => SqlArg::UInt(i as u32),
        PlaceholderKind::Size => SqlArg::Size(i),
        PlaceholderKind::BigInt => SqlArg::BigInt(i as i64 * 1_000_000_000_000),
        PlaceholderKind::Float => SqlArg::Float(i as f64 / 4.0),
        PlaceholderKind::Binary => SqlArg::Binary(b"\x00\x01"),
    }
}

/// A deterministic template with up to `MAX_PLACEHOLDERS` placeholders, plus the
/// SQL it must compile to.
fn generate(rng: &mut ChaCha8Rng) -> (String, String) {
    let mut template = String::new();
    let mut expected = String::new();
    let placeholders = rng.random_range(0..=MAX_PLACEHOLDERS);
    for i in 1..=placeholders {
        let literal = LITERALS[rng.random_range(0..LITERALS.len())];
        template.push_str(literal);
        expected.push_str(&literal.replace("%%", "%"));
        template.push_str(LETTERS[rng.random_range(0..LETTERS.len())]);
        expected.push_str(&format!("${i}"));
    }
    template.push_str(" -- 5%% off");
    expected.push_str(" -- 5% off");
    (template, expected)
}

#[test]
fn compiled_sql_keeps_literals_and_numbers_markers_in_order() -> Result<(), TemplateError> {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for _ in 0..500 {
        let (text, expected) = generate(&mut rng);
        let template = Template::parse(&text)?;
        let args: Vec<SqlArg<'_>> = template
            .kinds()
            .iter()
            .enumerate()
            .map(|(i, kind)| arg_for(*kind, i))
            .collect();
        let stmt = template.compile(&args)?;
        assert_eq!(stmt.sql(), expected, "template: {text}");
        assert_eq!(stmt.params().len(), args.len());
    }
    Ok(())
}

#[test]
fn percent_escape_never_consumes_an_argument() -> Result<(), TemplateError> {
    let template = Template::parse("SELECT '%%' || %s || '%%%%'")?;
    assert_eq!(template.placeholder_count(), 1);
    assert_eq!(template.sql(), "SELECT '%' || $1 || '%%'");
    assert_eq!(
        template.segments().last(),
        Some(&Segment::Literal(" || '%%'".to_string()))
    );
    Ok(())
}

#[test]
fn binary_bytes_are_bound_verbatim() -> Result<(), TemplateError> {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for len in [0_usize, 1, 2, 255, 4096] {
        let mut bytes = vec![0_u8; len];
        rng.fill(bytes.as_mut_slice());
        if len > 1 {
            bytes[len / 2] = 0;
        }
        let stmt = compile("INSERT INTO blobs (data) VALUES (%B)", &[SqlArg::Binary(&bytes)])?;
        let param = &stmt.params()[0];
        assert!(param.is_binary());
        assert_eq!(param.len(), len);
        assert_eq!(param.bytes(), Some(bytes.as_slice()));
    }
    Ok(())
}

#[test]
fn mismatches_are_rejected_at_compile_time() {
    assert!(matches!(
        compile("SELECT %d", &[SqlArg::from("1")]),
        Err(TemplateError::ArgumentKind { position: 1, .. })
    ));
    assert!(matches!(
        compile("SELECT %d, %d", &[SqlArg::Int(1)]),
        Err(TemplateError::ArgumentCount { expected: 2, supplied: 1 })
    ));
    assert!(matches!(
        compile("SELECT %zd", &[SqlArg::Size(1)]),
        Err(TemplateError::UnsupportedSizeModifier { .. })
    ));
    assert!(compile("SELECT %zu", &[SqlArg::Size(usize::MAX)]).is_ok());
}

#[test]
fn null_text_binds_sql_null() -> Result<(), TemplateError> {
    let stmt = compile("UPDATE accounts SET email = %s", &[SqlArg::Text(None)])?;
    assert!(stmt.params()[0].is_null());
    assert_eq!(stmt.params()[0].bytes(), None);
    Ok(())
}

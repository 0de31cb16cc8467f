/// Execute a template with arguments converted through [`SqlArg::from`](crate::SqlArg).
///
/// ```rust
/// use ledger_sql::prelude::*;
/// use ledger_sql::test_utils::ScriptedTransport;
///
/// let mut session = Session::new(ScriptedTransport::new(), SessionOptions::default()).unwrap();
/// let name = String::from("coffee");
/// execute!(session, "SELECT name FROM accounts WHERE (id = %s::INTEGER OR name = %s) AND type = 'product'", &name, &name).unwrap();
/// execute!(session, "COMMIT").unwrap();
/// ```
#[macro_export]
macro_rules! execute {
    ($session:expr, $template:expr $(,)?) => {
        $session.execute($template, &[])
    };
    ($session:expr, $template:expr, $($arg:expr),+ $(,)?) => {
        $session.execute($template, &[$($crate::SqlArg::from($arg)),+])
    };
}

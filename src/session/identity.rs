use crate::error::TemplateError;
use crate::template::{CompiledStatement, compile};
use crate::types::SqlArg;

/// The acting identity applied to every (re)connected database session.
///
/// Holds the ready-to-submit statement so replay after a reconnect cannot fail
/// to compile.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    identity: Option<String>,
    statement: Option<CompiledStatement>,
}

impl SessionContext {
    /// Build the statement that applies `identity` through `setting`; `None` applies
    /// the empty string, which is the "no identity" state.
    ///
    /// # Errors
    /// Returns `TemplateError` if the identity makes the statement too long.
    pub fn statement_for(
        setting: &str,
        identity: Option<&str>,
    ) -> Result<CompiledStatement, TemplateError> {
        compile(
            "SELECT set_config(%s, %s, false)",
            &[SqlArg::from(setting), SqlArg::from(identity.unwrap_or(""))],
        )
    }

    pub(crate) fn set(&mut self, identity: Option<&str>, statement: CompiledStatement) {
        self.identity = identity.map(str::to_owned);
        self.statement = Some(statement);
    }

    /// The identity most recently set, if any.
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Whether `set_identity` has ever been called; until then there is nothing to replay.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.statement.is_some()
    }

    pub(crate) fn replay_statement(&self) -> Option<&CompiledStatement> {
        self.statement.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_bound_not_interpolated() {
        let stmt = SessionContext::statement_for("ledger.identity", Some("o'brien")).unwrap();
        assert_eq!(stmt.sql(), "SELECT set_config($1, $2, false)");
        assert_eq!(stmt.params()[0].as_text(), Some("ledger.identity"));
        assert_eq!(stmt.params()[1].as_text(), Some("o'brien"));
    }

    #[test]
    fn none_applies_empty_identity() {
        let stmt = SessionContext::statement_for("ledger.identity", None).unwrap();
        assert_eq!(stmt.params()[1].as_text(), Some(""));
    }

    #[test]
    fn unconfigured_context_has_nothing_to_replay() {
        let mut ctx = SessionContext::default();
        assert!(!ctx.is_configured());
        assert!(ctx.replay_statement().is_none());

        let stmt = SessionContext::statement_for("ledger.identity", Some("kiosk")).unwrap();
        ctx.set(Some("kiosk"), stmt);
        assert!(ctx.is_configured());
        assert_eq!(ctx.identity(), Some("kiosk"));
    }
}

use ccsbridge_api::SessionToken;

/// Device session held by the poll loop.
///
/// Starts empty, is filled by a successful login and cleared by any
/// failed authenticated request.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<SessionToken>,
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    pub fn establish(&mut self, token: SessionToken) {
        self.token = Some(token);
    }

    /// Drop the token. Returns whether a session was actually held.
    pub fn invalidate(&mut self) -> bool {
        self.token.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle() {
        let mut session = Session::default();
        assert!(!session.is_logged_in());
        assert!(!session.invalidate());

        session.establish(SessionToken::new("abc"));
        assert!(session.is_logged_in());
        assert_eq!(session.token().map(SessionToken::expose), Some("abc"));

        assert!(session.invalidate());
        assert!(!session.is_logged_in());
        assert!(session.token().is_none());
    }
}

use crate::domain::UserId;

// ============== Authorization ==============

/// Only the configured admin may run privileged commands (`/broadcast`).
///
/// Messages without a sender (channel posts, anonymous admins) are never authorized.
pub fn is_admin(user_id: Option<UserId>, admin: UserId) -> bool {
    let Some(user_id) = user_id else {
        return false;
    };
    user_id == admin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_configured_admin_is_authorized() {
        let admin = UserId(123);
        assert!(is_admin(Some(UserId(123)), admin));
        assert!(!is_admin(Some(UserId(124)), admin));
        assert!(!is_admin(None, admin));
    }
}

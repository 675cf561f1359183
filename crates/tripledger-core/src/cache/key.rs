//! Cache key construction.

use std::fmt;

use crate::AccountId;

/// Cache key identifying the itinerary of one message.
///
/// Format: `mail_itinerary:<account>:<mailbox byte length>:<mailbox>:<uid>`.
/// The length prefix keeps keys distinct even when mailbox names contain the
/// separator, so every `(account, mailbox, uid)` triple maps to its own key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Namespace prefix shared by all itinerary keys.
    pub const PREFIX: &'static str = "mail_itinerary";

    /// Builds the key for a message.
    #[must_use]
    pub fn for_message(account: AccountId, mailbox: &str, uid: u32) -> Self {
        Self(format!(
            "{}:{account}:{}:{mailbox}:{uid}",
            Self::PREFIX,
            mailbox.len()
        ))
    }

    /// The key as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_key_format() {
        let key = CacheKey::for_message(AccountId(42), "INBOX", 7);
        assert_eq!(key.as_str(), "mail_itinerary:42:5:INBOX:7");
    }

    #[test]
    fn test_separator_in_mailbox_does_not_collide() {
        // Naive `account_mailbox_uid` joining would map all of these to the same key
        let a = CacheKey::for_message(AccountId(1), "a_1", 2);
        let b = CacheKey::for_message(AccountId(1), "a", 12);
        assert_ne!(a, b);

        let c = CacheKey::for_message(AccountId(1), "x:1:y", 3);
        let d = CacheKey::for_message(AccountId(1), "x", 3);
        assert_ne!(c, d);

        let e = CacheKey::for_message(AccountId(12), "3:a", 4);
        let f = CacheKey::for_message(AccountId(1), "23:a", 4);
        assert_ne!(e, f);
    }

    proptest! {
        #[test]
        fn distinct_triples_give_distinct_keys(
            a1 in -3i64..3, m1 in "[a-z:_/0-9]{0,6}", u1 in 0u32..4,
            a2 in -3i64..3, m2 in "[a-z:_/0-9]{0,6}", u2 in 0u32..4,
        ) {
            let k1 = CacheKey::for_message(AccountId(a1), &m1, u1);
            let k2 = CacheKey::for_message(AccountId(a2), &m2, u2);
            prop_assert_eq!(k1 == k2, (a1, &m1, u1) == (a2, &m2, u2));
        }
    }
}

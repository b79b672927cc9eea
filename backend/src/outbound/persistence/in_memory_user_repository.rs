//! In-memory `UserRepository` used without a configured database.
//!
//! Backs the development fallback in the server builder and the HTTP test
//! suites. Behaviour mirrors the Diesel adapter, including the unique-email
//! constraint, so handler tests exercise the same error paths.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, User, UserId};

/// Mutex-guarded map of users keyed by id.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with the given users.
    pub fn with_users(seed: impl IntoIterator<Item = User>) -> Self {
        let users = seed
            .into_iter()
            .map(|user| (*user.id(), user))
            .collect::<HashMap<_, _>>();
        Self {
            users: Mutex::new(users),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<UserId, User>>, UserPersistenceError>
    {
        self.users
            .lock()
            .map_err(|_| UserPersistenceError::query("user store lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.lock()?;
        if users.values().any(|existing| existing.email() == user.email()) {
            return Err(UserPersistenceError::duplicate_email(
                user.email().as_ref(),
            ));
        }
        users.insert(*user.id(), user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.lock()?;
        let taken = users
            .values()
            .any(|existing| existing.id() != user.id() && existing.email() == user.email());
        if taken {
            return Err(UserPersistenceError::duplicate_email(
                user.email().as_ref(),
            ));
        }
        if !users.contains_key(user.id()) {
            return Err(UserPersistenceError::query("user not found for update"));
        }
        users.insert(*user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()?
            .values()
            .find(|user| user.email() == email)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut users: Vec<User> = self.lock()?.values().cloned().collect();
        users.sort_by(|a, b| a.display_name().as_ref().cmp(b.display_name().as_ref()));
        Ok(users)
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        Ok(self.lock()?.remove(id).is_some())
    }

    async fn count(&self) -> Result<u64, UserPersistenceError> {
        Ok(self.lock()?.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayName, PasswordHash};
    use rstest::rstest;

    fn user(name: &str, email: &str) -> User {
        User::new(
            UserId::random(),
            EmailAddress::new(email).expect("fixture email"),
            DisplayName::new(name).expect("fixture name"),
            PasswordHash::new("$argon2id$v=19$m=8192,t=1,p=1$c2FsdA$aGFzaA").expect("fixture hash"),
            false,
        )
    }

    #[tokio::test]
    async fn insert_then_lookup_by_id_and_email() {
        let repo = InMemoryUserRepository::new();
        let ada = user("Ada Lovelace", "ada@example.com");
        repo.insert(&ada).await.expect("insert succeeds");

        let by_id = repo.find_by_id(ada.id()).await.expect("lookup succeeds");
        assert_eq!(by_id.as_ref(), Some(&ada));
        let by_email = repo
            .find_by_email(ada.email())
            .await
            .expect("lookup succeeds");
        assert_eq!(by_email, Some(ada));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_on_insert() {
        let repo = InMemoryUserRepository::new();
        repo.insert(&user("Ada Lovelace", "ada@example.com"))
            .await
            .expect("first insert succeeds");

        let err = repo
            .insert(&user("Impostor", "ada@example.com"))
            .await
            .expect_err("second insert must fail");
        assert!(matches!(err, UserPersistenceError::DuplicateEmail { .. }));
    }

    #[tokio::test]
    async fn update_rejects_stealing_an_email() {
        let repo = InMemoryUserRepository::new();
        let ada = user("Ada Lovelace", "ada@example.com");
        let grace = user("Grace Hopper", "grace@example.com");
        repo.insert(&ada).await.expect("insert succeeds");
        repo.insert(&grace).await.expect("insert succeeds");

        let hijacked = grace
            .clone()
            .with_email(EmailAddress::new("ada@example.com").expect("email"));
        let err = repo
            .update(&hijacked)
            .await
            .expect_err("email collision must fail");
        assert!(matches!(err, UserPersistenceError::DuplicateEmail { .. }));
    }

    #[tokio::test]
    async fn list_is_ordered_by_display_name() {
        let repo = InMemoryUserRepository::with_users([
            user("Grace Hopper", "grace@example.com"),
            user("Ada Lovelace", "ada@example.com"),
        ]);

        let names: Vec<String> = repo
            .list()
            .await
            .expect("list succeeds")
            .into_iter()
            .map(|u| u.display_name().to_string())
            .collect();
        assert_eq!(names, vec!["Ada Lovelace", "Grace Hopper"]);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_reports_whether_a_record_existed() {
        let repo = InMemoryUserRepository::new();
        let ada = user("Ada Lovelace", "ada@example.com");
        repo.insert(&ada).await.expect("insert succeeds");

        assert!(repo.delete(ada.id()).await.expect("delete succeeds"));
        assert!(!repo.delete(ada.id()).await.expect("delete succeeds"));
        assert_eq!(repo.count().await.expect("count succeeds"), 0);
    }
}

//! Handle contact persistence.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::contact::{Contact, ContactUpdate};
use crate::error::{OrConflict, Result, ServerError};

/// Port for contact persistence.
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Insert a new [`Contact`] owned by `user_id`.
    async fn create(
        &self,
        email: &str,
        name: &str,
        phone: &str,
        user_id: Uuid,
    ) -> Result<Contact>;

    /// Find any contact whose email is `email` or whose phone is `phone`.
    async fn find_by_email_or_phone(
        &self,
        email: &str,
        phone: &str,
    ) -> Result<Option<Contact>>;

    /// Every contact owned by `user_id`, in insertion order.
    async fn find_all_contacts(&self, user_id: Uuid) -> Result<Vec<Contact>>;

    /// Overwrite name, email and phone.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::ContactNotFound`] if no contact has this id.
    async fn update_contact(&self, update: &ContactUpdate) -> Result<Contact>;

    /// Delete a contact, returning whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// PostgreSQL contact repository.
#[derive(Clone)]
pub struct PgContactRepository {
    pool: Pool<Postgres>,
}

impl PgContactRepository {
    /// Create a new [`PgContactRepository`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    async fn create(
        &self,
        email: &str,
        name: &str,
        phone: &str,
        user_id: Uuid,
    ) -> Result<Contact> {
        sqlx::query_as::<_, Contact>(
            r#"INSERT INTO contacts (id, name, email, phone, user_id)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, name, email, phone, user_id"#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .or_conflict(ServerError::ContactAlreadyExists)
    }

    async fn find_by_email_or_phone(
        &self,
        email: &str,
        phone: &str,
    ) -> Result<Option<Contact>> {
        Ok(sqlx::query_as::<_, Contact>(
            r#"SELECT id, name, email, phone, user_id FROM contacts
                WHERE email = $1 OR phone = $2
                LIMIT 1"#,
        )
        .bind(email)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_all_contacts(&self, user_id: Uuid) -> Result<Vec<Contact>> {
        Ok(sqlx::query_as::<_, Contact>(
            r#"SELECT id, name, email, phone, user_id FROM contacts
                WHERE user_id = $1
                ORDER BY created_at, id"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_contact(&self, update: &ContactUpdate) -> Result<Contact> {
        sqlx::query_as::<_, Contact>(
            r#"UPDATE contacts SET name = $1, email = $2, phone = $3
                WHERE id = $4
                RETURNING id, name, email, phone, user_id"#,
        )
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.phone)
        .bind(update.id)
        .fetch_optional(&self.pool)
        .await
        .or_conflict(ServerError::ContactAlreadyExists)?
        .ok_or(ServerError::ContactNotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// In-memory contact repository.
///
/// Mirrors the `UNIQUE` constraints of the `contacts` table on email and
/// phone.
#[derive(Default)]
pub struct MemoryContactRepository {
    contacts: RwLock<Vec<Contact>>,
}

fn collides(contact: &Contact, email: &str, phone: &str) -> bool {
    contact.email == email || contact.phone == phone
}

#[async_trait]
impl ContactRepository for MemoryContactRepository {
    async fn create(
        &self,
        email: &str,
        name: &str,
        phone: &str,
        user_id: Uuid,
    ) -> Result<Contact> {
        let mut contacts = self.contacts.write().await;
        if contacts.iter().any(|c| collides(c, email, phone)) {
            return Err(ServerError::ContactAlreadyExists);
        }

        let contact = Contact {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            email: email.to_owned(),
            phone: phone.to_owned(),
            user_id,
        };
        contacts.push(contact.clone());

        Ok(contact)
    }

    async fn find_by_email_or_phone(
        &self,
        email: &str,
        phone: &str,
    ) -> Result<Option<Contact>> {
        Ok(self
            .contacts
            .read()
            .await
            .iter()
            .find(|c| collides(c, email, phone))
            .cloned())
    }

    async fn find_all_contacts(&self, user_id: Uuid) -> Result<Vec<Contact>> {
        Ok(self
            .contacts
            .read()
            .await
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_contact(&self, update: &ContactUpdate) -> Result<Contact> {
        let mut contacts = self.contacts.write().await;
        if contacts
            .iter()
            .any(|c| c.id != update.id && collides(c, &update.email, &update.phone))
        {
            return Err(ServerError::ContactAlreadyExists);
        }

        let contact = contacts
            .iter_mut()
            .find(|c| c.id == update.id)
            .ok_or(ServerError::ContactNotFound)?;
        contact.name.clone_from(&update.name);
        contact.email.clone_from(&update.email);
        contact.phone.clone_from(&update.phone);

        Ok(contact.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut contacts = self.contacts.write().await;
        let len = contacts.len();
        contacts.retain(|c| c.id != id);

        Ok(contacts.len() != len)
    }
}

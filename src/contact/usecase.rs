//! Contact management for an identified user.

use std::sync::Arc;

use uuid::Uuid;

use crate::contact::{Contact, ContactRepository, ContactUpdate};
use crate::error::{Result, ServerError};
use crate::user::{User, UserRepository};

/// Contact use case service.
#[derive(Clone)]
pub struct ContactUseCase {
    contacts: Arc<dyn ContactRepository>,
    users: Arc<dyn UserRepository>,
}

impl ContactUseCase {
    /// Create a new [`ContactUseCase`].
    pub fn new(
        contacts: Arc<dyn ContactRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self { contacts, users }
    }

    async fn owner(&self, user_email: &str) -> Result<User> {
        self.users
            .find_by_email(user_email)
            .await?
            .ok_or(ServerError::UserNotFound)
    }

    /// Create a contact owned by the user identified by `user_email`.
    ///
    /// # Errors
    ///
    /// [`ServerError::UserNotFound`] if no user has this email,
    /// [`ServerError::ContactAlreadyExists`] if any contact already uses
    /// `email` or `phone`.
    pub async fn create(
        &self,
        email: &str,
        name: &str,
        phone: &str,
        user_email: &str,
    ) -> Result<Contact> {
        let user = self.owner(user_email).await?;

        if self
            .contacts
            .find_by_email_or_phone(email, phone)
            .await?
            .is_some()
        {
            return Err(ServerError::ContactAlreadyExists);
        }

        let contact = self.contacts.create(email, name, phone, user.id).await?;
        tracing::debug!(contact_id = %contact.id, user_id = %user.id, "contact created");

        Ok(contact)
    }

    /// List every contact of the user identified by `user_email`.
    pub async fn list_all_contacts(
        &self,
        user_email: &str,
    ) -> Result<Vec<Contact>> {
        let user = self.owner(user_email).await?;
        self.contacts.find_all_contacts(user.id).await
    }

    /// Overwrite name, email and phone of a contact.
    pub async fn update_contact(
        &self,
        id: Uuid,
        name: &str,
        email: &str,
        phone: &str,
    ) -> Result<Contact> {
        self.contacts
            .update_contact(&ContactUpdate {
                id,
                name: name.to_owned(),
                email: email.to_owned(),
                phone: phone.to_owned(),
            })
            .await
    }

    /// Delete a contact. Returns `false` if nothing was deleted.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        self.contacts.delete(id).await
    }
}

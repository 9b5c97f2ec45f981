use crate::{AccountError, Accounts, ManageUsers, ViewAccount};
use chrono::Utc;
use fhub_kernel::codes::{CodeError, customer_id, with_unique_code};
use fhub_kernel::domain::constants::USER;
use fhub_kernel::domain::models::{NotificationKind, User, WarehouseAddress};
use fhub_kernel::domain::security::{Capabilities, Role};
use fhub_kernel::record_id;
use fhub_kernel::security::{AccessDenied, Actor, Operation, ResourceGuard};
use fhub_notify::{Notification, Outbox};
use fhub_store::{Column, Store, StoreError};
use serde::Deserialize;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub phone: Option<String>,
    /// Defaults to `client`; other roles require an administrator.
    pub role: Option<Role>,
}

fn normalize_email(email: &str) -> Result<String, AccountError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AccountError::invalid("email", "not a valid email address")),
    }
}

/// Looks a user up by email, case-insensitively.
pub async fn by_email(store: &Store, email: &str) -> Result<Option<User>, StoreError> {
    store.find_by::<User>(Column::Email, &email.trim().to_lowercase()).await
}

impl Accounts {
    /// Registers a user. Without an actor this is self-registration and only
    /// creates clients.
    #[instrument(skip(self, actor, req), fields(actor = actor.map(|a| a.id.as_str())))]
    pub async fn register(
        &self,
        actor: Option<&Actor>,
        req: RegisterUser,
    ) -> Result<User, AccountError> {
        let role = req.role.unwrap_or(Role::Client);
        match actor {
            Some(actor) => actor.authorize::<ManageUsers>()?,
            None if role != Role::Client => {
                return Err(AccessDenied::Role {
                    role,
                    operation: ManageUsers::NAME,
                    context: Some("self-registration".into()),
                }
                .into());
            },
            None => {},
        }
        let email = normalize_email(&req.email)?;
        if by_email(&self.store, &email).await?.is_some() {
            return Err(AccountError::email_taken(&email));
        }

        let settings = fhub_settings::current(&self.store).await?;

        let phone = req.phone.as_deref().map(str::trim).filter(|p| !p.is_empty());
        let template = User {
            id: record_id!(USER),
            email: email.clone(),
            first_name: req.first_name.trim().to_owned(),
            last_name: req.last_name.trim().to_owned(),
            phone: phone.map(ToOwned::to_owned),
            role,
            customer_id: String::new(),
            is_active: true,
            created_at: Utc::now(),
        };
        let user = with_unique_code(
            self.workflow.code_attempts,
            || customer_id(&req.first_name, &req.last_name, &email),
            |customer_id| {
                let user = User { customer_id, ..template.clone() };
                let mut batch = self.store.batch();
                async move {
                    batch.create(&user)?;
                    batch.commit().await?;
                    Ok(user)
                }
            },
        )
        .await
        .map_err(|err| match err {
            CodeError::Store { source: StoreError::Duplicate { field, .. }, .. }
                if field == Column::Email.as_str() =>
            {
                AccountError::email_taken(&email)
            },
            err => err.into(),
        })?;

        let mut outbox = Outbox::default();
        outbox.push_if(
            settings.notifies(NotificationKind::AccountCreated),
            Notification::new(NotificationKind::AccountCreated, &user.id, &user.customer_id),
        );
        self.notifier.flush(outbox);
        info!(
            user = %user.id,
            role = %user.role,
            customer_id = %user.customer_id,
            "User registered"
        );
        Ok(user)
    }

    /// A user record; clients only see their own.
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn get(&self, actor: &Actor, id: &str) -> Result<User, AccountError> {
        actor.authorize::<ViewAccount>()?;
        let id = ResourceGuard::verify(id, USER)?;
        if !actor.sees(&id, Capabilities::MANAGE_USERS) {
            debug!("Foreign account requested");
            return Err(AccountError::not_found(&id));
        }
        self.store.get::<User>(&id).await?.ok_or_else(|| AccountError::not_found(&id))
    }

    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn find_by_email(&self, actor: &Actor, email: &str) -> Result<User, AccountError> {
        actor.authorize::<ManageUsers>()?;
        by_email(&self.store, email).await?.ok_or_else(|| AccountError::not_found(email))
    }

    /// The block the user gives to merchants, built on the default warehouse.
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn warehouse_address(
        &self,
        actor: &Actor,
        id: &str,
    ) -> Result<WarehouseAddress, AccountError> {
        let user = self.get(actor, id).await?;
        fhub_addresses::default_warehouse(&self.store)
            .await?
            .and_then(|warehouse| warehouse.personalized(&user))
            .ok_or(AccountError::NoWarehouse {
                message: "no default warehouse is configured".into(),
                context: None,
            })
    }
}

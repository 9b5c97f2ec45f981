use crate::{Pay, PaymentError, Payments, RefundPayment, ViewPayments};
use chrono::Utc;
use fhub_kernel::domain::constants::{PAYMENT, SHIPMENT};
use fhub_kernel::domain::models::{
    NotificationKind, Payment, PaymentMethod, PaymentStatus, Shipment, ShipmentStatus,
};
use fhub_kernel::domain::security::Capabilities;
use fhub_kernel::record_id;
use fhub_kernel::security::{Actor, ResourceGuard};
use fhub_notify::{Notification, Outbox};
use fhub_store::{Column, Store};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub method: PaymentMethod,
    /// The amount the client expects to pay. When given it must equal the
    /// shipment's total cost; the payment is always recorded at that total.
    #[serde(default)]
    pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPayment {
    /// Reference issued by the payment processor.
    #[serde(alias = "transaction_id")]
    pub transaction_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailPayment {
    #[serde(default)]
    pub reason: Option<String>,
}

/// A payment visible to `actor` and in `expected` status.
async fn payment_in(
    store: &Store,
    actor: &Actor,
    id: &str,
    expected: PaymentStatus,
) -> Result<Payment, PaymentError> {
    let payment = store
        .get::<Payment>(id)
        .await?
        .filter(|p| actor.sees(&p.owner, Capabilities::MANAGE_PAYMENTS))
        .ok_or_else(|| PaymentError::not_found(id.to_owned()))?;
    if payment.status != expected {
        return Err(PaymentError::rule(format!(
            "payment is {}, expected {expected}",
            payment.status
        )));
    }
    Ok(payment)
}

/// A payment settles a shipment only for its exact total cost.
fn ensure_covers(amount: Decimal, shipment: &Shipment) -> Result<(), PaymentError> {
    if amount == shipment.total_cost {
        Ok(())
    } else {
        Err(PaymentError::invalid(
            "amount",
            format!("must equal the shipment total of {}", shipment.total_cost),
        ))
    }
}

impl Payments {
    /// Opens a payment attempt against a pending shipment.
    #[instrument(skip(self, actor, req), fields(actor = %actor.id, method = %req.method))]
    pub async fn create_payment(
        &self,
        actor: &Actor,
        shipment_id: &str,
        req: NewPayment,
    ) -> Result<Payment, PaymentError> {
        actor.authorize::<Pay>()?;
        let shipment_id = ResourceGuard::verify(shipment_id, SHIPMENT)?;
        if req.amount.is_some_and(|amount| amount.is_sign_negative()) {
            return Err(PaymentError::invalid("amount", "must not be negative"));
        }

        if !fhub_settings::current(&self.store).await?.method_enabled(req.method) {
            return Err(PaymentError::rule(format!("{} payments are disabled", req.method)));
        }
        let shipment = self
            .store
            .get::<Shipment>(&shipment_id)
            .await?
            .filter(|s| actor.sees(&s.owner, Capabilities::MANAGE_PAYMENTS))
            .filter(|s| s.status == ShipmentStatus::Pending)
            .ok_or_else(|| PaymentError::not_found(format!("no pending shipment {shipment_id}")))?;
        if let Some(amount) = req.amount {
            ensure_covers(amount, &shipment)?;
        }

        let now = Utc::now();
        let payment = Payment {
            id: record_id!(PAYMENT),
            shipment_id: shipment.id,
            owner: shipment.owner,
            method: req.method,
            amount: shipment.total_cost,
            status: PaymentStatus::Pending,
            transaction_id: None,
            failure_reason: None,
            created_at: now,
            completed_at: None,
            updated_at: now,
        };
        let mut batch = self.store.batch();
        batch.create(&payment)?;
        batch.commit().await?;

        info!(
            payment = %payment.id,
            shipment = %payment.shipment_id,
            amount = %payment.amount,
            "Payment opened"
        );
        Ok(payment)
    }

    /// Completes a pending payment and marks its shipment paid, atomically.
    #[instrument(skip(self, actor, req), fields(actor = %actor.id))]
    pub async fn confirm(
        &self,
        actor: &Actor,
        id: &str,
        req: ConfirmPayment,
    ) -> Result<Payment, PaymentError> {
        actor.authorize::<Pay>()?;
        let id = ResourceGuard::verify(id, PAYMENT)?;
        let transaction_id = req.transaction_id.trim();
        if transaction_id.is_empty() {
            return Err(PaymentError::invalid("transactionId", "is required"));
        }

        let pending = payment_in(&self.store, actor, &id, PaymentStatus::Pending).await?;
        let settled = self
            .store
            .list_by::<Payment>(Column::Parent, &pending.shipment_id)
            .await?
            .iter()
            .any(|p| p.status == PaymentStatus::Completed);
        if settled {
            return Err(PaymentError::rule("shipment already has a completed payment"));
        }
        let shipment = self
            .store
            .get::<Shipment>(&pending.shipment_id)
            .await?
            .ok_or_else(|| PaymentError::not_found(pending.shipment_id.clone()))?;
        if shipment.status != ShipmentStatus::Pending {
            return Err(PaymentError::rule(format!("shipment is {}", shipment.status)));
        }
        if pending.amount != shipment.total_cost {
            return Err(PaymentError::rule(format!(
                "payment of {} does not cover the shipment total of {}",
                pending.amount, shipment.total_cost
            )));
        }

        let now = Utc::now();
        let mut paid = shipment.clone();
        paid.enter(ShipmentStatus::Paid, now);
        let payment = Payment {
            status: PaymentStatus::Completed,
            transaction_id: Some(transaction_id.to_owned()),
            completed_at: Some(now),
            updated_at: now,
            ..pending.clone()
        };
        let mut batch = self.store.batch();
        batch.update(&shipment, &paid)?.update(&pending, &payment)?;
        batch.commit().await?;

        let settings = fhub_settings::current(&self.store).await?;
        let mut outbox = Outbox::default();
        outbox.push_if(
            settings.notifies(NotificationKind::PaymentReceived),
            Notification::new(NotificationKind::PaymentReceived, &paid.owner, &paid.code),
        );
        self.notifier.flush(outbox);
        info!(payment = %payment.id, shipment = %payment.shipment_id, "Payment confirmed");
        Ok(payment)
    }

    /// Marks a pending attempt failed so the client can retry.
    #[instrument(skip(self, actor, req), fields(actor = %actor.id))]
    pub async fn fail(
        &self,
        actor: &Actor,
        id: &str,
        req: FailPayment,
    ) -> Result<Payment, PaymentError> {
        actor.authorize::<Pay>()?;
        let id = ResourceGuard::verify(id, PAYMENT)?;
        let reason = req.reason.as_deref().map(str::trim).filter(|r| !r.is_empty());

        let pending = payment_in(&self.store, actor, &id, PaymentStatus::Pending).await?;
        let payment = Payment {
            status: PaymentStatus::Failed,
            failure_reason: reason.map(ToOwned::to_owned),
            updated_at: Utc::now(),
            ..pending.clone()
        };
        let mut batch = self.store.batch();
        batch.update(&pending, &payment)?;
        batch.commit().await?;

        warn!(payment = %payment.id, reason = ?payment.failure_reason, "Payment failed");
        Ok(payment)
    }

    /// Returns a completed payment of a cancelled shipment.
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn refund(&self, actor: &Actor, id: &str) -> Result<Payment, PaymentError> {
        actor.authorize::<RefundPayment>()?;
        let id = ResourceGuard::verify(id, PAYMENT)?;

        let shipment_id = self
            .store
            .get::<Payment>(&id)
            .await?
            .map(|p| p.shipment_id)
            .ok_or_else(|| PaymentError::not_found(id.clone()))?;
        let cancelled = self
            .store
            .get::<Shipment>(&shipment_id)
            .await?
            .is_some_and(|s| s.status == ShipmentStatus::Cancelled);
        if !cancelled {
            return Err(PaymentError::rule("only payments of cancelled shipments can be refunded"));
        }
        let completed = payment_in(&self.store, actor, &id, PaymentStatus::Completed).await?;
        let payment = Payment {
            status: PaymentStatus::Refunded,
            updated_at: Utc::now(),
            ..completed.clone()
        };
        let mut batch = self.store.batch();
        batch.update(&completed, &payment)?;
        batch.commit().await?;

        info!(payment = %payment.id, amount = %payment.amount, "Payment refunded");
        Ok(payment)
    }

    /// Own payments, or all of them for payment managers; newest first.
    pub async fn list(&self, actor: &Actor) -> Result<Vec<Payment>, PaymentError> {
        actor.authorize::<ViewPayments>()?;
        let mut payments = if actor.can(Capabilities::MANAGE_PAYMENTS) {
            self.store.list::<Payment>().await?
        } else {
            self.store.list_by::<Payment>(Column::Owner, &actor.id).await?
        };
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(payments)
    }

    pub async fn get(&self, actor: &Actor, id: &str) -> Result<Payment, PaymentError> {
        actor.authorize::<ViewPayments>()?;
        let id = ResourceGuard::verify(id, PAYMENT)?;
        self.store
            .get::<Payment>(&id)
            .await?
            .filter(|p| actor.sees(&p.owner, Capabilities::MANAGE_PAYMENTS))
            .ok_or_else(|| PaymentError::not_found(id))
    }
}

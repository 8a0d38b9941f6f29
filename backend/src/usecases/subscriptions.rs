use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use chrono::Utc;
use crates::{
    domain::{
        entities::subscriptions::{ActivateSubscriptionEntity, InsertSubscriptionEntity},
        repositories::subscriptions::SubscriptionRepository,
        value_objects::{
            enums::subscription_statuses::SubscriptionStatus,
            plans::{PLAN_CURRENCY, PLANS, PlanDto, find_plan, quote},
            subscriptions::{
                CheckoutDto, CheckoutModel, SubscriptionDto, VerifyPaymentModel,
                subscription_period,
            },
        },
    },
    payments::razorpay_client::{RazorpayClient, RazorpayOrder},
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RazorpayGateway: Send + Sync {
    fn key_id(&self) -> String;

    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> AnyResult<RazorpayOrder>;

    fn verify_payment_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> AnyResult<bool>;
}

#[async_trait]
impl RazorpayGateway for RazorpayClient {
    fn key_id(&self) -> String {
        RazorpayClient::key_id(self).to_string()
    }

    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> AnyResult<RazorpayOrder> {
        self.create_order(amount_minor, currency, receipt).await
    }

    fn verify_payment_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> AnyResult<bool> {
        self.verify_payment_signature(order_id, payment_id, signature)
    }
}

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("plan not found")]
    PlanNotFound,
    #[error("duration of {0} months is not offered")]
    InvalidDuration(i32),
    #[error("subscription not found")]
    SubscriptionNotFound,
    #[error("no active subscription")]
    NoActiveSubscription,
    #[error("payment signature is invalid")]
    InvalidSignature,
    #[error("subscription is {0} and cannot be activated")]
    NotPending(SubscriptionStatus),
    #[error("payment provider request failed")]
    PaymentProvider(#[source] anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SubscriptionError::PlanNotFound
            | SubscriptionError::SubscriptionNotFound
            | SubscriptionError::NoActiveSubscription => StatusCode::NOT_FOUND,
            SubscriptionError::InvalidDuration(_) | SubscriptionError::InvalidSignature => {
                StatusCode::BAD_REQUEST
            }
            SubscriptionError::NotPending(_) => StatusCode::CONFLICT,
            SubscriptionError::PaymentProvider(_) => StatusCode::BAD_GATEWAY,
            SubscriptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

pub struct SubscriptionUseCase<S, G>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    G: RazorpayGateway + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
    razorpay: Arc<G>,
}

impl<S, G> SubscriptionUseCase<S, G>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    G: RazorpayGateway + Send + Sync + 'static,
{
    pub fn new(subscription_repo: Arc<S>, razorpay: Arc<G>) -> Self {
        Self {
            subscription_repo,
            razorpay,
        }
    }

    pub fn list_plans(&self) -> Vec<PlanDto> {
        PLANS.iter().map(PlanDto::from).collect()
    }

    pub async fn checkout(
        &self,
        user_id: Uuid,
        checkout_model: CheckoutModel,
    ) -> UseCaseResult<CheckoutDto> {
        let plan = find_plan(&checkout_model.plan_id).ok_or(SubscriptionError::PlanNotFound)?;
        let quote = quote(plan, checkout_model.duration_months)
            .ok_or(SubscriptionError::InvalidDuration(checkout_model.duration_months))?;

        let receipt = format!("sub_{}", Uuid::new_v4().simple());
        let order = self
            .razorpay
            .create_order(quote.final_amount_minor, PLAN_CURRENCY, &receipt)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    plan_id = plan.id,
                    provider_error = ?err,
                    "subscriptions: failed to create razorpay order"
                );
                SubscriptionError::PaymentProvider(err)
            })?;

        let subscription = self
            .subscription_repo
            .create_pending(InsertSubscriptionEntity {
                user_id,
                plan_id: plan.id.to_string(),
                duration_months: checkout_model.duration_months,
                original_amount_minor: quote.original_amount_minor,
                discount_amount_minor: quote.discount_amount_minor,
                final_amount_minor: quote.final_amount_minor,
                razorpay_order_id: Some(order.id.clone()),
                status: SubscriptionStatus::Pending.to_string(),
            })
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    order_id = %order.id,
                    db_error = ?err,
                    "subscriptions: failed to store pending subscription"
                );
                SubscriptionError::Internal(err)
            })?;

        info!(
            %user_id,
            subscription_id = %subscription.id,
            plan_id = plan.id,
            duration_months = checkout_model.duration_months,
            amount_minor = quote.final_amount_minor,
            "subscriptions: checkout started"
        );

        Ok(CheckoutDto {
            subscription_id: subscription.id,
            razorpay_order_id: order.id,
            razorpay_key_id: self.razorpay.key_id(),
            amount_minor: quote.final_amount_minor,
            currency: PLAN_CURRENCY.to_string(),
            original_amount_minor: quote.original_amount_minor,
            discount_amount_minor: quote.discount_amount_minor,
        })
    }

    /// Activates the subscription behind a Razorpay checkout. The new period
    /// starts when the user's current active period ends, or now.
    pub async fn verify_payment(
        &self,
        user_id: Uuid,
        verify_payment_model: VerifyPaymentModel,
    ) -> UseCaseResult<SubscriptionDto> {
        let model = verify_payment_model;
        let now = Utc::now();

        let subscription = self
            .subscription_repo
            .find_by_order_id(&model.razorpay_order_id)
            .await
            .map_err(|err| {
                error!(
                    order_id = %model.razorpay_order_id,
                    db_error = ?err,
                    "subscriptions: order lookup failed"
                );
                SubscriptionError::Internal(err)
            })?
            .filter(|subscription| subscription.user_id == user_id)
            .ok_or(SubscriptionError::SubscriptionNotFound)?;

        let status = SubscriptionStatus::from_str(&subscription.status);
        if status == SubscriptionStatus::Active
            && subscription.razorpay_payment_id.as_deref()
                == Some(model.razorpay_payment_id.as_str())
        {
            return Ok(SubscriptionDto::from_entity(subscription, now));
        }
        if status != SubscriptionStatus::Pending {
            return Err(SubscriptionError::NotPending(status));
        }

        let valid = self.razorpay.verify_payment_signature(
            &model.razorpay_order_id,
            &model.razorpay_payment_id,
            &model.razorpay_signature,
        )?;
        if !valid {
            warn!(
                %user_id,
                order_id = %model.razorpay_order_id,
                "subscriptions: payment signature mismatch"
            );
            return Err(SubscriptionError::InvalidSignature);
        }

        let current = self
            .subscription_repo
            .find_current_active(user_id, now)
            .await
            .map_err(SubscriptionError::Internal)?;
        let starts_at = current
            .and_then(|current| current.end_date)
            .map_or(now, |end_date| end_date.max(now));

        let (start_date, end_date) = subscription_period(starts_at, subscription.duration_months)
            .ok_or_else(|| {
                SubscriptionError::Internal(anyhow::anyhow!(
                    "subscription {} has an invalid duration",
                    subscription.id
                ))
            })?;

        let activated = self
            .subscription_repo
            .activate(
                subscription.id,
                ActivateSubscriptionEntity {
                    razorpay_payment_id: Some(model.razorpay_payment_id),
                    razorpay_signature: Some(model.razorpay_signature),
                    status: SubscriptionStatus::Active.to_string(),
                    start_date: Some(start_date),
                    end_date: Some(end_date),
                    updated_at: now,
                },
            )
            .await
            .map_err(|err| {
                error!(
                    subscription_id = %subscription.id,
                    db_error = ?err,
                    "subscriptions: failed to activate"
                );
                SubscriptionError::Internal(err)
            })?;

        info!(
            %user_id,
            subscription_id = %activated.id,
            %start_date,
            %end_date,
            "subscriptions: subscription activated"
        );

        Ok(SubscriptionDto::from_entity(activated, now))
    }

    pub async fn current_subscription(
        &self,
        user_id: Uuid,
    ) -> UseCaseResult<Option<SubscriptionDto>> {
        let now = Utc::now();
        let current = self
            .subscription_repo
            .find_current_active(user_id, now)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    db_error = ?err,
                    "subscriptions: failed to load current subscription"
                );
                SubscriptionError::Internal(err)
            })?;

        Ok(current.map(|subscription| SubscriptionDto::from_entity(subscription, now)))
    }

    pub async fn cancel(&self, user_id: Uuid) -> UseCaseResult<SubscriptionDto> {
        let now = Utc::now();
        let current = self
            .subscription_repo
            .find_current_active(user_id, now)
            .await
            .map_err(SubscriptionError::Internal)?
            .ok_or(SubscriptionError::NoActiveSubscription)?;

        self.subscription_repo
            .update_status(current.id, SubscriptionStatus::Cancelled)
            .await
            .map_err(|err| {
                error!(
                    subscription_id = %current.id,
                    db_error = ?err,
                    "subscriptions: failed to cancel"
                );
                SubscriptionError::Internal(err)
            })?;

        info!(%user_id, subscription_id = %current.id, "subscriptions: subscription cancelled");

        let mut dto = SubscriptionDto::from_entity(current, now);
        dto.status = SubscriptionStatus::Cancelled;
        Ok(dto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crates::domain::{
        entities::subscriptions::SubscriptionEntity,
        repositories::subscriptions::MockSubscriptionRepository,
    };

    fn subscription(user_id: Uuid, status: SubscriptionStatus) -> SubscriptionEntity {
        let now = Utc::now();
        SubscriptionEntity {
            id: Uuid::new_v4(),
            user_id,
            plan_id: "starter".to_string(),
            duration_months: 3,
            original_amount_minor: 149_700,
            discount_amount_minor: 7_485,
            final_amount_minor: 142_215,
            razorpay_order_id: Some("order_1".to_string()),
            razorpay_payment_id: None,
            razorpay_signature: None,
            status: status.to_string(),
            start_date: None,
            end_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn verify_model() -> VerifyPaymentModel {
        VerifyPaymentModel {
            razorpay_order_id: "order_1".to_string(),
            razorpay_payment_id: "pay_1".to_string(),
            razorpay_signature: "deadbeef".to_string(),
        }
    }

    #[tokio::test]
    async fn checkout_prices_the_plan_with_duration_discount() {
        let user_id = Uuid::new_v4();

        let mut razorpay = MockRazorpayGateway::new();
        razorpay
            .expect_create_order()
            .withf(|amount, currency, receipt| {
                *amount == 142_215 && currency == "INR" && receipt.starts_with("sub_")
            })
            .times(1)
            .returning(|amount, currency, _| {
                Ok(RazorpayOrder {
                    id: "order_1".to_string(),
                    amount,
                    currency: currency.to_string(),
                    status: Some("created".to_string()),
                })
            });
        razorpay
            .expect_key_id()
            .return_const("rzp_test_key".to_string());

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_create_pending()
            .withf(|insert| insert.status == "pending" && insert.discount_amount_minor == 7_485)
            .times(1)
            .returning(move |insert| {
                let created = subscription(insert.user_id, SubscriptionStatus::Pending);
                Box::pin(async move { Ok(created) })
            });

        let usecase = SubscriptionUseCase::new(Arc::new(subscription_repo), Arc::new(razorpay));
        let dto = usecase
            .checkout(
                user_id,
                CheckoutModel {
                    plan_id: "starter".to_string(),
                    duration_months: 3,
                },
            )
            .await
            .unwrap();

        assert_eq!(dto.amount_minor, 142_215);
        assert_eq!(dto.original_amount_minor, 149_700);
        assert_eq!(dto.razorpay_key_id, "rzp_test_key");
    }

    #[tokio::test]
    async fn checkout_rejects_unoffered_duration() {
        let usecase = SubscriptionUseCase::new(
            Arc::new(MockSubscriptionRepository::new()),
            Arc::new(MockRazorpayGateway::new()),
        );

        let err = usecase
            .checkout(
                Uuid::new_v4(),
                CheckoutModel {
                    plan_id: "starter".to_string(),
                    duration_months: 2,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::InvalidDuration(2)));
    }

    #[tokio::test]
    async fn bad_signature_leaves_subscription_pending() {
        let user_id = Uuid::new_v4();

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_order_id()
            .returning(move |_| {
                let pending = subscription(user_id, SubscriptionStatus::Pending);
                Box::pin(async move { Ok(Some(pending)) })
            });
        subscription_repo.expect_activate().never();

        let mut razorpay = MockRazorpayGateway::new();
        razorpay
            .expect_verify_payment_signature()
            .returning(|_, _, _| Ok(false));

        let usecase = SubscriptionUseCase::new(Arc::new(subscription_repo), Arc::new(razorpay));
        let err = usecase
            .verify_payment(user_id, verify_model())
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::InvalidSignature));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn renewal_starts_when_current_period_ends() {
        let user_id = Uuid::new_v4();
        let current_end = Utc::now() + Duration::days(10);

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_order_id()
            .returning(move |_| {
                let pending = subscription(user_id, SubscriptionStatus::Pending);
                Box::pin(async move { Ok(Some(pending)) })
            });
        subscription_repo
            .expect_find_current_active()
            .returning(move |_, _| {
                let mut active = subscription(user_id, SubscriptionStatus::Active);
                active.end_date = Some(current_end);
                Box::pin(async move { Ok(Some(active)) })
            });
        subscription_repo
            .expect_activate()
            .withf(move |_, activate| {
                activate.status == "active" && activate.start_date == Some(current_end)
            })
            .times(1)
            .returning(move |id, activate| {
                let mut activated = subscription(user_id, SubscriptionStatus::Active);
                activated.id = id;
                activated.start_date = activate.start_date;
                activated.end_date = activate.end_date;
                activated.razorpay_payment_id = activate.razorpay_payment_id;
                Box::pin(async move { Ok(activated) })
            });

        let mut razorpay = MockRazorpayGateway::new();
        razorpay
            .expect_verify_payment_signature()
            .withf(|order_id, payment_id, signature| {
                order_id == "order_1" && payment_id == "pay_1" && signature == "deadbeef"
            })
            .returning(|_, _, _| Ok(true));

        let usecase = SubscriptionUseCase::new(Arc::new(subscription_repo), Arc::new(razorpay));
        let dto = usecase.verify_payment(user_id, verify_model()).await.unwrap();

        assert_eq!(dto.status, SubscriptionStatus::Active);
        assert_eq!(dto.start_date, Some(current_end));
        assert!(dto.end_date.unwrap() > current_end + Duration::days(80));
    }

    #[tokio::test]
    async fn verifying_the_same_payment_twice_is_idempotent() {
        let user_id = Uuid::new_v4();

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_order_id()
            .returning(move |_| {
                let mut active = subscription(user_id, SubscriptionStatus::Active);
                active.razorpay_payment_id = Some("pay_1".to_string());
                active.end_date = Some(Utc::now() + Duration::days(30));
                Box::pin(async move { Ok(Some(active)) })
            });
        subscription_repo.expect_activate().never();

        let mut razorpay = MockRazorpayGateway::new();
        razorpay.expect_verify_payment_signature().never();

        let usecase = SubscriptionUseCase::new(Arc::new(subscription_repo), Arc::new(razorpay));
        let dto = usecase.verify_payment(user_id, verify_model()).await.unwrap();

        assert_eq!(dto.status, SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn another_users_order_is_not_found() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_order_id()
            .returning(|_| {
                let pending = subscription(Uuid::new_v4(), SubscriptionStatus::Pending);
                Box::pin(async move { Ok(Some(pending)) })
            });

        let usecase = SubscriptionUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(MockRazorpayGateway::new()),
        );
        let err = usecase
            .verify_payment(Uuid::new_v4(), verify_model())
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::SubscriptionNotFound));
    }

    #[tokio::test]
    async fn cancel_without_active_subscription_is_not_found() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_current_active()
            .returning(|_, _| Box::pin(async { Ok(None) }));
        subscription_repo.expect_update_status().never();

        let usecase = SubscriptionUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(MockRazorpayGateway::new()),
        );

        let err = usecase.cancel(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, SubscriptionError::NoActiveSubscription));
    }

    #[test]
    fn plans_list_every_duration_option() {
        let usecase = SubscriptionUseCase::new(
            Arc::new(MockSubscriptionRepository::new()),
            Arc::new(MockRazorpayGateway::new()),
        );

        let plans = usecase.list_plans();
        assert_eq!(plans.len(), 2);
        assert!(plans.iter().all(|plan| plan.options.len() == 4));
    }
}

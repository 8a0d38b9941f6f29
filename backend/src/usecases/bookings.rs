use std::{collections::HashMap, sync::Arc};

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use chrono::Utc;
use crates::{
    domain::{
        entities::bookings::{BookingEntity, InsertBookingEntity, UpdateBookingStatusEntity},
        repositories::{bookings::BookingRepository, properties::PropertyRepository},
        value_objects::{
            booking_lifecycle::{BookingState, LifecycleError, OwnerDecision, service_charge_minor},
            bookings::{
                BookingDto, CreateBookingModel, DecisionAction, MAX_BOOKING_PRICE_MINOR,
                MAX_STAY_NIGHTS, PaymentIntentDto,
            },
            enums::payment_statuses::PaymentStatus,
            realtime::{RealtimeEvent, RealtimeEventType, Room},
        },
    },
    infra::realtime::room_hub::RoomHub,
    payments::stripe_client::{
        EVENT_CHARGE_REFUNDED, EVENT_PAYMENT_FAILED, EVENT_PAYMENT_SUCCEEDED, StripeClient,
        StripeEvent, StripePaymentIntent,
    },
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        metadata: HashMap<String, String>,
    ) -> AnyResult<StripePaymentIntent>;

    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> AnyResult<StripeEvent>;
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        metadata: HashMap<String, String>,
    ) -> AnyResult<StripePaymentIntent> {
        self.create_payment_intent(amount_minor, currency, metadata)
            .await
    }

    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> AnyResult<StripeEvent> {
        self.verify_webhook_signature(payload, signature)
    }
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("{0}")]
    InvalidRequest(&'static str),
    #[error("property not found")]
    PropertyNotFound,
    #[error("booking not found")]
    BookingNotFound,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("property is already booked for these dates")]
    DatesUnavailable,
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("invalid webhook: {0}")]
    InvalidWebhook(&'static str),
    #[error("payment provider request failed")]
    PaymentProvider(#[source] anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl BookingError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            BookingError::InvalidRequest(_) | BookingError::InvalidWebhook(_) => {
                StatusCode::BAD_REQUEST
            }
            BookingError::PropertyNotFound | BookingError::BookingNotFound => StatusCode::NOT_FOUND,
            BookingError::Forbidden(_) => StatusCode::FORBIDDEN,
            BookingError::DatesUnavailable | BookingError::Lifecycle(_) => StatusCode::CONFLICT,
            BookingError::PaymentProvider(_) => StatusCode::BAD_GATEWAY,
            BookingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, BookingError>;

fn current_state(booking: &BookingEntity) -> UseCaseResult<BookingState> {
    BookingState::parse(
        &booking.booking_status,
        &booking.owner_approval_status,
        &booking.payment_status,
    )
    .ok_or_else(|| {
        BookingError::Internal(anyhow::anyhow!(
            "booking {} has unknown status columns",
            booking.id
        ))
    })
}

fn status_update(state: BookingState, transaction_id: Option<String>) -> UpdateBookingStatusEntity {
    UpdateBookingStatusEntity {
        booking_status: state.booking_status.as_str().to_string(),
        owner_approval_status: state.owner_approval_status.as_str().to_string(),
        payment_status: state.payment_status.as_str().to_string(),
        transaction_id,
        updated_at: Utc::now(),
    }
}

pub struct BookingUseCase<B, P, G>
where
    B: BookingRepository + Send + Sync + 'static,
    P: PropertyRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    booking_repo: Arc<B>,
    property_repo: Arc<P>,
    payment_gateway: Arc<G>,
    room_hub: Arc<RoomHub>,
    currency: String,
}

impl<B, P, G> BookingUseCase<B, P, G>
where
    B: BookingRepository + Send + Sync + 'static,
    P: PropertyRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    pub fn new(
        booking_repo: Arc<B>,
        property_repo: Arc<P>,
        payment_gateway: Arc<G>,
        room_hub: Arc<RoomHub>,
        currency: String,
    ) -> Self {
        Self {
            booking_repo,
            property_repo,
            payment_gateway,
            room_hub,
            currency,
        }
    }

    pub async fn create_booking(
        &self,
        traveller_id: Uuid,
        create_booking_model: CreateBookingModel,
    ) -> UseCaseResult<BookingDto> {
        let model = create_booking_model;
        let today = Utc::now().date_naive();

        if model.guests < 1 {
            return Err(BookingError::InvalidRequest("at least one guest is required"));
        }
        if model.end_date <= model.start_date {
            return Err(BookingError::InvalidRequest("end_date must be after start_date"));
        }
        if model.start_date < today {
            return Err(BookingError::InvalidRequest("start_date cannot be in the past"));
        }
        if (model.end_date - model.start_date).num_days() > MAX_STAY_NIGHTS {
            return Err(BookingError::InvalidRequest("stay cannot exceed 365 nights"));
        }
        if model.price_minor <= 0 || model.price_minor > MAX_BOOKING_PRICE_MINOR {
            return Err(BookingError::InvalidRequest("price_minor must be positive"));
        }

        let property = self
            .property_repo
            .find_by_id(model.property_id)
            .await
            .map_err(|err| {
                error!(
                    property_id = %model.property_id,
                    db_error = ?err,
                    "bookings: failed to load property"
                );
                BookingError::Internal(err)
            })?
            .filter(|property| property.is_active)
            .ok_or(BookingError::PropertyNotFound)?;

        if property.owner_id == traveller_id {
            return Err(BookingError::Forbidden("you cannot book your own property"));
        }
        if model.guests > property.max_guests {
            return Err(BookingError::InvalidRequest(
                "guests exceed the property's capacity",
            ));
        }

        let overlapping = self
            .booking_repo
            .list_approved_overlapping(property.id, model.start_date, model.end_date)
            .await
            .map_err(|err| {
                error!(
                    property_id = %property.id,
                    db_error = ?err,
                    "bookings: overlap check failed"
                );
                BookingError::Internal(err)
            })?;
        if !overlapping.is_empty() {
            info!(
                property_id = %property.id,
                start_date = %model.start_date,
                end_date = %model.end_date,
                "bookings: requested dates overlap an approved booking"
            );
            return Err(BookingError::DatesUnavailable);
        }

        let state = BookingState::new();
        let booking = self
            .booking_repo
            .create(InsertBookingEntity {
                property_id: property.id,
                owner_id: property.owner_id,
                traveller_id,
                start_date: model.start_date,
                end_date: model.end_date,
                guests: model.guests,
                price_minor: model.price_minor,
                service_charge_minor: service_charge_minor(model.price_minor),
                booking_status: state.booking_status.as_str().to_string(),
                owner_approval_status: state.owner_approval_status.as_str().to_string(),
                payment_status: state.payment_status.as_str().to_string(),
            })
            .await
            .map_err(|err| {
                error!(%traveller_id, db_error = ?err, "bookings: failed to create booking");
                BookingError::Internal(err)
            })?;

        info!(
            booking_id = %booking.id,
            property_id = %booking.property_id,
            %traveller_id,
            price_minor = booking.price_minor,
            service_charge_minor = booking.service_charge_minor,
            "bookings: booking requested"
        );

        self.notify(
            &[Room::owner(booking.owner_id)],
            RealtimeEventType::BookingRequested,
            &booking,
        )
        .await;

        Ok(booking.into())
    }

    pub async fn list_traveller_bookings(
        &self,
        traveller_id: Uuid,
    ) -> UseCaseResult<Vec<BookingDto>> {
        let bookings = self
            .booking_repo
            .list_by_traveller(traveller_id)
            .await
            .map_err(|err| {
                error!(
                    %traveller_id,
                    db_error = ?err,
                    "bookings: failed to list traveller bookings"
                );
                BookingError::Internal(err)
            })?;
        Ok(bookings.into_iter().map(BookingDto::from).collect())
    }

    pub async fn list_owner_bookings(&self, owner_id: Uuid) -> UseCaseResult<Vec<BookingDto>> {
        let bookings = self
            .booking_repo
            .list_by_owner(owner_id)
            .await
            .map_err(|err| {
                error!(%owner_id, db_error = ?err, "bookings: failed to list owner bookings");
                BookingError::Internal(err)
            })?;
        Ok(bookings.into_iter().map(BookingDto::from).collect())
    }

    pub async fn get_booking(&self, user_id: Uuid, booking_id: Uuid) -> UseCaseResult<BookingDto> {
        let booking = self.load(booking_id).await?;
        if booking.owner_id != user_id && booking.traveller_id != user_id {
            return Err(BookingError::Forbidden("you are not part of this booking"));
        }
        Ok(booking.into())
    }

    pub async fn decide_booking(
        &self,
        owner_id: Uuid,
        booking_id: Uuid,
        action: DecisionAction,
    ) -> UseCaseResult<BookingDto> {
        let booking = self.load(booking_id).await?;
        if booking.owner_id != owner_id {
            return Err(BookingError::Forbidden("only the property owner can decide"));
        }

        let decision = match action {
            DecisionAction::Approve => OwnerDecision::Approve,
            DecisionAction::Reject => OwnerDecision::Reject,
        };
        let next = current_state(&booking)?.decide(decision).map_err(|err| {
            warn!(%booking_id, reason = %err, "bookings: decision refused");
            BookingError::Lifecycle(err)
        })?;

        if decision == OwnerDecision::Approve {
            self.ensure_dates_free(&booking).await?;
        }

        let booking = self.save(booking_id, next, None).await?;
        info!(%booking_id, %owner_id, status = %next.booking_status, "bookings: owner decided");

        let event_type = match decision {
            OwnerDecision::Approve => RealtimeEventType::BookingApproved,
            OwnerDecision::Reject => RealtimeEventType::BookingRejected,
        };
        self.notify(&[Room::traveller(booking.traveller_id)], event_type, &booking)
            .await;

        Ok(booking.into())
    }

    pub async fn cancel_booking(
        &self,
        traveller_id: Uuid,
        booking_id: Uuid,
    ) -> UseCaseResult<BookingDto> {
        let booking = self.load(booking_id).await?;
        if booking.traveller_id != traveller_id {
            return Err(BookingError::Forbidden("only the traveller can cancel this booking"));
        }

        let next = current_state(&booking)?.cancel()?;
        let booking = self.save(booking_id, next, None).await?;
        info!(%booking_id, %traveller_id, "bookings: booking cancelled");

        self.notify(
            &[Room::owner(booking.owner_id)],
            RealtimeEventType::BookingCancelled,
            &booking,
        )
        .await;

        Ok(booking.into())
    }

    pub async fn create_payment_intent(
        &self,
        traveller_id: Uuid,
        booking_id: Uuid,
    ) -> UseCaseResult<PaymentIntentDto> {
        let booking = self.load(booking_id).await?;
        if booking.traveller_id != traveller_id {
            return Err(BookingError::Forbidden("only the traveller can pay for this booking"));
        }

        current_state(&booking)?.ensure_payable().map_err(|err| {
            warn!(%booking_id, reason = %err, "bookings: payment refused");
            BookingError::Lifecycle(err)
        })?;

        let amount_minor = booking.price_minor + booking.service_charge_minor;
        let metadata = HashMap::from([
            ("booking_id".to_string(), booking.id.to_string()),
            ("traveller_id".to_string(), traveller_id.to_string()),
        ]);

        let intent = self
            .payment_gateway
            .create_payment_intent(amount_minor, &self.currency, metadata)
            .await
            .map_err(|err| {
                error!(
                    %booking_id,
                    provider_error = ?err,
                    "bookings: failed to open payment intent"
                );
                BookingError::PaymentProvider(err)
            })?;

        let client_secret = intent.client_secret.clone().ok_or_else(|| {
            BookingError::PaymentProvider(anyhow::anyhow!("payment intent has no client secret"))
        })?;

        self.booking_repo
            .set_payment_intent(booking_id, intent.id.clone())
            .await
            .map_err(|err| {
                error!(%booking_id, db_error = ?err, "bookings: failed to store payment intent");
                BookingError::Internal(err)
            })?;

        info!(
            %booking_id,
            payment_intent_id = %intent.id,
            amount_minor,
            "bookings: payment intent opened"
        );

        Ok(PaymentIntentDto {
            booking_id,
            payment_intent_id: intent.id,
            client_secret,
            amount_minor,
            currency: self.currency.clone(),
        })
    }

    /// Applies a verified Stripe event. Events for unknown bookings or refused
    /// transitions are acknowledged so Stripe stops retrying them.
    pub async fn handle_stripe_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> UseCaseResult<()> {
        let signature = signature.ok_or(BookingError::InvalidWebhook("missing stripe-signature"))?;

        let event = self
            .payment_gateway
            .verify_webhook_signature(payload, signature)
            .map_err(|err| {
                warn!(reason = %err, "bookings: webhook signature rejected");
                BookingError::InvalidWebhook("signature verification failed")
            })?;

        debug!(event_id = ?event.id, event_type = %event.type_, "bookings: webhook received");

        match event.type_.as_str() {
            EVENT_PAYMENT_SUCCEEDED | EVENT_PAYMENT_FAILED => {
                let intent = StripeClient::extract_payment_intent(&event)
                    .ok_or(BookingError::InvalidWebhook("malformed payment intent"))?;

                let Some(booking) = self.booking_for_intent(&intent).await? else {
                    warn!(payment_intent_id = %intent.id, "bookings: webhook for unknown booking");
                    return Ok(());
                };

                if event.type_ == EVENT_PAYMENT_SUCCEEDED {
                    let transaction_id = intent.latest_charge.clone().unwrap_or(intent.id.clone());
                    self.apply_payment(booking, PaymentStatus::Paid, Some(transaction_id))
                        .await
                } else {
                    self.apply_payment(booking, PaymentStatus::Failed, None).await
                }
            }
            EVENT_CHARGE_REFUNDED => {
                let charge = StripeClient::extract_charge(&event)
                    .ok_or(BookingError::InvalidWebhook("malformed charge"))?;
                let Some(payment_intent_id) = charge.payment_intent else {
                    warn!(charge_id = %charge.id, "bookings: refund without payment intent");
                    return Ok(());
                };

                let booking = self
                    .booking_repo
                    .find_by_payment_intent_id(&payment_intent_id)
                    .await
                    .map_err(BookingError::Internal)?;
                let Some(booking) = booking else {
                    warn!(%payment_intent_id, "bookings: refund for unknown booking");
                    return Ok(());
                };

                self.apply_payment(booking, PaymentStatus::Refunded, None).await
            }
            other => {
                debug!(event_type = %other, "bookings: webhook event ignored");
                Ok(())
            }
        }
    }

    async fn booking_for_intent(
        &self,
        intent: &StripePaymentIntent,
    ) -> UseCaseResult<Option<BookingEntity>> {
        let booking = self
            .booking_repo
            .find_by_payment_intent_id(&intent.id)
            .await
            .map_err(|err| {
                error!(
                    payment_intent_id = %intent.id,
                    db_error = ?err,
                    "bookings: intent lookup failed"
                );
                BookingError::Internal(err)
            })?;
        if booking.is_some() {
            return Ok(booking);
        }

        let Some(booking_id) = intent
            .metadata
            .get("booking_id")
            .and_then(|raw| Uuid::parse_str(raw).ok())
        else {
            return Ok(None);
        };

        self.booking_repo
            .find_by_id(booking_id)
            .await
            .map_err(BookingError::Internal)
    }

    async fn apply_payment(
        &self,
        booking: BookingEntity,
        to: PaymentStatus,
        transaction_id: Option<String>,
    ) -> UseCaseResult<()> {
        let booking_id = booking.id;
        let current = current_state(&booking)?;

        let next = match current.record_payment(to) {
            Ok(next) => next,
            Err(LifecycleError::Closed(status)) if to == PaymentStatus::Paid => {
                warn!(
                    %booking_id,
                    booking_status = %status,
                    transaction_id = ?transaction_id,
                    "bookings: payment captured for a closed booking; refund it with the provider"
                );
                return Ok(());
            }
            Err(err) => {
                warn!(%booking_id, reason = %err, "bookings: webhook transition refused");
                return Ok(());
            }
        };
        if next == current {
            debug!(%booking_id, payment_status = %to, "bookings: webhook already applied");
            return Ok(());
        }

        let booking = self.save(booking_id, next, transaction_id).await?;
        info!(
            %booking_id,
            payment_status = %next.payment_status,
            booking_status = %next.booking_status,
            "bookings: payment status updated"
        );

        let event_type = match to {
            PaymentStatus::Paid => RealtimeEventType::PaymentSucceeded,
            PaymentStatus::Failed => RealtimeEventType::PaymentFailed,
            _ => RealtimeEventType::PaymentRefunded,
        };
        self.notify(
            &[Room::owner(booking.owner_id), Room::traveller(booking.traveller_id)],
            event_type,
            &booking,
        )
        .await;

        Ok(())
    }

    /// Another approved booking over the same nights blocks approval.
    async fn ensure_dates_free(&self, booking: &BookingEntity) -> UseCaseResult<()> {
        let overlapping = self
            .booking_repo
            .list_approved_overlapping(booking.property_id, booking.start_date, booking.end_date)
            .await
            .map_err(|err| {
                error!(
                    booking_id = %booking.id,
                    db_error = ?err,
                    "bookings: overlap check failed"
                );
                BookingError::Internal(err)
            })?;

        if overlapping.iter().any(|other| other.id != booking.id) {
            info!(
                booking_id = %booking.id,
                property_id = %booking.property_id,
                "bookings: approval refused, dates already approved for another booking"
            );
            return Err(BookingError::DatesUnavailable);
        }
        Ok(())
    }

    async fn load(&self, booking_id: Uuid) -> UseCaseResult<BookingEntity> {
        self.booking_repo
            .find_by_id(booking_id)
            .await
            .map_err(|err| {
                error!(%booking_id, db_error = ?err, "bookings: failed to load booking");
                BookingError::Internal(err)
            })?
            .ok_or(BookingError::BookingNotFound)
    }

    async fn save(
        &self,
        booking_id: Uuid,
        state: BookingState,
        transaction_id: Option<String>,
    ) -> UseCaseResult<BookingEntity> {
        self.booking_repo
            .update_status(booking_id, status_update(state, transaction_id))
            .await
            .map_err(|err| {
                error!(%booking_id, db_error = ?err, "bookings: failed to write status");
                BookingError::Internal(err)
            })
    }

    async fn notify(&self, rooms: &[Room], event_type: RealtimeEventType, booking: &BookingEntity) {
        let payload = json!({
            "property_id": booking.property_id,
            "start_date": booking.start_date,
            "end_date": booking.end_date,
            "guests": booking.guests,
            "booking_status": booking.booking_status,
            "owner_approval_status": booking.owner_approval_status,
            "payment_status": booking.payment_status,
        });

        for room in rooms {
            let event = RealtimeEvent::new(event_type, booking.id, payload.clone());
            self.room_hub.emit(*room, event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use crates::domain::{
        entities::properties::PropertyEntity,
        repositories::{bookings::MockBookingRepository, properties::MockPropertyRepository},
    };
    use crates::payments::stripe_client::StripeEventData;

    fn stay() -> (NaiveDate, NaiveDate) {
        let start = Utc::now().date_naive() + Duration::days(10);
        (start, start + Duration::days(3))
    }

    fn property(owner_id: Uuid) -> PropertyEntity {
        PropertyEntity {
            id: Uuid::new_v4(),
            owner_id,
            title: "Lake cabin".to_string(),
            description: "Quiet cabin by the lake".to_string(),
            address: "1 Shore Road".to_string(),
            city: "Udaipur".to_string(),
            country: "India".to_string(),
            price_per_night_minor: 5_000,
            max_guests: 4,
            bedrooms: 2,
            bathrooms: 1,
            amenities: vec!["wifi".to_string()],
            images: vec![],
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn booking(owner_id: Uuid, traveller_id: Uuid, state: BookingState) -> BookingEntity {
        let (start_date, end_date) = stay();
        BookingEntity {
            id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            owner_id,
            traveller_id,
            start_date,
            end_date,
            guests: 2,
            price_minor: 15_000,
            service_charge_minor: 1_800,
            booking_status: state.booking_status.as_str().to_string(),
            owner_approval_status: state.owner_approval_status.as_str().to_string(),
            payment_status: state.payment_status.as_str().to_string(),
            payment_intent_id: None,
            transaction_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn approved() -> BookingState {
        BookingState::new()
            .decide(OwnerDecision::Approve)
            .unwrap()
    }

    fn usecase(
        booking_repo: MockBookingRepository,
        property_repo: MockPropertyRepository,
        gateway: MockPaymentGateway,
        room_hub: Arc<RoomHub>,
    ) -> BookingUseCase<MockBookingRepository, MockPropertyRepository, MockPaymentGateway> {
        BookingUseCase::new(
            Arc::new(booking_repo),
            Arc::new(property_repo),
            Arc::new(gateway),
            room_hub,
            "inr".to_string(),
        )
    }

    fn succeeded_event(booking_id: Uuid) -> StripeEvent {
        StripeEvent {
            id: Some("evt_1".to_string()),
            type_: EVENT_PAYMENT_SUCCEEDED.to_string(),
            created: Some(1_700_000_000),
            data: StripeEventData {
                object: json!({
                    "id": "pi_123",
                    "latest_charge": "ch_456",
                    "metadata": { "booking_id": booking_id.to_string() },
                }),
            },
        }
    }

    #[tokio::test]
    async fn create_booking_adds_service_charge_and_notifies_owner() {
        let owner_id = Uuid::new_v4();
        let traveller_id = Uuid::new_v4();
        let listing = property(owner_id);
        let property_id = listing.id;
        let (start_date, end_date) = stay();

        let mut property_repo = MockPropertyRepository::new();
        property_repo
            .expect_find_by_id()
            .returning(move |_| {
                let listing = listing.clone();
                Box::pin(async move { Ok(Some(listing)) })
            });

        let mut booking_repo = MockBookingRepository::new();
        booking_repo
            .expect_list_approved_overlapping()
            .returning(|_, _, _| Box::pin(async { Ok(vec![]) }));
        booking_repo
            .expect_create()
            .withf(|insert| {
                insert.service_charge_minor == 1_200 && insert.booking_status == "pending"
            })
            .times(1)
            .returning(move |insert| {
                let mut created =
                    booking(insert.owner_id, insert.traveller_id, BookingState::new());
                created.property_id = insert.property_id;
                created.price_minor = insert.price_minor;
                created.service_charge_minor = insert.service_charge_minor;
                Box::pin(async move { Ok(created) })
            });

        let room_hub = Arc::new(RoomHub::new());
        let mut owner_room = room_hub.join(Room::owner(owner_id)).await;

        let usecase = usecase(booking_repo, property_repo, MockPaymentGateway::new(), room_hub);
        let dto = usecase
            .create_booking(
                traveller_id,
                CreateBookingModel {
                    property_id,
                    start_date,
                    end_date,
                    guests: 2,
                    price_minor: 10_000,
                },
            )
            .await
            .unwrap();

        assert_eq!(dto.service_charge_minor, 1_200);
        assert_eq!(dto.total_minor, 11_200);

        let event = owner_room.recv().await.unwrap();
        assert_eq!(event.event_type, RealtimeEventType::BookingRequested);
        assert_eq!(event.booking_id, dto.id);
    }

    #[tokio::test]
    async fn create_booking_refuses_dates_held_by_an_approved_booking() {
        let owner_id = Uuid::new_v4();
        let listing = property(owner_id);
        let property_id = listing.id;
        let (start_date, end_date) = stay();

        let mut property_repo = MockPropertyRepository::new();
        property_repo.expect_find_by_id().returning(move |_| {
            let listing = listing.clone();
            Box::pin(async move { Ok(Some(listing)) })
        });

        let mut booking_repo = MockBookingRepository::new();
        booking_repo
            .expect_list_approved_overlapping()
            .returning(move |_, _, _| {
                let held = booking(owner_id, Uuid::new_v4(), approved());
                Box::pin(async move { Ok(vec![held]) })
            });
        booking_repo.expect_create().never();

        let usecase = usecase(
            booking_repo,
            property_repo,
            MockPaymentGateway::new(),
            Arc::new(RoomHub::new()),
        );
        let err = usecase
            .create_booking(
                Uuid::new_v4(),
                CreateBookingModel {
                    property_id,
                    start_date,
                    end_date,
                    guests: 2,
                    price_minor: 10_000,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::DatesUnavailable));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn create_booking_rejects_reversed_dates_before_touching_storage() {
        let (start_date, end_date) = stay();
        let usecase = usecase(
            MockBookingRepository::new(),
            MockPropertyRepository::new(),
            MockPaymentGateway::new(),
            Arc::new(RoomHub::new()),
        );

        let err = usecase
            .create_booking(
                Uuid::new_v4(),
                CreateBookingModel {
                    property_id: Uuid::new_v4(),
                    start_date: end_date,
                    end_date: start_date,
                    guests: 2,
                    price_minor: 10_000,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn owner_cannot_book_own_property() {
        let owner_id = Uuid::new_v4();
        let listing = property(owner_id);
        let property_id = listing.id;
        let (start_date, end_date) = stay();

        let mut property_repo = MockPropertyRepository::new();
        property_repo.expect_find_by_id().returning(move |_| {
            let listing = listing.clone();
            Box::pin(async move { Ok(Some(listing)) })
        });

        let usecase = usecase(
            MockBookingRepository::new(),
            property_repo,
            MockPaymentGateway::new(),
            Arc::new(RoomHub::new()),
        );
        let err = usecase
            .create_booking(
                owner_id,
                CreateBookingModel {
                    property_id,
                    start_date,
                    end_date,
                    guests: 1,
                    price_minor: 10_000,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::Forbidden(_)));
    }

    #[tokio::test]
    async fn approval_notifies_traveller() {
        let owner_id = Uuid::new_v4();
        let traveller_id = Uuid::new_v4();
        let pending = booking(owner_id, traveller_id, BookingState::new());
        let booking_id = pending.id;

        let mut booking_repo = MockBookingRepository::new();
        booking_repo.expect_find_by_id().returning(move |_| {
            let pending = pending.clone();
            Box::pin(async move { Ok(Some(pending)) })
        });
        booking_repo
            .expect_list_approved_overlapping()
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(vec![]) }));
        booking_repo
            .expect_update_status()
            .withf(|_, update| {
                update.booking_status == "approved" && update.owner_approval_status == "approved"
            })
            .times(1)
            .returning(move |id, update| {
                let mut saved = booking(owner_id, traveller_id, approved());
                saved.id = id;
                saved.booking_status = update.booking_status;
                Box::pin(async move { Ok(saved) })
            });

        let room_hub = Arc::new(RoomHub::new());
        let mut traveller_room = room_hub.join(Room::traveller(traveller_id)).await;

        let usecase = usecase(
            booking_repo,
            MockPropertyRepository::new(),
            MockPaymentGateway::new(),
            room_hub,
        );
        let dto = usecase
            .decide_booking(owner_id, booking_id, DecisionAction::Approve)
            .await
            .unwrap();

        assert_eq!(dto.owner_approval_status.as_str(), "approved");
        let event = traveller_room.recv().await.unwrap();
        assert_eq!(event.event_type, RealtimeEventType::BookingApproved);
    }

    #[tokio::test]
    async fn approval_is_refused_when_another_booking_holds_the_dates() {
        let owner_id = Uuid::new_v4();
        let pending = booking(owner_id, Uuid::new_v4(), BookingState::new());
        let booking_id = pending.id;
        let property_id = pending.property_id;
        let (start_date, end_date) = (pending.start_date, pending.end_date);

        let mut booking_repo = MockBookingRepository::new();
        booking_repo.expect_find_by_id().returning(move |_| {
            let pending = pending.clone();
            Box::pin(async move { Ok(Some(pending)) })
        });
        booking_repo
            .expect_list_approved_overlapping()
            .withf(move |id, start, end| {
                *id == property_id && *start == start_date && *end == end_date
            })
            .times(1)
            .returning(move |_, _, _| {
                let mut held = booking(owner_id, Uuid::new_v4(), approved());
                held.property_id = property_id;
                Box::pin(async move { Ok(vec![held]) })
            });
        booking_repo.expect_update_status().never();

        let usecase = usecase(
            booking_repo,
            MockPropertyRepository::new(),
            MockPaymentGateway::new(),
            Arc::new(RoomHub::new()),
        );
        let err = usecase
            .decide_booking(owner_id, booking_id, DecisionAction::Approve)
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::DatesUnavailable));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn rejection_skips_the_overlap_check() {
        let owner_id = Uuid::new_v4();
        let traveller_id = Uuid::new_v4();
        let pending = booking(owner_id, traveller_id, BookingState::new());
        let booking_id = pending.id;

        let mut booking_repo = MockBookingRepository::new();
        booking_repo.expect_find_by_id().returning(move |_| {
            let pending = pending.clone();
            Box::pin(async move { Ok(Some(pending)) })
        });
        booking_repo.expect_list_approved_overlapping().never();
        booking_repo
            .expect_update_status()
            .withf(|_, update| update.booking_status == "rejected")
            .times(1)
            .returning(move |id, update| {
                let mut saved = booking(owner_id, traveller_id, BookingState::new());
                saved.id = id;
                saved.booking_status = update.booking_status;
                saved.owner_approval_status = update.owner_approval_status;
                Box::pin(async move { Ok(saved) })
            });

        let usecase = usecase(
            booking_repo,
            MockPropertyRepository::new(),
            MockPaymentGateway::new(),
            Arc::new(RoomHub::new()),
        );
        let dto = usecase
            .decide_booking(owner_id, booking_id, DecisionAction::Reject)
            .await
            .unwrap();

        assert_eq!(dto.owner_approval_status.as_str(), "rejected");
    }

    #[tokio::test]
    async fn only_the_owner_decides() {
        let pending = booking(Uuid::new_v4(), Uuid::new_v4(), BookingState::new());
        let booking_id = pending.id;

        let mut booking_repo = MockBookingRepository::new();
        booking_repo.expect_find_by_id().returning(move |_| {
            let pending = pending.clone();
            Box::pin(async move { Ok(Some(pending)) })
        });
        booking_repo.expect_update_status().never();

        let usecase = usecase(
            booking_repo,
            MockPropertyRepository::new(),
            MockPaymentGateway::new(),
            Arc::new(RoomHub::new()),
        );
        let err = usecase
            .decide_booking(Uuid::new_v4(), booking_id, DecisionAction::Approve)
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::Forbidden(_)));
    }

    #[tokio::test]
    async fn payment_intent_is_refused_until_owner_approves() {
        let traveller_id = Uuid::new_v4();
        let pending = booking(Uuid::new_v4(), traveller_id, BookingState::new());
        let booking_id = pending.id;

        let mut booking_repo = MockBookingRepository::new();
        booking_repo.expect_find_by_id().returning(move |_| {
            let pending = pending.clone();
            Box::pin(async move { Ok(Some(pending)) })
        });

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_create_payment_intent().never();

        let usecase = usecase(
            booking_repo,
            MockPropertyRepository::new(),
            gateway,
            Arc::new(RoomHub::new()),
        );
        let err = usecase
            .create_payment_intent(traveller_id, booking_id)
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::Lifecycle(LifecycleError::NotApproved)));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn payment_intent_charges_price_plus_service_charge() {
        let traveller_id = Uuid::new_v4();
        let approved_booking = booking(Uuid::new_v4(), traveller_id, approved());
        let booking_id = approved_booking.id;

        let mut booking_repo = MockBookingRepository::new();
        booking_repo.expect_find_by_id().returning(move |_| {
            let approved_booking = approved_booking.clone();
            Box::pin(async move { Ok(Some(approved_booking)) })
        });
        booking_repo
            .expect_set_payment_intent()
            .withf(|_, intent_id| intent_id == "pi_123")
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_payment_intent()
            .withf(move |amount, currency, metadata| {
                *amount == 16_800
                    && currency == "inr"
                    && metadata.get("booking_id") == Some(&booking_id.to_string())
            })
            .times(1)
            .returning(|amount, _, _| {
                Ok(StripePaymentIntent {
                    id: "pi_123".to_string(),
                    client_secret: Some("pi_123_secret".to_string()),
                    amount: Some(amount),
                    currency: Some("inr".to_string()),
                    latest_charge: None,
                    metadata: HashMap::new(),
                })
            });

        let usecase = usecase(
            booking_repo,
            MockPropertyRepository::new(),
            gateway,
            Arc::new(RoomHub::new()),
        );
        let dto = usecase
            .create_payment_intent(traveller_id, booking_id)
            .await
            .unwrap();

        assert_eq!(dto.amount_minor, 16_800);
        assert_eq!(dto.client_secret, "pi_123_secret");
    }

    #[tokio::test]
    async fn webhook_without_signature_is_rejected() {
        let usecase = usecase(
            MockBookingRepository::new(),
            MockPropertyRepository::new(),
            MockPaymentGateway::new(),
            Arc::new(RoomHub::new()),
        );

        let err = usecase.handle_stripe_webhook(b"{}", None).await.unwrap_err();
        assert!(matches!(err, BookingError::InvalidWebhook(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn succeeded_webhook_marks_booking_paid_and_notifies_both_sides() {
        let owner_id = Uuid::new_v4();
        let traveller_id = Uuid::new_v4();
        let mut approved_booking = booking(owner_id, traveller_id, approved());
        approved_booking.payment_intent_id = Some("pi_123".to_string());
        let booking_id = approved_booking.id;

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_verify_webhook_signature()
            .returning(move |_, _| Ok(succeeded_event(booking_id)));

        let mut booking_repo = MockBookingRepository::new();
        booking_repo
            .expect_find_by_payment_intent_id()
            .withf(|intent_id| intent_id == "pi_123")
            .returning(move |_| {
                let approved_booking = approved_booking.clone();
                Box::pin(async move { Ok(Some(approved_booking)) })
            });
        booking_repo
            .expect_update_status()
            .withf(|_, update| {
                update.payment_status == "paid"
                    && update.transaction_id.as_deref() == Some("ch_456")
            })
            .times(1)
            .returning(move |id, update| {
                let mut saved = booking(owner_id, traveller_id, approved());
                saved.id = id;
                saved.payment_status = update.payment_status;
                saved.transaction_id = update.transaction_id;
                Box::pin(async move { Ok(saved) })
            });

        let room_hub = Arc::new(RoomHub::new());
        let mut owner_room = room_hub.join(Room::owner(owner_id)).await;
        let mut traveller_room = room_hub.join(Room::traveller(traveller_id)).await;

        let usecase = usecase(booking_repo, MockPropertyRepository::new(), gateway, room_hub);
        usecase
            .handle_stripe_webhook(b"{}", Some("t=1,v1=abc"))
            .await
            .unwrap();

        assert_eq!(
            owner_room.recv().await.unwrap().event_type,
            RealtimeEventType::PaymentSucceeded
        );
        assert_eq!(
            traveller_room.recv().await.unwrap().event_type,
            RealtimeEventType::PaymentSucceeded
        );
    }

    #[tokio::test]
    async fn webhook_for_unknown_booking_is_acknowledged() {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_verify_webhook_signature()
            .returning(|_, _| Ok(succeeded_event(Uuid::new_v4())));

        let mut booking_repo = MockBookingRepository::new();
        booking_repo
            .expect_find_by_payment_intent_id()
            .returning(|_| Box::pin(async { Ok(None) }));
        booking_repo
            .expect_find_by_id()
            .returning(|_| Box::pin(async { Ok(None) }));
        booking_repo.expect_update_status().never();

        let usecase = usecase(
            booking_repo,
            MockPropertyRepository::new(),
            gateway,
            Arc::new(RoomHub::new()),
        );

        assert!(
            usecase
                .handle_stripe_webhook(b"{}", Some("t=1,v1=abc"))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn success_webhook_after_cancellation_leaves_booking_cancelled() {
        let traveller_id = Uuid::new_v4();
        let owner_id = Uuid::new_v4();
        let cancelled = booking(owner_id, traveller_id, approved().cancel().unwrap());
        let booking_id = cancelled.id;

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_verify_webhook_signature()
            .returning(move |_, _| Ok(succeeded_event(booking_id)));

        let mut booking_repo = MockBookingRepository::new();
        booking_repo.expect_find_by_payment_intent_id().returning(move |_| {
            let cancelled = cancelled.clone();
            Box::pin(async move { Ok(Some(cancelled)) })
        });
        booking_repo.expect_update_status().never();

        let room_hub = Arc::new(RoomHub::new());
        let mut owner_room = room_hub.join(Room::owner(owner_id)).await;

        let usecase = usecase(
            booking_repo,
            MockPropertyRepository::new(),
            gateway,
            Arc::clone(&room_hub),
        );
        usecase
            .handle_stripe_webhook(b"{}", Some("t=1,v1=abc"))
            .await
            .unwrap();

        assert!(owner_room.try_recv().is_err());
    }

    #[tokio::test]
    async fn repeated_success_webhook_writes_nothing() {
        let traveller_id = Uuid::new_v4();
        let paid_state = approved().record_payment(PaymentStatus::Paid).unwrap();
        let paid = booking(Uuid::new_v4(), traveller_id, paid_state);
        let booking_id = paid.id;

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_verify_webhook_signature()
            .returning(move |_, _| Ok(succeeded_event(booking_id)));

        let mut booking_repo = MockBookingRepository::new();
        booking_repo.expect_find_by_payment_intent_id().returning(move |_| {
            let paid = paid.clone();
            Box::pin(async move { Ok(Some(paid)) })
        });
        booking_repo.expect_update_status().never();

        let usecase = usecase(
            booking_repo,
            MockPropertyRepository::new(),
            gateway,
            Arc::new(RoomHub::new()),
        );

        usecase
            .handle_stripe_webhook(b"{}", Some("t=1,v1=abc"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn only_the_traveller_cancels() {
        let pending = booking(Uuid::new_v4(), Uuid::new_v4(), BookingState::new());
        let booking_id = pending.id;

        let mut booking_repo = MockBookingRepository::new();
        booking_repo.expect_find_by_id().returning(move |_| {
            let pending = pending.clone();
            Box::pin(async move { Ok(Some(pending)) })
        });
        booking_repo.expect_update_status().never();

        let usecase = usecase(
            booking_repo,
            MockPropertyRepository::new(),
            MockPaymentGateway::new(),
            Arc::new(RoomHub::new()),
        );
        let err = usecase
            .cancel_booking(Uuid::new_v4(), booking_id)
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::Forbidden(_)));
    }
}

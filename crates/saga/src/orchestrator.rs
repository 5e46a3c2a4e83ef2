//! Saga orchestrator for order creation and cancellation.

use common::{OrderId, Principal, ProductId, UserId};
use domain::{Order, OrderItem, OrderRepository, OrderStatus};
use events::{EventPublisher, IntegrationEvent};
use serde::{Deserialize, Serialize};

use crate::error::SagaError;
use crate::gateway::{GatewayError, InventoryGateway};

/// A requested line item: product plus quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    /// The product to order.
    pub product_id: ProductId,
    /// Units requested (must be positive).
    pub quantity: u32,
}

/// Input to the creation saga.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    /// Optional delivery address.
    pub shipping_address: Option<String>,
    /// Optional free-form notes.
    pub notes: Option<String>,
    /// Requested line items, processed in input order.
    pub items: Vec<OrderLine>,
}

/// Drives the order creation/cancellation saga.
///
/// Creation is reserve-all-then-commit: the order row is written and the
/// `OrderCreated` event published only after every item's reservation
/// succeeded. Any failure part-way releases everything reserved so far in
/// this run and surfaces the original failure; no partial order is ever
/// persisted.
pub struct SagaOrchestrator<G, R, P>
where
    G: InventoryGateway,
    R: OrderRepository,
    P: EventPublisher,
{
    gateway: G,
    repository: R,
    publisher: P,
}

impl<G, R, P> SagaOrchestrator<G, R, P>
where
    G: InventoryGateway,
    R: OrderRepository,
    P: EventPublisher,
{
    /// Creates a new orchestrator.
    pub fn new(gateway: G, repository: R, publisher: P) -> Self {
        Self {
            gateway,
            repository,
            publisher,
        }
    }

    /// Executes the creation saga for the given owner and request.
    #[tracing::instrument(skip(self, request), fields(items = request.items.len()))]
    pub async fn create_order(
        &self,
        owner: UserId,
        request: CreateOrderRequest,
    ) -> Result<Order, SagaError> {
        metrics::counter!("saga_create_total").increment(1);
        let saga_start = std::time::Instant::now();

        // 1. Validate before any remote call
        if request.items.is_empty() {
            return Err(SagaError::EmptyOrder);
        }
        if let Some(line) = request.items.iter().find(|line| line.quantity == 0) {
            return Err(SagaError::InvalidQuantity(line.product_id.clone()));
        }

        // 2. Reserve every item, in input order, snapshotting name/price
        let mut reserved: Vec<(ProductId, u32)> = Vec::with_capacity(request.items.len());
        let mut snapshots: Vec<OrderItem> = Vec::with_capacity(request.items.len());

        for line in &request.items {
            let info = match self.gateway.fetch_product(&line.product_id).await {
                Ok(info) if info.is_active => info,
                Ok(_) => {
                    return self
                        .abort_creation(
                            reserved,
                            SagaError::ProductUnavailable(line.product_id.clone()),
                        )
                        .await;
                }
                Err(GatewayError::NotFound(_)) => {
                    return self
                        .abort_creation(
                            reserved,
                            SagaError::ProductUnavailable(line.product_id.clone()),
                        )
                        .await;
                }
                Err(err) => {
                    return self
                        .abort_creation(reserved, SagaError::CatalogUnreachable(err.to_string()))
                        .await;
                }
            };

            match self
                .gateway
                .reserve_stock(&line.product_id, line.quantity)
                .await
            {
                Ok(()) => {
                    reserved.push((line.product_id.clone(), line.quantity));
                    snapshots.push(OrderItem::new(
                        line.product_id.clone(),
                        info.name,
                        info.unit_price,
                        line.quantity,
                    ));
                }
                Err(GatewayError::Conflict { .. }) => {
                    return self
                        .abort_creation(reserved, SagaError::InsufficientStock(info.name))
                        .await;
                }
                Err(GatewayError::NotFound(_)) => {
                    return self
                        .abort_creation(
                            reserved,
                            SagaError::ProductUnavailable(line.product_id.clone()),
                        )
                        .await;
                }
                Err(GatewayError::Unavailable(detail)) => {
                    return self
                        .abort_creation(reserved, SagaError::CatalogUnreachable(detail))
                        .await;
                }
            }
        }

        // 3. All reservations held: persist, then publish
        let order = Order::new(owner, snapshots, request.shipping_address, request.notes)?;
        self.repository.insert(order.clone()).await?;
        self.publisher.publish(IntegrationEvent::order_created(&order));

        metrics::counter!("saga_create_completed_total").increment(1);
        metrics::histogram!("saga_duration_seconds").record(saga_start.elapsed().as_secs_f64());
        tracing::info!(order_id = %order.id(), total = %order.total_amount(), "order created");

        Ok(order)
    }

    /// Releases everything reserved so far and returns the original failure.
    async fn abort_creation(
        &self,
        reserved: Vec<(ProductId, u32)>,
        reason: SagaError,
    ) -> Result<Order, SagaError> {
        metrics::counter!("saga_create_failed_total").increment(1);
        tracing::warn!(error = %reason, reserved = reserved.len(), "creation saga aborted, compensating");

        // Compensate in reverse order of reservation. Individual release
        // failures are logged, not retried, and never change the failure
        // reported to the caller.
        for (product_id, quantity) in reserved.iter().rev() {
            match self.gateway.release_stock(product_id, *quantity).await {
                Ok(()) => {
                    metrics::counter!("saga_compensations_total").increment(1);
                }
                Err(err) => {
                    metrics::counter!("saga_compensation_failures_total").increment(1);
                    tracing::error!(%product_id, quantity, error = %err, "compensating release failed");
                }
            }
        }

        Err(reason)
    }

    /// Executes the cancellation saga.
    ///
    /// Once the ownership and status checks pass, cancellation always
    /// succeeds from the order's perspective: individual stock releases
    /// that fail are logged and skipped, which can leave units incorrectly
    /// reserved (a known, monitored inconsistency).
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(
        &self,
        order_id: OrderId,
        principal: Principal,
    ) -> Result<Order, SagaError> {
        metrics::counter!("saga_cancel_total").increment(1);

        let mut order = self
            .repository
            .get(order_id)
            .await?
            .ok_or(SagaError::OrderNotFound(order_id))?;

        if !principal.is_admin() && !principal.owns(order.owner_id()) {
            return Err(SagaError::AccessDenied);
        }

        if !order.status().can_cancel() {
            return Err(SagaError::Order(domain::OrderError::InvalidTransition {
                from: order.status(),
                to: OrderStatus::Cancelled,
            }));
        }

        // Release reservations best-effort before flipping the status
        for item in order.items() {
            if let Err(err) = self
                .gateway
                .release_stock(&item.product_id, item.quantity)
                .await
            {
                metrics::counter!("saga_cancel_release_failures_total").increment(1);
                tracing::warn!(
                    %order_id,
                    product_id = %item.product_id,
                    quantity = item.quantity,
                    error = %err,
                    "release failed during cancellation, continuing"
                );
            }
        }

        order.cancel()?;
        self.repository.update(order.clone()).await?;
        self.publisher
            .publish(IntegrationEvent::order_cancelled(&order));

        metrics::counter!("saga_cancel_completed_total").increment(1);
        tracing::info!(%order_id, "order cancelled");

        Ok(order)
    }

    /// Administrative forward progression (`Confirmed → … → Delivered`).
    ///
    /// Cancellation requests are routed through [`Self::cancel_order`] so
    /// stock is released; every other target goes through the transition
    /// graph.
    #[tracing::instrument(skip(self))]
    pub async fn advance_status(
        &self,
        order_id: OrderId,
        to: OrderStatus,
        principal: Principal,
    ) -> Result<Order, SagaError> {
        if !principal.is_admin() {
            return Err(SagaError::AccessDenied);
        }

        if to == OrderStatus::Cancelled {
            return self.cancel_order(order_id, principal).await;
        }

        let mut order = self
            .repository
            .get(order_id)
            .await?
            .ok_or(SagaError::OrderNotFound(order_id))?;

        order.transition_to(to)?;
        self.repository.update(order.clone()).await?;

        tracing::info!(%order_id, status = %to, "order status advanced");
        Ok(order)
    }

    /// Loads an order, enforcing ownership for non-admin principals.
    pub async fn get_order(
        &self,
        order_id: OrderId,
        principal: Principal,
    ) -> Result<Order, SagaError> {
        let order = self
            .repository
            .get(order_id)
            .await?
            .ok_or(SagaError::OrderNotFound(order_id))?;

        if !principal.is_admin() && !principal.owns(order.owner_id()) {
            return Err(SagaError::AccessDenied);
        }

        Ok(order)
    }

    /// Lists the principal's own orders.
    pub async fn list_orders(&self, principal: Principal) -> Result<Vec<Order>, SagaError> {
        Ok(self.repository.list_for_owner(principal.user_id).await?)
    }
}

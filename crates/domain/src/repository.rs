//! Order persistence contract and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{OrderId, UserId};

use crate::error::RepositoryError;
use crate::order::Order;

/// Persistence contract for orders.
///
/// The backing store is an external collaborator; any engine with atomic
/// per-row updates and a transactional write for the order+items group
/// suffices. Single-writer-per-order-id is the caller's responsibility.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts a new order. Fails if the ID is already taken.
    async fn insert(&self, order: Order) -> Result<(), RepositoryError>;

    /// Loads an order by ID. Returns `None` if absent.
    async fn get(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Replaces a previously inserted order.
    async fn update(&self, order: Order) -> Result<(), RepositoryError>;

    /// Lists all orders belonging to an owner.
    async fn list_for_owner(&self, owner_id: UserId) -> Result<Vec<Order>, RepositoryError>;
}

/// In-memory order repository for tests and single-process wiring.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub fn order_count(&self) -> usize {
        self.orders.read().unwrap().len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, order: Order) -> Result<(), RepositoryError> {
        let mut orders = self.orders.write().unwrap();
        if orders.contains_key(&order.id()) {
            return Err(RepositoryError::DuplicateOrder(order.id()));
        }
        orders.insert(order.id(), order);
        Ok(())
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.orders.read().unwrap().get(&order_id).cloned())
    }

    async fn update(&self, order: Order) -> Result<(), RepositoryError> {
        let mut orders = self.orders.write().unwrap();
        if !orders.contains_key(&order.id()) {
            return Err(RepositoryError::NotFound(order.id()));
        }
        orders.insert(order.id(), order);
        Ok(())
    }

    async fn list_for_owner(&self, owner_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        Ok(self
            .orders
            .read()
            .unwrap()
            .values()
            .filter(|order| order.owner_id() == owner_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::order::OrderItem;
    use crate::status::OrderStatus;

    fn order_for(owner: UserId) -> Order {
        let items = vec![OrderItem::new(
            "SKU-001",
            "Widget",
            Money::from_cents(1000),
            1,
        )];
        Order::new(owner, items, None, None).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = InMemoryOrderRepository::new();
        let order = order_for(UserId::new());
        let order_id = order.id();

        repo.insert(order).await.unwrap();

        let loaded = repo.get(order_id).await.unwrap().unwrap();
        assert_eq!(loaded.id(), order_id);
        assert_eq!(repo.order_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_fails() {
        let repo = InMemoryOrderRepository::new();
        let order = order_for(UserId::new());

        repo.insert(order.clone()).await.unwrap();
        let result = repo.insert(order).await;
        assert!(matches!(result, Err(RepositoryError::DuplicateOrder(_))));
    }

    #[tokio::test]
    async fn test_update_persists_status() {
        let repo = InMemoryOrderRepository::new();
        let mut order = order_for(UserId::new());
        let order_id = order.id();
        repo.insert(order.clone()).await.unwrap();

        order.cancel().unwrap();
        repo.update(order).await.unwrap();

        let loaded = repo.get(order_id).await.unwrap().unwrap();
        assert_eq!(loaded.status(), OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_update_missing_order_fails() {
        let repo = InMemoryOrderRepository::new();
        let order = order_for(UserId::new());

        let result = repo.update(order).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_for_owner_filters() {
        let repo = InMemoryOrderRepository::new();
        let owner = UserId::new();

        repo.insert(order_for(owner)).await.unwrap();
        repo.insert(order_for(owner)).await.unwrap();
        repo.insert(order_for(UserId::new())).await.unwrap();

        let orders = repo.list_for_owner(owner).await.unwrap();
        assert_eq!(orders.len(), 2);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let repo = InMemoryOrderRepository::new();
        assert!(repo.get(OrderId::new()).await.unwrap().is_none());
    }
}

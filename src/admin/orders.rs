use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn, Instrument};

use super::{AdminError, EditSession};
use crate::catalog::{revenue, Page, Paginator, OrderFilter};
use crate::clients::{OrderClient, ProductClient};
use crate::domain::{Order, OrderStatus, Product};
use crate::product_actor::ProductError;

/// One page of the admin order table plus the revenue of every order that
/// passed the filter, not just the visible page.
#[derive(Debug, Clone, PartialEq)]
pub struct OrdersView {
    pub page: Page<Order>,
    pub revenue: f64,
}

/// Outcome of a status change.
#[derive(Debug)]
pub struct StatusUpdate {
    pub order: Order,
    /// Adjustment to apply to a displayed revenue figure until the next load.
    pub revenue_delta: f64,
    /// Stock restoration started by a cancellation. It runs on its own; the
    /// status change is already reported as done whether or not it lands.
    pub restock: Option<JoinHandle<Result<Product, ProductError>>>,
}

#[derive(Clone)]
pub struct OrderAdmin {
    orders: OrderClient,
    products: ProductClient,
    paginator: Paginator,
}

impl OrderAdmin {
    pub fn new(orders: OrderClient, products: ProductClient, paginator: Paginator) -> Self {
        Self {
            orders,
            products,
            paginator,
        }
    }

    pub async fn load(&self, filter: &OrderFilter, page: usize) -> Result<OrdersView, AdminError> {
        let filtered = filter.apply(&self.orders.list_orders().await?);
        Ok(OrdersView {
            revenue: revenue(&filtered),
            page: self.paginator.page(&filtered, page),
        })
    }

    /// Saves the status of the row being edited.
    pub async fn save_edit(&self, session: &mut EditSession<Order>) -> Result<StatusUpdate, AdminError> {
        let (id, draft) = session.take().ok_or(AdminError::NotEditing)?;
        match self.set_status(id.clone(), draft.status).await {
            Ok(update) => Ok(update),
            Err(e) => {
                session.restore(id, draft);
                Err(e)
            }
        }
    }

    /// Changes an order's status. Moving an order into `cancelled` also puts
    /// its quantity back on the product's stock in the background.
    #[instrument(skip(self))]
    pub async fn set_status(&self, id: String, status: OrderStatus) -> Result<StatusUpdate, AdminError> {
        // Step 1: Read the order as it stands
        let previous = self.orders.get_order(id.clone()).await?;

        // Step 2: Update status
        let order = match self.orders.set_status(id, status).await {
            Ok(order) => order,
            Err(e) => {
                error!(error = %e, "Status update failed");
                return Err(e.into());
            }
        };
        info!(from = %previous.status, to = %order.status, "Order status updated");

        // Step 3: Compensate stock on cancellation
        let cancelled_now = status == OrderStatus::Cancelled && previous.status != OrderStatus::Cancelled;
        if !cancelled_now {
            return Ok(StatusUpdate {
                order,
                revenue_delta: 0.0,
                restock: None,
            });
        }
        let restock = self.spawn_restock(&previous);
        Ok(StatusUpdate {
            order,
            revenue_delta: -previous.total,
            restock,
        })
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: String) -> Result<(), AdminError> {
        self.orders.delete_order(id).await?;
        Ok(())
    }

    pub async fn resync(&self) -> Result<Vec<Order>, AdminError> {
        Ok(self.orders.resync_orders().await?)
    }

    fn spawn_restock(&self, order: &Order) -> Option<JoinHandle<Result<Product, ProductError>>> {
        let Some(product_ref) = order.product.clone() else {
            warn!(order_id = %order.id, "Cancelled order has no product reference, stock not restored");
            return None;
        };
        let products = self.products.clone();
        let quantity = order.quantity;
        let span = tracing::info_span!("restock", order_id = %order.id, product_id = %product_ref.id, quantity);

        Some(tokio::spawn(
            async move {
                let current = match products.get_product(product_ref.id.clone()).await {
                    Ok(product) => product.quantity,
                    Err(e) => {
                        warn!(error = %e, fallback = product_ref.quantity, "Current stock unavailable, using order snapshot");
                        product_ref.quantity
                    }
                };
                let restored = current.saturating_add(quantity);
                match products.set_stock(product_ref.id, restored).await {
                    Ok(product) => {
                        info!(from = current, to = restored, "Stock restored");
                        Ok(product)
                    }
                    Err(e) => {
                        error!(error = %e, "Stock restoration failed");
                        Err(e)
                    }
                }
            }
            .instrument(span),
        ))
    }
}

//! Plain-text rendering of every screen.
//!
//! Renderers are pure: they take already-loaded data and return the text to
//! print, so the CLI decides when to fetch and when to redraw.

use crate::admin::{EditSession, OrdersView};
use crate::catalog::Page;
use crate::checkout::{PaymentErrors, PaymentField, Quote};
use crate::domain::{order_total, Order, Product, ProductType};
use crate::routes::Route;

/// Formats an amount the way prices are shown across the store.
pub fn euros(amount: f64) -> String {
    format!("€{amount:.2}")
}

pub fn loading(what: &str) -> String {
    format!("Loading {what}...")
}

pub fn load_error(what: &str) -> String {
    format!("Error loading {what}...")
}

/// What a screen fetches before it can draw, if anything.
pub fn loaded_data(route: &Route) -> Option<&'static str> {
    match route {
        Route::Catalog | Route::AdminProducts | Route::ManageStore => Some("products"),
        Route::ProductDetail(_) | Route::Checkout(_) => Some("product details"),
        Route::AdminOrders => Some("orders"),
        Route::Confirmation | Route::AddProduct => None,
    }
}

fn category(product_type: Option<ProductType>) -> &'static str {
    product_type.map_or("-", |t| t.as_str())
}

fn pager<T>(page: &Page<T>) -> String {
    let previous = if page.has_previous() { "[< Previous]" } else { "(< Previous)" };
    let next = if page.has_next() { "[Next >]" } else { "(Next >)" };
    format!(
        "Page {} of {}  {previous} {next}",
        page.number,
        page.total_pages.max(1)
    )
}

pub fn catalog(page: &Page<Product>) -> String {
    let mut out = String::from("Products\n\n");
    if page.is_empty() {
        out.push_str("No products found.\n");
    }
    for product in &page.items {
        out.push_str(&format!(
            "  {:<28} {:>10}  {:<12}  {}\n",
            product.title,
            euros(product.price),
            product.stock_status().label(),
            Route::ProductDetail(product.id.clone()),
        ));
    }
    out.push('\n');
    out.push_str(&pager(page));
    out.push('\n');
    out
}

pub fn product_detail(product: &Product, quantity: u32) -> String {
    let mut out = format!("{}\n{}\n\n", product.title, product.description);
    out.push_str(&format!("Price: {}\n", euros(product.price)));
    out.push_str(if product.is_available { "In Stock\n" } else { "Out of Stock\n" });
    if product.quantity > 0 {
        out.push_str(&format!("Quantity: {quantity} (1-{})\n", product.quantity));
    } else {
        out.push_str("Quantity: none left\n");
    }
    out.push_str(&format!("Total Price: {}\n", euros(order_total(product.price, quantity))));
    if product.is_available {
        out.push_str(&format!("\nAdd to Cart -> {}\n", Route::Checkout(product.id.clone())));
    } else {
        out.push_str("\n(ordering disabled)\n");
    }
    out.push_str(&format!("Back to Products -> {}\n", Route::Catalog));
    out
}

pub fn checkout(quote: &Quote, errors: Option<&PaymentErrors>) -> String {
    let mut out = format!(
        "Place your order\n\n{}\n{}\nPrice: {}\nQuantity: {}\nTotal Price: {}\n\nPayment Information\n",
        quote.product().title,
        quote.product().description,
        euros(quote.product().price),
        quote.quantity(),
        euros(quote.total()),
    );
    for field in [PaymentField::CardNumber, PaymentField::Expiry, PaymentField::Cvv] {
        out.push_str(&format!("  {}", field.label()));
        if let Some(message) = errors.and_then(|e| e.message_for(field)) {
            out.push_str(&format!("  ! {message}"));
        }
        out.push('\n');
    }
    out
}

pub fn confirmation(order_id: Option<&str>) -> String {
    let mut out = String::from("Thank You for Your Purchase!\nYour order has been placed successfully.\n");
    if let Some(id) = order_id {
        out.push_str(&format!("Your Order ID is: {id}\n"));
    }
    out.push_str("We will notify you when your order is on the way.\n\n");
    out.push_str(&format!(
        "Back to Store -> {}\nView Orders -> {}\nManage Products -> {}\n",
        Route::Catalog,
        Route::AdminOrders,
        Route::AdminProducts,
    ));
    out
}

pub fn admin_products(page: &Page<Product>, editing: &EditSession<Product>) -> String {
    let mut out = format!(
        "{:<8} {:<24} {:>10} {:>5}  {:<9} {:<12}\n",
        "ID", "Title", "Price", "Qty", "Type", "Status"
    );
    for product in &page.items {
        let row = match editing.draft() {
            Some(draft) if editing.is_editing(&product.id) => draft,
            _ => product,
        };
        let marker = if editing.is_editing(&product.id) { " (editing)" } else { "" };
        out.push_str(&format!(
            "{:<8} {:<24} {:>10} {:>5}  {:<9} {:<12}{marker}\n",
            row.id,
            row.title,
            euros(row.price),
            row.quantity,
            category(row.product_type),
            row.stock_status().label(),
        ));
    }
    out.push('\n');
    out.push_str(&pager(page));
    out.push('\n');
    out
}

pub fn admin_orders(view: &OrdersView, editing: &EditSession<Order>) -> String {
    let mut out = format!(
        "{:<8} {:<24} {:>10} {:>5} {:>10}  {:<9} {:<10}\n",
        "ID", "Title", "Price", "Qty", "Total", "Type", "Status"
    );
    for order in &view.page.items {
        let status = match editing.draft() {
            Some(draft) if editing.is_editing(&order.id) => format!("{} (editing)", draft.status),
            _ => order.status.to_string(),
        };
        out.push_str(&format!(
            "{:<8} {:<24} {:>10} {:>5} {:>10}  {:<9} {:<10}\n",
            order.id,
            order.title,
            euros(order.price),
            order.quantity,
            euros(order.total),
            category(order.product_type),
            status,
        ));
    }
    out.push('\n');
    out.push_str(&pager(&view.page));
    out.push_str(&format!("\n\nTotal Revenue: {}\n", euros(view.revenue)));
    out
}

pub fn manage_store(products: &[Product]) -> String {
    let mut out = String::from("Manage Store - Replenish Stock\n\n");
    for product in products {
        let action = match product.replenished_quantity() {
            Some(next) if next > product.quantity => format!("replenish -> {next}"),
            Some(_) => "at capacity".to_string(),
            None => "no category".to_string(),
        };
        out.push_str(&format!(
            "{:<8} {:<24} {:<9} {:>5}  {action}\n",
            product.id,
            product.title,
            category(product.product_type),
            product.quantity,
        ));
    }
    out
}

pub fn add_product_form() -> String {
    let types: Vec<&str> = ProductType::ALL.iter().map(|t| t.as_str()).collect();
    format!(
        "Add New Product\n\n  Title\n  Description\n  Product Price (€)\n  Quantity\n  Type ({})\n\nAvailability is set from quantity.\n",
        types.join(", ")
    )
}

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn, Instrument};

use storefront::admin::EditSession;
use storefront::app_system::{setup_tracing, AppConfig, StorefrontSystem};
use storefront::catalog::{sort_newest_first, AvailabilityFilter, OrderFilter, ProductFilter};
use storefront::checkout::{CheckoutError, PaymentDetails};
use storefront::domain::{OrderStatus, ProductCreate, ProductType};
use storefront::routes::Route;
use storefront::screens;

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Storefront and admin console for the hosted shop API")]
#[command(version)]
struct Cli {
    /// Base URL of the REST API (overrides STOREFRONT_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Rows per page (overrides STOREFRONT_PAGE_SIZE)
    #[arg(long, global = true)]
    page_size: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the screen at a route, e.g. `/`, `/product/3`, `/admin/orders`
    Open(OpenArgs),
    /// Pay for a product and record the order
    Checkout {
        product_id: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
        #[arg(long)]
        card: String,
        #[arg(long)]
        expiry: String,
        #[arg(long)]
        cvv: String,
    },
    /// Back-office actions
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
}

#[derive(Args)]
struct OpenArgs {
    path: String,
    #[arg(long, default_value_t = 1)]
    page: usize,
    /// t-shirt or trousers
    #[arg(long)]
    category: Option<ProductType>,
    /// available, low-stock or out-of-stock
    #[arg(long)]
    availability: Option<AvailabilityFilter>,
    /// Case-insensitive title search
    #[arg(long)]
    name: Option<String>,
    /// paid, pending or cancelled
    #[arg(long)]
    status: Option<OrderStatus>,
    /// Quantity preselected on product and checkout screens
    #[arg(long, default_value_t = 1)]
    quantity: u32,
    /// Order id shown on the confirmation screen
    #[arg(long)]
    order_id: Option<String>,
    /// Redraw on every product poll until interrupted
    #[arg(long)]
    watch: bool,
}

#[derive(Subcommand)]
enum AdminCommands {
    Products {
        #[command(subcommand)]
        command: ProductCommands,
    },
    Orders {
        #[command(subcommand)]
        command: OrderCommands,
    },
}

#[derive(Subcommand)]
enum ProductCommands {
    /// Save edits to one product; availability follows the resulting stock
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        quantity: Option<u32>,
        #[arg(long = "type")]
        product_type: Option<ProductType>,
    },
    Toggle { id: String },
    Delete { id: String },
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        quantity: u32,
        #[arg(long = "type")]
        product_type: Option<ProductType>,
    },
    /// Add one batch of stock (t-shirt +20, trousers +15, max 100)
    Replenish { id: String },
    Resync,
}

#[derive(Subcommand)]
enum OrderCommands {
    Status { id: String, status: OrderStatus },
    Delete { id: String },
    Resync,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("loading configuration")?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(size) = cli.page_size {
        config.page_size = size;
    }
    config.validate()?;

    info!(api_url = %config.api_url, "Starting storefront");
    let mut system = StorefrontSystem::new(&config).context("building HTTP client")?;

    let result = match cli.command {
        Commands::Open(args) => open(&mut system, &config, args).await,
        Commands::Checkout {
            product_id,
            quantity,
            card,
            expiry,
            cvv,
        } => {
            let payment = PaymentDetails::new(card, expiry, cvv);
            let span = tracing::info_span!("checkout", %product_id, quantity);
            checkout(&system, product_id, quantity, payment).instrument(span).await
        }
        Commands::Admin { command } => admin(&system, command).await,
    };

    system.shutdown().await.map_err(anyhow::Error::msg)?;
    result
}

async fn open(system: &mut StorefrontSystem, config: &AppConfig, args: OpenArgs) -> Result<()> {
    let route: Route = args.path.parse()?;
    if let Some(what) = screens::loaded_data(&route) {
        eprintln!("{}", screens::loading(what));
    }
    if !args.watch {
        println!("{}", render(system, &route, &args).await);
        return Ok(());
    }

    system.start_polling(config);
    loop {
        println!("{}", render(system, &route, &args).await);
        tokio::select! {
            _ = tokio::time::sleep(config.poll_interval) => {}
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

/// Draws a route. Load failures render the screen's error message.
async fn render(system: &StorefrontSystem, route: &Route, args: &OpenArgs) -> String {
    let product_filter = ProductFilter {
        category: args.category,
        availability: args.availability,
        name: None,
    }
    .name(args.name.clone().unwrap_or_default());

    match route {
        Route::Catalog => match system.product_client.list_products().await {
            Ok(mut products) => {
                sort_newest_first(&mut products);
                let filtered = product_filter.apply(&products);
                screens::catalog(&system.paginator().page(&filtered, args.page))
            }
            Err(_) => screens::load_error("products"),
        },
        Route::ProductDetail(id) => match system.product_client.get_product(id.clone()).await {
            Ok(product) => screens::product_detail(&product, args.quantity),
            Err(_) => screens::load_error("product details"),
        },
        Route::Checkout(id) => match system.checkout().quote(id.clone(), args.quantity).await {
            Ok(quote) => screens::checkout(&quote, None),
            Err(CheckoutError::Product(_)) => screens::load_error("product details"),
            Err(e) => e.to_string(),
        },
        Route::Confirmation => screens::confirmation(args.order_id.as_deref()),
        Route::AddProduct => screens::add_product_form(),
        Route::AdminProducts => match system.product_admin().load(&product_filter, args.page).await {
            Ok(page) => screens::admin_products(&page, &EditSession::new()),
            Err(_) => screens::load_error("products"),
        },
        Route::AdminOrders => {
            let filter = OrderFilter {
                category: args.category,
                status: args.status,
            };
            match system.order_admin().load(&filter, args.page).await {
                Ok(view) => screens::admin_orders(&view, &EditSession::new()),
                Err(_) => screens::load_error("orders"),
            }
        }
        Route::ManageStore => match system.product_admin().stock_overview(args.category).await {
            Ok(products) => screens::manage_store(&products),
            Err(_) => screens::load_error("products"),
        },
    }
}

async fn checkout(system: &StorefrontSystem, product_id: String, quantity: u32, payment: PaymentDetails) -> Result<()> {
    let service = system.checkout();
    let quote = service.quote(product_id, quantity).await?;
    match service.submit(&quote, &payment).await {
        Ok(receipt) => {
            println!("{}", screens::confirmation(Some(&receipt.order.id)));
            Ok(())
        }
        Err(CheckoutError::Payment(errors)) => {
            println!("{}", screens::checkout(&quote, Some(&errors)));
            bail!(errors)
        }
        Err(e) => Err(e.into()),
    }
}

async fn admin(system: &StorefrontSystem, command: AdminCommands) -> Result<()> {
    match command {
        AdminCommands::Products { command } => {
            let admin = system.product_admin();
            match command {
                ProductCommands::Edit {
                    id,
                    title,
                    description,
                    price,
                    quantity,
                    product_type,
                } => {
                    let mut draft = system.product_client.get_product(id.clone()).await?;
                    draft.title = title.unwrap_or(draft.title);
                    draft.description = description.unwrap_or(draft.description);
                    draft.price = price.unwrap_or(draft.price);
                    draft.quantity = quantity.unwrap_or(draft.quantity);
                    draft.product_type = product_type.or(draft.product_type);

                    let mut session = EditSession::new();
                    session.begin(id, draft);
                    let saved = admin.save_edit(&mut session).await?;
                    println!("Saved {} ({})", saved.title, saved.stock_status());
                }
                ProductCommands::Toggle { id } => {
                    let product = admin.toggle_availability(id).await?;
                    println!("{} is now {}", product.title, if product.is_available { "available" } else { "unavailable" });
                }
                ProductCommands::Delete { id } => {
                    admin.delete(id.clone()).await?;
                    println!("Deleted product {id}");
                }
                ProductCommands::Add {
                    title,
                    description,
                    price,
                    quantity,
                    product_type,
                } => {
                    let product = admin
                        .add(ProductCreate::new(title, description, price, quantity, product_type))
                        .await?;
                    println!("Added product {} ({})", product.id, product.title);
                }
                ProductCommands::Replenish { id } => {
                    let product = admin.replenish(id).await?;
                    println!("{} stock is now {}", product.title, product.quantity);
                }
                ProductCommands::Resync => {
                    let products = admin.resync().await?;
                    println!("Resynced {} products", products.len());
                }
            }
        }
        AdminCommands::Orders { command } => {
            let admin = system.order_admin();
            match command {
                OrderCommands::Status { id, status } => {
                    let update = admin.set_status(id, status).await?;
                    println!("Order {} is now {}", update.order.id, update.order.status);
                    if update.revenue_delta != 0.0 {
                        println!("Revenue adjusted by {}", screens::euros(update.revenue_delta));
                    }
                    // Give the background restock a moment before the process exits.
                    if let Some(restock) = update.restock {
                        match tokio::time::timeout(Duration::from_secs(5), restock).await {
                            Ok(Ok(Ok(product))) => println!("{} stock restored to {}", product.title, product.quantity),
                            Ok(Ok(Err(e))) => warn!(error = %e, "Stock was not restored"),
                            Ok(Err(e)) => warn!(error = %e, "Restock task failed"),
                            Err(_) => warn!("Restock still running at exit"),
                        }
                    }
                }
                OrderCommands::Delete { id } => {
                    admin.delete(id.clone()).await?;
                    println!("Deleted order {id}");
                }
                OrderCommands::Resync => {
                    let orders = admin.resync().await?;
                    println!("Resynced {} orders", orders.len());
                }
            }
        }
    }
    Ok(())
}

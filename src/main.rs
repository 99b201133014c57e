use clap::Parser;
use miette::{IntoDiagnostic, Result, miette};
use std::path::PathBuf;
use std::sync::Arc;
use storefront_checkout::application::session::CheckoutSession;
use storefront_checkout::config::StoreConfig;
use storefront_checkout::domain::payment::{PaymentAttempt, PaymentState};
use storefront_checkout::domain::ports::{GatewayHandle, NotifierHandle};
use storefront_checkout::infrastructure::notify::LogNotifier;
use storefront_checkout::infrastructure::relay::RelayGateway;
use storefront_checkout::interfaces::terminal;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Store configuration JSON file
    config: PathBuf,

    /// Product to add to the cart, as ID or ID=QTY. Repeatable.
    #[arg(long = "item", value_name = "ID[=QTY]", value_parser = parse_item)]
    items: Vec<(u32, u32)>,

    /// Id of the saved card to pay with
    #[arg(long)]
    card: Option<String>,

    /// Overrides relay.base_url from the configuration
    #[arg(long)]
    relay_url: Option<String>,

    /// Print the catalog and saved cards, then exit
    #[arg(long)]
    list: bool,
}

fn parse_item(raw: &str) -> std::result::Result<(u32, u32), String> {
    let (id, qty) = match raw.split_once('=') {
        Some((id, qty)) => (id, qty),
        None => (raw, "1"),
    };
    let id = id
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid product id '{id}': {e}"))?;
    let qty = qty
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid quantity '{qty}': {e}"))?;
    if qty == 0 {
        return Err("quantity must be at least 1".to_string());
    }
    Ok((id, qty))
}

/// Prints every observed attempt until it leaves the in-flight states.
async fn follow(updates: &mut watch::Receiver<PaymentAttempt>) -> PaymentAttempt {
    let mut last_line = String::new();
    let mut announced_url = false;

    loop {
        let attempt = updates.borrow_and_update().clone();

        if !announced_url && let Some(url) = attempt.authentication_url() {
            println!("Open this link to authenticate the payment: {url}");
            announced_url = true;
        }
        let line = terminal::render_payment(&attempt);
        if line != last_line {
            println!("{line}");
            last_line = line;
        }

        if !attempt.state().is_in_flight() || updates.changed().await.is_err() {
            return attempt;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = StoreConfig::load(&cli.config).into_diagnostic()?;
    if let Some(url) = cli.relay_url {
        config.relay.base_url = url;
    }
    let settings = config.checkout_settings();

    if cli.list {
        print!("{}", terminal::render_catalog(&config.catalog, &settings.currency));
        print!(
            "{}",
            terminal::render_instruments(&config.saved_instruments, None)
        );
        return Ok(());
    }

    let gateway: GatewayHandle =
        Arc::new(RelayGateway::new(config.relay_config()).into_diagnostic()?);
    let notifier: NotifierHandle = Arc::new(LogNotifier);
    let currency = settings.currency.clone();
    let mut session =
        CheckoutSession::new(gateway, notifier, config.saved_instruments.clone(), settings);

    for (id, qty) in cli.items {
        let product = config
            .catalog
            .get(id)
            .ok_or_else(|| miette!("Unknown product: {id}"))?;
        session.add_items(product, qty).await;
    }
    if let Some(card) = &cli.card {
        session.select_instrument(card).await.into_diagnostic()?;
    }

    print!("{}", terminal::render_cart(&session.cart().await, &currency));

    let mut updates = session.subscribe();
    session.submit().await.into_diagnostic()?;

    let attempt = tokio::select! {
        attempt = follow(&mut updates) => attempt,
        _ = tokio::signal::ctrl_c() => {
            session.cancel().await;
            return Err(miette!("Payment cancelled"));
        }
    };

    match attempt.state() {
        PaymentState::Succeeded => Ok(()),
        state => Err(miette!("Payment {state}")),
    }
}

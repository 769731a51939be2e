//! McpMart command line client
//!
//! Browses the product catalog and news feed of a McpMart backend and
//! submits admin content (courses, news) to it.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use mcpmart_core::{
    available_categories, filter_and_sort, group_by_category, AdminError, AdminService, AppState,
    AppStatus, BrowseState, CacheScope, CatalogApiClient, CategoryRow, ClientCacheRepository, ClientConfig, CourseForm,
    DataStatusMonitor, DomainEvent, EventBus, FilterCriteria, ImageFile, NewsForm, NewsService, PageState,
    ProductFeed, ProductId, ProductType, SharedAppState, SortOrder, ViewMode,
    DATA_STATUS_BANNER,
};
use mcpmart_storage::{Database, SqliteClientCacheRepository};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(
    name = "mcpmart",
    version = env!("CARGO_PKG_VERSION"),
    about = "Browse the McpMart catalog and manage its content"
)]
struct Cli {
    /// REST API base URL
    #[arg(long, global = true, env = "MCPMART_API_URL", value_name = "URL")]
    api_url: Option<String>,

    /// Content language sent with product requests
    #[arg(long, global = true, env = "MCPMART_LANGUAGE")]
    language: Option<String>,

    /// Directory for the cache database and logs
    #[arg(long, global = true, env = "MCPMART_DATA_DIR", value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging for McpMart crates
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products, filtered and sorted locally
    Products(ProductsArgs),

    /// List featured products
    Featured {
        #[arg(short, long, default_value = "6")]
        limit: u32,
    },

    /// Show one product
    Product {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Show the news feed
    News {
        /// Also list news categories
        #[arg(long)]
        categories: bool,
    },

    /// Show backend data status
    Status {
        /// Keep polling and print every change until interrupted
        #[arg(short, long)]
        watch: bool,
    },

    /// Submit admin content
    Admin {
        #[command(subcommand)]
        action: AdminCommands,
    },

    /// Manage the local cache
    Cache {
        #[command(subcommand)]
        action: CacheCommands,
    },
}

#[derive(Args)]
struct ProductsArgs {
    /// Listing state as a URL query string (e.g. "q=db&sort=newest&page=2")
    #[arg(long, value_name = "QUERY")]
    query_string: Option<String>,

    /// Search text
    #[arg(short, long)]
    search: Option<String>,

    #[arg(short, long)]
    category: Option<String>,

    /// Product type (mcp_server, mcp_client, ai_agent, ready_to_use); repeatable
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    types: Vec<String>,

    /// Tag filter, any of; repeatable
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    #[arg(long, value_name = "ORDER")]
    sort: Option<String>,

    #[arg(long, value_name = "STARS")]
    min_stars: Option<u32>,

    #[arg(long)]
    official: bool,

    #[arg(long)]
    featured: bool,

    #[arg(long)]
    price_min: Option<f64>,

    #[arg(long)]
    price_max: Option<f64>,

    #[arg(short, long)]
    page: Option<usize>,

    #[arg(long)]
    per_page: Option<usize>,

    /// Group results into one row per category
    #[arg(long)]
    rows: bool,

    /// How many products to fetch before filtering
    #[arg(long, default_value = "100")]
    fetch_limit: u32,
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Store the bearer token used for admin requests
    Token { token: String },

    /// Submit a course from a JSON form file
    Course {
        #[arg(value_name = "FILE")]
        form: PathBuf,
        /// Image to upload before submitting
        #[arg(long, value_name = "PATH")]
        image: Option<PathBuf>,
    },

    /// Submit a news article from a JSON form file
    News {
        #[arg(value_name = "FILE")]
        form: PathBuf,
        #[arg(long, value_name = "PATH")]
        image: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Remove cached entries
    Clear {
        #[arg(long, value_enum, default_value = "all")]
        scope: ScopeArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ScopeArg {
    Local,
    Session,
    All,
}

/// Everything the commands need, wired once
struct AppContext {
    config: ClientConfig,
    client: CatalogApiClient,
    cache: Arc<dyn ClientCacheRepository>,
    state: SharedAppState,
    bus: EventBus,
    json: bool,
}

impl AppContext {
    async fn init(config: ClientConfig, json: bool) -> Result<Self> {
        let client = CatalogApiClient::new(&config).context("Failed to build HTTP client")?;

        let db_path = config.cache_database_path();
        let db = tokio::task::spawn_blocking(move || Database::open(&db_path)).await??;
        let cache: Arc<dyn ClientCacheRepository> =
            Arc::new(SqliteClientCacheRepository::new(Arc::new(Mutex::new(db))));

        // Every CLI invocation is its own session
        cache.start_session().await?;

        Ok(Self {
            config,
            client,
            cache,
            state: AppState::shared(),
            bus: EventBus::new(),
            json,
        })
    }

    fn feed(&self) -> ProductFeed {
        ProductFeed::new(self.client.clone(), self.bus.sender())
            .with_cache(self.cache.clone())
            .with_page_limit(self.config.items_per_page)
    }

    fn print<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

fn init_tracing(logs_dir: &Path, verbose: bool) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("Failed to create logs directory {:?}", logs_dir))?;

    // Creates files like: mcpmart.2026-01-22.log
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("mcpmart")
        .filename_suffix("log")
        .build(logs_dir)
        .context("Failed to create log file appender")?;
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    // RUST_LOG takes precedence
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let level = if verbose { "debug" } else { "info" };
            EnvFilter::new("warn")
                .add_directive(format!("mcpmart_core={}", level).parse()?)
                .add_directive(format!("mcpmart_storage={}", level).parse()?)
                .add_directive(format!("mcpmart={}", level).parse()?)
        }
    };

    // Console goes to stderr so stdout stays machine-readable
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .compact()
        .with_target(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

fn resolve_config(cli: &Cli) -> ClientConfig {
    let mut config = ClientConfig::from_env();
    if let Some(ref url) = cli.api_url {
        config = config.with_api_base_url(url.clone());
    }
    if let Some(ref language) = cli.language {
        config = config.with_language(language.clone());
    }
    if let Some(ref dir) = cli.data_dir {
        config = config.with_data_dir(dir.clone());
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = resolve_config(&cli);
    let _log_guard = init_tracing(&config.logs_dir(), cli.verbose)?;

    info!(api = %config.api_base_url, "[CLI] McpMart starting");
    let ctx = AppContext::init(config, cli.json).await?;

    match cli.command {
        Commands::Products(args) => list_products(&ctx, args).await,
        Commands::Featured { limit } => show_featured(&ctx, limit).await,
        Commands::Product { id } => show_product(&ctx, &id).await,
        Commands::News { categories } => show_news(&ctx, categories).await,
        Commands::Status { watch } => show_status(&ctx, watch).await,
        Commands::Admin { action } => run_admin(&ctx, action).await,
        Commands::Cache { action } => run_cache(&ctx, action).await,
    }
}

/// Merge the query string and the explicit flags into one browse state
fn browse_state(args: &ProductsArgs, default_per_page: usize) -> Result<BrowseState> {
    let mut state = match args.query_string {
        Some(ref qs) => BrowseState::from_query(qs)?,
        None => BrowseState {
            per_page: default_per_page,
            ..BrowseState::default()
        },
    };

    if let Some(ref search) = args.search {
        state.query = Some(search.clone()).filter(|s| !s.trim().is_empty());
    }
    if let Some(ref category) = args.category {
        state.category = Some(category.clone());
    }
    if !args.types.is_empty() {
        state.types = args.types.iter().map(|t| ProductType::from_str(t)).collect();
    }
    if let Some(ref sort) = args.sort {
        state.sort = match SortOrder::parse(sort) {
            Some(order) => order,
            None => bail!(
                "unknown sort order '{}' (expected one of: {})",
                sort,
                SortOrder::ALL.map(|o| o.as_str()).join(", ")
            ),
        };
    }
    if let Some(stars) = args.min_stars {
        state.ratings = vec![stars];
    }
    for bound in [args.price_min, args.price_max].into_iter().flatten() {
        if !bound.is_finite() {
            bail!("price bounds must be finite numbers, got {}", bound);
        }
    }
    if args.price_min.is_some() {
        state.price_min = args.price_min;
    }
    if args.price_max.is_some() {
        state.price_max = args.price_max;
    }
    if args.rows {
        state.view = ViewMode::Rows;
    }
    if let Some(per_page) = args.per_page {
        state.set_per_page(per_page);
    }
    if let Some(page) = args.page {
        state.page = page.max(1);
    }
    Ok(state)
}

async fn list_products(ctx: &AppContext, args: ProductsArgs) -> Result<()> {
    let browse = browse_state(&args, ctx.config.items_per_page as usize)?;
    let feed = ctx.feed();

    let loaded = feed.fetch_products(1, args.fetch_limit).await;
    if let Some(error) = loaded.error {
        bail!(error);
    }

    let criteria = browse
        .to_criteria()
        .with_official_only(args.official)
        .with_featured_only(args.featured)
        .with_tags(args.tags.iter().cloned());

    let mut pages = PageState::new(browse.per_page);
    pages.set_criteria(criteria);
    pages.set_page(browse.page);
    let page = pages.apply(&loaded.products);

    debug!(query = %browse.to_query(), "[CLI] Browse state");

    if ctx.json {
        return ctx.print(&page);
    }

    if browse.view == ViewMode::Rows {
        for row in category_rows(&loaded.products, pages.criteria()) {
            println!("{} ({})", row.category, row.products.len());
            for product in &row.products {
                println!("    {}", product_line(product));
            }
        }
    } else {
        for product in &page.items {
            println!("{}", product_line(product));
        }
    }

    println!(
        "\nPage {}/{} - {} matching products",
        page.current_page,
        page.total_pages.max(1),
        page.total_items
    );
    let categories = available_categories(&loaded.products);
    if !categories.is_empty() {
        println!("Categories: {}", categories.join(", "));
    }
    let query = browse.to_query();
    if !query.is_empty() {
        println!("State: ?{}", query);
    }
    Ok(())
}

/// Rows view: every matching product grouped by category, not just one page
fn category_rows(products: &[mcpmart_core::Product], criteria: &FilterCriteria) -> Vec<CategoryRow> {
    group_by_category(&filter_and_sort(products, criteria))
}

fn product_line(product: &mcpmart_core::Product) -> String {
    let stars = product
        .popularity()
        .map(|s| format!("{:>7.0}★", s))
        .unwrap_or_else(|| "       -".to_string());
    let price = if product.is_free() {
        "free".to_string()
    } else {
        format!("${:.2}", product.price)
    };
    format!(
        "{:<8} {} {:<40} {:<13} {}",
        product.id.to_string(),
        stars,
        product.name,
        product.type_label(),
        price
    )
}

async fn show_featured(ctx: &AppContext, limit: u32) -> Result<()> {
    let products = ctx.feed().fetch_featured(limit).await?;
    if ctx.json {
        return ctx.print(&products);
    }
    for product in &products {
        println!("{}", product_line(product));
    }
    Ok(())
}

async fn show_product(ctx: &AppContext, id: &str) -> Result<()> {
    let id = match id.parse::<i64>() {
        Ok(n) => ProductId::Number(n),
        Err(_) => ProductId::from(id),
    };

    let Some(product) = ctx.feed().get_product(&id).await? else {
        bail!("product {} not found", id);
    };

    if ctx.json {
        return ctx.print(&product);
    }
    println!("{} ({})", product.name, product.type_label());
    println!("{}", product.description_or_placeholder());
    if let Some(category) = product.primary_category() {
        println!("Category: {}", category);
    }
    if !product.tags.is_empty() {
        println!("Tags: {}", product.tags.join(", "));
    }
    println!("Image: {}", product.image_or_fallback());
    Ok(())
}

async fn show_news(ctx: &AppContext, with_categories: bool) -> Result<()> {
    let service = NewsService::new(
        ctx.client.clone(),
        ctx.cache.clone(),
        ctx.state.clone(),
        ctx.bus.sender(),
    );
    let feed = service.load_news().await;
    let categories = if with_categories {
        service.load_categories(&feed.articles).await
    } else {
        Vec::new()
    };

    if ctx.json {
        return ctx.print(&serde_json::json!({
            "source": feed.source,
            "articles": feed.articles,
            "categories": categories,
        }));
    }

    if feed.is_fallback() {
        println!("{}\n", DATA_STATUS_BANNER);
    }
    for article in &feed.articles {
        println!("{}  [{}] {}", article.date, article.category, article.title);
        println!("    {}", article.summary);
    }
    if !categories.is_empty() {
        println!();
        for category in &categories {
            match category.count {
                Some(count) => println!("{} ({})", category.name, count),
                None => println!("{}", category.name),
            }
        }
    }
    Ok(())
}

async fn show_status(ctx: &AppContext, watch: bool) -> Result<()> {
    let monitor = Arc::new(
        DataStatusMonitor::new(ctx.client.clone(), ctx.state.clone(), ctx.bus.sender())
            .with_interval(ctx.config.status_poll_interval),
    );

    monitor.check_once().await;
    let snapshot = ctx.state.snapshot().await;
    if ctx.json {
        ctx.print(&snapshot)?;
    } else {
        for line in status_lines(&snapshot) {
            println!("{}", line);
        }
    }
    if !watch {
        return Ok(());
    }

    // Later output is change-driven
    let mut events = ctx.bus.subscribe();
    let _handle = monitor.start();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Some(DomainEvent::DataStatusChanged { previous, current, message }) => {
                    if ctx.json {
                        ctx.print(&serde_json::json!({
                            "previous": previous,
                            "current": current,
                            "message": message,
                        }))?;
                    } else {
                        println!("{} -> {}", previous.as_str(), current.as_str());
                    }
                }
                Some(_) => {}
                None => break,
            },
        }
    }
    Ok(())
}

fn status_lines(snapshot: &AppStatus) -> Vec<String> {
    let mut lines = vec![format!("Data status: {}", snapshot.data_status.as_str())];
    if let Some(ref message) = snapshot.status_message {
        lines.push(message.clone());
    }
    if snapshot.data_status.needs_banner() {
        lines.push(DATA_STATUS_BANNER.to_string());
    }
    lines
}

fn read_image(path: Option<&Path>) -> Result<Option<ImageFile>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read image {:?}", path))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    Ok(Some(ImageFile::new(file_name, bytes)))
}

fn read_form<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read form {:?}", path))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid form JSON in {:?}", path))
}

async fn run_admin(ctx: &AppContext, action: AdminCommands) -> Result<()> {
    let service = AdminService::new(ctx.client.clone(), ctx.cache.clone(), ctx.bus.sender());

    let result = match action {
        AdminCommands::Token { token } => {
            service.set_token(&token).await?;
            println!("Admin token stored");
            return Ok(());
        }
        AdminCommands::Course { form, image } => {
            let mut form: CourseForm = read_form(&form)?;
            form.image = read_image(image.as_deref())?;
            service.submit_course(&form).await
        }
        AdminCommands::News { form, image } => {
            let mut form: NewsForm = read_form(&form)?;
            form.image = read_image(image.as_deref())?;
            service.submit_news(&form).await
        }
    };

    match result {
        Ok(submission) => {
            if ctx.json {
                return ctx.print(&serde_json::json!({
                    "kind": submission.kind,
                    "slug": submission.slug,
                    "image_url": submission.image_url,
                    "id": submission.record.id,
                }));
            }
            println!("Submitted {} '{}'", submission.kind.as_str(), submission.slug);
            Ok(())
        }
        Err(AdminError::Validation(errors)) => {
            for (field, message) in &errors.fields {
                eprintln!("{}: {}", field, message);
            }
            bail!("form has {} invalid field(s)", errors.fields.len())
        }
        Err(err) => {
            if let Some(url) = err.orphaned_asset() {
                warn!(url = %url, "[CLI] Uploaded image is not referenced by any record");
            }
            Err(err.into())
        }
    }
}

async fn run_cache(ctx: &AppContext, action: CacheCommands) -> Result<()> {
    match action {
        CacheCommands::Clear { scope } => {
            let scopes: &[CacheScope] = match scope {
                ScopeArg::Local => &[CacheScope::Local],
                ScopeArg::Session => &[CacheScope::Session],
                ScopeArg::All => &[CacheScope::Local, CacheScope::Session],
            };
            let mut removed = 0;
            for scope in scopes {
                removed += ctx.cache.clear_scope(*scope).await?;
            }
            println!("Removed {} cached entries", removed);
            Ok(())
        }
    }
}

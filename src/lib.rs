//! Bookshelf application library
//!
//! Wires the application modules into the kernel and runs the HTTP server.

pub mod modules;

use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Re-export commonly used types
pub use modules::books::{registry::BookRegistry, BooksModule};

/// Build a registry holding every application module.
pub fn build_registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);
    registry
}

/// Initialize and start every module, serve HTTP until a shutdown signal,
/// then stop the modules.
pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    let registry = build_registry();
    let ctx = InitCtx { settings };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served =
        bookshelf_http::start_server(&registry, settings, bookshelf_http::shutdown_signal()).await;

    registry.stop_modules().await?;
    served
}

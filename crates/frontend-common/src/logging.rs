//! Log output for the browser console

/// Install the global tracing subscriber. Safe to call more than once.
pub fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        use tracing_subscriber::prelude::*;

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .without_time()
            .with_writer(tracing_web::MakeWebConsoleWriter::new());
        let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = tracing_subscriber::fmt().try_init();
    }
}

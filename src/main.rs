use carscope::error_display::user_message_from_report;
use carscope::logging::init_file_logging;
use carscope::{
    App, AppConfig, AppEvent, Args, CacheManager, ConfigManager, Dataset, Page, APP_NAME,
};
use clap::Parser;
use color_eyre::Result;
use ratatui::DefaultTerminal;
use std::sync::mpsc::{self, channel};
use std::time::Duration;
use tracing::info;

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, mut app: App, poll_interval: Duration) -> Result<()> {
    let (tx, rx) = channel::<AppEvent>();
    render(&mut terminal, &mut app)?;

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => {
                    if key.is_press() {
                        tx.send(AppEvent::Key(key))?
                    }
                }
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    event => {
                        if let Some(next) = app.event(&event) {
                            tx.send(next)?;
                        }
                    }
                }
                true
            }
            Err(mpsc::RecvTimeoutError::Timeout) => false,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

/// Flags that do their work and exit before the terminal UI starts.
fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.clear_cache {
        match CacheManager::new(APP_NAME) {
            Ok(cache) => {
                let removed = cache.clear_all()?;
                println!("Cache cleared ({} file(s) removed)", removed);
            }
            Err(_) => println!("No cache to clear"),
        }
        return Ok(Some(()));
    }

    if args.generate_config {
        let manager = ConfigManager::new(APP_NAME)?;
        let path = manager.write_default_config(args.force)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(Some(()));
    }

    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();
    color_eyre::install()?;

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    let config = AppConfig::load(APP_NAME)?;
    let cache = CacheManager::new(APP_NAME)?;
    if let Some(log_path) = init_file_logging(&cache, &config.debug, args.debug)? {
        info!(log = %log_path.display(), "debug logging enabled");
    }

    // A dataset that cannot be read ends the run before the UI starts.
    let dataset = match Dataset::load(&args.path, args.format) {
        Ok(dataset) => dataset,
        Err(e) => {
            eprintln!("Error: {}", user_message_from_report(&e));
            std::process::exit(1);
        }
    };

    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    let mut app = App::new_with_config(dataset, config)?
        .with_page(Page::from(args.page))
        .with_seed(args.seed);
    if args.debug {
        app.enable_debug();
    }

    let terminal = ratatui::init();
    let result = run(terminal, app, poll_interval);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

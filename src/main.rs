use iced::{Element, Task, Theme};
use std::path::PathBuf;

use photo_shelf::scanner::CachePaths;
use photo_shelf::state::data::Album;
use photo_shelf::state::library::Library;
use photo_shelf::ui::router::{Message, Router};
use photo_shelf::ui::style;
use photo_shelf::Config;

/// Application shell: global style around the router, nothing else
struct PhotoShelf {
    router: Router,
}

impl PhotoShelf {
    /// Create a new instance of the application and start loading the catalog
    fn new(config: Config) -> (Self, Task<Message>) {
        let router = Router::new(CachePaths::new(config.cache_path));

        (
            PhotoShelf { router },
            Task::perform(load_albums(config.database_path), Message::AlbumsLoaded),
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        self.router.update(message);
        Task::none()
    }

    fn view(&self) -> Element<Message> {
        style::root(self.router.view())
    }

    fn theme(&self) -> Theme {
        style::theme()
    }
}

fn main() -> iced::Result {
    env_logger::init();

    // A broken config file still honours the path environment variables
    let config = Config::load()
        .or_else(|e| {
            log::error!("Failed to load config, using defaults: {e}");
            Config::default().with_env_overrides()
        })
        .unwrap_or_else(|e| {
            log::error!("Failed to resolve config paths: {e}");
            Config::default()
        });
    log::info!("Cache root: {}", config.cache_path.display());

    iced::application("Photo Shelf", PhotoShelf::update, PhotoShelf::view)
        .theme(PhotoShelf::theme)
        .centered()
        .run_with(move || PhotoShelf::new(config))
}

/// Read every album from the catalog.
/// Opens its own connection: rusqlite::Connection can't be shared across threads.
async fn load_albums(db_path: PathBuf) -> Result<Vec<Album>, String> {
    let library = Library::open(&db_path).map_err(|e| e.to_string())?;
    library.my_albums(false, true).map_err(|e| e.to_string())
}

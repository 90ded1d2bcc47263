/// Page routing for the application shell
use iced::widget::{button, column, scrollable, text, Column};
use iced::{Alignment, Element};

use crate::scanner::CachePaths;
use crate::state::data::Album;

/// Pages the router can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Albums,
    Album(i64),
}

#[derive(Debug, Clone)]
pub enum Message {
    /// Background catalog load finished
    AlbumsLoaded(Result<Vec<Album>, String>),
    Navigate(Route),
}

#[derive(Debug)]
pub struct Router {
    route: Route,
    albums: Vec<Album>,
    cache: CachePaths,
    status: String,
}

impl Router {
    pub fn new(cache: CachePaths) -> Self {
        Self {
            route: Route::Albums,
            albums: Vec::new(),
            cache,
            status: "Loading catalog...".to_string(),
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// The album the current route points at, if it exists
    pub fn current_album(&self) -> Option<&Album> {
        match self.route {
            Route::Album(id) => self.albums.iter().find(|album| album.id == id),
            Route::Albums => None,
        }
    }

    pub fn update(&mut self, message: Message) {
        match message {
            Message::AlbumsLoaded(Ok(albums)) => {
                log::info!("Loaded {} albums", albums.len());
                self.status = format!("{} albums in library.", albums.len());
                self.albums = albums;
            }
            Message::AlbumsLoaded(Err(e)) => {
                log::error!("Failed to load catalog: {e}");
                self.status = format!("Error: {e}");
            }
            Message::Navigate(route) => {
                log::debug!("Navigating to {route:?}");
                self.route = route;
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        match self.route {
            Route::Albums => self.albums_page(),
            Route::Album(_) => self.album_page(),
        }
    }

    fn albums_page(&self) -> Element<'_, Message> {
        let list = self.albums.iter().fold(Column::new().spacing(8), |list, album| {
            list.push(
                button(text(&album.title))
                    .on_press(Message::Navigate(Route::Album(album.id)))
                    .padding(10),
            )
        });

        column![text("Albums").size(32), text(&self.status).size(16), scrollable(list)]
            .spacing(20)
            .padding(40)
            .into()
    }

    fn album_page(&self) -> Element<'_, Message> {
        let back = button("Back to albums")
            .on_press(Message::Navigate(Route::Albums))
            .padding(10);

        let content: Column<'_, Message> = match self.current_album() {
            Some(album) => column![
                text(&album.title).size(32),
                text(&album.path).size(16),
                text(format!("Cache: {}", self.cache.album_cache_path(album.id).display())).size(14),
                back,
            ],
            None => column![text("Album not found").size(32), back],
        };

        content
            .spacing(20)
            .padding(40)
            .align_x(Alignment::Start)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn album(id: i64, title: &str) -> Album {
        Album {
            id,
            title: title.to_string(),
            parent_album_id: None,
            path: format!("/photos/{title}"),
        }
    }

    #[test]
    fn test_starts_on_album_list() {
        let router = Router::new(CachePaths::new("/cache"));
        assert_eq!(router.route(), Route::Albums);
        assert!(router.current_album().is_none());
    }

    #[test]
    fn test_navigate_to_loaded_album() {
        let mut router = Router::new(CachePaths::new("/cache"));
        router.update(Message::AlbumsLoaded(Ok(vec![album(1, "Summer"), album(2, "Winter")])));
        assert_eq!(router.status(), "2 albums in library.");

        router.update(Message::Navigate(Route::Album(2)));
        assert_eq!(router.current_album().map(|a| a.title.as_str()), Some("Winter"));

        router.update(Message::Navigate(Route::Albums));
        assert_eq!(router.route(), Route::Albums);
    }

    #[test]
    fn test_unknown_album_has_no_current_album() {
        let mut router = Router::new(CachePaths::new("/cache"));
        router.update(Message::Navigate(Route::Album(42)));
        assert_eq!(router.route(), Route::Album(42));
        assert!(router.current_album().is_none());
    }

    #[test]
    fn test_load_failure_sets_status() {
        let mut router = Router::new(CachePaths::new("/cache"));
        router.update(Message::AlbumsLoaded(Err("disk on fire".to_string())));
        assert_eq!(router.status(), "Error: disk on fire");
    }
}

/// Global styling applied once at the application root
use iced::widget::container;
use iced::{Element, Length, Theme};

/// Application-wide theme
pub const THEME: Theme = Theme::Dark;

pub fn theme() -> Theme {
    THEME
}

/// Root wrapper: the content fills the whole window with no outer margin
pub fn root<'a, Message: 'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(0)
        .into()
}

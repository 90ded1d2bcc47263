/// User interface module
///
/// - Global theme and root layout (style.rs)
/// - Page routing (router.rs)

pub mod router;
pub mod style;
